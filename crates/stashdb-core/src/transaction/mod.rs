//! Transaction error types shared across crates.

mod error;

pub use error::{TransactionError, TransactionResult};
