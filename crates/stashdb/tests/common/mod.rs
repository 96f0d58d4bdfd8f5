//! Shared helpers for backend integration tests.

#![allow(dead_code)]

use stashdb::{BincodeSerializer, Config, Entry, StashBackend};

/// An in-memory backend with the default serializer.
pub fn backend() -> StashBackend {
    backend_with(Config::in_memory())
}

/// A backend opened with `config`.
pub fn backend_with(config: Config) -> StashBackend {
    StashBackend::open(config, BincodeSerializer).expect("failed to open backend")
}

/// `count` new entries with ids `prefix0`, `prefix1`, ...
pub fn entries(prefix: &str, count: usize) -> Vec<Entry> {
    (0..count).map(|i| Entry::new(format!("{prefix}{i}"), format!("payload {i}").into_bytes())).collect()
}
