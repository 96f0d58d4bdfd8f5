//! Environment configuration.

use std::path::{Path, PathBuf};

/// File name of the environment inside its home directory.
pub const DEFAULT_FILE_NAME: &str = "stash.redb";

/// Maximum number of rows a cursor holds in memory at once.
pub const DEFAULT_CURSOR_BATCH_SIZE: usize = 1000;

/// Configuration options for opening an [`Environment`](crate::Environment).
///
/// # Example
///
/// ```
/// use stashdb::Config;
///
/// let config = Config::new("/var/lib/stash").create(false).cursor_batch_size(256);
/// assert_eq!(config.db_path().file_name().and_then(|n| n.to_str()), Some("stash.redb"));
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the environment.
    pub home: PathBuf,
    /// Whether a missing environment (directory, file or table) is created.
    pub create: bool,
    /// Whether transactions are enabled.
    ///
    /// When disabled every operation commits on its own and the transaction
    /// calls of the backend do nothing.
    pub transactions: bool,
    /// Name of the environment file inside `home`.
    pub file_name: String,
    /// Keep everything in memory and ignore `home`.
    pub in_memory: bool,
    /// Engine page cache size in bytes. Uses the engine default when unset.
    pub cache_size: Option<usize>,
    /// Rows fetched per cursor batch.
    pub cursor_batch_size: usize,
}

impl Config {
    /// Create a configuration rooted at `home`.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            create: true,
            transactions: true,
            file_name: DEFAULT_FILE_NAME.to_owned(),
            in_memory: false,
            cache_size: None,
            cursor_batch_size: DEFAULT_CURSOR_BATCH_SIZE,
        }
    }

    /// Create a configuration for an in-memory environment.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { in_memory: true, ..Self::new(PathBuf::new()) }
    }

    /// Set whether missing environments are created.
    #[must_use]
    pub const fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Enable or disable transactions.
    #[must_use]
    pub const fn transactions(mut self, enabled: bool) -> Self {
        self.transactions = enabled;
        self
    }

    /// Set the environment file name.
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Set the engine cache size in bytes.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }

    /// Set the cursor batch size. Zero is treated as one.
    #[must_use]
    pub fn cursor_batch_size(mut self, size: usize) -> Self {
        self.cursor_batch_size = size.max(1);
        self
    }

    /// The home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Full path of the environment file.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.home.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("/tmp/stash");
        assert!(config.create);
        assert!(config.transactions);
        assert!(!config.in_memory);
        assert_eq!(config.file_name, DEFAULT_FILE_NAME);
        assert_eq!(config.cursor_batch_size, DEFAULT_CURSOR_BATCH_SIZE);
        assert_eq!(config.cache_size, None);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/stash/stash.redb"));
    }

    #[test]
    fn builder_setters() {
        let config = Config::new("/tmp/stash")
            .create(false)
            .transactions(false)
            .file_name("objects.db")
            .cache_size(1 << 20)
            .cursor_batch_size(0);

        assert!(!config.create);
        assert!(!config.transactions);
        assert_eq!(config.cache_size, Some(1 << 20));
        assert_eq!(config.cursor_batch_size, 1);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/stash/objects.db"));
    }

    #[test]
    fn in_memory_config() {
        let config = Config::in_memory();
        assert!(config.in_memory);
        assert!(config.transactions);
    }
}
