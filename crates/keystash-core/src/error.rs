//! Error types for Keystash core operations.
//!
//! Callers only ever see one closed taxonomy: duplicate alias, missing
//! alias, a record that cannot be authenticated, or a plain storage failure.
//! The remaining variants cover setup problems (bad input, bad config,
//! exporter failures) that happen before any record is touched.

use thiserror::Error;

/// Result type alias for Keystash operations.
pub type Result<T> = std::result::Result<T, KeystashError>;

/// Core error type for Keystash operations.
#[derive(Debug, Error)]
pub enum KeystashError {
    /// An item with this alias already exists in the namespace
    #[error("Duplicate key: an item with alias '{0}' already exists")]
    DuplicateKey(String),

    /// No item is stored under this alias
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Record exists but cannot be authenticated or decoded
    /// (wrong password, corruption, unknown format version)
    #[error("Secure storage error: {0}")]
    SecureStorage(String),

    /// I/O error from the underlying storage
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Cipher or key-derivation setup failure
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Key export/import failure
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration read/parse/write failure
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KeystashError {
    /// True for failures that mean "the item is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, KeystashError::KeyNotFound(_))
    }

    /// True for failures that mean "the item is there but unreadable".
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, KeystashError::SecureStorage(_))
    }
}
