//! Item store trait definition.
//!
//! The `ItemStore` trait is the persistence seam under [`SecureStorage`]:
//! it moves opaque record bytes in and out of one namespace and knows
//! nothing about passwords, aliases or encryption.
//!
//! [`SecureStorage`]: super::SecureStorage

use thiserror::Error;

use super::alias::RecordId;

/// Result type for item store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by an item store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record already exists under this identifier
    #[error("Record already exists: {0}")]
    AlreadyExists(RecordId),

    /// No record exists under this identifier
    #[error("Record not found: {0}")]
    NotFound(RecordId),

    /// Underlying I/O failure
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Persistence backend for one namespace.
///
/// All implementations must ensure:
/// - `create` is exclusive: it never succeeds twice for one identifier,
///   even under concurrent calls
/// - A reader never observes a partially written or half-deleted record
/// - `enumerate` reflects committed state, not a cache
pub trait ItemStore: Send + Sync {
    /// Persist a new record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a record is already present.
    fn create(&self, id: &RecordId, record: &[u8]) -> StoreResult<()>;

    /// Read a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if absent.
    fn read(&self, id: &RecordId) -> StoreResult<Vec<u8>>;

    /// Atomically replace an existing record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is nothing to replace.
    fn replace(&self, id: &RecordId, record: &[u8]) -> StoreResult<()>;

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if absent.
    fn delete(&self, id: &RecordId) -> StoreResult<()>;

    /// Whether a record is currently present.
    fn contains(&self, id: &RecordId) -> StoreResult<bool> {
        match self.read(id) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Identifiers of every record currently persisted.
    fn enumerate(&self) -> StoreResult<Vec<RecordId>>;
}
