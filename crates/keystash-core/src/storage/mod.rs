//! Storage layer for Keystash.
//!
//! ## Architecture
//!
//! - **alias**: aliases to filesystem-safe record identifiers
//! - **record**: on-disk framing of one sealed record
//! - **traits**: the `ItemStore` persistence seam
//! - **file**: one directory per namespace, one file per record
//! - **secure**: the password-scoped `SecureStorage` façade
//! - **legacy**: read-only reader for the previous key format
//!
//! ## Guarantees
//!
//! - Payloads and metadata are only ever written encrypted
//! - Creating a record is exclusive and atomic (temp file + hard link)
//! - Deleting a record is a single unlink
//! - Nothing is cached; every call reflects what is on disk

pub mod alias;
pub mod file;
pub mod legacy;
pub mod record;
pub mod secure;
pub mod traits;
pub mod types;

pub use alias::RecordId;
pub use file::FileItemStore;
pub use legacy::LegacyKeyReader;
pub use secure::SecureStorage;
pub use traits::{ItemStore, StoreError, StoreResult};
pub use types::{Item, Metadata, StorageNamespace};
