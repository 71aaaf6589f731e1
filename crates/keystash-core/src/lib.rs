//! # Keystash Core
//!
//! Local, encrypted, password-protected key-value storage for private keys
//! and their metadata.
//!
//! ## Architecture
//!
//! - **crypto**: master-secret derivation and the AES-GCM record envelope
//! - **storage**: alias codec, item store, `SecureStorage` façade, legacy reader
//! - **keys**: key exporters and `PrivateKeyStorage`
//! - **config**: TOML-backed storage configuration
//!
//! ## Example
//!
//! ```
//! use keystash_core::config::StorageConfig;
//! use keystash_core::crypto::KdfParams;
//! use keystash_core::keys::{Ed25519Exporter, Ed25519PrivateKey, Fingerprint, PrivateKeyStorage};
//! use keystash_core::storage::{SecureStorage, StorageNamespace};
//!
//! # fn main() -> keystash_core::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let config = StorageConfig::new(dir.path(), StorageNamespace::new("example")?)
//!     .with_kdf(KdfParams::new(1024, 1, 1)?);
//! let keys = PrivateKeyStorage::new(
//!     Ed25519Exporter::default(),
//!     SecureStorage::from_config(&config, "Tr0ub4dor&3")?,
//! );
//!
//! let key = Ed25519PrivateKey::generate(Fingerprint::default());
//! keys.store(&key, "alice", None)?;
//! let (loaded, _metadata) = keys.load("alice")?;
//! assert_eq!(loaded.id(), key.id());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod keys;
pub mod storage;

pub use error::{KeystashError, Result};
pub use keys::{KeyExporter, PrivateKeyStorage};
pub use storage::{SecureStorage, StorageNamespace};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
