//! Cryptographic operations for Keystash.
//!
//! This module provides the storage envelope using well-audited libraries:
//! - **Argon2id**: Memory-hard derivation of the master secret
//! - **AES-256-GCM**: Authenticated encryption of each record
//!
//! ## Security Model
//!
//! - One master secret per (password, namespace), never persisted
//! - Fresh random nonce for every sealed record
//! - Namespace and alias bound as associated data
//! - Key material zeroized from memory on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the storage directory
//! - Offline brute-force attacks on the password
//! - Tampering with or swapping record files
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to process memory while a storage instance is alive

pub mod envelope;
pub mod key;

pub use envelope::{open, seal, EncryptedRecord, FORMAT_VERSION};
pub use key::{derive_master_secret, KdfParams, MasterSecret};
