//! Master secret derivation using Argon2id.
//!
//! The master secret is derived from the storage password and the storage
//! namespace. The salt is a hash of the namespace, so two instances opened
//! with the same password and namespace always agree on the key, while the
//! same password in a different namespace yields an unrelated key.

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use crate::error::{KeystashError, Result};
use crate::storage::types::StorageNamespace;

/// Default Argon2id parameters.
///
/// - Memory: 64 MB (64 * 1024 KB)
/// - Iterations: 3
/// - Parallelism: 1 (single-threaded for simplicity)
const ARGON2_MEMORY_KB: u32 = 64 * 1024;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;

/// Length of the master secret in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Domain tag mixed into the namespace salt.
const NAMESPACE_SALT_TAG: &[u8] = b"keystash.namespace.v1\0";

/// Argon2id cost parameters.
///
/// Changing any of these changes the derived key, so records written under
/// one set of parameters fail authentication under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl KdfParams {
    /// Build validated parameters.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Self {
            memory_kib,
            iterations,
            parallelism,
        };
        params.argon2_params()?;
        Ok(params)
    }

    fn argon2_params(&self) -> Result<argon2::Params> {
        argon2::Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| KeystashError::InvalidInput(format!("Invalid Argon2 parameters: {}", e)))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: ARGON2_MEMORY_KB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

/// Symmetric key derived from a password and a namespace.
///
/// Held only in memory and zeroized when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct MasterSecret {
    key: [u8; KEY_LENGTH],
}

impl MasterSecret {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Raw key bytes. Do not store or log.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

fn namespace_salt(namespace: &StorageNamespace) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(NAMESPACE_SALT_TAG);
    hasher.update(namespace.as_str().as_bytes());
    hasher.finalize().into()
}

/// Derive the master secret for `namespace` from `password`.
///
/// Deterministic: the same password, namespace and parameters always give
/// the same key.
///
/// # Examples
///
/// ```
/// use keystash_core::crypto::{derive_master_secret, KdfParams};
/// use keystash_core::storage::StorageNamespace;
///
/// let ns = StorageNamespace::new("docs").unwrap();
/// let params = KdfParams::new(1024, 1, 1).unwrap();
/// let a = derive_master_secret("hunter2", &ns, &params).unwrap();
/// let b = derive_master_secret("hunter2", &ns, &params).unwrap();
/// assert_eq!(a.as_bytes(), b.as_bytes());
/// ```
pub fn derive_master_secret(
    password: &str,
    namespace: &StorageNamespace,
    params: &KdfParams,
) -> Result<MasterSecret> {
    if password.is_empty() {
        return Err(KeystashError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.argon2_params()?,
    );

    let salt = namespace_salt(namespace);
    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut key_bytes)
        .map_err(|e| KeystashError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(MasterSecret::from_bytes(key_bytes))
}
