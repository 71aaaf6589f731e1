//! Read-only access to the previous key storage format.
//!
//! The old format kept one file per key directly under a root directory:
//!
//! - file name: `<uuid-v5(NAMESPACE_OID, alias)>.key` (hyphenated, lowercase)
//! - body: age passphrase encryption (scrypt) of a JSON document
//!   `{ "name": "<alias>", "value": "<hex raw key bytes>" }`
//!
//! All entries share one global password and carry no metadata. This
//! reader exists only so old keys can be re-stored through
//! [`PrivateKeyStorage`](crate::keys::PrivateKeyStorage); it never writes.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::iter;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::types::Metadata;
use crate::error::{KeystashError, Result};

/// Extension of legacy key files.
pub const LEGACY_EXTENSION: &str = "key";

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    name: String,
    value: String,
}

/// File stem the legacy format used for `alias`.
pub fn legacy_file_stem(alias: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, alias.as_bytes())
        .hyphenated()
        .to_string()
}

/// Reader for a legacy key directory.
pub struct LegacyKeyReader {
    root: PathBuf,
    password: SecretString,
}

impl LegacyKeyReader {
    pub fn new(root: impl Into<PathBuf>, password: &str) -> Self {
        Self {
            root: root.into(),
            password: SecretString::from(password.to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, alias: &str) -> PathBuf {
        self.root.join(format!("{}.{}", legacy_file_stem(alias), LEGACY_EXTENSION))
    }

    /// Whether a legacy entry exists for `alias`.
    pub fn exists(&self, alias: &str) -> bool {
        self.entry_path(alias).is_file()
    }

    /// Load the raw key bytes stored under `alias`.
    ///
    /// The metadata map is always empty; the old format had none.
    ///
    /// # Errors
    ///
    /// - `KeystashError::KeyNotFound` if there is no entry for `alias`
    /// - `KeystashError::SecureStorage` on a wrong password, a corrupted
    ///   entry, or an entry whose name does not match `alias`
    pub fn load(&self, alias: &str) -> Result<(Vec<u8>, Metadata)> {
        let path = self.entry_path(alias);
        let encrypted = fs::read(&path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                KeystashError::KeyNotFound(alias.to_string())
            } else {
                KeystashError::Io { source: err }
            }
        })?;

        let entry = self.decrypt_entry(&encrypted)?;
        if entry.name != alias {
            return Err(KeystashError::SecureStorage(format!(
                "Legacy entry {} is not named '{}'",
                path.display(),
                alias
            )));
        }
        let raw = hex::decode(&entry.value).map_err(|e| {
            KeystashError::SecureStorage(format!("Legacy key value is not hex: {}", e))
        })?;

        debug!(path = %path.display(), "legacy entry loaded");
        Ok((raw, Metadata::new()))
    }

    /// Names of every readable legacy entry.
    ///
    /// Names live inside the encrypted body, so each entry is decrypted.
    pub fn aliases(&self) -> Result<BTreeSet<String>> {
        let mut aliases = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEGACY_EXTENSION) {
                continue;
            }
            let entry = self.decrypt_entry(&fs::read(&path)?)?;
            aliases.insert(entry.name);
        }
        Ok(aliases)
    }

    fn decrypt_entry(&self, encrypted: &[u8]) -> Result<LegacyEntry> {
        let decryptor = age::Decryptor::new(encrypted).map_err(|e| {
            KeystashError::SecureStorage(format!("Unreadable legacy entry: {}", e))
        })?;

        let identity = age::scrypt::Identity::new(SecretString::from(
            self.password.expose_secret().to_string(),
        ));
        let mut reader = decryptor
            .decrypt(iter::once(&identity as &dyn age::Identity))
            .map_err(|e| match e {
                age::DecryptError::NoMatchingKeys
                | age::DecryptError::DecryptionFailed
                | age::DecryptError::KeyDecryptionFailed => KeystashError::SecureStorage(
                    "Incorrect legacy storage password".to_string(),
                ),
                _ => KeystashError::SecureStorage(format!("Legacy decryption failed: {}", e)),
            })?;

        let mut decrypted = Vec::new();
        reader.read_to_end(&mut decrypted).map_err(|e| {
            KeystashError::SecureStorage(format!("Failed to read legacy entry: {}", e))
        })?;

        serde_json::from_slice(&decrypted).map_err(|e| {
            KeystashError::SecureStorage(format!("Malformed legacy entry: {}", e))
        })
    }
}

impl std::fmt::Debug for LegacyKeyReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyKeyReader")
            .field("root", &self.root)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
