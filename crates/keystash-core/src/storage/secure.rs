//! Password-scoped secure storage.
//!
//! `SecureStorage` ties the pieces together: aliases are encoded to record
//! identifiers, payloads and metadata are sealed under the master secret,
//! and the sealed records are handed to an [`ItemStore`]. No item state is
//! cached in memory, so any two instances opened with the same password
//! and namespace see the same items.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, warn};

use super::alias::RecordId;
use super::file::FileItemStore;
use super::record::{associated_data, StoredRecord, MAX_ALIAS_LENGTH};
use super::traits::{ItemStore, StoreError};
use super::types::{Item, Metadata, SealedItem, StorageNamespace};
use crate::config::StorageConfig;
use crate::crypto::{self, derive_master_secret, KdfParams, MasterSecret};
use crate::error::{KeystashError, Result};

/// Encrypted, alias-addressed key-value store for one namespace.
pub struct SecureStorage<S = FileItemStore> {
    namespace: StorageNamespace,
    secret: MasterSecret,
    store: S,
}

impl SecureStorage<FileItemStore> {
    /// Open the namespace under `root` with the default KDF parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use keystash_core::crypto::KdfParams;
    /// use keystash_core::config::StorageConfig;
    /// use keystash_core::storage::{SecureStorage, StorageNamespace};
    ///
    /// # fn main() -> keystash_core::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let config = StorageConfig::new(dir.path(), StorageNamespace::new("docs")?)
    ///     .with_kdf(KdfParams::new(1024, 1, 1)?);
    /// let storage = SecureStorage::from_config(&config, "Tr0ub4dor&3")?;
    ///
    /// storage.save("alice", &[7u8; 32], None)?;
    /// let (data, metadata) = storage.load("alice")?;
    /// assert_eq!(data, vec![7u8; 32]);
    /// assert!(metadata.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(
        root: impl AsRef<Path>,
        namespace: StorageNamespace,
        password: &str,
    ) -> Result<Self> {
        let config = StorageConfig::new(root.as_ref(), namespace);
        Self::from_config(&config, password)
    }

    /// Open the storage described by `config`.
    pub fn from_config(config: &StorageConfig, password: &str) -> Result<Self> {
        let store = FileItemStore::open(&config.root, &config.namespace)
            .map_err(|err| translate(err, ""))?;
        Self::with_store(store, config.namespace.clone(), password, &config.kdf)
    }
}

impl<S: ItemStore> SecureStorage<S> {
    /// Wrap an arbitrary item store.
    pub fn with_store(
        store: S,
        namespace: StorageNamespace,
        password: &str,
        kdf: &KdfParams,
    ) -> Result<Self> {
        let secret = derive_master_secret(password, &namespace, kdf)?;
        Ok(Self {
            namespace,
            secret,
            store,
        })
    }

    pub fn namespace(&self) -> &StorageNamespace {
        &self.namespace
    }

    /// Save a new item.
    ///
    /// # Errors
    ///
    /// Returns `KeystashError::DuplicateKey` if `alias` is already present;
    /// the existing item is left untouched.
    pub fn save(&self, alias: &str, data: &[u8], metadata: Option<Metadata>) -> Result<()> {
        let id = validate_alias(alias)?;
        let record = self.seal_record(alias, data, metadata.unwrap_or_default())?;
        self.store
            .create(&id, &record)
            .map_err(|err| translate(err, alias))?;
        debug!(namespace = %self.namespace, record_id = %id, "item saved");
        Ok(())
    }

    /// Overwrite an existing item in one atomic step.
    ///
    /// # Errors
    ///
    /// Returns `KeystashError::KeyNotFound` if `alias` is not present.
    pub fn replace(&self, alias: &str, data: &[u8], metadata: Option<Metadata>) -> Result<()> {
        let id = validate_alias(alias)?;
        let record = self.seal_record(alias, data, metadata.unwrap_or_default())?;
        self.store
            .replace(&id, &record)
            .map_err(|err| translate(err, alias))?;
        debug!(namespace = %self.namespace, record_id = %id, "item replaced");
        Ok(())
    }

    /// Load payload and metadata.
    ///
    /// # Errors
    ///
    /// - `KeystashError::KeyNotFound` if no item exists for `alias`
    /// - `KeystashError::SecureStorage` if the record exists but does not
    ///   authenticate (wrong password, corruption, unknown version)
    pub fn load(&self, alias: &str) -> Result<(Vec<u8>, Metadata)> {
        let item = self.load_item(alias)?;
        Ok((item.data, item.metadata))
    }

    /// Load the full item, including its creation timestamp.
    pub fn load_item(&self, alias: &str) -> Result<Item> {
        let id = validate_alias(alias)?;
        let bytes = self.store.read(&id).map_err(|err| translate(err, alias))?;
        let record = StoredRecord::from_bytes(&bytes)?;
        if record.alias != alias {
            return Err(KeystashError::SecureStorage(format!(
                "Record {} does not belong to the requested alias",
                id
            )));
        }

        let aad = associated_data(&self.namespace, alias);
        let plaintext = crypto::open(&self.secret, &record.envelope, &aad)?;
        let sealed: SealedItem = serde_json::from_slice(&plaintext).map_err(|e| {
            KeystashError::SecureStorage(format!("Undecodable item payload: {}", e))
        })?;

        Ok(Item {
            alias: record.alias,
            data: sealed.data,
            metadata: sealed.metadata,
            created_at: sealed.created_at,
        })
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `KeystashError::KeyNotFound` if no item exists for `alias`.
    pub fn delete(&self, alias: &str) -> Result<()> {
        let id = validate_alias(alias)?;
        self.store
            .delete(&id)
            .map_err(|err| translate(err, alias))?;
        debug!(namespace = %self.namespace, record_id = %id, "item deleted");
        Ok(())
    }

    /// Whether an item is currently stored under `alias`. Never fails.
    pub fn exists(&self, alias: &str) -> bool {
        if alias.is_empty() {
            return false;
        }
        let id = RecordId::for_alias(alias);
        match self.store.contains(&id) {
            Ok(present) => present,
            Err(err) => {
                warn!(namespace = %self.namespace, record_id = %id, error = %err, "existence check failed");
                false
            }
        }
    }

    /// Every alias currently stored in the namespace.
    ///
    /// Reads only the cleartext record headers, so no decryption happens.
    pub fn aliases(&self) -> Result<BTreeSet<String>> {
        let mut aliases = BTreeSet::new();
        for id in self.store.enumerate().map_err(|err| translate(err, ""))? {
            let bytes = match self.store.read(&id) {
                Ok(bytes) => bytes,
                Err(StoreError::NotFound(_)) => {
                    debug!(record_id = %id, "record vanished during enumeration");
                    continue;
                }
                Err(err) => return Err(translate(err, "")),
            };
            let alias = StoredRecord::read_alias(&bytes)?;
            if RecordId::for_alias(&alias) != id {
                return Err(KeystashError::SecureStorage(format!(
                    "Record {} carries a mismatched alias header",
                    id
                )));
            }
            aliases.insert(alias);
        }
        Ok(aliases)
    }

    fn seal_record(&self, alias: &str, data: &[u8], metadata: Metadata) -> Result<Vec<u8>> {
        let sealed = SealedItem {
            data: data.to_vec(),
            metadata,
            created_at: Utc::now(),
        };
        let plaintext = serde_json::to_vec(&sealed)
            .map_err(|e| KeystashError::Crypto(format!("Failed to encode item: {}", e)))?;
        let aad = associated_data(&self.namespace, alias);
        let envelope = crypto::seal(&self.secret, &plaintext, &aad)?;

        StoredRecord {
            alias: alias.to_string(),
            envelope,
        }
        .to_bytes()
    }
}

impl<S> std::fmt::Debug for SecureStorage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorage")
            .field("namespace", &self.namespace)
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

fn validate_alias(alias: &str) -> Result<RecordId> {
    if alias.is_empty() {
        return Err(KeystashError::InvalidInput(
            "Alias cannot be empty".to_string(),
        ));
    }
    if alias.len() > MAX_ALIAS_LENGTH {
        return Err(KeystashError::InvalidInput(format!(
            "Alias exceeds {} bytes",
            MAX_ALIAS_LENGTH
        )));
    }
    Ok(RecordId::for_alias(alias))
}

fn translate(err: StoreError, alias: &str) -> KeystashError {
    match err {
        StoreError::AlreadyExists(_) => KeystashError::DuplicateKey(alias.to_string()),
        StoreError::NotFound(_) => KeystashError::KeyNotFound(alias.to_string()),
        StoreError::Io { source } => KeystashError::Io { source },
    }
}
