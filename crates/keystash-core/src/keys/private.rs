//! Typed private key storage on top of [`SecureStorage`].

use std::collections::BTreeSet;

use tracing::debug;
use zeroize::Zeroizing;

use super::exporter::KeyExporter;
use crate::error::Result;
use crate::storage::{FileItemStore, ItemStore, LegacyKeyReader, Metadata, SecureStorage};

/// Stores private keys by exporting them to bytes first.
///
/// Holds no state of its own beyond the exporter and the wrapped storage.
pub struct PrivateKeyStorage<E, S = FileItemStore> {
    exporter: E,
    storage: SecureStorage<S>,
}

impl<E: KeyExporter, S: ItemStore> PrivateKeyStorage<E, S> {
    pub fn new(exporter: E, storage: SecureStorage<S>) -> Self {
        Self { exporter, storage }
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn storage(&self) -> &SecureStorage<S> {
        &self.storage
    }

    pub fn into_inner(self) -> (E, SecureStorage<S>) {
        (self.exporter, self.storage)
    }

    /// Export `key` and save it under `alias`.
    ///
    /// Fails with `KeystashError::DuplicateKey` exactly like
    /// [`SecureStorage::save`].
    pub fn store(&self, key: &E::Key, alias: &str, metadata: Option<Metadata>) -> Result<()> {
        let bytes = Zeroizing::new(self.exporter.export_key(key)?);
        self.storage.save(alias, &bytes, metadata)
    }

    /// Load and import the key stored under `alias`.
    pub fn load(&self, alias: &str) -> Result<(E::Key, Metadata)> {
        let (bytes, metadata) = self.storage.load(alias)?;
        let bytes = Zeroizing::new(bytes);
        let key = self.exporter.import_key(&bytes)?;
        Ok((key, metadata))
    }

    pub fn delete(&self, alias: &str) -> Result<()> {
        self.storage.delete(alias)
    }

    pub fn exists(&self, alias: &str) -> bool {
        self.storage.exists(alias)
    }

    pub fn aliases(&self) -> Result<BTreeSet<String>> {
        self.storage.aliases()
    }

    /// Re-store one legacy key under `alias` in the current format.
    ///
    /// The legacy bytes go through this storage's exporter, so a key that
    /// does not import cleanly is rejected before anything is written.
    pub fn migrate_legacy(
        &self,
        reader: &LegacyKeyReader,
        legacy_alias: &str,
        alias: &str,
    ) -> Result<E::Key> {
        let (raw, metadata) = reader.load(legacy_alias)?;
        let raw = Zeroizing::new(raw);
        let key = self.exporter.import_key(&raw)?;
        self.store(&key, alias, Some(metadata))?;
        debug!(namespace = %self.storage.namespace(), "legacy key migrated");
        Ok(key)
    }
}
