//! Directory-per-namespace, file-per-record item store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::alias::{namespace_dir_name, RecordId};
use super::traits::{ItemStore, StoreError, StoreResult};
use super::types::StorageNamespace;
use crate::fs::{create_private_dir, persist_new, rename_with_fallback, sync_dir, write_temp};

/// Extension of committed record files.
const RECORD_EXTENSION: &str = "rec";

/// Item store rooted at `<root>/<namespace-dir>/`.
#[derive(Debug, Clone)]
pub struct FileItemStore {
    dir: PathBuf,
}

impl FileItemStore {
    /// Open (creating if needed) the directory for `namespace` under `root`.
    pub fn open(root: &Path, namespace: &StorageNamespace) -> StoreResult<Self> {
        let dir = root.join(namespace_dir_name(namespace));
        create_private_dir(&dir)?;
        debug!(dir = %dir.display(), %namespace, "opened item store");
        Ok(Self { dir })
    }

    /// Directory holding this namespace's records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{}.{}", id.as_str(), RECORD_EXTENSION))
    }

    fn map_not_found(err: io::Error, id: &RecordId) -> StoreError {
        if err.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(id.clone())
        } else {
            StoreError::Io { source: err }
        }
    }
}

impl ItemStore for FileItemStore {
    fn create(&self, id: &RecordId, record: &[u8]) -> StoreResult<()> {
        let destination = self.record_path(id);
        let temp_path = write_temp(&self.dir, id.as_str(), record)?;
        persist_new(&temp_path, &destination).map_err(|err| {
            if err.kind() == io::ErrorKind::AlreadyExists {
                StoreError::AlreadyExists(id.clone())
            } else {
                StoreError::Io { source: err }
            }
        })?;
        debug!(record_id = %id, "record created");
        Ok(())
    }

    fn read(&self, id: &RecordId) -> StoreResult<Vec<u8>> {
        fs::read(self.record_path(id)).map_err(|err| Self::map_not_found(err, id))
    }

    fn replace(&self, id: &RecordId, record: &[u8]) -> StoreResult<()> {
        let destination = self.record_path(id);
        fs::metadata(&destination).map_err(|err| Self::map_not_found(err, id))?;

        let temp_path = write_temp(&self.dir, id.as_str(), record)?;
        rename_with_fallback(&temp_path, &destination)?;
        debug!(record_id = %id, "record replaced");
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> StoreResult<()> {
        fs::remove_file(self.record_path(id)).map_err(|err| Self::map_not_found(err, id))?;
        sync_dir(&self.dir)?;
        debug!(record_id = %id, "record deleted");
        Ok(())
    }

    fn contains(&self, id: &RecordId) -> StoreResult<bool> {
        match fs::metadata(self.record_path(id)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn enumerate(&self) -> StoreResult<Vec<RecordId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(RecordId::parse)
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
