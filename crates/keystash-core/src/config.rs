//! Storage configuration.
//!
//! A `StorageConfig` names the storage root, the namespace inside it and
//! the key-derivation cost. It round-trips through TOML:
//!
//! ```toml
//! root = "/home/alice/.local/share/keystash"
//! namespace = "my-app"
//!
//! [kdf]
//! memory_kib = 65536
//! iterations = 3
//! parallelism = 1
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::error::{KeystashError, Result};
use crate::storage::StorageNamespace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub root: PathBuf,
    #[serde(default)]
    pub namespace: StorageNamespace,
    #[serde(default)]
    pub kdf: KdfParams,
}

impl StorageConfig {
    pub fn new(root: impl Into<PathBuf>, namespace: StorageNamespace) -> Self {
        Self {
            root: root.into(),
            namespace,
            kdf: KdfParams::default(),
        }
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Read a TOML config file.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            KeystashError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            KeystashError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        KdfParams::new(
            config.kdf.memory_kib,
            config.kdf.iterations,
            config.kdf.parallelism,
        )?;
        Ok(config)
    }

    /// Write this config as TOML, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                KeystashError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| KeystashError::Config(format!("TOML error: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| {
            KeystashError::Config(format!("Failed to write config {}: {}", path.display(), e))
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(default_root_dir(), StorageNamespace::default())
    }
}

/// `$XDG_DATA_HOME/keystash`, else `~/.local/share/keystash`, else a
/// directory under the system temp dir.
pub fn default_root_dir() -> PathBuf {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return PathBuf::from(value).join("keystash");
        }
    }
    match std::env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("keystash"),
        _ => std::env::temp_dir().join("keystash"),
    }
}
