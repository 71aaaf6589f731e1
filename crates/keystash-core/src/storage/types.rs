//! Core data types for the storage layer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KeystashError, Result};

/// Free-form string metadata stored (encrypted) next to a payload.
pub type Metadata = BTreeMap<String, String>;

/// Logical storage area. Scopes both the on-disk directory and the
/// master-secret derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageNamespace(String);

impl StorageNamespace {
    /// Namespace used when none is configured.
    pub const DEFAULT: &'static str = "keystash.default";

    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(KeystashError::InvalidInput(
                "Storage namespace cannot be empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StorageNamespace {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for StorageNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StorageNamespace {
    type Error = KeystashError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<StorageNamespace> for String {
    fn from(value: StorageNamespace) -> Self {
        value.0
    }
}

/// A stored item as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Caller-chosen identity, unique within the namespace
    pub alias: String,

    /// Opaque payload
    pub data: Vec<u8>,

    /// Optional string metadata
    pub metadata: Metadata,

    /// When the item was first saved (or last replaced)
    pub created_at: DateTime<Utc>,
}

/// The sealed part of a record: everything except the alias header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SealedItem {
    #[serde(with = "hex")]
    pub data: Vec<u8>,

    #[serde(default)]
    pub metadata: Metadata,

    pub created_at: DateTime<Utc>,
}
