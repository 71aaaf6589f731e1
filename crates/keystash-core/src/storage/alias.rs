//! Alias codec: caller aliases to filesystem-safe record identifiers.
//!
//! Aliases are arbitrary strings and are never used as path components.
//! Each alias maps to the lowercase hex SHA-256 of a domain tag followed by
//! the alias bytes. The mapping is one-way; aliases are recovered from the
//! record header, not by decoding the identifier.

use std::fmt;

use sha2::{Digest, Sha256};

use super::types::StorageNamespace;

const ALIAS_TAG: &[u8] = b"keystash.alias.v1\0";
const NAMESPACE_TAG: &[u8] = b"keystash.namespace-dir.v1\0";

/// Hex characters in an identifier.
pub const RECORD_ID_LENGTH: usize = 64;

/// Filesystem-safe identifier of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

fn tagged_digest(tag: &[u8], value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tag);
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

impl RecordId {
    /// Encode an alias.
    pub fn for_alias(alias: &str) -> Self {
        Self(tagged_digest(ALIAS_TAG, alias))
    }

    /// Validate an identifier read back from storage (e.g. a file stem).
    pub fn parse(value: &str) -> Option<Self> {
        let valid = value.len() == RECORD_ID_LENGTH
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory name holding one namespace's records.
pub fn namespace_dir_name(namespace: &StorageNamespace) -> String {
    format!("ns-{}", tagged_digest(NAMESPACE_TAG, namespace.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(RecordId::for_alias("alice"), RecordId::for_alias("alice"));
    }

    #[test]
    fn test_distinct_aliases_distinct_ids() {
        let aliases = ["alice", "Alice", "alice ", "", "a/b", "a\\b", "..", "a:b"];
        let mut ids: Vec<_> = aliases.iter().map(|a| RecordId::for_alias(a)).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), aliases.len());
    }

    #[test]
    fn test_ids_are_path_safe() {
        for alias in ["../../etc/passwd", "dd\\lllll\\aaa", "CON", "名前", "a\0b"] {
            let id = RecordId::for_alias(alias);
            assert_eq!(id.as_str().len(), RECORD_ID_LENGTH);
            assert!(id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_parse_round_trips_encoded_ids() {
        let id = RecordId::for_alias("bob");
        assert_eq!(RecordId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        assert!(RecordId::parse("notes").is_none());
        assert!(RecordId::parse(&"A".repeat(RECORD_ID_LENGTH)).is_none());
        assert!(RecordId::parse(&"0".repeat(RECORD_ID_LENGTH + 1)).is_none());
    }

    #[test]
    fn test_namespace_dir_differs_from_alias_id() {
        let ns = StorageNamespace::new("alice").unwrap();
        let dir = namespace_dir_name(&ns);
        assert!(dir.starts_with("ns-"));
        assert!(!dir.ends_with(RecordId::for_alias("alice").as_str()));
    }
}
