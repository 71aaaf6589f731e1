//! On-disk framing of one record.
//!
//! ```text
//! "KSTR" | version u8 | alias_len u16 BE | alias | nonce (12) | ciphertext + tag
//! ```
//!
//! The alias header is readable without the password so that listing a
//! namespace never needs to decrypt anything. It is authenticated through
//! the associated data of the envelope.

use crate::crypto::envelope::{EncryptedRecord, FORMAT_VERSION, NONCE_LENGTH};
use crate::error::{KeystashError, Result};

use super::types::StorageNamespace;

/// Longest alias, in UTF-8 bytes, that fits the `u16` length prefix.
pub const MAX_ALIAS_LENGTH: usize = u16::MAX as usize;

const MAGIC: &[u8; 4] = b"KSTR";
const AAD_TAG: &[u8] = b"keystash.record.v1\0";
const HEADER_FIXED: usize = MAGIC.len() + 1 + 2;

/// Alias header plus sealed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub alias: String,
    pub envelope: EncryptedRecord,
}

fn corrupt(reason: &str) -> KeystashError {
    KeystashError::SecureStorage(format!("Corrupted record: {}", reason))
}

impl StoredRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let alias = self.alias.as_bytes();
        let alias_len: u16 = alias
            .len()
            .try_into()
            .map_err(|_| {
                KeystashError::InvalidInput(format!(
                    "Alias exceeds {} bytes",
                    MAX_ALIAS_LENGTH
                ))
            })?;

        let mut out = Vec::with_capacity(
            HEADER_FIXED + alias.len() + NONCE_LENGTH + self.envelope.ciphertext.len(),
        );
        out.extend_from_slice(MAGIC);
        out.push(self.envelope.version);
        out.extend_from_slice(&alias_len.to_be_bytes());
        out.extend_from_slice(alias);
        out.extend_from_slice(&self.envelope.nonce);
        out.extend_from_slice(&self.envelope.ciphertext);
        Ok(out)
    }

    /// Parse the alias header only.
    pub fn read_alias(bytes: &[u8]) -> Result<String> {
        let (alias, _, _) = Self::split_header(bytes)?;
        Ok(alias)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (alias, version, rest) = Self::split_header(bytes)?;
        if rest.len() < NONCE_LENGTH {
            return Err(corrupt("truncated nonce"));
        }
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LENGTH);
        let mut nonce = [0u8; NONCE_LENGTH];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            alias,
            envelope: EncryptedRecord {
                version,
                nonce,
                ciphertext: ciphertext.to_vec(),
            },
        })
    }

    fn split_header(bytes: &[u8]) -> Result<(String, u8, &[u8])> {
        if bytes.len() < HEADER_FIXED {
            return Err(corrupt("truncated header"));
        }
        if &bytes[..MAGIC.len()] != MAGIC {
            return Err(corrupt("bad magic"));
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(KeystashError::SecureStorage(format!(
                "Unsupported record format version {}",
                version
            )));
        }
        let alias_len =
            u16::from_be_bytes([bytes[MAGIC.len() + 1], bytes[MAGIC.len() + 2]]) as usize;
        let rest = &bytes[HEADER_FIXED..];
        if rest.len() < alias_len {
            return Err(corrupt("truncated alias"));
        }
        let (alias, rest) = rest.split_at(alias_len);
        let alias = String::from_utf8(alias.to_vec()).map_err(|_| corrupt("alias not UTF-8"))?;
        Ok((alias, version, rest))
    }
}

/// Associated data binding a record to its namespace and alias.
pub fn associated_data(namespace: &StorageNamespace, alias: &str) -> Vec<u8> {
    let ns = namespace.as_str().as_bytes();
    let alias = alias.as_bytes();
    let mut aad = Vec::with_capacity(AAD_TAG.len() + 8 + ns.len() + alias.len());
    aad.extend_from_slice(AAD_TAG);
    aad.extend_from_slice(&(ns.len() as u32).to_be_bytes());
    aad.extend_from_slice(ns);
    aad.extend_from_slice(&(alias.len() as u32).to_be_bytes());
    aad.extend_from_slice(alias);
    aad
}
