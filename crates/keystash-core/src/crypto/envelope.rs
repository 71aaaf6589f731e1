//! Authenticated encryption of item payloads with AES-256-GCM.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the OS RNG. The
//! caller supplies associated data that binds the ciphertext to the place it
//! is stored, so a record copied to another alias or namespace will not
//! authenticate.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use crate::crypto::key::MasterSecret;
use crate::error::{KeystashError, Result};

/// Length of the AES-GCM nonce.
pub const NONCE_LENGTH: usize = 12;

/// Length of the AES-GCM authentication tag.
pub const TAG_LENGTH: usize = 16;

/// Current envelope version: Argon2id master secret + AES-256-GCM.
pub const FORMAT_VERSION: u8 = 1;

/// One sealed payload. `ciphertext` carries the authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    pub version: u8,
    pub nonce: [u8; NONCE_LENGTH],
    pub ciphertext: Vec<u8>,
}

fn cipher(secret: &MasterSecret) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(secret.as_bytes())
        .map_err(|e| KeystashError::Crypto(format!("Invalid key length: {}", e)))
}

/// Encrypt `plaintext` under `secret`, authenticating `aad` alongside it.
pub fn seal(secret: &MasterSecret, plaintext: &[u8], aad: &[u8]) -> Result<EncryptedRecord> {
    let mut nonce = [0u8; NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher(secret)?
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| KeystashError::Crypto(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedRecord {
        version: FORMAT_VERSION,
        nonce,
        ciphertext,
    })
}

/// Decrypt and authenticate `record`.
///
/// # Errors
///
/// Returns `KeystashError::SecureStorage` if:
/// - The record was sealed under another key (wrong password or namespace)
/// - The ciphertext, nonce or associated data were altered
/// - The format version is not recognized
pub fn open(secret: &MasterSecret, record: &EncryptedRecord, aad: &[u8]) -> Result<Vec<u8>> {
    if record.version != FORMAT_VERSION {
        return Err(KeystashError::SecureStorage(format!(
            "Unsupported record format version {}",
            record.version
        )));
    }
    if record.ciphertext.len() < TAG_LENGTH {
        return Err(KeystashError::SecureStorage(
            "Ciphertext shorter than authentication tag".to_string(),
        ));
    }

    cipher(secret)?
        .decrypt(
            Nonce::from_slice(&record.nonce),
            Payload {
                msg: &record.ciphertext,
                aad,
            },
        )
        .map_err(|_| {
            KeystashError::SecureStorage(
                "Authentication failed (wrong password or corrupted record)".to_string(),
            )
        })
}
