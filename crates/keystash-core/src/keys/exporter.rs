//! Private key exporters.
//!
//! An exporter turns a typed private key into opaque bytes and back. The
//! storage layer only ever sees those bytes, so changing the key format
//! means swapping the exporter, not touching storage.

use ed25519_dalek::{SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::error::{KeystashError, Result};

/// Serializer/deserializer between a private key type and bytes.
pub trait KeyExporter {
    type Key;

    fn export_key(&self, key: &Self::Key) -> Result<Vec<u8>>;

    fn import_key(&self, bytes: &[u8]) -> Result<Self::Key>;
}

/// How a key identifier is computed from the public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fingerprint {
    /// First 8 bytes of SHA-512 of the public key.
    #[default]
    Sha512Truncated,
    /// Full SHA-256 of the public key (older key identifiers).
    Sha256,
}

impl Fingerprint {
    pub fn compute(&self, public_key: &VerifyingKey) -> Vec<u8> {
        let bytes = public_key.as_bytes();
        match self {
            Fingerprint::Sha512Truncated => Sha512::digest(bytes)[..8].to_vec(),
            Fingerprint::Sha256 => Sha256::digest(bytes).to_vec(),
        }
    }
}

/// An Ed25519 private key with its identifier.
#[derive(Clone)]
pub struct Ed25519PrivateKey {
    id: Vec<u8>,
    signing_key: SigningKey,
}

impl Ed25519PrivateKey {
    pub fn generate(fingerprint: Fingerprint) -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng), fingerprint)
    }

    pub fn from_signing_key(signing_key: SigningKey, fingerprint: Fingerprint) -> Self {
        let id = fingerprint.compute(&signing_key.verifying_key());
        Self { id, signing_key }
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// The 32-byte secret seed.
    pub fn raw_key(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for Ed25519PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519PrivateKey")
            .field("id", &hex::encode(&self.id))
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Exports Ed25519 keys as their 32-byte seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Exporter {
    fingerprint: Fingerprint,
}

impl Ed25519Exporter {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self { fingerprint }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

impl KeyExporter for Ed25519Exporter {
    type Key = Ed25519PrivateKey;

    fn export_key(&self, key: &Ed25519PrivateKey) -> Result<Vec<u8>> {
        Ok(key.raw_key().to_vec())
    }

    fn import_key(&self, bytes: &[u8]) -> Result<Ed25519PrivateKey> {
        let seed: [u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            KeystashError::InvalidKey(format!(
                "Expected {} bytes for Ed25519 secret key, got {}",
                SECRET_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        let seed = Zeroizing::new(seed);
        Ok(Ed25519PrivateKey::from_signing_key(
            SigningKey::from_bytes(&seed),
            self.fingerprint,
        ))
    }
}
