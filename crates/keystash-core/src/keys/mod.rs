//! Private keys: pluggable exporters and typed key storage.

pub mod exporter;
pub mod private;

pub use exporter::{Ed25519Exporter, Ed25519PrivateKey, Fingerprint, KeyExporter};
pub use private::PrivateKeyStorage;
