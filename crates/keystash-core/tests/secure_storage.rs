use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;
use std::thread;

use keystash_core::config::StorageConfig;
use keystash_core::crypto::KdfParams;
use keystash_core::storage::{Metadata, RecordId, SecureStorage, StorageNamespace};
use keystash_core::KeystashError;
use tempfile::TempDir;

fn config(dir: &TempDir, namespace: &str) -> StorageConfig {
    StorageConfig::new(dir.path(), StorageNamespace::new(namespace).unwrap())
        .with_kdf(KdfParams::new(1024, 1, 1).unwrap())
}

fn open(dir: &TempDir, password: &str) -> SecureStorage {
    SecureStorage::from_config(&config(dir, "integration"), password)
        .expect("open should succeed")
}

fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_example_scenario() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "Tr0ub4dor&3");
    let data: Vec<u8> = (1..=32).collect();

    storage.save("alice", &data, None).expect("save should succeed");
    let (loaded, _) = storage.load("alice").expect("load should succeed");
    assert_eq!(loaded, data);

    storage.delete("alice").expect("delete should succeed");
    assert!(matches!(
        storage.load("alice"),
        Err(KeystashError::KeyNotFound(alias)) if alias == "alice"
    ));
}

#[test]
fn test_round_trip_with_metadata() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");
    let meta = metadata(&[("device", "laptop"), ("created-by", "tests"), ("", "empty key")]);

    for (alias, payload) in [
        ("plain", vec![0u8; 0]),
        ("with/slash", vec![1, 2, 3]),
        ("dd\\lllll\\aaa", vec![255; 1024]),
        ("ünïcødé", b"text".to_vec()),
    ] {
        storage.save(alias, &payload, Some(meta.clone())).unwrap();
        let (data, loaded_meta) = storage.load(alias).unwrap();
        assert_eq!(data, payload, "payload for {}", alias);
        assert_eq!(loaded_meta, meta, "metadata for {}", alias);
    }
}

#[test]
fn test_persists_between_sessions() {
    let temp = TempDir::new().unwrap();
    let data = [42u8; 32];

    {
        let storage = open(&temp, "password");
        storage.save("persistent", &data, None).unwrap();
    }

    let storage2 = open(&temp, "password");
    assert_eq!(storage2.load("persistent").unwrap().0, data);
    assert!(storage2.exists("persistent"));
}

#[test]
fn test_concurrent_instances_see_each_other() {
    let temp = TempDir::new().unwrap();
    let first = open(&temp, "password");
    let second = open(&temp, "password");

    first.save("shared", b"v1", None).unwrap();
    assert_eq!(second.load("shared").unwrap().0, b"v1");

    second.delete("shared").unwrap();
    assert!(!first.exists("shared"));
    assert!(first.aliases().unwrap().is_empty());
}

#[test]
fn test_duplicate_rejected_and_original_kept() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");

    storage.save("key", b"original", None).unwrap();
    let result = storage.save("key", b"overwrite attempt", None);

    assert!(matches!(result, Err(KeystashError::DuplicateKey(alias)) if alias == "key"));
    assert_eq!(storage.load("key").unwrap().0, b"original");
}

#[test]
fn test_missing_alias_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");

    assert!(matches!(
        storage.load("never-saved"),
        Err(KeystashError::KeyNotFound(_))
    ));
    assert!(matches!(
        storage.delete("never-saved"),
        Err(KeystashError::KeyNotFound(_))
    ));
    assert!(!storage.exists("never-saved"));
}

#[test]
fn test_wrong_password_is_integrity_error() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "correct-password");
    storage.save("secret", &[9u8; 32], None).unwrap();

    let other = open(&temp, "wrong-password");
    let result = other.load("secret");

    assert!(matches!(result, Err(KeystashError::SecureStorage(_))));
    // Existence and listing do not depend on the password.
    assert!(other.exists("secret"));
    assert!(other.aliases().unwrap().contains("secret"));
}

#[test]
fn test_corrupted_record_is_integrity_error() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");
    storage.save("victim", &[1u8; 32], None).unwrap();

    let ns_dir = fs::read_dir(temp.path()).unwrap().next().unwrap().unwrap().path();
    let path = ns_dir.join(format!("{}.rec", RecordId::for_alias("victim")));
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, bytes).unwrap();

    let err = storage.load("victim").unwrap_err();
    assert!(err.is_integrity_failure());
    assert!(!err.is_not_found());
}

#[test]
fn test_truncated_record_is_integrity_error() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");
    storage.save("victim", &[1u8; 32], None).unwrap();

    let ns_dir = fs::read_dir(temp.path()).unwrap().next().unwrap().unwrap().path();
    let path = ns_dir.join(format!("{}.rec", RecordId::for_alias("victim")));
    fs::write(&path, b"").unwrap();

    assert!(matches!(
        storage.load("victim"),
        Err(KeystashError::SecureStorage(_))
    ));
}

#[test]
fn test_aliases_reflect_latest_state() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");
    assert!(storage.aliases().unwrap().is_empty());

    storage.save("k1", b"1", None).unwrap();
    storage.save("k2", b"2", None).unwrap();
    let expected: BTreeSet<String> = ["k1", "k2"].iter().map(|s| s.to_string()).collect();
    assert_eq!(storage.aliases().unwrap(), expected);

    storage.delete("k1").unwrap();
    let expected: BTreeSet<String> = ["k2"].iter().map(|s| s.to_string()).collect();
    assert_eq!(storage.aliases().unwrap(), expected);
}

#[test]
fn test_namespaces_are_isolated() {
    let temp = TempDir::new().unwrap();
    let app_a = SecureStorage::from_config(&config(&temp, "app-a"), "password").unwrap();
    let app_b = SecureStorage::from_config(&config(&temp, "app-b"), "password").unwrap();

    app_a.save("shared-name", b"from a", None).unwrap();

    assert!(!app_b.exists("shared-name"));
    assert!(app_b.aliases().unwrap().is_empty());
    app_b.save("shared-name", b"from b", None).unwrap();
    assert_eq!(app_a.load("shared-name").unwrap().0, b"from a");
    assert_eq!(app_b.load("shared-name").unwrap().0, b"from b");
}

#[test]
fn test_payload_and_metadata_not_on_disk_in_cleartext() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");
    let meta = metadata(&[("note", "METADATA_MARKER_123")]);

    storage
        .save("alias", b"PAYLOAD_MARKER_456", Some(meta))
        .unwrap();

    for ns_dir in fs::read_dir(temp.path()).unwrap() {
        for entry in fs::read_dir(ns_dir.unwrap().path()).unwrap() {
            let on_disk = fs::read(entry.unwrap().path()).unwrap();
            let haystack = String::from_utf8_lossy(&on_disk);
            assert!(!haystack.contains("METADATA_MARKER_123"));
            assert!(!haystack.contains("PAYLOAD_MARKER_456"));
            assert!(!haystack.contains(&hex::encode("PAYLOAD_MARKER_456")));
        }
    }
}

#[test]
fn test_record_moved_between_namespaces_fails() {
    let temp = TempDir::new().unwrap();
    let app_a = SecureStorage::from_config(&config(&temp, "app-a"), "password").unwrap();
    let app_b = SecureStorage::from_config(&config(&temp, "app-b"), "password").unwrap();
    app_a.save("k", b"secret", None).unwrap();
    app_b.save("k", b"other", None).unwrap();

    let file_name = format!("{}.rec", RecordId::for_alias("k"));
    let dirs: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(dirs.len(), 2);
    fs::copy(dirs[0].join(&file_name), dirs[1].join(&file_name)).unwrap();

    // Whichever namespace received the foreign record must reject it.
    let a_ok = app_a.load("k").is_ok();
    let b_ok = app_b.load("k").is_ok();
    assert!(a_ok != b_ok);
}

#[test]
fn test_concurrent_save_same_alias_single_winner() {
    let temp = TempDir::new().unwrap();
    let storage = Arc::new(open(&temp, "password"));

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || storage.save("contended", &[i; 16], None))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(KeystashError::DuplicateKey(_))))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(duplicates, 7);

    let (data, _) = storage.load("contended").unwrap();
    assert_eq!(data.len(), 16);
    assert!(data.iter().all(|b| *b == data[0]));
}

#[test]
fn test_concurrent_delete_and_load() {
    let temp = TempDir::new().unwrap();
    let storage = Arc::new(open(&temp, "password"));
    for i in 0..20 {
        storage.save(&format!("k{}", i), &[7u8; 64], None).unwrap();
    }

    let deleter = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || {
            for i in 0..20 {
                storage.delete(&format!("k{}", i)).unwrap();
            }
        })
    };
    for i in 0..20 {
        match storage.load(&format!("k{}", i)) {
            Ok((data, _)) => assert_eq!(data, vec![7u8; 64]),
            Err(KeystashError::KeyNotFound(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    deleter.join().unwrap();
    assert!(storage.aliases().unwrap().is_empty());
}

#[test]
fn test_replace_is_explicit() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp, "password");
    storage
        .save("rotating", b"v1", Some(metadata(&[("gen", "1")])))
        .unwrap();

    storage
        .replace("rotating", b"v2", Some(metadata(&[("gen", "2")])))
        .unwrap();

    let (data, meta) = storage.load("rotating").unwrap();
    assert_eq!(data, b"v2");
    assert_eq!(meta.get("gen").map(String::as_str), Some("2"));
    assert_eq!(storage.aliases().unwrap().len(), 1);
}

#[test]
fn test_open_with_default_kdf() {
    let temp = TempDir::new().unwrap();
    let storage = SecureStorage::open(
        temp.path(),
        StorageNamespace::new("default-kdf").unwrap(),
        "Tr0ub4dor&3",
    )
    .unwrap();

    storage.save("k", b"v", None).unwrap();
    assert_eq!(storage.load("k").unwrap().0, b"v");
}

#[test]
fn test_config_file_drives_storage() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("keystash.toml");
    config(&temp, "from-file").write(&path).unwrap();

    let loaded = StorageConfig::read(&path).unwrap();
    let storage = SecureStorage::from_config(&loaded, "password").unwrap();
    storage.save("k", b"v", None).unwrap();

    assert_eq!(storage.namespace().as_str(), "from-file");
    let again = SecureStorage::from_config(&loaded, "password").unwrap();
    assert_eq!(again.load("k").unwrap().0, b"v");
}
