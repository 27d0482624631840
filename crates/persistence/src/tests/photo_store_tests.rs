// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::photo_store::write_atomically;
use crate::{PersistenceError, PhotoStore};
use mutlukent_domain::PhotoFormat;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static STORE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_store() -> PhotoStore {
    let id: u64 = STORE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let root: PathBuf = std::env::temp_dir().join(format!(
        "mutlukent-photos-{}-{id}",
        std::process::id()
    ));
    PhotoStore::new(root)
}

#[test]
fn test_save_load_remove() {
    let store: PhotoStore = temp_store();
    let key: String = store.save(7, PhotoFormat::Png, b"\x89PNG").unwrap();

    assert!(key.starts_with("7/"));
    assert!(key.ends_with(".png"));

    let (bytes, format): (Vec<u8>, PhotoFormat) = store.load(&key).unwrap();
    assert_eq!(bytes, b"\x89PNG");
    assert_eq!(format, PhotoFormat::Png);

    store.remove(&key).unwrap();
    assert!(matches!(store.load(&key), Err(PersistenceError::NotFound(_))));
    // Removing twice is fine
    store.remove(&key).unwrap();

    std::fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn test_keys_are_unique_within_a_millisecond() {
    let store: PhotoStore = temp_store();
    let first: String = store.save(1, PhotoFormat::Jpeg, b"a").unwrap();
    let second: String = store.save(1, PhotoFormat::Jpeg, b"b").unwrap();
    assert_ne!(first, second);

    std::fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn test_escaping_keys_are_rejected() {
    let store: PhotoStore = temp_store();
    for key in ["../etc/passwd", "/etc/passwd", "", "1/../../x.jpg"] {
        assert!(
            matches!(store.load(key), Err(PersistenceError::PhotoStorage(_))),
            "{key}"
        );
    }
}

#[test]
fn test_save_leaves_no_temporary_file() {
    let store: PhotoStore = temp_store();
    let key: String = store.save(3, PhotoFormat::Jpeg, b"\xFF\xD8\xFF").unwrap();

    let names: Vec<String> = std::fs::read_dir(store.root().join("3"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(key.ends_with(&names[0]));

    std::fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn test_failed_write_cleans_up() {
    let store: PhotoStore = temp_store();
    // A non-empty directory at the target makes the rename fail
    let target: PathBuf = store.root().join("9").join("1.png");
    std::fs::create_dir_all(target.join("taken")).unwrap();

    let result: Result<(), PersistenceError> = write_atomically(&target, b"\x89PNG");

    assert!(result.is_err());
    assert!(target.is_dir());
    assert!(!store.root().join("9").join("1.png.tmp").exists());

    std::fs::remove_dir_all(store.root()).unwrap();
}
