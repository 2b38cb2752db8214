use super::*;

fn temp_token_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("jobboard-test-{}", uuid::Uuid::new_v4()))
        .join("token")
}

// =============================================================
// MemoryTokenStore
// =============================================================

#[test]
fn memory_store_starts_empty() {
    assert_eq!(MemoryTokenStore::new().get(), None);
}

#[test]
fn memory_store_set_get_clear() {
    let store = MemoryTokenStore::new();
    store.set("abc").unwrap();
    assert_eq!(store.get().as_deref(), Some("abc"));
    store.set("def").unwrap();
    assert_eq!(store.get().as_deref(), Some("def"));
    store.clear().unwrap();
    assert_eq!(store.get(), None);
}

#[test]
fn memory_store_with_token_is_seeded() {
    assert_eq!(MemoryTokenStore::with_token("seed").get().as_deref(), Some("seed"));
}

// =============================================================
// FileTokenStore
// =============================================================

#[test]
fn file_store_missing_file_reads_as_empty() {
    let store = FileTokenStore::new(temp_token_path());
    assert_eq!(store.get(), None);
}

#[test]
fn file_store_creates_parent_and_persists() {
    let path = temp_token_path();
    let store = FileTokenStore::new(&path);
    store.set("tok-123").unwrap();

    assert!(path.exists());
    assert_eq!(store.get().as_deref(), Some("tok-123"));

    // A fresh handle on the same path sees the same credential.
    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.get().as_deref(), Some("tok-123"));

    store.clear().unwrap();
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_set_replaces_previous_token() {
    let path = temp_token_path();
    let store = FileTokenStore::new(&path);
    store.set("first").unwrap();
    store.set("second").unwrap();
    assert_eq!(store.get().as_deref(), Some("second"));
    assert!(!store.temp_path().exists());
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_clear_removes_file_and_is_idempotent() {
    let path = temp_token_path();
    let store = FileTokenStore::new(&path);
    store.set("tok").unwrap();
    store.clear().unwrap();
    assert!(!path.exists());
    assert_eq!(store.get(), None);
    store.clear().unwrap();
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_returns_token_exactly_as_written() {
    let path = temp_token_path();
    let store = FileTokenStore::new(&path);
    store.set(" tok \n").unwrap();
    assert_eq!(store.get().as_deref(), Some(" tok \n"));
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_existing_empty_file_is_not_absent() {
    let path = temp_token_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "").unwrap();
    assert_eq!(FileTokenStore::new(&path).get().as_deref(), Some(""));
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn empty_token_is_refused_by_every_backend() {
    let memory = MemoryTokenStore::with_token("keep");
    assert!(matches!(memory.set(""), Err(StoreError::EmptyToken)));
    assert_eq!(memory.get().as_deref(), Some("keep"));

    let path = temp_token_path();
    let file = FileTokenStore::new(&path);
    assert!(matches!(file.set(""), Err(StoreError::EmptyToken)));
    assert_eq!(file.get(), None);
    assert!(!path.exists());

    file.set("keep").unwrap();
    assert!(matches!(file.set(""), Err(StoreError::EmptyToken)));
    assert_eq!(file.get().as_deref(), Some("keep"));
    let _ = fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn file_store_set_in_relative_path_syncs_current_dir() {
    let store = FileTokenStore::new(format!("jobboard-test-{}.token", uuid::Uuid::new_v4()));
    store.set("tok").unwrap();
    assert_eq!(store.get().as_deref(), Some("tok"));
    store.clear().unwrap();
    assert!(!store.path().exists());
}

#[test]
fn temp_path_is_sibling_of_target() {
    let store = FileTokenStore::new("/var/lib/jobboard/token");
    assert_eq!(store.temp_path(), PathBuf::from("/var/lib/jobboard/token.tmp"));
}
