use super::*;

fn file_in(dir: &tempfile::TempDir) -> FileStorage {
    FileStorage::new(dir.path().join("nested").join("session.json"))
}

#[tokio::test]
async fn file_storage_missing_file_reads_none() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_in(&dir);
    assert_eq!(storage.get("auth.token").await.unwrap(), None);
}

#[tokio::test]
async fn file_storage_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    file_in(&dir).set_many(&[("a", "1"), ("b", "2")]).await.unwrap();

    let reopened = file_in(&dir);
    assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
    assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn file_storage_remove_many_drops_only_named_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_in(&dir);
    storage.set_many(&[("a", "1"), ("b", "2"), ("c", "3")]).await.unwrap();

    storage.remove_many(&["a", "b"]).await.unwrap();

    assert_eq!(storage.get("a").await.unwrap(), None);
    assert_eq!(storage.get("b").await.unwrap(), None);
    assert_eq!(storage.get("c").await.unwrap().as_deref(), Some("3"));
}

#[tokio::test]
async fn file_storage_remove_missing_key_without_file_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_in(&dir);
    storage.remove("a").await.unwrap();
    assert!(!storage.path().exists());
}

#[tokio::test]
async fn file_storage_leaves_no_tmp_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = file_in(&dir);
    storage.set("a", "1").await.unwrap();
    assert!(!tmp_path(storage.path()).exists());
    assert!(storage.path().exists());
}

#[tokio::test]
async fn file_storage_corrupt_file_errors_on_read_and_is_repaired_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();
    let storage = FileStorage::new(&path);

    let err = storage.get("a").await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));

    storage.set("a", "1").await.unwrap();
    assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn file_storage_remove_on_corrupt_file_rewrites_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "[1, 2").unwrap();
    let storage = FileStorage::new(&path);

    storage.remove_many(&["auth.token", "auth.user"]).await.unwrap();

    assert_eq!(storage.get("auth.token").await.unwrap(), None);
    let body: Entries = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn file_storage_blank_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(FileStorage::new(&path).get("a").await.unwrap(), None);
}

#[test]
fn tmp_path_appends_suffix() {
    assert_eq!(tmp_path(Path::new("/x/session.json")), PathBuf::from("/x/session.json.tmp"));
}

#[tokio::test]
async fn memory_storage_set_get_remove() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").await.unwrap();
    assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
    assert_eq!(storage.len(), 1);

    storage.remove("k").await.unwrap();
    assert!(storage.is_empty());
}
