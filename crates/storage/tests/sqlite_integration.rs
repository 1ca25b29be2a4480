use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteKvStore;

async fn open(name: &str) -> SqliteKvStore {
    let store = SqliteKvStore::open(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("open");
    store.migrate().await.expect("migrate");
    store
}

#[tokio::test]
async fn upsert_then_remove() {
    let store = open("memdb_kv_upsert").await;
    assert_eq!(store.get_item("kidsafe_progress").await.unwrap(), None);

    store
        .set_item("kidsafe_progress", r#"{"adventureTime":1}"#)
        .await
        .unwrap();
    store
        .set_item("kidsafe_progress", r#"{"adventureTime":2}"#)
        .await
        .unwrap();
    assert_eq!(
        store.get_item("kidsafe_progress").await.unwrap().as_deref(),
        Some(r#"{"adventureTime":2}"#)
    );

    store.remove_item("kidsafe_progress").await.unwrap();
    store.remove_item("kidsafe_progress").await.unwrap();
    assert_eq!(store.get_item("kidsafe_progress").await.unwrap(), None);
}

#[tokio::test]
async fn migrating_twice_keeps_data() {
    let store = open("memdb_kv_remigrate").await;
    store.set_item("kidsafe_version", "1.0.0").await.unwrap();
    store.migrate().await.expect("second migrate");

    assert_eq!(
        store.get_item("kidsafe_version").await.unwrap().as_deref(),
        Some("1.0.0")
    );
}

#[tokio::test]
async fn keys_are_independent() {
    let store = open("memdb_kv_keys").await;
    store.set_item("kidsafe_progress", "{}").await.unwrap();
    store.set_item("kidsafe_settings", r#"{"theme":"dark"}"#).await.unwrap();
    store.remove_item("kidsafe_progress").await.unwrap();

    assert_eq!(
        store.get_item("kidsafe_settings").await.unwrap().as_deref(),
        Some(r#"{"theme":"dark"}"#)
    );
}

#[tokio::test]
async fn storage_handle_wraps_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set_item("kidsafe_settings", "{}").await.unwrap();
    assert_eq!(
        storage.kv.get_item("kidsafe_settings").await.unwrap().as_deref(),
        Some("{}")
    );
}
