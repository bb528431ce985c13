use std::fs;
use std::sync::Arc;

use anyhow::Result;
use nds_config::{ConfigError, FileTokenStore, TokenStore};
use serde_json::{Value, json};

#[test]
fn file_store_persists_across_instances() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("storage.json");

    let first = FileTokenStore::new(&path);
    assert!(first.get().is_none());
    first.set("manual-token")?;

    let reopened = FileTokenStore::new(&path);
    assert_eq!(reopened.get().as_deref(), Some("manual-token"));
    Ok(())
}

#[test]
fn file_store_keeps_unrelated_keys() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    fs::write(&path, r#"{"theme":"dark","token":"old"}"#)?;

    let store = FileTokenStore::new(&path);
    store.set("new")?;
    let doc: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(doc, json!({"theme": "dark", "token": "new"}));

    store.clear()?;
    let doc: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(doc, json!({"theme": "dark"}));
    assert!(store.get().is_none());
    Ok(())
}

#[test]
fn clearing_missing_storage_is_a_no_op() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.json");
    let store = FileTokenStore::new(&path);
    store.clear()?;
    assert!(!path.exists());
    Ok(())
}

#[test]
fn corrupt_storage_reads_as_empty_and_is_replaced_on_set() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    fs::write(&path, "{not json")?;

    let store = FileTokenStore::new(&path);
    assert!(store.get().is_none());
    store.set("token")?;
    assert_eq!(store.get().as_deref(), Some("token"));
    let doc: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(doc, json!({"token": "token"}));
    Ok(())
}

#[test]
fn clearing_corrupt_storage_leaves_an_empty_area() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    fs::write(&path, "[1, 2, 3]")?;

    let store = FileTokenStore::new(&path);
    store.clear()?;
    let doc: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(doc, json!({}));
    assert!(store.get().is_none());
    Ok(())
}

#[test]
fn file_store_keeps_surrounding_whitespace() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = FileTokenStore::new(dir.path().join("storage.json"));
    assert!(matches!(store.set(""), Err(ConfigError::EmptyToken)));
    store.set(" padded ")?;
    assert_eq!(store.get().as_deref(), Some(" padded "));
    Ok(())
}

#[test]
fn shared_store_is_visible_through_trait_objects() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(dir.path().join("s.json")));
    let reader = Arc::clone(&store);

    store.set("shared")?;
    assert!(reader.has_token());
    store.clear()?;
    assert!(!reader.has_token());
    Ok(())
}
