//! File store round trips: draft persistence, publish/rollback as
//! append-only history, template export/import.

use serde_json::json;
use vitrine_document::{PageStatus, Section};
use vitrine_workspace::{FileStore, PageStore, StoreError};

fn store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    (dir, store)
}

fn hero() -> Section {
    Section::new("s-1", "hero").with_setting("title", json!("Hello"))
}

fn footer() -> Section {
    Section::new("s-2", "footer")
}

#[tokio::test]
async fn test_draft_survives_store_restart() {
    let (dir, store) = store();

    store.save_draft("home", vec![hero()]).await.unwrap();
    drop(store);

    // A new store over the same directory sees the saved draft
    let reopened = FileStore::new(dir.path());
    let loaded = reopened.load("home").await.unwrap();

    assert_eq!(loaded.slug, "home");
    assert_eq!(loaded.status, PageStatus::Draft);
    assert_eq!(loaded.sections.len(), 1);
    assert_eq!(loaded.sections[0].settings["title"], json!("Hello"));
}

#[tokio::test]
async fn test_load_missing_page_is_not_found() {
    let (_dir, store) = store();

    match store.load("nope").await {
        Err(StoreError::NotFound(slug)) => assert_eq!(slug, "nope"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_publish_appends_and_flips_status() {
    let (_dir, store) = store();
    store.save_draft("home", vec![hero()]).await.unwrap();

    let version = store.publish("home").await.unwrap();
    assert_eq!(version.version_index, 1);
    assert_eq!(version.sections.len(), 1);

    let loaded = store.load("home").await.unwrap();
    assert_eq!(loaded.status, PageStatus::Published);
    assert_eq!(loaded.version_history.len(), 1);
    assert_eq!(loaded.latest_version().unwrap().version_index, 1);
}

#[tokio::test]
async fn test_publish_rollback_round_trip() {
    let (_dir, store) = store();

    // Publish S1
    let s1 = vec![hero()];
    store.save_draft("home", s1.clone()).await.unwrap();
    store.publish("home").await.unwrap();

    // Publish S2
    let s2 = vec![hero(), footer()];
    store.save_draft("home", s2.clone()).await.unwrap();
    store.publish("home").await.unwrap();

    // Roll back to version 1
    let rolled = store.rollback("home", 1).await.unwrap();

    // Rollback is forward-moving: a NEW version with S1's content
    assert_eq!(rolled.version_index, 3);
    assert_eq!(rolled.sections, s1);

    let loaded = store.load("home").await.unwrap();
    assert_eq!(loaded.version_history.len(), 3);
    // Prior versions unmodified
    assert_eq!(loaded.version_history[0].sections, s1);
    assert_eq!(loaded.version_history[1].sections, s2);
    // The draft now matches the rolled-back content
    assert_eq!(loaded.sections, s1);
}

#[tokio::test]
async fn test_rollback_to_missing_version_fails_cleanly() {
    let (_dir, store) = store();
    store.save_draft("home", vec![hero()]).await.unwrap();
    store.publish("home").await.unwrap();

    match store.rollback("home", 99).await {
        Err(StoreError::VersionNotFound { slug, index }) => {
            assert_eq!(slug, "home");
            assert_eq!(index, 99);
        }
        other => panic!("expected VersionNotFound, got {:?}", other),
    }

    // No partial version was created
    let loaded = store.load("home").await.unwrap();
    assert_eq!(loaded.version_history.len(), 1);
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let (_dir, store) = store();
    store.save_draft("home", vec![hero(), footer()]).await.unwrap();

    let blob = store.export_template("home").await.unwrap();
    let imported = store.import_template(&blob, "landing", false).await.unwrap();

    assert_eq!(imported.slug, "landing");
    assert_eq!(imported.sections.len(), 2);
    assert_eq!(imported.status, PageStatus::Draft);
    // Version history stays with the source page
    assert!(imported.version_history.is_empty());
}

#[tokio::test]
async fn test_import_refuses_overwrite_without_flag() {
    let (_dir, store) = store();
    store.save_draft("home", vec![hero()]).await.unwrap();
    store.save_draft("landing", vec![footer()]).await.unwrap();

    let blob = store.export_template("home").await.unwrap();

    match store.import_template(&blob, "landing", false).await {
        Err(StoreError::AlreadyExists(slug)) => assert_eq!(slug, "landing"),
        other => panic!("expected AlreadyExists, got {:?}", other),
    }

    // With the flag the import replaces the page
    let replaced = store.import_template(&blob, "landing", true).await.unwrap();
    assert_eq!(replaced.sections[0].section_type, "hero");
}

#[tokio::test]
async fn test_import_rejects_malformed_blob() {
    let (_dir, store) = store();

    match store.import_template(b"not json", "home", false).await {
        Err(StoreError::InvalidTemplate(_)) => {}
        other => panic!("expected InvalidTemplate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_pages_is_sorted() {
    let (_dir, store) = store();
    store.save_draft("zebra", vec![]).await.unwrap();
    store.save_draft("alpha", vec![]).await.unwrap();

    assert_eq!(store.list_pages().await.unwrap(), vec!["alpha", "zebra"]);
}

#[tokio::test]
async fn test_traversal_slug_is_rejected() {
    let (_dir, store) = store();

    match store.save_draft("../escape", vec![]).await {
        Err(StoreError::InvalidSlug(_)) => {}
        other => panic!("expected InvalidSlug, got {:?}", other),
    }
}
