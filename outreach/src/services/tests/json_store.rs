//! Tests for the JSON snapshot repository

use shared::{SlotId, SlotRef, SlotStatus};
use tempfile::TempDir;

use super::common::every_status_store;
use crate::error::OutreachError;
use crate::services::json_store::RealContactRepository;
use crate::state::ContactStore;
use crate::traits::ContactRepository;

fn repository_in(dir: &TempDir) -> RealContactRepository {
    RealContactRepository::new(dir.path().join("contacts.json"))
}

/// Every status survives a save and reload
#[tokio::test]
async fn test_round_trip_preserves_statuses() {
    let dir = TempDir::new().unwrap();
    let repository = repository_in(&dir);
    let store = every_status_store();

    repository.save(&store).await.unwrap();
    let reloaded = repository.load().await.unwrap();

    assert_eq!(reloaded, store);
    for status in SlotStatus::ALL {
        assert!(
            reloaded.slots().any(|(_, slot)| slot.status == status),
            "status {status} lost in round trip"
        );
    }
}

#[tokio::test]
async fn test_missing_store_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = repository_in(&dir).load().await.unwrap_err();
    assert!(matches!(err, OutreachError::StoreNotFound { .. }));
}

#[tokio::test]
async fn test_garbage_store_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let repository = repository_in(&dir);
    tokio::fs::write(repository.path(), b"{ not json").await.unwrap();

    let err = repository.load().await.unwrap_err();
    assert!(matches!(err, OutreachError::StoreCorrupt { .. }));
}

#[tokio::test]
async fn test_unknown_version_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let repository = repository_in(&dir);
    let raw = r#"{"version": 99, "saved_at": "2026-01-01T10:00:00+00:00", "rows": []}"#;
    tokio::fs::write(repository.path(), raw).await.unwrap();

    let err = repository.load().await.unwrap_err();
    assert!(matches!(err, OutreachError::StoreCorrupt { ref message, .. } if message.contains("99")));
}

/// Saving replaces the snapshot wholesale and leaves no temp file behind
#[tokio::test]
async fn test_save_overwrites_without_leftovers() {
    let dir = TempDir::new().unwrap();
    let repository = repository_in(&dir);
    let mut store = every_status_store();
    repository.save(&store).await.unwrap();

    store
        .transition(SlotRef::new(1, SlotId::Hr2), SlotStatus::Sent)
        .unwrap();
    repository.save(&store).await.unwrap();

    let reloaded = repository.load().await.unwrap();
    assert_eq!(
        reloaded.slot(SlotRef::new(1, SlotId::Hr2)).unwrap().status,
        SlotStatus::Sent
    );

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["contacts.json".to_string()]);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let repository = RealContactRepository::new(dir.path().join("state").join("contacts.json"));
    repository.save(&ContactStore::default()).await.unwrap();
    assert!(repository.exists().await);
}

#[tokio::test]
async fn test_create_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let repository = repository_in(&dir);
    repository.create(&every_status_store(), false).await.unwrap();

    let err = repository
        .create(&ContactStore::default(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, OutreachError::StoreExists { .. }));

    repository.create(&ContactStore::default(), true).await.unwrap();
    assert!(repository.load().await.unwrap().is_empty());
}
