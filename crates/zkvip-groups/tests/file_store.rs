//! The store over on-disk records.

use std::sync::Arc;

use zkvip_core::{GroupId, TokenAmount};
use zkvip_groups::{
    AccessController, FileStorage, GroupStore, NewGroup, StorageError, StoreError, AVAILABLE_KEY,
    JOINED_KEY,
};

fn open(dir: &std::path::Path) -> Arc<GroupStore> {
    let storage = FileStorage::open(dir).unwrap();
    Arc::new(GroupStore::open(Arc::new(storage)).unwrap())
}

fn builders_sp() -> NewGroup {
    NewGroup {
        name: "Builders SP".to_string(),
        description: "Group created by you".to_string(),
        min_balance: TokenAmount::parse_decimal("0.5").unwrap(),
        avatar_tag: "bg-gradient-to-br from-pink-500 via-rose-500 to-red-500".to_string(),
    }
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open(dir.path());
        assert!(store.seed_defaults().unwrap());
        let access = AccessController::new(Arc::clone(&store));
        access.create_group_as_creator(builders_sp()).unwrap();
        store.increment_unread(&GroupId::parse("builders-sp").unwrap()).unwrap();
    }

    let store = open(dir.path());
    assert!(!store.seed_defaults().unwrap());
    let joined = store.list_joined();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].id.as_str(), "builders-sp");
    assert_eq!(joined[0].unread_count, 1);
    assert_eq!(store.list_available(true).len(), 2);
}

#[test]
fn duplicate_detected_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    open(dir.path()).create(builders_sp()).unwrap();
    let err = open(dir.path()).create(builders_sp()).unwrap_err();
    assert_eq!(
        err,
        StoreError::Duplicate(GroupId::parse("builders-sp").unwrap())
    );
}

#[test]
fn loads_records_written_by_the_web_client() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{AVAILABLE_KEY}.json")),
        r#"[
          {"id":"zk-builders","name":"ZK Builders","description":"d","minWld":0.5,
           "members":124,"avatarBg":"bg-a"},
          {"id":"ethereum-sp","name":"Ethereum São Paulo","description":"d","minWld":1,
           "members":89,"avatarBg":"bg-b"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join(format!("{JOINED_KEY}.json")),
        r#"[{"id":"ethereum-sp","name":"Ethereum São Paulo","description":"d","minWld":1,
            "members":89,"avatarBg":"bg-b","joinedAt":"2025-11-02T10:15:30.123Z",
            "lastMessage":"Welcome to the group!","lastSender":"System","unread":2}]"#,
    )
    .unwrap();

    let store = open(dir.path());
    // The interrupted move is repaired in favour of joined.
    let available: Vec<_> = store.list_available(false).into_iter().map(|g| g.id).collect();
    assert_eq!(available, vec![GroupId::parse("zk-builders").unwrap()]);
    assert_eq!(store.list_joined()[0].unread_count, 2);

    // Legacy records are rewritten in the versioned envelope on next write.
    store.clear_unread(&GroupId::parse("ethereum-sp").unwrap()).unwrap();
    let raw = std::fs::read_to_string(dir.path().join(format!("{JOINED_KEY}.json"))).unwrap();
    assert!(raw.starts_with(r#"{"groups":"#) || raw.contains(r#""version":1"#));
}

#[test]
fn corrupt_record_is_an_error_not_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{JOINED_KEY}.json")), "{not json").unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    let err = GroupStore::open(Arc::new(storage)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Storage(StorageError::Corrupt { ref key, .. }) if key == JOINED_KEY
    ));
}
