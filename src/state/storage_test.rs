use super::*;
use tokio::time::{Duration, timeout};

async fn next_event(events: &mut StorageEvents) -> StorageEvent {
    let update = timeout(Duration::from_millis(500), events.recv())
        .await
        .expect("storage event timed out")
        .expect("storage closed");
    match update {
        StorageUpdate::Changed(event) => event,
        StorageUpdate::Lagged(skipped) => panic!("unexpected lag of {skipped} events"),
    }
}

async fn assert_no_event(events: &mut StorageEvents) {
    assert!(
        timeout(Duration::from_millis(50), events.recv()).await.is_err(),
        "expected no storage event"
    );
}

// =============================================================================
// Basic key-value semantics
// =============================================================================

#[test]
fn set_then_get_returns_value() {
    let tab = SharedStorage::in_memory().context();
    tab.set_item("k", "v").unwrap();
    assert_eq!(tab.get_item("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn get_missing_key_is_none() {
    let tab = SharedStorage::in_memory().context();
    assert_eq!(tab.get_item("missing").unwrap(), None);
}

#[test]
fn set_overwrites_prior_value() {
    let tab = SharedStorage::in_memory().context();
    tab.set_item("k", "one").unwrap();
    tab.set_item("k", "two").unwrap();
    assert_eq!(tab.get_item("k").unwrap().as_deref(), Some("two"));
}

#[test]
fn remove_deletes_value() {
    let tab = SharedStorage::in_memory().context();
    tab.set_item("k", "v").unwrap();
    tab.remove_item("k").unwrap();
    assert_eq!(tab.get_item("k").unwrap(), None);
}

#[test]
fn writes_are_visible_across_contexts() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let b = storage.context();
    a.set_item("k", "v").unwrap();
    assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
}

#[test]
fn contexts_have_distinct_ids() {
    let storage = SharedStorage::in_memory();
    assert_ne!(storage.context().id(), storage.context().id());
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn other_context_receives_set_event() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let b = storage.context();
    let mut events = b.subscribe();

    a.set_item("auth_token", "abc").unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event.key.as_deref(), Some("auth_token"));
    assert_eq!(event.old_value, None);
    assert_eq!(event.new_value.as_deref(), Some("abc"));
    assert_eq!(event.source, a.id());
}

#[tokio::test]
async fn other_context_receives_remove_event() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let b = storage.context();
    a.set_item("auth_token", "abc").unwrap();
    let mut events = b.subscribe();

    a.remove_item("auth_token").unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event.key.as_deref(), Some("auth_token"));
    assert_eq!(event.old_value.as_deref(), Some("abc"));
    assert_eq!(event.new_value, None);
}

#[tokio::test]
async fn own_changes_are_not_delivered() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let mut events = a.subscribe();

    a.set_item("k", "v").unwrap();
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn unchanged_set_emits_nothing() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let b = storage.context();
    a.set_item("k", "v").unwrap();
    let mut events = b.subscribe();

    a.set_item("k", "v").unwrap();
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn removing_absent_key_emits_nothing() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let mut events = storage.context().subscribe();

    a.remove_item("never-set").unwrap();
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn clear_emits_keyless_event() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    a.set_item("x", "1").unwrap();
    a.set_item("y", "2").unwrap();
    let mut events = storage.context().subscribe();

    a.clear().unwrap();

    let event = next_event(&mut events).await;
    assert_eq!(event.key, None);
    assert_eq!(a.get_item("x").unwrap(), None);
    assert_eq!(a.get_item("y").unwrap(), None);
}

#[tokio::test]
async fn clearing_empty_storage_emits_nothing() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let mut events = storage.context().subscribe();

    a.clear().unwrap();
    assert_no_event(&mut events).await;
}

#[tokio::test]
async fn burst_past_capacity_reports_lag_then_resumes() {
    let storage = SharedStorage::in_memory();
    let a = storage.context();
    let mut events = storage.context().subscribe();

    let burst = EVENT_CAPACITY + 36;
    for i in 0..burst {
        a.set_item(&format!("k{i}"), "v").unwrap();
    }

    let update = timeout(Duration::from_millis(500), events.recv()).await.unwrap().unwrap();
    assert_eq!(update, StorageUpdate::Lagged(36));

    let first_kept = next_event(&mut events).await;
    assert_eq!(first_kept.key.as_deref(), Some("k36"));
}

// =============================================================================
// File backing
// =============================================================================

#[test]
fn open_missing_file_starts_empty_without_creating_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let storage = SharedStorage::open(&path).unwrap();

    assert_eq!(storage.context().get_item("auth_token").unwrap(), None);
    assert!(!path.exists());
    assert_eq!(storage.path(), Some(path.as_path()));
}

#[test]
fn file_storage_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    let first = SharedStorage::open(&path).unwrap();
    first.context().set_item("auth_token", "abc123").unwrap();
    drop(first);

    let second = SharedStorage::open(&path).unwrap();
    assert_eq!(second.context().get_item("auth_token").unwrap().as_deref(), Some("abc123"));
}

#[test]
fn file_storage_reflects_removal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = SharedStorage::open(&path).unwrap();
    let tab = storage.context();
    tab.set_item("auth_token", "abc123").unwrap();
    tab.remove_item("auth_token").unwrap();

    let reopened = SharedStorage::open(&path).unwrap();
    assert_eq!(reopened.context().get_item("auth_token").unwrap(), None);
}

#[test]
fn empty_file_loads_as_empty_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "  \n").unwrap();

    let storage = SharedStorage::open(&path).unwrap();
    assert_eq!(storage.context().get_item("anything").unwrap(), None);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(matches!(SharedStorage::open(&path), Err(StorageError::Parse { .. })));
}

#[cfg(unix)]
#[test]
fn file_is_written_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    SharedStorage::open(&path).unwrap().context().set_item("k", "v").unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
