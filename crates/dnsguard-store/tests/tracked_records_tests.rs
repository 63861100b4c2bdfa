use chrono::Duration;
use dnsguard_events::RecordType;
use dnsguard_store::{NewRecord, RecordStore, Store, TrackOutcome};
use sea_orm::Database;
use serde_json::json;

/// Requires a reachable Postgres with the `dnsguard` migrations applied.
/// Skipped (not failed) when `DATABASE_URL` isn't set, matching this
/// crate's convention of running its own integration suite only against a
/// live database rather than faking one.
async fn setup_test_db() -> Option<Store> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    let db = Database::connect(&db_url).await.expect("failed to connect");
    Some(Store::new(db))
}

fn new_record(id: &str, name: &str) -> NewRecord {
    NewRecord {
        provider: "test-provider".to_string(),
        provider_record_id: id.to_string(),
        record_type: RecordType::A,
        name: name.to_string(),
        content: "1.2.3.4".to_string(),
        ttl: 300,
        extras: json!({}),
    }
}

#[tokio::test]
async fn track_then_untrack_round_trips() {
    let Some(store) = setup_test_db().await else {
        return;
    };

    let name = "roundtrip.example";
    let outcome = store.track(new_record("rt-1", name), true).await.unwrap();
    assert_eq!(outcome, TrackOutcome::Created);

    assert!(store.is_tracked("test-provider", "rt-1").await.unwrap());

    let found = store
        .find_by_type_name("test-provider", RecordType::A, name)
        .await
        .unwrap()
        .expect("record should be tracked");
    assert_eq!(found.content, "1.2.3.4");

    store.untrack("test-provider", "rt-1").await.unwrap();
    assert!(!store.is_tracked("test-provider", "rt-1").await.unwrap());
}

#[tokio::test]
async fn track_updates_id_on_type_name_collision() {
    let Some(store) = setup_test_db().await else {
        return;
    };

    let name = "collision.example";
    store.track(new_record("col-1", name), true).await.unwrap();

    let mut second = new_record("col-2", name);
    second.content = "9.9.9.9".to_string();
    let outcome = store.track(second, true).await.unwrap();
    assert_eq!(outcome, TrackOutcome::Updated);

    assert!(!store.is_tracked("test-provider", "col-1").await.unwrap());
    let found = store
        .find_by_type_name("test-provider", RecordType::A, name)
        .await
        .unwrap()
        .expect("row should still exist under the new id");
    assert_eq!(found.provider_record_id, "col-2");
    assert_eq!(found.content, "9.9.9.9");

    store.untrack("test-provider", "col-2").await.unwrap();
}

#[tokio::test]
async fn orphan_then_sweep_after_grace() {
    let Some(store) = setup_test_db().await else {
        return;
    };

    let name = "orphan.example";
    store.track(new_record("orph-1", name), true).await.unwrap();
    store.mark_orphaned("test-provider", "orph-1").await.unwrap();

    let too_fresh = store
        .list_orphans_older_than("test-provider", Duration::hours(1))
        .await
        .unwrap();
    assert!(!too_fresh.iter().any(|r| r.provider_record_id == "orph-1"));

    let stale = store
        .list_orphans_older_than("test-provider", Duration::seconds(-1))
        .await
        .unwrap();
    assert!(stale.iter().any(|r| r.provider_record_id == "orph-1"));

    store.untrack("test-provider", "orph-1").await.unwrap();
}

#[tokio::test]
async fn settings_round_trip() {
    let Some(store) = setup_test_db().await else {
        return;
    };

    store
        .set_setting("test_key", json!({"paused": true}))
        .await
        .unwrap();

    let value = store.get_setting("test_key").await.unwrap();
    assert_eq!(value, Some(json!({"paused": true})));
}
