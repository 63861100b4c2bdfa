mod support;

use std::sync::Arc;

use dnsguard_config::{ManagedHostname, PreservedPatternList, PublicIp};
use dnsguard_events::{Event, EventBus, RecordType};
use dnsguard_provider::{ProviderRecord, RecordExtras};
use dnsguard_reconciler::Reconciler;
use dnsguard_source::{HostnameSet, IntentHints};
use dnsguard_store::FakeStore;

use support::FakeProvider;

fn reconciler(provider: Arc<FakeProvider>, store: Arc<FakeStore>, events: EventBus) -> Reconciler {
    Reconciler::new(
        "fake".to_string(),
        "example.com".to_string(),
        provider,
        store,
        events,
        Vec::new(),
        PreservedPatternList::parse(""),
        PublicIp::with_values(Some("1.2.3.4".parse().unwrap()), None),
    )
}

#[tokio::test]
async fn creates_a_record_for_a_newly_discovered_hostname() {
    let provider = Arc::new(FakeProvider::new("example.com"));
    let store = Arc::new(FakeStore::new());
    let events = EventBus::new();
    let mut sub = events.subscribe();

    let r = reconciler(provider.clone(), store.clone(), events);

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    let stats = r.reconcile(hostnames).await;
    assert_eq!(stats.created, 1);
    assert_eq!(stats.total, 1);

    let zone = provider.snapshot();
    assert_eq!(zone.len(), 1);
    assert_eq!(zone[0].name, "app.example.com");
    assert_eq!(zone[0].content, "1.2.3.4");

    let tracked = store.list_tracked(None).await.unwrap();
    assert_eq!(tracked.len(), 1);
    assert!(tracked[0].app_managed);

    assert_eq!(sub.recv().await, Some(Event::ReconcileStarted));
    match sub.recv().await {
        Some(Event::RecordCreated(r)) => assert_eq!(r.name, "app.example.com"),
        other => panic!("expected RecordCreated, got {other:?}"),
    }
}

#[tokio::test]
async fn second_pass_leaves_a_matching_record_unchanged() {
    let provider = Arc::new(FakeProvider::new("example.com"));
    let store = Arc::new(FakeStore::new());
    let r = reconciler(provider.clone(), store.clone(), EventBus::new());

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    r.reconcile(hostnames.clone()).await;
    let stats = r.reconcile(hostnames).await;

    assert_eq!(stats.unchanged, 1);
    assert_eq!(stats.created, 0);
    assert_eq!(provider.snapshot().len(), 1);
}

#[tokio::test]
async fn content_drift_triggers_an_update() {
    let provider = Arc::new(FakeProvider::with_records(
        "example.com",
        vec![ProviderRecord {
            provider_record_id: "rec-1".to_string(),
            name: "app.example.com".to_string(),
            record_type: RecordType::A,
            content: "9.9.9.9".to_string(),
            ttl: 300,
            extras: RecordExtras::default(),
            provider_meta: serde_json::json!({}),
        }],
    ));
    let store = Arc::new(FakeStore::new());
    let r = reconciler(provider.clone(), store.clone(), EventBus::new());

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    let stats = r.reconcile(hostnames).await;
    assert_eq!(stats.updated, 1);
    assert_eq!(provider.snapshot()[0].content, "1.2.3.4");
}

#[tokio::test]
async fn first_run_adopts_a_foreign_record_as_not_app_managed() {
    let provider = Arc::new(FakeProvider::with_records(
        "example.com",
        vec![ProviderRecord {
            provider_record_id: "rec-1".to_string(),
            name: "legacy.example.com".to_string(),
            record_type: RecordType::A,
            content: "8.8.8.8".to_string(),
            ttl: 300,
            extras: RecordExtras::default(),
            provider_meta: serde_json::json!({}),
        }],
    ));
    let store = Arc::new(FakeStore::new());
    let r = reconciler(provider.clone(), store.clone(), EventBus::new());

    r.reconcile(HostnameSet::default()).await;

    let tracked = store.list_tracked(None).await.unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].name, "legacy.example.com");
    assert!(!tracked[0].app_managed);
}

#[tokio::test]
async fn managed_hostname_wins_over_a_discovered_collision() {
    let provider = Arc::new(FakeProvider::new("example.com"));
    let store = Arc::new(FakeStore::new());

    let managed = vec![ManagedHostname {
        hostname: "app.example.com".to_string(),
        record_type: "A".to_string(),
        content: Some("10.0.0.1".to_string()),
        ttl: Some(120),
        proxied: None,
    }];

    let r = Reconciler::new(
        "fake".to_string(),
        "example.com".to_string(),
        provider.clone(),
        store,
        EventBus::new(),
        managed,
        PreservedPatternList::parse(""),
        PublicIp::with_values(Some("1.2.3.4".parse().unwrap()), None),
    );

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    r.reconcile(hostnames).await;

    let zone = provider.snapshot();
    assert_eq!(zone.len(), 1);
    assert_eq!(zone[0].content, "10.0.0.1");
    assert_eq!(zone[0].ttl, 120);
}

#[tokio::test]
async fn preserved_pattern_keeps_a_discovered_hostname_out_of_the_zone() {
    let provider = Arc::new(FakeProvider::new("example.com"));
    let store = Arc::new(FakeStore::new());

    let r = Reconciler::new(
        "fake".to_string(),
        "example.com".to_string(),
        provider.clone(),
        store,
        EventBus::new(),
        Vec::new(),
        PreservedPatternList::parse("*.internal.example.com"),
        PublicIp::with_values(Some("1.2.3.4".parse().unwrap()), None),
    );

    let mut hostnames = HostnameSet::default();
    hostnames.insert("db.internal.example.com".to_string(), IntentHints::default());

    let stats = r.reconcile(hostnames).await;
    assert_eq!(stats.total, 0);
    assert!(provider.snapshot().is_empty());
}

#[tokio::test]
async fn provider_zone_listing_failure_defers_the_pass_without_panicking() {
    let provider = Arc::new(FakeProvider::new("example.com"));
    provider.set_list_fails(true);
    let store = Arc::new(FakeStore::new());
    let events = EventBus::new();
    let mut sub = events.subscribe();

    let r = reconciler(provider.clone(), store.clone(), events);

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    let stats = r.reconcile(hostnames).await;
    assert_eq!(stats.failed, 1);
    assert!(provider.snapshot().is_empty());

    assert_eq!(sub.recv().await, Some(Event::ReconcileStarted));
    match sub.recv().await {
        Some(Event::Error { .. }) => {}
        other => panic!("expected Error event, got {other:?}"),
    }
}

#[tokio::test]
async fn a_transient_update_failure_is_counted_failed_then_recovers_next_tick() {
    let provider = Arc::new(FakeProvider::with_records(
        "example.com",
        vec![ProviderRecord {
            provider_record_id: "rec-1".to_string(),
            name: "app.example.com".to_string(),
            record_type: RecordType::A,
            content: "9.9.9.9".to_string(),
            ttl: 300,
            extras: RecordExtras::default(),
            provider_meta: serde_json::json!({}),
        }],
    ));
    let store = Arc::new(FakeStore::new());
    let events = EventBus::new();
    let mut sub = events.subscribe();
    let r = reconciler(provider.clone(), store.clone(), events);

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    // Tick N: updateRecord times out.
    provider.set_update_fails(true);
    let stats = r.reconcile(hostnames.clone()).await;
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.updated, 0);
    assert_eq!(provider.snapshot()[0].content, "9.9.9.9");

    assert_eq!(sub.recv().await, Some(Event::ReconcileStarted));
    match sub.recv().await {
        Some(Event::Error { .. }) => {}
        other => panic!("expected Error event from the failed tick, got {other:?}"),
    }
    match sub.recv().await {
        Some(Event::ReconcileFinished(s)) => assert_eq!(s.failed, 1),
        other => panic!("expected ReconcileFinished, got {other:?}"),
    }

    // Tick N+1: provider recovers, the same drift is applied exactly once.
    provider.set_update_fails(false);
    let stats = r.reconcile(hostnames).await;
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(provider.snapshot().len(), 1);
    assert_eq!(provider.snapshot()[0].content, "1.2.3.4");

    assert_eq!(sub.recv().await, Some(Event::ReconcileStarted));
    match sub.recv().await {
        Some(Event::RecordUpdated(updated)) => assert_eq!(updated.name, "app.example.com"),
        other => panic!("expected RecordUpdated, got {other:?}"),
    }
    match sub.recv().await {
        Some(Event::ReconcileFinished(s)) => assert_eq!(s.updated, 1),
        other => panic!("expected ReconcileFinished, got {other:?}"),
    }

    let tracked = store.list_tracked(None).await.unwrap();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].content, "1.2.3.4");
}

#[tokio::test]
async fn a_tick_arriving_mid_pass_is_coalesced_not_run_concurrently() {
    let provider = Arc::new(FakeProvider::new("example.com"));
    let store = Arc::new(FakeStore::new());
    let r = Arc::new(reconciler(provider.clone(), store.clone(), EventBus::new()));

    let mut hostnames = HostnameSet::default();
    hostnames.insert("app.example.com".to_string(), IntentHints::default());

    // Two concurrent callers; at most one pass runs at a time and the
    // second either coalesces (empty stats) or runs after the first.
    let r2 = r.clone();
    let h2 = hostnames.clone();
    let first = tokio::spawn(async move { r.reconcile(hostnames).await });
    let second = tokio::spawn(async move { r2.reconcile(h2).await });

    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    // Regardless of interleaving, exactly one record ends up created.
    assert_eq!(provider.snapshot().len(), 1);
}
