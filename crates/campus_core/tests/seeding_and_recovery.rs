use campus_core::db::{open_db, open_db_in_memory};
use campus_core::model::cafeteria_order::{CafeteriaOrder, OrderStatus};
use campus_core::model::event::Event;
use campus_core::{
    ChangeBus, ChangeEvent, ChangeKind, EntityRepository, FixedClock, FormInput, KeyValueStore,
    LoadOutcome, MalformedDataPolicy, MemoryKvStore, RepoError, RepoOptions, SessionContext,
    SqliteKvStore, StoreError,
};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

const NOW_MS: i64 = 1_788_220_800_000;

fn repo_with<E: campus_core::Entity>(
    store: &dyn KeyValueStore,
    bus: Arc<ChangeBus>,
    options: RepoOptions,
) -> EntityRepository<'_, E> {
    EntityRepository::new(
        store,
        bus,
        Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())),
        options,
    )
}

fn repo<E: campus_core::Entity>(store: &dyn KeyValueStore) -> EntityRepository<'_, E> {
    repo_with(store, Arc::new(ChangeBus::new()), RepoOptions::default())
}

fn regenerate() -> RepoOptions {
    RepoOptions {
        malformed_data: MalformedDataPolicy::RegenerateDemo,
        ..RepoOptions::default()
    }
}

fn event_form() -> FormInput {
    FormInput::new()
        .with("title", "Chess Open")
        .with("description", "Swiss system, five rounds.")
        .with("category", "social")
        .with("location", "Student Union")
        .with("date", "2026-10-03")
        .with("capacity", "64")
}

fn order_form() -> FormInput {
    FormInput::new()
        .with("menu_item", "Jollof rice")
        .with("quantity", "3")
        .with("unit_price", "4.50")
        .with("pickup_time", "12:15")
}

#[test]
fn seeding_can_be_disabled() {
    let store = MemoryKvStore::new();
    let mut events = repo_with::<Event>(
        &store,
        Arc::new(ChangeBus::new()),
        RepoOptions {
            seed_demo_data: false,
            ..RepoOptions::default()
        },
    );

    assert_eq!(events.load().unwrap(), LoadOutcome::Empty);
    assert!(events.is_empty());
    assert!(store.get("campus.events").unwrap().is_none());

    let created = events
        .create(&event_form(), &SessionContext::system())
        .unwrap();
    assert_eq!(created.id, "EVT-001");
}

#[test]
fn lists_without_demo_data_stay_absent_until_first_write() {
    let store = MemoryKvStore::new();
    let mut orders = repo::<CafeteriaOrder>(&store);

    assert_eq!(orders.load().unwrap(), LoadOutcome::Empty);
    assert!(store.get("campus.cafeteria_orders").unwrap().is_none());
}

#[test]
fn orders_get_opaque_ids_and_computed_totals() {
    let store = MemoryKvStore::new();
    let mut orders = repo::<CafeteriaOrder>(&store);

    let first = orders
        .create(&order_form(), &SessionContext::system())
        .unwrap();
    let second = orders
        .create(&order_form(), &SessionContext::system())
        .unwrap();

    let prefix = format!("ORD-{NOW_MS}-");
    assert!(first.id.starts_with(&prefix), "{}", first.id);
    assert_eq!(first.id.len(), prefix.len() + 6);
    assert_ne!(first.id, second.id);
    assert_eq!(first.status, OrderStatus::Placed);
    assert!((first.total - 13.5).abs() < f64::EPSILON);

    let updated = orders
        .update(&first.id, &FormInput::new().with("quantity", "2"))
        .unwrap();
    assert!((updated.total - 9.0).abs() < f64::EPSILON);
}

#[test]
fn unparsable_list_is_rejected_by_default() {
    let store = MemoryKvStore::new();
    store.set("campus.events", "{not json").unwrap();
    let mut events = repo::<Event>(&store);

    let err = events.load().unwrap_err();
    assert!(matches!(err, RepoError::DataShape { key: "campus.events", .. }));
    assert_eq!(
        err.user_message(),
        "Saved data for this section is damaged and could not be loaded."
    );
    assert!(!events.is_loaded());
    assert_eq!(
        store.get("campus.events").unwrap().as_deref(),
        Some("{not json")
    );

    let err = events
        .create(&event_form(), &SessionContext::system())
        .unwrap_err();
    assert!(matches!(err, RepoError::DataShape { .. }));
}

#[test]
fn non_conforming_ids_count_as_malformed() {
    let store = MemoryKvStore::new();
    repo::<Event>(&store).load().unwrap();
    let seeded = store.get("campus.events").unwrap().unwrap();
    store
        .set("campus.events", &seeded.replacen("EVT-004", "EVENT-4", 1))
        .unwrap();

    let err = repo::<Event>(&store).load().unwrap_err();
    match err {
        RepoError::DataShape { detail, .. } => assert!(detail.contains("EVENT-4"), "{detail}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_ids_count_as_malformed() {
    let store = MemoryKvStore::new();
    repo::<Event>(&store).load().unwrap();
    let seeded = store.get("campus.events").unwrap().unwrap();
    store
        .set("campus.events", &seeded.replacen("EVT-002", "EVT-001", 1))
        .unwrap();

    let err = repo::<Event>(&store).load().unwrap_err();
    assert!(matches!(err, RepoError::DataShape { .. }));
}

#[test]
fn regenerate_policy_replaces_malformed_list_with_demo_data() {
    let store = MemoryKvStore::new();
    store.set("campus.events", "[{\"id\": 7}]").unwrap();
    let bus = Arc::new(ChangeBus::new());
    let seen = record(&bus);
    let mut events = repo_with::<Event>(&store, Arc::clone(&bus), regenerate());

    assert_eq!(events.load().unwrap(), LoadOutcome::Regenerated(10));
    let raw = store.get("campus.events").unwrap().unwrap();
    let stored: Vec<Event> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, events.all());

    let kinds: Vec<ChangeKind> = seen.lock().unwrap().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Regenerated]);
}

#[test]
fn regenerate_policy_replaces_list_with_non_conforming_ids() {
    let store = MemoryKvStore::new();
    repo::<Event>(&store).load().unwrap();
    let seeded = store.get("campus.events").unwrap().unwrap();
    store
        .set("campus.events", &seeded.replacen("EVT-004", "EVENT-4", 1))
        .unwrap();
    let bus = Arc::new(ChangeBus::new());
    let seen = record(&bus);
    let mut events = repo_with::<Event>(&store, Arc::clone(&bus), regenerate());

    assert_eq!(events.load().unwrap(), LoadOutcome::Regenerated(10));
    assert!(events.get("EVT-004").is_some());
    assert_eq!(
        store.get("campus.events").unwrap().as_deref(),
        Some(seeded.as_str())
    );

    let kinds: Vec<ChangeKind> = seen.lock().unwrap().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Regenerated]);
}

#[test]
fn suffix_at_the_sequence_limit_blocks_loading() {
    let store = MemoryKvStore::new();
    repo::<Event>(&store).load().unwrap();
    let seeded = store.get("campus.events").unwrap().unwrap();
    let tampered = seeded.replacen("EVT-010", "EVT-18446744073709551615", 1);
    store.set("campus.events", &tampered).unwrap();

    let mut events = repo::<Event>(&store);
    let err = events.load().unwrap_err();
    match &err {
        RepoError::DataShape { detail, .. } => assert!(detail.contains("too large"), "{detail}"),
        other => panic!("unexpected error: {other}"),
    }
    let err = events
        .create(&event_form(), &SessionContext::system())
        .unwrap_err();
    assert!(matches!(err, RepoError::DataShape { .. }));
    assert_eq!(store.get("campus.events").unwrap(), Some(tampered));
}

#[test]
fn failed_write_keeps_cache_and_storage_in_step() {
    let sizing = MemoryKvStore::new();
    repo::<Event>(&sizing).load().unwrap();
    let seeded_bytes = sizing.used_bytes();

    let store = MemoryKvStore::with_quota(seeded_bytes + 16);
    let mut events = repo::<Event>(&store);
    assert_eq!(events.load().unwrap(), LoadOutcome::Seeded(10));
    let before = store.get("campus.events").unwrap();

    let err = events
        .create(&event_form(), &SessionContext::system())
        .unwrap_err();

    assert!(matches!(err, RepoError::Store(StoreError::QuotaExceeded { .. })));
    assert!(!err.is_validation());
    assert_eq!(
        err.user_message(),
        "Your changes could not be saved. Please try again."
    );
    assert_eq!(events.len(), 10);
    assert_eq!(store.get("campus.events").unwrap(), before);

    events.delete("EVT-001").unwrap();
    assert_eq!(events.len(), 9);
}

#[test]
fn mutations_publish_one_event_each() {
    let store = MemoryKvStore::new();
    let bus = Arc::new(ChangeBus::new());
    let seen = record(&bus);
    let mut events = repo_with::<Event>(&store, Arc::clone(&bus), RepoOptions::default());

    let created = events
        .create(&event_form(), &SessionContext::system())
        .unwrap();
    events
        .update(&created.id, &FormInput::new().with("capacity", "80"))
        .unwrap();
    let _ = events.create(&event_form().with("title", ""), &SessionContext::system());
    events.delete(&created.id).unwrap();
    events.reload().unwrap();

    let seen = seen.lock().unwrap();
    let summary: Vec<(ChangeKind, Option<&str>)> = seen
        .iter()
        .map(|event| (event.kind, event.record_id.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ChangeKind::Seeded, None),
            (ChangeKind::Created, Some("EVT-011")),
            (ChangeKind::Updated, Some("EVT-011")),
            (ChangeKind::Deleted, Some("EVT-011")),
            (ChangeKind::Reloaded, None),
        ]
    );
    assert!(seen.iter().all(|event| event.key == "campus.events"));
    assert!(seen
        .windows(2)
        .all(|pair| pair[0].revision < pair[1].revision));
}

#[test]
fn sqlite_store_persists_lists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campus.db");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let mut events = repo::<Event>(&store);
        events
            .create(&event_form(), &SessionContext::system())
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let mut events = repo::<Event>(&store);
    assert_eq!(events.load().unwrap(), LoadOutcome::Loaded(11));
    assert_eq!(events.get("EVT-011").unwrap().title, "Chess Open");
}

#[test]
fn sqlite_and_memory_stores_hold_identical_json() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteKvStore::try_new(&conn).unwrap();
    let memory = MemoryKvStore::new();

    repo::<Event>(&sqlite).load().unwrap();
    repo::<Event>(&memory).load().unwrap();

    assert_eq!(
        sqlite.get("campus.events").unwrap(),
        memory.get("campus.events").unwrap()
    );
}

fn record(bus: &ChangeBus) -> Arc<Mutex<Vec<ChangeEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}
