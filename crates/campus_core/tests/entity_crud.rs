use campus_core::model::event::{Event, EventCategory, EventStatus};
use campus_core::model::lost_found::{LostFoundReport, ReportStatus};
use campus_core::model::marketplace::MarketplaceListing;
use campus_core::{
    ChangeBus, EntityRepository, FixedClock, FormInput, KeyValueStore, ListQuery, LoadOutcome,
    MemoryKvStore, RepoError, RepoOptions, Role, SessionContext,
};
use chrono::NaiveDate;
use std::sync::Arc;

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()))
}

fn repo<E: campus_core::Entity>(store: &dyn KeyValueStore) -> EntityRepository<'_, E> {
    EntityRepository::new(
        store,
        Arc::new(ChangeBus::new()),
        clock(),
        RepoOptions::default(),
    )
}

fn session() -> SessionContext {
    SessionContext::new("u-17", "Amara Okafor", Role::Student)
}

fn event_form(title: &str) -> FormInput {
    FormInput::new()
        .with("title", title)
        .with("description", "Bring a laptop and a charger.")
        .with("category", "workshop")
        .with("location", "Engineering Lab 2")
        .with("date", "2026-09-20")
        .with("time", "14:30")
        .with("capacity", "40")
}

fn stored_json(store: &dyn KeyValueStore, key: &str) -> serde_json::Value {
    let raw = store.get(key).unwrap().expect("list is stored");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn first_load_seeds_ten_demo_records() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);

    assert_eq!(events.load().unwrap(), LoadOutcome::Seeded(10));
    assert_eq!(events.len(), 10);
    assert_eq!(events.all()[0].id, "EVT-001");
    assert_eq!(events.all()[9].id, "EVT-010");
    let stored = stored_json(&store, "campus.events");
    assert_eq!(stored.as_array().unwrap().len(), 10);

    let mut again = repo::<Event>(&store);
    assert_eq!(again.load().unwrap(), LoadOutcome::Loaded(10));
}

#[test]
fn create_appends_with_next_sequential_id() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);

    let first = events
        .create(&event_form("Rust Study Group"), &session())
        .unwrap();
    let second = events
        .create(&event_form("Rust Study Group II"), &session())
        .unwrap();

    assert_eq!(first.id, "EVT-011");
    assert_eq!(second.id, "EVT-012");
    assert_eq!(first.organizer, "Amara Okafor");
    assert_eq!(first.status, EventStatus::Upcoming);
    assert_eq!(first.category, EventCategory::Workshop);
    assert_eq!(first.created_at, 1_788_220_800_000);
    assert_eq!(events.all().last().unwrap().id, "EVT-012");
}

#[test]
fn ids_follow_the_highest_suffix_not_the_list_length() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);
    events.load().unwrap();

    let created = events
        .create(&event_form("Hack Night"), &session())
        .unwrap();
    events.delete("EVT-005").unwrap();
    let next = events
        .create(&event_form("Hack Night II"), &session())
        .unwrap();

    assert_eq!(created.id, "EVT-011");
    assert_eq!(next.id, "EVT-012");
}

#[test]
fn deleting_a_created_record_restores_list_and_storage() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);
    events.load().unwrap();
    let before_list = events.all().to_vec();
    let before_json = stored_json(&store, "campus.events");

    let created = events
        .create(&event_form("Poetry Slam"), &session())
        .unwrap();
    let removed = events.delete(&created.id).unwrap();

    assert_eq!(removed, created);
    assert_eq!(events.all(), before_list.as_slice());
    assert_eq!(stored_json(&store, "campus.events"), before_json);
}

#[test]
fn update_changes_only_patched_fields() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);
    events.load().unwrap();
    let original = events.get("EVT-003").unwrap().clone();

    let updated = events
        .update(
            "EVT-003",
            &FormInput::new().with("location", "Library Atrium"),
        )
        .unwrap();

    assert_eq!(updated.location, "Library Atrium");
    assert_eq!(updated.title, original.title);
    assert_eq!(updated.date, original.date);
    assert_eq!(updated.capacity, original.capacity);
    assert_eq!(updated.created_at, original.created_at);

    let stored = stored_json(&store, "campus.events");
    assert_eq!(stored[2]["location"], "Library Atrium");
}

#[test]
fn set_status_persists_the_new_status() {
    let store = MemoryKvStore::new();
    let mut reports = repo::<LostFoundReport>(&store);
    reports.load().unwrap();

    let claimed = reports.set_status("LF-002", ReportStatus::Claimed).unwrap();
    assert_eq!(claimed.status, ReportStatus::Claimed);
    assert_eq!(
        stored_json(&store, "campus.lost_found")[1]["status"],
        "claimed"
    );

    let open = reports.list(&ListQuery {
        status: Some(ReportStatus::Open),
        ..ListQuery::default()
    });
    assert_eq!(open.len(), 9);
}

#[test]
fn unknown_ids_are_not_found_and_leave_storage_alone() {
    let store = MemoryKvStore::new();
    let mut listings = repo::<MarketplaceListing>(&store);
    listings.load().unwrap();
    let before = stored_json(&store, "campus.marketplace");

    let err = listings.delete("MKT-999").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { id, .. } if id == "MKT-999"));
    let err = listings
        .update("MKT-404", &FormInput::new().with("title", "Desk lamp"))
        .unwrap_err();
    assert_eq!(err.user_message(), "This record no longer exists.");

    assert_eq!(stored_json(&store, "campus.marketplace"), before);
}

#[test]
fn list_filters_by_search_text_and_pages() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);
    events.load().unwrap();
    events
        .create(&event_form("Quantum Reading Circle"), &session())
        .unwrap();

    let hits = events.list(&ListQuery {
        search: Some("  quantum ".to_string()),
        ..ListQuery::default()
    });
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "EVT-011");

    let page = events.list(&ListQuery {
        offset: 2,
        limit: Some(3),
        ..ListQuery::default()
    });
    let ids: Vec<&str> = page.iter().map(|event| event.id.as_str()).collect();
    assert_eq!(ids, vec!["EVT-003", "EVT-004", "EVT-005"]);
}

#[test]
fn count_by_status_covers_every_status() {
    let store = MemoryKvStore::new();
    let mut events = repo::<Event>(&store);
    events.load().unwrap();
    events.set_status("EVT-001", EventStatus::Cancelled).unwrap();

    let counts = events.count_by_status();
    assert_eq!(
        counts,
        vec![
            (EventStatus::Upcoming, 9),
            (EventStatus::Ongoing, 0),
            (EventStatus::Completed, 0),
            (EventStatus::Cancelled, 1),
        ]
    );
}
