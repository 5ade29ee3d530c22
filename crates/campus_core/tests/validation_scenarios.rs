use campus_core::model::course::Course;
use campus_core::model::event::Event;
use campus_core::model::lost_found::LostFoundReport;
use campus_core::model::marketplace::MarketplaceListing;
use campus_core::{
    ChangeBus, EntityRepository, FixedClock, FormInput, KeyValueStore, MemoryKvStore, RepoError,
    RepoOptions, SessionContext, ValidationCode,
};
use chrono::NaiveDate;
use std::sync::Arc;

fn repo<E: campus_core::Entity>(store: &dyn KeyValueStore) -> EntityRepository<'_, E> {
    EntityRepository::new(
        store,
        Arc::new(ChangeBus::new()),
        Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())),
        RepoOptions::default(),
    )
}

fn lost_item(phone: &str) -> FormInput {
    FormInput::new()
        .with("kind", "lost")
        .with("item_name", "Blue backpack")
        .with(
            "description",
            "Navy backpack with a laptop sleeve and keychain.",
        )
        .with("location", "Library, second floor")
        .with("date", "2026-08-28")
        .with("contact_phone", phone)
}

fn listing(price: &str) -> FormInput {
    FormInput::new()
        .with("title", "Calculus textbook")
        .with("price", price)
        .with("category", "books")
        .with("condition", "good")
        .with("seller_contact", "seller@campus.edu")
}

fn validation_error(err: RepoError) -> campus_core::ValidationError {
    match err {
        RepoError::Validation(err) => err,
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn short_phone_is_rejected_and_nothing_is_appended() {
    let store = MemoryKvStore::new();
    let mut reports = repo::<LostFoundReport>(&store);
    reports.load().unwrap();
    let before = store.get("campus.lost_found").unwrap();

    let err = reports
        .create(&lost_item("123"), &SessionContext::system())
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(
        err.user_message(),
        "Contact phone must be at least 9 characters"
    );
    let err = validation_error(err);
    assert_eq!(err.field, "contact_phone");
    assert_eq!(err.code, ValidationCode::TooShort);
    assert_eq!(reports.len(), 10);
    assert_eq!(store.get("campus.lost_found").unwrap(), before);
}

#[test]
fn past_dates_are_allowed_for_lost_items_but_not_events() {
    let store = MemoryKvStore::new();
    let mut reports = repo::<LostFoundReport>(&store);
    let created = reports
        .create(&lost_item("+233 24 555 0199"), &SessionContext::system())
        .unwrap();
    assert_eq!(created.id, "LF-011");

    let mut events = repo::<Event>(&store);
    let err = events
        .create(
            &FormInput::new()
                .with("title", "Welcome Back Picnic")
                .with("description", "Food and games on the lawn.")
                .with("category", "social")
                .with("location", "Central Lawn")
                .with("date", "2026-08-31")
                .with("capacity", "200"),
            &SessionContext::system(),
        )
        .unwrap_err();
    assert_eq!(validation_error(err).code, ValidationCode::DateInPast);
}

#[test]
fn negative_price_leaves_storage_unchanged() {
    let store = MemoryKvStore::new();
    let mut listings = repo::<MarketplaceListing>(&store);
    listings.load().unwrap();
    let before = store.get("campus.marketplace").unwrap();

    let err = listings
        .create(&listing("-5"), &SessionContext::system())
        .unwrap_err();

    assert_eq!(err.user_message(), "Price must be at least 0");
    assert_eq!(validation_error(err).code, ValidationCode::BelowMinimum);
    assert_eq!(store.get("campus.marketplace").unwrap(), before);
}

#[test]
fn non_numeric_price_is_rejected() {
    let store = MemoryKvStore::new();
    let mut listings = repo::<MarketplaceListing>(&store);

    let err = listings
        .create(&listing("twelve"), &SessionContext::system())
        .unwrap_err();
    assert_eq!(validation_error(err).code, ValidationCode::NotANumber);
}

#[test]
fn first_failing_field_wins() {
    let store = MemoryKvStore::new();
    let mut listings = repo::<MarketplaceListing>(&store);

    let form = listing("-5")
        .with("title", "")
        .with("seller_contact", "nope");
    let err = validation_error(
        listings
            .create(&form, &SessionContext::system())
            .unwrap_err(),
    );
    assert_eq!(err.field, "title");
    assert_eq!(err.code, ValidationCode::Required);
}

#[test]
fn unknown_fields_are_rejected() {
    let store = MemoryKvStore::new();
    let mut listings = repo::<MarketplaceListing>(&store);

    let err = listings
        .create(
            &listing("12.50").with("discount", "10"),
            &SessionContext::system(),
        )
        .unwrap_err();
    assert_eq!(validation_error(err).code, ValidationCode::UnknownField);
}

#[test]
fn invalid_patch_leaves_record_untouched() {
    let store = MemoryKvStore::new();
    let mut courses = repo::<Course>(&store);
    courses.load().unwrap();
    let before = courses.get("CRS-001").unwrap().clone();

    let err = courses
        .update("CRS-001", &FormInput::new().with("code", "cs101"))
        .unwrap_err();

    assert_eq!(validation_error(err).code, ValidationCode::PatternMismatch);
    assert_eq!(courses.get("CRS-001"), Some(&before));
}
