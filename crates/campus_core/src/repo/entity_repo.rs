//! Generic entity-list repository over a key-value store.
//!
//! # Responsibility
//! - Load, seed and cache one entity list per repository.
//! - Provide create/update/status/delete with whole-list write-back.
//! - Publish a change event after every successful mutation.
//!
//! # Invariants
//! - Forms are validated before any mutation; failures never touch storage.
//! - The cache only changes after the store accepted the new list, so cache
//!   and storage never diverge.
//! - Malformed stored data is handled by `MalformedDataPolicy`, never
//!   silently skipped.

use crate::clock::Clock;
use crate::model::entity::{ClosedEnum, DemoSeed, Entity, NewRecord};
use crate::model::id::IdError;
use crate::session::SessionContext;
use crate::store::{KeyValueStore, StoreError};
use crate::sync::change_bus::{ChangeBus, ChangeKind};
use crate::validation::{FormInput, ValidationError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity-list persistence and mutation.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Store(StoreError),
    Serialization(serde_json::Error),
    NotFound {
        key: &'static str,
        id: String,
    },
    /// Stored list cannot be decoded or carries malformed IDs.
    DataShape {
        key: &'static str,
        detail: String,
    },
}

impl RepoError {
    /// Text suitable for showing to the person who submitted the form.
    ///
    /// Validation failures surface the field message; persistence and
    /// data-shape failures each get their own generic notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.message.clone(),
            Self::Store(_) | Self::Serialization(_) => {
                "Your changes could not be saved. Please try again.".to_string()
            }
            Self::NotFound { .. } => "This record no longer exists.".to_string(),
            Self::DataShape { .. } => {
                "Saved data for this section is damaged and could not be loaded.".to_string()
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "serialization failed: {err}"),
            Self::NotFound { key, id } => write!(f, "record `{id}` not found in `{key}`"),
            Self::DataShape { key, detail } => {
                write!(f, "malformed data under `{key}`: {detail}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound { .. } | Self::DataShape { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// What to do when a stored list is unparsable or carries malformed IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedDataPolicy {
    /// Fail the load with `RepoError::DataShape` and leave storage untouched.
    #[default]
    Reject,
    /// Discard the stored list and reseed the demo dataset.
    RegenerateDemo,
}

impl MalformedDataPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::RegenerateDemo => "regenerate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "regenerate" | "regenerate_demo" => Some(Self::RegenerateDemo),
            _ => None,
        }
    }
}

/// Repository behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoOptions {
    /// Seed demo records when a key is absent.
    pub seed_demo_data: bool,
    pub malformed_data: MalformedDataPolicy,
}

impl Default for RepoOptions {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            malformed_data: MalformedDataPolicy::Reject,
        }
    }
}

/// Result of `EntityRepository::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Existing list read from storage.
    Loaded(usize),
    /// Key was absent; demo records were persisted.
    Seeded(usize),
    /// Key was absent and nothing was seeded.
    Empty,
    /// Malformed list replaced by demo records.
    Regenerated(usize),
}

/// Filter and paging options for listing records.
#[derive(Debug, Clone)]
pub struct ListQuery<S> {
    pub status: Option<S>,
    /// Case-insensitive substring matched against `Entity::search_text`.
    pub search: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            status: None,
            search: None,
            offset: 0,
            limit: None,
        }
    }
}

/// Cached entity list bound to one storage key.
pub struct EntityRepository<'s, E: Entity> {
    store: &'s dyn KeyValueStore,
    bus: Arc<ChangeBus>,
    clock: Arc<dyn Clock>,
    options: RepoOptions,
    records: Vec<E>,
    loaded: bool,
}

impl<'s, E: Entity> EntityRepository<'s, E> {
    pub fn new(
        store: &'s dyn KeyValueStore,
        bus: Arc<ChangeBus>,
        clock: Arc<dyn Clock>,
        options: RepoOptions,
    ) -> Self {
        Self {
            store,
            bus,
            clock,
            options,
            records: Vec::new(),
            loaded: false,
        }
    }

    pub fn storage_key(&self) -> &'static str {
        E::STORAGE_KEY
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads the list from storage, seeding or repairing it when needed.
    pub fn load(&mut self) -> RepoResult<LoadOutcome> {
        let started_at = Instant::now();
        let raw = match self.store.get(E::STORAGE_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=entity_load module=repo status=error key={} error_code=store_read_failed error={}",
                    E::STORAGE_KEY,
                    err
                );
                return Err(err.into());
            }
        };

        let outcome = match raw {
            None if self.options.seed_demo_data => {
                let seeded = self.demo_records();
                let count = seeded.len();
                if count == 0 {
                    self.records = seeded;
                    LoadOutcome::Empty
                } else {
                    self.write(&seeded)?;
                    self.records = seeded;
                    self.bus.publish(E::STORAGE_KEY, ChangeKind::Seeded, None);
                    LoadOutcome::Seeded(count)
                }
            }
            None => {
                self.records.clear();
                LoadOutcome::Empty
            }
            Some(json) => match decode::<E>(&json) {
                Ok(records) => {
                    let count = records.len();
                    self.records = records;
                    LoadOutcome::Loaded(count)
                }
                Err(detail) => self.recover_malformed(detail)?,
            },
        };

        self.loaded = true;
        info!(
            "event=entity_load module=repo status=ok key={} outcome={:?} duration_ms={}",
            E::STORAGE_KEY,
            outcome,
            started_at.elapsed().as_millis()
        );
        Ok(outcome)
    }

    /// Drops the cache and re-reads storage, then notifies subscribers.
    pub fn reload(&mut self) -> RepoResult<LoadOutcome> {
        let outcome = self.load()?;
        if let LoadOutcome::Loaded(_) | LoadOutcome::Empty = outcome {
            self.bus.publish(E::STORAGE_KEY, ChangeKind::Reloaded, None);
        }
        Ok(outcome)
    }

    /// Records in insertion order.
    pub fn all(&self) -> &[E] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Filters by status and search text, then applies offset/limit.
    pub fn list(&self, query: &ListQuery<E::Status>) -> Vec<&E> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);

        self.records
            .iter()
            .filter(|record| {
                query
                    .status
                    .map_or(true, |status| record.status() == status)
            })
            .filter(|record| {
                needle
                    .as_deref()
                    .map_or(true, |needle| record.search_text().contains(needle))
            })
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Number of records per status, in the status enum's declared order.
    pub fn count_by_status(&self) -> Vec<(E::Status, usize)> {
        E::Status::ALL
            .iter()
            .map(|status| {
                let count = self
                    .records
                    .iter()
                    .filter(|record| record.status() == *status)
                    .count();
                (*status, count)
            })
            .collect()
    }

    /// Validates `form` and appends a new record.
    pub fn create(&mut self, form: &FormInput, session: &SessionContext) -> RepoResult<E> {
        self.ensure_loaded()?;
        if let Err(err) = E::rules().validate(form, self.clock.today()) {
            debug!(
                "event=entity_create module=repo status=rejected key={} field={} code={}",
                E::STORAGE_KEY,
                err.field,
                err.code.as_str()
            );
            return Err(err.into());
        }

        let now_ms = self.clock.now_ms();
        let id = E::ID_SCHEME
            .allocate(now_ms, self.records.iter().map(|record| record.id()))
            .map_err(|err| self.data_shape(err))?;
        let record = E::from_form(
            form,
            &NewRecord {
                id,
                created_at: now_ms,
                session,
            },
        );

        let mut next = self.records.clone();
        next.push(record.clone());
        self.commit(next, ChangeKind::Created, record.id())?;
        Ok(record)
    }

    /// Merges the fields named in `patch` into the matching record.
    pub fn update(&mut self, id: &str, patch: &FormInput) -> RepoResult<E> {
        self.ensure_loaded()?;
        E::rules().validate_patch(patch, self.clock.today())?;
        let index = self.position(id)?;

        let mut next = self.records.clone();
        next[index].apply_patch(patch);
        let updated = next[index].clone();
        self.commit(next, ChangeKind::Updated, id)?;
        Ok(updated)
    }

    /// Replaces the matching record wholesale. The ID must not change.
    pub fn replace(&mut self, record: E) -> RepoResult<E> {
        self.ensure_loaded()?;
        let index = self.position(record.id())?;

        let mut next = self.records.clone();
        next[index] = record.clone();
        self.commit(next, ChangeKind::Updated, record.id())?;
        Ok(record)
    }

    pub fn set_status(&mut self, id: &str, status: E::Status) -> RepoResult<E> {
        self.ensure_loaded()?;
        let index = self.position(id)?;

        let mut next = self.records.clone();
        next[index].set_status(status);
        let updated = next[index].clone();
        self.commit(next, ChangeKind::StatusChanged, id)?;
        Ok(updated)
    }

    /// Removes the matching record and returns it.
    pub fn delete(&mut self, id: &str) -> RepoResult<E> {
        self.ensure_loaded()?;
        let index = self.position(id)?;

        let mut next = self.records.clone();
        let removed = next.remove(index);
        self.commit(next, ChangeKind::Deleted, id)?;
        Ok(removed)
    }

    /// Loads the list unless it is already cached.
    pub fn ensure_loaded(&mut self) -> RepoResult<()> {
        if !self.loaded {
            self.load()?;
        }
        Ok(())
    }

    fn position(&self, id: &str) -> RepoResult<usize> {
        self.records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| RepoError::NotFound {
                key: E::STORAGE_KEY,
                id: id.to_string(),
            })
    }

    fn demo_records(&self) -> Vec<E> {
        E::demo_records(&DemoSeed {
            now_ms: self.clock.now_ms(),
            today: self.clock.today(),
        })
    }

    fn recover_malformed(&mut self, detail: String) -> RepoResult<LoadOutcome> {
        match self.options.malformed_data {
            MalformedDataPolicy::Reject => {
                error!(
                    "event=entity_load module=repo status=error key={} error_code=malformed_data policy=reject",
                    E::STORAGE_KEY
                );
                Err(RepoError::DataShape {
                    key: E::STORAGE_KEY,
                    detail,
                })
            }
            MalformedDataPolicy::RegenerateDemo => {
                warn!(
                    "event=entity_load module=repo status=regenerated key={} error_code=malformed_data policy=regenerate",
                    E::STORAGE_KEY
                );
                let seeded = self.demo_records();
                let count = seeded.len();
                self.write(&seeded)?;
                self.records = seeded;
                self.bus.publish(E::STORAGE_KEY, ChangeKind::Regenerated, None);
                Ok(LoadOutcome::Regenerated(count))
            }
        }
    }

    fn data_shape(&self, err: IdError) -> RepoError {
        RepoError::DataShape {
            key: E::STORAGE_KEY,
            detail: err.to_string(),
        }
    }

    fn write(&self, records: &[E]) -> RepoResult<()> {
        let json = serde_json::to_string(records)?;
        if let Err(err) = self.store.set(E::STORAGE_KEY, &json) {
            error!(
                "event=entity_write module=repo status=error key={} bytes={} error_code=store_write_failed error={}",
                E::STORAGE_KEY,
                json.len(),
                err
            );
            return Err(err.into());
        }
        Ok(())
    }

    fn commit(&mut self, next: Vec<E>, kind: ChangeKind, record_id: &str) -> RepoResult<()> {
        self.write(&next)?;
        self.records = next;
        self.bus.publish(E::STORAGE_KEY, kind, Some(record_id));
        info!(
            "event=entity_{} module=repo status=ok key={} id={} count={}",
            kind.as_str(),
            E::STORAGE_KEY,
            record_id,
            self.records.len()
        );
        Ok(())
    }
}

fn decode<E: Entity>(json: &str) -> Result<Vec<E>, String> {
    let records: Vec<E> = serde_json::from_str(json).map_err(|err| err.to_string())?;
    E::ID_SCHEME
        .check_all(records.iter().map(|record| record.id()))
        .map_err(|err| err.to_string())?;
    Ok(records)
}
