//! Core persistence and validation for the campus portal.
//! This crate owns every entity list, its ID convention and its form rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;
pub mod sync;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, PortalConfig, StorageLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingStatus};
pub use model::entity::{ClosedEnum, Entity};
pub use model::Priority;
pub use repo::entity_repo::{
    EntityRepository, ListQuery, LoadOutcome, MalformedDataPolicy, RepoError, RepoOptions,
    RepoResult,
};
pub use service::dashboard::{DashboardSummary, EntitySummary};
pub use service::portal::{CampusPortal, PortalError, PortalResult};
pub use session::{Role, SessionContext};
pub use store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError, StoreResult};
pub use sync::change_bus::{ChangeBus, ChangeEvent, ChangeKind, SubscriptionId};
pub use validation::{FormInput, ValidationCode, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
