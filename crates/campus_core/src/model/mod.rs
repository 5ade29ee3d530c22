//! Campus entity records.
//!
//! # Responsibility
//! - Define one flat record type per entity list.
//! - Declare each entity's storage key, ID scheme, status vocabulary and
//!   form rules through the `Entity` trait.
//!
//! # Invariants
//! - Every record carries a unique ID within its list and a `created_at`
//!   epoch-millisecond timestamp.
//! - Status fields are closed enums.

pub mod cafeteria_order;
pub mod community_event;
pub mod course;
pub mod entity;
pub mod event;
pub mod forum_post;
pub mod help_ticket;
pub mod id;
pub mod lost_found;
pub mod marketplace;
pub mod service_request;
pub mod student;
pub mod task;

use entity::closed_enum;

closed_enum! {
    /// Urgency shared by service requests, help tickets and tasks.
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}
