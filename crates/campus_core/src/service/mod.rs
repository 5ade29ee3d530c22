//! Use-case services over the entity repositories.
//!
//! # Responsibility
//! - Orchestrate repository calls that span more than one entity list.
//! - Keep callers decoupled from storage keys and JSON encoding.

pub mod dashboard;
pub mod portal;
