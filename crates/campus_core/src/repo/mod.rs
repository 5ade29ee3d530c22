//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Provide one generic CRUD contract for every entity list.
//! - Isolate JSON encoding and storage keys from the portal facade.
//!
//! # Invariants
//! - Repository writes must pass the entity's `RuleSet` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DataShape`) in
//!   addition to storage errors.

pub mod entity_repo;
