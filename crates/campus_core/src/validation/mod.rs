//! Form input and declarative field validation.
//!
//! # Responsibility
//! - Carry raw form submissions as ordered field/value pairs.
//! - Evaluate per-entity rule sets built from pure predicates.
//!
//! # Invariants
//! - Predicates are total and deterministic; "today" is always an argument.
//! - Only the first failing field (in rule order) is reported.

mod form;
mod rules;

pub use form::FormInput;
pub use rules::{
    check_field, parse_date, parse_time, Check, FieldRule, RuleSet, ValidationCode,
    ValidationError,
};
