//! Record identifier schemes.
//!
//! # Responsibility
//! - Derive the next human-readable sequential ID (`PREFIX-###`).
//! - Mint opaque timestamp-derived IDs for entities without a sequence.
//!
//! # Invariants
//! - Sequential IDs are `max(existing suffix) + 1`, starting at 1.
//! - A suffix with no successor in `u64` is rejected at load time.
//! - Non-conforming IDs are reported, never skipped silently.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const SEQUENCE_WIDTH: usize = 3;
const OPAQUE_SUFFIX_LEN: usize = 6;

/// Identifier problem detected in a stored entity list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// ID does not match the entity's scheme.
    NonConforming {
        id: String,
        expected: String,
    },
    /// Two records share one ID.
    Duplicate(String),
    /// Numeric suffix has no successor, so nothing can be allocated after it.
    SequenceExhausted(String),
}

impl Display for IdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonConforming { id, expected } => {
                write!(f, "id `{id}` does not match expected form `{expected}`")
            }
            Self::Duplicate(id) => write!(f, "id `{id}` appears more than once"),
            Self::SequenceExhausted(id) => {
                write!(f, "id `{id}` has a suffix too large to allocate after")
            }
        }
    }
}

impl Error for IdError {}

/// Human-readable sequential allocator, e.g. `EVT-001`, `EVT-002`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialIds {
    prefix: &'static str,
}

impl SequentialIds {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    /// Formats one sequence number, zero-padded to three digits.
    pub fn format(&self, sequence: u64) -> String {
        format!(
            "{}-{:0width$}",
            self.prefix,
            sequence,
            width = SEQUENCE_WIDTH
        )
    }

    /// Numeric suffix of a conforming ID.
    ///
    /// Suffixes wider than the padding are accepted so sequences can grow
    /// past `999`.
    ///
    /// # Errors
    /// - `NonConforming` when the ID is not `PREFIX-<digits>`.
    /// - `SequenceExhausted` when the digits leave no room for a successor.
    pub fn parse(&self, id: &str) -> Result<u64, IdError> {
        let suffix = id
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| self.non_conforming(id))?;
        match suffix.parse::<u64>() {
            Ok(sequence) if sequence < u64::MAX => Ok(sequence),
            _ => Err(IdError::SequenceExhausted(id.to_string())),
        }
    }

    /// Next ID after every ID in `existing`.
    ///
    /// # Errors
    /// - The first error `parse` reports for an existing ID.
    pub fn next<'a>(&self, existing: impl IntoIterator<Item = &'a str>) -> Result<String, IdError> {
        let mut max = 0_u64;
        for id in existing {
            max = max.max(self.parse(id)?);
        }
        let next = max
            .checked_add(1)
            .ok_or_else(|| IdError::SequenceExhausted(self.format(max)))?;
        Ok(self.format(next))
    }

    fn non_conforming(&self, id: &str) -> IdError {
        IdError::NonConforming {
            id: id.to_string(),
            expected: format!("{}-{}", self.prefix, "#".repeat(SEQUENCE_WIDTH)),
        }
    }
}

/// Opaque allocator: `PREFIX-<epoch_ms>-<hex>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpaqueIds {
    prefix: &'static str,
}

impl OpaqueIds {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    pub fn conforms(&self, id: &str) -> bool {
        let Some(rest) = id
            .strip_prefix(self.prefix)
            .and_then(|r| r.strip_prefix('-'))
        else {
            return false;
        };
        let Some((millis, suffix)) = rest.split_once('-') else {
            return false;
        };
        !millis.is_empty()
            && millis.bytes().all(|byte| byte.is_ascii_digit())
            && suffix.len() == OPAQUE_SUFFIX_LEN
            && suffix.bytes().all(|byte| byte.is_ascii_hexdigit())
    }

    /// Mints an ID for `now_ms` that is not already in `existing`.
    pub fn next<'a>(
        &self,
        now_ms: i64,
        existing: impl IntoIterator<Item = &'a str> + Clone,
    ) -> String {
        loop {
            let random = Uuid::new_v4().simple().to_string();
            let candidate = format!("{}-{now_ms}-{}", self.prefix, &random[..OPAQUE_SUFFIX_LEN]);
            if !existing.clone().into_iter().any(|id| id == candidate) {
                return candidate;
            }
        }
    }
}

/// ID scheme attached to an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    Sequential(SequentialIds),
    Opaque(OpaqueIds),
}

impl IdScheme {
    /// Checks every ID in a loaded list for shape and uniqueness.
    pub fn check_all<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<(), IdError> {
        let mut seen = std::collections::HashSet::new();
        for id in ids {
            match self {
                Self::Sequential(scheme) => {
                    scheme.parse(id)?;
                }
                Self::Opaque(scheme) if !scheme.conforms(id) => {
                    return Err(IdError::NonConforming {
                        id: id.to_string(),
                        expected: format!("{}-<epoch_ms>-<hex>", scheme.prefix),
                    });
                }
                Self::Opaque(_) => {}
            }
            if !seen.insert(id) {
                return Err(IdError::Duplicate(id.to_string()));
            }
        }
        Ok(())
    }

    /// Allocates the next ID for a list holding `existing`.
    pub fn allocate<'a>(
        &self,
        now_ms: i64,
        existing: impl IntoIterator<Item = &'a str> + Clone,
    ) -> Result<String, IdError> {
        match self {
            Self::Sequential(scheme) => scheme.next(existing),
            Self::Opaque(scheme) => Ok(scheme.next(now_ms, existing)),
        }
    }
}
