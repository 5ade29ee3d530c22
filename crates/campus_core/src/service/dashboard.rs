//! Dashboard counters derived from the cached entity lists.

use crate::model::entity::{ClosedEnum, Entity};
use crate::repo::entity_repo::EntityRepository;

/// Counters for one entity list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub key: &'static str,
    pub label: &'static str,
    pub total: usize,
    /// `(status, count)` for every status value, in declared order.
    pub by_status: Vec<(&'static str, usize)>,
}

impl EntitySummary {
    pub fn count(&self, status: &str) -> usize {
        self.by_status
            .iter()
            .find(|(name, _)| *name == status)
            .map_or(0, |(_, count)| *count)
    }
}

/// Counters for every entity list of a portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub entities: Vec<EntitySummary>,
}

impl DashboardSummary {
    pub fn entity(&self, key: &str) -> Option<&EntitySummary> {
        self.entities.iter().find(|summary| summary.key == key)
    }

    pub fn total_records(&self) -> usize {
        self.entities.iter().map(|summary| summary.total).sum()
    }
}

pub fn summarize<E: Entity>(repo: &EntityRepository<'_, E>) -> EntitySummary {
    EntitySummary {
        key: E::STORAGE_KEY,
        label: E::LABEL,
        total: repo.len(),
        by_status: repo
            .count_by_status()
            .into_iter()
            .map(|(status, count)| (status.as_str(), count))
            .collect(),
    }
}
