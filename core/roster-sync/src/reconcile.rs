//! Reconciliation policy.
//!
//! Decides how the list reacts to the outcome of a mutation. The default
//! strategy discards everything and refetches from page 1: the server owns
//! ordering and computed fields such as relation labels. The local-patch
//! strategy trades that for responsiveness by editing held rows in place.
//! Rows removed locally are not re-counted against the server's total, so
//! later pages may skip records until the next refresh.

use crate::error::SyncError;
use crate::mutation::UpdateOutcome;
use crate::state::ListState;
use roster_types::{EmployeeId, ListItemPatch, SexId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How successful updates and deletes are reflected locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// Reset and refetch from page 1.
    #[default]
    FullRefetch,
    /// Patch or remove held rows without a request.
    LocalPatch,
}

/// What to do with the list after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Leave the list untouched.
    Keep,
    /// Clear selection, cursor and rows, then fetch page 1.
    Refetch,
    /// Apply a shallow patch to one held row.
    PatchRow { id: EmployeeId, patch: ListItemPatch },
    /// Remove rows and deselect them.
    RemoveRows(Vec<EmployeeId>),
}

/// Maps mutation outcomes to [`Reconciliation`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationPolicy {
    strategy: ReconcileStrategy,
}

impl ReconciliationPolicy {
    pub fn new(strategy: ReconcileStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ReconcileStrategy {
        self.strategy
    }

    /// New rows have no known position, so a create always refetches.
    pub fn after_create(&self) -> Reconciliation {
        Reconciliation::Refetch
    }

    /// `sex_label` resolves a relation id to its display label; when the
    /// label is unknown the local strategy falls back to a refetch.
    pub fn after_update(
        &self,
        id: &EmployeeId,
        outcome: &UpdateOutcome,
        sex_label: impl Fn(&SexId) -> Option<String>,
    ) -> Reconciliation {
        let UpdateOutcome::Patched(diff) = outcome else {
            return Reconciliation::Keep;
        };
        match self.strategy {
            ReconcileStrategy::FullRefetch => Reconciliation::Refetch,
            ReconcileStrategy::LocalPatch => match diff.to_list_patch(sex_label) {
                Some(patch) => Reconciliation::PatchRow { id: id.clone(), patch },
                None => {
                    debug!("No label for changed relation of employee {}, refetching", id);
                    Reconciliation::Refetch
                }
            },
        }
    }

    pub fn after_delete(&self, deleted: &[EmployeeId]) -> Reconciliation {
        if deleted.is_empty() {
            return Reconciliation::Keep;
        }
        match self.strategy {
            ReconcileStrategy::FullRefetch => Reconciliation::Refetch,
            ReconcileStrategy::LocalPatch => Reconciliation::RemoveRows(deleted.to_vec()),
        }
    }

    /// Failed mutations leave the list alone, unless the failure shows the
    /// held rows are stale.
    pub fn after_failure(&self, error: &SyncError) -> Reconciliation {
        if error.requires_refresh() {
            Reconciliation::Refetch
        } else {
            Reconciliation::Keep
        }
    }
}

impl ListState {
    /// Applies the local part of a reconciliation. Returns true if the
    /// caller must follow up with a reset and refetch.
    pub fn apply_reconciliation(&mut self, reconciliation: &Reconciliation) -> bool {
        match reconciliation {
            Reconciliation::Keep => false,
            Reconciliation::Refetch => true,
            Reconciliation::PatchRow { id, patch } => {
                if !self.store_mut().replace_one(id, patch) {
                    debug!("Employee {} not held, patch skipped", id);
                }
                self.end_edit();
                false
            }
            Reconciliation::RemoveRows(ids) => {
                let removed = self.store_mut().remove_many(ids);
                for id in ids {
                    self.toggle_selection(id.clone(), false);
                }
                debug!("Removed {} of {} deleted employees locally", removed, ids.len());
                false
            }
        }
    }
}
