//! Mutation coordinator.
//!
//! Issues create, update and delete requests and tracks one
//! [`MutationState`] per [`MutationKind`]. At most one mutation of a kind is
//! in flight; a second submission of the same kind is rejected with
//! [`SyncError::StillSaving`] rather than queued, so responses can never be
//! applied out of order.

use crate::diff::{diff, FieldDiff};
use crate::error::{SyncError, SyncResult};
use crate::protocol::{CreateEmployeeRequest, DeleteEmployeesRequest};
use crate::transport::{cancellable, EmployeeApi};
use crate::validation::validate_form;
use roster_types::{DetailRecord, EmployeeForm, EmployeeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The kinds of mutation, each tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub const ALL: [MutationKind; 3] = [MutationKind::Create, MutationKind::Update, MutationKind::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the latest mutation of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    /// True strictly between submission and a terminal outcome.
    pub pending: bool,
    /// Error of the last terminal outcome, if it failed.
    pub error: Option<SyncError>,
}

/// One [`MutationState`] per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationStates {
    pub create: MutationState,
    pub update: MutationState,
    pub delete: MutationState,
}

impl MutationStates {
    pub fn get(&self, kind: MutationKind) -> &MutationState {
        match kind {
            MutationKind::Create => &self.create,
            MutationKind::Update => &self.update,
            MutationKind::Delete => &self.delete,
        }
    }

    fn get_mut(&mut self, kind: MutationKind) -> &mut MutationState {
        match kind {
            MutationKind::Create => &mut self.create,
            MutationKind::Update => &mut self.update,
            MutationKind::Delete => &mut self.delete,
        }
    }

    /// Returns true if any kind is in flight.
    pub fn any_pending(&self) -> bool {
        MutationKind::ALL.iter().any(|kind| self.get(*kind).pending)
    }
}

/// Result of an update submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing differed; no request was sent.
    Unchanged,
    /// The listed fields were sent as a partial patch.
    Patched(FieldDiff),
}

/// Called with a copy of every kind's state after each change.
pub type MutationObserver = Arc<dyn Fn(&MutationStates) + Send + Sync>;

/// Shared state cell plus its optional observer.
#[derive(Clone)]
struct StateCell {
    states: Arc<Mutex<MutationStates>>,
    observer: Option<MutationObserver>,
}

impl StateCell {
    /// Applies `change` and notifies the observer after the lock is released.
    fn modify<R>(&self, change: impl FnOnce(&mut MutationStates) -> R) -> R {
        let (out, copy) = {
            let mut states = lock(&self.states);
            let out = change(&mut states);
            (out, self.observer.as_ref().map(|_| states.clone()))
        };
        if let (Some(observer), Some(copy)) = (&self.observer, copy) {
            observer(&copy);
        }
        out
    }
}

/// Holds the pending flag of one kind. Dropping it clears the flag, so every
/// exit path (success, failure, cancellation, panic) releases it.
struct PendingGuard {
    cell: StateCell,
    kind: MutationKind,
}

impl PendingGuard {
    /// Records the terminal outcome. Cancelled outcomes leave the error slot
    /// untouched.
    fn settle<T>(self, result: &SyncResult<T>) {
        match result {
            Err(SyncError::Cancelled) => {}
            Err(e) => self.cell.modify(|s| s.get_mut(self.kind).error = Some(e.clone())),
            Ok(_) => self.cell.modify(|s| s.get_mut(self.kind).error = None),
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.cell.modify(|s| s.get_mut(self.kind).pending = false);
    }
}

fn lock(states: &Mutex<MutationStates>) -> MutexGuard<'_, MutationStates> {
    states.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Issues mutations against the remote resource.
pub struct MutationCoordinator {
    api: Arc<dyn EmployeeApi>,
    cell: StateCell,
    validate_locally: bool,
}

impl MutationCoordinator {
    /// Creates a coordinator. With `validate_locally`, form values are
    /// checked before a create or update is sent.
    pub fn new(api: Arc<dyn EmployeeApi>, validate_locally: bool) -> Self {
        Self {
            api,
            cell: StateCell {
                states: Arc::new(Mutex::new(MutationStates::default())),
                observer: None,
            },
            validate_locally,
        }
    }

    /// Registers `observer`, called after every pending or error change.
    pub fn with_observer(mut self, observer: MutationObserver) -> Self {
        self.cell.observer = Some(observer);
        self
    }

    /// Snapshot of one kind's state.
    pub fn state(&self, kind: MutationKind) -> MutationState {
        lock(&self.cell.states).get(kind).clone()
    }

    /// Snapshot of every kind's state.
    pub fn states(&self) -> MutationStates {
        lock(&self.cell.states).clone()
    }

    /// Clears the error slot of a kind, e.g. when its dialog is dismissed.
    pub fn clear_error(&self, kind: MutationKind) {
        self.cell.modify(|s| s.get_mut(kind).error = None);
    }

    fn begin(&self, kind: MutationKind) -> SyncResult<PendingGuard> {
        let began = self.cell.modify(|states| {
            let slot = states.get_mut(kind);
            if slot.pending {
                return false;
            }
            slot.pending = true;
            slot.error = None;
            true
        });
        if !began {
            debug!("Rejecting {} while another is still saving", kind);
            return Err(SyncError::StillSaving(kind));
        }

        Ok(PendingGuard {
            cell: self.cell.clone(),
            kind,
        })
    }

    /// Submits a new record with every field of `form`.
    pub async fn create(
        &self,
        form: &EmployeeForm,
        cancel: &CancellationToken,
    ) -> SyncResult<Option<DetailRecord>> {
        let guard = self.begin(MutationKind::Create)?;
        let result = self.create_inner(form, cancel).await;
        log_outcome(MutationKind::Create, &result);
        guard.settle(&result);
        result
    }

    async fn create_inner(
        &self,
        form: &EmployeeForm,
        cancel: &CancellationToken,
    ) -> SyncResult<Option<DetailRecord>> {
        if self.validate_locally {
            validate_form(form).map_err(SyncError::Validation)?;
        }
        let request = CreateEmployeeRequest::from(form);
        cancellable(cancel, self.api.create_employee(&request)).await
    }

    /// Submits only the fields of `edited` that differ from `original`.
    ///
    /// An empty diff completes immediately without a request and without
    /// touching the update state.
    pub async fn update(
        &self,
        id: &EmployeeId,
        original: &DetailRecord,
        edited: &EmployeeForm,
        cancel: &CancellationToken,
    ) -> SyncResult<UpdateOutcome> {
        let original_form = original.to_form();
        let patch = diff(&original_form, edited);
        if patch.is_empty() {
            debug!("No fields changed for employee {}, skipping update", id);
            return Ok(UpdateOutcome::Unchanged);
        }

        let guard = self.begin(MutationKind::Update)?;
        let result = self.update_inner(id, &original_form, edited, patch, cancel).await;
        log_outcome(MutationKind::Update, &result);
        guard.settle(&result);
        result
    }

    async fn update_inner(
        &self,
        id: &EmployeeId,
        original: &EmployeeForm,
        edited: &EmployeeForm,
        patch: FieldDiff,
        cancel: &CancellationToken,
    ) -> SyncResult<UpdateOutcome> {
        if self.validate_locally {
            // An unset relation means "unchanged", so validate against the original one.
            let merged = EmployeeForm {
                sex: edited.sex.clone().or_else(|| original.sex.clone()),
                ..edited.clone()
            };
            validate_form(&merged).map_err(SyncError::Validation)?;
        }
        debug!("Patching employee {} fields {:?}", id, patch.changed_fields());
        cancellable(cancel, self.api.update_employee(id, &patch)).await?;
        Ok(UpdateOutcome::Patched(patch))
    }

    /// Deletes every id in one bulk request. An empty set completes
    /// immediately without a request.
    pub async fn delete(
        &self,
        ids: &[EmployeeId],
        cancel: &CancellationToken,
    ) -> SyncResult<Vec<EmployeeId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let guard = self.begin(MutationKind::Delete)?;
        let request = DeleteEmployeesRequest {
            employee_ids: ids.to_vec(),
        };
        let result = cancellable(cancel, self.api.delete_employees(&request))
            .await
            .map(|()| request.employee_ids);
        log_outcome(MutationKind::Delete, &result);
        guard.settle(&result);
        result
    }
}

fn log_outcome<T>(kind: MutationKind, result: &SyncResult<T>) {
    match result {
        Ok(_) => info!("Employee {} succeeded", kind),
        Err(SyncError::Cancelled) => debug!("Employee {} discarded after shutdown", kind),
        Err(e @ SyncError::Unknown(_)) => warn!("Employee {} failed unexpectedly: {}", kind, e),
        Err(e) => debug!("Employee {} failed: {}", kind, e),
    }
}
