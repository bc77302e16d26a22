//! List engine: the injectable state container.
//!
//! Owns the list state, the mutation coordinator and the reference data, and
//! performs all I/O through an [`EmployeeApi`]. Callers only see named
//! transitions; every one of them publishes a fresh [`ListSnapshot`].

use crate::error::{SyncError, SyncResult};
use crate::mutation::{
    MutationCoordinator, MutationKind, MutationState, MutationStates, UpdateOutcome,
};
use crate::protocol::DEFAULT_PAGE_SIZE;
use crate::reconcile::{ReconcileStrategy, Reconciliation, ReconciliationPolicy};
use crate::state::{FetchTicket, ListSnapshot, ListState};
use crate::transport::{cancellable, EmployeeApi};
use roster_types::{DetailRecord, EmployeeForm, EmployeeId, Sex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for the list engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rows requested per page.
    pub page_size: u32,
    /// How successful updates and deletes are reflected locally.
    pub strategy: ReconcileStrategy,
    /// Check form values before submitting creates and updates.
    pub validate_locally: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            strategy: ReconcileStrategy::FullRefetch,
            validate_locally: true,
        }
    }
}

/// Result of a fetch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched; `count` new rows were appended.
    Appended { page: u32, count: usize },
    /// Another fetch was already in flight; nothing was requested.
    InFlight,
    /// Every record is already held; nothing was requested.
    Exhausted,
    /// The result was dropped: the engine shut down or the list was reset
    /// while the request was in flight.
    Discarded,
}

/// Result of [`ListEngine::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Option<DetailRecord>),
    Updated(UpdateOutcome),
}

/// Keeps the paginated list, the selection and mutation state
/// consistent with the remote directory.
#[derive(Clone)]
pub struct ListEngine {
    api: Arc<dyn EmployeeApi>,
    config: EngineConfig,
    state: Arc<RwLock<ListState>>,
    mutations: Arc<MutationCoordinator>,
    policy: ReconciliationPolicy,
    /// Relation reference list, loaded independently of the list.
    sexes: Arc<RwLock<Vec<Sex>>>,
    cancel: CancellationToken,
    updates: Arc<watch::Sender<ListSnapshot>>,
}

impl ListEngine {
    /// Creates an engine with its own cancellation token.
    pub fn new(api: Arc<dyn EmployeeApi>, config: EngineConfig) -> Self {
        Self::with_cancellation(api, config, CancellationToken::new())
    }

    /// Creates an engine whose operations are discarded once `cancel` fires.
    pub fn with_cancellation(
        api: Arc<dyn EmployeeApi>,
        config: EngineConfig,
        cancel: CancellationToken,
    ) -> Self {
        let state = ListState::new(config.page_size);
        let (updates, _) = watch::channel(state.snapshot(Default::default()));
        let updates = Arc::new(updates);

        // Pending flags change mid-request, outside any list transition.
        let observer = {
            let updates = updates.clone();
            Arc::new(move |states: &MutationStates| {
                updates.send_modify(|snapshot| snapshot.mutations = states.clone());
            })
        };
        let mutations = MutationCoordinator::new(api.clone(), config.validate_locally)
            .with_observer(observer);

        Self {
            api,
            policy: ReconciliationPolicy::new(config.strategy),
            config,
            state: Arc::new(RwLock::new(state)),
            mutations: Arc::new(mutations),
            sexes: Arc::new(RwLock::new(Vec::new())),
            cancel,
            updates,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Receives a snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.updates.subscribe()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.state.read().await.snapshot(self.mutations.states())
    }

    async fn publish(&self) {
        let mut snapshot = self.snapshot().await;
        self.updates.send_modify(|current| {
            snapshot.mutations = self.mutations.states();
            *current = snapshot;
        });
    }

    pub fn mutation_state(&self, kind: MutationKind) -> MutationState {
        self.mutations.state(kind)
    }

    /// Clears a mutation's error slot.
    pub async fn dismiss_error(&self, kind: MutationKind) {
        self.mutations.clear_error(kind);
        self.publish().await;
    }

    /// Tears the engine down. Operations still suspended discard their
    /// results; pending flags are released.
    pub fn shutdown(&self) {
        info!("Shutting down list engine");
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ── Fetching ─────────────────────────────────────────────────

    /// Discards all held rows, the selection and the edit session, and
    /// fetches page 1.
    pub async fn refresh(&self) -> SyncResult<FetchOutcome> {
        if self.is_shut_down() {
            return Ok(FetchOutcome::Discarded);
        }
        let ticket = {
            let mut state = self.state.write().await;
            state.reset();
            state.begin_fetch()
        };
        debug!("Refreshing from page 1 (generation {})", ticket.generation);
        self.publish().await;
        self.run_fetch(ticket).await
    }

    /// Appends the next page. Ignored while another fetch is in flight and
    /// skipped once every record is held.
    pub async fn fetch_more(&self) -> SyncResult<FetchOutcome> {
        if self.is_shut_down() {
            return Ok(FetchOutcome::Discarded);
        }
        let ticket = {
            let mut state = self.state.write().await;
            if state.fetch_in_flight() {
                debug!("Fetch already in flight, ignoring fetch-more");
                return Ok(FetchOutcome::InFlight);
            }
            if !state.has_more() {
                return Ok(FetchOutcome::Exhausted);
            }
            state.begin_fetch()
        };
        self.publish().await;
        self.run_fetch(ticket).await
    }

    async fn run_fetch(&self, ticket: FetchTicket) -> SyncResult<FetchOutcome> {
        let result = cancellable(&self.cancel, self.api.fetch_page(&ticket.query)).await;

        let outcome = {
            let mut state = self.state.write().await;
            let cancelled = matches!(result, Err(SyncError::Cancelled)) || self.is_shut_down();
            if cancelled || !state.is_current(&ticket) {
                debug!("Discarding result for page {}", ticket.query.page);
                state.release(&ticket);
                Ok(FetchOutcome::Discarded)
            } else {
                match result {
                    Ok(page) => {
                        let count = state.complete_fetch(&ticket, page);
                        info!(
                            "Fetched page {} ({} new rows, {} held)",
                            ticket.query.page,
                            count,
                            state.store().len()
                        );
                        Ok(FetchOutcome::Appended {
                            page: ticket.query.page,
                            count,
                        })
                    }
                    Err(e) => {
                        warn!("Failed to fetch page {}: {}", ticket.query.page, e);
                        state.fail_fetch(e.clone());
                        Err(e)
                    }
                }
            }
        };

        if !self.is_shut_down() {
            self.publish().await;
        }
        outcome
    }

    /// Changes the full-name filter and refetches from page 1. Returns
    /// `None` if the filter did not change.
    pub async fn set_search(&self, query: Option<String>) -> SyncResult<Option<FetchOutcome>> {
        if !self.state.write().await.set_search(query) {
            return Ok(None);
        }
        self.refresh().await.map(Some)
    }

    // ── Selection ────────────────────────────────────────────────

    pub async fn toggle_selection(&self, id: EmployeeId, selected: bool) {
        self.state.write().await.toggle_selection(id, selected);
        self.publish().await;
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.clear_selection();
        self.publish().await;
    }

    pub async fn replace_selection(&self, ids: Vec<EmployeeId>) {
        self.state.write().await.replace_selection(ids);
        self.publish().await;
    }

    pub async fn selected_ids(&self) -> Vec<EmployeeId> {
        self.state.read().await.selection().ids()
    }

    // ── Edit session ─────────────────────────────────────────────

    /// Loads the detail record of `id` and makes it the baseline of the
    /// next [`save`](Self::save).
    pub async fn begin_edit(&self, id: &EmployeeId) -> SyncResult<DetailRecord> {
        match cancellable(&self.cancel, self.api.fetch_employee(id)).await {
            Ok(record) => {
                self.state.write().await.begin_edit(record.clone());
                self.publish().await;
                Ok(record)
            }
            Err(SyncError::Cancelled) => Err(SyncError::Cancelled),
            Err(e) => {
                warn!("Failed to load employee {}: {}", id, e);
                if self.policy.after_failure(&e) == Reconciliation::Refetch {
                    self.refetch_after_mutation().await;
                }
                Err(e)
            }
        }
    }

    pub async fn cancel_edit(&self) {
        self.state.write().await.end_edit();
        self.publish().await;
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Updates the record being edited, or creates a new one when no edit
    /// session is open.
    pub async fn save(&self, form: &EmployeeForm) -> SyncResult<SaveOutcome> {
        let editing = self.state.read().await.editing().cloned();
        match editing {
            Some(original) => self
                .update(&original.id, &original, form)
                .await
                .map(SaveOutcome::Updated),
            None => self.create(form).await.map(SaveOutcome::Created),
        }
    }

    pub async fn create(&self, form: &EmployeeForm) -> SyncResult<Option<DetailRecord>> {
        let result = self.mutations.create(form, &self.cancel).await;
        self.settle(result, |_| self.policy.after_create()).await
    }

    pub async fn update(
        &self,
        id: &EmployeeId,
        original: &DetailRecord,
        edited: &EmployeeForm,
    ) -> SyncResult<UpdateOutcome> {
        let result = self.mutations.update(id, original, edited, &self.cancel).await;
        if let Ok(UpdateOutcome::Unchanged) = &result {
            let mut state = self.state.write().await;
            if state.editing().map(|record| &record.id) == Some(id) {
                state.end_edit();
            }
        }

        let sexes = self.sexes.read().await.clone();
        let sex_label = |sex_id: &roster_types::SexId| {
            sexes.iter().find(|s| &s.id == sex_id).map(|s| s.name.clone())
        };
        self.settle(result, |outcome| self.policy.after_update(id, outcome, sex_label))
            .await
    }

    /// Deletes `ids` in one bulk request.
    pub async fn delete(&self, ids: &[EmployeeId]) -> SyncResult<Vec<EmployeeId>> {
        let result = self.mutations.delete(ids, &self.cancel).await;
        self.settle(result, |deleted| self.policy.after_delete(deleted)).await
    }

    /// Deletes the whole current selection.
    pub async fn delete_selected(&self) -> SyncResult<Vec<EmployeeId>> {
        let ids = self.selected_ids().await;
        self.delete(&ids).await
    }

    /// Reconciles the list with a mutation's outcome.
    async fn settle<T>(
        &self,
        result: SyncResult<T>,
        on_success: impl FnOnce(&T) -> Reconciliation,
    ) -> SyncResult<T> {
        let reconciliation = match &result {
            Ok(value) => on_success(value),
            Err(SyncError::Cancelled) => return result,
            Err(e) => self.policy.after_failure(e),
        };

        let refetch = {
            let mut state = self.state.write().await;
            if self.is_shut_down() {
                debug!("Engine shut down, skipping reconciliation");
                return Err(SyncError::Cancelled);
            }
            state.apply_reconciliation(&reconciliation)
        };
        if refetch {
            self.refetch_after_mutation().await;
        } else {
            self.publish().await;
        }
        result
    }

    /// A refetch failure is surfaced at list level, never as the
    /// mutation's own error.
    async fn refetch_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            warn!("Refetch after mutation failed: {}", e);
        }
    }

    // ── Reference data ───────────────────────────────────────────

    /// Fetches the relation reference list and caches it.
    pub async fn load_sexes(&self) -> SyncResult<Vec<Sex>> {
        let sexes = cancellable(&self.cancel, self.api.fetch_sexes())
            .await
            .inspect_err(|e| warn!("Failed to fetch sexes: {}", e))?;
        *self.sexes.write().await = sexes.clone();
        debug!("Loaded {} sex options", sexes.len());
        Ok(sexes)
    }

    /// Cached relation reference list.
    pub async fn sexes(&self) -> Vec<Sex> {
        self.sexes.read().await.clone()
    }
}
