//! Client-side sync engine for a paginated employee directory.
//!
//! Keeps a locally materialized, incrementally loaded list consistent with a
//! remote REST resource while the user browses, selects, edits, creates and
//! deletes records.
//!
//! # Architecture
//!
//! The engine never trusts local edits over the server: after a mutation it
//! either refetches from page 1 or, with [`ReconcileStrategy::LocalPatch`],
//! patches the held rows in place.
//!
//! ## Components
//!
//! - **Cursor**: Tracks the last fetched page and the server's paging metadata
//! - **Store**: The ordered rows fetched so far
//! - **Selection**: The set of selected ids
//! - **Diff**: Computes the partial patch sent by an update
//! - **Mutation**: Issues create, update and delete, one of each at a time
//! - **Reconcile**: Decides how the list reacts to a mutation's outcome
//! - **Transport**: Abstracts over the HTTP client and the in-memory mock
//! - **Engine**: Orchestrates all of the above and publishes snapshots
//!
//! # Example
//!
//! ```
//! use roster_sync::transport::mock::MockEmployeeApi;
//! use roster_sync::{EngineConfig, ListEngine};
//! use std::sync::Arc;
//!
//! let api = Arc::new(MockEmployeeApi::with_employees(12));
//! let engine = ListEngine::new(api, EngineConfig::default());
//! assert_eq!(engine.config().page_size, 5);
//! ```

pub mod cursor;
pub mod diff;
mod engine;
mod error;
pub mod http;
pub mod mutation;
pub mod protocol;
pub mod reconcile;
pub mod selection;
pub mod state;
pub mod store;
pub mod transport;
pub mod validation;

pub use cursor::PaginationCursor;
pub use diff::{diff, Field, FieldDiff};
pub use engine::{EngineConfig, FetchOutcome, ListEngine, SaveOutcome};
pub use error::{SyncError, SyncResult};
pub use http::{ApiConfig, HttpEmployeeApi};
pub use mutation::{
    MutationCoordinator, MutationKind, MutationObserver, MutationState, MutationStates,
    UpdateOutcome,
};
pub use protocol::{
    CreateEmployeeRequest, DeleteEmployeesRequest, PageQuery, PageResult, DEFAULT_PAGE_SIZE,
    PAGINATION_HEADER,
};
pub use reconcile::{ReconcileStrategy, Reconciliation, ReconciliationPolicy};
pub use selection::SelectionTracker;
pub use state::{FetchTicket, ListPhase, ListSnapshot, ListState};
pub use store::ListStore;
pub use transport::EmployeeApi;
pub use validation::{normalize_field_path, validate_form, ValidationErrors};
