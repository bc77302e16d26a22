//! Transport layer abstraction.
//!
//! Defines the remote-resource boundary so the engine can run against the
//! HTTP client, the in-memory mock, or any other backend.

use crate::diff::FieldDiff;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{CreateEmployeeRequest, DeleteEmployeesRequest, PageQuery, PageResult};
use async_trait::async_trait;
use roster_types::{DetailRecord, EmployeeId, Sex};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The employee directory as seen by the engine.
///
/// Implementations classify every failure into a [`SyncError`] variant
/// before returning it.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    /// Fetches one page of rows and the pagination metadata, if reported.
    async fn fetch_page(&self, query: &PageQuery) -> SyncResult<PageResult>;

    /// Fetches the detail record used as the baseline of an edit.
    async fn fetch_employee(&self, id: &EmployeeId) -> SyncResult<DetailRecord>;

    /// Creates a record. Returns it when the server echoes it back.
    async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> SyncResult<Option<DetailRecord>>;

    /// Sends a partial update containing only changed fields.
    async fn update_employee(&self, id: &EmployeeId, patch: &FieldDiff) -> SyncResult<()>;

    /// Deletes a set of records in one call.
    async fn delete_employees(&self, request: &DeleteEmployeesRequest) -> SyncResult<()>;

    /// Fetches the relation reference list.
    async fn fetch_sexes(&self) -> SyncResult<Vec<Sex>>;
}

/// Runs `fut` unless `cancel` fires first. A result that arrives after
/// cancellation is reported as [`SyncError::Cancelled`].
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = SyncResult<T>>,
) -> SyncResult<T> {
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        result = fut => {
            if cancel.is_cancelled() {
                Err(SyncError::Cancelled)
            } else {
                result
            }
        }
    }
}

/// An in-memory directory for testing.
pub mod mock {
    use super::*;
    use crate::validation::ValidationErrors;
    use roster_types::{ListItem, PaginationMetadata, SexId};
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    /// The operations of [`EmployeeApi`], for failure injection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ApiOp {
        FetchPage,
        FetchEmployee,
        Create,
        Update,
        Delete,
        FetchSexes,
    }

    /// A request the mock received.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ApiCall {
        FetchPage(PageQuery),
        FetchEmployee(EmployeeId),
        Create(CreateEmployeeRequest),
        Update(EmployeeId, FieldDiff),
        Delete(Vec<EmployeeId>),
        FetchSexes,
    }

    impl ApiCall {
        pub fn op(&self) -> ApiOp {
            match self {
                ApiCall::FetchPage(_) => ApiOp::FetchPage,
                ApiCall::FetchEmployee(_) => ApiOp::FetchEmployee,
                ApiCall::Create(_) => ApiOp::Create,
                ApiCall::Update(..) => ApiOp::Update,
                ApiCall::Delete(_) => ApiOp::Delete,
                ApiCall::FetchSexes => ApiOp::FetchSexes,
            }
        }
    }

    #[derive(Debug, Default)]
    struct MockState {
        employees: Vec<DetailRecord>,
        sexes: Vec<Sex>,
        calls: Vec<ApiCall>,
        failures: HashMap<ApiOp, VecDeque<SyncError>>,
        omit_pagination: bool,
        next_id: i64,
    }

    /// An [`EmployeeApi`] backed by a vector of records.
    ///
    /// Every call records itself and yields once before answering, so
    /// concurrently polled futures interleave at the suspension point the
    /// way real network calls do.
    #[derive(Debug, Clone)]
    pub struct MockEmployeeApi {
        state: Arc<Mutex<MockState>>,
    }

    impl Default for MockEmployeeApi {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockEmployeeApi {
        /// Creates an empty directory with the `Male`/`Female` reference list.
        pub fn new() -> Self {
            let state = MockState {
                sexes: vec![
                    Sex { id: SexId::from(1), name: "Male".into() },
                    Sex { id: SexId::from(2), name: "Female".into() },
                ],
                next_id: 1,
                ..Default::default()
            };
            Self {
                state: Arc::new(Mutex::new(state)),
            }
        }

        /// Creates a directory seeded with `count` records.
        pub fn with_employees(count: usize) -> Self {
            let api = Self::new();
            for n in 1..=count {
                api.insert(&format!("First{n}"), &format!("Last{n}"), 20 + (n % 60) as u32, 1 + (n % 2) as i64);
            }
            api
        }

        fn lock(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Adds a record directly, bypassing the call log.
        pub fn insert(&self, first_name: &str, last_name: &str, age: u32, sex_id: i64) -> DetailRecord {
            let mut state = self.lock();
            let sex = state
                .sexes
                .iter()
                .find(|s| s.id == SexId::from(sex_id))
                .cloned()
                .unwrap_or(Sex { id: SexId::from(sex_id), name: "Unknown".into() });
            let record = DetailRecord {
                id: EmployeeId::from(state.next_id),
                first_name: first_name.into(),
                last_name: last_name.into(),
                age,
                sex,
            };
            state.next_id += 1;
            state.employees.push(record.clone());
            record
        }

        /// Makes the next call of `op` fail with `error`. Queued per op.
        pub fn fail_next(&self, op: ApiOp, error: SyncError) {
            self.lock().failures.entry(op).or_default().push_back(error);
        }

        /// Stops sending pagination metadata with pages.
        pub fn omit_pagination(&self, omit: bool) {
            self.lock().omit_pagination = omit;
        }

        pub fn calls(&self) -> Vec<ApiCall> {
            self.lock().calls.clone()
        }

        /// Number of recorded calls of `op`.
        pub fn call_count(&self, op: ApiOp) -> usize {
            self.lock().calls.iter().filter(|c| c.op() == op).count()
        }

        pub fn clear_calls(&self) {
            self.lock().calls.clear();
        }

        /// Current server-side records.
        pub fn employees(&self) -> Vec<DetailRecord> {
            self.lock().employees.clone()
        }

        /// Records the call and pops an injected failure, if any.
        async fn enter(&self, call: ApiCall) -> SyncResult<()> {
            let op = call.op();
            let injected = {
                let mut state = self.lock();
                state.calls.push(call);
                state.failures.get_mut(&op).and_then(VecDeque::pop_front)
            };
            tokio::task::yield_now().await;
            match injected {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }
    }

    fn matches_name(record: &DetailRecord, query: &str) -> bool {
        let full = format!("{} {}", record.first_name, record.last_name).to_lowercase();
        full.contains(&query.to_lowercase())
    }

    #[async_trait]
    impl EmployeeApi for MockEmployeeApi {
        async fn fetch_page(&self, query: &PageQuery) -> SyncResult<PageResult> {
            self.enter(ApiCall::FetchPage(query.clone())).await?;
            let state = self.lock();
            let filtered: Vec<&DetailRecord> = state
                .employees
                .iter()
                .filter(|r| query.full_name.as_deref().is_none_or(|q| matches_name(r, q)))
                .collect();

            let start = (query.page.saturating_sub(1) as usize).saturating_mul(query.page_size as usize);
            let items: Vec<ListItem> = filtered
                .iter()
                .skip(start)
                .take(query.page_size as usize)
                .map(|r| r.to_list_item())
                .collect();
            let metadata = (!state.omit_pagination).then(|| {
                PaginationMetadata::for_listing(query.page, query.page_size, filtered.len() as u64)
            });

            Ok(PageResult { items, metadata })
        }

        async fn fetch_employee(&self, id: &EmployeeId) -> SyncResult<DetailRecord> {
            self.enter(ApiCall::FetchEmployee(id.clone())).await?;
            self.lock()
                .employees
                .iter()
                .find(|r| &r.id == id)
                .cloned()
                .ok_or_else(|| SyncError::NotFound(format!("employee {id}")))
        }

        async fn create_employee(
            &self,
            request: &CreateEmployeeRequest,
        ) -> SyncResult<Option<DetailRecord>> {
            self.enter(ApiCall::Create(request.clone())).await?;
            let mut state = self.lock();
            let sex = request
                .sex_id
                .as_ref()
                .and_then(|id| state.sexes.iter().find(|s| &s.id == id).cloned());
            let Some(sex) = sex else {
                let mut errors = ValidationErrors::new();
                errors.insert("sexId", "The SexId field is required.");
                return Err(SyncError::Validation(errors));
            };
            let record = DetailRecord {
                id: EmployeeId::from(state.next_id),
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                age: request.age,
                sex,
            };
            state.next_id += 1;
            state.employees.push(record.clone());
            Ok(Some(record))
        }

        async fn update_employee(&self, id: &EmployeeId, patch: &FieldDiff) -> SyncResult<()> {
            self.enter(ApiCall::Update(id.clone(), patch.clone())).await?;
            let mut state = self.lock();
            let sex = match &patch.sex_id {
                Some(sex_id) => Some(
                    state
                        .sexes
                        .iter()
                        .find(|s| &s.id == sex_id)
                        .cloned()
                        .ok_or_else(|| SyncError::NotFound(format!("sex {sex_id}")))?,
                ),
                None => None,
            };
            let record = state
                .employees
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| SyncError::NotFound(format!("employee {id}")))?;
            if let Some(first_name) = &patch.first_name {
                record.first_name.clone_from(first_name);
            }
            if let Some(last_name) = &patch.last_name {
                record.last_name.clone_from(last_name);
            }
            if let Some(age) = patch.age {
                record.age = age;
            }
            if let Some(sex) = sex {
                record.sex = sex;
            }
            Ok(())
        }

        async fn delete_employees(&self, request: &DeleteEmployeesRequest) -> SyncResult<()> {
            self.enter(ApiCall::Delete(request.employee_ids.clone())).await?;
            let mut state = self.lock();
            // All or nothing.
            if let Some(missing) = request
                .employee_ids
                .iter()
                .find(|id| !state.employees.iter().any(|r| &r.id == *id))
            {
                return Err(SyncError::NotFound(format!("employee {missing}")));
            }
            state
                .employees
                .retain(|r| !request.employee_ids.contains(&r.id));
            Ok(())
        }

        async fn fetch_sexes(&self) -> SyncResult<Vec<Sex>> {
            self.enter(ApiCall::FetchSexes).await?;
            Ok(self.lock().sexes.clone())
        }
    }
}
