//! In-memory employee directory and its HTTP API.
//!
//! Serves the REST contract the sync engine talks to: paginated listing with
//! an `X-Pagination` header, detail lookup, create, partial update, bulk
//! delete and the `sexes` reference list. Validation failures name fields by
//! their server-side path (`FirstName`, `Age.Value`).

use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use roster_types::{DetailRecord, EmployeeId, ListItem, PaginationMetadata, Sex, SexId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Name of the response header carrying pagination metadata.
pub const PAGINATION_HEADER: &str = "x-pagination";

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

const MAX_NAME_LEN: usize = 255;
const MIN_AGE: i64 = 18;
const MAX_AGE: i64 = 100;

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi",
];
const LAST_NAMES: &[&str] = &[
    "Doe", "Smith", "Jones", "Brown", "Taylor", "Wilson", "Clark", "Lewis",
];

/// Errors returned by the API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("validation failed")]
    Validation(BTreeMap<String, Vec<String>>),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct ValidationResponse {
    errors: BTreeMap<String, Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => {
                let body = ErrorResponse { error: format!("{what} not found") };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ValidationResponse { errors })).into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Query string of `GET /employees`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub full_name: Option<String>,
}

/// Body of `POST /employees` and `PATCH /employees/{id}`.
///
/// Every field is optional on the wire; a create requires all of them.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub sex_id: Option<SexId>,
}

/// Body of `DELETE /employees`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBody {
    pub employee_ids: Vec<EmployeeId>,
}

#[derive(Debug)]
struct DirectoryState {
    employees: Vec<DetailRecord>,
    sexes: Vec<Sex>,
    next_id: i64,
}

/// Age of the `n`th generated employee, always in `18..78`.
fn seeded_age(n: usize) -> u32 {
    18 + (n % 60) as u32 * 7 % 60
}

/// The in-memory employee table.
#[derive(Debug)]
pub struct Directory {
    state: RwLock<DirectoryState>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Creates an empty directory with the `Male`/`Female` reference list.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(DirectoryState {
                employees: Vec::new(),
                sexes: vec![
                    Sex { id: SexId::from(1), name: "Male".into() },
                    Sex { id: SexId::from(2), name: "Female".into() },
                ],
                next_id: 1,
            }),
        }
    }

    /// Creates a directory holding `count` generated employees.
    pub fn seeded(count: usize) -> Self {
        let mut state = Self::new().state.into_inner();
        for n in 0..count {
            let sex = state.sexes[n % state.sexes.len()].clone();
            let id = EmployeeId::from(state.next_id);
            state.next_id += 1;
            state.employees.push(DetailRecord {
                id,
                first_name: FIRST_NAMES[n % FIRST_NAMES.len()].to_string(),
                last_name: LAST_NAMES[(n / FIRST_NAMES.len()) % LAST_NAMES.len()].to_string(),
                age: seeded_age(n),
                sex,
            });
        }
        Self { state: RwLock::new(state) }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.employees.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Current records, in insertion order.
    pub async fn employees(&self) -> Vec<DetailRecord> {
        self.state.read().await.employees.clone()
    }

    /// One page of rows matching `full_name`, and the metadata for it.
    pub async fn list(&self, params: &ListParams) -> (Vec<ListItem>, PaginationMetadata) {
        let page = params.page.unwrap_or(1).max(1);
        let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let query = params
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let state = self.state.read().await;
        let matching: Vec<&DetailRecord> = state
            .employees
            .iter()
            .filter(|r| match &query {
                Some(q) => format!("{} {}", r.first_name, r.last_name).to_lowercase().contains(q),
                None => true,
            })
            .collect();

        let start = (page as usize - 1).saturating_mul(page_size as usize);
        let items = matching
            .iter()
            .skip(start)
            .take(page_size as usize)
            .map(|r| r.to_list_item())
            .collect();
        let metadata = PaginationMetadata::for_listing(page, page_size, matching.len() as u64);
        (items, metadata)
    }

    pub async fn get(&self, id: &EmployeeId) -> ApiResult<DetailRecord> {
        self.state
            .read()
            .await
            .employees
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("employee {id}")))
    }

    pub async fn sexes(&self) -> Vec<Sex> {
        self.state.read().await.sexes.clone()
    }

    /// Validates every field and stores a new record.
    pub async fn create(&self, body: EmployeeBody) -> ApiResult<DetailRecord> {
        let mut state = self.state.write().await;
        let mut errors = BTreeMap::new();
        let first_name = require(&mut errors, "FirstName", body.first_name.as_deref());
        let last_name = require(&mut errors, "LastName", body.last_name.as_deref());
        let age = match body.age {
            Some(age) => check_age(&mut errors, age),
            None => {
                field_error(&mut errors, "Age.Value", "The Age field is required.");
                None
            }
        };
        let sex = match &body.sex_id {
            Some(id) => resolve_sex(&mut errors, &state.sexes, id),
            None => {
                field_error(&mut errors, "SexId.Value", "The SexId field is required.");
                None
            }
        };

        let (Some(first_name), Some(last_name), Some(age), Some(sex)) = (first_name, last_name, age, sex)
        else {
            return Err(ApiError::Validation(errors));
        };

        let record = DetailRecord {
            id: EmployeeId::from(state.next_id),
            first_name,
            last_name,
            age,
            sex,
        };
        state.next_id += 1;
        state.employees.push(record.clone());
        info!("Created employee {}", record.id);
        Ok(record)
    }

    /// Validates and applies the fields present in `body`.
    pub async fn update(&self, id: &EmployeeId, body: EmployeeBody) -> ApiResult<DetailRecord> {
        let mut state = self.state.write().await;
        if !state.employees.iter().any(|r| &r.id == id) {
            return Err(ApiError::NotFound(format!("employee {id}")));
        }

        let mut errors = BTreeMap::new();
        let first_name = body
            .first_name
            .as_deref()
            .and_then(|v| require(&mut errors, "FirstName", Some(v)));
        let last_name = body
            .last_name
            .as_deref()
            .and_then(|v| require(&mut errors, "LastName", Some(v)));
        let age = body.age.and_then(|v| check_age(&mut errors, v));
        let sex = body
            .sex_id
            .as_ref()
            .and_then(|v| resolve_sex(&mut errors, &state.sexes, v));
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let record = state
            .employees
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("employee {id}")))?;
        if let Some(first_name) = first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            record.last_name = last_name;
        }
        if let Some(age) = age {
            record.age = age;
        }
        if let Some(sex) = sex {
            record.sex = sex;
        }
        info!("Updated employee {}", id);
        Ok(record.clone())
    }

    /// Removes every id, or none of them if any is unknown.
    pub async fn delete(&self, ids: &[EmployeeId]) -> ApiResult<usize> {
        let mut state = self.state.write().await;
        if let Some(missing) = ids.iter().find(|id| !state.employees.iter().any(|r| &r.id == *id)) {
            return Err(ApiError::NotFound(format!("employee {missing}")));
        }
        let ids: HashSet<&EmployeeId> = ids.iter().collect();
        let before = state.employees.len();
        state.employees.retain(|r| !ids.contains(&r.id));
        let removed = before - state.employees.len();
        info!("Deleted {} employees", removed);
        Ok(removed)
    }
}

fn field_error(errors: &mut BTreeMap<String, Vec<String>>, path: &str, message: impl Into<String>) {
    errors.entry(path.to_string()).or_default().push(message.into());
}

fn require(errors: &mut BTreeMap<String, Vec<String>>, path: &str, value: Option<&str>) -> Option<String> {
    match value {
        None | Some("") => {
            field_error(errors, path, format!("The {path} field is required."));
            None
        }
        Some(v) if v.chars().count() > MAX_NAME_LEN => {
            field_error(
                errors,
                path,
                format!("The field {path} must be a string with a maximum length of {MAX_NAME_LEN}."),
            );
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

fn check_age(errors: &mut BTreeMap<String, Vec<String>>, age: i64) -> Option<u32> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        u32::try_from(age).ok()
    } else {
        field_error(
            errors,
            "Age.Value",
            format!("The field Age must be between {MIN_AGE} and {MAX_AGE}."),
        );
        None
    }
}

fn resolve_sex(errors: &mut BTreeMap<String, Vec<String>>, sexes: &[Sex], id: &SexId) -> Option<Sex> {
    let sex = sexes.iter().find(|s| &s.id == id).cloned();
    if sex.is_none() {
        field_error(errors, "SexId.Value", format!("Unknown sex {id}."));
    }
    sex
}

// ── Handlers ─────────────────────────────────────────────────────

async fn list_handler(
    State(directory): State<Arc<Directory>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let (items, metadata) = directory.list(&params).await;
    debug!("GET /employees {:?} -> {} rows", params, items.len());
    let header = HeaderValue::from_str(&metadata.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static(""));
    (
        [(HeaderName::from_static(PAGINATION_HEADER), header)],
        Json(items),
    )
}

async fn get_handler(
    State(directory): State<Arc<Directory>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DetailRecord>> {
    directory.get(&EmployeeId::parse(&id)).await.map(Json)
}

async fn create_handler(
    State(directory): State<Arc<Directory>>,
    Json(body): Json<EmployeeBody>,
) -> ApiResult<(StatusCode, Json<DetailRecord>)> {
    let record = directory.create(body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_handler(
    State(directory): State<Arc<Directory>>,
    Path(id): Path<String>,
    Json(body): Json<EmployeeBody>,
) -> ApiResult<StatusCode> {
    directory.update(&EmployeeId::parse(&id), body).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_handler(
    State(directory): State<Arc<Directory>>,
    Json(body): Json<DeleteBody>,
) -> ApiResult<StatusCode> {
    directory.delete(&body.employee_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn sexes_handler(State(directory): State<Arc<Directory>>) -> Json<Vec<Sex>> {
    Json(directory.sexes().await)
}

/// Build the HTTP API router over the given directory.
pub fn build_router(directory: Arc<Directory>) -> Router {
    Router::new()
        .route(
            "/api/employees",
            get(list_handler).post(create_handler).delete(delete_handler),
        )
        .route("/api/employees/{id}", get(get_handler).patch(update_handler))
        .route("/api/sexes", get(sexes_handler))
        .with_state(directory)
}
