//! Request and response shapes of the employee directory API.
//!
//! The remote resource is REST-like:
//! - `GET /employees?page&pageSize&fullName` returns a page of rows, with
//!   paging state in the [`PAGINATION_HEADER`] response header
//! - `GET /employees/{id}` returns a detail record
//! - `POST /employees` creates, `PATCH /employees/{id}` partially updates
//! - `DELETE /employees` removes a set of ids in one call
//! - `GET /sexes` returns the reference list for the relation selector

use roster_types::{EmployeeForm, EmployeeId, ListItem, PaginationMetadata, SexId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response header carrying [`PaginationMetadata`].
pub const PAGINATION_HEADER: &str = "X-Pagination";

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Parameters of one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Full-name filter. `None` lists everything.
    pub full_name: Option<String>,
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, full_name: Option<String>) -> Self {
        self.full_name = full_name;
        self
    }

    /// Query-string pairs in wire order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(name) = &self.full_name {
            pairs.push(("fullName", name.clone()));
        }
        pairs
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub items: Vec<ListItem>,
    /// `None` when the server omitted or garbled the pagination header.
    pub metadata: Option<PaginationMetadata>,
}

/// Body of `POST /employees`. Every field is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex_id: Option<SexId>,
}

impl From<&EmployeeForm> for CreateEmployeeRequest {
    fn from(form: &EmployeeForm) -> Self {
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            age: form.age,
            sex_id: form.sex.clone(),
        }
    }
}

/// Body of `DELETE /employees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEmployeesRequest {
    pub employee_ids: Vec<EmployeeId>,
}

/// Body of a 4xx response with per-field messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationBody {
    #[serde(default)]
    pub errors: HashMap<String, Vec<String>>,
}

/// Body of any other error response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
