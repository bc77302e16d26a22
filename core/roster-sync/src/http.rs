//! HTTP transport for the employee directory.
//!
//! Talks to the REST resource described in [`crate::protocol`] and
//! classifies every failure into a [`SyncError`] variant.

use crate::diff::FieldDiff;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{
    CreateEmployeeRequest, DeleteEmployeesRequest, ErrorBody, PageQuery, PageResult,
    ValidationBody, PAGINATION_HEADER,
};
use crate::transport::EmployeeApi;
use crate::validation::ValidationErrors;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use roster_types::{DetailRecord, EmployeeId, ListItem, PaginationMetadata, Sex};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for [`HttpEmployeeApi`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Response header carrying the pagination metadata.
    pub pagination_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5012/api".to_string(),
            timeout_ms: 1000,
            pagination_header: PAGINATION_HEADER.to_string(),
        }
    }
}

/// [`EmployeeApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEmployeeApi {
    config: ApiConfig,
    client: Client,
}

impl HttpEmployeeApi {
    pub fn new(config: ApiConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SyncError::Unknown(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn pagination(&self, response: &Response) -> Option<PaginationMetadata> {
        let header = response.headers().get(self.config.pagination_header.as_str())?;
        let parsed = header
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(|raw| PaginationMetadata::parse(raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Ignoring unreadable {} header: {}", self.config.pagination_header, e);
                None
            }
        }
    }
}

fn transport_error(action: &str, error: reqwest::Error) -> SyncError {
    if error.is_decode() {
        SyncError::Unknown(format!("{action}: {error}"))
    } else {
        SyncError::Transport(format!("{action}: {error}"))
    }
}

/// Maps a non-success response to an error.
async fn classify(action: &str, response: Response) -> SyncError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!("{} returned {}: {}", action, status, body);

    if status == StatusCode::NOT_FOUND {
        return SyncError::NotFound(action.to_string());
    }
    if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY) {
        if let Ok(parsed) = serde_json::from_str::<ValidationBody>(&body) {
            if !parsed.errors.is_empty() {
                return SyncError::Validation(ValidationErrors::from_server(parsed.errors));
            }
        }
    }
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| format!("{action} failed with status {status}"));
    SyncError::Unknown(message)
}

async fn checked(action: &str, response: Response) -> SyncResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(classify(action, response).await)
    }
}

async fn decode<T: DeserializeOwned>(action: &str, response: Response) -> SyncResult<T> {
    response
        .json()
        .await
        .map_err(|e| SyncError::Unknown(format!("{action}: malformed response: {e}")))
}

#[async_trait]
impl EmployeeApi for HttpEmployeeApi {
    async fn fetch_page(&self, query: &PageQuery) -> SyncResult<PageResult> {
        let action = "list employees";
        let response = self
            .client
            .get(self.url("/employees"))
            .query(&query.to_query_pairs())
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;
        let response = checked(action, response).await?;

        let metadata = self.pagination(&response);
        let items: Vec<ListItem> = decode(action, response).await?;
        debug!("Page {} returned {} rows", query.page, items.len());
        Ok(PageResult { items, metadata })
    }

    async fn fetch_employee(&self, id: &EmployeeId) -> SyncResult<DetailRecord> {
        let action = format!("get employee {id}");
        let response = self
            .client
            .get(self.url(&format!("/employees/{id}")))
            .send()
            .await
            .map_err(|e| transport_error(&action, e))?;
        let response = checked(&action, response).await?;
        decode(&action, response).await
    }

    async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> SyncResult<Option<DetailRecord>> {
        let action = "create employee";
        let response = self
            .client
            .post(self.url("/employees"))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;
        let response = checked(action, response).await?;

        // The created record is echoed back by some servers only.
        let body = response.bytes().await.map_err(|e| transport_error(action, e))?;
        Ok(serde_json::from_slice(&body).ok())
    }

    async fn update_employee(&self, id: &EmployeeId, patch: &FieldDiff) -> SyncResult<()> {
        let action = format!("update employee {id}");
        let response = self
            .client
            .patch(self.url(&format!("/employees/{id}")))
            .json(patch)
            .send()
            .await
            .map_err(|e| transport_error(&action, e))?;
        checked(&action, response).await.map(|_| ())
    }

    async fn delete_employees(&self, request: &DeleteEmployeesRequest) -> SyncResult<()> {
        let action = "delete employees";
        let response = self
            .client
            .delete(self.url("/employees"))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;
        checked(action, response).await.map(|_| ())
    }

    async fn fetch_sexes(&self) -> SyncResult<Vec<Sex>> {
        let action = "list sexes";
        let response = self
            .client
            .get(self.url("/sexes"))
            .send()
            .await
            .map_err(|e| transport_error(action, e))?;
        let response = checked(action, response).await?;
        decode(action, response).await
    }
}
