//! Core type definitions for Roster.
//!
//! This crate defines the records exchanged with the employee directory
//! service and shared by the sync engine and the development server:
//! - Record identifiers (numeric or textual, as the server issues them)
//! - Listing rows, detail records and editable form values
//! - Pagination metadata and its `X-Pagination` header encoding

mod employee;
mod ids;
mod pagination;

pub use employee::{DetailRecord, EmployeeForm, ListItem, ListItemPatch, Sex};
pub use ids::{EmployeeId, SexId};
pub use pagination::{expected_total_pages, PaginationMetadata};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid pagination header: {0}")]
    InvalidPaginationHeader(String),
}
