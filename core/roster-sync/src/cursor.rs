//! Pagination cursor.
//!
//! Tracks the last fetched page and the most recent metadata, and decides
//! whether another page is worth requesting.

use roster_types::PaginationMetadata;
use tracing::warn;

/// Forward-only position in a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Last page fetched; 0 means "before page 1".
    page: u32,
    page_size: u32,
    metadata: Option<PaginationMetadata>,
    /// Set once a page came back empty.
    end_reached: bool,
}

impl PaginationCursor {
    /// Creates a cursor positioned before page 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            metadata: None,
            end_reached: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The page the next fetch targets.
    pub fn next_page(&self) -> u32 {
        self.page + 1
    }

    pub fn metadata(&self) -> Option<&PaginationMetadata> {
        self.metadata.as_ref()
    }

    /// Total record count, when the server reported one.
    pub fn total_count(&self) -> Option<u64> {
        self.metadata.map(|m| m.total_count)
    }

    /// Records a fetched page. Metadata, when present, replaces the previous
    /// metadata wholesale; an absent header leaves the old value in place.
    pub fn advance(&mut self, page: u32, metadata: Option<PaginationMetadata>, item_count: usize) {
        self.page = page;
        if let Some(meta) = metadata {
            if !meta.is_consistent() {
                warn!(
                    "Inconsistent pagination metadata: {} pages reported for {} records of {}",
                    meta.total_pages, meta.total_count, meta.page_size
                );
            }
            self.metadata = Some(meta);
        }
        if item_count == 0 {
            self.end_reached = true;
        }
    }

    /// Whether another page may exist, given the number of items already held.
    ///
    /// Without metadata this stays true until an empty page is observed.
    pub fn has_more(&self, current_len: usize) -> bool {
        match &self.metadata {
            Some(meta) => (current_len as u64) < meta.total_count,
            None => !self.end_reached,
        }
    }

    /// Moves back before page 1 and forgets all metadata.
    pub fn reset(&mut self) {
        self.page = 0;
        self.metadata = None;
        self.end_reached = false;
    }
}
