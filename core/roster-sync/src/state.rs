//! List state tracking.
//!
//! Owns the pagination cursor, the materialized rows, the selection and the
//! open edit session. Every change goes through a named transition; there
//! is no direct field access from outside the crate.

use crate::cursor::PaginationCursor;
use crate::error::SyncError;
use crate::mutation::MutationStates;
use crate::protocol::{PageQuery, PageResult};
use crate::selection::SelectionTracker;
use crate::store::ListStore;
use roster_types::{DetailRecord, EmployeeId, ListItem};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Phase of the list's fetch state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    /// Nothing requested since the last reset.
    Idle,
    /// A request for this page is in flight.
    Fetching(u32),
    /// The last fetch succeeded.
    Loaded,
    /// The last fetch failed.
    Errored(SyncError),
}

/// Handle for one in-flight fetch. The result is applied only if the list
/// has not been reset since the ticket was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: PageQuery,
}

/// Shared list state.
#[derive(Debug, Clone)]
pub struct ListState {
    phase: ListPhase,
    cursor: PaginationCursor,
    store: ListStore,
    selection: SelectionTracker,
    search: Option<String>,
    editing: Option<DetailRecord>,
    /// Bumped on every reset.
    generation: u64,
    /// Generation of the fetch currently in flight.
    in_flight: Option<u64>,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            phase: ListPhase::Idle,
            cursor: PaginationCursor::new(page_size),
            store: ListStore::new(),
            selection: SelectionTracker::new(),
            search: None,
            editing: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn editing(&self) -> Option<&DetailRecord> {
        self.editing.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if a fetch for the current generation is in flight.
    pub fn fetch_in_flight(&self) -> bool {
        self.in_flight == Some(self.generation)
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more(self.store.len())
    }

    // ── Fetch transitions ────────────────────────────────────────

    /// Marks the next page as in flight and returns its ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let page = self.cursor.next_page();
        self.in_flight = Some(self.generation);
        self.phase = ListPhase::Fetching(page);
        FetchTicket {
            generation: self.generation,
            query: PageQuery::new(page, self.cursor.page_size()).with_full_name(self.search.clone()),
        }
    }

    /// Returns true if `ticket` still belongs to the current generation.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Releases the in-flight flag held by `ticket` without applying anything.
    pub fn release(&mut self, ticket: &FetchTicket) {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
        if self.is_current(ticket) && self.phase == ListPhase::Fetching(ticket.query.page) {
            self.phase = if self.cursor.page() == 0 { ListPhase::Idle } else { ListPhase::Loaded };
        }
    }

    /// Appends a fetched page and advances the cursor. Rows whose id is
    /// already held are dropped, so ids stay unique even if the server's
    /// pages shifted between requests. Returns the number of rows appended.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, page: PageResult) -> usize {
        self.in_flight = None;
        let received = page.items.len();

        let mut seen: HashSet<EmployeeId> = self.store.iter().map(|item| item.id.clone()).collect();
        let fresh: Vec<ListItem> = page
            .items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        if fresh.len() < received {
            debug!(
                "Dropped {} duplicate rows from page {}",
                received - fresh.len(),
                ticket.query.page
            );
        }

        let appended = fresh.len();
        self.store.append(fresh);
        self.cursor.advance(ticket.query.page, page.metadata, received);
        if let Some(total) = self.cursor.total_count() {
            if self.store.len() as u64 > total {
                warn!("Holding {} rows but server reports {} in total", self.store.len(), total);
            }
        }
        self.phase = ListPhase::Loaded;
        appended
    }

    /// Records a failed fetch. Rows already held are kept.
    pub fn fail_fetch(&mut self, error: SyncError) {
        self.in_flight = None;
        self.phase = ListPhase::Errored(error);
    }

    /// Discards every row, the cursor position, the selection and the edit
    /// session, and starts a new generation.
    pub fn reset(&mut self) {
        self.store.reset();
        self.cursor.reset();
        self.selection.clear();
        self.editing = None;
        self.generation += 1;
        self.in_flight = None;
        self.phase = ListPhase::Idle;
    }

    /// Sets the full-name filter. Returns true if it changed.
    pub fn set_search(&mut self, search: Option<String>) -> bool {
        let search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if search == self.search {
            return false;
        }
        self.search = search;
        true
    }

    // ── Local patches ────────────────────────────────────────────

    pub(crate) fn store_mut(&mut self) -> &mut ListStore {
        &mut self.store
    }

    // ── Selection ────────────────────────────────────────────────

    pub fn toggle_selection(&mut self, id: EmployeeId, selected: bool) {
        self.selection.toggle(id, selected);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn replace_selection(&mut self, ids: impl IntoIterator<Item = EmployeeId>) {
        self.selection.replace_all(ids);
    }

    // ── Edit session ─────────────────────────────────────────────

    pub fn begin_edit(&mut self, record: DetailRecord) {
        self.editing = Some(record);
    }

    pub fn end_edit(&mut self) -> Option<DetailRecord> {
        self.editing.take()
    }

    /// Copies the state out for observers.
    pub fn snapshot(&self, mutations: MutationStates) -> ListSnapshot {
        ListSnapshot {
            items: self.store.items().to_vec(),
            phase: self.phase.clone(),
            selection: self.selection.ids(),
            has_more: self.has_more(),
            total_count: self.cursor.total_count(),
            page: self.cursor.page(),
            search: self.search.clone(),
            editing: self.editing.clone(),
            mutations,
        }
    }
}

/// A point-in-time copy of the list for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    pub items: Vec<ListItem>,
    pub phase: ListPhase,
    pub selection: Vec<EmployeeId>,
    pub has_more: bool,
    pub total_count: Option<u64>,
    pub page: u32,
    pub search: Option<String>,
    pub editing: Option<DetailRecord>,
    pub mutations: MutationStates,
}

impl ListSnapshot {
    /// List-level error of the last fetch.
    pub fn error(&self) -> Option<&SyncError> {
        match &self.phase {
            ListPhase::Errored(error) => Some(error),
            _ => None,
        }
    }

    /// The "no employees found" condition: loaded, and nothing to show.
    pub fn is_empty_and_loaded(&self) -> bool {
        self.items.is_empty() && self.phase == ListPhase::Loaded
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ListPhase::Fetching(_))
    }
}
