//! Incremental list store.
//!
//! Holds fetched rows in server order. Pages are appended as they arrive and
//! never re-sorted client-side.

use roster_types::{EmployeeId, ListItem, ListItemPatch};
use std::collections::HashSet;

/// Ordered sequence of materialized rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListStore {
    items: Vec<ListItem>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenates `items` to the end. No identity check is made here; the
    /// caller must not append the same rows twice.
    pub fn append(&mut self, items: impl IntoIterator<Item = ListItem>) {
        self.items.extend(items);
    }

    /// Drops every row.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Applies a shallow patch to the row with `id`. Returns false if no such
    /// row is held, which is not an error: it may have been removed meanwhile.
    pub fn replace_one(&mut self, id: &EmployeeId, patch: &ListItemPatch) -> bool {
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                patch.apply(item);
                true
            }
            None => false,
        }
    }

    /// Removes every row whose id is in `ids`, keeping the rest in order.
    /// Returns the number of rows removed.
    pub fn remove_many(&mut self, ids: &[EmployeeId]) -> usize {
        let ids: HashSet<&EmployeeId> = ids.iter().collect();
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id));
        before - self.items.len()
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&ListItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn contains(&self, id: &EmployeeId) -> bool {
        self.get(id).is_some()
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
