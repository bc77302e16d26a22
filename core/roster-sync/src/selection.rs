//! Cross-page selection.

use roster_types::EmployeeId;
use std::collections::BTreeSet;

/// Ids marked for a bulk action.
///
/// The tracker knows nothing about which rows are materialized; a selected
/// id may refer to a row that is not currently held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    ids: BTreeSet<EmployeeId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` when `selected`, removes it otherwise.
    pub fn toggle(&mut self, id: EmployeeId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Sets the selection to exactly `ids`.
    pub fn replace_all(&mut self, ids: impl IntoIterator<Item = EmployeeId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn is_selected(&self, id: &EmployeeId) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in identifier order.
    pub fn ids(&self) -> Vec<EmployeeId> {
        self.ids.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
