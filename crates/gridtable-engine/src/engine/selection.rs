//! Row selection bookkeeping.
//!
//! The tracker only stores ids. The aggregate flags depend on which rows are
//! currently visible, so they are derived on demand by [`SelectionTracker::state`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::row::RowId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_row_ids: BTreeSet<RowId>,
    /// Every row in the filtered set is selected (and there is at least one).
    pub is_all_selected: bool,
    /// Some, but not all, rows in the filtered set are selected.
    pub is_partially_selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: BTreeSet<RowId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was newly selected.
    pub fn select(&mut self, id: RowId) -> bool {
        self.selected.insert(id)
    }

    /// Returns true if the id was selected before.
    pub fn deselect(&mut self, id: &RowId) -> bool {
        self.selected.remove(id)
    }

    /// Flip membership and return the new state.
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Replace the selection with exactly `id`.
    pub fn select_only(&mut self, id: RowId) {
        self.selected.clear();
        self.selected.insert(id);
    }

    /// Add every id in `ids`. Returns how many were newly selected.
    pub fn select_all<'i>(&mut self, ids: impl IntoIterator<Item = &'i RowId>) -> usize {
        ids.into_iter()
            .filter(|id| self.selected.insert((*id).clone()))
            .count()
    }

    /// Remove every id in `ids`, leaving other selections alone. Returns how many were removed.
    pub fn deselect_all<'i>(&mut self, ids: impl IntoIterator<Item = &'i RowId>) -> usize {
        ids.into_iter().filter(|id| self.selected.remove(*id)).count()
    }

    /// Drop selections for which `keep` is false. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&RowId) -> bool) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| keep(id));
        before - self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.selected.iter()
    }

    /// Snapshot the selection against the ids of the filtered set.
    pub fn state<'i>(&self, filtered: impl IntoIterator<Item = &'i RowId>) -> SelectionState {
        let (mut total, mut hits) = (0usize, 0usize);
        for id in filtered {
            total += 1;
            if self.selected.contains(id) {
                hits += 1;
            }
        }
        SelectionState {
            selected_row_ids: self.selected.clone(),
            is_all_selected: total > 0 && hits == total,
            is_partially_selected: hits > 0 && hits < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RowId> {
        raw.iter().map(|s| RowId::from(*s)).collect()
    }

    #[test]
    fn test_toggle_flips() {
        let mut tracker = SelectionTracker::new();
        assert!(tracker.toggle(RowId::from("a")));
        assert!(tracker.is_selected(&RowId::from("a")));
        assert!(!tracker.toggle(RowId::from("a")));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_select_all_then_flags() {
        let visible = ids(&["a", "b", "c"]);
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.select_all(&visible), 3);
        let state = tracker.state(&visible);
        assert!(state.is_all_selected);
        assert!(!state.is_partially_selected);
        assert_eq!(state.selected_row_ids.len(), 3);
    }

    #[test]
    fn test_partial_selection() {
        let visible = ids(&["a", "b", "c"]);
        let mut tracker = SelectionTracker::new();
        tracker.select(RowId::from("b"));
        let state = tracker.state(&visible);
        assert!(!state.is_all_selected);
        assert!(state.is_partially_selected);
    }

    #[test]
    fn test_empty_visible_set_is_never_all_selected() {
        let mut tracker = SelectionTracker::new();
        tracker.select(RowId::from("hidden"));
        let state = tracker.state(std::iter::empty());
        assert!(!state.is_all_selected);
        assert!(!state.is_partially_selected);
        assert_eq!(state.selected_row_ids.len(), 1);
    }

    #[test]
    fn test_deselect_all_leaves_hidden_selections() {
        let mut tracker = SelectionTracker::new();
        tracker.select_all(&ids(&["a", "b", "hidden"]));
        assert_eq!(tracker.deselect_all(&ids(&["a", "b"])), 2);
        assert!(tracker.is_selected(&RowId::from("hidden")));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_select_only_replaces() {
        let mut tracker = SelectionTracker::new();
        tracker.select_all(&ids(&["a", "b"]));
        tracker.select_only(RowId::from("c"));
        assert_eq!(tracker.ids().cloned().collect::<Vec<_>>(), ids(&["c"]));
    }

    #[test]
    fn test_retain_prunes_deleted_rows() {
        let mut tracker = SelectionTracker::new();
        tracker.select_all(&ids(&["a", "b", "c"]));
        let live = ids(&["a", "c"]);
        assert_eq!(tracker.retain(|id| live.contains(id)), 1);
        assert!(!tracker.is_selected(&RowId::from("b")));
    }
}
