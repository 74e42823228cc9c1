//! Paging, selection and whole-state access.

use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use gridtable_engine::engine::{
    FilterState, PaginationState, Row, RowData, RowId, SortState, Warning,
};

use super::pipeline::TableState;
use super::state::{DataTable, Notice, TableInner};
use crate::error::Result;

/// Partial view state for [`DataTable::set_state`]. Unset fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStatePatch {
    pub sort: Option<SortState>,
    pub filter: Option<FilterState>,
    pub page_index: Option<usize>,
    pub page_size: Option<usize>,
    pub selected_row_ids: Option<BTreeSet<RowId>>,
}

impl<T: RowData> TableInner<T> {
    fn pagination_enabled(&mut self) -> bool {
        let enabled = self.settings.pagination.enabled;
        self.require(enabled, "pagination")
    }

    fn move_to_page(&mut self, page_index: usize) -> Option<Vec<Notice<T>>> {
        if !self.pagination_enabled() || page_index == self.pagination.page_index {
            return None;
        }
        match self.pagination.go_to(page_index) {
            Some(pagination) => {
                self.pagination = pagination;
                Some(vec![Notice::Page])
            }
            None => {
                self.warn(Warning::PageOutOfRange {
                    page_index,
                    total_pages: self.pagination.total_pages,
                });
                None
            }
        }
    }

    /// Clamp a requested page size into `1..=max`, warning when it had to move.
    fn checked_page_size(&mut self, requested: usize) -> Option<usize> {
        let max = self.settings.pagination.max_page_size.max(1);
        if requested == 0 {
            self.warn(Warning::InvalidPageSize { requested, max });
            return None;
        }
        if requested > max {
            self.warn(Warning::InvalidPageSize { requested, max });
            return Some(max);
        }
        Some(requested)
    }

    fn selection_enabled(&mut self) -> bool {
        let enabled = self.settings.selection.enabled;
        self.require(enabled, "selection")
    }

    fn known_row(&mut self, id: &RowId) -> bool {
        if self.row_index(id).is_some() {
            return true;
        }
        self.warn(Warning::UnknownRow { row_id: id.clone() });
        false
    }
}

impl<T: RowData> DataTable<T> {
    // Pagination

    pub fn go_to_page(&self, page_index: usize) -> Result<()> {
        self.mutate(|inner| inner.move_to_page(page_index))
    }

    /// Advance one page. Does nothing on the last page.
    pub fn next_page(&self) -> Result<()> {
        self.mutate(|inner| {
            if !inner.pagination.has_next_page() {
                return None;
            }
            let next = inner.pagination.page_index + 1;
            inner.move_to_page(next)
        })
    }

    /// Go back one page. Does nothing on the first page.
    pub fn previous_page(&self) -> Result<()> {
        self.mutate(|inner| {
            if !inner.pagination.has_previous_page() {
                return None;
            }
            let previous = inner.pagination.page_index - 1;
            inner.move_to_page(previous)
        })
    }

    pub fn first_page(&self) -> Result<()> {
        self.go_to_page(0)
    }

    pub fn last_page(&self) -> Result<()> {
        self.mutate(|inner| {
            let last = inner.pagination.total_pages.checked_sub(1)?;
            inner.move_to_page(last)
        })
    }

    /// Change the page size. Zero is rejected; sizes above the configured
    /// maximum are clamped to it. The page index is pulled back into range.
    pub fn set_page_size(&self, page_size: usize) -> Result<()> {
        self.mutate(|inner| {
            if !inner.pagination_enabled() {
                return None;
            }
            let page_size = inner.checked_page_size(page_size)?;
            if page_size == inner.pagination.page_size {
                return None;
            }
            inner.pagination = inner.pagination.with_page_size(page_size);
            Some(vec![Notice::Page])
        })
    }

    pub fn get_pagination(&self) -> Result<PaginationState> {
        self.read(|inner| inner.pagination)
    }

    // Selection

    /// Select one row. In single-selection mode any other selection is replaced.
    pub fn select_row(&self, id: impl Into<RowId>) -> Result<()> {
        let id = id.into();
        self.mutate(|inner| {
            if !inner.selection_enabled() || !inner.known_row(&id) {
                return None;
            }
            if inner.selection.is_selected(&id) {
                return None;
            }
            if inner.settings.selection.multiple {
                inner.selection.select(id.clone());
            } else {
                inner.selection.select_only(id.clone());
            }
            Some(vec![
                Notice::RowSelect {
                    row_id: id,
                    selected: true,
                },
                Notice::Selection,
            ])
        })
    }

    pub fn deselect_row(&self, id: impl Into<RowId>) -> Result<()> {
        let id = id.into();
        self.mutate(|inner| {
            if !inner.selection_enabled() {
                return None;
            }
            if inner.row_index(&id).is_none() {
                inner.warn(Warning::UnknownRow { row_id: id });
                return None;
            }
            if !inner.selection.deselect(&id) {
                return None;
            }
            Some(vec![
                Notice::RowSelect {
                    row_id: id,
                    selected: false,
                },
                Notice::Selection,
            ])
        })
    }

    pub fn toggle_row_selection(&self, id: impl Into<RowId>) -> Result<()> {
        let id = id.into();
        if self.is_row_selected(id.clone())? {
            self.deselect_row(id)
        } else {
            self.select_row(id)
        }
    }

    /// Select every row that passes the current filters, on every page.
    ///
    /// Rows selected earlier and now hidden by a filter stay selected, so
    /// [`Self::get_selected_rows`] can return more rows than the filtered set.
    pub fn select_all(&self) -> Result<()> {
        self.mutate(|inner| {
            if !inner.selection_enabled() {
                return None;
            }
            let multiple = inner.settings.selection.multiple;
            if !inner.require(multiple, "multiple selection") {
                return None;
            }
            let ids = std::mem::take(&mut inner.filtered_ids);
            let added = inner.selection.select_all(&ids);
            inner.filtered_ids = ids;
            (added > 0).then(|| vec![Notice::Selection])
        })
    }

    /// Deselect the rows [`Self::select_all`] would select. Selections hidden
    /// by the current filters are kept.
    pub fn deselect_all(&self) -> Result<()> {
        self.mutate(|inner| {
            if !inner.selection_enabled() {
                return None;
            }
            let ids = std::mem::take(&mut inner.filtered_ids);
            let removed = inner.selection.deselect_all(&ids);
            inner.filtered_ids = ids;
            (removed > 0).then(|| vec![Notice::Selection])
        })
    }

    /// Selected rows in data order, including rows hidden by the current
    /// filters. The filtered selection is the intersection with
    /// `processed_row_ids` of [`Self::get_state`].
    pub fn get_selected_rows(&self) -> Result<Vec<Row<T>>> {
        self.read(|inner| {
            inner
                .rows
                .iter()
                .filter(|r| inner.selection.is_selected(&r.id))
                .map(|r| inner.stamp(r))
                .collect()
        })
    }

    pub fn is_row_selected(&self, id: impl Into<RowId>) -> Result<bool> {
        let id = id.into();
        self.read(|inner| inner.selection.is_selected(&id))
    }

    // Whole state

    /// The current snapshot. It is never mutated; later changes produce a new one.
    pub fn get_state(&self) -> Result<Rc<TableState<T>>> {
        self.read(|inner| Rc::clone(&inner.snapshot))
    }

    /// Apply several state fields at once, emitting one event per changed
    /// area and a single `state:change`.
    pub fn set_state(&self, patch: TableStatePatch) -> Result<()> {
        self.mutate(|inner| {
            let mut notices = Vec::new();
            if let Some(sort) = patch.sort {
                if sort != inner.sort {
                    inner.sort = sort;
                    notices.push(Notice::Sort);
                }
            }
            if let Some(filter) = patch.filter {
                if filter != inner.filter {
                    inner.filter = filter;
                    inner.pending_search = None;
                    notices.push(Notice::Filter);
                }
            }
            if let Some(page_size) = patch.page_size {
                if let Some(page_size) = inner.checked_page_size(page_size) {
                    inner.pagination = inner.pagination.with_page_size(page_size);
                }
            }
            if let Some(page_index) = patch.page_index {
                // Page count depends on the patched filter; it is re-clamped by recompute.
                inner.pagination.page_index = page_index;
            }
            if let Some(ids) = patch.selected_row_ids {
                let live: HashSet<&RowId> = inner.rows.iter().map(|r| &r.id).collect();
                let wanted: Vec<RowId> = ids.into_iter().filter(|id| live.contains(id)).collect();
                inner.selection.clear();
                inner.selection.select_all(&wanted);
                notices.push(Notice::Selection);
            }
            Some(notices)
        })
    }

    /// Restore the default sort, clear filters and selection and return to
    /// the first page. Only `state:change` is emitted.
    pub fn reset_state(&self) -> Result<()> {
        self.apply(false, |inner| {
            inner.sort = if inner.settings.sorting.enabled {
                SortState::from_specs(inner.settings.sorting.default_sort.clone())
            } else {
                SortState::Unsorted
            };
            inner.filter = FilterState::default();
            inner.pending_search = None;
            inner.pagination = PaginationState::new(inner.settings.pagination.effective_page_size());
            inner.selection.clear();
            Some(Vec::new())
        })
    }
}
