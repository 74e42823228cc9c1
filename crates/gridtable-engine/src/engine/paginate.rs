//! Page slicing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page position over the filtered row set. `page_index` is zero-based.
///
/// `total_pages` is `ceil(total_rows / page_size)`, so an empty set has zero
/// pages and `page_index` stays at 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        PaginationState::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> PaginationState {
        PaginationState {
            page_index: 0,
            page_size: page_size.max(1),
            total_rows: 0,
            total_pages: 0,
        }
    }

    /// Recount pages for `total_rows`, pulling `page_index` back into range.
    pub fn with_total(self, total_rows: usize) -> PaginationState {
        let total_pages = total_rows.div_ceil(self.page_size);
        PaginationState {
            page_index: self.page_index.min(total_pages.saturating_sub(1)),
            total_rows,
            total_pages,
            ..self
        }
    }

    /// Move to `page_index`. Returns `None` if the page does not exist.
    pub fn go_to(self, page_index: usize) -> Option<PaginationState> {
        if page_index >= self.total_pages && !(page_index == 0 && self.total_pages == 0) {
            return None;
        }
        Some(PaginationState { page_index, ..self })
    }

    /// Change the page size, keeping the page index if it is still in range.
    pub fn with_page_size(self, page_size: usize) -> PaginationState {
        PaginationState {
            page_size: page_size.max(1),
            ..self
        }
        .with_total(self.total_rows)
    }

    pub fn has_next_page(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }

    /// Index of the first row on the current page within the filtered set.
    pub fn start_index(&self) -> usize {
        (self.page_index * self.page_size).min(self.total_rows)
    }

    /// One past the last row on the current page.
    pub fn end_index(&self) -> usize {
        (self.start_index() + self.page_size).min(self.total_rows)
    }
}

/// The slice of `rows` on the current page.
pub fn paginate<'r, X>(rows: &'r [X], state: &PaginationState) -> &'r [X] {
    let start = (state.page_index * state.page_size).min(rows.len());
    let end = (start + state.page_size).min(rows.len());
    &rows[start..end]
}
