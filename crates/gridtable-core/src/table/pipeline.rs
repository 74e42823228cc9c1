use serde::Serialize;
use std::rc::Rc;

use gridtable_engine::engine::{
    Column, FilterState, PaginationState, Row, RowData, RowId, SelectionState, SortState,
    filter_rows, paginate, sort_rows,
};

use super::state::{Notice, TableInner};
use crate::events::TableEvent;

/// Read-only snapshot of a table, replaced wholesale after every mutation.
///
/// `data` holds the raw rows with `selected` unset; selection lives in
/// `selection` and is stamped onto `visible_rows`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = "T: Serialize"))]
pub struct TableState<T> {
    pub data: Rc<Vec<Row<T>>>,
    #[serde(skip)]
    pub columns: Rc<Vec<Column<T>>>,
    /// Current page after filter, sort and paginate.
    pub visible_rows: Vec<Row<T>>,
    /// Ids of the filtered and sorted rows across all pages.
    pub processed_row_ids: Vec<RowId>,
    pub sort: SortState,
    pub filter: FilterState,
    pub pagination: PaginationState,
    pub selection: SelectionState,
    /// Search term waiting out the debounce delay.
    pub pending_search: Option<String>,
}

impl<T> Default for TableState<T> {
    fn default() -> Self {
        TableState {
            data: Rc::new(Vec::new()),
            columns: Rc::new(Vec::new()),
            visible_rows: Vec::new(),
            processed_row_ids: Vec::new(),
            sort: SortState::default(),
            filter: FilterState::default(),
            pagination: PaginationState::default(),
            selection: SelectionState::default(),
            pending_search: None,
        }
    }
}

impl<T: RowData> TableInner<T> {
    /// Rerun `filter -> sort -> paginate` and replace the snapshot.
    pub(crate) fn recompute(&mut self) {
        let rows = Rc::clone(&self.rows);
        let columns = Rc::clone(&self.columns);

        let filtered: Vec<&Row<T>> = if self.settings.filtering.enabled {
            let out = filter_rows(rows.iter(), &self.filter, &columns, &self.filter_options);
            for warning in out.warnings {
                self.warn(warning);
            }
            out.rows
        } else {
            rows.iter().collect()
        };

        let sorted = if self.settings.sorting.enabled {
            sort_rows(filtered, &self.sort, &columns, &self.comparators)
        } else {
            filtered
        };

        self.pagination = self.pagination.with_total(sorted.len());
        let page: &[&Row<T>] = if self.settings.pagination.enabled {
            paginate(&sorted, &self.pagination)
        } else {
            &sorted
        };
        let visible_rows: Vec<Row<T>> = page.iter().map(|row| self.stamp(row)).collect();

        self.filtered_ids = sorted.iter().map(|r| r.id.clone()).collect();
        let selection = self.selection.state(&self.filtered_ids);
        let processed_row_ids = self.filtered_ids.clone();

        log::debug!(
            "[{}] pipeline: {} rows -> {} filtered -> {} visible (page {}/{})",
            self.id,
            rows.len(),
            processed_row_ids.len(),
            visible_rows.len(),
            self.pagination.page_index + 1,
            self.pagination.total_pages
        );

        self.snapshot = Rc::new(TableState {
            data: rows.clone(),
            columns,
            visible_rows,
            processed_row_ids,
            sort: self.sort.clone(),
            filter: self.filter.clone(),
            pagination: self.pagination,
            selection,
            pending_search: self.pending_search.as_ref().map(|p| p.term.clone()),
        });
    }

    /// Copy of `row` with the current selection flag.
    pub(crate) fn stamp(&self, row: &Row<T>) -> Row<T> {
        let mut row = row.clone();
        row.selected = self.selection.is_selected(&row.id);
        row
    }

    pub(crate) fn materialize(&self, notice: Notice<T>) -> Option<TableEvent<T>> {
        let event = match notice {
            Notice::Data(delta) => TableEvent::DataChange(delta),
            Notice::ColumnVisibility { column_id, visible } => {
                TableEvent::ColumnVisibility { column_id, visible }
            }
            Notice::Sort => TableEvent::SortChange(self.sort.clone()),
            Notice::Filter => TableEvent::FilterChange(self.filter.clone()),
            Notice::Search(term) => TableEvent::SearchChange(term),
            Notice::Page => TableEvent::PageChange {
                page_index: self.pagination.page_index,
                page_size: self.pagination.page_size,
            },
            Notice::Selection => TableEvent::SelectionChange {
                selected_row_ids: self.snapshot.selection.selected_row_ids.clone(),
            },
            Notice::RowSelect { row_id, selected } => {
                let row = self.rows.iter().find(|r| r.id == row_id)?;
                TableEvent::RowSelect {
                    row: self.stamp(row),
                    selected,
                }
            }
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{TableConfig, TableSettings};
    use crate::table::DataTable;
    use crate::table::fixtures::{people, people_columns};
    use gridtable_engine::engine::{Filter, FilterOperator, Record, RowData, SortDirection, Value};

    fn names(table: &DataTable<Record>) -> Vec<String> {
        table
            .get_state()
            .unwrap()
            .visible_rows
            .iter()
            .map(|r| r.data.field("name").display())
            .collect()
    }

    #[test]
    fn test_filter_then_sort_then_paginate() {
        let mut settings = TableSettings::default();
        settings.pagination.page_size = 2;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table
            .add_filter(Filter::new("active", FilterOperator::Equals, true))
            .unwrap();
        table.sort("age", Some(SortDirection::Desc)).unwrap();
        assert_eq!(names(&table), vec!["Charlie", "Bob"]);

        let state = table.get_state().unwrap();
        assert_eq!(state.pagination.total_rows, 3);
        assert_eq!(state.pagination.total_pages, 2);
        assert_eq!(state.processed_row_ids.len(), 3);

        table.next_page().unwrap();
        assert_eq!(names(&table), vec!["John"]);
    }

    #[test]
    fn test_disabled_features_skip_stages() {
        let mut settings = TableSettings::default();
        settings.pagination.enabled = false;
        settings.pagination.page_size = 2;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        assert_eq!(names(&table).len(), 5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let table = DataTable::new(TableConfig::new(people_columns()).with_data(people()));
        table.select_row(2).unwrap();
        let json = serde_json::to_value(&*table.get_state().unwrap()).unwrap();
        assert_eq!(json["pagination"]["totalRows"], 5);
        assert_eq!(json["visibleRows"][1]["selected"], true);
        assert_eq!(json["visibleRows"][1]["data"]["name"], "Jane");
        assert_eq!(json["selection"]["selectedRowIds"][0], "2");
        assert_eq!(
            Value::from(json["data"][0]["data"]["age"].clone()),
            Value::Number(30.0)
        );
    }
}
