//! Data, column, sort and filter mutators.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gridtable_engine::engine::{
    AggregateSpec, Column, CustomFilter, Filter, FilterScript, FilterState, Row, RowData, RowId,
    SortDirection, SortSpec, SortState, Value, Warning, aggregate,
};

use super::state::{DataTable, Notice, PendingSearch, TableInner};
use crate::error::Result;
use crate::events::DataDelta;

impl<T: RowData> TableInner<T> {
    fn processed(&self) -> Vec<&Row<T>> {
        let by_id: HashMap<&RowId, &Row<T>> = self.rows.iter().map(|r| (&r.id, r)).collect();
        self.snapshot
            .processed_row_ids
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .collect()
    }
}

impl<T: RowData> DataTable<T> {
    // Data

    /// Replace every row. Selections survive for ids that are still present.
    pub fn set_data(&self, rows: Vec<Row<T>>) -> Result<()> {
        self.mutate(|inner| {
            let before = inner.selection.clone();
            let rows = inner.ingest(rows);
            let count = rows.len();
            inner.rows = Rc::new(rows);
            inner.prune_selection();
            let mut notices = vec![Notice::Data(DataDelta::Replaced { count })];
            if inner.selection != before {
                notices.push(Notice::Selection);
            }
            Some(notices)
        })
    }

    /// All rows in insertion order, with `selected` reflecting the current selection.
    pub fn get_data(&self) -> Result<Vec<Row<T>>> {
        self.read(|inner| inner.rows.iter().map(|r| inner.stamp(r)).collect())
    }

    pub fn add_row(&self, row: Row<T>) -> Result<()> {
        self.mutate(|inner| {
            if inner.row_index(&row.id).is_some() {
                inner.warn(Warning::DuplicateRow { row_id: row.id });
                return None;
            }
            let row = inner.ingest(vec![row]).pop()?;
            Rc::make_mut(&mut inner.rows).push(row.clone());
            let mut notices = vec![Notice::Data(DataDelta::Added(inner.stamp(&row)))];
            if inner.selection.is_selected(&row.id) {
                notices.push(Notice::RowSelect {
                    row_id: row.id,
                    selected: true,
                });
                notices.push(Notice::Selection);
            }
            Some(notices)
        })
    }

    /// Merge `patch` into the row's data. Fields the patch leaves out are kept.
    pub fn update_row(&self, id: impl Into<RowId>, patch: T) -> Result<()> {
        let id = id.into();
        self.mutate(|inner| {
            let Some(index) = inner.row_index(&id) else {
                inner.warn(Warning::UnknownRow { row_id: id });
                return None;
            };
            Rc::make_mut(&mut inner.rows)[index].data.merge(patch);
            let row = inner.stamp(&inner.rows[index]);
            Some(vec![Notice::Data(DataDelta::Updated(row))])
        })
    }

    pub fn delete_row(&self, id: impl Into<RowId>) -> Result<()> {
        let id = id.into();
        self.mutate(|inner| {
            let Some(index) = inner.row_index(&id) else {
                inner.warn(Warning::UnknownRow { row_id: id });
                return None;
            };
            let removed = Rc::make_mut(&mut inner.rows).remove(index);
            let mut notices = vec![Notice::Data(DataDelta::Deleted(removed.id))];
            if inner.prune_selection() {
                notices.push(Notice::Selection);
            }
            Some(notices)
        })
    }

    pub fn clear_data(&self) -> Result<()> {
        self.mutate(|inner| {
            let had_selection = !inner.selection.is_empty();
            inner.rows = Rc::new(Vec::new());
            inner.selection.clear();
            let mut notices = vec![Notice::Data(DataDelta::Cleared)];
            if had_selection {
                notices.push(Notice::Selection);
            }
            Some(notices)
        })
    }

    /// Filtered and sorted rows across all pages.
    pub fn processed_rows(&self) -> Result<Vec<Row<T>>> {
        self.read(|inner| inner.processed().into_iter().map(|r| inner.stamp(r)).collect())
    }

    // Columns

    pub fn get_columns(&self) -> Result<Vec<Column<T>>> {
        self.read(|inner| inner.columns.as_ref().clone())
    }

    pub fn visible_columns(&self) -> Result<Vec<Column<T>>> {
        self.read(|inner| {
            inner
                .columns
                .iter()
                .filter(|c| c.is_visible())
                .cloned()
                .collect()
        })
    }

    /// Replace the column set. Sort and filter entries for removed columns are
    /// kept and skipped by the pipeline.
    ///
    /// There is no column event for a wholesale replacement; listeners see
    /// only `state:change`.
    pub fn set_columns(&self, columns: Vec<Column<T>>) -> Result<()> {
        self.mutate(|inner| {
            inner.columns = Rc::new(columns);
            Some(Vec::new())
        })
    }

    pub fn show_column(&self, column_id: &str) -> Result<()> {
        self.set_column_visibility(column_id, Some(true))
    }

    pub fn hide_column(&self, column_id: &str) -> Result<()> {
        self.set_column_visibility(column_id, Some(false))
    }

    pub fn toggle_column(&self, column_id: &str) -> Result<()> {
        self.set_column_visibility(column_id, None)
    }

    fn set_column_visibility(&self, column_id: &str, visible: Option<bool>) -> Result<()> {
        self.mutate(|inner| {
            let Some(index) = inner.columns.iter().position(|c| c.id == column_id) else {
                inner.warn(Warning::UnknownColumn {
                    column_id: column_id.to_string(),
                });
                return None;
            };
            let current = inner.columns[index].is_visible();
            let visible = visible.unwrap_or(!current);
            if visible == current {
                return None;
            }
            Rc::make_mut(&mut inner.columns)[index].set_visible(visible);
            Some(vec![Notice::ColumnVisibility {
                column_id: column_id.to_string(),
                visible,
            }])
        })
    }

    // Sorting

    /// Sort by one column. Without a direction, repeated calls cycle
    /// `none -> asc -> desc -> none`.
    pub fn sort(&self, column_id: &str, direction: Option<SortDirection>) -> Result<()> {
        self.mutate(|inner| {
            let enabled = inner.settings.sorting.enabled;
            if !inner.require(enabled, "sorting") {
                return None;
            }
            let sortable = inner
                .columns
                .iter()
                .find(|c| c.id == column_id)
                .map(|c| c.is_sortable());
            match sortable {
                None => {
                    inner.warn(Warning::UnknownColumn {
                        column_id: column_id.to_string(),
                    });
                    return None;
                }
                Some(false) => {
                    inner.warn(Warning::ColumnNotSortable {
                        column_id: column_id.to_string(),
                    });
                    return None;
                }
                Some(true) => {}
            }
            let direction =
                direction.unwrap_or_else(|| inner.sort.direction_of(column_id).cycle());
            inner.sort = match direction {
                SortDirection::None => SortState::Unsorted,
                direction => SortState::Single(SortSpec::new(column_id, direction)),
            };
            Some(vec![Notice::Sort])
        })
    }

    /// Sort by several columns, earlier specs taking precedence.
    pub fn multi_sort(&self, specs: Vec<SortSpec>) -> Result<()> {
        self.mutate(|inner| {
            let enabled = inner.settings.sorting.enabled;
            if !inner.require(enabled, "sorting") {
                return None;
            }
            let multi = inner.settings.sorting.multi_sort;
            if !inner.require(multi, "multi-column sorting") {
                return None;
            }
            let mut kept = Vec::with_capacity(specs.len());
            for spec in specs {
                match inner.columns.iter().find(|c| c.id == spec.column_id) {
                    None => inner.warn(Warning::UnknownColumn {
                        column_id: spec.column_id,
                    }),
                    Some(column) if !column.is_sortable() => {
                        inner.warn(Warning::ColumnNotSortable {
                            column_id: spec.column_id,
                        })
                    }
                    Some(_) => kept.push(spec),
                }
            }
            inner.sort = if kept.is_empty() {
                SortState::Unsorted
            } else {
                SortState::Multi(kept)
            };
            Some(vec![Notice::Sort])
        })
    }

    pub fn clear_sort(&self) -> Result<()> {
        self.mutate(|inner| {
            if inner.sort == SortState::Unsorted {
                return None;
            }
            inner.sort = SortState::Unsorted;
            Some(vec![Notice::Sort])
        })
    }

    pub fn get_sort_state(&self) -> Result<SortState> {
        self.read(|inner| inner.sort.clone())
    }

    // Filtering

    /// Add a filter, replacing any existing filter on the same column.
    pub fn add_filter(&self, filter: Filter) -> Result<()> {
        self.mutate(|inner| {
            let enabled = inner.settings.filtering.enabled;
            if !inner.require(enabled, "filtering") {
                return None;
            }
            if !inner.has_column(&filter.column_id)
                && !inner
                    .filter_options
                    .custom_filters
                    .contains_key(&filter.column_id)
            {
                inner.warn(Warning::UnknownColumn {
                    column_id: filter.column_id,
                });
                return None;
            }
            let filters = &mut inner.filter.filters;
            match filters.iter_mut().find(|f| f.column_id == filter.column_id) {
                Some(existing) => *existing = filter,
                None => filters.push(filter),
            }
            inner.pagination.page_index = 0;
            Some(vec![Notice::Filter])
        })
    }

    pub fn remove_filter(&self, column_id: &str) -> Result<()> {
        self.mutate(|inner| {
            let before = inner.filter.filters.len();
            inner.filter.filters.retain(|f| f.column_id != column_id);
            if inner.filter.filters.len() == before {
                return None;
            }
            inner.pagination.page_index = 0;
            Some(vec![Notice::Filter])
        })
    }

    /// Replace every column filter. The global search term is kept.
    pub fn filter(&self, filters: Vec<Filter>) -> Result<()> {
        self.mutate(|inner| {
            let enabled = inner.settings.filtering.enabled;
            if !inner.require(enabled, "filtering") {
                return None;
            }
            inner.filter.filters = filters;
            inner.pagination.page_index = 0;
            Some(vec![Notice::Filter])
        })
    }

    /// Set the global search term. With a debounce delay configured the term
    /// is held until [`Self::poll`] finds it stable or [`Self::flush_search`] runs.
    pub fn search(&self, text: &str) -> Result<()> {
        let debounce_ms = self.quietly(|inner| {
            let filtering = &inner.settings.filtering;
            let enabled = filtering.enabled && filtering.global_search;
            let debounce_ms = filtering.debounce_ms;
            inner.require(enabled, "global search").then_some(debounce_ms)
        })?;
        match debounce_ms {
            None => Ok(()),
            Some(0) => self.apply_search(text.to_string()),
            Some(_) => self.quietly(|inner| {
                inner.pending_search = Some(PendingSearch {
                    term: text.to_string(),
                    since: Instant::now(),
                });
                Rc::make_mut(&mut inner.snapshot).pending_search = Some(text.to_string());
            }),
        }
    }

    fn apply_search(&self, term: String) -> Result<()> {
        self.mutate(|inner| {
            inner.pending_search = None;
            inner.filter.global_search = term.clone();
            inner.pagination.page_index = 0;
            Some(vec![Notice::Search(term), Notice::Filter])
        })
    }

    /// Apply a pending search term if it has been stable for the debounce delay.
    /// Returns true if a term was applied.
    pub fn poll(&self, now: Instant) -> Result<bool> {
        let due = self.read(|inner| {
            let delay = Duration::from_millis(inner.settings.filtering.debounce_ms);
            inner
                .pending_search
                .as_ref()
                .filter(|p| now.saturating_duration_since(p.since) >= delay)
                .map(|p| p.term.clone())
        })?;
        match due {
            Some(term) => self.apply_search(term).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn poll_now(&self) -> Result<bool> {
        self.poll(Instant::now())
    }

    /// Apply a pending search term immediately. Returns true if there was one.
    pub fn flush_search(&self) -> Result<bool> {
        let pending = self.read(|inner| inner.pending_search.as_ref().map(|p| p.term.clone()))?;
        match pending {
            Some(term) => self.apply_search(term).map(|_| true),
            None => Ok(false),
        }
    }

    /// Drop every filter, the search term and any pending search.
    pub fn clear_filters(&self) -> Result<()> {
        self.mutate(|inner| {
            if inner.filter.filters.is_empty()
                && inner.filter.global_search.is_empty()
                && inner.pending_search.is_none()
            {
                return None;
            }
            let had_search = !inner.filter.global_search.is_empty();
            inner.filter = FilterState::default();
            inner.pending_search = None;
            inner.pagination.page_index = 0;
            let mut notices = vec![Notice::Filter];
            if had_search {
                notices.push(Notice::Search(String::new()));
            }
            Some(notices)
        })
    }

    pub fn get_filter_state(&self) -> Result<FilterState> {
        self.read(|inner| inner.filter.clone())
    }

    /// Register a closure that replaces operator logic for `column_id`.
    pub fn register_filter(
        &self,
        column_id: &str,
        filter: impl Fn(&Value, &Filter, &T) -> bool + Send + Sync + 'static,
    ) -> Result<()> {
        self.mutate(|inner| {
            inner
                .filter_options
                .custom_filters
                .insert(column_id.to_string(), CustomFilter::Native(Arc::new(filter)));
            Some(Vec::new())
        })
    }

    /// Register a Rhai expression as the filter for `column_id`. A script that
    /// fails to compile is reported as a warning and not registered.
    pub fn register_filter_script(&self, column_id: &str, source: &str) -> Result<()> {
        self.mutate(|inner| {
            match FilterScript::compile(inner.engine.clone(), source) {
                Ok(script) => {
                    inner
                        .filter_options
                        .custom_filters
                        .insert(column_id.to_string(), CustomFilter::Script(script));
                    Some(Vec::new())
                }
                Err(message) => {
                    inner.warn(Warning::ScriptFailed {
                        column_id: column_id.to_string(),
                        message,
                    });
                    None
                }
            }
        })
    }

    pub fn unregister_filter(&self, column_id: &str) -> Result<()> {
        self.mutate(|inner| {
            inner
                .filter_options
                .custom_filters
                .remove(column_id)
                .map(|_| Vec::new())
        })
    }

    /// Aggregates over the filtered rows of every page, keyed by [`AggregateSpec::key`].
    pub fn aggregates(&self, specs: &[AggregateSpec]) -> Result<BTreeMap<String, Value>> {
        self.quietly(|inner| {
            let mut out = BTreeMap::new();
            let mut unknown = Vec::new();
            {
                let rows = inner.processed();
                for spec in specs {
                    match inner.columns.iter().find(|c| c.id == spec.column_id) {
                        Some(column) => {
                            out.insert(
                                spec.key(),
                                aggregate(rows.iter().copied(), column, spec.function),
                            );
                        }
                        None => unknown.push(spec.column_id.clone()),
                    }
                }
            }
            for column_id in unknown {
                inner.warn(Warning::UnknownColumn { column_id });
            }
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TableConfig, TableSettings};
    use crate::events::{EventKind, TableEvent};
    use crate::table::fixtures::{people, people_columns};
    use gridtable_engine::engine::{AggregateFn, FilterOperator, Record};
    use gridtable_engine::record;
    use std::cell::RefCell;

    fn table() -> DataTable<Record> {
        DataTable::new(TableConfig::new(people_columns()).with_data(people()))
    }

    fn ages(table: &DataTable<Record>) -> Vec<String> {
        table
            .get_state()
            .unwrap()
            .visible_rows
            .iter()
            .map(|r| r.data.field("age").display())
            .collect()
    }

    fn record_events(table: &DataTable<Record>) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = log.clone();
            table
                .on(kind, move |e: &TableEvent<Record>| {
                    log.borrow_mut().push(e.kind().name())
                })
                .unwrap();
        }
        log
    }

    #[test]
    fn test_round_trip() {
        let table = table();
        let rows = vec![
            Row::new("a", record! { "name" => "Zed" }),
            Row::new("b", record! { "name" => "Amy" }),
        ];
        table.set_data(rows.clone()).unwrap();
        assert_eq!(table.get_data().unwrap(), rows);
    }

    #[test]
    fn test_add_update_delete() {
        let table = table();
        table
            .add_row(Row::new(6, record! { "name" => "Dana", "age" => 51 }))
            .unwrap();
        table.update_row(1, record! { "age" => 31 }).unwrap();
        table.delete_row(2).unwrap();

        let data = table.get_data().unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data[0].data.field("age"), Value::from(31));
        assert_eq!(data[0].data.field("name"), Value::from("John"));
        assert_eq!(data[4].id, RowId::from(6));
        assert!(data.iter().all(|r| r.id != RowId::from(2)));
    }

    #[test]
    fn test_unknown_row_warns_without_events() {
        let table = table();
        let log = record_events(&table);
        table.update_row(99, record! { "age" => 1 }).unwrap();
        table.delete_row(99).unwrap();
        table.add_row(Row::new(1, record! {})).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(
            table.take_warnings(),
            vec![
                Warning::UnknownRow { row_id: 99.into() },
                Warning::UnknownRow { row_id: 99.into() },
                Warning::DuplicateRow { row_id: 1.into() },
            ]
        );
    }

    #[test]
    fn test_preselected_rows_emit_selection_events() {
        let table = table();
        let log = record_events(&table);
        let mut row = Row::new(7, record! { "name" => "Eve" });
        row.selected = true;
        table.add_row(row).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "data:change",
                "row:select",
                "selection:change",
                "state:change"
            ]
        );
        assert!(table.is_row_selected(7).unwrap());

        log.borrow_mut().clear();
        let mut row = Row::new("x", record! {});
        row.selected = true;
        table.set_data(vec![row]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["data:change", "selection:change", "state:change"]
        );

        log.borrow_mut().clear();
        table.add_row(Row::new("y", record! {})).unwrap();
        assert_eq!(*log.borrow(), vec!["data:change", "state:change"]);
    }

    #[test]
    fn test_set_columns_emits_state_change_only() {
        let table = table();
        let log = record_events(&table);
        table.set_columns(people_columns()).unwrap();
        assert_eq!(*log.borrow(), vec!["state:change"]);
    }

    #[test]
    fn test_specific_event_then_state_change() {
        let table = table();
        let log = record_events(&table);
        table.sort("age", Some(SortDirection::Asc)).unwrap();
        table.hide_column("name").unwrap();
        table.add_row(Row::new(9, record! {})).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "sort:change",
                "state:change",
                "column:visibility",
                "state:change",
                "data:change",
                "state:change",
            ]
        );
    }

    #[test]
    fn test_sort_cycles_without_direction() {
        let table = table();
        table.sort("age", None).unwrap();
        assert_eq!(ages(&table), vec!["25", "28", "30", "35", "42"]);
        table.sort("age", None).unwrap();
        assert_eq!(ages(&table), vec!["42", "35", "30", "28", "25"]);
        table.sort("age", None).unwrap();
        assert_eq!(table.get_sort_state().unwrap(), SortState::Unsorted);
        assert_eq!(ages(&table), vec!["30", "25", "35", "28", "42"]);
    }

    #[test]
    fn test_sort_rejections() {
        let mut columns = people_columns();
        columns[0] = Column::new("name", "name", "Name").sortable(false);
        let table = DataTable::new(TableConfig::new(columns).with_data(people()));
        table.sort("name", None).unwrap();
        table.sort("salary", None).unwrap();
        assert_eq!(table.get_sort_state().unwrap(), SortState::Unsorted);
        assert_eq!(
            table.take_warnings(),
            vec![
                Warning::ColumnNotSortable {
                    column_id: "name".into()
                },
                Warning::UnknownColumn {
                    column_id: "salary".into()
                },
            ]
        );
    }

    #[test]
    fn test_sorting_disabled() {
        let mut settings = TableSettings::default();
        settings.sorting.enabled = false;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table.sort("age", None).unwrap();
        assert_eq!(ages(&table), vec!["30", "25", "35", "28", "42"]);
        assert_eq!(
            table.take_warnings(),
            vec![Warning::FeatureDisabled { feature: "sorting" }]
        );
    }

    #[test]
    fn test_multi_sort() {
        let table = table();
        table
            .multi_sort(vec![SortSpec::desc("active"), SortSpec::asc("age")])
            .unwrap();
        assert_eq!(ages(&table), vec!["30", "35", "42", "25", "28"]);
    }

    #[test]
    fn test_multi_sort_disabled_by_setting() {
        let mut settings = TableSettings::default();
        settings.sorting.multi_sort = false;
        let table = DataTable::new(TableConfig::new(people_columns()).with_settings(settings));
        table.multi_sort(vec![SortSpec::asc("age")]).unwrap();
        assert_eq!(table.get_sort_state().unwrap(), SortState::Unsorted);
    }

    #[test]
    fn test_default_sort_applied_at_start() {
        let mut settings = TableSettings::default();
        settings.sorting.default_sort = vec![SortSpec::desc("age")];
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        assert_eq!(ages(&table), vec!["42", "35", "30", "28", "25"]);
    }

    #[test]
    fn test_add_filter_replaces_same_column() {
        let table = table();
        table
            .add_filter(Filter::new("age", FilterOperator::GreaterThan, 40))
            .unwrap();
        table
            .add_filter(Filter::new("age", FilterOperator::LessThan, 29))
            .unwrap();
        assert_eq!(table.get_filter_state().unwrap().filters.len(), 1);
        assert_eq!(ages(&table), vec!["25", "28"]);

        table.remove_filter("age").unwrap();
        assert_eq!(ages(&table).len(), 5);
    }

    #[test]
    fn test_filter_on_unknown_column_is_rejected() {
        let table = table();
        table
            .add_filter(Filter::new("salary", FilterOperator::Equals, 1))
            .unwrap();
        assert!(table.get_filter_state().unwrap().filters.is_empty());
        assert_eq!(
            table.take_warnings(),
            vec![Warning::UnknownColumn {
                column_id: "salary".into()
            }]
        );
    }

    #[test]
    fn test_search_immediate_by_default() {
        let table = table();
        let log = record_events(&table);
        table.search("  jan ").unwrap();
        assert_eq!(ages(&table), vec!["25"]);
        assert_eq!(
            *log.borrow(),
            vec!["search:change", "filter:change", "state:change"]
        );
    }

    #[test]
    fn test_search_debounced() {
        let mut settings = TableSettings::default();
        settings.filtering.debounce_ms = 300;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        let start = Instant::now();
        table.search("bob").unwrap();
        assert_eq!(ages(&table).len(), 5);
        assert_eq!(
            table.get_state().unwrap().pending_search.as_deref(),
            Some("bob")
        );

        assert!(!table.poll(start).unwrap());
        assert!(table.poll(start + Duration::from_millis(301)).unwrap());
        assert_eq!(ages(&table), vec!["35"]);
        assert_eq!(table.get_state().unwrap().pending_search, None);
        assert!(!table.flush_search().unwrap());
    }

    #[test]
    fn test_flush_search_applies_now() {
        let mut settings = TableSettings::default();
        settings.filtering.debounce_ms = 10_000;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table.search("alice").unwrap();
        assert!(table.flush_search().unwrap());
        assert_eq!(ages(&table), vec!["28"]);
    }

    #[test]
    fn test_clear_filters() {
        let table = table();
        table
            .add_filter(Filter::new("active", FilterOperator::Equals, true))
            .unwrap();
        table.search("o").unwrap();
        table.clear_filters().unwrap();
        assert_eq!(table.get_filter_state().unwrap(), FilterState::default());
        assert_eq!(ages(&table).len(), 5);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut settings = TableSettings::default();
        settings.pagination.page_size = 2;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table.go_to_page(2).unwrap();
        table
            .add_filter(Filter::new("active", FilterOperator::Equals, true))
            .unwrap();
        assert_eq!(table.get_state().unwrap().pagination.page_index, 0);
    }

    #[test]
    fn test_registered_filters() {
        let table = table();
        table
            .register_filter("age", |v: &Value, _: &Filter, _: &Record| {
                v.as_number().is_some_and(|n| n > 33.0)
            })
            .unwrap();
        table
            .add_filter(Filter::new("age", FilterOperator::parse("custom"), Value::Null))
            .unwrap();
        assert_eq!(ages(&table), vec!["35", "42"]);

        table
            .register_filter_script("age", "value < target")
            .unwrap();
        table
            .add_filter(Filter::new("age", FilterOperator::Equals, 29))
            .unwrap();
        assert_eq!(ages(&table), vec!["25", "28"]);

        table.register_filter_script("age", "value <").unwrap();
        assert!(matches!(
            table.take_warnings().as_slice(),
            [Warning::ScriptFailed { .. }]
        ));
    }

    #[test]
    fn test_script_filters_from_settings() {
        let mut settings = TableSettings::default();
        settings
            .filtering
            .custom_filters
            .insert("name".into(), "value.len().to_float() == target".into());
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table
            .add_filter(Filter::new("name", FilterOperator::Equals, 3))
            .unwrap();
        assert_eq!(ages(&table), vec!["35"]);
    }

    #[test]
    fn test_column_visibility() {
        let table = table();
        table.hide_column("age").unwrap();
        assert_eq!(table.visible_columns().unwrap().len(), 2);
        table.toggle_column("age").unwrap();
        assert_eq!(table.visible_columns().unwrap().len(), 3);
        table.show_column("age").unwrap();
        table.hide_column("salary").unwrap();
        assert_eq!(
            table.take_warnings(),
            vec![Warning::UnknownColumn {
                column_id: "salary".into()
            }]
        );
    }

    #[test]
    fn test_aggregates_cover_filtered_rows() {
        let mut settings = TableSettings::default();
        settings.pagination.page_size = 1;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table
            .add_filter(Filter::new("active", FilterOperator::Equals, true))
            .unwrap();
        let out = table
            .aggregates(&[
                AggregateSpec::new("age", AggregateFn::Sum),
                AggregateSpec::new("age", AggregateFn::Max).labeled("oldest"),
                AggregateSpec::new("salary", AggregateFn::Sum),
            ])
            .unwrap();
        assert_eq!(out["age_sum"], Value::Number(107.0));
        assert_eq!(out["oldest"], Value::from(42));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_processed_rows_span_pages() {
        let mut settings = TableSettings::default();
        settings.pagination.page_size = 2;
        let table = DataTable::new(
            TableConfig::new(people_columns())
                .with_data(people())
                .with_settings(settings),
        );
        table.sort("age", Some(SortDirection::Asc)).unwrap();
        let ids: Vec<String> = table
            .processed_rows()
            .unwrap()
            .iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec!["2", "4", "1", "3", "5"]);
    }
}
