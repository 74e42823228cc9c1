//! Grid pipeline API.
//!
//! This module provides the building blocks the table container chains
//! together as `filter -> sort -> paginate`:
//!
//! - [`Value`], [`Row`], [`RowData`], [`Column`] - Data model and coercions
//! - [`compare_values`], [`natural_cmp`] - Built-in type-aware ordering
//! - [`sort_rows`] - Stable single/multi-column sort
//! - [`filter_rows`] - Operator filters, custom filters and global search
//! - [`paginate`], [`PaginationState`] - Page slicing
//! - [`SelectionTracker`] - Id-keyed selection set
//! - [`compute_window`] - Virtual-scroll window arithmetic
//! - [`aggregate`] - Column aggregates over a row set

mod aggregate;
mod column;
mod compare;
mod filter;
mod paginate;
mod row;
mod script;
mod selection;
mod sort;
mod value;
mod virtual_window;
mod warning;

pub use aggregate::{AggregateFn, AggregateSpec, aggregate};
pub use column::{Accessor, Column, Comparator, Formatter};
pub use compare::{SortKey, compare_values, natural_cmp};
pub use filter::{
    CustomFilter, Filter, FilterOperator, FilterOptions, FilterState, Filtered, NativeFilter,
    filter_rows, row_matches_search, values_equal,
};
pub use paginate::{DEFAULT_PAGE_SIZE, PaginationState, paginate};
pub use row::{Record, Row, RowData, RowId};
pub use script::{FilterScript, create_filter_engine, to_dynamic};
pub use selection::{SelectionState, SelectionTracker};
pub use sort::{ComparatorOverrides, SortDirection, SortSpec, SortState, sort_rows};
pub use value::{Value, format_number, parse_date, parse_number};
pub use virtual_window::{
    BoxMetrics, ViewportMetrics, VirtualWindow, bottom_offset, compute_window, default_overscan,
    measure_row_height, parse_css_length, row_offset, rows_fitting,
};
pub use warning::Warning;

pub use rhai::{AST, Engine};
