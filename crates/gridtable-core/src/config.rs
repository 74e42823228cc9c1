//! Construction configuration.
//!
//! [`TableSettings`] is plain data and can be loaded from a settings file.
//! [`TableConfig`] adds the parts that only exist in code: columns, rows,
//! closures and plugins.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use gridtable_engine::engine::{
    Column, ComparatorOverrides, DEFAULT_PAGE_SIZE, Filter, NativeFilter, Row, RowData, SortSpec,
    Value,
};

use crate::plugin::Plugin;
use crate::table::DataTable;

pub const DEFAULT_TABLE_ID: &str = "gridtable";
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingSettings {
    pub enabled: bool,
    pub multi_sort: bool,
    pub default_sort: Vec<SortSpec>,
}

impl Default for SortingSettings {
    fn default() -> Self {
        SortingSettings {
            enabled: true,
            multi_sort: true,
            default_sort: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringSettings {
    pub enabled: bool,
    pub global_search: bool,
    /// Delay before a search term reaches the pipeline. 0 applies immediately.
    pub debounce_ms: u64,
    pub case_sensitive: bool,
    /// Column id -> Rhai filter expression.
    pub custom_filters: BTreeMap<String, String>,
}

impl Default for FilteringSettings {
    fn default() -> Self {
        FilteringSettings {
            enabled: true,
            global_search: true,
            debounce_ms: 0,
            case_sensitive: false,
            custom_filters: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub enabled: bool,
    pub page_size: usize,
    pub max_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            enabled: true,
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl PaginationSettings {
    /// Configured page size forced into `1..=max_page_size`.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, self.max_page_size.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub enabled: bool,
    pub multiple: bool,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        SelectionSettings {
            enabled: true,
            multiple: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub sorting: SortingSettings,
    pub filtering: FilteringSettings,
    pub pagination: PaginationSettings,
    pub selection: SelectionSettings,
}

pub type InitHook<T> = Box<dyn FnOnce(&DataTable<T>)>;

/// Everything needed to build a [`DataTable`].
pub struct TableConfig<T: RowData> {
    pub id: String,
    pub columns: Vec<Column<T>>,
    pub data: Vec<Row<T>>,
    pub settings: TableSettings,
    /// Closure filters; these win over script filters for the same column.
    pub custom_filters: HashMap<String, NativeFilter<T>>,
    pub comparators: ComparatorOverrides,
    pub plugins: Vec<Box<dyn Plugin<T>>>,
    /// Runs once the table is built, before `init` is emitted.
    pub on_init: Option<InitHook<T>>,
}

impl<T: RowData> TableConfig<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        TableConfig {
            id: DEFAULT_TABLE_ID.to_string(),
            columns,
            data: Vec::new(),
            settings: TableSettings::default(),
            custom_filters: HashMap::new(),
            comparators: ComparatorOverrides::new(),
            plugins: Vec::new(),
            on_init: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_data(mut self, data: Vec<Row<T>>) -> Self {
        self.data = data;
        self
    }

    pub fn with_settings(mut self, settings: TableSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_custom_filter(
        mut self,
        column_id: impl Into<String>,
        filter: impl Fn(&Value, &Filter, &T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.custom_filters.insert(column_id.into(), Arc::new(filter));
        self
    }

    pub fn with_comparator(
        mut self,
        column_id: impl Into<String>,
        comparator: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparators
            .insert(column_id.into(), Arc::new(comparator));
        self
    }

    pub fn with_plugin(mut self, plugin: impl Plugin<T> + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn on_init(mut self, hook: impl FnOnce(&DataTable<T>) + 'static) -> Self {
        self.on_init = Some(Box::new(hook));
        self
    }
}
