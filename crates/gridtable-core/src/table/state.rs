use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Instant;

use gridtable_engine::engine::{
    Column, ComparatorOverrides, CustomFilter, Engine, FilterOptions, FilterScript, FilterState,
    PaginationState, Row, RowData, RowId, SelectionTracker, SortState, Warning,
    create_filter_engine,
};

use super::TableState;
use crate::config::{TableConfig, TableSettings};
use crate::error::{Result, TableError};
use crate::events::{DataDelta, EventBus, EventKind, Subscription, TableEvent};
use crate::plugin::Plugin;

/// Deepest chain of handler-triggered mutations that is still applied.
pub const MAX_DISPATCH_DEPTH: usize = 8;

/// Oldest warnings are dropped past this many undrained entries.
const MAX_RETAINED_WARNINGS: usize = 256;

pub(crate) struct PendingSearch {
    pub(crate) term: String,
    pub(crate) since: Instant,
}

/// A change made by a mutator, turned into an event once the pipeline has rerun.
pub(crate) enum Notice<T> {
    Data(DataDelta<T>),
    ColumnVisibility { column_id: String, visible: bool },
    Sort,
    Filter,
    Search(String),
    Page,
    Selection,
    RowSelect { row_id: RowId, selected: bool },
}

pub(crate) struct TableInner<T: RowData> {
    pub(crate) id: String,
    pub(crate) rows: Rc<Vec<Row<T>>>,
    pub(crate) columns: Rc<Vec<Column<T>>>,
    pub(crate) settings: TableSettings,
    pub(crate) sort: SortState,
    pub(crate) filter: FilterState,
    pub(crate) pagination: PaginationState,
    pub(crate) selection: SelectionTracker,
    pub(crate) filter_options: FilterOptions<T>,
    pub(crate) comparators: ComparatorOverrides,
    /// Compiles script filters registered after construction.
    pub(crate) engine: Arc<Engine>,
    pub(crate) pending_search: Option<PendingSearch>,
    pub(crate) plugins: Vec<Box<dyn Plugin<T>>>,
    pub(crate) snapshot: Rc<TableState<T>>,
    /// Ids of the filtered set, in display order.
    pub(crate) filtered_ids: Vec<RowId>,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) destroyed: bool,
}

impl<T: RowData> TableInner<T> {
    pub(crate) fn warn(&mut self, warning: Warning) {
        log::warn!("[{}] {}", self.id, warning);
        if self.warnings.len() >= MAX_RETAINED_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(warning);
    }

    pub(crate) fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(TableError::Destroyed {
                instance: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Warn and return false when `enabled` is off.
    pub(crate) fn require(&mut self, enabled: bool, feature: &'static str) -> bool {
        if !enabled {
            self.warn(Warning::FeatureDisabled { feature });
        }
        enabled
    }

    pub(crate) fn has_column(&self, column_id: &str) -> bool {
        self.columns.iter().any(|c| c.id == column_id)
    }

    pub(crate) fn row_index(&self, id: &RowId) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == id)
    }

    /// Drop duplicate ids and move `selected` flags into the tracker.
    pub(crate) fn ingest(&mut self, rows: Vec<Row<T>>) -> Vec<Row<T>> {
        let mut seen = HashSet::with_capacity(rows.len());
        let mut kept = Vec::with_capacity(rows.len());
        for mut row in rows {
            if !seen.insert(row.id.clone()) {
                self.warn(Warning::DuplicateRow { row_id: row.id });
                continue;
            }
            if row.selected && self.settings.selection.enabled {
                self.selection.select(row.id.clone());
            }
            row.selected = false;
            kept.push(row);
        }
        kept
    }

    /// Forget selections whose rows no longer exist. Returns true if any were dropped.
    pub(crate) fn prune_selection(&mut self) -> bool {
        let live: HashSet<&RowId> = self.rows.iter().map(|r| &r.id).collect();
        self.selection.retain(|id| live.contains(id)) > 0
    }

    fn page_position(&self) -> (usize, usize) {
        (self.pagination.page_index, self.pagination.page_size)
    }
}

struct Shared<T: RowData> {
    inner: RefCell<TableInner<T>>,
    bus: EventBus<T>,
    depth: Cell<usize>,
}

/// The table state container.
///
/// A `DataTable` is a cheap handle; clones share one table. Every accepted
/// mutation reruns `filter -> sort -> paginate`, emits the specific event and
/// then `state:change`. Events are dispatched after the table has released
/// its internal borrow, so handlers may call back into it.
pub struct DataTable<T: RowData> {
    shared: Rc<Shared<T>>,
}

impl<T: RowData> Clone for DataTable<T> {
    fn clone(&self) -> Self {
        DataTable {
            shared: self.shared.clone(),
        }
    }
}

/// Non-owning handle for use inside event handlers.
pub struct WeakDataTable<T: RowData> {
    shared: Weak<Shared<T>>,
}

impl<T: RowData> Clone for WeakDataTable<T> {
    fn clone(&self) -> Self {
        WeakDataTable {
            shared: self.shared.clone(),
        }
    }
}

impl<T: RowData> WeakDataTable<T> {
    pub fn upgrade(&self) -> Option<DataTable<T>> {
        self.shared.upgrade().map(|shared| DataTable { shared })
    }
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl<T: RowData> DataTable<T> {
    pub fn new(config: TableConfig<T>) -> Self {
        let TableConfig {
            id,
            columns,
            data,
            settings,
            custom_filters,
            comparators,
            plugins,
            on_init,
        } = config;

        let engine = Arc::new(create_filter_engine());
        let mut script_errors = Vec::new();
        let mut filter_options = FilterOptions {
            case_sensitive: settings.filtering.case_sensitive,
            custom_filters: HashMap::new(),
        };
        for (column_id, source) in &settings.filtering.custom_filters {
            match FilterScript::compile(engine.clone(), source) {
                Ok(script) => {
                    filter_options
                        .custom_filters
                        .insert(column_id.clone(), CustomFilter::Script(script));
                }
                Err(message) => script_errors.push(Warning::ScriptFailed {
                    column_id: column_id.clone(),
                    message,
                }),
            }
        }
        for (column_id, filter) in custom_filters {
            filter_options
                .custom_filters
                .insert(column_id, CustomFilter::Native(filter));
        }

        let sort = if settings.sorting.enabled {
            SortState::from_specs(settings.sorting.default_sort.clone())
        } else {
            SortState::Unsorted
        };
        let pagination = PaginationState::new(settings.pagination.effective_page_size());

        let mut inner = TableInner {
            id,
            rows: Rc::new(Vec::new()),
            columns: Rc::new(columns),
            settings,
            sort,
            filter: FilterState::default(),
            pagination,
            selection: SelectionTracker::new(),
            filter_options,
            comparators,
            engine,
            pending_search: None,
            plugins: Vec::new(),
            snapshot: Rc::new(TableState::default()),
            filtered_ids: Vec::new(),
            warnings: Vec::new(),
            destroyed: false,
        };
        for warning in script_errors {
            inner.warn(warning);
        }
        let rows = inner.ingest(data);
        inner.rows = Rc::new(rows);
        inner.recompute();
        log::debug!(
            "[{}] created with {} rows and {} columns",
            inner.id,
            inner.rows.len(),
            inner.columns.len()
        );

        let table = DataTable {
            shared: Rc::new(Shared {
                inner: RefCell::new(inner),
                bus: EventBus::new(),
                depth: Cell::new(0),
            }),
        };

        for plugin in plugins {
            let name = plugin.name().to_string();
            if let Err(e) = table.use_plugin(plugin) {
                table.shared.inner.borrow_mut().warn(Warning::PluginFailed {
                    name,
                    message: e.to_string(),
                });
            }
        }
        if let Some(hook) = on_init {
            hook(&table);
        }
        table.dispatch(&[TableEvent::Init]);
        table
    }

    pub fn id(&self) -> String {
        self.shared.inner.borrow().id.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.inner.borrow().destroyed
    }

    pub fn downgrade(&self) -> WeakDataTable<T> {
        WeakDataTable {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Run a read against the live table.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&TableInner<T>) -> R) -> Result<R> {
        let inner = self.shared.inner.borrow();
        inner.ensure_alive()?;
        Ok(f(&*inner))
    }

    /// Run a change that emits nothing, such as recording a warning.
    pub(crate) fn quietly<R>(&self, f: impl FnOnce(&mut TableInner<T>) -> R) -> Result<R> {
        let mut inner = self.shared.inner.borrow_mut();
        inner.ensure_alive()?;
        Ok(f(&mut *inner))
    }

    /// Apply a mutation. `f` returns `None` to reject it as a no-op.
    pub(crate) fn mutate(
        &self,
        f: impl FnOnce(&mut TableInner<T>) -> Option<Vec<Notice<T>>>,
    ) -> Result<()> {
        self.apply(true, f)
    }

    /// Like [`Self::mutate`], but only `state:change` is emitted for a page move.
    pub(crate) fn apply(
        &self,
        track_page: bool,
        f: impl FnOnce(&mut TableInner<T>) -> Option<Vec<Notice<T>>>,
    ) -> Result<()> {
        let depth = self.shared.depth.get();
        let events = {
            let mut inner = self.shared.inner.borrow_mut();
            inner.ensure_alive()?;
            if depth >= MAX_DISPATCH_DEPTH {
                inner.warn(Warning::DispatchDepthExceeded { depth });
                return Ok(());
            }
            let page_before = inner.page_position();
            let Some(mut notices) = f(&mut *inner) else {
                return Ok(());
            };
            inner.recompute();
            if track_page
                && inner.page_position() != page_before
                && !notices.iter().any(|n| matches!(n, Notice::Page))
            {
                notices.push(Notice::Page);
            }
            let mut events: Vec<TableEvent<T>> = notices
                .into_iter()
                .filter_map(|n| inner.materialize(n))
                .collect();
            events.push(TableEvent::StateChange(inner.snapshot.clone()));
            events
        };
        self.dispatch(&events);
        Ok(())
    }

    fn dispatch(&self, events: &[TableEvent<T>]) {
        let depth = &self.shared.depth;
        depth.set(depth.get() + 1);
        let _guard = DepthGuard(depth);
        for event in events {
            self.shared.bus.emit(event);
        }
    }

    /// Subscribe to `kind`. Handlers that need the table should capture
    /// [`Self::downgrade`] rather than a clone.
    pub fn on(
        &self,
        kind: EventKind,
        handler: impl Fn(&TableEvent<T>) + 'static,
    ) -> Result<Subscription> {
        self.read(|_| ())?;
        Ok(self.shared.bus.on(kind, handler))
    }

    /// Uninstall plugins, emit `destroy` and drop every listener. Later calls do nothing.
    pub fn destroy(&self) {
        let plugins = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.destroyed {
                return;
            }
            std::mem::take(&mut inner.plugins)
        };
        for mut plugin in plugins.into_iter().rev() {
            plugin.uninstall(self);
        }
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.destroyed = true;
            inner.pending_search = None;
            log::debug!("[{}] destroyed", inner.id);
        }
        self.dispatch(&[TableEvent::Destroy]);
        self.shared.bus.clear();
    }

    pub fn use_plugin(&self, mut plugin: Box<dyn Plugin<T>>) -> Result<()> {
        let name = plugin.name().to_string();
        let duplicate = self.quietly(|inner| {
            let duplicate = inner.plugins.iter().any(|p| p.name() == name);
            if duplicate {
                inner.warn(Warning::DuplicatePlugin { name: name.clone() });
            }
            duplicate
        })?;
        if duplicate {
            return Ok(());
        }
        plugin.install(self)?;
        log::debug!("plugin `{}` installed", name);
        self.quietly(|inner| inner.plugins.push(plugin))
    }

    pub fn remove_plugin(&self, name: &str) -> Result<()> {
        let plugin = self.quietly(|inner| {
            match inner.plugins.iter().position(|p| p.name() == name) {
                Some(index) => Some(inner.plugins.remove(index)),
                None => {
                    inner.warn(Warning::UnknownPlugin {
                        name: name.to_string(),
                    });
                    None
                }
            }
        })?;
        if let Some(mut plugin) = plugin {
            plugin.uninstall(self);
            log::debug!("plugin `{}` removed", name);
        }
        Ok(())
    }

    pub fn has_plugin(&self, name: &str) -> Result<bool> {
        self.read(|inner| inner.plugins.iter().any(|p| p.name() == name))
    }

    /// Drain retained warnings. Still works after `destroy`.
    pub fn take_warnings(&self) -> Vec<Warning> {
        std::mem::take(&mut self.shared.inner.borrow_mut().warnings)
    }
}
