//! gridtable-core - Table state container, events and plugins (UI-agnostic).

pub mod config;
pub mod error;
pub mod events;
pub mod plugin;
pub mod table;
pub mod virtual_scroll;

pub use config::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_TABLE_ID, FilteringSettings, PaginationSettings,
    SelectionSettings, SortingSettings, TableConfig, TableSettings,
};
pub use error::{Result, TableError};
pub use events::{DataDelta, EventBus, EventKind, Subscription, TableEvent};
pub use plugin::Plugin;
pub use table::{DataTable, MAX_DISPATCH_DEPTH, TableState, TableStatePatch, WeakDataTable};
pub use virtual_scroll::{
    FrameId, FrameScheduler, ManualFrames, VirtualScroll, VirtualScrollOptions,
    VirtualScrollState,
};

pub use gridtable_engine::engine::{Record, Row, RowData, RowId, Value, Warning};
