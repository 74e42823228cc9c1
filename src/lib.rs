//! gridtable - In-memory data grid engine.
//!
//! Re-exports the pipeline algorithms ([`engine`]) and the stateful
//! [`DataTable`], and adds loading [`TableSettings`] from a TOML file.

pub mod error;
pub mod settings;

pub use error::{GridtableError, Result};
pub use settings::{
    default_settings_path, load_settings, load_settings_or_default, settings_from_str,
};

pub use gridtable_core::{
    DataDelta, DataTable, EventKind, FrameId, FrameScheduler, ManualFrames, Plugin, Subscription,
    TableConfig, TableError, TableEvent, TableSettings, TableState, TableStatePatch,
    VirtualScroll, VirtualScrollOptions, VirtualScrollState, WeakDataTable, config, events,
};
pub use gridtable_engine::engine;
pub use gridtable_engine::record;
