//! Plugin hook surface.
//!
//! A plugin attaches to a table through its public API only: it subscribes
//! with [`DataTable::on`] during `install` and must drop those subscriptions
//! in `uninstall`. Handlers should hold a [`crate::table::WeakDataTable`] if
//! they need the table back, or the table and handler keep each other alive.

use gridtable_engine::engine::RowData;

use crate::error::Result;
use crate::table::DataTable;

pub trait Plugin<T: RowData> {
    /// Unique name within one table.
    fn name(&self) -> &str;

    fn install(&mut self, table: &DataTable<T>) -> Result<()>;

    fn uninstall(&mut self, table: &DataTable<T>);
}
