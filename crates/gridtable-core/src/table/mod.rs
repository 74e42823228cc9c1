//! Table state container.
//!
//! [`DataTable`] owns the rows, the columns and every piece of view state,
//! and is the only writer of any of them. Readers get [`TableState`]
//! snapshots that are never mutated after they are handed out.

mod navigation;
mod ops;
mod pipeline;
mod state;

pub use navigation::TableStatePatch;
pub use pipeline::TableState;
pub use state::{DataTable, MAX_DISPATCH_DEPTH, WeakDataTable};

#[cfg(test)]
pub(crate) mod fixtures {
    use gridtable_engine::engine::{Column, Record, Row};
    use gridtable_engine::record;

    pub(crate) fn people() -> Vec<Row<Record>> {
        vec![
            Row::new(1, record! { "name" => "John", "age" => 30, "active" => true }),
            Row::new(2, record! { "name" => "Jane", "age" => 25, "active" => false }),
            Row::new(3, record! { "name" => "Bob", "age" => 35, "active" => true }),
            Row::new(4, record! { "name" => "Alice", "age" => 28, "active" => false }),
            Row::new(5, record! { "name" => "Charlie", "age" => 42, "active" => true }),
        ]
    }

    pub(crate) fn people_columns() -> Vec<Column<Record>> {
        vec![
            Column::new("name", "name", "Name"),
            Column::new("age", "age", "Age"),
            Column::new("active", "active", "Active"),
        ]
    }
}
