//! Column definitions.
//!
//! A column names a field of the row payload and optionally overrides how
//! that field is read ([`Accessor`]), ordered ([`Comparator`]) and shown
//! ([`Formatter`]). Columns are cheap to clone; hooks are shared.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::row::RowData;
use super::value::Value;

/// Reads the column value out of a row payload, replacing the raw field lookup.
pub type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Orders two column values.
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// Renders a column value for display.
pub type Formatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

pub struct Column<T> {
    pub id: String,
    pub field: String,
    pub label: String,
    sortable: bool,
    filterable: bool,
    visible: bool,
    accessor: Option<Accessor<T>>,
    comparator: Option<Comparator>,
    formatter: Option<Formatter>,
}

impl<T> Column<T> {
    pub fn new(id: impl Into<String>, field: impl Into<String>, label: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            field: field.into(),
            label: label.into(),
            sortable: true,
            filterable: true,
            visible: true,
            accessor: None,
            comparator: None,
            formatter: None,
        }
    }

    /// Column whose id doubles as the field key and the label.
    pub fn simple(id: &str) -> Self {
        Self::new(id, id, id)
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_accessor(mut self, accessor: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    pub fn with_formatter(mut self, formatter: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn comparator(&self) -> Option<&Comparator> {
        self.comparator.as_ref()
    }
}

impl<T: RowData> Column<T> {
    /// The value this column yields for `data`: the accessor if set, else the raw field.
    pub fn value(&self, data: &T) -> Value {
        match &self.accessor {
            Some(accessor) => accessor(data),
            None => data.field(&self.field),
        }
    }

    /// Display text for `data`, through the formatter if one is set.
    pub fn format(&self, data: &T) -> String {
        let value = self.value(data);
        match &self.formatter {
            Some(formatter) => formatter(&value),
            None => value.display(),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Column {
            id: self.id.clone(),
            field: self.field.clone(),
            label: self.label.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            visible: self.visible,
            accessor: self.accessor.clone(),
            comparator: self.comparator.clone(),
            formatter: self.formatter.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("field", &self.field)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("visible", &self.visible)
            .field("accessor", &self.accessor.is_some())
            .field("comparator", &self.comparator.is_some())
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Record;
    use crate::record;

    #[test]
    fn test_accessor_overrides_field_lookup() {
        let col: Column<Record> = Column::new("full", "first", "Full name").with_accessor(|r: &Record| {
            Value::from(format!("{} {}", r.field("first"), r.field("last")))
        });
        let rec = record! { "first" => "Ada", "last" => "Lovelace" };
        assert_eq!(col.value(&rec), Value::from("Ada Lovelace"));
    }

    #[test]
    fn test_formatter_applies_to_display_only() {
        let col: Column<Record> =
            Column::simple("price").with_formatter(|v| format!("${}", v.display()));
        let rec = record! { "price" => 5 };
        assert_eq!(col.value(&rec), Value::from(5));
        assert_eq!(col.format(&rec), "$5");
    }

    #[test]
    fn test_defaults() {
        let col: Column<Record> = Column::simple("x");
        assert!(col.is_sortable());
        assert!(col.is_filterable());
        assert!(col.is_visible());
        assert!(col.comparator().is_none());
    }
}
