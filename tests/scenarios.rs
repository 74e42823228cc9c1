//! Integration tests for the sample-data scenarios

use gridtable::engine::{
    Column, Filter, FilterOperator, Record, Row, RowData, SortDirection, SortSpec, Value,
};
use gridtable::{DataTable, EventKind, TableConfig, TableEvent, TableSettings, record};
use std::cell::RefCell;
use std::rc::Rc;

fn sample() -> Vec<Row<Record>> {
    vec![
        Row::new(1, record! { "name" => "John", "age" => 30, "active" => true }),
        Row::new(2, record! { "name" => "Jane", "age" => 25, "active" => false }),
        Row::new(3, record! { "name" => "Bob", "age" => 35, "active" => true }),
        Row::new(4, record! { "name" => "Alice", "age" => 28, "active" => false }),
        Row::new(5, record! { "name" => "Charlie", "age" => 42, "active" => true }),
    ]
}

fn columns() -> Vec<Column<Record>> {
    vec![
        Column::new("name", "name", "Name"),
        Column::new("age", "age", "Age"),
        Column::new("active", "active", "Active"),
    ]
}

fn table_with(settings: TableSettings) -> DataTable<Record> {
    DataTable::new(
        TableConfig::new(columns())
            .with_data(sample())
            .with_settings(settings),
    )
}

fn table() -> DataTable<Record> {
    table_with(TableSettings::default())
}

fn field(table: &DataTable<Record>, key: &str) -> Vec<String> {
    table
        .get_state()
        .unwrap()
        .visible_rows
        .iter()
        .map(|r| r.data.field(key).display())
        .collect()
}

#[test]
fn test_sort_ascending_by_age() {
    let table = table();
    table.sort("age", Some(SortDirection::Asc)).unwrap();
    assert_eq!(field(&table, "age"), vec!["25", "28", "30", "35", "42"]);
}

#[test]
fn test_filter_active_equals_true() {
    let table = table();
    table
        .add_filter(Filter::new("active", FilterOperator::Equals, true))
        .unwrap();
    let state = table.get_state().unwrap();
    assert_eq!(state.visible_rows.len(), 3);
    assert!(
        state
            .visible_rows
            .iter()
            .all(|r| r.data.field("active") == Value::Bool(true))
    );
}

#[test]
fn test_multi_sort_active_then_age() {
    let table = table();
    table
        .multi_sort(vec![SortSpec::desc("active"), SortSpec::asc("age")])
        .unwrap();
    assert_eq!(
        field(&table, "name"),
        vec!["John", "Bob", "Charlie", "Jane", "Alice"]
    );
}

#[test]
fn test_pagination_page_size_two() {
    let mut settings = TableSettings::default();
    settings.pagination.page_size = 2;
    let table = table_with(settings);

    let state = table.get_state().unwrap();
    assert_eq!(state.pagination.total_pages, 3);
    assert_eq!(state.visible_rows.len(), 2);

    table.go_to_page(2).unwrap();
    assert_eq!(table.get_state().unwrap().visible_rows.len(), 1);
}

#[test]
fn test_between_filter_on_age() {
    let table = table();
    table
        .add_filter(Filter::new(
            "age",
            FilterOperator::Between,
            vec![Value::from(25), Value::from(35)],
        ))
        .unwrap();
    let mut ages = field(&table, "age");
    ages.sort();
    assert_eq!(ages, vec!["25", "28", "30", "35"]);
}

#[test]
fn test_filter_from_json() {
    let filter: Filter =
        serde_json::from_str(r#"{"columnId":"age","operator":"between","value":[25,35]}"#)
            .unwrap();
    let table = table();
    table.add_filter(filter).unwrap();
    assert_eq!(table.get_state().unwrap().visible_rows.len(), 4);
}

#[test]
fn test_settings_file_drives_table() {
    let settings = gridtable::settings_from_str(
        r#"
        [sorting]
        default_sort = [{ columnId = "age", direction = "desc" }]

        [pagination]
        page_size = 3

        [filtering.custom_filters]
        name = "value.starts_with(target)"
        "#,
    )
    .unwrap();
    let table = table_with(settings);
    assert_eq!(field(&table, "name"), vec!["Charlie", "Bob", "John"]);

    table
        .add_filter(Filter::new("name", FilterOperator::Equals, "J"))
        .unwrap();
    assert_eq!(field(&table, "name"), vec!["John", "Jane"]);
}

#[test]
fn test_observer_sees_recomputed_state() {
    let table = table();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    table
        .on(EventKind::StateChange, move |event: &TableEvent<Record>| {
            if let TableEvent::StateChange(state) = event {
                s.borrow_mut().push(state.visible_rows.len());
            }
        })
        .unwrap();
    table
        .add_filter(Filter::new("active", FilterOperator::Equals, false))
        .unwrap();
    table.search("ali").unwrap();
    assert_eq!(*seen.borrow(), vec![2, 1]);
}

#[derive(Clone, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    stock: Option<u32>,
}

impl RowData for Product {
    fn field(&self, key: &str) -> Value {
        match key {
            "sku" => Value::from(self.sku.as_str()),
            "price" => Value::from(self.price),
            "stock" => Value::from(self.stock),
            _ => Value::Undefined,
        }
    }

    fn merge(&mut self, patch: Self) {
        *self = patch;
    }
}

#[test]
fn test_struct_rows_with_accessor_and_comparator() {
    let products = vec![
        Row::new("a", Product { sku: "item10".into(), price: 9.5, stock: Some(3) }),
        Row::new("b", Product { sku: "item2".into(), price: 12.0, stock: None }),
        Row::new("c", Product { sku: "item1".into(), price: 3.25, stock: Some(0) }),
    ];
    let table = DataTable::new(
        TableConfig::new(vec![
            Column::new("sku", "sku", "SKU"),
            Column::new("value", "price", "Stock value").with_accessor(|p: &Product| {
                Value::from(p.price * f64::from(p.stock.unwrap_or(0)))
            }),
            Column::new("stock", "stock", "Stock"),
        ])
        .with_data(products),
    );

    table.sort("sku", Some(SortDirection::Asc)).unwrap();
    let skus: Vec<String> = table
        .get_state()
        .unwrap()
        .visible_rows
        .iter()
        .map(|r| r.data.sku.clone())
        .collect();
    assert_eq!(skus, vec!["item1", "item2", "item10"]);

    table.sort("value", Some(SortDirection::Desc)).unwrap();
    let ids: Vec<String> = table
        .get_state()
        .unwrap()
        .visible_rows
        .iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    table
        .add_filter(Filter::new("stock", FilterOperator::IsEmpty, Value::Null))
        .unwrap();
    assert_eq!(table.get_state().unwrap().visible_rows.len(), 1);
}
