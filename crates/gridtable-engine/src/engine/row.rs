//! Row identity and row payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::value::Value;

/// Stable identifier of a row. Identity, not position, is what selection
/// and updates key on.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> RowId {
        RowId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

impl From<&RowId> for RowId {
    fn from(id: &RowId) -> Self {
        id.clone()
    }
}

macro_rules! row_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RowId {
                fn from(n: $ty) -> Self {
                    RowId(n.to_string())
                }
            }
        )*
    };
}

row_id_from_int!(i32, i64, u32, u64, usize);

/// Payload types the pipeline can read fields out of.
///
/// `field` is the raw lookup used when a column has no accessor; a field the
/// payload does not carry must read as [`Value::Undefined`].
pub trait RowData: Clone + 'static {
    fn field(&self, key: &str) -> Value;

    /// Merge a partial update into `self`, keeping fields the patch does not set.
    fn merge(&mut self, patch: Self);
}

/// Schemaless row payload keyed by field name.
pub type Record = BTreeMap<String, Value>;

impl RowData for Record {
    fn field(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or(Value::Undefined)
    }

    fn merge(&mut self, patch: Self) {
        self.extend(patch);
    }
}

/// A row as held by the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row<T> {
    pub id: RowId,
    pub data: T,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub disabled: bool,
}

impl<T> Row<T> {
    pub fn new(id: impl Into<RowId>, data: T) -> Row<T> {
        Row {
            id: id.into(),
            data,
            selected: false,
            expanded: false,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Row<T> {
        self.disabled = disabled;
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Row<T> {
        self.expanded = expanded;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    #[test]
    fn test_record_missing_field_is_undefined() {
        let rec = record! { "name" => "John" };
        assert_eq!(rec.field("name"), Value::from("John"));
        assert_eq!(rec.field("age"), Value::Undefined);
    }

    #[test]
    fn test_record_merge_preserves_unpatched_fields() {
        let mut rec = record! { "name" => "John", "age" => 30 };
        rec.merge(record! { "age" => 31 });
        assert_eq!(rec.field("name"), Value::from("John"));
        assert_eq!(rec.field("age"), Value::from(31));
    }

    #[test]
    fn test_row_id_from_integers_and_strings() {
        assert_eq!(RowId::from(7), RowId::new("7"));
        assert_eq!(RowId::from(7u64).as_str(), "7");
        assert_eq!(RowId::from("a").to_string(), "a");
    }
}
