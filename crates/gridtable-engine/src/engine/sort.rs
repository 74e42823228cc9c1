//! Stable single- and multi-column sorting.
//!
//! Comparator resolution per column: the column's own comparator, then a
//! caller-supplied override keyed by column id, then [`compare_values`].
//! Keys are extracted once per row before sorting.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::column::{Column, Comparator};
use super::compare::SortKey;
use super::row::{Row, RowData};
use super::value::Value;

/// Comparators supplied to the engine for specific column ids.
pub type ComparatorOverrides = HashMap<String, Comparator>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
    #[default]
    None,
}

impl SortDirection {
    /// Next direction when a column header is toggled: `none -> asc -> desc -> none`.
    pub fn cycle(self) -> SortDirection {
        match self {
            SortDirection::None => SortDirection::Asc,
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::None,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Desc => ordering.reverse(),
            _ => ordering,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    #[serde(alias = "column_id")]
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> SortSpec {
        SortSpec {
            column_id: column_id.into(),
            direction,
        }
    }

    pub fn asc(column_id: impl Into<String>) -> SortSpec {
        Self::new(column_id, SortDirection::Asc)
    }

    pub fn desc(column_id: impl Into<String>) -> SortSpec {
        Self::new(column_id, SortDirection::Desc)
    }
}

/// Current sort: nothing, one column, or an ordered list of tie-breaking columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "sorts")]
pub enum SortState {
    #[default]
    Unsorted,
    Single(SortSpec),
    Multi(Vec<SortSpec>),
}

impl SortState {
    pub fn specs(&self) -> &[SortSpec] {
        match self {
            SortState::Unsorted => &[],
            SortState::Single(spec) => std::slice::from_ref(spec),
            SortState::Multi(specs) => specs,
        }
    }

    /// Build a state from a spec list: empty is unsorted, one spec is single-column.
    pub fn from_specs(mut specs: Vec<SortSpec>) -> SortState {
        match specs.len() {
            0 => SortState::Unsorted,
            1 => SortState::Single(specs.remove(0)),
            _ => SortState::Multi(specs),
        }
    }

    /// Direction currently applied to `column_id`, `None` if it is not sorted.
    pub fn direction_of(&self, column_id: &str) -> SortDirection {
        self.specs()
            .iter()
            .find(|s| s.column_id == column_id)
            .map_or(SortDirection::None, |s| s.direction)
    }

    pub fn is_active(&self) -> bool {
        self.specs().iter().any(|s| s.direction != SortDirection::None)
    }
}

enum KeyOrder {
    Custom(Comparator),
    Default,
}

enum SortCell {
    Value(Value),
    Key(SortKey),
}

struct Resolved<'c, T> {
    column: &'c Column<T>,
    direction: SortDirection,
    order: KeyOrder,
}

fn resolve<'c, T>(
    state: &SortState,
    columns: &'c [Column<T>],
    overrides: &ComparatorOverrides,
) -> Vec<Resolved<'c, T>> {
    state
        .specs()
        .iter()
        .filter(|spec| spec.direction != SortDirection::None)
        .filter_map(|spec| {
            let Some(column) = columns.iter().find(|c| c.id == spec.column_id) else {
                log::debug!("sort skips unknown column `{}`", spec.column_id);
                return None;
            };
            let order = match column.comparator().or_else(|| overrides.get(&column.id)) {
                Some(cmp) => KeyOrder::Custom(cmp.clone()),
                None => KeyOrder::Default,
            };
            Some(Resolved {
                column,
                direction: spec.direction,
                order,
            })
        })
        .collect()
}

/// Sort `rows` by `state`, returning a new sequence. Equal-key rows keep
/// their input order. If no spec resolves to a known column with a
/// direction, the input order is returned unchanged.
pub fn sort_rows<'a, T: RowData>(
    rows: impl IntoIterator<Item = &'a Row<T>>,
    state: &SortState,
    columns: &[Column<T>],
    overrides: &ComparatorOverrides,
) -> Vec<&'a Row<T>> {
    let rows: Vec<&'a Row<T>> = rows.into_iter().collect();
    let resolved = resolve(state, columns, overrides);
    if resolved.is_empty() {
        return rows;
    }

    let mut keyed: Vec<(Vec<SortCell>, &'a Row<T>)> = rows
        .into_iter()
        .map(|row| {
            let cells = resolved
                .iter()
                .map(|r| {
                    let value = r.column.value(&row.data);
                    match r.order {
                        KeyOrder::Custom(_) => SortCell::Value(value),
                        KeyOrder::Default => SortCell::Key(SortKey::from_value(&value)),
                    }
                })
                .collect();
            (cells, row)
        })
        .collect();

    // Vec::sort_by is stable.
    keyed.sort_by(|(a, _), (b, _)| {
        for (i, r) in resolved.iter().enumerate() {
            let ordering = match (&r.order, &a[i], &b[i]) {
                (KeyOrder::Custom(cmp), SortCell::Value(x), SortCell::Value(y)) => cmp(x, y),
                (_, SortCell::Key(x), SortCell::Key(y)) => x.cmp(y),
                _ => Ordering::Equal,
            };
            let ordering = r.direction.apply(ordering);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    keyed.into_iter().map(|(_, row)| row).collect()
}
