//! Row filtering: operator filters, custom filters and global search.
//!
//! All filters are AND-combined. The global search term is an OR across the
//! filterable columns and is intersected with the filter result.
//!
//! There are two distinct failure modes and they are deliberately different:
//!
//! - a filter the engine cannot interpret (unknown column, unknown operator)
//!   passes every row and produces a [`Warning`];
//! - a known operator with a malformed value (`between` without a two-item
//!   list, `in`/`notIn` without a list) excludes every row.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::column::Column;
use super::compare::compare_values;
use super::row::{Row, RowData};
use super::script::FilterScript;
use super::value::Value;
use super::warning::Warning;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Between,
    In,
    NotIn,
    /// Any name outside the known set. Evaluates as pass-through.
    Other(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "notEquals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "notContains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::IsEmpty => "isEmpty",
            FilterOperator::IsNotEmpty => "isNotEmpty",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::LessThanOrEqual => "lessThanOrEqual",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::Other(name) => name,
        }
    }

    pub fn parse(name: &str) -> FilterOperator {
        match name {
            "equals" => FilterOperator::Equals,
            "notEquals" => FilterOperator::NotEquals,
            "contains" => FilterOperator::Contains,
            "notContains" => FilterOperator::NotContains,
            "startsWith" => FilterOperator::StartsWith,
            "endsWith" => FilterOperator::EndsWith,
            "isEmpty" => FilterOperator::IsEmpty,
            "isNotEmpty" => FilterOperator::IsNotEmpty,
            "greaterThan" => FilterOperator::GreaterThan,
            "greaterThanOrEqual" => FilterOperator::GreaterThanOrEqual,
            "lessThan" => FilterOperator::LessThan,
            "lessThanOrEqual" => FilterOperator::LessThanOrEqual,
            "between" => FilterOperator::Between,
            "in" => FilterOperator::In,
            "notIn" => FilterOperator::NotIn,
            other => FilterOperator::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FilterOperator::Other(_))
    }
}

impl FromStr for FilterOperator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FilterOperator::parse(s))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(FilterOperator::parse(&name))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub column_id: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

impl Filter {
    pub fn new(
        column_id: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Filter {
        Filter {
            column_id: column_id.into(),
            operator,
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub filters: Vec<Filter>,
    pub global_search: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.global_search.trim().is_empty()
    }
}

/// Rust-side custom filter: `(cell value, filter, row payload) -> keep`.
pub type NativeFilter<T> = Arc<dyn Fn(&Value, &Filter, &T) -> bool + Send + Sync>;

/// A per-column replacement for the built-in operator logic.
pub enum CustomFilter<T> {
    Native(NativeFilter<T>),
    Script(FilterScript),
}

impl<T> CustomFilter<T> {
    pub fn native(f: impl Fn(&Value, &Filter, &T) -> bool + Send + Sync + 'static) -> Self {
        CustomFilter::Native(Arc::new(f))
    }
}

impl<T> Clone for CustomFilter<T> {
    fn clone(&self) -> Self {
        match self {
            CustomFilter::Native(f) => CustomFilter::Native(f.clone()),
            CustomFilter::Script(s) => CustomFilter::Script(s.clone()),
        }
    }
}

impl<T> fmt::Debug for CustomFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomFilter::Native(_) => f.write_str("CustomFilter::Native"),
            CustomFilter::Script(s) => write!(f, "CustomFilter::Script({:?})", s.source()),
        }
    }
}

/// Knobs the filter engine reads besides the filter state itself.
pub struct FilterOptions<T> {
    pub case_sensitive: bool,
    pub custom_filters: HashMap<String, CustomFilter<T>>,
}

impl<T> Default for FilterOptions<T> {
    fn default() -> Self {
        FilterOptions {
            case_sensitive: false,
            custom_filters: HashMap::new(),
        }
    }
}

impl<T> Clone for FilterOptions<T> {
    fn clone(&self) -> Self {
        FilterOptions {
            case_sensitive: self.case_sensitive,
            custom_filters: self.custom_filters.clone(),
        }
    }
}

/// Output of [`filter_rows`]: the surviving rows in input order plus any warnings.
#[derive(Debug)]
pub struct Filtered<'a, T> {
    pub rows: Vec<&'a Row<T>>,
    pub warnings: Vec<Warning>,
}

type Predicate = fn(&Value, &Value, bool) -> bool;

/// Lookup table from operator kind to predicate. `None` for unknown kinds.
fn predicate(operator: &FilterOperator) -> Option<Predicate> {
    let p: Predicate = match operator {
        FilterOperator::Equals => |cell, target, cs| values_equal(cell, target, cs),
        FilterOperator::NotEquals => |cell, target, cs| !values_equal(cell, target, cs),
        FilterOperator::Contains => |cell, target, cs| {
            fold(&cell.display(), cs).contains(&*fold(&target.display(), cs))
        },
        FilterOperator::NotContains => |cell, target, cs| {
            !fold(&cell.display(), cs).contains(&*fold(&target.display(), cs))
        },
        FilterOperator::StartsWith => |cell, target, cs| {
            fold(&cell.display(), cs).starts_with(&*fold(&target.display(), cs))
        },
        FilterOperator::EndsWith => |cell, target, cs| {
            fold(&cell.display(), cs).ends_with(&*fold(&target.display(), cs))
        },
        FilterOperator::IsEmpty => |cell, _, _| cell.is_blank(),
        FilterOperator::IsNotEmpty => |cell, _, _| !cell.is_blank(),
        FilterOperator::GreaterThan => {
            |cell, target, _| ordered(cell, target).is_some_and(|o| o == Ordering::Greater)
        }
        FilterOperator::GreaterThanOrEqual => {
            |cell, target, _| ordered(cell, target).is_some_and(|o| o != Ordering::Less)
        }
        FilterOperator::LessThan => {
            |cell, target, _| ordered(cell, target).is_some_and(|o| o == Ordering::Less)
        }
        FilterOperator::LessThanOrEqual => {
            |cell, target, _| ordered(cell, target).is_some_and(|o| o != Ordering::Greater)
        }
        FilterOperator::Between => |cell, target, _| match target.as_list() {
            Some([min, max]) => {
                ordered(cell, min).is_some_and(|o| o != Ordering::Less)
                    && ordered(cell, max).is_some_and(|o| o != Ordering::Greater)
            }
            _ => false,
        },
        FilterOperator::In => |cell, target, _| match target.as_list() {
            Some(items) => items.iter().any(|item| values_equal(cell, item, false)),
            None => false,
        },
        FilterOperator::NotIn => |cell, target, _| match target.as_list() {
            Some(items) => !items.iter().any(|item| values_equal(cell, item, false)),
            None => false,
        },
        FilterOperator::Other(_) => return None,
    };
    Some(p)
}

fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

/// Ordering for the comparison operators; nullish operands never match.
fn ordered(cell: &Value, target: &Value) -> Option<Ordering> {
    if cell.is_nullish() || target.is_nullish() {
        return None;
    }
    Some(compare_values(cell, target))
}

/// Loose equality used by `equals`, `notEquals`, `in` and `notIn`.
///
/// Numbers (including numeric text) compare numerically, booleans and dates
/// by value, and everything else by display text honoring `case_sensitive`.
/// Null and undefined equal each other and nothing else.
pub fn values_equal(cell: &Value, target: &Value, case_sensitive: bool) -> bool {
    match (cell.is_nullish(), target.is_nullish()) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        _ => {}
    }
    if let (Some(a), Some(b)) = (cell.as_number(), target.as_number()) {
        return a == b;
    }
    if let (Value::Bool(a), Value::Bool(b)) = (cell, target) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (cell.as_date(), target.as_date()) {
        return a == b;
    }
    fold(&cell.display(), case_sensitive) == fold(&target.display(), case_sensitive)
}

/// Whether any filterable column of `row` contains `term` (already trimmed).
pub fn row_matches_search<T: RowData>(
    row: &Row<T>,
    term: &str,
    columns: &[Column<T>],
    case_sensitive: bool,
) -> bool {
    let needle = fold(term, case_sensitive);
    columns
        .iter()
        .filter(|c| c.is_filterable())
        .any(|c| fold(&c.value(&row.data).display(), case_sensitive).contains(&*needle))
}

enum Check<'c, T> {
    Builtin {
        column: &'c Column<T>,
        predicate: Predicate,
        filter: &'c Filter,
    },
    Custom {
        column: Option<&'c Column<T>>,
        custom: &'c CustomFilter<T>,
        filter: &'c Filter,
    },
}

fn resolve_filters<'c, T>(
    state: &'c FilterState,
    columns: &'c [Column<T>],
    options: &'c FilterOptions<T>,
    warnings: &mut Vec<Warning>,
) -> Vec<Check<'c, T>> {
    let mut checks = Vec::new();
    for filter in &state.filters {
        let column = columns.iter().find(|c| c.id == filter.column_id);

        if let Some(custom) = options.custom_filters.get(&filter.column_id) {
            checks.push(Check::Custom {
                column,
                custom,
                filter,
            });
            continue;
        }

        let Some(column) = column else {
            warnings.push(Warning::UnknownColumn {
                column_id: filter.column_id.clone(),
            });
            continue;
        };
        let Some(predicate) = predicate(&filter.operator) else {
            warnings.push(Warning::UnknownOperator {
                column_id: filter.column_id.clone(),
                operator: filter.operator.to_string(),
            });
            continue;
        };
        checks.push(Check::Builtin {
            column,
            predicate,
            filter,
        });
    }
    checks
}

/// Filter `rows` by `state`, preserving input order.
pub fn filter_rows<'a, T: RowData>(
    rows: impl IntoIterator<Item = &'a Row<T>>,
    state: &FilterState,
    columns: &[Column<T>],
    options: &FilterOptions<T>,
) -> Filtered<'a, T> {
    let mut warnings = Vec::new();
    let checks = resolve_filters(state, columns, options, &mut warnings);
    let term = state.global_search.trim();
    let case_sensitive = options.case_sensitive;
    let mut script_error: Option<Warning> = None;

    let rows = rows
        .into_iter()
        .filter(|row| {
            let passes = checks.iter().all(|check| match check {
                Check::Builtin {
                    column,
                    predicate,
                    filter,
                } => predicate(&column.value(&row.data), &filter.value, case_sensitive),
                Check::Custom {
                    column,
                    custom,
                    filter,
                } => {
                    let cell = match column {
                        Some(column) => column.value(&row.data),
                        None => row.data.field(&filter.column_id),
                    };
                    match custom {
                        CustomFilter::Native(f) => f(&cell, filter, &row.data),
                        CustomFilter::Script(script) => {
                            match script.eval(&cell, &filter.value, filter.operator.as_str()) {
                                Ok(keep) => keep,
                                Err(e) => {
                                    if script_error.is_none() {
                                        script_error = Some(Warning::ScriptFailed {
                                            column_id: filter.column_id.clone(),
                                            message: e.to_string(),
                                        });
                                    }
                                    false
                                }
                            }
                        }
                    }
                }
            });
            passes && (term.is_empty() || row_matches_search(row, term, columns, case_sensitive))
        })
        .collect();

    warnings.extend(script_error);
    for warning in &warnings {
        log::debug!("filter: {}", warning);
    }
    Filtered { rows, warnings }
}
