//! Column aggregates over a row set.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::column::Column;
use super::compare::compare_values;
use super::row::{Row, RowData};
use super::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFn {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFn::Count => "count",
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSpec {
    pub column_id: String,
    pub function: AggregateFn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AggregateSpec {
    pub fn new(column_id: impl Into<String>, function: AggregateFn) -> AggregateSpec {
        AggregateSpec {
            column_id: column_id.into(),
            function,
            label: None,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> AggregateSpec {
        self.label = Some(label.into());
        self
    }

    /// Result key: the label, or `<column>_<fn>`.
    pub fn key(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}_{}", self.column_id, self.function),
        }
    }
}

/// Compute `function` over `column` for `rows`.
///
/// `count` counts non-blank cells. `sum` and `avg` read numeric cells only;
/// `avg` of nothing is 0. `min` and `max` use the default comparator over
/// non-blank cells and yield `Null` for an empty input.
pub fn aggregate<'a, T: RowData + 'a>(
    rows: impl IntoIterator<Item = &'a Row<T>>,
    column: &Column<T>,
    function: AggregateFn,
) -> Value {
    let cells = rows
        .into_iter()
        .map(|row| column.value(&row.data))
        .filter(|v| !v.is_blank());

    match function {
        AggregateFn::Count => Value::from(cells.count()),
        AggregateFn::Sum => Value::Number(cells.filter_map(|v| v.as_number()).sum()),
        AggregateFn::Avg => {
            let (sum, n) = cells
                .filter_map(|v| v.as_number())
                .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
            Value::Number(if n == 0 { 0.0 } else { sum / n as f64 })
        }
        AggregateFn::Min => cells
            .min_by(|a, b| compare_values(a, b))
            .unwrap_or(Value::Null),
        AggregateFn::Max => cells
            .max_by(|a, b| match compare_values(a, b) {
                // Keep the first of equal maxima.
                Ordering::Equal => Ordering::Greater,
                o => o,
            })
            .unwrap_or(Value::Null),
    }
}
