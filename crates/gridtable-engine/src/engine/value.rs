//! Cell values and the coercions shared by sorting, filtering and search.
//!
//! A [`Value`] is what a column yields for a row. Text is coerced lazily:
//! `"$1,200.50"` behaves as a number and `"2024-03-01"` as a date whenever
//! both sides of a comparison agree on that reading.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Numbers with an optional currency symbol and thousands separators.
static CURRENCY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?<lead>[-+]?)\s*[$€£¥₹]?\s*(?<sign>[-+]?)(?<digits>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?|\.\d+)\s*[$€£¥₹]?$",
    )
    .unwrap()
});

/// A single field value read out of a row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// An explicit null.
    #[default]
    Null,
    /// A field the row does not carry at all.
    Undefined,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::List(_) => "list",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    /// Null, undefined, whitespace-only text and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Chronological reading of the value, if it has one.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_date(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text used by search and the string operators. Null and undefined render empty.
    pub fn display(&self) -> String {
        match self {
            Value::Null | Value::Undefined => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Date(d) => {
                if d.time().num_seconds_from_midnight() == 0 && d.time().nanosecond() == 0 {
                    d.format("%Y-%m-%d").to_string()
                } else {
                    d.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            Value::List(items) => items
                .iter()
                .map(Value::display)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Parse numeric text, accepting a currency symbol and thousands separators.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return n.is_finite().then_some(n);
    }

    let caps = CURRENCY_NUMBER.captures(trimmed)?;
    let negative = &caps["lead"] == "-" || &caps["sign"] == "-";
    let n = caps["digits"].replace(',', "").parse::<f64>().ok()?;
    Some(if negative { -n } else { n })
}

/// Parse RFC 3339 timestamps, `YYYY-MM-DD` dates and `YYYY-MM-DD HH:MM:SS` datetimes.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    // Shortest accepted form is YYYY-MM-DD.
    if trimmed.len() < 10 {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a number for display: integers without a fraction, everything else as-is.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let label = if n > 0.0 { "Infinity" } else { "-Infinity" };
        label.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Text(obj.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_plain_and_currency() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number("$1,200.50"), Some(1200.5));
        assert_eq!(parse_number("€3"), Some(3.0));
        assert_eq!(parse_number("-$4"), Some(-4.0));
        assert_eq!(parse_number("$-4"), Some(-4.0));
    }

    #[test]
    fn test_parse_number_rejects_non_numeric() {
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("12 USD"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1,2,3"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let day = parse_date("2024-03-01").unwrap();
        assert_eq!(day.format("%Y-%m-%d %H:%M").to_string(), "2024-03-01 00:00");

        let spaced = parse_date("2024-03-01 12:30:00").unwrap();
        let rfc = parse_date("2024-03-01T12:30:00Z").unwrap();
        assert_eq!(spaced, rfc);

        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024").is_none());
    }

    #[test]
    fn test_display_renders_nullish_as_empty() {
        assert_eq!(Value::Null.display(), "");
        assert_eq!(Value::Undefined.display(), "");
        assert_eq!(Value::from(30).display(), "30");
        assert_eq!(Value::from(1.5).display(), "1.5");
        assert_eq!(Value::from(true).display(), "true");
        assert_eq!(
            Value::from(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).display(),
            "2024-01-02"
        );
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"a": [1, "x", null]});
        let v = Value::from(json["a"].clone());
        assert_eq!(
            v,
            Value::List(vec![Value::Number(1.0), Value::from("x"), Value::Null])
        );
    }

    #[test]
    fn test_blank_values() {
        assert!(Value::Text("   ".into()).is_blank());
        assert!(Value::List(vec![]).is_blank());
        assert!(!Value::Number(0.0).is_blank());
        assert!(!Value::Bool(false).is_blank());
    }
}
