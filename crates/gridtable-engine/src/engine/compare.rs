//! Built-in type-aware ordering.
//!
//! Every value is first reduced to a [`SortKey`]. Text that reads as a number
//! becomes a number key and text that reads as a date becomes a date key, so
//! `"$9"` sorts before `"$10"` and `"2024-02-01"` before `"2024-10-01"`.
//! Keys of different kinds fall back to a fixed rank:
//!
//! `Null < Undefined < Bool < Number < Date < Text < List`
//!
//! The resulting order is total, which keeps `sort_by` well-defined on
//! arbitrary mixed data.

use chrono::NaiveDateTime;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use super::value::{Value, parse_date, parse_number};

static CHUNKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+|[^0-9]+").unwrap());

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    /// Digit run with leading zeros stripped; compared by (length, text).
    Digits(usize, String),
    Word(String),
}

/// Natural, case-insensitive text key. `raw` breaks ties so distinct strings never compare equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextKey {
    chunks: Vec<Chunk>,
    raw: String,
}

impl TextKey {
    fn new(text: &str) -> TextKey {
        let chunks = CHUNKS
            .find_iter(text)
            .map(|m| {
                let s = m.as_str();
                if s.as_bytes()[0].is_ascii_digit() {
                    let stripped = s.trim_start_matches('0');
                    Chunk::Digits(stripped.len(), stripped.to_string())
                } else {
                    Chunk::Word(s.to_lowercase())
                }
            })
            .collect();
        TextKey {
            chunks,
            raw: text.to_string(),
        }
    }
}

impl Ord for TextKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chunks
            .cmp(&other.chunks)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for TextKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Coerced, totally ordered form of a [`Value`].
#[derive(Clone, Debug)]
pub enum SortKey {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    Date(NaiveDateTime),
    Text(TextKey),
    List(Vec<SortKey>),
}

impl SortKey {
    pub fn from_value(value: &Value) -> SortKey {
        match value {
            Value::Null => SortKey::Null,
            Value::Undefined => SortKey::Undefined,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Number(n) => SortKey::Number(*n),
            Value::Date(d) => SortKey::Date(*d),
            Value::Text(s) => {
                if let Some(n) = parse_number(s) {
                    SortKey::Number(n)
                } else if let Some(d) = parse_date(s) {
                    SortKey::Date(d)
                } else {
                    SortKey::Text(TextKey::new(s))
                }
            }
            Value::List(items) => SortKey::List(items.iter().map(SortKey::from_value).collect()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Undefined => 1,
            SortKey::Bool(_) => 2,
            SortKey::Number(_) => 3,
            SortKey::Date(_) => 4,
            SortKey::Text(_) => 5,
            SortKey::List(_) => 6,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::List(a), SortKey::List(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// The built-in comparator used when neither the column nor the caller supplies one.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    SortKey::from_value(a).cmp(&SortKey::from_value(b))
}

/// Case-insensitive comparison ordering embedded digit runs by numeric value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    TextKey::new(a).cmp(&TextKey::new(b))
}
