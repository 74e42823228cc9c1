//! Usage warnings.
//!
//! Ordinary misuse never fails: the offending operation becomes a no-op and
//! one of these is reported instead.

use std::fmt;

use super::row::RowId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A configuration flag turned the feature off.
    FeatureDisabled { feature: &'static str },
    UnknownColumn { column_id: String },
    ColumnNotSortable { column_id: String },
    /// Filter operator name outside the known set; the filter passes every row.
    UnknownOperator { column_id: String, operator: String },
    UnknownRow { row_id: RowId },
    DuplicateRow { row_id: RowId },
    PageOutOfRange { page_index: usize, total_pages: usize },
    InvalidPageSize { requested: usize, max: usize },
    /// A custom filter script failed to compile or evaluate.
    ScriptFailed { column_id: String, message: String },
    UnknownPlugin { name: String },
    DuplicatePlugin { name: String },
    PluginFailed { name: String, message: String },
    /// A mutation was issued from event handlers nested deeper than the limit.
    DispatchDepthExceeded { depth: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::FeatureDisabled { feature } => write!(f, "{} is disabled", feature),
            Warning::UnknownColumn { column_id } => write!(f, "unknown column `{}`", column_id),
            Warning::ColumnNotSortable { column_id } => {
                write!(f, "column `{}` is not sortable", column_id)
            }
            Warning::UnknownOperator {
                column_id,
                operator,
            } => write!(
                f,
                "unknown filter operator `{}` on column `{}`; filter ignored",
                operator, column_id
            ),
            Warning::UnknownRow { row_id } => write!(f, "unknown row `{}`", row_id),
            Warning::DuplicateRow { row_id } => write!(f, "duplicate row id `{}`", row_id),
            Warning::PageOutOfRange {
                page_index,
                total_pages,
            } => write!(
                f,
                "page {} is out of range ({} pages)",
                page_index, total_pages
            ),
            Warning::InvalidPageSize { requested, max } => {
                write!(f, "page size {} is outside 1..={}", requested, max)
            }
            Warning::ScriptFailed { column_id, message } => {
                write!(f, "filter script for `{}` failed: {}", column_id, message)
            }
            Warning::UnknownPlugin { name } => write!(f, "no plugin named `{}`", name),
            Warning::DuplicatePlugin { name } => {
                write!(f, "plugin `{}` is already installed", name)
            }
            Warning::PluginFailed { name, message } => {
                write!(f, "plugin `{}` failed to install: {}", name, message)
            }
            Warning::DispatchDepthExceeded { depth } => write!(
                f,
                "mutation dropped: event handlers nested {} levels deep",
                depth
            ),
        }
    }
}
