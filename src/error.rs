//! Error types for the gridtable facade

use std::path::PathBuf;

use thiserror::Error;

use gridtable_core::TableError;

/// Errors from loading settings or driving a table
#[derive(Error, Debug)]
pub enum GridtableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {}: {}", .path.display(), .source)]
    Settings {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] toml::de::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, GridtableError>;
