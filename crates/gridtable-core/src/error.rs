//! Error types for Gridtable core.
//!
//! Ordinary misuse is reported as a [`gridtable_engine::engine::Warning`],
//! not an error. Errors are reserved for calls that cannot proceed at all.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("table `{instance}` has been destroyed")]
    Destroyed { instance: String },

    #[error("plugin `{name}` failed: {message}")]
    Plugin { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, TableError>;
