//! Settings file loading.
//!
//! A settings file is TOML with one table per feature:
//!
//! ```toml
//! [sorting]
//! default_sort = [{ columnId = "age", direction = "desc" }]
//!
//! [filtering]
//! debounce_ms = 250
//!
//! [filtering.custom_filters]
//! name = "value.starts_with(target)"
//!
//! [pagination]
//! page_size = 25
//! ```
//!
//! Missing keys take their defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use gridtable_core::TableSettings;

use crate::error::{GridtableError, Result};

pub const SETTINGS_FILE_NAME: &str = "table.toml";

pub fn settings_from_str(text: &str) -> Result<TableSettings> {
    Ok(toml::from_str::<TableSettings>(text)?)
}

pub fn load_settings(path: &Path) -> Result<TableSettings> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str::<TableSettings>(&content).map_err(|source| GridtableError::Settings {
        path: path.to_path_buf(),
        source,
    })
}

/// `<config_dir>/gridtable/table.toml`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridtable")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push(SETTINGS_FILE_NAME);
    Some(path)
}

/// Load `path`, or the default settings file when `path` is `None`.
/// A default file that does not exist yields the built-in defaults.
pub fn load_settings_or_default(path: Option<&Path>) -> Result<TableSettings> {
    if let Some(path) = path {
        return load_settings(path);
    }
    match default_settings_path() {
        Some(path) if path.is_file() => load_settings(&path),
        Some(path) => {
            log::debug!("no settings at {}, using defaults", path.display());
            Ok(TableSettings::default())
        }
        None => Ok(TableSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtable_engine::engine::{SortDirection, SortSpec};

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(settings_from_str("").unwrap(), TableSettings::default());
    }

    #[test]
    fn test_partial_settings() {
        let settings = settings_from_str(
            r#"
            [sorting]
            multi_sort = false
            default_sort = [{ column_id = "age", direction = "desc" }]

            [filtering]
            debounce_ms = 250
            case_sensitive = true

            [filtering.custom_filters]
            name = "value.starts_with(target)"

            [pagination]
            page_size = 25
            "#,
        )
        .unwrap();

        assert!(settings.sorting.enabled);
        assert!(!settings.sorting.multi_sort);
        assert_eq!(
            settings.sorting.default_sort,
            vec![SortSpec::new("age", SortDirection::Desc)]
        );
        assert_eq!(settings.filtering.debounce_ms, 250);
        assert!(settings.filtering.case_sensitive);
        assert!(settings.filtering.global_search);
        assert_eq!(
            settings.filtering.custom_filters["name"],
            "value.starts_with(target)"
        );
        assert_eq!(settings.pagination.page_size, 25);
        assert_eq!(settings.pagination.max_page_size, 1000);
        assert!(settings.selection.multiple);
    }

    #[test]
    fn test_bad_type_is_error() {
        let err = settings_from_str("[pagination]\npage_size = \"ten\"\n").unwrap_err();
        assert!(matches!(err, GridtableError::InvalidSettings(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_settings(Path::new("/definitely/not/here/table.toml")).unwrap_err();
        assert!(matches!(err, GridtableError::Io(_)));
    }

    #[test]
    fn test_load_reports_path() {
        let path = std::env::temp_dir().join(format!("gridtable-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[sorting]\nenabled = 3\n").unwrap();
        let err = load_settings(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("Failed to parse"));
        assert!(matches!(err, GridtableError::Settings { .. }));
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with("table.toml"));
        }
    }
}
