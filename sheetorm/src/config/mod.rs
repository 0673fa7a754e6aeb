// Process configuration - service account key path and target sheet

use crate::error::{Result, SheetOrmError};
use std::path::PathBuf;

pub const KEY_PATH_VAR: &str = "GOOGLE_SERVICE_ACCOUNT";
pub const SPREADSHEET_ID_VAR: &str = "SPREADSHEET_ID";
pub const SHEET_NAME_VAR: &str = "SHEET_NAME";

/// Settings read from the environment. Every value is optional at load time;
/// consumers report what they need when it is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub key_path: Option<PathBuf>,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
}

impl Config {
    /// Load a `.env` file from the working directory (if any), then read the
    /// process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Failed to load .env file: {e}");
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Config {
            key_path: get(KEY_PATH_VAR).map(PathBuf::from),
            spreadsheet_id: get(SPREADSHEET_ID_VAR),
            sheet_name: get(SHEET_NAME_VAR),
        }
    }

    /// The spreadsheet id and sheet name, both of which must be set.
    pub fn require_table(&self) -> Result<(&str, &str)> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| missing(SPREADSHEET_ID_VAR))?;
        let sheet_name = self
            .sheet_name
            .as_deref()
            .ok_or_else(|| missing(SHEET_NAME_VAR))?;
        Ok((spreadsheet_id, sheet_name))
    }
}

fn missing(name: &str) -> SheetOrmError {
    SheetOrmError::Configuration(format!("{name} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_vars() {
        let config = Config::from_lookup(lookup(&[
            (KEY_PATH_VAR, "keys/service.json"),
            (SPREADSHEET_ID_VAR, "abc123"),
            (SHEET_NAME_VAR, "Users"),
        ]));

        assert_eq!(config.key_path, Some(PathBuf::from("keys/service.json")));
        assert_eq!(config.require_table().unwrap(), ("abc123", "Users"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[(KEY_PATH_VAR, "  "), (SHEET_NAME_VAR, "")]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_require_table_reports_missing_var() {
        let config = Config::from_lookup(lookup(&[(SPREADSHEET_ID_VAR, "abc123")]));
        let err = config.require_table().unwrap_err();
        match err {
            SheetOrmError::Configuration(msg) => assert!(msg.contains(SHEET_NAME_VAR)),
            other => panic!("Expected Configuration error, got: {other}"),
        }
    }
}
