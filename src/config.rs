use crate::constants::{
    CSV_PATH_VAR, DATABASE_URI_VAR, DEFAULT_CUTOFF_DATE_VAR, DEFAULT_LOG_DIR, DEFAULT_TABLE_NAME,
    LOG_DIR_VAR, TABLE_NAME_VAR,
};
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

/// Everything a run needs from the outside world.
///
/// Built once by the binary and handed to [`crate::pipeline::Pipeline`]; the
/// stages never read the environment themselves.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub csv_path: PathBuf,
    pub database_uri: String,
    /// Kept as text so a malformed value surfaces as an extraction failure.
    pub default_cutoff: Option<String>,
    pub table_name: String,
    pub log_dir: PathBuf,
}

impl EtlConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let csv_path = get(CSV_PATH_VAR).ok_or(ConfigError::MissingVar(CSV_PATH_VAR))?;
        let database_uri =
            get(DATABASE_URI_VAR).ok_or(ConfigError::MissingVar(DATABASE_URI_VAR))?;

        Ok(Self {
            csv_path: PathBuf::from(csv_path),
            database_uri,
            default_cutoff: get(DEFAULT_CUTOFF_DATE_VAR),
            table_name: get(TABLE_NAME_VAR).unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            log_dir: PathBuf::from(get(LOG_DIR_VAR).unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())),
        })
    }

    /// Picks the cutoff for a run: the explicit one, else the configured default.
    pub fn resolve_cutoff(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_cutoff.clone())
            .ok_or(ConfigError::MissingCutoff)
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Result<Self, ConfigError> {
        let table_name = table_name.into();
        if table_name.trim().is_empty() {
            return Err(ConfigError::InvalidVar {
                name: TABLE_NAME_VAR,
                reason: "table name must not be blank".to_string(),
            });
        }
        self.table_name = table_name;
        Ok(self)
    }
}
