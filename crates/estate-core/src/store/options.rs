//! Injected store configuration.

use crate::config::{AppConfig, EnvConfig, StoreConfig};
use crate::error::{EstateError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the catalog lives and what its table is called.
///
/// `data_dir` plays the role of the store address and `database` the database
/// name; the file is `<data_dir>/<database>.db`. Without a data directory the
/// store is an in-memory database that lives as long as its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOptions {
    pub data_dir: Option<PathBuf>,
    pub database: String,
    pub properties_table: String,
    pub seed_on_start: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from(AppConfig::DEFAULT_DATA_DIR)),
            database: AppConfig::DEFAULT_DATABASE.to_string(),
            properties_table: AppConfig::DEFAULT_PROPERTIES_TABLE.to_string(),
            seed_on_start: false,
        }
    }
}

impl StoreOptions {
    /// Options for a file-backed store under `data_dir`.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }

    /// Options for a private in-memory store.
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            ..Self::default()
        }
    }

    /// Read options from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read options through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup(EnvConfig::DATA_DIR)
                .map(PathBuf::from)
                .or(defaults.data_dir),
            database: lookup(EnvConfig::DATABASE).unwrap_or(defaults.database),
            properties_table: lookup(EnvConfig::PROPERTIES_TABLE)
                .unwrap_or(defaults.properties_table),
            seed_on_start: lookup(EnvConfig::SEED_ON_START)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.seed_on_start),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.properties_table = table.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_seed_on_start(mut self, seed: bool) -> Self {
        self.seed_on_start = seed;
        self
    }

    /// Full path of the database file, or `None` for an in-memory store.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| {
            dir.join(format!(
                "{}.{}",
                self.database,
                StoreConfig::DATABASE_EXTENSION
            ))
        })
    }

    /// Check names that end up interpolated into SQL or file paths.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.properties_table) {
            return Err(EstateError::Config {
                message: format!("Invalid table name: {:?}", self.properties_table),
            });
        }
        if self.database.is_empty()
            || !self
                .database
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(EstateError::Config {
                message: format!("Invalid database name: {:?}", self.database),
            });
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
