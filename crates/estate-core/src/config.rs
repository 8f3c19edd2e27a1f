//! Centralized configuration constants for the estate catalog.
//!
//! Runtime, per-deployment values (paths, names) live in
//! [`StoreOptions`](crate::store::StoreOptions).

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Estate Catalog";
    pub const DEFAULT_DATABASE: &'static str = "realestate";
    pub const DEFAULT_PROPERTIES_TABLE: &'static str = "properties";
    pub const DEFAULT_DATA_DIR: &'static str = "data";
}

/// Paging limits applied to every search.
pub struct PaginationConfig;

impl PaginationConfig {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_PAGE_SIZE: i64 = 20;
    pub const MAX_PAGE_SIZE: i64 = 100;
}

/// SQLite connection and maintenance settings.
pub struct StoreConfig;

impl StoreConfig {
    pub const BUSY_TIMEOUT: Duration = Duration::from_secs(30);
    /// Rows rewritten per normalizer transaction.
    pub const NORMALIZE_BATCH_SIZE: usize = 500;
    /// VM instructions between cancellation checks.
    pub const PROGRESS_HANDLER_OPS: i32 = 1_000;
    /// Connection-registered collation for case-insensitive sorting.
    pub const CASE_INSENSITIVE_COLLATION: &'static str = "estate_ci";
    /// Built-in collation for persisted indexes, so other writers can open the file.
    pub const INDEX_COLLATION: &'static str = "NOCASE";
    pub const DATABASE_EXTENSION: &'static str = "db";
}

/// Environment variables read by [`StoreOptions::from_env`](crate::store::StoreOptions::from_env).
pub struct EnvConfig;

impl EnvConfig {
    pub const DATA_DIR: &'static str = "ESTATE_DATA_DIR";
    pub const DATABASE: &'static str = "ESTATE_DB";
    pub const PROPERTIES_TABLE: &'static str = "ESTATE_TABLE_PROPERTIES";
    pub const SEED_ON_START: &'static str = "ESTATE_SEED_ON_START";
}
