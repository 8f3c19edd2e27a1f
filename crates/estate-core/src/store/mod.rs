//! SQLite-backed store: connection ownership, configuration and SQL helpers.
//!
//! This module provides:
//! - `StoreOptions`, the injected address/database/table configuration
//! - `StoreContext`, the single connection handle shared by all components
//! - the `estate_ci` collation and `regexp` function the queries rely on

mod context;
mod functions;
mod options;

pub use context::StoreContext;
pub use options::StoreOptions;
