//! Index provisioning for the properties table.
//!
//! The search engine relies on four indexes: price for range filters,
//! (created_at, id) descending for the default sort and its tie-breaker, and
//! case-insensitive name and address indexes.

mod manager;

pub use manager::{IndexManager, IndexSpec};
