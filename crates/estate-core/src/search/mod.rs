//! Property search and pagination.

mod engine;
mod params;
mod query;

pub use engine::{PropertySearch, SearchPage};
pub use params::{Paging, SearchParams, SortBy, SortDir};
