//! Estate Catalog Core - listing search and pagination over an embedded store.
//!
//! The store is a single SQLite database opened once per process. Search
//! supports case-insensitive substring filters on name and address, inclusive
//! price bounds, three sort keys with a deterministic id tie-breaker and
//! clamped paging.
//!
//! # Example
//!
//! ```rust,ignore
//! use estate_core::{CancellationToken, EstateApi, SearchParams, StoreOptions};
//!
//! #[tokio::main]
//! async fn main() -> estate_core::Result<()> {
//!     let api = EstateApi::new(StoreOptions::at("./data")).await?;
//!     let cancel = CancellationToken::new();
//!
//!     let page = api.search(&SearchParams::new().name("park"), &cancel).await?;
//!     println!("{} of {} listings", page.items.len(), page.total);
//!
//!     api.close().await
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod schema;
pub mod search;
pub mod seed;
pub mod store;

mod api;

// Re-export commonly used types
pub use api::EstateApiBuilder;
pub use cancel::{CancellationToken, CancelledError};
pub use error::{EstateError, Result};
pub use index::IndexManager;
pub use models::{PageResult, Property, PropertyDto, PropertyId};
pub use schema::{NormalizationReport, SchemaNormalizer};
pub use search::{PropertySearch, SearchPage, SearchParams, SortBy, SortDir};
pub use store::{StoreContext, StoreOptions};

use std::sync::Arc;

/// Entry point wiring the store context to its components.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct EstateApi {
    ctx: Arc<StoreContext>,
    indexes: IndexManager,
    schema: SchemaNormalizer,
    search: PropertySearch,
}

impl EstateApi {
    /// Open the store and run the default startup steps.
    pub async fn new(options: StoreOptions) -> Result<Self> {
        EstateApiBuilder::new(options).build().await
    }

    pub fn builder(options: StoreOptions) -> EstateApiBuilder {
        EstateApiBuilder::new(options)
    }

    /// The shared store context.
    pub fn context(&self) -> &Arc<StoreContext> {
        &self.ctx
    }

    pub async fn search(
        &self,
        params: &SearchParams,
        cancel: &CancellationToken,
    ) -> Result<SearchPage> {
        self.search.search(params, cancel).await
    }

    pub async fn get_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Property>> {
        self.search.get_by_id(id, cancel).await
    }

    /// See [`IndexManager::ensure_indexes`].
    pub async fn ensure_indexes(&self, cancel: &CancellationToken) -> Result<bool> {
        self.indexes.ensure_indexes(cancel).await
    }

    pub async fn list_indexes(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        self.indexes.list_indexes(cancel).await
    }

    /// See [`SchemaNormalizer::ensure_schema`].
    pub async fn ensure_schema(&self, cancel: &CancellationToken) -> Result<NormalizationReport> {
        self.schema.ensure_schema(cancel).await
    }

    /// Insert the sample catalog when the store is empty.
    pub async fn seed_if_empty(&self, cancel: &CancellationToken) -> Result<usize> {
        seed::seed_if_empty(&self.ctx, cancel).await
    }

    /// Checkpoint the store and reject any later call with
    /// [`EstateError::Closed`].
    pub async fn close(&self) -> Result<()> {
        self.ctx.close().await
    }
}
