//! Builder for configuring EstateApi initialization.

use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::index::IndexManager;
use crate::schema::SchemaNormalizer;
use crate::search::PropertySearch;
use crate::seed;
use crate::store::{StoreContext, StoreOptions};
use crate::EstateApi;
use tracing::info;

/// Builder for configuring EstateApi initialization.
///
/// # Example
///
/// ```rust,ignore
/// use estate_core::{EstateApi, StoreOptions};
///
/// let api = EstateApi::builder(StoreOptions::at("./data"))
///     .with_schema_repair(false)
///     .build()
///     .await?;
/// ```
pub struct EstateApiBuilder {
    options: StoreOptions,
    ensure_indexes: bool,
    repair_schema: bool,
    cancel: CancellationToken,
}

impl EstateApiBuilder {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            ensure_indexes: true,
            repair_schema: true,
            cancel: CancellationToken::new(),
        }
    }

    /// Provision the search indexes during `build`.
    ///
    /// Default: `true`
    pub fn with_indexes(mut self, enable: bool) -> Self {
        self.ensure_indexes = enable;
        self
    }

    /// Rewrite legacy textual prices during `build`.
    ///
    /// Default: `true`
    pub fn with_schema_repair(mut self, enable: bool) -> Self {
        self.repair_schema = enable;
        self
    }

    /// Insert the sample catalog into an empty store during `build`.
    ///
    /// Default: whatever `StoreOptions::seed_on_start` says.
    pub fn with_seed(mut self, enable: bool) -> Self {
        self.options.seed_on_start = enable;
        self
    }

    /// Token that aborts the startup work.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Open the store and run the enabled startup steps in order:
    /// indexes, schema repair, seed.
    pub async fn build(self) -> Result<EstateApi> {
        let ctx = Arc::new(StoreContext::open(&self.options)?);

        let indexes = IndexManager::new(Arc::clone(&ctx));
        if self.ensure_indexes {
            indexes.ensure_indexes(&self.cancel).await?;
        }

        let schema = SchemaNormalizer::new(Arc::clone(&ctx));
        if self.repair_schema {
            let report = schema.ensure_schema(&self.cancel).await?;
            if !report.skipped.is_empty() {
                info!(
                    "{} properties keep a textual price and are excluded from price filters",
                    report.skipped.len()
                );
            }
        }

        if self.options.seed_on_start {
            seed::seed_if_empty(&ctx, &self.cancel).await?;
        }

        Ok(EstateApi {
            search: PropertySearch::new(Arc::clone(&ctx)),
            indexes,
            schema,
            ctx,
        })
    }
}
