//! Rewrites textual prices to their numeric form.
//!
//! Only `price` is touched, only on rows where it is still text, and only
//! when the text parses. Unparsable rows stay as they are and keep being
//! excluded from numeric range filters until fixed by hand.

use crate::cancel::CancellationToken;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::models::{parse_legacy_price, price_to_sql, PropertyId};
use crate::store::StoreContext;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of a normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationReport {
    /// Rows found with a textual price.
    pub scanned: usize,
    /// Rows rewritten to a numeric price.
    pub converted: usize,
    /// Rows left untouched because their text did not parse.
    pub skipped: Vec<PropertyId>,
}

impl NormalizationReport {
    pub fn is_empty(&self) -> bool {
        self.scanned == 0
    }
}

/// Runs the price repair at most once per process.
pub struct SchemaNormalizer {
    ctx: Arc<StoreContext>,
    ensured: AtomicBool,
    lock: Mutex<()>,
}

impl SchemaNormalizer {
    pub fn new(ctx: Arc<StoreContext>) -> Self {
        Self {
            ctx,
            ensured: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Whether a previous pass completed successfully.
    pub fn is_ensured(&self) -> bool {
        self.ensured.load(Ordering::Acquire)
    }

    /// Repair textual prices, once.
    ///
    /// Later calls return an empty report without touching the store. A pass
    /// that fails (or is cancelled) part-way leaves the flag unset; batches
    /// already committed stay committed and the next call picks up the rest.
    pub async fn ensure_schema(&self, cancel: &CancellationToken) -> Result<NormalizationReport> {
        if self.is_ensured() {
            return Ok(NormalizationReport::default());
        }

        let _guard = self.lock.lock().await;
        if self.is_ensured() {
            return Ok(NormalizationReport::default());
        }

        let report = self.normalize(cancel).await?;
        self.ensured.store(true, Ordering::Release);

        if report.is_empty() {
            debug!("No textual prices found in {}", self.ctx.table());
        } else {
            info!(
                "Normalized prices in {}: {} scanned, {} converted, {} skipped",
                self.ctx.table(),
                report.scanned,
                report.converted,
                report.skipped.len()
            );
        }
        Ok(report)
    }

    async fn normalize(&self, cancel: &CancellationToken) -> Result<NormalizationReport> {
        let legacy = self.find_textual_prices(cancel).await?;

        let mut report = NormalizationReport {
            scanned: legacy.len(),
            ..Default::default()
        };

        let mut updates = Vec::with_capacity(legacy.len());
        for (id, text) in legacy {
            match parse_legacy_price(&text).and_then(price_to_sql) {
                Some(value) => updates.push((id, value)),
                None => {
                    warn!("Leaving unconvertible price {:?} on property {}", text, id);
                    report.skipped.push(PropertyId::from(id));
                }
            }
        }

        for batch in updates.chunks(StoreConfig::NORMALIZE_BATCH_SIZE) {
            report.converted += self.apply_batch(batch.to_vec(), cancel).await?;
        }

        Ok(report)
    }

    async fn find_textual_prices(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, String)>> {
        let sql = format!(
            "SELECT id, price FROM {} WHERE typeof(price) = 'text' ORDER BY id",
            self.ctx.table()
        );
        self.ctx
            .run(cancel, move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Apply one batch in its own transaction; all of it or none of it.
    async fn apply_batch(
        &self,
        batch: Vec<(String, f64)>,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let sql = format!(
            "UPDATE {} SET price = ?1 WHERE id = ?2 AND typeof(price) = 'text'",
            self.ctx.table()
        );
        let size = batch.len();
        let changed = self
            .ctx
            .run(cancel, move |conn| {
                let tx = conn.transaction()?;
                let mut changed = 0;
                {
                    let mut stmt = tx.prepare(&sql)?;
                    for (id, price) in &batch {
                        changed += stmt.execute(rusqlite::params![price, id])?;
                    }
                }
                tx.commit()?;
                Ok(changed)
            })
            .await?;
        debug!("Rewrote {} of {} prices in batch", changed, size);
        Ok(changed)
    }
}
