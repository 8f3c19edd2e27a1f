//! Idempotent, concurrency-safe index provisioning.

use crate::cancel::CancellationToken;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::store::StoreContext;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One index the query engine depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    /// Suffix appended to `idx_<table>_`.
    pub suffix: &'static str,
    /// Indexed column list, including direction.
    pub columns: &'static str,
    /// Collation applied to a single text column.
    pub collation: Option<&'static str>,
}

impl IndexSpec {
    /// Indexes required by search, in creation order.
    pub const REQUIRED: [IndexSpec; 4] = [
        IndexSpec {
            suffix: "price",
            columns: "price",
            collation: None,
        },
        IndexSpec {
            suffix: "created_desc_id_desc",
            columns: "created_at DESC, id DESC",
            collation: None,
        },
        IndexSpec {
            suffix: "name",
            columns: "name",
            collation: Some(StoreConfig::INDEX_COLLATION),
        },
        IndexSpec {
            suffix: "address",
            columns: "address",
            collation: Some(StoreConfig::INDEX_COLLATION),
        },
    ];

    /// Physical index name for `table`.
    pub fn name(&self, table: &str) -> String {
        format!("idx_{}_{}", table, self.suffix)
    }

    fn create_sql(&self, table: &str) -> String {
        let columns = match self.collation {
            Some(collation) => format!("{} COLLATE {}", self.columns, collation),
            None => self.columns.to_string(),
        };
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            self.name(table),
            table,
            columns
        )
    }
}

/// Provisions the required indexes exactly once per process.
///
/// The first caller creates the indexes; concurrent callers wait on the lock
/// and then see the flag. A failed attempt leaves the flag unset so the next
/// call retries.
pub struct IndexManager {
    ctx: Arc<StoreContext>,
    ensured: AtomicBool,
    lock: Mutex<()>,
}

impl IndexManager {
    pub fn new(ctx: Arc<StoreContext>) -> Self {
        Self {
            ctx,
            ensured: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    /// Whether a previous call completed successfully.
    pub fn is_ensured(&self) -> bool {
        self.ensured.load(Ordering::Acquire)
    }

    /// Ensure all required indexes exist.
    ///
    /// Returns `true` when this call did the provisioning, `false` when it
    /// had already been done.
    pub async fn ensure_indexes(&self, cancel: &CancellationToken) -> Result<bool> {
        if self.is_ensured() {
            return Ok(false);
        }

        let _guard = self.lock.lock().await;
        if self.is_ensured() {
            return Ok(false);
        }

        let table = self.ctx.table().to_string();
        let created = self
            .ctx
            .run(cancel, move |conn| {
                let tx = conn.transaction()?;
                for spec in IndexSpec::REQUIRED.iter() {
                    tx.execute_batch(&spec.create_sql(&table))?;
                    debug!("Ensured index {}", spec.name(&table));
                }
                tx.commit()?;
                Ok(IndexSpec::REQUIRED.len())
            })
            .await?;

        self.ensured.store(true, Ordering::Release);
        info!("Ensured {} indexes on {}", created, self.ctx.table());
        Ok(true)
    }

    /// Names of the indexes currently defined on the properties table.
    pub async fn list_indexes(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let table = self.ctx.table().to_string();
        self.ctx
            .run(cancel, move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL
                     ORDER BY name",
                )?;
                let names = stmt
                    .query_map([&table], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<String>>>()?;
                Ok(names)
            })
            .await
    }
}
