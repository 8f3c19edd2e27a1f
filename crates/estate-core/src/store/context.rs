//! The single store handle shared by every catalog component.

use super::functions;
use super::options::StoreOptions;
use crate::cancel::CancellationToken;
use crate::config::StoreConfig;
use crate::error::{EstateError, Result};
use rusqlite::{Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Owns the catalog's database connection for the lifetime of the process.
///
/// Created once at startup and shared behind an `Arc`. Blocking SQLite work is
/// moved off the async runtime with `spawn_blocking`.
pub struct StoreContext {
    db_path: Option<PathBuf>,
    table: String,
    conn: Arc<Mutex<Connection>>,
    closed: AtomicBool,
}

impl StoreContext {
    /// Open (or create) the store described by `options`.
    pub fn open(options: &StoreOptions) -> Result<Self> {
        options.validate()?;

        let db_path = options.database_path();
        let conn = match &db_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)
                            .map_err(|e| EstateError::io_with_path(e, parent))?;
                    }
                }
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };

        Self::configure_connection(&conn)?;
        functions::register(&conn)?;
        Self::ensure_table(&conn, &options.properties_table)?;

        info!(
            "Opened store {} (table {})",
            db_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            options.properties_table
        );

        Ok(Self {
            db_path,
            table: options.properties_table.clone(),
            conn: Arc::new(Mutex::new(conn)),
            closed: AtomicBool::new(false),
        })
    }

    /// Configure connection with optimal settings.
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.busy_timeout(StoreConfig::BUSY_TIMEOUT)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            ",
        )?;
        Ok(())
    }

    /// Create the properties table if it does not exist.
    ///
    /// `price` is declared without a type so SQLite applies no affinity and
    /// legacy textual prices stay textual until the normalizer rewrites them.
    fn ensure_table(conn: &Connection, table: &str) -> Result<()> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY NOT NULL,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                price NOT NULL,
                image_url TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"
        ))?;
        Ok(())
    }

    /// Name of the properties table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Path of the database file, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run `op` against the connection on the blocking pool.
    ///
    /// `cancel` is checked before the connection is taken and then polled by a
    /// progress handler while `op` runs. Dropping the returned future cancels
    /// the statement in flight. Fails with [`EstateError::Closed`] after
    /// [`close`](Self::close).
    pub(crate) async fn run<T, F>(&self, cancel: &CancellationToken, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        if self.is_closed() {
            return Err(EstateError::Closed);
        }
        cancel.check()?;

        let conn = Arc::clone(&self.conn);
        let caller = cancel.clone();
        let abandoned = CancellationToken::new();
        let guard = abandoned.drop_guard();

        let handle = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| EstateError::lock_poisoned())?;

            // Waiting for the lock may have taken a while.
            if caller.is_cancelled() || abandoned.is_cancelled() {
                return Err(EstateError::Cancelled);
            }

            conn.progress_handler(
                StoreConfig::PROGRESS_HANDLER_OPS,
                Some(move || caller.is_cancelled() || abandoned.is_cancelled()),
            );
            let result = op(&mut conn);
            conn.progress_handler(0, None::<fn() -> bool>);
            result
        });

        let joined = handle.await;
        guard.disarm();

        match joined? {
            Err(err) if cancel.is_cancelled() || is_interrupt(&err) => {
                debug!("Store operation cancelled: {}", err);
                Err(EstateError::Cancelled)
            }
            other => other,
        }
    }

    /// Checkpoint the WAL so the database file is self-contained.
    pub async fn checkpoint(&self, cancel: &CancellationToken) -> Result<()> {
        if self.db_path.is_none() {
            return Ok(());
        }
        self.run(cancel, |conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
            Ok(())
        })
        .await?;
        debug!("Checkpointed WAL");
        Ok(())
    }

    /// Whether [`close`](Self::close) has completed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Checkpoint the WAL and stop accepting work.
    ///
    /// Every later store call fails with [`EstateError::Closed`]. The
    /// connection itself is released when the last `Arc` drops. Closing twice
    /// is a no-op; a failed checkpoint leaves the context open.
    pub async fn close(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.checkpoint(&CancellationToken::new()).await?;
        self.closed.store(true, Ordering::Release);
        info!("Closed store (table {})", self.table);
        Ok(())
    }
}

fn is_interrupt(err: &EstateError) -> bool {
    matches!(
        err,
        EstateError::Database {
            source: Some(rusqlite::Error::SqliteFailure(e, _)),
            ..
        } if e.code == ErrorCode::OperationInterrupted
    )
}
