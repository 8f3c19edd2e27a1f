//! Estate Server - HTTP backend for the listing catalog.
//!
//! Wraps `estate-core` with a small read-only REST surface consumed by the
//! web client.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use estate_core::config::{AppConfig, EnvConfig};
use estate_core::{EstateApi, StoreOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "estate-server")]
#[command(about = "HTTP server for the estate catalog")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, env = "ESTATE_PORT", default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "ESTATE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "ESTATE_LOG_JSON")]
    log_json: bool,

    /// Directory holding the database file
    #[arg(long, env = EnvConfig::DATA_DIR, default_value = AppConfig::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Database name (file stem)
    #[arg(long, env = EnvConfig::DATABASE, default_value = AppConfig::DEFAULT_DATABASE)]
    database: String,

    /// Properties table name
    #[arg(long, env = EnvConfig::PROPERTIES_TABLE, default_value = AppConfig::DEFAULT_PROPERTIES_TABLE)]
    table: String,

    /// Insert the sample catalog when the store is empty
    #[arg(long, env = EnvConfig::SEED_ON_START)]
    seed: bool,

    /// Origin allowed by CORS (repeatable)
    #[arg(
        long = "allowed-origin",
        env = "ESTATE_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = server::DEFAULT_ORIGINS
    )]
    allowed_origins: Vec<String>,
}

impl Args {
    fn store_options(&self) -> StoreOptions {
        StoreOptions::at(&self.data_dir)
            .with_database(&self.database)
            .with_table(&self.table)
            .with_seed_on_start(self.seed)
    }
}

fn init_logging(args: &Args) {
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_target(false).with_thread_ids(false);

    // RUST_LOG wins over --debug when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    if args.log_json {
        builder.with_env_filter(filter).json().init();
    } else {
        builder.with_env_filter(filter).compact().init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    info!("Starting {}", AppConfig::APP_NAME);
    info!("Data directory: {}", args.data_dir.display());

    let api = Arc::new(EstateApi::new(args.store_options()).await?);

    let addr = server::start_server(
        Arc::clone(&api),
        &args.host,
        args.port,
        &args.allowed_origins,
    )
    .await?;

    // Machine-readable port line for supervisors and tests
    println!("ESTATE_PORT={}", addr.port());

    info!("Estate server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, closing store");
    api.close().await?;

    Ok(())
}
