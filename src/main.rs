//! poolfilter - pool filter pump controller.
//!
//! Usage:
//!   poolfilter serve [--config <file>]   Run the scheduler and HTTP API

use clap::{Parser, Subcommand};
use poolfilter::api::{create_api_state, start_server, ApiConfig};
use poolfilter::config::AppConfig;
use poolfilter::hardware::PumpDriver;
use poolfilter::scheduler::Scheduler;
use poolfilter::storage::{ProgramStore, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// poolfilter - pool filter pump controller
#[derive(Parser)]
#[command(name = "poolfilter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler and the HTTP API
    Serve {
        /// Path to a YAML configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the database path
        #[arg(long, value_name = "FILE")]
        database: Option<PathBuf>,
    },
}

#[cfg(feature = "gpio")]
fn build_driver(config: &AppConfig) -> Result<Arc<dyn PumpDriver>, Box<dyn std::error::Error>> {
    let driver = poolfilter::hardware::GpioDriver::new(config.hardware.gpio_pin)?;
    info!(pin = config.hardware.gpio_pin, "using GPIO pump driver");
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "gpio"))]
fn build_driver(_config: &AppConfig) -> Result<Arc<dyn PumpDriver>, Box<dyn std::error::Error>> {
    info!("no GPIO support compiled in, logging pump commands only");
    Ok(Arc::new(poolfilter::hardware::TracingDriver))
}

async fn serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    database: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(database) = database {
        config.database.path = database;
    }

    let store = Arc::new(SqliteStore::new(&config.database.path).await?);
    store.seed_seasons(&config.seasons.to_table()?).await?;
    info!(path = %config.database.path.display(), "database ready");

    let driver = build_driver(&config)?;
    let scheduler = Arc::new(
        Scheduler::new(Arc::clone(&store), driver).with_tick_interval(config.tick_interval()),
    );

    // Rebuild the schedule from the program table, then start ticking.
    scheduler.update_next_event().await?;
    let programs = store.list_programs().await?.len();
    info!(programs, "schedule rebuilt from program table");
    scheduler.spawn();

    let api_config = ApiConfig::new(config.server.host.clone(), config.server.port);
    let state = create_api_state(scheduler, store);
    start_server(api_config, state).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            database,
        } => serve(config, port, database).await?,
    }

    Ok(())
}
