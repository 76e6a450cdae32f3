//! Agora daemon — runs the reputation core as a long-lived service.
//!
//! Opens the LMDB store, spawns the recalculation worker, and feeds it from
//! the periodic sweep until ctrl-c. Event-driven triggers (votes cast via
//! the API collaborator) land on the same queue through the engine's
//! recalc sink.

mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use agora_reputation::{recalc_channel, Aggregator};
use agora_store_lmdb::{LmdbEnvironment, LmdbStore};
use agora_types::{ReputationParams, TokenCatalog};

use config::ServiceConfig;

#[derive(Parser)]
#[command(name = "agora-daemon", about = "Agora reputation service daemon")]
struct Cli {
    /// Data directory for LMDB storage.
    #[arg(long, env = "AGORA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Interval between periodic full recalculation sweeps, seconds.
    #[arg(long, env = "AGORA_SWEEP_SECS")]
    sweep_secs: Option<u64>,

    /// Use fast development timelines (short voting window, quick sweeps).
    #[arg(long, env = "AGORA_DEV")]
    dev: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "AGORA_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<ServiceConfig> = if let Some(ref config_path) = cli.config {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str::<ServiceConfig>(&contents) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    eprintln!("failed to parse config file: {e}, using defaults");
                    None
                }
            },
            Err(e) => {
                eprintln!(
                    "failed to read config file {}: {e}, using defaults",
                    config_path.display()
                );
                None
            }
        }
    } else {
        None
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(sweep_secs) = cli.sweep_secs {
        config.sweep_secs = sweep_secs;
    }
    config.log_level = cli.log_level;
    config.params = if cli.dev {
        ReputationParams::dev_defaults()
    } else {
        ReputationParams::standard()
    };

    logging::init_tracing(&config.log_level);

    let catalog = if config.token_programs.is_empty() {
        TokenCatalog::mainnet()
    } else {
        TokenCatalog::from_ids(&config.token_programs)?
    };
    tracing::info!(
        data_dir = %config.data_dir.display(),
        token_programs = catalog.token_programs.len(),
        sweep_secs = config.sweep_secs,
        "starting agora reputation daemon"
    );

    let env = LmdbEnvironment::open(&config.data_dir)?;
    let store = Arc::new(LmdbStore::new(env));

    let aggregator = Arc::new(Aggregator::new(store.clone(), config.params.clone()));
    let (recalc_queue, recalc_worker) = recalc_channel(aggregator.clone());
    let worker_handle = tokio::spawn(recalc_worker.run());

    // Handed to the RPC/webhook collaborator; votes cast through it land on
    // the recalc queue.
    let vote_engine = Arc::new(
        agora_registry::VoteEngine::new(store.clone(), store.clone(), config.params.clone())
            .with_recalc_sink(recalc_queue.clone()),
    );

    // Periodic sweep: re-enqueue every known subject so scores converge
    // even when an event-driven trigger was lost to a transient failure.
    let sweep_queue = recalc_queue.clone();
    let sweep_aggregator = aggregator.clone();
    let sweep_secs = config.sweep_secs;
    let sweep_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(sweep_secs));
        loop {
            ticker.tick().await;
            match sweep_aggregator.known_subjects() {
                Ok(subjects) => {
                    let count = subjects.len();
                    for subject in subjects {
                        sweep_queue.enqueue(subject);
                    }
                    tracing::debug!(subjects = count, "sweep enqueued");
                }
                Err(e) => tracing::warn!(error = %e, "sweep failed, will retry next interval"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received — stopping");

    // The sweep task holds a queue clone; await its cancellation so every
    // producer is gone before waiting for the worker to drain.
    sweep_handle.abort();
    let _ = sweep_handle.await;
    drop(vote_engine);
    drop(recalc_queue);
    let _ = worker_handle.await;

    tracing::info!("agora daemon exited cleanly");
    Ok(())
}
