//! gameflow-driver: runs the supervisory loop until every configured
//! account is done, shutdown is requested, or too many sessions fail.
//!
//! # Usage
//!
//! ```bash
//! gameflow-driver --config driver.yaml
//! GAMEFLOW_AUTH_TOKEN=... gameflow-driver --config driver.yaml --target-level 10
//! gameflow-driver --config driver.yaml --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;

use gameflow_driver::collaborators::{
    CommandLauncher, ConfiguredAccounts, ConfiguredDialogue, JsonlCompletionStore,
    PhaseWatchGameSession, RandomSource, SessionCollaborators, ThreadRandom, UnavailableUi,
};
use gameflow_driver::{
    DriverConfig, HttpGameFlowService, Pacer, SupervisorDeps, SupervisorExit, SupervisoryLoop,
};

#[derive(Parser)]
#[command(name = "gameflow-driver")]
#[command(version)]
#[command(about = "Drives game-client sessions through their lifecycle phases")]
struct Cli {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(long, short, env = "GAMEFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured target level
    #[arg(long)]
    target_level: Option<u32>,

    /// Override the configured queue id
    #[arg(long)]
    queue_id: Option<i64>,

    /// tracing filter, e.g. "info,gameflow_driver=trace"
    #[arg(long, env = "RUST_LOG")]
    log_filter: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(filter) => tracing_subscriber::EnvFilter::new(filter),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,gameflow_driver=debug".into()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> Result<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::load(path)?,
        None => DriverConfig::default(),
    }
    .apply_env_overrides()?;

    if let Some(level) = cli.target_level {
        config.target_level = level;
    }
    if let Some(queue_id) = cli.queue_id {
        config.queue_id = queue_id;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(config: DriverConfig) -> Result<SupervisorExit> {
    let config = Arc::new(config);
    let service = Arc::new(
        HttpGameFlowService::new(&config.service).context("Failed to build service client")?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down at the next wait");
            let _ = shutdown_tx.send(true);
        }
    });

    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);
    let collaborators = SessionCollaborators {
        game: Arc::new(PhaseWatchGameSession::new(Duration::from_secs(10), 30)),
        ui: Arc::new(UnavailableUi),
        dialogue: Arc::new(ConfiguredDialogue::new(
            config.dialogue.clone(),
            Arc::clone(&random),
        )),
        random,
    };
    let deps = SupervisorDeps {
        launcher: Arc::new(CommandLauncher::new(config.launch.clone())),
        completions: Arc::new(JsonlCompletionStore::new(config.completion_log.clone())),
        accounts: Arc::new(ConfiguredAccounts::new(&config.accounts)),
    };

    tracing::info!(
        base_url = %service.base_url(),
        queue_id = config.queue_id,
        target_level = config.target_level,
        accounts = config.accounts.len(),
        "Starting supervisor"
    );

    let mut supervisor = SupervisoryLoop::new(
        service,
        Arc::clone(&config),
        collaborators,
        deps,
        Pacer::new(shutdown_rx),
    );
    Ok(supervisor.run_forever().await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref());

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    if cli.check {
        tracing::info!("Configuration OK");
        return ExitCode::SUCCESS;
    }

    match run(config).await {
        Ok(SupervisorExit::AccountsExhausted { completed }) => {
            tracing::info!(completed, "All accounts complete");
            ExitCode::SUCCESS
        }
        Ok(SupervisorExit::Stopped { completed }) => {
            tracing::info!(completed, "Stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
