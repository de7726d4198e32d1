//! Serving-cell probe agent
//!
//! Host runtime for the probe.
//!
//! - One-shot (default): probe once, print the JSON reply, exit 0 on success
//!   and 1 on failure
//! - `--serve`: HTTP portal answering `GET /api/cell`, one probe per request
//! - Backends: scripted scenario (simulated modem when no file is given) or
//!   ModemManager via `mmcli`

mod backend;
mod config;
mod portal;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::{AgentConfigInput, BackendKind};

/// Serving LTE cell probe.
#[derive(Parser, Debug)]
#[command(name = "cellprobe-agent", about = "Report the serving LTE cell")]
struct Cli {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Telephony backend (overrides the config file).
    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Scenario file for the scenario backend.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// ModemManager modem index or path for the mmcli backend.
    #[arg(long)]
    modem: Option<String>,

    /// Granted permission, repeatable (e.g. `--grant fine_location`).
    #[arg(long = "grant")]
    grants: Vec<String>,

    /// Serve the HTTP portal instead of probing once.
    #[arg(long, default_value_t = false)]
    serve: bool,

    /// Portal listen address.
    #[arg(long)]
    portal_addr: Option<String>,
}

/// Shared agent state accessible from all requests.
pub struct AgentState {
    pub backend: &'static str,
    pub probe: backend::AgentProbe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut input = match &cli.config {
        Some(path) => AgentConfigInput::load(path)?,
        None => AgentConfigInput::default(),
    };
    if cli.backend.is_some() {
        input.backend = cli.backend;
    }
    if cli.scenario.is_some() {
        input.scenario.path = cli.scenario.clone();
    }
    if cli.modem.is_some() {
        input.mmcli.modem = cli.modem.clone();
    }
    if !cli.grants.is_empty() {
        input.permissions.granted = Some(cli.grants.clone());
    }
    if cli.portal_addr.is_some() {
        input.portal.addr = cli.portal_addr.clone();
    }
    let cfg = input.resolve()?;

    let backend_name = match cfg.backend {
        config::BackendConfig::Scenario { .. } => "scenario",
        config::BackendConfig::Mmcli { .. } => "mmcli",
    };
    tracing::info!(
        backend = backend_name,
        serve = cli.serve,
        "cellprobe-agent starting"
    );

    let state = Arc::new(AgentState {
        backend: backend_name,
        probe: backend::build_probe(&cfg)?,
    });

    if !cli.serve {
        let reply = portal::probe_once(state).await;
        println!("{}", reply.to_json()?);
        if !reply.outcome.is_success() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let portal_handle = tokio::spawn(portal::run(state, cfg.portal_addr, shutdown_rx));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, shutting down");
            let _ = shutdown_tx.send(true);
        }
        result = portal_handle => {
            match result {
                Ok(Err(e)) => tracing::error!("portal failed: {e}"),
                Err(e) => tracing::error!("portal task failed: {e}"),
                Ok(Ok(())) => {}
            }
        }
    }

    tracing::info!("cellprobe-agent stopped");
    Ok(())
}
