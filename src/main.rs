//! quorumbd qemu-nbd middleware daemon.
//!
//! # Startup
//!
//! ```text
//!   QUORUMBD_NBDSERVER_CONFIG ─┐
//!   ~/.config/quorumbd/       ─┤
//!   ~/.quorumbd/              ─┼─▶ resolve ─▶ parse ─▶ defaults ─▶ validate ─▶ ConfigContext
//!   /etc/quorumbd/            ─┘                                                   │
//!                                                                                  ▼
//!                                                                    logging ─▶ daemon ─▶ signal
//! ```
//!
//! Exit codes: 0 ok, 1 runtime failure, 2 configuration error,
//! 3 logging initialization error.

use std::process::ExitCode;

use clap::Parser;
use tracing::Instrument;

use quorumbd_middleware::config::ConfigContext;
use quorumbd_middleware::lifecycle::{check_config, shutdown_signal, startup, Started, StartupError};
use quorumbd_middleware::observability::logging::component;

const CONFIG_FILE_NAME: &str = "middleware-qemu-nbd.toml";
const CONFIG_ENV_VAR: &str = "QUORUMBD_NBDSERVER_CONFIG";

#[derive(Parser)]
#[command(name = "middleware-qemu-nbd", version)]
#[command(about = "quorumbd middleware serving qemu over NBD", long_about = None)]
struct Cli {
    /// Validate the configuration, print the effective settings and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = ConfigContext::new(CONFIG_FILE_NAME, CONFIG_ENV_VAR);

    let result = if cli.check {
        check_config(&ctx).map(|report| print!("{}", report))
    } else {
        run(&ctx).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(ctx: &ConfigContext) -> Result<(), StartupError> {
    let started = startup(ctx)?;
    serve(started).instrument(component("main")).await
}

async fn serve(started: Started<'_>) -> Result<(), StartupError> {
    let config = started.config;
    tracing::info!(
        source = ?started.source.map(|s| s.to_string()),
        state_dir = ?config.common.state_dir,
        socket = ?config.nbdserver.socket,
        core = %config.core.server,
        fallbacks = config.core.server_fallback.len(),
        "quorumbd qemu-nbd-server is about to start ..."
    );

    // The NBD transport and core registration hook in here.

    tracing::info!("quorumbd qemu-nbd-server is completely started");

    let signal = shutdown_signal().await?;
    tracing::info!(signal, "quorumbd qemu-nbd-server stopped because of shutdown signal");

    drop(started.logging);
    Ok(())
}
