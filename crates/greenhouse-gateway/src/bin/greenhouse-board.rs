//! greenhouse board: polls the gateway for the latest reading and logs it.
//!
//! Runs for `board.max_iterations` polls, or until Ctrl-C when unbounded.

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use greenhouse_core::error::Result;
use greenhouse_gateway::board::{HttpLatestSource, Poller};
use greenhouse_gateway::config;

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "greenhouse-board failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_from_file(&config::config_path_from_env())?;
    let source = HttpLatestSource::new(&cfg.board)?;
    tracing::info!(
        url = source.url(),
        interval_ms = cfg.board.interval_ms,
        max_iterations = ?cfg.board.max_iterations,
        "greenhouse-board starting"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let report = Poller::from_config(source, &cfg.board).run(stop_rx).await;
    if report.iterations > 0 && report.errors == report.iterations {
        tracing::warn!(errors = report.errors, "every poll failed; is the gateway running?");
    }
    Ok(())
}
