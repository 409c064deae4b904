//! greenhouse gateway
//!
//! - Opens the configured store and creates its schema before serving
//! - Counter, sensor and pump endpoints plus /healthz, /readyz, /metrics
//! - Graceful shutdown: readiness flips to draining, in-flight requests finish

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use greenhouse_core::error::{GreenhouseError, Result};
use greenhouse_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "greenhouse-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path_from_env();
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|e| GreenhouseError::BadRequest(format!("server.listen: {e}")))?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "greenhouse-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| GreenhouseError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| GreenhouseError::Internal(format!("server failed: {e}")))?;

    tracing::info!("greenhouse-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.set_draining();
}
