//! cerebral API
//!
//! - API listener: `/`, `/error`, `/metrics`
//! - Exporter listener: registry snapshot on any path
//! - Graceful shutdown on Ctrl-C / SIGTERM

use std::process::ExitCode;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cerebral_api::{app_state::AppState, config, router, server};
use cerebral_core::error::{CerebralError, Result};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.client_code().as_str(), "cerebral-api failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_or_default(config::DEFAULT_PATH)?;
    let listen = cfg.api.listen_addr()?;

    let state = AppState::new(cfg)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let exporter = if state.cfg().exporter.enabled {
        let addr = state.cfg().exporter.listen_addr()?;
        let listener = server::bind(addr).await?;
        tracing::info!(%addr, "metrics exporter starting");
        let app = router::build_exporter_router(state.clone());
        Some(tokio::spawn(server::serve(listener, app, shutdown_rx.clone())))
    } else {
        None
    };

    let listener = server::bind(listen).await?;
    tracing::info!(%listen, "cerebral-api starting");

    tokio::spawn(async move {
        server::shutdown_signal().await;
        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server::serve(listener, router::build_router(state), shutdown_rx).await?;

    if let Some(handle) = exporter {
        handle
            .await
            .map_err(|e| CerebralError::Internal(format!("exporter task failed: {e}")))??;
    }

    tracing::info!("cerebral-api stopped");
    Ok(())
}
