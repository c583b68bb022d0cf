use std::sync::Arc;

use anyhow::{Context, Result};
use lender_config::ServerConfig;
use lender_core::{RiskScorer, ScoringModel};
use lender_model::load_model;
use lender_server::{app, AppState};
use lender_store::ApplicantStore;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env().context("failed to read configuration")?;

    let store = ApplicantStore::open(
        &config.database_path,
        &config.applicant_table,
        &config.applicant_id_column,
    )
    .context("failed to open applicant store")?;

    if let Some(seed) = &config.database_seed {
        store
            .seed_from_file(seed)
            .with_context(|| format!("failed to seed store from {}", seed.display()))?;
    }

    let state = Arc::new(AppState::new(Arc::new(store), init_scorer(&config)));

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// A missing or invalid model leaves lookups working; `/predict` then reports the failure.
fn init_scorer(config: &ServerConfig) -> Option<RiskScorer> {
    let model: Arc<dyn ScoringModel> = match load_model(&config.model_path) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            error!("Error loading model from {}: {}", config.model_path.display(), e);
            return None;
        }
    };

    match RiskScorer::new(model) {
        Ok(scorer) => Some(scorer),
        Err(e) => {
            error!("Model rejected: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
