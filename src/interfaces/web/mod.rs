pub mod context;
pub mod error;
mod handlers;
mod router;
mod static_files;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub use context::{REQUEST_ID_HEADER, RequestContext};
pub use router::build_router;

use crate::config::DashboardConfig;
use crate::core::dashboard::DashboardService;
use crate::core::terminal;

#[derive(Clone)]
pub struct AppState {
    pub(crate) dashboard: Arc<DashboardService>,
    pub(crate) static_root: PathBuf,
    pub(crate) log_search_paths: Arc<Vec<PathBuf>>,
    pub(crate) started_at: Instant,
}

impl AppState {
    pub fn new(
        dashboard: Arc<DashboardService>,
        static_root: PathBuf,
        log_search_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            dashboard,
            static_root,
            log_search_paths: Arc::new(log_search_paths),
            started_at: Instant::now(),
        }
    }
}

pub struct DashboardServer {
    config: DashboardConfig,
    state: AppState,
}

impl DashboardServer {
    pub fn new(config: DashboardConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Binds and serves until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(addr = %addr, cli = %self.config.cli_program, "dashboard API listening");
        terminal::print_startup(&self.config);
        if self.config.is_network_exposed() {
            warn!(host = %self.config.host, "dashboard API is exposed to the network");
        }

        let app = build_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("dashboard API server failed")?;

        info!("dashboard API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
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
                warn!(error = %e, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}
