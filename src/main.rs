use anyhow::Result;
use std::sync::Arc;

use clawboard::config::DashboardConfig;
use clawboard::core::cache::SystemClock;
use clawboard::core::dashboard::DashboardService;
use clawboard::core::invoker::SystemCli;
use clawboard::core::terminal;
use clawboard::interfaces::web::{AppState, DashboardServer};
use clawboard::logging;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        terminal::print_fatal(&e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = DashboardConfig::from_env();

    terminal::print_banner();
    if let Some(e) = logging::init(&config.log_file, config.log_level)? {
        terminal::print_log_file_fallback(&config.log_file, &e);
    }

    let cli = Arc::new(SystemCli::new(&config.cli_program));
    let dashboard = Arc::new(DashboardService::new(cli, Arc::new(SystemClock)));
    let state = AppState::new(
        dashboard,
        config.static_root.clone(),
        config.log_search_paths.clone(),
    );

    DashboardServer::new(config, state).run().await
}
