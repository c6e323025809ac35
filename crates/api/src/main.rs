//! Student Roster API - Main Entry Point

use api::{init_logging, run_server, LogFormat, ServerConfig};
use std::process::ExitCode;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_logging(Level::INFO, LogFormat::Text)?;
            error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    init_logging(config.log_level(), config.log_format)?;

    info!("=== Student Roster API v{} ===", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(config).await {
        error!("Server startup failed: {:#}", e);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
