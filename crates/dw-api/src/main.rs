//! Daily Wallet API server binary.

use anyhow::Context;
use clap::Parser;
use dw_api::{ApiServer, Args, LogFormat};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = args.into_config().context("invalid configuration")?;
    let bind_addr = config.bind_addr;
    let server = ApiServer::new(config).context("invalid server configuration")?;

    info!("Starting Daily Wallet API on {}", bind_addr);

    server
        .serve_with_shutdown(bind_addr, shutdown_signal())
        .await
        .context("API server failed")?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
