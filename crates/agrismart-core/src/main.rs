//! AgriSmart Server - Entry Point
//!
//! This binary starts the AgriSmart HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agrismart_core::{config::Config, server};

/// AgriSmart Brasil API server
#[derive(Parser, Debug)]
#[command(name = "agrismart-server", author, version, about = "AgriSmart Brasil farm-management API")]
struct Args {
    /// Configuration file (defaults to ./agrismart.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration
    #[arg(short, long)]
    address: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrismart_core=debug,info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    if let Err(e) = server::run(&config).await {
        error!(error = %e, "Server error");
        return Err(e).context("AgriSmart server stopped");
    }
    Ok(())
}
