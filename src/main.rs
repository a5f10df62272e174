//! Ecologie API Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (see `config::generate_default_config`) with
//! environment variable overrides:
//! - `ECOLOGIE_API_HOST` / `ECOLOGIE_API_PORT`: bind address
//! - `ECOLOGIE_TABULAR_URL` / `ECOLOGIE_INDICATEURS_URL`: upstream bases
//! - `ECOLOGIE_TOKEN`: fallback bearer token for the indicator hub
//! - `ECOLOGIE_MATCH_POLICY`: commune matching, "exact" or "substring"
//! - `ECOLOGIE_INDICATOR_SET`: "full" or "core"
//! - `RUST_LOG`: tracing filter (default: info)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecologie_api::api::{serve, AppState};
use ecologie_api::config::Config;

#[derive(Parser, Debug)]
#[command(name = "ecologie-api", version, about = "HTTP proxy for French ecological open data")]
struct Args {
    /// Path to a TOML config file (default locations are tried otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {path:?}"))?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config);

    tracing::info!(
        "Starting Ecologie API server v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Tabular upstream: {}", config.upstream.tabular_base_url);
    tracing::info!(
        "Indicateurs upstream: {}",
        config.upstream.indicateurs_base_url
    );
    tracing::info!(
        "Indicator set: {:?}, match policy: {:?}",
        config.indicators.set,
        config.indicators.match_policy
    );
    if config.upstream.token.is_none() {
        tracing::warn!(
            "No bearer token configured; /indicateurs routes require ?token= per request"
        );
    }

    let state = AppState::from_config(&config);
    serve(state, &config.api).await?;

    tracing::info!("Ecologie API server stopped");
    Ok(())
}

/// Initialize the tracing subscriber from the logging config.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "ecologie_api={},tower_http=debug",
            config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
