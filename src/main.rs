//! Locale router (v1)
//!
//! Serves a locale-prefixed page tree. Paths without a recognized locale
//! segment are rewritten internally to the default locale; the rewrite count
//! rides on the request so a re-dispatch cycle ends at a configured maximum.
//!
//! ```text
//!     Client Request
//!     ──▶ request id ─▶ trace ─▶ timeout ─▶ body limit
//!                                              │
//!                                              ▼
//!                                        ┌───────────┐  template fallback
//!                                        │ dispatch  │◀─────────────────┐
//!                                        └─────┬─────┘                  │
//!                                              ▼                        │
//!                                     ┌────────────────┐         ┌──────┴─────┐
//!                                     │ locale rewrite │────────▶│ pages and  │
//!                                     │  (loop guard)  │         │  actions   │
//!                                     └────────────────┘         └────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use locale_router::config::{load_config, LogFormat, RouterConfig};
use locale_router::lifecycle::startup;
use locale_router::observability::logging;

#[derive(Parser)]
#[command(name = "locale-router", version)]
#[command(about = "Locale-prefix router with a bounded rewrite loop", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Override observability.log_format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind.to_string();
    }
    if let Some(format) = cli.log_format {
        config.observability.log_format = format;
    }

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        "locale-router starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
