//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Metrics first, listener last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::RouterConfig;
use crate::http::server::{BuildError, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start every subsystem and serve until shutdown.
pub async fn run(config: RouterConfig) -> Result<(), StartupError> {
    let obs = &config.observability;
    if obs.metrics_enabled {
        let addr: SocketAddr = obs
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(obs.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(config)?;

    let address = server.config().listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    // Signals are handled by the server; the binary never triggers this.
    let shutdown = Shutdown::new();
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
