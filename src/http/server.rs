//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wrap the page app in the locale rewrite so it runs before routing
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{self, actions::ActionRegistry, AppState};
use crate::config::RouterConfig;
use crate::http::dispatch::{dispatch_handler, Dispatcher};
use crate::http::middleware::{locale_rewrite_middleware, LocaleRewriteState};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::signals::shutdown_signal;
use crate::routing::{LocaleError, LocaleSet};

/// Failure to assemble the server from a configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("locale configuration: {0}")]
    Locale(#[from] LocaleError),

    #[error("invalid action header name '{0}'")]
    ActionHeader(String),
}

/// HTTP server for the locale router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    locales: LocaleSet,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and the
    /// default server actions.
    pub fn new(config: RouterConfig) -> Result<Self, BuildError> {
        Self::with_actions(config, ActionRegistry::with_defaults())
    }

    /// Create a new HTTP server that serves `actions`.
    pub fn with_actions(config: RouterConfig, actions: ActionRegistry) -> Result<Self, BuildError> {
        let rewrite_state = Arc::new(LocaleRewriteState::from_config(&config.locales)?);
        let action_header = HeaderName::try_from(config.actions.header.as_str())
            .map_err(|_| BuildError::ActionHeader(config.actions.header.clone()))?;

        let pages = app::router(Arc::new(AppState {
            actions,
            action_header,
            locales: rewrite_state.router.locales().clone(),
        }));

        // Layering the page router as a service (not via Router::layer) makes
        // the rewritten URI visible to route matching.
        let rewritten = axum::middleware::from_fn_with_state(
            rewrite_state.clone(),
            locale_rewrite_middleware,
        )
        .layer(pages);
        let app = Router::new().fallback_service(rewritten);

        let dispatcher = Arc::new(Dispatcher::new(
            app,
            config.limits.max_body_bytes,
            rewrite_state.router.max_rewrites(),
        ));

        let locales = rewrite_state.router.locales().clone();
        let router = Self::build_router(&config, dispatcher);
        Ok(Self {
            router,
            config,
            locales,
        })
    }

    /// Build the outer router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, dispatcher: Arc<Dispatcher>) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(
                        TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %req.method(),
                                path = %req.uri().path(),
                                request_id = %request_id(req),
                            )
                        }),
                    )
                    .layer(PropagateRequestIdLayer::x_request_id())
                    // Timeout requires a `Default` response body; the limit stays outside it.
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The assembled router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            locales = ?self.locales.tags(),
            default_locale = %self.locales.default_locale(),
            max_rewrites = self.config.locales.max_rewrites,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}
