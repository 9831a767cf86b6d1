//! Locale rewrite middleware.
//! Serves unprefixed paths under the default locale without a redirect.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::LocaleConfig;
use crate::routing::{AnyMatcher, LocaleError, LocaleRouter, Matcher};

/// Shared, read-only state for the middleware.
#[derive(Debug)]
pub struct LocaleRewriteState {
    pub router: LocaleRouter,
    pub excluded: AnyMatcher,
}

impl LocaleRewriteState {
    pub fn from_config(config: &LocaleConfig) -> Result<Self, LocaleError> {
        Ok(Self {
            router: LocaleRouter::from_config(config)?,
            excluded: AnyMatcher::path_prefixes(config.excluded_prefixes.iter().cloned()),
        })
    }
}

pub async fn locale_rewrite_middleware(
    State(state): State<Arc<LocaleRewriteState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if state.excluded.matches(&req) {
        return next.run(req).await;
    }

    match state.router.apply(req) {
        Ok(req) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}
