//! Page tree and server actions served behind the locale router.
//!
//! # Routes
//! ```text
//! GET  /api/health            → "ok" (excluded from locale rewriting)
//! GET  /<locale>[/]           → home page descriptor
//! GET  /<locale>/about        → about page descriptor
//! POST <page> + action header → run the action, or fall back to its template
//! ```

pub mod actions;
pub mod pages;

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::http::response::error_response;
use crate::routing::LocaleSet;
use actions::{ActionOutcome, ActionRegistry};
use pages::{PageMatch, PageView};

pub struct AppState {
    pub actions: ActionRegistry,
    pub action_header: HeaderName,
    pub locales: LocaleSet,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .fallback(page_handler)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn page_handler(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let path = req.uri().path();
    // The page tree only exists under recognized locales.
    let matched = PageMatch::resolve(path).filter(|m| state.locales.contains(m.locale));

    if req.method() == Method::POST {
        if let Some(value) = req.headers().get(&state.action_header) {
            let Ok(action_id) = value.to_str() else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "invalid_action_id",
                    "action id is not valid ASCII",
                );
            };
            let locale = state.locales.locale_or_default(path);
            let template = matched.as_ref().map(|m| m.page.template());

            return match state
                .actions
                .resolve(action_id, path, template, locale, req.headers())
            {
                ActionOutcome::NotFound => error_response(
                    StatusCode::NOT_FOUND,
                    "action_not_found",
                    format!("no server action with id '{}'", action_id),
                ),
                ActionOutcome::Ran(output) => {
                    tracing::info!(action = %output.action, path = %path, "Server action invoked");
                    Json(output).into_response()
                }
                ActionOutcome::Fallback(fallback) => {
                    tracing::warn!(
                        action_id = %action_id,
                        path = %path,
                        template = %fallback.path,
                        "Server action not bound to this route"
                    );
                    let mut response = error_response(
                        StatusCode::NOT_FOUND,
                        "action_not_bound",
                        format!("action '{}' is not bound to '{}'", action_id, path),
                    );
                    response.extensions_mut().insert(fallback);
                    response
                }
            };
        }
    }

    match matched {
        Some(m) => Json(PageView::new(&m, state.locales.default_locale())).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "page_not_found",
            format!("no page at '{}'", path),
        ),
    }
}
