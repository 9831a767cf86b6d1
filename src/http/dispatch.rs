//! Internal re-dispatch of template fallbacks.
//!
//! # Responsibilities
//! - Buffer the request body once so it can be replayed
//! - Send the request through the locale-rewritten app
//! - When the app answers with a [`TemplateFallback`], dispatch again to the
//!   template path with the headers the app saw (rewrite count included)
//!
//! # Design Decisions
//! - The rewrite count travels in those carried headers, so the locale router
//!   terminates the cycle on its own
//! - Hops are still capped at `max_rewrites + 1` so a fallback to a
//!   locale-prefixed template cannot spin

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use crate::http::request::request_id;
use crate::http::response::error_response;
use crate::observability::metrics;

/// Response extension asking the dispatcher to retry at a route template.
///
/// Emitted when a server action is invoked from a route it is not bound to.
/// `path` is the action's uninstantiated template (e.g. `/[locale]`).
#[derive(Debug, Clone)]
pub struct TemplateFallback {
    pub path: String,
    pub headers: HeaderMap,
}

impl TemplateFallback {
    fn into_request(self, method: Method, body: Bytes) -> Option<Request<Body>> {
        let mut req = Request::builder()
            .method(method)
            .uri(self.path.as_str())
            .body(Body::from(body))
            .ok()?;
        *req.headers_mut() = self.headers;
        Some(req)
    }
}

pub struct Dispatcher {
    app: Router,
    max_body_bytes: usize,
    max_hops: u32,
}

impl Dispatcher {
    /// `app` must already have the locale rewrite applied.
    pub fn new(app: Router, max_body_bytes: usize, max_rewrites: u32) -> Self {
        Self {
            app,
            max_body_bytes,
            max_hops: max_rewrites.saturating_add(1),
        }
    }

    async fn send(&self, req: Request<Body>) -> Response {
        match self.app.clone().oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

pub async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();

    let body = match axum::body::to_bytes(body, dispatcher.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to buffer request body");
            metrics::record_request(method.as_str(), 413, start);
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "request body exceeds the configured limit",
            );
        }
    };

    let mut req = Request::from_parts(parts, Body::from(body.clone()));
    let mut hops = 0u32;

    loop {
        let mut response = dispatcher.send(req).await;

        let Some(fallback) = response.extensions_mut().remove::<TemplateFallback>() else {
            metrics::record_request(method.as_str(), response.status().as_u16(), start);
            return response;
        };

        hops += 1;
        if hops > dispatcher.max_hops {
            tracing::error!(request_id = %request_id, hops, path = %fallback.path, "Dispatch loop did not terminate");
            metrics::record_request(method.as_str(), 500, start);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "dispatch_loop",
                format!("gave up after {} template fallbacks", dispatcher.max_hops),
            );
        }

        tracing::debug!(
            request_id = %request_id,
            hop = hops,
            template = %fallback.path,
            "Action not bound to route, falling back to template"
        );
        metrics::record_template_fallback();

        let template = fallback.path.clone();
        req = match fallback.into_request(method.clone(), body.clone()) {
            Some(req) => req,
            None => {
                metrics::record_request(method.as_str(), 500, start);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "invalid_template",
                    format!("template path '{}' is not a valid URI", template),
                );
            }
        };
    }
}

