//! Error responses.
//!
//! Every error the service produces is a JSON body of the form
//! `{ "error": "<code>", "message": "<detail>" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routing::RewriteError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: code.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for RewriteError {
    fn into_response(self) -> Response {
        let code = match self {
            RewriteError::LimitExceeded { .. } => "rewrite_limit_exceeded",
            RewriteError::InvalidPath(_) => "invalid_rewrite_path",
        };
        // Fatal to the request; retrying would replay the same cycle.
        error_response(StatusCode::INTERNAL_SERVER_ERROR, code, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_exceeded_is_internal_error() {
        let err = RewriteError::LimitExceeded {
            path: "/[locale]".into(),
            count: 10,
            max: 10,
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "rewrite_limit_exceeded");
        assert!(body.message.contains("/[locale]"));
    }
}
