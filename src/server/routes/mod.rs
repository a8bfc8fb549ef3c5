//! HTTP route handlers
//!
//! - analyze_routes: the dispatch endpoint and its CORS/method handling
//! - config_routes: read-only vendor and version information
//! - legacy_routes: the original client's endpoint and response shape

pub mod analyze_routes;
pub mod config_routes;
pub mod legacy_routes;

use crate::dispatch::DispatchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error body returned for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Error type for route handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "invalid_request",
            message: message.into(),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            error: "method_not_allowed",
            message: "Use POST with a JSON body".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status = match err {
            DispatchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DispatchError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            error: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_status_mapping() {
        let cases = [
            (
                DispatchError::InvalidRequest("idea_text is required".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DispatchError::Configuration("API key missing".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DispatchError::Upstream {
                    message: "rejected".to_string(),
                    attempts: Vec::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
