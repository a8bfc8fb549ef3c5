//! Dispatch endpoint
//!
//! Served at `/api/analyze`. The body is parsed as JSON whatever the
//! Content-Type says, because browser clients post it as text/plain to avoid
//! a preflight.

use super::ApiError;
use crate::dispatch::DispatchResponse;
use crate::models::AnalysisRequest;
use crate::server::ServerAppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{post, MethodRouter},
    Json,
};

/// POST analyze, OPTIONS answered with 200, anything else 405
pub fn analyze_method_router() -> MethodRouter<ServerAppState> {
    post(analyze_handler)
        .options(preflight_handler)
        .fallback(method_not_allowed_handler)
}

/// Parse a raw body into a request; shared with the legacy endpoint
pub(super) fn parse_request(body: &Bytes) -> Result<AnalysisRequest, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ApiError::bad_request("Request body is empty"));
    }

    let request: AnalysisRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;

    log::debug!(
        "Analyze request: mode={}, {} chars",
        request.mode,
        request.idea_text.chars().count()
    );
    Ok(request)
}

pub async fn analyze_handler(
    State(state): State<ServerAppState>,
    body: Bytes,
) -> Result<Json<DispatchResponse>, ApiError> {
    let request = parse_request(&body)?;
    let response = state.dispatcher.dispatch(request).await?;
    Ok(Json(response))
}

/// CORS headers are added by the CorsLayer; plain OPTIONS just succeeds
async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed_handler() -> ApiError {
    ApiError::method_not_allowed()
}
