//! Legacy serverless endpoint
//!
//! The original browser client posts `{ hypothesis }` to
//! `/.netlify/functions/analyze` and reads the vendor contract directly:
//! `analysis.grade_letter`, `landing_page.tailwind_html`, `viral_kit.hooks`.
//! Responses here keep that shape; errors carry the readable message in
//! `error` because that is the field the client displays.

use super::ApiError;
use crate::dispatch::DispatchResponse;
use crate::models::{AnalysisRequest, AnalysisResult, PsychologyTrigger};
use crate::server::ServerAppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, MethodRouter},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyAnalysis {
    pub grade: u8,
    pub grade_letter: String,
    pub target_audience: String,
    pub psychology: Vec<PsychologyTrigger>,
    pub strategy_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyLandingPage {
    pub headline: String,
    pub subheadline: String,
    pub tailwind_html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyScript {
    pub platform: String,
    pub duration: String,
    pub script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyViralKit {
    pub hooks: Vec<String>,
    pub scripts: Vec<LegacyScript>,
}

/// Body shape the original client expects on success
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyResponse {
    pub analysis: LegacyAnalysis,
    pub landing_page: LegacyLandingPage,
    pub viral_kit: LegacyViralKit,
    /// Set on the degraded placeholder and on conversational replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LegacyResponse {
    pub fn from_result(result: &AnalysisResult, message: Option<String>) -> Self {
        Self {
            analysis: LegacyAnalysis {
                grade: result.grade,
                grade_letter: result.grade_letter.to_string(),
                target_audience: result.target_audience.clone(),
                psychology: result.psychology_triggers.clone(),
                strategy_summary: result.strategy_summary.clone(),
            },
            landing_page: LegacyLandingPage {
                headline: result.landing_page.headline.clone(),
                subheadline: result.landing_page.subheadline.clone(),
                tailwind_html: result.landing_page.html_document.clone(),
            },
            viral_kit: LegacyViralKit {
                hooks: result.viral_kit.hooks.clone(),
                scripts: result
                    .viral_kit
                    .scripts
                    .iter()
                    .map(|s| LegacyScript {
                        platform: s.platform.clone(),
                        duration: s.duration.clone(),
                        script: s.script_text.clone(),
                    })
                    .collect(),
            },
            message,
        }
    }
}

impl From<DispatchResponse> for LegacyResponse {
    fn from(response: DispatchResponse) -> Self {
        match response {
            DispatchResponse::Structured { result, .. } => Self::from_result(&result, None),
            DispatchResponse::Degraded {
                result, message, ..
            } => Self::from_result(&result, Some(message)),
            // The old client has no chat view; the reply rides along as the
            // strategy text of the placeholder so it is still shown.
            DispatchResponse::Conversational { reply, .. } => {
                let mut result = AnalysisResult::degraded_placeholder();
                result.strategy_summary = reply.clone();
                result.landing_page.headline = String::new();
                result.landing_page.subheadline = String::new();
                Self::from_result(&result, Some(reply))
            }
        }
    }
}

/// `{ error: <readable message>, code: <stable id> }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyErrorBody {
    pub error: String,
    pub code: String,
}

pub struct LegacyError(ApiError);

impl From<ApiError> for LegacyError {
    fn from(err: ApiError) -> Self {
        LegacyError(err)
    }
}

impl From<crate::dispatch::DispatchError> for LegacyError {
    fn from(err: crate::dispatch::DispatchError) -> Self {
        LegacyError(err.into())
    }
}

impl IntoResponse for LegacyError {
    fn into_response(self) -> Response {
        let body = LegacyErrorBody {
            error: self.0.message,
            code: self.0.error.to_string(),
        };
        (self.0.status, Json(body)).into_response()
    }
}

/// POST analyze in the legacy shape, OPTIONS 200, anything else 405
pub fn legacy_method_router() -> MethodRouter<ServerAppState> {
    post(legacy_analyze_handler)
        .options(|| async { StatusCode::OK })
        .fallback(|| async { LegacyError(ApiError::method_not_allowed()) })
}

pub async fn legacy_analyze_handler(
    State(state): State<ServerAppState>,
    body: Bytes,
) -> Result<Json<LegacyResponse>, LegacyError> {
    let request: AnalysisRequest = super::analyze_routes::parse_request(&body)?;
    let response = state.dispatcher.dispatch(request).await?;
    Ok(Json(response.into()))
}
