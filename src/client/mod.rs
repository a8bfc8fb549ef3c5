//! Client for a running VEXT dispatcher
//!
//! Used by the `analyze`, `refine` and `chat` CLI commands. Error bodies are
//! turned into readable messages; vendor details never reach the user.

pub mod preview;

use crate::dispatch::DispatchResponse;
use crate::models::{AnalysisRequest, PriorContext};
use crate::server::ErrorBody;
use anyhow::{anyhow, Result};
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8888";

/// Longer than the dispatcher's own deadline so its degraded answer arrives first
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

pub struct DispatcherClient {
    http: reqwest::Client,
    base_url: String,
}

impl DispatcherClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn analyze_url(&self) -> String {
        format!("{}/api/analyze", self.base_url)
    }

    pub async fn analyze(&self, idea: &str) -> Result<DispatchResponse> {
        self.send(&AnalysisRequest::create(idea)).await
    }

    pub async fn refine(
        &self,
        instruction: &str,
        prior_html: &str,
        prior_context: Option<PriorContext>,
    ) -> Result<DispatchResponse> {
        self.send(&AnalysisRequest::refine(instruction, prior_html, prior_context))
            .await
    }

    pub async fn chat(&self, message: &str) -> Result<DispatchResponse> {
        self.send(&AnalysisRequest::chat(message)).await
    }

    async fn send(&self, request: &AnalysisRequest) -> Result<DispatchResponse> {
        let url = self.analyze_url();
        log::debug!("POST {} (mode={})", url, request.mode);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    anyhow!(
                        "Could not reach the VEXT server at {}. Is `vext serve` running?",
                        self.base_url
                    )
                } else if e.is_timeout() {
                    anyhow!("The VEXT server did not answer in time")
                } else {
                    anyhow!("Request failed: {}", e)
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response: {}", e))?;

        if !status.is_success() {
            return Err(anyhow!(describe_error(status.as_u16(), &body)));
        }

        serde_json::from_str(&body).map_err(|e| anyhow!("Unexpected response from server: {}", e))
    }
}

/// Readable message for a non-2xx dispatcher response
pub fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => match status {
            400 => format!("Invalid request: {}", err.message),
            500 => format!("Server is misconfigured: {}", err.message),
            502 => format!("The model provider refused the request: {}", err.message),
            _ => format!("Server error ({}): {}", status, err.message),
        },
        Err(_) => {
            log::debug!(
                "Non-JSON error body (HTTP {}): {}",
                status,
                body_excerpt(body)
            );
            format!("Server error ({})", status)
        }
    }
}

const BODY_EXCERPT_CHARS: usize = 200;

/// Bounded single-line excerpt of a response body for debug logs
fn body_excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    crate::utils::truncate_chars(&flat, BODY_EXCERPT_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_url_trims_slash() {
        let client = DispatcherClient::new("http://localhost:8888/").unwrap();
        assert_eq!(client.analyze_url(), "http://localhost:8888/api/analyze");
    }

    #[test]
    fn test_describe_error() {
        let body = r#"{"error":"configuration_error","message":"API key for gemini is not configured (set GEMINI_API_KEY)"}"#;
        assert_eq!(
            describe_error(500, body),
            "Server is misconfigured: API key for gemini is not configured (set GEMINI_API_KEY)"
        );
        assert_eq!(
            describe_error(400, r#"{"error":"invalid_request","message":"idea_text is required"}"#),
            "Invalid request: idea_text is required"
        );
        assert_eq!(describe_error(504, "<html>Gateway Timeout</html>"), "Server error (504)");
    }

    #[test]
    fn test_body_excerpt_is_bounded_and_flat() {
        let page = format!("<html>\n  <body>Gateway Timeout</body>\n{}</html>", "x".repeat(500));
        let excerpt = body_excerpt(&page);
        assert!(excerpt.starts_with("<html> <body>Gateway Timeout</body>"));
        assert!(!excerpt.contains('\n'));
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_CHARS + 3);
        assert_eq!(body_excerpt("  short  "), "short");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_readable() {
        let client = DispatcherClient::new("http://127.0.0.1:1").unwrap();
        let err = client.chat("hello there").await.unwrap_err();
        assert!(err.to_string().contains("127.0.0.1:1"));
    }
}
