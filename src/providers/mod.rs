//! Text-generation vendor clients
//!
//! The [`GenerationClient`] trait is the seam between the fallback sequencer
//! and the network. [`HttpGenerationClient`] talks to the real vendor APIs;
//! tests substitute scripted fakes.

pub mod anthropic;
pub mod classify;
pub mod gemini;
pub mod http;
pub mod openai;

pub use http::HttpGenerationClient;

use crate::config::{Candidate, Vendor};
use crate::templates::ResponseFormat;
use async_trait::async_trait;
use thiserror::Error;

/// One network call's worth of generation parameters
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: ResponseFormat,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Failure of a single generation attempt
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("API key for {vendor} is not configured (set {env_var})")]
    MissingApiKey { vendor: Vendor, env_var: String },

    #[error("{vendor} rejected the API key (HTTP {status}): {message}")]
    Unauthorized {
        vendor: Vendor,
        status: u16,
        message: String,
    },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("attempt timed out after {0} ms")]
    Timeout(u64),

    #[error("overall deadline exceeded")]
    DeadlineExceeded,

    #[error("response blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("model returned empty text")]
    EmptyResponse,

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Fatal errors stop the fallback sequence; everything else advances to the next candidate
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ProviderError::MissingApiKey { .. } | ProviderError::Unauthorized { .. }
        )
    }

    /// Stable classification safe to put on the wire; never carries vendor text
    pub fn code(&self) -> String {
        match self {
            ProviderError::MissingApiKey { .. } => "missing_api_key".to_string(),
            ProviderError::Unauthorized { .. } => "unauthorized".to_string(),
            ProviderError::Http { status, .. } => format!("http_{}", status),
            ProviderError::Transport(_) => "transport_error".to_string(),
            ProviderError::Timeout(_) => "timeout".to_string(),
            ProviderError::DeadlineExceeded => "deadline_exceeded".to_string(),
            ProviderError::SafetyBlocked(_) => "safety_blocked".to_string(),
            ProviderError::EmptyResponse => "empty_response".to_string(),
            ProviderError::MalformedResponse(_) => "malformed_response".to_string(),
        }
    }
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Verify credentials are present without touching the network
    fn check_credentials(&self) -> Result<(), ProviderError>;

    /// Perform exactly one generation call against one candidate
    async fn generate(
        &self,
        candidate: &Candidate,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError>;
}
