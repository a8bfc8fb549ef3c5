//! Request dispatcher
//!
//! Validates an [`AnalysisRequest`], builds the prompt for its mode, runs the
//! model fallback [`sequencer::Sequencer`] and maps the outcome onto the wire
//! response. Exhausting every candidate is not an error: the caller gets a
//! fixed degraded placeholder instead.

pub mod normalizer;
pub mod sequencer;

pub use normalizer::{normalize, NormalizeContext, NormalizedResponse};
pub use sequencer::{AttemptOutcome, AttemptRecord, SequenceError, SequenceSuccess, Sequencer};

use crate::config::{DispatchConfig, Vendor};
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::providers::{GenerationClient, GenerationRequest, ProviderError};
use crate::templates::{build_prompt, ResponseFormat};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const DEGRADED_MESSAGE: &str =
    "All model candidates are unavailable right now. Showing a placeholder result; please try again shortly.";

/// Wire response of a dispatch, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchResponse {
    Structured {
        result: AnalysisResult,
        model: String,
        attempts: Vec<AttemptRecord>,
    },
    Conversational {
        reply: String,
        model: String,
        attempts: Vec<AttemptRecord>,
    },
    Degraded {
        result: AnalysisResult,
        message: String,
        attempts: Vec<AttemptRecord>,
    },
}

impl DispatchResponse {
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            DispatchResponse::Structured { attempts, .. }
            | DispatchResponse::Conversational { attempts, .. }
            | DispatchResponse::Degraded { attempts, .. } => attempts,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DispatchResponse::Structured { .. } => "structured",
            DispatchResponse::Conversational { .. } => "conversational",
            DispatchResponse::Degraded { .. } => "degraded",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("{0}")]
    InvalidRequest(String),

    /// Server-side setup problem, such as a missing API key
    #[error("{0}")]
    Configuration(String),

    /// The vendor rejected our credentials
    #[error("{message}")]
    Upstream {
        message: String,
        attempts: Vec<AttemptRecord>,
    },
}

impl DispatchError {
    /// Stable machine-readable error identifier for the wire body
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::InvalidRequest(_) => "invalid_request",
            DispatchError::Configuration(_) => "configuration_error",
            DispatchError::Upstream { .. } => "upstream_rejected",
        }
    }

    /// Map a sequence-stopping provider failure onto a readable error.
    /// Vendor payloads stay in the log; attempts carry only error codes.
    fn from_fatal(error: ProviderError, attempts: Vec<AttemptRecord>) -> Self {
        match error {
            ProviderError::MissingApiKey { .. } => DispatchError::Configuration(error.to_string()),
            ProviderError::Unauthorized { vendor, status, .. } => DispatchError::Upstream {
                message: format!(
                    "The {} API rejected the configured API key (HTTP {}).",
                    vendor, status
                ),
                attempts,
            },
            other => DispatchError::Upstream {
                message: format!("The model provider failed ({}).", other.code()),
                attempts,
            },
        }
    }
}

/// Shared, immutable request dispatcher
pub struct Dispatcher {
    client: Arc<dyn GenerationClient>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn GenerationClient>, config: DispatchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn vendor(&self) -> Vendor {
        self.client.vendor()
    }

    pub fn has_credentials(&self) -> bool {
        self.client.check_credentials().is_ok()
    }

    pub async fn dispatch(
        &self,
        request: AnalysisRequest,
    ) -> Result<DispatchResponse, DispatchError> {
        request.validate().map_err(DispatchError::InvalidRequest)?;

        let prompt = build_prompt(&request);
        let max_output_tokens = match prompt.format {
            ResponseFormat::Json => self.config.max_output_tokens,
            ResponseFormat::PlainText => self.config.chat_max_output_tokens,
        };
        log::debug!(
            "Dispatching {} request ({} prompt chars, {} token ceiling)",
            prompt.mode,
            prompt.text.chars().count(),
            max_output_tokens
        );

        let generation = GenerationRequest {
            prompt: prompt.text,
            format: prompt.format,
            temperature: self.config.temperature,
            max_output_tokens,
        };
        let ctx = NormalizeContext {
            idea_text: request.idea_text.clone(),
            prior_context: request.prior_context.clone(),
            prior_html: request.prior_html.clone(),
            short_reply_chars: self.config.short_reply_chars,
        };

        let sequencer = Sequencer::new(
            self.client.clone(),
            self.config.effective_candidates(),
            self.config.attempt_timeout(),
            self.config.deadline(),
        );

        let outcome = sequencer
            .run(&generation, |raw| normalize(raw, prompt.format, &ctx))
            .await;

        match outcome {
            Ok(SequenceSuccess {
                response,
                candidate,
                attempts,
            }) => {
                log::info!(
                    "{} request answered by {} in {} attempt(s)",
                    request.mode,
                    candidate,
                    attempts.len()
                );
                Ok(match response {
                    NormalizedResponse::Structured(result) => DispatchResponse::Structured {
                        result,
                        model: candidate.model,
                        attempts,
                    },
                    NormalizedResponse::Conversational(reply) => {
                        DispatchResponse::Conversational {
                            reply,
                            model: candidate.model,
                            attempts,
                        }
                    }
                    // The sequencer never returns a failed interpretation as success
                    NormalizedResponse::Failed(reason) => {
                        log::warn!("Unusable reply accepted as success: {}", reason);
                        DispatchResponse::Degraded {
                            result: AnalysisResult::degraded_placeholder(),
                            message: DEGRADED_MESSAGE.to_string(),
                            attempts,
                        }
                    }
                })
            }
            Err(SequenceError::Exhausted {
                last_error,
                attempts,
            }) => {
                log::warn!(
                    "{} request degraded after {} attempt(s); last error: {}",
                    request.mode,
                    attempts.len(),
                    last_error.as_deref().unwrap_or("none")
                );
                Ok(DispatchResponse::Degraded {
                    result: AnalysisResult::degraded_placeholder(),
                    message: DEGRADED_MESSAGE.to_string(),
                    attempts,
                })
            }
            Err(SequenceError::Fatal { error, attempts }) => {
                log::error!("{} request failed: {}", request.mode, error);
                Err(DispatchError::from_fatal(error, attempts))
            }
        }
    }
}
