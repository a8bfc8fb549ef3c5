// Model fallback sequencer
//
// Delivers one prompt to an ordered list of candidates, one network call at a
// time, and stops at the first usable reply or the first fatal failure.

use super::normalizer::NormalizedResponse;
use crate::config::Candidate;
use crate::providers::{GenerationClient, GenerationRequest, ProviderError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Retryable,
    Fatal,
}

/// Reply text that parsed to nothing usable
pub const UNUSABLE_REPLY: &str = "unusable_reply";

/// One network call made during a sequence.
///
/// `error` is a stable code (`http_503`, `timeout`, ...); the full diagnostic
/// only goes to the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    pub api_version: String,
    pub model: String,
    pub outcome: AttemptOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl AttemptRecord {
    fn new(
        candidate: &Candidate,
        outcome: AttemptOutcome,
        error: Option<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            api_version: candidate.api_version.clone(),
            model: candidate.model.clone(),
            outcome,
            error,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SequenceSuccess {
    pub response: NormalizedResponse,
    pub candidate: Candidate,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, Error)]
pub enum SequenceError {
    /// Credential problem: retrying another model would fail the same way
    #[error("{error}")]
    Fatal {
        error: ProviderError,
        attempts: Vec<AttemptRecord>,
    },

    #[error(
        "all model candidates failed: {}",
        .last_error.as_deref().unwrap_or("no candidates configured")
    )]
    Exhausted {
        last_error: Option<String>,
        attempts: Vec<AttemptRecord>,
    },
}

impl SequenceError {
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            SequenceError::Fatal { attempts, .. } | SequenceError::Exhausted { attempts, .. } => {
                attempts
            }
        }
    }
}

pub struct Sequencer {
    client: Arc<dyn GenerationClient>,
    candidates: Vec<Candidate>,
    attempt_timeout: Duration,
    deadline: Duration,
}

impl Sequencer {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        candidates: Vec<Candidate>,
        attempt_timeout: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            client,
            candidates,
            attempt_timeout,
            deadline,
        }
    }

    /// Try candidates in order until one yields a usable reply.
    ///
    /// `normalize` interprets each raw reply; a `Failed` interpretation counts
    /// as a retryable attempt. Dropping the returned future cancels the call in flight.
    pub async fn run<F>(
        &self,
        request: &GenerationRequest,
        normalize: F,
    ) -> Result<SequenceSuccess, SequenceError>
    where
        F: Fn(&str) -> NormalizedResponse,
    {
        self.client
            .check_credentials()
            .map_err(|error| SequenceError::Fatal {
                error,
                attempts: Vec::new(),
            })?;

        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.candidates.len());
        let mut last_error: Option<String> = None;

        for candidate in &self.candidates {
            let remaining = self.deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                log::warn!(
                    "Deadline of {:?} reached before trying {}",
                    self.deadline,
                    candidate
                );
                last_error = Some(ProviderError::DeadlineExceeded.to_string());
                break;
            }

            let budget = self.attempt_timeout.min(remaining);
            let attempt_started = Instant::now();
            let result =
                match tokio::time::timeout(budget, self.client.generate(candidate, request)).await
                {
                    Ok(result) => result,
                    Err(_) if budget < self.attempt_timeout => Err(ProviderError::DeadlineExceeded),
                    Err(_) => Err(ProviderError::Timeout(budget.as_millis() as u64)),
                };
            let elapsed = attempt_started.elapsed();

            match result {
                Ok(text) => match normalize(&text) {
                    NormalizedResponse::Failed(reason) => {
                        log::warn!("Attempt with {} unusable: {}", candidate, reason);
                        attempts.push(AttemptRecord::new(
                            candidate,
                            AttemptOutcome::Retryable,
                            Some(UNUSABLE_REPLY.to_string()),
                            elapsed,
                        ));
                        last_error = Some(reason);
                    }
                    response => {
                        log::info!(
                            "Model {} answered after {} attempt(s)",
                            candidate,
                            attempts.len() + 1
                        );
                        attempts.push(AttemptRecord::new(
                            candidate,
                            AttemptOutcome::Success,
                            None,
                            elapsed,
                        ));
                        return Ok(SequenceSuccess {
                            response,
                            candidate: candidate.clone(),
                            attempts,
                        });
                    }
                },
                Err(error) if error.is_fatal() => {
                    log::warn!("Attempt with {} failed fatally: {}", candidate, error);
                    attempts.push(AttemptRecord::new(
                        candidate,
                        AttemptOutcome::Fatal,
                        Some(error.code()),
                        elapsed,
                    ));
                    return Err(SequenceError::Fatal { error, attempts });
                }
                Err(error) => {
                    log::warn!("Attempt with {} failed: {}", candidate, error);
                    attempts.push(AttemptRecord::new(
                        candidate,
                        AttemptOutcome::Retryable,
                        Some(error.code()),
                        elapsed,
                    ));
                    last_error = Some(error.to_string());
                }
            }
        }

        Err(SequenceError::Exhausted {
            last_error,
            attempts,
        })
    }
}
