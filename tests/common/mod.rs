// Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vext_lib::config::{Candidate, DispatchConfig, Vendor};
use vext_lib::dispatch::Dispatcher;
use vext_lib::providers::{GenerationClient, GenerationRequest, ProviderError};

/// Vendor stand-in that replays scripted replies and records every call
pub struct FakeVendor {
    has_key: bool,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Candidate, GenerationRequest)>>,
}

impl FakeVendor {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            has_key: true,
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn without_key() -> Arc<Self> {
        Arc::new(Self {
            has_key: false,
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(Candidate, GenerationRequest)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for FakeVendor {
    fn vendor(&self) -> Vendor {
        Vendor::Gemini
    }

    fn check_credentials(&self) -> Result<(), ProviderError> {
        if self.has_key {
            Ok(())
        } else {
            Err(ProviderError::MissingApiKey {
                vendor: Vendor::Gemini,
                env_var: "GEMINI_API_KEY".to_string(),
            })
        }
    }

    async fn generate(
        &self,
        candidate: &Candidate,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((candidate.clone(), request.clone()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

pub fn candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("v1beta", "gemini-2.0-flash"),
        Candidate::new("v1beta", "gemini-1.5-flash"),
        Candidate::new("v1", "gemini-1.5-flash"),
    ]
}

pub fn dispatcher(vendor: Arc<FakeVendor>) -> Dispatcher {
    Dispatcher::new(
        vendor,
        DispatchConfig {
            candidates: candidates(),
            ..Default::default()
        },
    )
}

pub fn http_503() -> ProviderError {
    ProviderError::Http {
        status: 503,
        message: "The model is overloaded. Please try again later.".to_string(),
    }
}
