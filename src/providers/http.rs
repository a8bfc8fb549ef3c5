// reqwest-backed GenerationClient for the real vendor APIs

use super::{
    anthropic, classify, gemini, openai, GenerationClient, GenerationRequest, ProviderError,
};
use crate::config::{
    resolve_api_key, AuthStyle, Candidate, DispatchConfig, SecretsConfig, Vendor,
};
use crate::utils::redact_secret;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("vext/", env!("CARGO_PKG_VERSION"));

/// Talks to one vendor over HTTPS. Holds a single pooled reqwest client.
pub struct HttpGenerationClient {
    http: reqwest::Client,
    vendor: Vendor,
    base_url: String,
    api_key: Option<String>,
}

impl HttpGenerationClient {
    pub fn new(vendor: Vendor, base_url: String, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            vendor,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Client for the configured vendor, with the key resolved from env or secrets file
    pub fn from_config(config: &DispatchConfig, secrets: &SecretsConfig) -> Result<Self> {
        Self::new(
            config.vendor,
            config.effective_base_url(),
            resolve_api_key(config.vendor, secrets),
        )
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_request(
        &self,
        candidate: &Candidate,
        request: &GenerationRequest,
        key: &str,
    ) -> (String, reqwest::RequestBuilder) {
        let (url, body) = match self.vendor {
            Vendor::Gemini => (
                gemini::endpoint(&self.base_url, candidate, key),
                gemini::request_body(request),
            ),
            Vendor::OpenAi | Vendor::Groq => (
                openai::endpoint(&self.base_url, candidate),
                openai::request_body(candidate, request),
            ),
            Vendor::Anthropic => (
                anthropic::endpoint(&self.base_url, candidate),
                anthropic::request_body(candidate, request),
            ),
        };

        let builder = self.http.post(&url).json(&body);
        let builder = match self.vendor.preset().auth {
            AuthStyle::QueryKey => builder,
            AuthStyle::Bearer => builder.bearer_auth(key),
            AuthStyle::XApiKey => builder
                .header("x-api-key", key)
                .header("anthropic-version", anthropic::ANTHROPIC_VERSION),
        };

        (url, builder)
    }

    fn extract_text(&self, data: &serde_json::Value) -> Result<String, ProviderError> {
        match self.vendor {
            Vendor::Gemini => gemini::extract_text(data),
            Vendor::OpenAi | Vendor::Groq => openai::extract_text(data),
            Vendor::Anthropic => anthropic::extract_text(data),
        }
    }
}

fn transport_error(e: reqwest::Error, key: &str) -> ProviderError {
    // reqwest errors embed the URL, which carries the Gemini key
    // Only the connect phase has a client-side timeout; the sequencer bounds the rest
    if e.is_timeout() {
        ProviderError::Timeout(CONNECT_TIMEOUT.as_millis() as u64)
    } else {
        ProviderError::Transport(redact_secret(&e.to_string(), key))
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn check_credentials(&self) -> Result<(), ProviderError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(ProviderError::MissingApiKey {
                vendor: self.vendor,
                env_var: self.vendor.preset().key_env.to_string(),
            }),
        }
    }

    async fn generate(
        &self,
        candidate: &Candidate,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        self.check_credentials()?;
        let key = self.api_key.as_deref().unwrap_or_default();

        let (url, builder) = self.build_request(candidate, request, key);
        log::debug!(
            "POST {} ({} prompt chars)",
            redact_secret(&url, key),
            request.prompt.chars().count()
        );

        let response = builder.send().await.map_err(|e| transport_error(e, key))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(e, key))?;

        if !status.is_success() {
            return Err(classify::classify_http_failure(
                self.vendor,
                status.as_u16(),
                &body,
            ));
        }

        let data: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON body: {}", e)))?;

        self.extract_text(&data)
    }
}
