// Anthropic Messages API wire format

use super::{GenerationRequest, ProviderError};
use crate::config::Candidate;
use serde_json::{json, Value};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `{base}/{version}/messages`
pub fn endpoint(base_url: &str, candidate: &Candidate) -> String {
    format!("{}/{}/messages", base_url, candidate.api_version)
}

pub fn request_body(candidate: &Candidate, request: &GenerationRequest) -> Value {
    json!({
        "model": candidate.model,
        "max_tokens": request.max_output_tokens,
        "temperature": request.temperature,
        "messages": [
            { "role": "user", "content": request.prompt }
        ]
    })
}

pub fn extract_text(data: &Value) -> Result<String, ProviderError> {
    if data["stop_reason"].as_str() == Some("refusal") {
        return Err(ProviderError::SafetyBlocked("refusal".to_string()));
    }

    let text: String = data["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"].as_str() == Some("text"))
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}
