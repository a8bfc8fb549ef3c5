// Google Gemini generateContent wire format

use super::{GenerationRequest, ProviderError};
use crate::config::Candidate;
use serde_json::{json, Value};

/// Finish reasons that mean the model refused on policy grounds
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

/// `{base}/{version}/models/{model}:generateContent?key={key}`
pub fn endpoint(base_url: &str, candidate: &Candidate, api_key: &str) -> String {
    format!(
        "{}/{}/models/{}:generateContent?key={}",
        base_url, candidate.api_version, candidate.model, api_key
    )
}

pub fn request_body(request: &GenerationRequest) -> Value {
    json!({
        "contents": [
            {
                "parts": [
                    { "text": request.prompt }
                ]
            }
        ],
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_output_tokens
        }
    })
}

/// Extract the generated text from a generateContent response
pub fn extract_text(data: &Value) -> Result<String, ProviderError> {
    if let Some(reason) = data["promptFeedback"]["blockReason"].as_str() {
        return Err(ProviderError::SafetyBlocked(reason.to_string()));
    }

    let candidate = &data["candidates"][0];
    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = candidate["finishReason"].as_str() {
            if BLOCKING_FINISH_REASONS.contains(&reason) {
                return Err(ProviderError::SafetyBlocked(reason.to_string()));
            }
        }
        return Err(ProviderError::EmptyResponse);
    }

    Ok(text)
}
