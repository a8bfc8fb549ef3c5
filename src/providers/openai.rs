// OpenAI-compatible chat completions wire format (OpenAI and Groq)

use super::{GenerationRequest, ProviderError};
use crate::config::Candidate;
use crate::templates::ResponseFormat;
use serde_json::{json, Value};

/// `{base}/{version}/chat/completions`
pub fn endpoint(base_url: &str, candidate: &Candidate) -> String {
    format!("{}/{}/chat/completions", base_url, candidate.api_version)
}

pub fn request_body(candidate: &Candidate, request: &GenerationRequest) -> Value {
    let mut body = json!({
        "model": candidate.model,
        "messages": [
            { "role": "user", "content": request.prompt }
        ],
        "temperature": request.temperature,
        "max_tokens": request.max_output_tokens
    });

    if request.format == ResponseFormat::Json {
        body["response_format"] = json!({ "type": "json_object" });
    }

    body
}

pub fn extract_text(data: &Value) -> Result<String, ProviderError> {
    let choice = &data["choices"][0];

    if let Some(refusal) = choice["message"]["refusal"].as_str() {
        return Err(ProviderError::SafetyBlocked(refusal.to_string()));
    }
    if choice["finish_reason"].as_str() == Some("content_filter") {
        return Err(ProviderError::SafetyBlocked("content_filter".to_string()));
    }

    match choice["message"]["content"].as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(ProviderError::EmptyResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(format: ResponseFormat) -> GenerationRequest {
        GenerationRequest {
            prompt: "hello".to_string(),
            format,
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }

    #[test]
    fn test_endpoint_groq_base() {
        let url = endpoint(
            "https://api.groq.com/openai",
            &Candidate::new("v1", "llama-3.3-70b-versatile"),
        );
        assert_eq!(url, "https://api.groq.com/openai/v1/chat/completions");
    }

    #[test]
    fn test_json_mode_requested_only_for_json() {
        let candidate = Candidate::new("v1", "gpt-4o-mini");
        let body = request_body(&candidate, &request(ResponseFormat::Json));
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 1024);

        let body = request_body(&candidate, &request(ResponseFormat::PlainText));
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_extract_text() {
        let data = json!({
            "choices": [{ "message": { "content": "Hi there" }, "finish_reason": "stop" }]
        });
        assert_eq!(extract_text(&data).unwrap(), "Hi there");
    }

    #[test]
    fn test_extract_text_content_filter() {
        let data = json!({
            "choices": [{ "message": { "content": null }, "finish_reason": "content_filter" }]
        });
        assert!(matches!(
            extract_text(&data),
            Err(ProviderError::SafetyBlocked(_))
        ));
    }

    #[test]
    fn test_extract_text_refusal() {
        let data = json!({
            "choices": [{ "message": { "content": null, "refusal": "I can't help with that." } }]
        });
        assert_eq!(
            extract_text(&data),
            Err(ProviderError::SafetyBlocked("I can't help with that.".to_string()))
        );
    }

    #[test]
    fn test_extract_text_empty() {
        assert_eq!(
            extract_text(&json!({ "choices": [] })),
            Err(ProviderError::EmptyResponse)
        );
    }
}
