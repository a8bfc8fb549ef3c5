// Classification of vendor HTTP failures into fatal and retryable errors

use super::ProviderError;
use crate::config::Vendor;
use crate::utils::truncate_chars;
use regex::Regex;
use std::sync::OnceLock;

/// Longest vendor message kept in a diagnostic
const MAX_MESSAGE_CHARS: usize = 300;

// Static patterns for efficient reuse
static AUTH_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Phrases vendors use when the credential itself is bad, whatever the status code.
/// Gemini answers an invalid key with HTTP 400 INVALID_ARGUMENT, for example.
fn get_auth_patterns() -> &'static Vec<Regex> {
    AUTH_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"(?i)api[_\-\s]?key\s+(is\s+)?(not\s+valid|invalid|expired)").unwrap(),
            Regex::new(r"(?i)invalid[_\-\s]?(api[_\-\s]?key|x-api-key|authentication)").unwrap(),
            Regex::new(r"(?i)incorrect\s+api\s+key").unwrap(),
            Regex::new(r"(?i)API_KEY_INVALID").unwrap(),
            Regex::new(r"(?i)authentication_error").unwrap(),
        ]
    })
}

/// Whether a vendor error body describes a rejected credential
pub fn is_auth_failure(body: &str) -> bool {
    get_auth_patterns().iter().any(|re| re.is_match(body))
}

/// Pull a human-readable message out of a vendor error body.
///
/// All four vendors nest it at `error.message`; Gemini sometimes wraps the
/// error object in a one-element array.
pub fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        let root = match v {
            serde_json::Value::Array(items) => items.first()?,
            other => other,
        };
        root["error"]["message"]
            .as_str()
            .or_else(|| root["message"].as_str())
            .map(|s| s.to_string())
    });

    let message = message.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        "no error details".to_string()
    } else {
        truncate_chars(&message, MAX_MESSAGE_CHARS)
    }
}

/// Map a non-2xx vendor response onto a provider error
pub fn classify_http_failure(vendor: Vendor, status: u16, body: &str) -> ProviderError {
    let message = extract_error_message(body);

    if status == 401 || status == 403 || is_auth_failure(body) {
        return ProviderError::Unauthorized {
            vendor,
            status,
            message,
        };
    }

    ProviderError::Http { status, message }
}
