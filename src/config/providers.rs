// Builtin vendor presets for the text-generation APIs the dispatcher can target
//
// Each preset carries the default base URL, the environment variable holding
// its API key and the ordered candidate list tried by the fallback sequencer.

use serde::{Deserialize, Serialize};

/// Supported LLM vendors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Groq,
}

impl Vendor {
    pub fn all() -> &'static [Vendor] {
        &[Vendor::Gemini, Vendor::OpenAi, Vendor::Anthropic, Vendor::Groq]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Gemini => "gemini",
            Vendor::OpenAi => "openai",
            Vendor::Anthropic => "anthropic",
            Vendor::Groq => "groq",
        }
    }

    pub fn preset(&self) -> &'static VendorPreset {
        match self {
            Vendor::Gemini => &GEMINI_PRESET,
            Vendor::OpenAi => &OPENAI_PRESET,
            Vendor::Anthropic => &ANTHROPIC_PRESET,
            Vendor::Groq => &GROQ_PRESET,
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gemini" | "google" => Ok(Vendor::Gemini),
            "openai" | "open_ai" => Ok(Vendor::OpenAi),
            "anthropic" | "claude" => Ok(Vendor::Anthropic),
            "groq" => Ok(Vendor::Groq),
            _ => Err(format!(
                "Unknown vendor: '{}'. Expected one of: gemini, openai, anthropic, groq",
                s
            )),
        }
    }
}

/// How the API key travels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `?key=...` query parameter
    QueryKey,
    /// `Authorization: Bearer ...`
    Bearer,
    /// `x-api-key: ...`
    XApiKey,
}

/// One (API version, model identifier) pair the sequencer may try
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub api_version: String,
    pub model: String,
}

impl Candidate {
    pub fn new(api_version: &str, model: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            model: model.to_string(),
        }
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version, self.model)
    }
}

/// A builtin vendor preset
/// Note: This is hardcoded data, not deserialized from files
#[derive(Debug, Clone)]
pub struct VendorPreset {
    pub vendor: Vendor,
    /// Display name
    pub name: &'static str,
    /// Base URL for the API (without version segment)
    pub base_url: &'static str,
    /// Environment variable holding the API key
    pub key_env: &'static str,
    pub auth: AuthStyle,
    /// Default fallback order: (api_version, model)
    pub candidates: &'static [(&'static str, &'static str)],
}

impl VendorPreset {
    pub fn default_candidates(&self) -> Vec<Candidate> {
        self.candidates
            .iter()
            .map(|(version, model)| Candidate::new(version, model))
            .collect()
    }
}

pub static GEMINI_PRESET: VendorPreset = VendorPreset {
    vendor: Vendor::Gemini,
    name: "Google Gemini",
    base_url: "https://generativelanguage.googleapis.com",
    key_env: "GEMINI_API_KEY",
    auth: AuthStyle::QueryKey,
    candidates: &[
        ("v1beta", "gemini-2.0-flash"),
        ("v1beta", "gemini-1.5-flash"),
        ("v1", "gemini-1.5-flash"),
        ("v1beta", "gemini-1.5-pro"),
    ],
};

pub static OPENAI_PRESET: VendorPreset = VendorPreset {
    vendor: Vendor::OpenAi,
    name: "OpenAI",
    base_url: "https://api.openai.com",
    key_env: "OPENAI_API_KEY",
    auth: AuthStyle::Bearer,
    candidates: &[("v1", "gpt-4o-mini"), ("v1", "gpt-4o"), ("v1", "gpt-3.5-turbo")],
};

pub static ANTHROPIC_PRESET: VendorPreset = VendorPreset {
    vendor: Vendor::Anthropic,
    name: "Anthropic",
    base_url: "https://api.anthropic.com",
    key_env: "ANTHROPIC_API_KEY",
    auth: AuthStyle::XApiKey,
    candidates: &[
        ("v1", "claude-sonnet-4-20250514"),
        ("v1", "claude-3-5-sonnet-20241022"),
        ("v1", "claude-3-5-haiku-20241022"),
    ],
};

pub static GROQ_PRESET: VendorPreset = VendorPreset {
    vendor: Vendor::Groq,
    name: "Groq",
    base_url: "https://api.groq.com/openai",
    key_env: "GROQ_API_KEY",
    auth: AuthStyle::Bearer,
    candidates: &[
        ("v1", "llama-3.3-70b-versatile"),
        ("v1", "llama-3.1-8b-instant"),
        ("v1", "mixtral-8x7b-32768"),
    ],
};

/// Vendor info returned by `GET /api/providers`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorInfo {
    pub vendor: Vendor,
    pub name: String,
    pub base_url: String,
    /// Whether an API key is configured (the key itself is never exposed)
    pub has_key: bool,
    pub is_active: bool,
    pub candidates: Vec<Candidate>,
}

impl VendorPreset {
    pub fn to_info(&self, has_key: bool, is_active: bool) -> VendorInfo {
        VendorInfo {
            vendor: self.vendor,
            name: self.name.to_string(),
            base_url: self.base_url.to_string(),
            has_key,
            is_active,
            candidates: self.default_candidates(),
        }
    }
}
