// Turns raw model text into a structured result, a conversational reply, or a failure

use crate::models::{
    AnalysisResult, GradeLetter, LandingPage, PriorContext, PsychologyTrigger, ViralKit,
    ViralScript,
};
use crate::templates::{ResponseFormat, DEFAULT_GRADE};
use crate::utils::first_chars;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Characters of the idea used as a last-resort headline
const HEADLINE_FALLBACK_CHARS: usize = 50;

/// Outcome of interpreting one vendor reply
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    Structured(AnalysisResult),
    Conversational(String),
    Failed(String),
}

impl NormalizedResponse {
    pub fn is_failed(&self) -> bool {
        matches!(self, NormalizedResponse::Failed(_))
    }
}

/// Request-side values used to fill gaps in the vendor's JSON
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    pub idea_text: String,
    pub prior_context: Option<PriorContext>,
    pub prior_html: Option<String>,
    pub short_reply_chars: usize,
}

static JSON_FENCE: OnceLock<Regex> = OnceLock::new();
static BARE_FENCE: OnceLock<Regex> = OnceLock::new();

fn json_fence() -> &'static Regex {
    JSON_FENCE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap())
}

fn bare_fence() -> &'static Regex {
    BARE_FENCE.get_or_init(|| Regex::new(r"(?s)```\s*(.*?)\s*```").unwrap())
}

/// Return the body of the first fenced code block, or the trimmed text when there is none
pub fn strip_code_fence(text: &str) -> &str {
    json_fence()
        .captures(text)
        .or_else(|| bare_fence().captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| text.trim())
}

pub fn normalize(raw: &str, format: ResponseFormat, ctx: &NormalizeContext) -> NormalizedResponse {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedResponse::Failed("empty response".to_string());
    }

    if format == ResponseFormat::PlainText {
        return NormalizedResponse::Conversational(trimmed.to_string());
    }

    match serde_json::from_str::<Value>(strip_code_fence(trimmed)) {
        Ok(value @ Value::Object(_)) => NormalizedResponse::Structured(map_analysis(&value, ctx)),
        _ if trimmed.chars().count() <= ctx.short_reply_chars => {
            NormalizedResponse::Conversational(trimmed.to_string())
        }
        Ok(_) => NormalizedResponse::Failed(
            "malformed provider response: expected a JSON object".to_string(),
        ),
        Err(e) => NormalizedResponse::Failed(format!("malformed provider response: {}", e)),
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value[key]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Grades arrive as numbers, floats or numeric strings
fn parse_grade(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(0.0, 100.0) as u8)
}

fn parse_triggers(value: &Value) -> Vec<PsychologyTrigger> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(PsychologyTrigger {
                trigger: s.clone(),
                explanation: String::new(),
            }),
            Value::Object(_) => Some(PsychologyTrigger {
                trigger: str_field(item, "trigger").or_else(|| str_field(item, "name"))?,
                explanation: str_field(item, "explanation").unwrap_or_default(),
            }),
            _ => None,
        })
        .collect()
}

fn parse_viral_kit(value: &Value) -> ViralKit {
    let hooks = value["hooks"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|h| h.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let scripts = value["scripts"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|s| {
                    let script_text =
                        str_field(s, "script").or_else(|| str_field(s, "script_text"))?;
                    Some(ViralScript {
                        platform: str_field(s, "platform").unwrap_or_default(),
                        duration: str_field(s, "duration").unwrap_or_default(),
                        script_text,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    ViralKit { hooks, scripts }
}

fn map_analysis(root: &Value, ctx: &NormalizeContext) -> AnalysisResult {
    let analysis = if root["analysis"].is_object() {
        &root["analysis"]
    } else {
        root
    };
    let landing = &root["landing_page"];
    let prior = ctx.prior_context.clone().unwrap_or_default();

    let vendor_grade = parse_grade(&analysis["grade"]);
    let grade = vendor_grade
        .or(prior.grade.map(|g| g.min(100)))
        .unwrap_or(DEFAULT_GRADE);

    let grade_letter = str_field(analysis, "grade_letter")
        .and_then(|s| s.parse::<GradeLetter>().ok())
        .or_else(|| vendor_grade.map(GradeLetter::from_grade))
        .unwrap_or(GradeLetter::C);

    let headline = str_field(landing, "headline")
        .or_else(|| prior.title.clone().filter(|t| !t.trim().is_empty()))
        .unwrap_or_else(|| first_chars(ctx.idea_text.trim(), HEADLINE_FALLBACK_CHARS));

    let subheadline = str_field(landing, "subheadline")
        .or_else(|| prior.tagline.clone())
        .unwrap_or_default();

    let html_document = landing["tailwind_html"]
        .as_str()
        .or_else(|| landing["html_document"].as_str())
        .filter(|h| !h.trim().is_empty())
        .map(|h| h.to_string())
        .or_else(|| ctx.prior_html.clone())
        .unwrap_or_default();

    AnalysisResult {
        grade,
        grade_letter,
        target_audience: str_field(analysis, "target_audience").unwrap_or_default(),
        psychology_triggers: parse_triggers(&analysis["psychology"]),
        strategy_summary: str_field(analysis, "strategy_summary").unwrap_or_default(),
        landing_page: LandingPage {
            headline,
            subheadline,
            html_document,
        },
        viral_kit: parse_viral_kit(&root["viral_kit"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = r#"{
        "analysis": {
            "grade": 72,
            "grade_letter": "B",
            "target_audience": "Busy urban dog owners",
            "psychology": [{"trigger": "Trust", "explanation": "Vetted walkers"}],
            "strategy_summary": "Lead with safety."
        },
        "landing_page": {
            "headline": "Walks you can trust",
            "subheadline": "Vetted walkers, live GPS",
            "tailwind_html": "<html><body>walk</body></html>"
        },
        "viral_kit": {
            "hooks": ["Your dog deserves better"],
            "scripts": [{"platform": "TikTok", "duration": "30s", "script": "Open on a leash..."}]
        }
    }"#;

    fn ctx() -> NormalizeContext {
        NormalizeContext {
            idea_text: "An app for dog walkers".to_string(),
            short_reply_chars: 400,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_reply_maps_every_field() {
        let result = match normalize(FULL_REPLY, ResponseFormat::Json, &ctx()) {
            NormalizedResponse::Structured(r) => r,
            other => panic!("expected structured, got {:?}", other),
        };
        assert_eq!(result.grade, 72);
        assert_eq!(result.grade_letter, GradeLetter::B);
        assert_eq!(result.target_audience, "Busy urban dog owners");
        assert_eq!(result.psychology_triggers[0].trigger, "Trust");
        assert_eq!(result.landing_page.headline, "Walks you can trust");
        assert_eq!(
            result.landing_page.html_document,
            "<html><body>walk</body></html>"
        );
        assert_eq!(result.viral_kit.hooks.len(), 1);
        assert_eq!(result.viral_kit.scripts[0].script_text, "Open on a leash...");
    }

    #[test]
    fn test_fence_decoration_is_idempotent() {
        let plain = normalize(FULL_REPLY, ResponseFormat::Json, &ctx());
        let json_fenced = format!("```json\n{}\n```", FULL_REPLY);
        let bare_fenced = format!("Here you go:\n```\n{}\n```", FULL_REPLY);
        assert_eq!(normalize(&json_fenced, ResponseFormat::Json, &ctx()), plain);
        assert_eq!(normalize(&bare_fenced, ResponseFormat::Json, &ctx()), plain);
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_chat_never_parses_json() {
        let reply = normalize(r#"{"analysis":{"grade":90}}"#, ResponseFormat::PlainText, &ctx());
        assert_eq!(
            reply,
            NormalizedResponse::Conversational(r#"{"analysis":{"grade":90}}"#.to_string())
        );
    }

    #[test]
    fn test_short_unparseable_reply_is_conversational() {
        let reply = normalize(
            "Sorry, could you describe the idea in more detail?",
            ResponseFormat::Json,
            &ctx(),
        );
        assert!(matches!(reply, NormalizedResponse::Conversational(_)));
    }

    #[test]
    fn test_long_unparseable_reply_fails() {
        let long = "word ".repeat(200);
        let reply = normalize(&long, ResponseFormat::Json, &ctx());
        match reply {
            NormalizedResponse::Failed(reason) => {
                assert!(reason.starts_with("malformed provider response"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_reply_fails() {
        assert!(normalize("  \n", ResponseFormat::Json, &ctx()).is_failed());
        assert!(normalize("", ResponseFormat::PlainText, &ctx()).is_failed());
    }

    #[test]
    fn test_missing_grade_falls_back_to_prior_context() {
        let ctx = NormalizeContext {
            idea_text: "make it blue".to_string(),
            prior_context: Some(PriorContext {
                grade: Some(58),
                title: Some("PupConnect".to_string()),
                tagline: Some("Walks on demand".to_string()),
            }),
            prior_html: Some("<html>old</html>".to_string()),
            short_reply_chars: 400,
        };
        let result = match normalize(
            r#"{"analysis":{"strategy_summary":"Bluer"},"landing_page":{}}"#,
            ResponseFormat::Json,
            &ctx,
        ) {
            NormalizedResponse::Structured(r) => r,
            other => panic!("expected structured, got {:?}", other),
        };
        assert_eq!(result.grade, 58);
        assert_eq!(result.grade_letter, GradeLetter::C);
        assert_eq!(result.landing_page.headline, "PupConnect");
        assert_eq!(result.landing_page.subheadline, "Walks on demand");
        assert_eq!(result.landing_page.html_document, "<html>old</html>");
    }

    #[test]
    fn test_defaults_without_any_context() {
        let result = match normalize("{}", ResponseFormat::Json, &ctx()) {
            NormalizedResponse::Structured(r) => r,
            other => panic!("expected structured, got {:?}", other),
        };
        assert_eq!(result.grade, 50);
        assert_eq!(result.grade_letter, GradeLetter::C);
        assert_eq!(result.landing_page.headline, "An app for dog walkers");
        assert_eq!(result.landing_page.html_document, "");
    }

    #[test]
    fn test_flat_analysis_and_loose_grades() {
        let result = match normalize(
            r#"{"grade":"91.6","target_audience":"Founders"}"#,
            ResponseFormat::Json,
            &ctx(),
        ) {
            NormalizedResponse::Structured(r) => r,
            other => panic!("expected structured, got {:?}", other),
        };
        assert_eq!(result.grade, 92);
        assert_eq!(result.grade_letter, GradeLetter::A);
        assert_eq!(result.target_audience, "Founders");

        assert_eq!(parse_grade(&serde_json::json!(250)), Some(100));
        assert_eq!(parse_grade(&serde_json::json!(-3)), Some(0));
        assert_eq!(parse_grade(&serde_json::json!("80%")), Some(80));
        assert_eq!(parse_grade(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_headline_fallback_truncates_idea() {
        let ctx = NormalizeContext {
            idea_text: "x".repeat(80),
            short_reply_chars: 400,
            ..Default::default()
        };
        match normalize("{}", ResponseFormat::Json, &ctx) {
            NormalizedResponse::Structured(r) => {
                assert_eq!(r.landing_page.headline.chars().count(), 50)
            }
            other => panic!("expected structured, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_json_is_not_structured() {
        assert!(matches!(
            normalize("[1,2,3]", ResponseFormat::Json, &ctx()),
            NormalizedResponse::Conversational(_)
        ));
        let long_array = format!("[{}]", vec!["1"; 300].join(","));
        assert!(normalize(&long_array, ResponseFormat::Json, &ctx()).is_failed());
    }
}
