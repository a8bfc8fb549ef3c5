// Data models shared by the dispatcher, the HTTP layer and the CLI client

use serde::{Deserialize, Serialize};

/// Operating mode of an analysis request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Full analysis of a new business idea
    #[default]
    Create,
    /// Rework an existing landing page following a user instruction
    Refine,
    /// Short conversational answer, no structured payload
    Chat,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::Refine => "refine",
            Mode::Chat => "chat",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Mode::Create),
            "refine" => Ok(Mode::Refine),
            "chat" => Ok(Mode::Chat),
            _ => Err(format!(
                "Unknown mode: '{}'. Expected one of: create, refine, chat",
                s
            )),
        }
    }
}

/// Values carried over from the result the user is refining
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriorContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
}

/// Inbound request body for the analyze endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    /// Business idea (create), refinement instruction (refine) or question (chat)
    #[serde(alias = "hypothesis", default)]
    pub idea_text: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_context: Option<PriorContext>,
}

/// Minimum idea length accepted in create mode
pub const MIN_IDEA_CHARS: usize = 10;

impl AnalysisRequest {
    pub fn create(idea_text: impl Into<String>) -> Self {
        Self {
            idea_text: idea_text.into(),
            mode: Mode::Create,
            prior_html: None,
            prior_context: None,
        }
    }

    pub fn refine(
        instruction: impl Into<String>,
        prior_html: impl Into<String>,
        prior_context: Option<PriorContext>,
    ) -> Self {
        Self {
            idea_text: instruction.into(),
            mode: Mode::Refine,
            prior_html: Some(prior_html.into()),
            prior_context,
        }
    }

    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            idea_text: message.into(),
            mode: Mode::Chat,
            prior_html: None,
            prior_context: None,
        }
    }

    /// Check the per-mode invariants before any prompt is built
    pub fn validate(&self) -> Result<(), String> {
        let idea = self.idea_text.trim();
        match self.mode {
            Mode::Create => {
                if idea.is_empty() {
                    return Err("idea_text is required".to_string());
                }
                if idea.chars().count() < MIN_IDEA_CHARS {
                    return Err(format!(
                        "idea_text must be at least {} characters",
                        MIN_IDEA_CHARS
                    ));
                }
            }
            Mode::Chat => {
                if idea.is_empty() {
                    return Err("idea_text is required".to_string());
                }
            }
            Mode::Refine => {
                let has_html = self
                    .prior_html
                    .as_deref()
                    .map(|h| !h.trim().is_empty())
                    .unwrap_or(false);
                if !has_html {
                    return Err("prior_html is required in refine mode".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Letter grade shown next to the numeric score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GradeLetter {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl GradeLetter {
    /// Map a 0-100 score onto a letter
    pub fn from_grade(grade: u8) -> Self {
        match grade {
            95..=u8::MAX => GradeLetter::S,
            85..=94 => GradeLetter::A,
            70..=84 => GradeLetter::B,
            55..=69 => GradeLetter::C,
            40..=54 => GradeLetter::D,
            _ => GradeLetter::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLetter::S => "S",
            GradeLetter::A => "A",
            GradeLetter::B => "B",
            GradeLetter::C => "C",
            GradeLetter::D => "D",
            GradeLetter::F => "F",
        }
    }
}

impl std::fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GradeLetter {
    type Err = String;

    /// Accepts decorated letters such as "A+" or "b-" by looking at the first character
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('S') => Ok(GradeLetter::S),
            Some('A') => Ok(GradeLetter::A),
            Some('B') => Ok(GradeLetter::B),
            Some('C') => Ok(GradeLetter::C),
            Some('D') => Ok(GradeLetter::D),
            Some('F') => Ok(GradeLetter::F),
            _ => Err(format!("Unknown grade letter: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PsychologyTrigger {
    pub trigger: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LandingPage {
    pub headline: String,
    pub subheadline: String,
    pub html_document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViralScript {
    pub platform: String,
    pub duration: String,
    pub script_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViralKit {
    pub hooks: Vec<String>,
    pub scripts: Vec<ViralScript>,
}

/// Canonical result of one analysis, superseded (never merged) by later refinements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub grade: u8,
    pub grade_letter: GradeLetter,
    pub target_audience: String,
    pub psychology_triggers: Vec<PsychologyTrigger>,
    pub strategy_summary: String,
    pub landing_page: LandingPage,
    pub viral_kit: ViralKit,
}

impl AnalysisResult {
    /// Fixed payload returned when every model candidate failed
    pub fn degraded_placeholder() -> Self {
        Self {
            grade: 50,
            grade_letter: GradeLetter::C,
            target_audience: String::new(),
            psychology_triggers: Vec::new(),
            strategy_summary:
                "The analysis service is temporarily degraded. Your idea was received but no model produced a result. Please try again in a few minutes."
                    .to_string(),
            landing_page: LandingPage {
                headline: "Service degraded".to_string(),
                subheadline: "We could not generate your landing page right now.".to_string(),
                html_document: String::new(),
            },
            viral_kit: ViralKit::default(),
        }
    }

    /// Context handed to the next refine request for this result
    pub fn prior_context(&self) -> PriorContext {
        PriorContext {
            grade: Some(self.grade),
            title: Some(self.landing_page.headline.clone()),
            tagline: Some(self.landing_page.subheadline.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_create() {
        let req: AnalysisRequest =
            serde_json::from_str(r#"{"idea_text": "An app for dog walkers"}"#).unwrap();
        assert_eq!(req.mode, Mode::Create);
        assert!(req.prior_html.is_none());
    }

    #[test]
    fn test_hypothesis_alias() {
        let req: AnalysisRequest =
            serde_json::from_str(r#"{"hypothesis": "An app for dog walkers"}"#).unwrap();
        assert_eq!(req.idea_text, "An app for dog walkers");
    }

    #[test]
    fn test_validate_create() {
        assert!(AnalysisRequest::create("An app for dog walkers").validate().is_ok());
        assert!(AnalysisRequest::create("   ").validate().is_err());
        assert!(AnalysisRequest::create("dogs").validate().is_err());
    }

    #[test]
    fn test_validate_chat_allows_short_text() {
        assert!(AnalysisRequest::chat("why?").validate().is_ok());
        assert!(AnalysisRequest::chat("").validate().is_err());
    }

    #[test]
    fn test_validate_refine_requires_html() {
        let mut req = AnalysisRequest::refine("make it blue", "<html></html>", None);
        assert!(req.validate().is_ok());

        req.prior_html = None;
        assert!(req.validate().is_err());

        req.prior_html = Some("  ".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_grade_letter_from_grade() {
        assert_eq!(GradeLetter::from_grade(100), GradeLetter::S);
        assert_eq!(GradeLetter::from_grade(87), GradeLetter::A);
        assert_eq!(GradeLetter::from_grade(72), GradeLetter::B);
        assert_eq!(GradeLetter::from_grade(58), GradeLetter::C);
        assert_eq!(GradeLetter::from_grade(50), GradeLetter::D);
        assert_eq!(GradeLetter::from_grade(12), GradeLetter::F);
    }

    #[test]
    fn test_grade_letter_parse() {
        assert_eq!("A+".parse::<GradeLetter>().unwrap(), GradeLetter::A);
        assert_eq!(" b".parse::<GradeLetter>().unwrap(), GradeLetter::B);
        assert!("Z".parse::<GradeLetter>().is_err());
        assert!("".parse::<GradeLetter>().is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("REFINE".parse::<Mode>().unwrap(), Mode::Refine);
        assert!("edit".parse::<Mode>().is_err());
    }
}
