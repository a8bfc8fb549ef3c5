// Prompt construction for the three request modes

pub mod builtin;

use crate::models::{AnalysisRequest, GradeLetter, Mode};
use std::sync::OnceLock;
use tera::{Context, Tera};

/// Grade assumed when a refine request carries no prior grade
pub const DEFAULT_GRADE: u8 = 50;
/// Letter shown when no prior grade is known
pub const DEFAULT_GRADE_LETTER: &str = "C";
/// Instruction used when a refine request arrives without one
pub const DEFAULT_INSTRUCTION: &str = "Improve the conversion rate of this page.";

/// What the caller expects back from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    PlainText,
}

/// A fully rendered prompt ready for delivery
#[derive(Debug, Clone)]
pub struct Prompt {
    pub mode: Mode,
    pub text: String,
    pub format: ResponseFormat,
}

static ENGINE: OnceLock<Option<Tera>> = OnceLock::new();

fn engine() -> Option<&'static Tera> {
    ENGINE
        .get_or_init(|| {
            let mut tera = Tera::default();
            tera.autoescape_on(vec![]);
            match tera.add_raw_templates(builtin::get_builtin_templates()) {
                Ok(()) => Some(tera),
                Err(e) => {
                    log::error!("Failed to compile builtin prompt templates: {}", e);
                    None
                }
            }
        })
        .as_ref()
}

/// Escape backslashes and double quotes so free text stays inside its quoted slot
pub fn escape_for_prompt(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the prompt for a request. Never fails: missing optional values get neutral defaults.
pub fn build_prompt(request: &AnalysisRequest) -> Prompt {
    let (template_name, context, format) = match request.mode {
        Mode::Create => (builtin::ANALYSIS, analysis_context(request), ResponseFormat::Json),
        Mode::Refine => (
            builtin::REFINEMENT,
            refinement_context(request),
            ResponseFormat::Json,
        ),
        Mode::Chat => (builtin::CHAT, chat_context(request), ResponseFormat::PlainText),
    };

    let rendered = engine().and_then(|tera| match tera.render(template_name, &context) {
        Ok(text) => Some(text),
        Err(e) => {
            log::error!("Failed to render prompt template '{}': {}", template_name, e);
            None
        }
    });

    let text = rendered.unwrap_or_else(|| plain_prompt(request));

    Prompt {
        mode: request.mode,
        text,
        format,
    }
}

fn analysis_context(request: &AnalysisRequest) -> Context {
    let mut context = Context::new();
    context.insert("idea", &escape_for_prompt(request.idea_text.trim()));
    context.insert("output_contract", builtin::output_contract());
    context
}

fn refinement_context(request: &AnalysisRequest) -> Context {
    let prior = request.prior_context.clone().unwrap_or_default();
    let instruction = match request.idea_text.trim() {
        "" => DEFAULT_INSTRUCTION,
        text => text,
    };
    let (grade, grade_letter) = match prior.grade {
        Some(g) => (g.min(100), GradeLetter::from_grade(g.min(100)).as_str()),
        None => (DEFAULT_GRADE, DEFAULT_GRADE_LETTER),
    };

    let mut context = Context::new();
    context.insert("instruction", &escape_for_prompt(instruction));
    context.insert("prior_html", request.prior_html.as_deref().unwrap_or(""));
    context.insert("grade", &grade);
    context.insert("grade_letter", grade_letter);
    context.insert(
        "title",
        &escape_for_prompt(prior.title.as_deref().unwrap_or("")),
    );
    context.insert(
        "tagline",
        &escape_for_prompt(prior.tagline.as_deref().unwrap_or("")),
    );
    context.insert("output_contract", builtin::output_contract());
    context
}

fn chat_context(request: &AnalysisRequest) -> Context {
    let prior = request.prior_context.clone().unwrap_or_default();

    let mut context = Context::new();
    context.insert("idea", &escape_for_prompt(request.idea_text.trim()));
    context.insert(
        "title",
        &escape_for_prompt(prior.title.as_deref().unwrap_or("")),
    );
    context.insert(
        "tagline",
        &escape_for_prompt(prior.tagline.as_deref().unwrap_or("")),
    );
    context
}

/// Last-resort prompt used only if the builtin templates fail to render
fn plain_prompt(request: &AnalysisRequest) -> String {
    match request.mode {
        Mode::Chat => format!(
            "Answer briefly in plain text: \"{}\"",
            escape_for_prompt(request.idea_text.trim())
        ),
        Mode::Create => format!(
            "{}\n\nBusiness idea: \"{}\"",
            builtin::output_contract(),
            escape_for_prompt(request.idea_text.trim())
        ),
        Mode::Refine => format!(
            "{}\n\nInstruction: \"{}\"\n\n{}",
            builtin::output_contract(),
            escape_for_prompt(request.idea_text.trim()),
            request.prior_html.as_deref().unwrap_or("")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriorContext;

    #[test]
    fn test_escape_for_prompt() {
        assert_eq!(escape_for_prompt(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_for_prompt(r"C:\path"), r"C:\\path");
        assert_eq!(escape_for_prompt("plain"), "plain");
    }

    #[test]
    fn test_create_prompt_embeds_idea_and_contract() {
        let prompt = build_prompt(&AnalysisRequest::create("An app for dog walkers"));

        assert_eq!(prompt.format, ResponseFormat::Json);
        assert_eq!(prompt.mode, Mode::Create);
        assert!(prompt.text.contains("\"An app for dog walkers\""));
        assert!(prompt.text.contains("\"tailwind_html\""));
        assert!(!prompt.text.contains("{{"));
    }

    #[test]
    fn test_create_prompt_escapes_quotes() {
        let prompt = build_prompt(&AnalysisRequest::create(r#"The "Uber" for \ dog walking"#));
        assert!(prompt.text.contains(r#"The \"Uber\" for \\ dog walking"#));
    }

    #[test]
    fn test_refine_prompt_embeds_instruction_and_html_verbatim() {
        let html = "<html><head></head><body class='bg-black'>PupConnect</body></html>";
        let request = AnalysisRequest::refine(
            "make it blue",
            html,
            Some(PriorContext {
                grade: Some(58),
                title: Some("PupConnect".to_string()),
                tagline: None,
            }),
        );

        let prompt = build_prompt(&request);
        assert_eq!(prompt.format, ResponseFormat::Json);
        assert!(prompt.text.contains("make it blue"));
        assert!(prompt.text.contains(html));
        assert!(prompt.text.contains("Current grade: 58 (C)"));
        assert!(prompt.text.contains("\"PupConnect\""));
    }

    #[test]
    fn test_refine_prompt_defaults() {
        let request = AnalysisRequest::refine("", "<html></html>", None);
        let prompt = build_prompt(&request);

        assert!(prompt.text.contains("Current grade: 50 (C)"));
        assert!(prompt.text.contains(DEFAULT_INSTRUCTION));
    }

    #[test]
    fn test_chat_prompt_is_plain_text() {
        let prompt = build_prompt(&AnalysisRequest::chat("Is the headline too long?"));
        assert_eq!(prompt.format, ResponseFormat::PlainText);
        assert!(prompt.text.contains("Is the headline too long?"));
        assert!(!prompt.text.contains("tailwind_html"));
        assert!(!prompt.text.contains("The user is working on"));
    }

    #[test]
    fn test_chat_prompt_mentions_prior_title() {
        let mut request = AnalysisRequest::chat("Better tagline?");
        request.prior_context = Some(PriorContext {
            grade: None,
            title: Some("PupConnect".to_string()),
            tagline: Some("Walks on demand".to_string()),
        });

        let prompt = build_prompt(&request);
        assert!(prompt
            .text
            .contains("The user is working on \"PupConnect\" (\"Walks on demand\")"));
    }
}
