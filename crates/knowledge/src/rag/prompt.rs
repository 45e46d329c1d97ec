//! "Stuff" prompt template.
//!
//! Every retrieved passage goes verbatim into a single system message; the
//! question is the user message. No chunking, summarizing or refinement.

use crate::types::Passage;
use handlebars::Handlebars;
use mutuo_core::{AppError, AppResult};
use serde::Serialize;

/// System message template; `{{context}}` receives the joined passages.
pub const SYSTEM_TEMPLATE: &str = "Use the following pieces of context to answer the user's question.\n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n\
{{context}}";

/// Separator placed between passage texts.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Prompt ready to be sent to the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct StuffedPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct TemplateVars<'a> {
    context: &'a str,
}

/// Join passage texts in retrieval order.
pub fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

/// Render the stuffed prompt for `question`.
pub fn render_prompt(question: &str, passages: &[Passage]) -> AppResult<StuffedPrompt> {
    let context = build_context(passages);

    let mut handlebars = Handlebars::new();
    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("system", SYSTEM_TEMPLATE)
        .map_err(|e| AppError::Knowledge(format!("Failed to register prompt template: {}", e)))?;

    let system = handlebars
        .render("system", &TemplateVars { context: &context })
        .map_err(|e| AppError::Knowledge(format!("Failed to render prompt template: {}", e)))?;

    Ok(StuffedPrompt {
        system,
        user: question.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_joins_in_order() {
        let passages = vec![Passage::new("Primo"), Passage::new("Secondo")];
        assert_eq!(build_context(&passages), "Primo\n\nSecondo");
    }

    #[test]
    fn test_render_prompt_contains_context_and_question() {
        let passages = vec![
            Passage::new("Il mutuo a tasso fisso ha rata costante."),
            Passage::new("Lo spread è il margine della banca."),
        ];

        let prompt = render_prompt("Cos'è lo spread?", &passages).unwrap();
        assert!(prompt.system.starts_with("Use the following pieces of context"));
        assert!(prompt.system.contains("Il mutuo a tasso fisso ha rata costante."));
        assert!(prompt.system.contains("Lo spread è il margine della banca."));
        assert_eq!(prompt.user, "Cos'è lo spread?");
    }

    #[test]
    fn test_render_prompt_does_not_escape_markup() {
        let passages = vec![Passage::new("Rata < 30% & reddito \"netto\"")];
        let prompt = render_prompt("q", &passages).unwrap();
        assert!(prompt.system.contains("Rata < 30% & reddito \"netto\""));
    }

    #[test]
    fn test_render_prompt_with_no_passages() {
        let prompt = render_prompt("Domanda", &[]).unwrap();
        assert!(prompt.system.ends_with("----------------\n"));
    }
}
