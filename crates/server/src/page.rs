//! HTML page rendering.
//!
//! One handlebars template covers every state of the page. Handlebars'
//! default HTML escaping applies to question and citation text; the answer
//! goes through the sanitizing markdown renderer instead.

use handlebars::Handlebars;
use mutuo_core::{AppError, AppResult};
use mutuo_knowledge::{CitationBlock, RenderedCitation};
use serde::Serialize;

use crate::markdown::render_answer;

pub const TITLE: &str = "Assistente per Mutui e Finanziamenti";
pub const SUBTITLE: &str = "Fai una domanda su mutui, finanziamenti, ecc.";

/// Shown while the answer is being generated.
pub const PENDING_TEXT: &str = "Generazione della risposta...";

/// Script that defines the `<elevenlabs-convai>` element.
pub const WIDGET_SCRIPT_URL: &str = "https://elevenlabs.io/convai-widget/index.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="it">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <style>
    body { font-family: sans-serif; margin: 2rem auto; max-width: 60rem; padding: 0 1rem; }
    .error { color: #b00020; }
    .pending { font-style: italic; }
  </style>
</head>
<body>
  <h1>{{title}}</h1>
{{#if unavailable}}
  <p class="error">{{unavailable}}</p>
{{else}}
  <h3>{{subtitle}}</h3>
  <form method="post" action="/" onsubmit="this.querySelector('button').disabled = true; document.getElementById('pending').hidden = false;">
    <label for="question">Inserisci la tua domanda qui</label>
    <input type="text" id="question" name="question" value="{{question}}" size="80">
    <label><input type="checkbox" name="sources"{{#if show_sources}} checked{{/if}}> mostra le fonti</label>
    <button type="submit">Invia</button>
  </form>
  <p id="pending" class="pending" hidden>{{pending_text}}</p>
{{#if exchange}}
  <section id="answer">
    <p><strong>Q:</strong> {{exchange.question}}</p>
{{#if exchange.error}}
    <p><strong>A:</strong> <span class="error">{{exchange.error}}</span></p>
{{else}}
    <div class="answer"><p><strong>A:</strong></p>{{{exchange.answer_html}}}</div>
{{/if}}
{{#if exchange.citations}}
    <div id="sources">
      <p><strong>Fonti:</strong></p>
{{#if exchange.citations.no_sources}}
      <p>{{exchange.citations.no_sources}}</p>
{{else}}
      <ul>
{{#each exchange.citations.entries}}
        <li><a href="{{href}}">{{name}}</a>{{#if suffix}} ({{suffix}}){{/if}}</li>
{{/each}}
      </ul>
{{/if}}
    </div>
{{/if}}
  </section>
{{/if}}
  <elevenlabs-convai agent-id="{{voice_agent_id}}"></elevenlabs-convai>
  <script src="{{widget_script_url}}" async type="text/javascript"></script>
{{/if}}
</body>
</html>
"#;

/// Citation section as seen by the template.
#[derive(Debug, Clone, Serialize)]
pub struct CitationsView {
    pub no_sources: Option<String>,
    pub entries: Vec<RenderedCitation>,
}

impl From<CitationBlock> for CitationsView {
    fn from(block: CitationBlock) -> Self {
        match block {
            CitationBlock::NoSources(text) => Self {
                no_sources: Some(text),
                entries: Vec::new(),
            },
            CitationBlock::Entries(entries) => Self {
                no_sources: None,
                entries,
            },
        }
    }
}

/// One submitted question and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub question: String,
    /// Sanitized HTML of the generated answer
    pub answer_html: Option<String>,
    pub error: Option<String>,
    pub citations: Option<CitationsView>,
}

impl Exchange {
    pub fn answered(question: &str, answer: String, citations: Option<CitationBlock>) -> Self {
        Self {
            question: question.to_string(),
            answer_html: Some(render_answer(&answer)),
            error: None,
            citations: citations.map(CitationsView::from),
        }
    }

    pub fn failed(question: &str, error: &AppError) -> Self {
        Self {
            question: question.to_string(),
            answer_html: None,
            error: Some(error.to_string()),
            citations: None,
        }
    }
}

/// Form page data.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    pub question: String,
    pub show_sources: bool,
    pub voice_agent_id: String,
    pub exchange: Option<Exchange>,
}

#[derive(Serialize)]
struct TemplateData<'a> {
    title: &'a str,
    subtitle: &'a str,
    pending_text: &'a str,
    unavailable: Option<&'a str>,
    question: &'a str,
    show_sources: bool,
    voice_agent_id: &'a str,
    widget_script_url: &'a str,
    exchange: Option<&'a Exchange>,
}

/// Compiled page template.
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string("page", PAGE_TEMPLATE)
            .map_err(|e| AppError::Config(format!("Failed to register page template: {}", e)))?;
        Ok(Self { registry })
    }

    /// Render the question form, with the last exchange when present.
    pub fn render(&self, view: &PageView) -> AppResult<String> {
        self.render_data(&TemplateData {
            title: TITLE,
            subtitle: SUBTITLE,
            pending_text: PENDING_TEXT,
            unavailable: None,
            question: &view.question,
            show_sources: view.show_sources,
            voice_agent_id: &view.voice_agent_id,
            widget_script_url: WIDGET_SCRIPT_URL,
            exchange: view.exchange.as_ref(),
        })
    }

    /// Render the title and a startup error, without the form.
    pub fn render_unavailable(&self, message: &str) -> AppResult<String> {
        self.render_data(&TemplateData {
            title: TITLE,
            subtitle: SUBTITLE,
            pending_text: PENDING_TEXT,
            unavailable: Some(message),
            question: "",
            show_sources: false,
            voice_agent_id: "",
            widget_script_url: WIDGET_SCRIPT_URL,
            exchange: None,
        })
    }

    fn render_data(&self, data: &TemplateData<'_>) -> AppResult<String> {
        self.registry
            .render("page", data)
            .map_err(|e| AppError::Serialization(format!("Failed to render page: {}", e)))
    }
}
