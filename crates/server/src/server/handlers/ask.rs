use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Form;
use mutuo_knowledge::{aggregate, render_citations, CitationLabels};
use serde::Deserialize;

use crate::page::{Exchange, PageView};
use crate::server::errors::PageError;
use crate::state::{AppState, Status};

type PageResult = Result<(StatusCode, Html<String>), PageError>;

/// Submitted question form.
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,

    /// Present (as "on") only when the box is checked
    #[serde(default)]
    pub sources: Option<String>,
}

pub async fn show_form(State(state): State<Arc<AppState>>) -> PageResult {
    let ready = match &state.status {
        Status::Ready(ready) => ready,
        Status::Unavailable(message) => return unavailable(&state, message),
    };

    let html = state.page.render(&PageView {
        question: String::new(),
        show_sources: ready.show_sources,
        voice_agent_id: ready.voice_agent_id.clone(),
        exchange: None,
    })?;

    Ok((StatusCode::OK, Html(html)))
}

pub async fn submit(State(state): State<Arc<AppState>>, Form(form): Form<AskForm>) -> PageResult {
    let ready = match &state.status {
        Status::Ready(ready) => ready,
        Status::Unavailable(message) => return unavailable(&state, message),
    };

    let with_sources = form.sources.is_some();
    let mut view = PageView {
        question: form.question.clone(),
        show_sources: with_sources,
        voice_agent_id: ready.voice_agent_id.clone(),
        exchange: None,
    };

    // An empty input renders the form only; any other text is a question
    if !form.question.is_empty() {
        let exchange = match ready.service.ask(&form.question, with_sources).await {
            Ok(result) => {
                let citations = result
                    .sources
                    .map(|sources| render_citations(&aggregate(&sources), &CitationLabels::default()));
                Exchange::answered(&form.question, result.text, citations)
            }
            Err(e) => {
                tracing::error!("Question failed: {}", e);
                Exchange::failed(&form.question, &e)
            }
        };
        view.exchange = Some(exchange);
    }

    let html = state.page.render(&view)?;
    Ok((StatusCode::OK, Html(html)))
}

fn unavailable(state: &AppState, message: &str) -> PageResult {
    let html = state.page.render_unavailable(message)?;
    Ok((StatusCode::SERVICE_UNAVAILABLE, Html(html)))
}
