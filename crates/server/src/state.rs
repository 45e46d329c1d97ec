//! Startup wiring and shared application state.
//!
//! Startup runs strictly in order: configuration, question embedder, index,
//! generator. The first failure stops the sequence, and every later request
//! renders only that error.

use std::sync::Arc;

use mutuo_core::{AppConfig, AppError, AppResult};
use mutuo_knowledge::{create_provider, open_index, AnswerOptions, AnswerService};
use mutuo_llm::{create_client, ClientOptions};

use crate::page::PageRenderer;

/// What the service can do after startup.
pub enum Status {
    Ready(Ready),
    /// Startup failed; carries the message shown on every page.
    Unavailable(String),
}

/// Collaborators of a successfully started service.
pub struct Ready {
    pub service: AnswerService,
    pub show_sources: bool,
    pub voice_agent_id: String,
}

pub struct AppState {
    pub status: Status,
    pub page: PageRenderer,
}

impl AppState {
    /// Build the state from the outcome of configuration loading.
    pub fn initialize(config: AppResult<AppConfig>) -> AppResult<Arc<Self>> {
        let page = PageRenderer::new()?;

        let status = match config.and_then(|config| bootstrap(&config)) {
            Ok(ready) => {
                tracing::info!("Service ready");
                Status::Ready(ready)
            }
            Err(e) => {
                tracing::error!("Startup failed: {}", e);
                Status::Unavailable(e.to_string())
            }
        };

        Ok(Arc::new(Self { status, page }))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, Status::Ready(_))
    }
}

/// Wire the answer service from a validated configuration.
///
/// No network call happens here; providers connect on the first question.
pub fn bootstrap(config: &AppConfig) -> AppResult<Ready> {
    if config.api_key.trim().is_empty() {
        return Err(AppError::MissingCredential(
            mutuo_core::config::API_KEY_ENV.to_string(),
        ));
    }

    let options = ClientOptions::new(config.api_key.clone(), config.request_timeout_secs)
        .with_base_url(config.api_base_url.clone());

    let embedder = create_provider(
        &config.embedding_provider,
        &config.embedding_model,
        options.clone(),
    )?;
    let index = open_index(&config.index_dir, embedder, config.top_k)?;
    if index.is_empty() {
        tracing::warn!("Index at {:?} holds no passages", index.path());
    }
    let generator = create_client("openai", options)?;

    let service = AnswerService::new(
        Arc::new(index),
        generator,
        AnswerOptions {
            model: config.chat_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        },
    );

    let options = service.options();
    tracing::info!(
        "Using chat model {} (temperature {}, max tokens {:?}) with top_k {}",
        options.model,
        options.temperature,
        options.max_tokens,
        config.top_k
    );

    Ok(Ready {
        service,
        show_sources: config.show_sources,
        voice_agent_id: config.voice_agent_id.clone(),
    })
}
