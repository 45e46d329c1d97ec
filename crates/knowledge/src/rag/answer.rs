//! Retrieval-augmented answer orchestration.

use crate::rag::prompt::render_prompt;
use crate::rag::types::{AnswerOptions, GenerationResult};
use crate::retriever::Retriever;
use mutuo_core::{AppError, AppResult};
use mutuo_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Answer `question` from the passages `retriever` returns.
///
/// One retrieval, one prompt, one generation call. A failed generation is
/// terminal for this request; nothing is retried.
///
/// When `with_sources` is set, the result carries the exact passage list
/// used to build the prompt.
///
/// # Errors
/// * `AppError::Retrieval` - the retriever failed
/// * `AppError::Generation` - the generator failed
pub async fn answer(
    question: &str,
    retriever: &dyn Retriever,
    generator: &dyn LlmClient,
    options: &AnswerOptions,
    with_sources: bool,
) -> AppResult<GenerationResult> {
    tracing::info!("Answering question ({} chars)", question.chars().count());

    let passages = retriever.retrieve(question).await?;
    let prompt = render_prompt(question, &passages)?;

    let mut request = LlmRequest::new(prompt.user, &options.model)
        .with_system(prompt.system)
        .with_temperature(options.temperature);
    if let Some(max_tokens) = options.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    let response = generator.complete(&request).await.map_err(|e| match e {
        AppError::Generation(_) => e,
        other => AppError::Generation(other.to_string()),
    })?;

    tracing::info!(
        "Generated answer with {} ({} passages in context)",
        generator.provider_name(),
        passages.len()
    );

    if with_sources {
        Ok(GenerationResult::with_sources(response.content, passages))
    } else {
        Ok(GenerationResult::text_only(response.content))
    }
}

/// Answer service wired once at startup.
///
/// Holds the retriever and generator as injected collaborators; both are
/// read-only, so the service is shared across requests without locking.
#[derive(Clone)]
pub struct AnswerService {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn LlmClient>,
    options: AnswerOptions,
}

impl AnswerService {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn LlmClient>,
        options: AnswerOptions,
    ) -> Self {
        Self {
            retriever,
            generator,
            options,
        }
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    /// Run one question/answer cycle.
    pub async fn ask(&self, question: &str, with_sources: bool) -> AppResult<GenerationResult> {
        answer(
            question,
            self.retriever.as_ref(),
            self.generator.as_ref(),
            &self.options,
            with_sources,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Passage;
    use mutuo_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    struct FixedRetriever(Vec<Passage>);

    #[async_trait::async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _question: &str) -> AppResult<Vec<Passage>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRetriever;

    #[async_trait::async_trait]
    impl Retriever for FailingRetriever {
        async fn retrieve(&self, _question: &str) -> AppResult<Vec<Passage>> {
            Err(AppError::Retrieval("embeddings unavailable".to_string()))
        }
    }

    /// Records the last request and replies with a fixed outcome.
    struct RecordingGenerator {
        reply: Result<String, String>,
        last: Mutex<Option<LlmRequest>>,
        calls: Mutex<u32>,
    }

    impl RecordingGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                last: Mutex::new(None),
                calls: Mutex::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                last: Mutex::new(None),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for RecordingGenerator {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.calls.lock().unwrap() += 1;
            *self.last.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    content: text.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                Err(message) => Err(AppError::Config(message.clone())),
            }
        }
    }

    fn passages() -> Vec<Passage> {
        vec![
            Passage::new("La surroga è gratuita.").with_source("docs/surroga.pdf"),
            Passage::new("Il notaio è scelto dal cliente.").with_source("docs/notaio.pdf"),
        ]
    }

    #[tokio::test]
    async fn test_answer_with_sources_returns_prompt_passages() {
        let retriever = FixedRetriever(passages());
        let generator = RecordingGenerator::replying("Sì, è gratuita.");

        let result = answer(
            "La surroga costa?",
            &retriever,
            &generator,
            &AnswerOptions::default(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(result.text, "Sì, è gratuita.");
        assert_eq!(result.sources, Some(passages()));

        let request = generator.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.prompt, "La surroga costa?");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.1));
        let system = request.system.unwrap();
        assert!(system.contains("La surroga è gratuita."));
        assert!(system.contains("Il notaio è scelto dal cliente."));
    }

    #[tokio::test]
    async fn test_answer_without_sources() {
        let retriever = FixedRetriever(passages());
        let generator = RecordingGenerator::replying("Risposta");

        let result = answer("Domanda", &retriever, &generator, &AnswerOptions::default(), false)
            .await
            .unwrap();

        assert_eq!(result, GenerationResult::text_only("Risposta"));
    }

    #[tokio::test]
    async fn test_generator_failure_is_generation_error_without_retry() {
        let retriever = FixedRetriever(passages());
        let generator = RecordingGenerator::failing("quota exceeded");

        let result = answer("Domanda", &retriever, &generator, &AnswerOptions::default(), true).await;

        match result {
            Err(AppError::Generation(message)) => assert!(message.contains("quota exceeded")),
            other => panic!("Expected generation error, got {:?}", other),
        }
        assert_eq!(*generator.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retrieval_failure_skips_generation() {
        let generator = RecordingGenerator::replying("unused");

        let result = answer(
            "Domanda",
            &FailingRetriever,
            &generator,
            &AnswerOptions::default(),
            true,
        )
        .await;

        assert!(matches!(result, Err(AppError::Retrieval(_))));
        assert_eq!(*generator.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_retrieval_still_generates() {
        let generator = RecordingGenerator::replying("Non lo so.");

        let service = AnswerService::new(
            Arc::new(FixedRetriever(Vec::new())),
            Arc::new(generator),
            AnswerOptions {
                max_tokens: Some(300),
                ..AnswerOptions::default()
            },
        );

        let result = service.ask("Domanda", true).await.unwrap();
        assert_eq!(result.sources, Some(Vec::new()));
        assert_eq!(service.options().max_tokens, Some(300));
    }
}
