//! OpenAI-compatible chat-completions provider.
//!
//! API: `POST {base_url}/chat/completions` with bearer authentication.

use crate::client::{ClientOptions, LlmClient, LlmRequest, LlmResponse, LlmUsage};
use mutuo_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat message in the OpenAI wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Error envelope returned by the API on non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// OpenAI chat client.
pub struct OpenAiClient {
    /// Base URL, without trailing slash
    base_url: String,

    api_key: String,

    /// HTTP client with a bounded request timeout
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client from connection options.
    pub fn new(options: ClientOptions) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            api_key: options.api_key,
            client,
        })
    }

    /// Convert LlmRequest to the chat-completions format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Resolve the wire response into an LlmResponse.
    fn convert_response(&self, response: ChatCompletionResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Generation("Response contained no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model,
            usage,
        })
    }
}

/// Extract the provider's error message, falling back to the raw body.
fn describe_error_body(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to OpenAI (model: {})", request.model);
        tracing::debug!(
            "Request prompt length: {}, system length: {}",
            request.prompt.len(),
            request.system.as_ref().map(String::len).unwrap_or(0)
        );

        let chat_request = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to reach OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "OpenAI API error ({}): {}",
                status,
                describe_error_body(&error_text)
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse OpenAI response: {}", e)))?;

        let converted = self.convert_response(chat_response)?;

        tracing::info!("Received completion from OpenAI");
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            converted.usage.prompt_tokens,
            converted.usage.completion_tokens,
            converted.usage.total_tokens
        );

        Ok(converted)
    }
}
