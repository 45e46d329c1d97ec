//! LLM provider factory.
//!
//! Creates generation clients from a provider name and connection options.

use crate::client::{ClientOptions, LlmClient};
use crate::providers::OpenAiClient;
use mutuo_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai")
/// * `options` - Endpoint, credential and timeout
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown, the credential is
/// empty, or the HTTP client cannot be built.
pub fn create_client(provider: &str, options: ClientOptions) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            if options.api_key.trim().is_empty() {
                return Err(AppError::Config(
                    "OpenAI provider requires API key".to_string(),
                ));
            }
            let client = OpenAiClient::new(options)?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_client() {
        let client = create_client("openai", ClientOptions::new("sk-test", 30)).unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", ClientOptions::new("", 30)) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", ClientOptions::new("sk-test", 30)) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
