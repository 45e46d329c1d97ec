//! Text-generation client crate for Mutuo.
//!
//! Defines the provider-agnostic [`LlmClient`] seam used by the answer
//! service, and an OpenAI-compatible chat-completions implementation.
//!
//! # Example
//! ```no_run
//! use mutuo_llm::{ClientOptions, LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new(ClientOptions::new("sk-...", 60))?;
//! let request = LlmRequest::new("Che cos'è il TAEG?", "gpt-4o-mini");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ClientOptions, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::OpenAiClient;
