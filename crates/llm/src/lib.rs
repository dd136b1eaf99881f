//! LLM integration crate for the FAQ bot.
//!
//! Provides a provider-agnostic client trait used to enrich retrieved FAQ
//! answers with a generative model.
//!
//! # Providers
//! - **OpenAI**: chat completions API
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use faqbot_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("How much does plumbing cost?", "llama3.2")
//!     .with_grounding("Minor fixes cost $100 to $200.");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod http;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
