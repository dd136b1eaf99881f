//! OpenAI chat completions provider.
//!
//! The grounding answer is sent as an assistant message after the user's
//! question, so the model continues from the stored FAQ answer.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::http;
use faqbot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const CHAT_ENDPOINT: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI chat completions client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_config(
            DEFAULT_OPENAI_URL,
            api_key,
            Duration::from_secs(http::DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client with a custom base URL (Azure proxies, local gateways) and timeout.
    pub fn with_config(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: http::build_client(timeout)?,
        })
    }

    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(3);

        if let Some(ref system) = request.system {
            messages.push(ChatMessage::new("system", system.clone()));
        }
        messages.push(ChatMessage::new("user", request.prompt.clone()));
        if let Some(ref grounding) = request.grounding {
            messages.push(ChatMessage::new("assistant", grounding.clone()));
        }

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(&self, response: ChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("OpenAI response contained no choices".to_string()))?;

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

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending chat completion request to OpenAI");

        let chat_request = self.to_chat_request(request);
        let url = format!("{}{}", self.base_url, CHAT_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| http::classify_send_error("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response("OpenAI", response).await);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let response = self.convert_response(chat_response)?;

        tracing::debug!(
            "Received completion from OpenAI ({} tokens)",
            response.usage.total_tokens
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new("sk-test").unwrap()
    }

    #[test]
    fn test_message_order() {
        let request = LlmRequest::new("How much does plumbing cost?", "gpt-4")
            .with_system("You are a helpful assistant.")
            .with_grounding("$100 to $200");

        let chat = client().to_chat_request(&request);
        let roles: Vec<&str> = chat.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(chat.messages[2].content, "$100 to $200");
    }

    #[test]
    fn test_message_order_without_optional_parts() {
        let chat = client().to_chat_request(&LlmRequest::new("hi", "gpt-4"));
        assert_eq!(chat.messages, vec![ChatMessage::new("user", "hi")]);
    }

    #[test]
    fn test_convert_response() {
        let raw = serde_json::json!({
            "model": "gpt-4",
            "choices": [{"message": {"role": "assistant", "content": "Around $150."}}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25}
        });
        let parsed: ChatResponse = serde_json::from_value(raw).unwrap();

        let response = client().convert_response(parsed).unwrap();
        assert_eq!(response.content, "Around $150.");
        assert_eq!(response.usage.total_tokens, 25);
    }

    #[test]
    fn test_convert_response_without_choices() {
        let parsed: ChatResponse =
            serde_json::from_value(serde_json::json!({"model": "gpt-4", "choices": []})).unwrap();
        assert!(client().convert_response(parsed).is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            OpenAiClient::with_config("http://gateway/", "k", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://gateway");
    }
}
