//! HTTP plumbing shared by the providers.

use faqbot_core::AppError;
use reqwest::StatusCode;
use std::time::Duration;

/// Request timeout applied when the config does not set one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build a reqwest client with a request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport error onto the LLM error variants.
pub fn classify_send_error(provider: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::LlmTimeout(format!("{} did not respond in time: {}", provider, err))
    } else {
        AppError::Llm(format!("Failed to send request to {}: {}", provider, err))
    }
}

/// Map a non-success HTTP status onto the LLM error variants.
pub fn classify_status(provider: &str, status: StatusCode, body: &str) -> AppError {
    let message = format!("{} API error ({}): {}", provider, status, body);

    match status {
        StatusCode::TOO_MANY_REQUESTS => AppError::LlmRateLimited(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::LlmAuth(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => AppError::LlmTimeout(message),
        _ => AppError::Llm(message),
    }
}

/// Read the body of a failed response and classify it.
pub async fn error_from_response(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    classify_status(provider, status, &body)
}
