use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, error, info};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}

/// Calls an OpenAI-compatible `/chat/completions` endpoint once per request, without retries.
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl HttpLlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config("Groq API key not found"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.completions_url(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else if e.is_decode() {
            Error::malformed(e.to_string())
        } else {
            Error::Network(e)
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        info!("Sending request to completion API");
        debug!(
            "Chat completion for model {} with {} messages",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP Error: {} - {}", status.as_u16(), body);
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        debug!(
            "Received chat completion response with {} choices",
            completion.choices.len()
        );

        Ok(completion)
    }
}
