//! Turns an uploaded image plus description into a diagnosis from the completion API.
//!
//! The image is accepted and accounted for in logs but never forwarded upstream;
//! the model only sees the caller's description.

use crate::{
    Error, Result,
    config::LlmConfig,
    llm::{ChatCompletionRequest, ChatMessage, HttpLlmClient, LlmClient},
};
use axum::body::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

pub const ANALYSIS_INSTRUCTIONS: &str = "Provide a detailed analysis of this skin condition. \
Structure the response with key observations, explanations, and final recommendations.";

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: Bytes,
    pub image_filename: Option<String>,
    pub image_content_type: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub text: String,
}

pub fn build_prompt(description: &str) -> String {
    format!("{} The image shows: {}", ANALYSIS_INSTRUCTIONS, description)
}

pub struct DiagnosisService {
    llm_client: Arc<dyn LlmClient>,
    config: LlmConfig,
}

impl DiagnosisService {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let llm_client = Arc::new(HttpLlmClient::new(&config)?);
        Ok(Self::with_client(config, llm_client))
    }

    pub fn with_client(config: LlmConfig, llm_client: Arc<dyn LlmClient>) -> Self {
        Self { llm_client, config }
    }

    pub fn completion_request(&self, description: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(description))],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<Diagnosis> {
        debug!(
            "Analyzing image {:?} ({} bytes, {:?}) with {} char description",
            request.image_filename,
            request.image.len(),
            request.image_content_type,
            request.description.chars().count()
        );

        let completion = self
            .llm_client
            .create_chat_completion(self.completion_request(&request.description))
            .await?;

        let text = completion
            .first_content()
            .ok_or_else(|| Error::malformed("No response from model."))?
            .to_string();

        info!("Received diagnosis ({} chars)", text.chars().count());

        Ok(Diagnosis { text })
    }
}
