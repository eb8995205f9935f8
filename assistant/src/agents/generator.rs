//! Answer generation through the Google Gemini API.
//!
//! Auth is a `?key=` query parameter and the request/response shapes follow
//! the `generateContent` endpoint: `contents[].parts[].text` in,
//! `candidates[0].content.parts[].text` out. The system prompt, retrieved
//! context and user question are composed into a single user part.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::GenerationError;

const SYSTEM_PROMPT: &str = "You are a friendly and helpful university admissions assistant \
for the University of Agriculture, Faisalabad. Your task is to answer the user's question \
based only on the context provided. Do not add any information that is not in the context. \
If the information is not available in the context, say that you do not have that \
information.\n\nPlease provide clear, helpful, and accurate information based on the \
context. Be conversational and welcoming, as this is a WhatsApp conversation.";

/// Boundary for the generation call, so the pipeline can be exercised
/// without network access.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, query: &str, context: &str) -> Result<String, GenerationError>;
}

pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.generation_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
            api_key: config.google_api_key.clone(),
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, query: &str, context: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: build_prompt(query, context),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint_url())
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status {
                code: status.as_u16(),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let text = extract_text(&parsed)?;
        debug!(chars = text.len(), "generation complete");
        Ok(text)
    }
}

fn map_send_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Http(err.to_string())
    }
}

fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nContext:\n{context}\n\nUser Question: {query}\n\n\
         Please provide a helpful response based on the context above."
    )
}

fn extract_text(response: &GenerateContentResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| GenerationError::Malformed("response carried no candidates".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .map(|part| part.text.as_str())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Malformed(
            "candidate carried no text parts".to_string(),
        ));
    }
    Ok(text.to_string())
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}
