//! Text-generation API client used by the water-need advisor

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::{AppError, AppResult};

/// Single-turn text completion
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// Messages-style API client
#[derive(Clone)]
pub struct TextGenerationClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl TextGenerationClient {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no API key is configured.
    pub fn from_config(config: &AiConfig) -> AppResult<Option<Self>> {
        let Some(api_key) = config.credential() else {
            return Ok(None);
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|_| AppError::Configuration("Invalid AI API key".to_string()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("AI client: {}", e)))?;

        Ok(Some(Self {
            client,
            endpoint: config.api_endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }))
    }
}

#[async_trait]
impl TextGenerator for TextGenerationClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("AI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "AI API error: {} - {}",
                status, body
            )));
        }

        let response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse AI response: {}", e)))?;

        Ok(response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}
