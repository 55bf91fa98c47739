use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatCompletion, ChatCompletionBackend, ChatMessage, ChatRequest};
use crate::config::ModelConfig;
use crate::error::{DoclingoError, Result};
use crate::setup::ModelLocator;

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Chat completions from llama.cpp's `llama-server` (OpenAI-compatible API).
///
/// The server loads its model and fixes the context window at start-up, so
/// the request only names the model file.
pub struct LlamaServerBackend {
    client: Client,
    endpoint: String,
    model: String,
    start_hint: String,
}

impl LlamaServerBackend {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let locator = ModelLocator::from_config(config);

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: locator.file_or_repository().to_string(),
            start_hint: locator.llama_server_command(config.context_window),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

#[async_trait]
impl ChatCompletionBackend for LlamaServerBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let url = self.url("/v1/chat/completions");
        debug!("Sending chat request to: {}", url);

        let body = OpenAiChatRequest {
            model: &self.model,
            messages: &request.messages,
            stream: false,
        };
        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DoclingoError::Backend(format!(
                "llama-server error {}: {}",
                status, error_text
            )));
        }

        response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| DoclingoError::Backend(format!("Failed to parse response: {}", e)))
    }

    async fn check_availability(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| {
                DoclingoError::ModelUnavailable(format!(
                    "Failed to connect to llama-server ({}). Start it with: {}",
                    e, self.start_hint
                ))
            })?;

        if response.status().is_success() {
            info!("llama-server at {} is ready", self.endpoint);
            Ok(())
        } else {
            Err(DoclingoError::ModelUnavailable(format!(
                "llama-server is not ready ({})",
                response.status()
            )))
        }
    }

    async fn pull_model(&self) -> Result<()> {
        Err(DoclingoError::ModelUnavailable(format!(
            "llama-server loads its model at start-up: {}",
            self.start_hint
        )))
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
