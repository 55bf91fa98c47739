use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatChoice, ChatCompletion, ChatCompletionBackend, ChatMessage, ChatRequest};
use crate::config::ModelConfig;
use crate::error::{DoclingoError, Result};
use crate::setup::ModelLocator;

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_ctx: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<ChatMessage>,
    #[serde(default)]
    done: bool,
}

impl From<OllamaChatResponse> for ChatCompletion {
    fn from(response: OllamaChatResponse) -> Self {
        Self {
            choices: response
                .message
                .map(|message| vec![ChatChoice { message }])
                .unwrap_or_default(),
        }
    }
}

/// Chat completions from a local ollama server (`/api/chat`)
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: ModelLocator::from_config(config).ollama_reference(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn request_body<'a>(&'a self, request: &'a ChatRequest) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &self.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                num_ctx: request.context_window,
            },
        }
    }
}

#[async_trait]
impl ChatCompletionBackend for OllamaBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let url = self.url("/api/chat");
        debug!("Sending chat request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DoclingoError::Backend(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| DoclingoError::Backend(format!("Failed to parse response: {}", e)))?;

        if !chat_response.done {
            debug!("Ollama reported an unfinished response");
        }
        Ok(chat_response.into())
    }

    async fn check_availability(&self) -> Result<()> {
        let response = self
            .client
            .post(self.url("/api/show"))
            .json(&json!({ "name": self.model }))
            .send()
            .await
            .map_err(|e| DoclingoError::Backend(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.model);
            Ok(())
        } else {
            Err(DoclingoError::ModelUnavailable(format!(
                "Ollama model '{}' not found. Pull it first: ollama pull {}",
                self.model, self.model
            )))
        }
    }

    async fn pull_model(&self) -> Result<()> {
        info!("Pulling ollama model '{}'", self.model);

        // Pulls can take far longer than a chat request, so no client timeout here
        let response = Client::new()
            .post(self.url("/api/pull"))
            .json(&json!({ "name": self.model, "stream": false }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DoclingoError::ModelUnavailable(format!(
                "Failed to pull '{}': {} {}",
                self.model, status, error_text
            )));
        }
        Ok(())
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
