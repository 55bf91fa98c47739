// Translation through a chat-completion model
//
// - ChatCompletionBackend: narrow capability over the model server
// - ollama / llama_server: HTTP backends for locally hosted models
// - prompt: the two-message translation exchange
// - chunk: token estimates and sentence-bounded batching
// - session: TranslationSession, forward and reverse entry points

pub mod chunk;
pub mod llama_server;
pub mod ollama;
pub mod prompt;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

pub use chunk::{chunk_sentences, estimate_tokens};
pub use prompt::{build_messages, instruction};
pub use session::{TranslationExchange, TranslationSession};

use crate::config::{BackendKind, ModelConfig};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// OpenAI-style servers send `"content": null` for an empty answer
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Context window the model should run with, in tokens
    pub context_window: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl ChatCompletion {
    /// Content of the first choice, if the model produced any
    pub fn into_first_content(self) -> Option<String> {
        self.choices.into_iter().next().map(|choice| choice.message.content)
    }
}

/// Which way a translation goes relative to the session's language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Source language to target language
    Forward,
    /// Target language back to source language
    Reverse,
}

/// Chat-completion capability of a model server
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletionBackend: Send + Sync {
    /// Run one chat completion and return every choice the model produced
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Check that the server is reachable and the model can be served
    async fn check_availability(&self) -> Result<()>;

    /// Fetch the model onto the server
    async fn pull_model(&self) -> Result<()>;

    /// Model reference sent with each request
    fn model_name(&self) -> String;
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend based on the configured server kind
    pub fn create_backend(config: &ModelConfig) -> Result<Box<dyn ChatCompletionBackend>> {
        let backend: Box<dyn ChatCompletionBackend> = match config.backend {
            BackendKind::Ollama => Box::new(ollama::OllamaBackend::new(config)?),
            BackendKind::LlamaServer => Box::new(llama_server::LlamaServerBackend::new(config)?),
        };
        Ok(backend)
    }
}
