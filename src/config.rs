use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{DoclingoError, Result};

// Default values for optional model settings
fn default_context_window() -> usize {
    512
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_pull_missing() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub languages: LanguageConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language the documents are written in (free-form, used in prompts)
    pub source: String,
    /// Language to translate into (free-form, used in prompts)
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Which chat-completion server hosts the model
    #[serde(default)]
    pub backend: BackendKind,
    /// Base URL of the backend server
    pub endpoint: String,
    /// Model repository (e.g. a Hugging Face repo id) or a plain ollama model name
    pub repository: String,
    /// GGUF file name or glob pattern inside the repository
    #[serde(default)]
    pub file: String,
    /// Context window size in tokens
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pull the model into ollama when it is not present yet
    #[serde(default = "default_pull_missing")]
    pub pull_missing: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Ollama server, `/api/chat`
    #[default]
    Ollama,
    /// llama.cpp `llama-server`, OpenAI-compatible `/v1/chat/completions`
    LlamaServer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Language rules used for sentence boundary detection
    #[serde(default)]
    pub language: SegmenterLanguage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmenterLanguage {
    /// Korean: plain Unicode sentence boundaries
    #[default]
    Korean,
    /// English: Unicode boundaries, re-joined after common abbreviations
    English,
    /// Any other language: plain Unicode sentence boundaries
    Generic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Token budget per translated chunk; derived from the context window when unset
    #[serde(default)]
    pub chunk_token_budget: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            languages: LanguageConfig {
                source: "Korean".to_string(),
                target: "English".to_string(),
            },
            model: ModelConfig {
                backend: BackendKind::Ollama,
                endpoint: "http://localhost:11434".to_string(),
                repository: "Qwen/Qwen2.5-1.5B-Instruct-GGUF".to_string(),
                file: "*q8_0.gguf".to_string(),
                context_window: default_context_window(),
                timeout_secs: default_timeout_secs(),
                pull_missing: default_pull_missing(),
            },
            segmenter: SegmenterConfig::default(),
            translate: TranslateConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DoclingoError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| DoclingoError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DoclingoError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DoclingoError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.languages.source.trim().is_empty() || self.languages.target.trim().is_empty() {
            return Err(DoclingoError::Config(
                "Source and target languages must not be empty".to_string(),
            ));
        }
        if self.model.context_window == 0 {
            return Err(DoclingoError::Config("Context window must be positive".to_string()));
        }
        if self.model.repository.trim().is_empty() {
            return Err(DoclingoError::Config("Model repository must not be empty".to_string()));
        }
        Ok(())
    }
}
