use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::error::{DoclingoError, Result};
use crate::translate::ChatCompletionBackend;

/// Where a GGUF model lives: a repository plus a file name or pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocator {
    pub repository: String,
    pub file: String,
}

impl ModelLocator {
    pub fn new(repository: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            repository: repository.into().trim().to_string(),
            file: file.into().trim().to_string(),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.repository.clone(), config.file.clone())
    }

    /// Quantization tag named by the file pattern, e.g. `*q8_0.gguf` → `Q8_0`
    pub fn quantization(&self) -> Option<String> {
        let stem = self.file.trim_start_matches('*');
        let stem = match stem.len().checked_sub(".gguf".len()) {
            Some(cut) if stem.is_char_boundary(cut) && stem[cut..].eq_ignore_ascii_case(".gguf") => {
                &stem[..cut]
            }
            _ => stem,
        };

        let tag = stem.rsplit(['-', '.']).next()?.to_uppercase();
        looks_like_quantization(&tag).then_some(tag)
    }

    /// Model name as ollama expects it.
    ///
    /// Hugging Face repositories become `hf.co/<repo>[:<QUANT>]`; plain names
    /// such as `llama3.2:3b` are used as they are.
    pub fn ollama_reference(&self) -> String {
        let repository = self
            .repository
            .strip_prefix("https://")
            .unwrap_or(self.repository.as_str())
            .replacen("huggingface.co/", "hf.co/", 1);

        let base = if repository.starts_with("hf.co/") {
            repository
        } else if repository.contains('/') {
            format!("hf.co/{}", repository)
        } else {
            return repository;
        };

        match self.quantization() {
            Some(tag) if !base.contains(':') => format!("{}:{}", base, tag),
            _ => base,
        }
    }

    /// File pattern when one is given, the repository otherwise
    pub fn file_or_repository(&self) -> &str {
        if self.file.is_empty() {
            &self.repository
        } else {
            &self.file
        }
    }

    /// Command line that starts llama-server with this model
    pub fn llama_server_command(&self, context_window: usize) -> String {
        let model = match self.quantization() {
            Some(tag) => format!("{}:{}", self.repository, tag),
            None => self.repository.clone(),
        };
        format!("llama-server -hf {} -c {}", model, context_window)
    }
}

fn looks_like_quantization(tag: &str) -> bool {
    let digits_after = |prefix: &str| {
        tag.strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
    };
    digits_after("Q") || digits_after("IQ") || matches!(tag, "F16" | "F32" | "BF16")
}

/// Makes sure the configured model can be served before translating
pub struct ModelSetup {
    config: ModelConfig,
}

impl ModelSetup {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Check the backend; pull the model when it is missing and pulling is enabled
    pub async fn prepare(&self, backend: &dyn ChatCompletionBackend) -> Result<()> {
        info!("Checking model '{}'", backend.model_name());

        match backend.check_availability().await {
            Ok(()) => {}
            Err(DoclingoError::ModelUnavailable(reason)) if self.config.pull_missing => {
                warn!("{}", reason);
                self.pull_with_progress(backend).await?;
                backend.check_availability().await?;
            }
            Err(e) => return Err(e),
        }

        info!("Context window is set to {}", self.config.context_window);
        Ok(())
    }

    async fn pull_with_progress(&self, backend: &dyn ChatCompletionBackend) -> Result<()> {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Pulling {}", backend.model_name()));
        pb.enable_steady_tick(Duration::from_millis(120));

        let result = backend.pull_model().await;
        match &result {
            Ok(()) => pb.finish_with_message(format!("Pulled {}", backend.model_name())),
            Err(_) => pb.abandon_with_message(format!("Failed to pull {}", backend.model_name())),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::translate::MockChatCompletionBackend;

    #[test]
    fn test_quantization_from_file_pattern() {
        let cases = [
            ("*q8_0.gguf", Some("Q8_0")),
            ("Llama-3.2-1B-Instruct-Q4_K_M.gguf", Some("Q4_K_M")),
            ("model.IQ3_XS.GGUF", Some("IQ3_XS")),
            ("phi-3-mini-f16.gguf", Some("F16")),
            ("model.gguf", None),
            ("", None),
        ];
        for (file, expected) in cases {
            let locator = ModelLocator::new("org/repo", file);
            assert_eq!(locator.quantization().as_deref(), expected, "{}", file);
        }
    }

    #[test]
    fn test_ollama_reference() {
        assert_eq!(
            ModelLocator::new("Qwen/Qwen2.5-1.5B-Instruct-GGUF", "*q8_0.gguf").ollama_reference(),
            "hf.co/Qwen/Qwen2.5-1.5B-Instruct-GGUF:Q8_0"
        );
        assert_eq!(
            ModelLocator::new("https://huggingface.co/org/repo", "").ollama_reference(),
            "hf.co/org/repo"
        );
        assert_eq!(
            ModelLocator::new("hf.co/org/repo:Q4_K_M", "*q8_0.gguf").ollama_reference(),
            "hf.co/org/repo:Q4_K_M"
        );
        assert_eq!(ModelLocator::new("llama3.2:3b", "").ollama_reference(), "llama3.2:3b");
    }

    #[tokio::test]
    async fn test_prepare_pulls_missing_model() {
        let mut backend = MockChatCompletionBackend::new();
        let mut checks = 0;
        backend.expect_model_name().return_const("m".to_string());
        backend.expect_check_availability().times(2).returning(move || {
            checks += 1;
            if checks == 1 {
                Err(DoclingoError::ModelUnavailable("missing".to_string()))
            } else {
                Ok(())
            }
        });
        backend.expect_pull_model().times(1).returning(|| Ok(()));

        let setup = ModelSetup::new(Config::default().model);
        tokio_test::assert_ok!(setup.prepare(&backend).await);
    }

    #[tokio::test]
    async fn test_prepare_without_pull_reports_unavailable() {
        let mut backend = MockChatCompletionBackend::new();
        backend.expect_model_name().return_const("m".to_string());
        backend
            .expect_check_availability()
            .returning(|| Err(DoclingoError::ModelUnavailable("missing".to_string())));
        backend.expect_pull_model().never();

        let mut config = Config::default().model;
        config.pull_missing = false;
        let err = ModelSetup::new(config).prepare(&backend).await.unwrap_err();
        assert!(matches!(err, DoclingoError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_prepare_propagates_connection_errors() {
        let mut backend = MockChatCompletionBackend::new();
        backend.expect_model_name().return_const("m".to_string());
        backend
            .expect_check_availability()
            .returning(|| Err(DoclingoError::Backend("connection refused".to_string())));
        backend.expect_pull_model().never();

        let err = ModelSetup::new(Config::default().model).prepare(&backend).await.unwrap_err();
        assert!(matches!(err, DoclingoError::Backend(_)));
    }
}
