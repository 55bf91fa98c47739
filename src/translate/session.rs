use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::chunk::{chunk_sentences, estimate_messages, estimate_tokens, MESSAGE_OVERHEAD_TOKENS};
use super::prompt::{build_messages, instruction};
use super::{BackendFactory, ChatCompletionBackend, ChatRequest, Direction};
use crate::config::Config;
use crate::error::{DoclingoError, Result};
use crate::segment::{SegmenterFactory, SentenceSegmenter};
use crate::setup::ModelSetup;

/// One translated unit: the input and either its translation or why it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationExchange {
    pub source_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl TranslationExchange {
    pub fn is_success(&self) -> bool {
        self.translation.is_some()
    }
}

/// A fixed language pair bound to a segmenter and a chat-completion backend.
///
/// The pair never changes; translating the other way goes through
/// [`TranslationSession::translate_reverse`].
pub struct TranslationSession {
    source_language: String,
    target_language: String,
    segmenter: Box<dyn SentenceSegmenter>,
    backend: Box<dyn ChatCompletionBackend>,
    context_window: usize,
    chunk_token_budget: Option<usize>,
}

impl TranslationSession {
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        backend: Box<dyn ChatCompletionBackend>,
        segmenter: Box<dyn SentenceSegmenter>,
        context_window: usize,
    ) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            segmenter,
            backend,
            context_window,
            chunk_token_budget: None,
        }
    }

    /// Fix the per-chunk token budget instead of deriving it from the context window
    pub fn with_chunk_token_budget(mut self, budget: usize) -> Self {
        self.chunk_token_budget = Some(budget);
        self
    }

    /// Build the backend and segmenter from configuration and make sure the model is served
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend = BackendFactory::create_backend(&config.model)?;
        ModelSetup::new(config.model.clone()).prepare(backend.as_ref()).await?;
        let segmenter = SegmenterFactory::create(config.segmenter.language);

        info!(
            "Translation session ready: {} ⇄ {} using {}",
            config.languages.source,
            config.languages.target,
            backend.model_name()
        );

        let session = Self::new(
            config.languages.source.clone(),
            config.languages.target.clone(),
            backend,
            segmenter,
            config.model.context_window,
        );
        Ok(match config.translate.chunk_token_budget {
            Some(budget) => session.with_chunk_token_budget(budget),
            None => session,
        })
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Trimmed sentences of `text`, in document order
    pub fn sentences(&self, text: &str) -> Vec<String> {
        self.segmenter.segment(text)
    }

    /// Translate source-language text into the target language
    pub async fn translate(&self, prompt: &str) -> Result<String> {
        self.translate_in(Direction::Forward, prompt).await
    }

    /// Translate target-language text back into the source language
    pub async fn translate_reverse(&self, prompt: &str) -> Result<String> {
        self.translate_in(Direction::Reverse, prompt).await
    }

    /// Translate `prompt` in the given direction.
    ///
    /// Returns the first choice's content verbatim. Failures are logged and
    /// returned with their kind; nothing is retried.
    pub async fn translate_in(&self, direction: Direction, prompt: &str) -> Result<String> {
        let (from, to) = self.languages(direction);
        let messages = build_messages(from, to, prompt);

        let estimated = estimate_messages(&messages);
        if estimated > self.context_window {
            let err = DoclingoError::ContextOverflow {
                estimated,
                limit: self.context_window,
            };
            warn!("Translation {} → {} skipped: {}", from, to, err);
            return Err(err);
        }

        let request = ChatRequest {
            messages,
            context_window: self.context_window,
        };
        debug!("Translating {} characters {} → {}", prompt.chars().count(), from, to);

        let result = self.backend.complete(&request).await.and_then(|completion| {
            completion
                .into_first_content()
                .ok_or(DoclingoError::EmptyCompletion)
        });

        match result {
            Ok(translation) => {
                debug!("Translation result: {}", translation);
                Ok(translation)
            }
            Err(e) => {
                warn!("Translation {} → {} failed: {}", from, to, e);
                Err(e)
            }
        }
    }

    /// Translate each text in order; a failure is recorded and the rest still run
    pub async fn translate_sentences<S: AsRef<str>>(
        &self,
        sentences: &[S],
        direction: Direction,
    ) -> Vec<TranslationExchange> {
        let total = sentences.len();
        let mut exchanges = Vec::with_capacity(total);

        for (idx, sentence) in sentences.iter().enumerate() {
            let source_text = sentence.as_ref();
            info!("Translating unit {}/{}", idx + 1, total);

            let exchange = match self.translate_in(direction, source_text).await {
                Ok(translation) => TranslationExchange {
                    source_text: source_text.to_string(),
                    translation: Some(translation),
                    failure: None,
                },
                Err(e) => TranslationExchange {
                    source_text: source_text.to_string(),
                    translation: None,
                    failure: Some(e.to_string()),
                },
            };
            exchanges.push(exchange);
        }

        let failed = exchanges.iter().filter(|e| !e.is_success()).count();
        if failed > 0 {
            warn!("{} of {} units failed to translate", failed, total);
        }
        exchanges
    }

    /// Segment `text` and group the sentences into chunks that fit the context window
    pub fn chunks(&self, text: &str, direction: Direction) -> Vec<String> {
        let sentences = self.sentences(text);
        chunk_sentences(&sentences, self.chunk_budget(direction))
    }

    /// Segment, chunk and translate a whole text blob
    pub async fn translate_document(
        &self,
        text: &str,
        direction: Direction,
    ) -> Vec<TranslationExchange> {
        let chunks = self.chunks(text, direction);
        info!("Document split into {} chunks", chunks.len());
        self.translate_sentences(&chunks, direction).await
    }

    /// Half of what the window leaves after the instruction is kept for the answer
    fn chunk_budget(&self, direction: Direction) -> usize {
        if let Some(budget) = self.chunk_token_budget {
            return budget.max(1);
        }
        let (from, to) = self.languages(direction);
        let fixed = estimate_tokens(&instruction(from, to)) + 2 * MESSAGE_OVERHEAD_TOKENS;
        (self.context_window.saturating_sub(fixed) / 2).max(1)
    }

    fn languages(&self, direction: Direction) -> (&str, &str) {
        match direction {
            Direction::Forward => (self.source_language.as_str(), self.target_language.as_str()),
            Direction::Reverse => (self.target_language.as_str(), self.source_language.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmenterLanguage;
    use crate::translate::{ChatChoice, ChatCompletion, ChatMessage, ChatRole, MockChatCompletionBackend};

    const FORWARD: &str =
        "Translate the following text from English to Korean. Give only the translation and no meaning.";
    const REVERSE: &str =
        "Translate the following text from Korean to English. Give only the translation and no meaning.";

    fn completion(content: &str) -> ChatCompletion {
        ChatCompletion {
            choices: vec![ChatChoice {
                message: ChatMessage {
                    role: ChatRole::Assistant,
                    content: content.to_string(),
                },
            }],
        }
    }

    fn session(backend: MockChatCompletionBackend, context_window: usize) -> TranslationSession {
        TranslationSession::new(
            "English",
            "Korean",
            Box::new(backend),
            SegmenterFactory::create(SegmenterLanguage::English),
            context_window,
        )
    }

    #[tokio::test]
    async fn test_forward_prompt() {
        let mut backend = MockChatCompletionBackend::new();
        backend
            .expect_complete()
            .withf(|request| {
                request.messages.len() == 2
                    && request.messages[0].role == ChatRole::System
                    && request.messages[0].content == FORWARD
                    && request.messages[1].role == ChatRole::User
                    && request.messages[1].content == "Hello"
                    && request.context_window == 512
            })
            .times(1)
            .returning(|_| Ok(completion("안녕하세요")));

        let translation = session(backend, 512).translate("Hello").await.unwrap();
        assert_eq!(translation, "안녕하세요");
    }

    #[tokio::test]
    async fn test_reverse_prompt_swaps_languages() {
        let mut backend = MockChatCompletionBackend::new();
        backend
            .expect_complete()
            .withf(|request| {
                request.messages[0].content == REVERSE && request.messages[1].content == "안녕하세요"
            })
            .times(1)
            .returning(|_| Ok(completion("Hello")));

        let session = session(backend, 512);
        assert_eq!(session.translate_reverse("안녕하세요").await.unwrap(), "Hello");
        assert_eq!(session.source_language(), "English");
        assert_eq!(session.target_language(), "Korean");
    }

    #[tokio::test]
    async fn test_backend_failure_is_returned_not_raised() {
        let mut backend = MockChatCompletionBackend::new();
        backend
            .expect_complete()
            .times(1)
            .returning(|_| Err(DoclingoError::Backend("model crashed".to_string())));

        let result = session(backend, 512).translate("Hello").await;
        assert!(matches!(result, Err(DoclingoError::Backend(_))));
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_completion() {
        let mut backend = MockChatCompletionBackend::new();
        backend
            .expect_complete()
            .returning(|_| Ok(ChatCompletion::default()));

        let result = session(backend, 512).translate("Hello").await;
        assert!(matches!(result, Err(DoclingoError::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_empty_translation_is_still_success() {
        let mut backend = MockChatCompletionBackend::new();
        backend.expect_complete().returning(|_| Ok(completion("")));

        let result = session(backend, 512).translate("Hello").await;
        assert_eq!(result.unwrap(), "");
    }

    #[tokio::test]
    async fn test_context_overflow_detected_before_sending() {
        let mut backend = MockChatCompletionBackend::new();
        backend.expect_complete().never();

        let long_text = "word ".repeat(400);
        let result = session(backend, 64).translate(&long_text).await;
        match result {
            Err(DoclingoError::ContextOverflow { estimated, limit }) => {
                assert_eq!(limit, 64);
                assert!(estimated > 64);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translate_sentences_records_failures_and_continues() {
        let mut backend = MockChatCompletionBackend::new();
        backend.expect_complete().times(3).returning(|request| {
            match request.messages[1].content.as_str() {
                "Two." => Err(DoclingoError::Backend("timeout".to_string())),
                other => Ok(completion(&format!("[{}]", other))),
            }
        });

        let exchanges = session(backend, 512)
            .translate_sentences(&["One.", "Two.", "Three."], Direction::Forward)
            .await;

        assert_eq!(exchanges.len(), 3);
        assert_eq!(exchanges[0].translation.as_deref(), Some("[One.]"));
        assert!(!exchanges[1].is_success());
        assert!(exchanges[1].failure.as_deref().unwrap().contains("timeout"));
        assert_eq!(exchanges[2].translation.as_deref(), Some("[Three.]"));
    }

    #[tokio::test]
    async fn test_translate_document_chunks_by_budget() {
        let mut backend = MockChatCompletionBackend::new();
        backend
            .expect_complete()
            .times(2)
            .returning(|request| Ok(completion(&request.messages[1].content.to_uppercase())));

        let session = session(backend, 512).with_chunk_token_budget(8);
        let exchanges = session
            .translate_document("First sentence here. Second sentence here.", Direction::Forward)
            .await;

        assert_eq!(exchanges.len(), 2);
        assert_eq!(exchanges[0].source_text, "First sentence here.");
        assert_eq!(exchanges[1].translation.as_deref(), Some("SECOND SENTENCE HERE."));
    }

    #[test]
    fn test_default_chunk_budget_fits_window() {
        let session = session(MockChatCompletionBackend::new(), 512);
        let budget = session.chunk_budget(Direction::Forward);
        let fixed = estimate_tokens(FORWARD) + 2 * MESSAGE_OVERHEAD_TOKENS;

        assert_eq!(budget, (512 - fixed) / 2);
        assert!(fixed + budget <= 512);
    }

    #[test]
    fn test_exchange_serializes_only_outcome_present() {
        let exchange = TranslationExchange {
            source_text: "Hello".to_string(),
            translation: Some("안녕하세요".to_string()),
            failure: None,
        };
        let json = serde_json::to_value(&exchange).unwrap();
        assert_eq!(json, serde_json::json!({"source_text": "Hello", "translation": "안녕하세요"}));
    }
}
