//! Text generation boundary.
//!
//! Every model call in study-buddy goes through the [`TextGenerator`]
//! trait: one instruction (the system side), one text (the user side), and
//! a few sampling options. [`OpenAiGenerator`] talks to an OpenAI-compatible
//! chat completions API; [`ScriptedGenerator`] replays canned responses for
//! tests and offline use.

#[cfg(feature = "openai")]
pub mod openai;
pub mod scripted;

use async_trait::async_trait;

use crate::error::{Error, GenerationError, Result};

#[cfg(feature = "openai")]
pub use openai::OpenAiGenerator;
pub use scripted::{GenerationCall, ScriptedGenerator};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature for summaries and flashcards.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Sampling options for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens, if any.
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: None,
        }
    }
}

impl GenerationOptions {
    /// Sets the temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the output token limit.
    #[must_use]
    pub const fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

/// A source of generated text.
///
/// Implementations must be usable from async code shared across tasks.
/// Errors are returned as-is to callers; no retry happens at this layer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates text for `text` under `instruction`.
    async fn generate(
        &self,
        instruction: &str,
        text: &str,
        options: &GenerationOptions,
    ) -> std::result::Result<String, GenerationError>;

    /// Returns a short label for logs (e.g. the model name).
    fn label(&self) -> &str {
        "generator"
    }
}

/// Connection settings for an OpenAI-compatible API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// API key; required.
    pub api_key: Option<String>,
    /// Base URL override (e.g. a proxy or compatible server).
    pub api_base: Option<String>,
    /// Chat model name.
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl OpenAiConfig {
    /// Sets the API key; blank keys are treated as missing.
    #[must_use]
    pub fn api_key(mut self, key: Option<&str>) -> Self {
        self.api_key = key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn api_base(mut self, base: Option<&str>) -> Self {
        self.api_base = base
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from);
        self
    }

    /// Sets the model name.
    #[must_use]
    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

/// Builds the configured generator.
///
/// # Errors
///
/// Returns [`GenerationError::NotConfigured`] if no API key is set or the
/// crate was built without the `openai` feature.
pub fn create_generator(config: &OpenAiConfig) -> Result<Box<dyn TextGenerator>> {
    #[cfg(feature = "openai")]
    {
        Ok(Box::new(OpenAiGenerator::new(config)?))
    }
    #[cfg(not(feature = "openai"))]
    {
        let _ = config;
        Err(Error::Generation(GenerationError::NotConfigured(
            "built without the `openai` feature".to_string(),
        )))
    }
}

/// Returns an error unless a key is present.
pub(crate) fn require_api_key(config: &OpenAiConfig) -> Result<&str> {
    config.api_key.as_deref().ok_or_else(|| {
        Error::Generation(GenerationError::NotConfigured(
            "missing OPENAI_API_KEY (set it or pass --api-key)".to_string(),
        ))
    })
}
