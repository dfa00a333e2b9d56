//! OpenAI-backed text generator.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{GenerationOptions, OpenAiConfig, TextGenerator, require_api_key};
use crate::error::{GenerationError, Result};

/// Generator backed by the chat completions endpoint.
///
/// The instruction becomes the system message and the text the user
/// message. Only the first choice is used.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiGenerator {
    /// Creates a generator from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NotConfigured`] if no API key is set.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let key = require_api_key(config)?;
        let mut client_config = OpenAIConfig::new().with_api_key(key);
        if let Some(base) = &config.api_base {
            client_config = client_config.with_api_base(base);
        }
        Ok(Self {
            client: Client::with_config(client_config),
            model: config.model.clone(),
        })
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        instruction: &str,
        text: &str,
        options: &GenerationOptions,
    ) -> std::result::Result<String, GenerationError> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .temperature(options.temperature)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(instruction)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(text)
                    .build()?
                    .into(),
            ]);
        if let Some(limit) = options.max_output_tokens {
            request.max_completion_tokens(limit);
        }
        let request = request.build()?;

        debug!(model = %self.model, input_chars = text.chars().count(), "chat completion request");

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!(model = %self.model, error = %e, "chat completion failed");
            GenerationError::from(e)
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!(output_chars = content.chars().count(), "chat completion received");
        Ok(content)
    }

    fn label(&self) -> &str {
        &self.model
    }
}
