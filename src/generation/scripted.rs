//! Deterministic in-process generator.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::{GenerationOptions, TextGenerator};
use crate::error::GenerationError;

type Responder = dyn Fn(&str, &str) -> Result<String, GenerationError> + Send + Sync;

/// One recorded call to a [`ScriptedGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationCall {
    /// Instruction passed to the generator.
    pub instruction: String,
    /// Text passed to the generator.
    pub text: String,
    /// Options passed to the generator.
    pub options: GenerationOptions,
}

/// Generator that replays queued responses and records every call.
///
/// Queued responses are consumed first, in order. Once the queue is empty
/// the responder (if any) answers; without one the call fails with
/// [`GenerationError::NotConfigured`].
///
/// # Examples
///
/// ```
/// use study_buddy::generation::{GenerationOptions, ScriptedGenerator, TextGenerator};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let generator = ScriptedGenerator::with_responses(["## Cells\n- Basic unit of life"]);
/// let out = generator
///     .generate("summarize", "text", &GenerationOptions::default())
///     .await
///     .unwrap();
/// assert!(out.starts_with("## Cells"));
/// assert_eq!(generator.call_count(), 1);
/// # });
/// ```
#[derive(Default)]
pub struct ScriptedGenerator {
    queue: Mutex<VecDeque<Result<String, GenerationError>>>,
    responder: Option<Box<Responder>>,
    calls: Mutex<Vec<GenerationCall>>,
}

impl std::fmt::Debug for ScriptedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedGenerator")
            .field("queued", &lock(&self.queue).len())
            .field("calls", &lock(&self.calls).len())
            .field("has_responder", &self.responder.is_some())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedGenerator {
    /// Creates a generator with an empty queue and no responder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that returns `responses` in order.
    #[must_use]
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::new();
        for response in responses {
            generator.push_response(response);
        }
        generator
    }

    /// Creates a generator that answers every call with `responder`.
    #[must_use]
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queues a successful response.
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.queue).push_back(Ok(response.into()));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: GenerationError) {
        lock(&self.queue).push_back(Err(error));
    }

    /// Returns a copy of every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GenerationCall> {
        lock(&self.calls).clone()
    }

    /// Returns the number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        instruction: &str,
        text: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        lock(&self.calls).push(GenerationCall {
            instruction: instruction.to_string(),
            text: text.to_string(),
            options: *options,
        });

        let queued = lock(&self.queue).pop_front();
        let result = match (queued, &self.responder) {
            (Some(result), _) => result,
            (None, Some(responder)) => responder(instruction, text),
            (None, None) => Err(GenerationError::NotConfigured(
                "scripted generator has no responses left".to_string(),
            )),
        };

        debug!(ok = result.is_ok(), "scripted generation");
        result
    }

    fn label(&self) -> &str {
        "scripted"
    }
}
