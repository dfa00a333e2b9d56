//! Flashcard generation.
//!
//! One model call asks for exactly `count` cards as a JSON array of
//! `{"front", "back"}` objects. The reply is parsed leniently, cleaned, and
//! brought to exactly `count` cards according to a [`ShortfallPolicy`].

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use crate::core::Flashcard;
use crate::error::{Error, FlashcardError, Result};
use crate::generation::{DEFAULT_TEMPERATURE, GenerationOptions, TextGenerator};
use crate::prompt::PromptSet;

/// Default number of cards per deck.
pub const DEFAULT_CARD_COUNT: usize = 10;

/// Largest deck that may be requested.
pub const MAX_CARD_COUNT: usize = 50;

/// What to do when the model returns fewer usable cards than requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShortfallPolicy {
    /// Fill the deck with generic placeholder cards.
    #[default]
    Pad,
    /// Fail with [`FlashcardError::Shortfall`].
    Fail,
}

impl fmt::Display for ShortfallPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pad => write!(f, "pad"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

impl FromStr for ShortfallPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pad" => Ok(Self::Pad),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown shortfall policy '{other}' (expected pad or fail)")),
        }
    }
}

/// Settings for [`FlashcardGenerator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashcardConfig {
    /// Number of cards to produce (1..=50).
    pub count: usize,
    /// Shortfall handling.
    pub policy: ShortfallPolicy,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for FlashcardConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_CARD_COUNT,
            policy: ShortfallPolicy::default(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl FlashcardConfig {
    /// Checks the card count.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `count` is outside `1..=50`.
    pub fn validate(&self) -> Result<()> {
        if (1..=MAX_CARD_COUNT).contains(&self.count) {
            Ok(())
        } else {
            Err(Error::Config {
                message: format!(
                    "flashcard count must be between 1 and {MAX_CARD_COUNT}, got {}",
                    self.count
                ),
            })
        }
    }
}

/// Generates a flashcard deck from course text.
pub struct FlashcardGenerator<'g> {
    generator: &'g dyn TextGenerator,
    config: FlashcardConfig,
    prompts: PromptSet,
}

impl<'g> FlashcardGenerator<'g> {
    /// Creates a flashcard generator.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an out-of-range card count.
    pub fn new(generator: &'g dyn TextGenerator, config: FlashcardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            config,
            prompts: PromptSet::defaults(),
        })
    }

    /// Replaces the instruction templates.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Generates exactly `count` cards numbered from 1.
    ///
    /// # Errors
    ///
    /// Returns the generator's error, [`FlashcardError::MalformedOutput`]
    /// when no JSON array can be found, or [`FlashcardError::Shortfall`]
    /// under [`ShortfallPolicy::Fail`].
    pub async fn generate(&self, text: &str) -> std::result::Result<Vec<Flashcard>, FlashcardError> {
        let instruction = self.prompts.flashcard_instruction(self.config.count);
        let content = format!("<content>\n{text}\n</content>");
        let options = GenerationOptions::default().temperature(self.config.temperature);

        let raw = self
            .generator
            .generate(&instruction, &content, &options)
            .await?;
        debug!(reply_chars = raw.chars().count(), "flashcard reply received");

        parse_cards(&raw, self.config.count, self.config.policy)
    }
}

/// Parses a model reply into exactly `count` cards.
///
/// The whole reply is tried as JSON first, then the span from the first
/// `[` to the last `]`. Items that are not objects or have a blank side
/// are skipped. Surplus cards are dropped; a shortfall is handled per
/// `policy`.
///
/// # Errors
///
/// Returns [`FlashcardError::MalformedOutput`] when no JSON array is found
/// and [`FlashcardError::Shortfall`] when `policy` is `Fail` and too few
/// usable cards were returned.
///
/// # Examples
///
/// ```
/// use study_buddy::flashcards::{ShortfallPolicy, parse_cards};
///
/// let raw = r#"Here you go: [{"front": "2+2?", "back": "4"}]"#;
/// let cards = parse_cards(raw, 2, ShortfallPolicy::Pad).unwrap();
/// assert_eq!(cards[0].back, "4");
/// assert_eq!(cards[1].front, "Key idea 2?");
/// ```
pub fn parse_cards(
    raw: &str,
    count: usize,
    policy: ShortfallPolicy,
) -> std::result::Result<Vec<Flashcard>, FlashcardError> {
    let items = extract_array(raw)?;

    let mut cards: Vec<Flashcard> = items
        .iter()
        .filter_map(|item| {
            let front = card_side(item.get("front")?)?;
            let back = card_side(item.get("back")?)?;
            Some((front, back))
        })
        .take(count)
        .enumerate()
        .map(|(i, (front, back))| Flashcard::new(i + 1, &front, &back))
        .collect();

    let usable = cards.len();
    if usable < count {
        match policy {
            ShortfallPolicy::Fail => {
                return Err(FlashcardError::Shortfall {
                    expected: count,
                    actual: usable,
                });
            }
            ShortfallPolicy::Pad => {
                warn!(expected = count, actual = usable, "padding flashcard deck");
                cards.extend((usable + 1..=count).map(Flashcard::placeholder));
            }
        }
    }

    Ok(cards)
}

/// Text of one card side. Numbers and booleans are written out; blank
/// strings and other JSON values yield nothing.
fn card_side(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn extract_array(raw: &str) -> std::result::Result<Vec<Value>, FlashcardError> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) {
        return Ok(items);
    }

    let span = raw
        .find('[')
        .zip(raw.rfind(']'))
        .filter(|(start, end)| end > start)
        .map(|(start, end)| &raw[start..=end]);

    match span.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Array(items))) => Ok(items),
        Some(Ok(_)) => Err(FlashcardError::MalformedOutput(
            "bracketed span is not an array".to_string(),
        )),
        Some(Err(e)) => Err(FlashcardError::MalformedOutput(e.to_string())),
        None => Err(FlashcardError::MalformedOutput(
            "no JSON array in reply".to_string(),
        )),
    }
}
