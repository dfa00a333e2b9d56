//! Flashcard representation.

use serde::{Deserialize, Serialize};

use crate::io::unicode::truncate_chars;

/// A question/answer study card.
///
/// # Examples
///
/// ```
/// use study_buddy::core::Flashcard;
///
/// let card = Flashcard::new(1, "  What is ATP? ", "The cell's energy currency.");
/// assert_eq!(card.front, "What is ATP?");
/// assert!(card.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Unique identifier (assigned by storage layer).
    pub id: Option<i64>,
    /// Position within the course deck (1-based).
    pub card_index: usize,
    /// Prompt side.
    pub front: String,
    /// Answer side.
    pub back: String,
}

impl Flashcard {
    /// Maximum length of the front in characters.
    pub const MAX_FRONT_CHARS: usize = 500;

    /// Maximum length of the back in characters.
    pub const MAX_BACK_CHARS: usize = 1200;

    /// Creates a card, trimming both sides and truncating them to their limits.
    #[must_use]
    pub fn new(card_index: usize, front: &str, back: &str) -> Self {
        Self {
            id: None,
            card_index,
            front: truncate_chars(front.trim(), Self::MAX_FRONT_CHARS).to_string(),
            back: truncate_chars(back.trim(), Self::MAX_BACK_CHARS).to_string(),
        }
    }

    /// Creates the generic card used to pad a short deck.
    #[must_use]
    pub fn placeholder(card_index: usize) -> Self {
        Self::new(card_index, &format!("Key idea {card_index}?"), "Brief explanation.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::unicode::char_count;

    #[test]
    fn test_flashcard_truncates_sides() {
        let card = Flashcard::new(1, &"q".repeat(600), &"a".repeat(2000));
        assert_eq!(char_count(&card.front), Flashcard::MAX_FRONT_CHARS);
        assert_eq!(char_count(&card.back), Flashcard::MAX_BACK_CHARS);
    }

    #[test]
    fn test_flashcard_placeholder() {
        let card = Flashcard::placeholder(7);
        assert_eq!(card.card_index, 7);
        assert_eq!(card.front, "Key idea 7?");
        assert_eq!(card.back, "Brief explanation.");
    }
}
