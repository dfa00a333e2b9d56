//! Character-budget trimming for outlines.

use std::num::NonZeroUsize;

use super::markers::MarkerGrammar;
use crate::io::unicode::{byte_offset_of_char, char_count};

/// Default distance from the budget within which a marker-aligned cut is
/// preferred over a hard cut.
pub const DEFAULT_TRIM_WINDOW: usize = 120;

/// Trims an outline to at most `budget` characters.
///
/// An outline that already fits is returned unchanged. Otherwise the
/// prefix of exactly `budget` characters is taken and the rightmost point
/// marker, section marker, or newline in it is located. If that position
/// is within `window` characters of the budget, the outline is cut there
/// and trailing whitespace removed, unless that would leave nothing. In
/// every other case the hard prefix is returned.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use study_buddy::summarize::{MarkerGrammar, trim_to_budget};
///
/// let outline = "## A\n- one\n- two";
/// let budget = NonZeroUsize::new(13).unwrap();
/// assert_eq!(trim_to_budget(outline, budget, &MarkerGrammar::default(), 120), "## A\n- one");
/// ```
#[must_use]
pub fn trim_to_budget(
    outline: &str,
    budget: NonZeroUsize,
    markers: &MarkerGrammar,
    window: usize,
) -> String {
    let budget = budget.get();
    let hard = byte_offset_of_char(outline, budget);
    if hard == outline.len() {
        return outline.to_string();
    }

    let prefix = &outline[..hard];
    let boundary = [markers.point(), markers.section(), "\n"]
        .into_iter()
        .filter_map(|needle| prefix.rfind(needle))
        .max();

    if let Some(pos) = boundary
        && budget - char_count(&prefix[..pos]) <= window
    {
        let aligned = prefix[..pos].trim_end();
        if !aligned.is_empty() {
            return aligned.to_string();
        }
    }

    prefix.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_fits_unchanged() {
        let markers = MarkerGrammar::default();
        let outline = "## Short\n- fits   ";
        assert_eq!(trim_to_budget(outline, budget(100), &markers, 120), outline);
        assert_eq!(
            trim_to_budget(outline, budget(outline.len()), &markers, 120),
            outline
        );
    }

    #[test]
    fn test_cuts_at_marker_near_budget() {
        let markers = MarkerGrammar::default();
        let mut outline = "x".repeat(1148);
        outline.push_str("  - tail point ");
        outline.push_str(&"y".repeat(1500 - outline.len()));
        assert_eq!(outline.find("- ").unwrap(), 1150);

        let trimmed = trim_to_budget(&outline, budget(1200), &markers, 120);
        assert_eq!(trimmed.len(), 1148);
        assert!(trimmed.chars().all(|c| c == 'x'));
    }

    #[test]
    fn test_hard_cut_without_nearby_marker() {
        let markers = MarkerGrammar::default();
        let mut outline = "## Title\n".to_string();
        outline.push_str(&"z".repeat(1491));
        assert_eq!(outline.len(), 1500);

        let trimmed = trim_to_budget(&outline, budget(1200), &markers, 120);
        assert_eq!(trimmed.len(), 1200);
        assert_eq!(trimmed, &outline[..1200]);
    }

    #[test]
    fn test_marker_exactly_at_window_edge() {
        let markers = MarkerGrammar::default();
        let outline = format!("{}\n{}", "a".repeat(80), "b".repeat(200));
        assert_eq!(trim_to_budget(&outline, budget(200), &markers, 120), "a".repeat(80));
        assert_eq!(trim_to_budget(&outline, budget(201), &markers, 120).len(), 201);
    }

    #[test]
    fn test_marker_at_start_keeps_hard_prefix() {
        let markers = MarkerGrammar::default();
        let outline = format!("## {}", "w".repeat(300));
        let trimmed = trim_to_budget(&outline, budget(50), &markers, 120);
        assert_eq!(trimmed, &outline[..50]);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let markers = MarkerGrammar::default();
        let outline = "é".repeat(30);
        let trimmed = trim_to_budget(&outline, budget(10), &markers, 120);
        assert_eq!(char_count(&trimmed), 10);
    }

    #[test]
    fn test_rightmost_of_all_markers_wins() {
        let markers = MarkerGrammar::default();
        let outline = "## A\n- one two three\nfour five six seven eight";
        let trimmed = trim_to_budget(outline, budget(30), &markers, 120);
        assert_eq!(trimmed, "## A\n- one two three");
    }
}
