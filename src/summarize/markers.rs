//! Marker grammar for outlines.
//!
//! An outline is plain text made of section lines and point lines, each
//! introduced by its marker. Nothing else is structural.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default section marker.
pub const DEFAULT_SECTION_MARKER: &str = "## ";

/// Default point marker.
pub const DEFAULT_POINT_MARKER: &str = "- ";

/// The two line markers an outline uses.
///
/// # Examples
///
/// ```
/// use study_buddy::summarize::MarkerGrammar;
///
/// let markers = MarkerGrammar::default();
/// let stats = markers.stats("## Cells\n- nucleus\n- membrane\n## Energy\n- ATP");
/// assert_eq!(stats.sections, 2);
/// assert_eq!(stats.points, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerGrammar {
    section: String,
    point: String,
}

impl Default for MarkerGrammar {
    fn default() -> Self {
        Self {
            section: DEFAULT_SECTION_MARKER.to_string(),
            point: DEFAULT_POINT_MARKER.to_string(),
        }
    }
}

/// Line counts of an outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutlineStats {
    /// Lines starting with the section marker.
    pub sections: usize,
    /// Lines starting with the point marker.
    pub points: usize,
    /// Non-blank lines starting with neither marker.
    pub other: usize,
}

impl MarkerGrammar {
    /// Creates a grammar from two markers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either marker is empty, contains a
    /// newline, or the two are equal.
    pub fn new(section: &str, point: &str) -> Result<Self> {
        for (label, marker) in [("section", section), ("point", point)] {
            if marker.is_empty() || marker.contains('\n') {
                return Err(Error::Config {
                    message: format!("{label} marker must be non-empty and single-line"),
                });
            }
        }
        if section == point {
            return Err(Error::Config {
                message: "section and point markers must differ".to_string(),
            });
        }
        Ok(Self {
            section: section.to_string(),
            point: point.to_string(),
        })
    }

    /// Returns the section marker.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Returns the point marker.
    #[must_use]
    pub fn point(&self) -> &str {
        &self.point
    }

    /// Counts section and point lines in an outline.
    ///
    /// Leading whitespace is ignored. When one marker is a prefix of the
    /// other, the longer one wins.
    #[must_use]
    pub fn stats(&self, outline: &str) -> OutlineStats {
        let section_first = self.section.len() >= self.point.len();
        let mut stats = OutlineStats::default();
        for line in outline.lines().map(str::trim_start).filter(|l| !l.is_empty()) {
            let is_section = line.starts_with(self.section.as_str());
            let is_point = line.starts_with(self.point.as_str());
            match (is_section, is_point) {
                (true, true) if section_first => stats.sections += 1,
                (true, false) => stats.sections += 1,
                (_, true) => stats.points += 1,
                (false, false) => stats.other += 1,
            }
        }
        stats
    }
}
