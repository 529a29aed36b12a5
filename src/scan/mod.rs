//! Note-text scanning: finds `#tag` occurrences in a single pass.

use crate::domain::TagOccurrence;
use std::fmt;

/// Tag surface syntax: the marker character and the body-character class.
///
/// This is a fixed, documented configuration shared with the UI layer that
/// displays match ranges. The defaults are `{marker: '#', body: [A-Za-z0-9_-]}`;
/// changing them is a breaking change to every stored and queried tag.
///
/// # Boundary rule
///
/// A marker starts a tag only when it is at the start of the text or the
/// immediately preceding character is *not* a body character. Whitespace and
/// punctuation (the marker itself included) do not disqualify a marker;
/// letters and digits do. So `word#tag` contains no tag, `word##tag`
/// contains `#tag`, and `(#vip)` contains `#vip`.
///
/// # Examples
///
/// ```
/// use contact_notes::scan::scan;
///
/// let occurrences = scan("call #Alice re: #follow-up");
/// let surfaces: Vec<&str> = occurrences.iter().map(|o| o.surface()).collect();
/// assert_eq!(surfaces, vec!["#Alice", "#follow-up"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSyntax {
    marker: char,
}

/// Error returned when a marker character overlaps the tag body class.
#[derive(Debug, Clone)]
pub struct InvalidMarkerError(char);

impl fmt::Display for InvalidMarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid marker '{}': marker must not be a tag body character",
            self.0
        )
    }
}

impl std::error::Error for InvalidMarkerError {}

impl Default for TagSyntax {
    fn default() -> Self {
        Self { marker: '#' }
    }
}

impl TagSyntax {
    /// Creates a syntax with a custom marker character.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarkerError` if the marker falls inside the body
    /// character class, which would make tag boundaries ambiguous.
    pub fn with_marker(marker: char) -> Result<Self, InvalidMarkerError> {
        if Self::is_body_char(marker) {
            return Err(InvalidMarkerError(marker));
        }
        Ok(Self { marker })
    }

    /// The marker character that introduces a tag.
    pub fn marker(&self) -> char {
        self.marker
    }

    /// Whether `c` belongs to the tag body character class.
    pub fn is_body_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    }

    /// Scans `text` left to right and returns every tag occurrence, in order.
    ///
    /// The scan walks character boundaries (never splitting a multi-byte
    /// character), does not backtrack, and cannot produce overlapping
    /// matches. Malformed input degrades to an empty result; scanning never
    /// fails.
    pub fn scan(&self, text: &str) -> Vec<TagOccurrence> {
        let mut found = Vec::new();
        let mut chars = text.char_indices().peekable();
        // Tracks whether the previous character was a body character, which
        // would embed a following marker mid-word.
        let mut prev_is_body = false;

        while let Some((start, c)) = chars.next() {
            if c != self.marker || prev_is_body {
                prev_is_body = Self::is_body_char(c);
                continue;
            }

            // Candidate tag start: consume body characters after the marker.
            let mut end = start + c.len_utf8();
            let mut has_body = false;
            while let Some(&(i, b)) = chars.peek() {
                if !Self::is_body_char(b) {
                    break;
                }
                end = i + b.len_utf8();
                has_body = true;
                chars.next();
            }

            if has_body {
                found.push(TagOccurrence::new(&text[start..end], start, end));
            }
            // A bare marker is not a body character, so a marker right after
            // it may still start a tag.
            prev_is_body = has_body;
        }

        found
    }
}

/// Scans `text` with the default syntax (`#` marker).
pub fn scan(text: &str) -> Vec<TagOccurrence> {
    TagSyntax::default().scan(text)
}
