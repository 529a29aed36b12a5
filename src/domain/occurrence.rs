//! Tag occurrence reported by the note scanner.

use crate::domain::{ParseTagError, Tag};
use std::fmt;
use std::ops::Range;

/// A single tag match found in a note, in original-text coordinates.
///
/// Holds the surface form exactly as it appeared (marker included, casing
/// preserved) plus the byte range it occupied, so the UI can highlight the
/// match in place. Offsets always fall on character boundaries of the
/// scanned text.
///
/// Occurrences are transient: the index normalizes them into [`Tag`]s and
/// discards the surface form.
#[derive(Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    surface: String,
    start: usize,
    end: usize,
}

impl TagOccurrence {
    pub(crate) fn new(surface: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            surface: surface.into(),
            start,
            end,
        }
    }

    /// The matched text, marker included, original casing preserved.
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// The tag body: the surface form with the leading marker stripped.
    pub fn body(&self) -> &str {
        let marker_len = self
            .surface
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
        &self.surface[marker_len..]
    }

    /// Byte offset of the marker character in the scanned text.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset one past the last tag character.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The byte range of the match, suitable for slicing the scanned text.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Normalizes this occurrence into a [`Tag`].
    ///
    /// # Errors
    ///
    /// Returns `ParseTagError` only if the body violates the tag character
    /// class. Scanner-produced occurrences always normalize successfully,
    /// since the scanner consumes exactly that class.
    pub fn to_tag(&self) -> Result<Tag, ParseTagError> {
        Tag::new(self.body())
    }
}

impl fmt::Debug for TagOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagOccurrence(\"{}\"@{}..{})", self.surface, self.start, self.end)
    }
}

impl fmt::Display for TagOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exposes_surface_and_range() {
        let occ = TagOccurrence::new("#Alice", 4, 10);
        assert_eq!(occ.surface(), "#Alice");
        assert_eq!(occ.start(), 4);
        assert_eq!(occ.end(), 10);
        assert_eq!(occ.range(), 4..10);
    }

    #[test]
    fn body_strips_marker_only() {
        let occ = TagOccurrence::new("#Alice", 4, 10);
        assert_eq!(occ.body(), "Alice");
    }

    #[test]
    fn to_tag_normalizes_case() {
        let occ = TagOccurrence::new("#Alice", 4, 10);
        assert_eq!(occ.to_tag().unwrap().as_str(), "alice");
    }

    #[test]
    fn debug_shows_coordinates() {
        let occ = TagOccurrence::new("#c", 31, 33);
        assert_eq!(format!("{:?}", occ), "TagOccurrence(\"#c\"@31..33)");
    }
}
