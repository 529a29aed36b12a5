//! Case-insensitive tag type extracted from contact notes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized hashtag token used as a search key.
///
/// Tags are the body of a `#tag` occurrence in a contact's note, with the
/// marker stripped and the casing folded. `#Alice`, `#alice`, and `#ALICE`
/// all normalize to the same `Tag`.
///
/// # Validation Rules
/// - Non-empty after normalization
/// - Must contain only ASCII alphanumeric characters, hyphens, and underscores
///   (the same body-character class the scanner consumes)
///
/// # Normalization
/// - Surrounding whitespace is trimmed
/// - Converted to lowercase
///
/// The surface form of an occurrence (original casing, marker included) is
/// kept on [`TagOccurrence`](crate::domain::TagOccurrence) for display; only
/// the normalized form is stored and compared.
///
/// # Examples
///
/// ```
/// use contact_notes::domain::Tag;
///
/// let tag = Tag::new("Bob_2").unwrap();
/// assert_eq!(tag.as_str(), "bob_2");
/// assert_eq!(tag, Tag::new("BOB_2").unwrap());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String); // Always stored lowercase

/// Error returned when a string is not a valid tag body.
#[derive(Debug, Clone)]
pub struct ParseTagError(String);

impl fmt::Display for ParseTagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseTagError {}

impl Tag {
    /// Creates a Tag from a raw tag body (no marker character).
    ///
    /// The input is trimmed, lowercased, and validated against the allowed
    /// character class.
    ///
    /// # Errors
    ///
    /// Returns `ParseTagError` if the input is empty after trimming, or
    /// contains characters outside `[a-z0-9_-]` after folding. The marker
    /// character itself is invalid here: strip it before calling.
    pub fn new(s: &str) -> Result<Self, ParseTagError> {
        let normalized = s.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(ParseTagError("tag cannot be empty".to_string()));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ParseTagError(format!(
                "invalid tag '{}': tags may contain only letters, digits, hyphens, and underscores",
                normalized
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(\"{}\")", self.0)
    }
}

impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
