//! Opaque contact identifier with serde support.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque identifier for an address-book contact.
///
/// Wraps the numeric record identifier handed out by the platform address
/// book. The tag index never interprets the value; it only stores and
/// compares it. Ordered so identifier sets enumerate deterministically.
///
/// # Examples
///
/// ```
/// use contact_notes::domain::ContactId;
///
/// let id = ContactId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(i64);

impl ContactId {
    /// Wraps a raw record identifier.
    pub fn new(record_id: i64) -> Self {
        Self(record_id)
    }

    /// Returns the underlying record identifier.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ContactId {
    fn from(record_id: i64) -> Self {
        Self(record_id)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactId({})", self.0)
    }
}
