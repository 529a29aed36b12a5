//! Core types: Tag, ContactId, TagOccurrence

mod contact_id;
mod occurrence;
mod tag;

pub use contact_id::ContactId;
pub use occurrence::TagOccurrence;
pub use tag::{ParseTagError, Tag};
