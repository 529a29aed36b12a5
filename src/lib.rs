//! contact-notes - hashtag indexing and autocomplete over contact notes
//!
//! Wraps a platform address book's free-text notes with a tag engine:
//! [`scan`] extracts `#tag` occurrences from note text,
//! [`tree::TernarySearchTree`] stores the tag vocabulary with the contacts
//! that use each tag, and [`index::TagIndex`] keeps the tree in sync with
//! note edits by applying only the changed tags. The [`book`] module models
//! the address-book boundary and session lifecycle.
//!
//! ```
//! use contact_notes::book::{AddressBook, ContactRecord};
//! use contact_notes::domain::ContactId;
//!
//! let book = AddressBook::load(vec![
//!     ContactRecord::person(ContactId::new(1), "Ada", "Lovelace")
//!         .with_note("met at #rustconf, #vip"),
//! ])?;
//!
//! let matches = book.tags_matching("ru");
//! assert_eq!(matches[0].tag.as_str(), "rustconf");
//! # Ok::<(), contact_notes::book::BookError>(())
//! ```

pub mod book;
pub mod domain;
pub mod index;
pub mod scan;
pub mod tree;

pub use domain::{ContactId, Tag, TagOccurrence};
pub use index::{TagIndex, TagMatch};
pub use scan::scan;
