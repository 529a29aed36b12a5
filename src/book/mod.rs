//! Address-book boundary: contact records, change events, session lifecycle.
//!
//! The platform address book itself (storage, permissions, change
//! notifications) lives outside this crate. This module models that
//! boundary: a plain [`ContactRecord`], the [`ContactEvent`]s the platform
//! layer delivers, and an [`AddressBook`] session that owns the records and
//! the tag index together. It doubles as the test double for the real
//! integration.

use crate::domain::{ContactId, Tag};
use crate::index::{IndexError, NoteDelta, TagIndex, TagMatch};
use crate::scan::TagSyntax;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors that can occur at the address-book boundary.
#[derive(Debug, Error)]
pub enum BookError {
    /// An event referenced a contact the session does not hold.
    #[error("unknown contact: {id}")]
    UnknownContact {
        /// The identifier that failed to resolve.
        id: ContactId,
    },

    /// A tag-index operation failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Contact records could not be parsed.
    #[error("failed to parse contact records: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for address-book operations.
pub type BookResult<T> = Result<T, BookError>;

/// A contact as seen at the boundary: identity, name fields, and the one
/// field the tag engine cares about, the free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Opaque record identifier from the platform address book.
    pub id: ContactId,
    /// Given name, if set.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name, if set.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Organization name, if set.
    #[serde(default)]
    pub organization_name: Option<String>,
    /// Nickname, preferred for display when set.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Whether the record represents an organization rather than a person.
    #[serde(default)]
    pub is_organization: bool,
    /// Free-text note attached to the contact.
    #[serde(default)]
    pub note: String,
}

impl ContactRecord {
    /// Creates a person record with no note.
    pub fn person(id: ContactId, first_name: &str, last_name: &str) -> Self {
        Self {
            id,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            organization_name: None,
            nickname: None,
            is_organization: false,
            note: String::new(),
        }
    }

    /// Creates an organization record with no note.
    pub fn organization(id: ContactId, name: &str) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            organization_name: Some(name.to_string()),
            nickname: None,
            is_organization: true,
            note: String::new(),
        }
    }

    /// Sets the note text.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    /// Sets the nickname.
    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }

    /// The name shown in contact lists.
    ///
    /// Organizations show their organization name. People prefer their
    /// nickname, then "First Last", then fall back to the organization
    /// name they belong to. An empty string means the record has no
    /// displayable name at all.
    pub fn display_name(&self) -> String {
        if self.is_organization {
            return self.organization_name.clone().unwrap_or_default();
        }
        if let Some(nickname) = &self.nickname {
            return nickname.clone();
        }
        let full = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };
        if full.is_empty() {
            self.organization_name.clone().unwrap_or_default()
        } else {
            full
        }
    }

    /// The section header this contact sorts under in a grouped list.
    ///
    /// Uses the first letter of the sort name, uppercased; records whose
    /// sort name does not start with an ASCII letter group under `"#"`.
    pub fn section_name(&self, sort_by_first_name: bool) -> String {
        let sort_name = if self.is_organization {
            self.organization_name.clone().unwrap_or_default()
        } else if sort_by_first_name {
            self.first_name
                .clone()
                .or_else(|| self.last_name.clone())
                .unwrap_or_else(|| self.display_name())
        } else {
            self.last_name
                .clone()
                .or_else(|| self.first_name.clone())
                .unwrap_or_else(|| self.display_name())
        };

        match sort_name.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
            _ => "#".to_string(),
        }
    }
}

/// A change delivered by the platform address-book layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactEvent {
    /// A contact's note was edited.
    NoteChanged {
        /// The contact whose note changed.
        id: ContactId,
        /// The full new note text.
        note: String,
    },
    /// A contact became invalid or was deleted.
    Removed {
        /// The contact that went away.
        id: ContactId,
    },
}

/// Cancellation flag for an in-flight bulk reload.
///
/// Clones share the flag, so the requesting side keeps one clone and hands
/// another to the loader.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parses a JSON array of contact records, the bulk-load wire format.
///
/// # Errors
///
/// Returns `BookError::Json` on malformed input.
pub fn records_from_json<R: Read>(reader: R) -> BookResult<Vec<ContactRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

/// One address-book session: the contact records plus the tag index built
/// over their notes.
///
/// This is the explicit context object that replaces a process-wide shared
/// manager: construct it with [`load`](Self::load), feed it
/// [`ContactEvent`]s as the platform delivers them, and query it for
/// autocomplete. Dropping the session tears everything down; a full
/// [`reload`](Self::reload) swaps in a freshly built state only when it
/// completes uncancelled.
#[derive(Debug)]
pub struct AddressBook {
    contacts: HashMap<ContactId, ContactRecord>,
    index: TagIndex,
    sort_by_first_name: bool,
}

impl AddressBook {
    /// Creates an empty session with the default tag syntax, sorting
    /// contacts by first name.
    pub fn new() -> Self {
        Self::with_options(TagSyntax::default(), true)
    }

    /// Creates an empty session with explicit options.
    pub fn with_options(syntax: TagSyntax, sort_by_first_name: bool) -> Self {
        Self {
            contacts: HashMap::new(),
            index: TagIndex::with_syntax(syntax),
            sort_by_first_name,
        }
    }

    /// Builds a session from a bulk record load.
    ///
    /// # Errors
    ///
    /// Propagates index errors; these do not occur for scanner-derived
    /// input but are not swallowed.
    pub fn load<I>(records: I) -> BookResult<Self>
    where
        I: IntoIterator<Item = ContactRecord>,
    {
        let mut book = Self::new();
        for record in records {
            book.add_contact(record)?;
        }
        Ok(book)
    }

    /// Rebuilds the session from a fresh record corpus.
    ///
    /// The replacement state is built off to the side, checking `cancel`
    /// between records. On cancellation the partial build is discarded and
    /// the live state is left untouched; returns `Ok(false)`. On completion
    /// the new state is swapped in and `Ok(true)` is returned.
    pub fn reload<I>(&mut self, records: I, cancel: &CancelToken) -> BookResult<bool>
    where
        I: IntoIterator<Item = ContactRecord>,
    {
        let mut replacement = Self::with_options(self.index.syntax(), self.sort_by_first_name);
        for record in records {
            if cancel.is_cancelled() {
                return Ok(false);
            }
            replacement.add_contact(record)?;
        }
        *self = replacement;
        Ok(true)
    }

    /// Applies a change event from the platform layer.
    ///
    /// Returns the tag-index delta the event caused.
    ///
    /// # Errors
    ///
    /// Returns `BookError::UnknownContact` if the event references a
    /// contact this session does not hold.
    pub fn apply(&mut self, event: ContactEvent) -> BookResult<NoteDelta> {
        match event {
            ContactEvent::NoteChanged { id, note } => self.set_note(id, &note),
            ContactEvent::Removed { id } => self.remove_contact(&id),
        }
    }

    /// Adds a record to the session and indexes its note.
    pub fn add_contact(&mut self, record: ContactRecord) -> BookResult<NoteDelta> {
        let delta = self.index.note_changed(record.id, &record.note)?;
        self.contacts.insert(record.id, record);
        Ok(delta)
    }

    /// Replaces a known contact's note and updates the index.
    pub fn set_note(&mut self, id: ContactId, note: &str) -> BookResult<NoteDelta> {
        let record = self
            .contacts
            .get_mut(&id)
            .ok_or(BookError::UnknownContact { id })?;
        record.note = note.to_string();
        Ok(self.index.note_changed(id, note)?)
    }

    /// Removes a contact and all of its tags.
    pub fn remove_contact(&mut self, id: &ContactId) -> BookResult<NoteDelta> {
        if self.contacts.remove(id).is_none() {
            return Err(BookError::UnknownContact { id: *id });
        }
        Ok(self.index.contact_removed(id)?)
    }

    /// Looks up a contact by identifier.
    pub fn contact(&self, id: &ContactId) -> Option<&ContactRecord> {
        self.contacts.get(id)
    }

    /// Looks up a contact by display name, case-insensitively.
    pub fn contact_with_name(&self, name: &str) -> Option<&ContactRecord> {
        self.contacts
            .values()
            .find(|record| record.display_name().eq_ignore_ascii_case(name))
    }

    /// Number of contacts in the session.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Autocomplete query: every tag starting with `prefix`, sorted, with
    /// the contacts that use it.
    pub fn tags_matching(&self, prefix: &str) -> Vec<TagMatch> {
        self.index.tags_matching(prefix)
    }

    /// The contacts whose note currently carries `tag`, in identifier
    /// order.
    pub fn contacts_tagged(&self, tag: &Tag) -> Vec<&ContactRecord> {
        self.index
            .contacts_with(tag)
            .iter()
            .filter_map(|id| self.contacts.get(id))
            .collect()
    }

    /// Read access to the underlying tag index.
    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    /// Whether grouped listings sort by first name.
    pub fn sort_by_first_name(&self) -> bool {
        self.sort_by_first_name
    }
}

impl Default for AddressBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(n: i64) -> ContactId {
        ContactId::new(n)
    }

    fn tag(s: &str) -> Tag {
        Tag::new(s).unwrap()
    }

    // ===========================================
    // ContactRecord display and sections
    // ===========================================

    #[test]
    fn display_name_prefers_nickname() {
        let record = ContactRecord::person(id(1), "Robert", "Smith").with_nickname("Bob");
        assert_eq!(record.display_name(), "Bob");
    }

    #[test]
    fn display_name_joins_first_and_last() {
        let record = ContactRecord::person(id(1), "Ada", "Lovelace");
        assert_eq!(record.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_for_organization() {
        let record = ContactRecord::organization(id(1), "Acme Corp");
        assert_eq!(record.display_name(), "Acme Corp");
    }

    #[test]
    fn section_name_follows_sort_preference() {
        let record = ContactRecord::person(id(1), "ada", "Lovelace");
        assert_eq!(record.section_name(true), "A");
        assert_eq!(record.section_name(false), "L");
    }

    #[test]
    fn section_name_for_non_letter_is_hash() {
        let record = ContactRecord::organization(id(1), "42 Industries");
        assert_eq!(record.section_name(true), "#");
    }

    // ===========================================
    // Session lifecycle
    // ===========================================

    fn sample_records() -> Vec<ContactRecord> {
        vec![
            ContactRecord::person(id(1), "Ada", "Lovelace").with_note("met at #rustconf #vip"),
            ContactRecord::person(id(2), "Grace", "Hopper").with_note("#vip speaker"),
            ContactRecord::organization(id(3), "Acme Corp").with_note("supplier, no tags"),
        ]
    }

    #[test]
    fn load_builds_index_over_notes() {
        let book = AddressBook::load(sample_records()).unwrap();
        assert_eq!(book.contact_count(), 3);

        let matches = book.tags_matching("v");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].tag.as_str(), "vip");
        assert_eq!(matches[0].contacts.len(), 2);
    }

    #[test]
    fn note_changed_event_updates_index() {
        let mut book = AddressBook::load(sample_records()).unwrap();
        let delta = book
            .apply(ContactEvent::NoteChanged {
                id: id(2),
                note: "#emeritus".to_string(),
            })
            .unwrap();
        assert_eq!(delta.added, [tag("emeritus")].into_iter().collect());
        assert_eq!(delta.removed, [tag("vip")].into_iter().collect());

        let vip = book.contacts_tagged(&tag("vip"));
        assert_eq!(vip.len(), 1);
        assert_eq!(vip[0].id, id(1));
    }

    #[test]
    fn removed_event_drops_tags_and_record() {
        let mut book = AddressBook::load(sample_records()).unwrap();
        book.apply(ContactEvent::Removed { id: id(1) }).unwrap();
        assert!(book.contact(&id(1)).is_none());

        // Tag survives while the other owner keeps it.
        assert_eq!(book.contacts_tagged(&tag("vip")).len(), 1);

        book.apply(ContactEvent::Removed { id: id(2) }).unwrap();
        assert!(book.tags_matching("vip").is_empty());
    }

    #[test]
    fn events_for_unknown_contacts_are_errors() {
        let mut book = AddressBook::new();
        let err = book
            .apply(ContactEvent::NoteChanged {
                id: id(9),
                note: "#x".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, BookError::UnknownContact { .. }));

        let err = book.apply(ContactEvent::Removed { id: id(9) }).unwrap_err();
        assert!(matches!(err, BookError::UnknownContact { .. }));
    }

    #[test]
    fn contact_with_name_is_case_insensitive() {
        let book = AddressBook::load(sample_records()).unwrap();
        let found = book.contact_with_name("ada lovelace").unwrap();
        assert_eq!(found.id, id(1));
        assert!(book.contact_with_name("nobody").is_none());
    }

    // ===========================================
    // Reload and cancellation
    // ===========================================

    #[test]
    fn reload_swaps_in_new_corpus() {
        let mut book = AddressBook::load(sample_records()).unwrap();
        let replaced = book
            .reload(
                vec![ContactRecord::person(id(7), "New", "Person").with_note("#fresh")],
                &CancelToken::new(),
            )
            .unwrap();
        assert!(replaced);
        assert_eq!(book.contact_count(), 1);
        assert!(book.tags_matching("vip").is_empty());
        assert_eq!(book.tags_matching("fresh").len(), 1);
    }

    #[test]
    fn cancelled_reload_discards_partial_results() {
        let mut book = AddressBook::load(sample_records()).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let replaced = book
            .reload(
                vec![ContactRecord::person(id(7), "New", "Person").with_note("#fresh")],
                &cancel,
            )
            .unwrap();
        assert!(!replaced);
        // The live session is untouched.
        assert_eq!(book.contact_count(), 3);
        assert_eq!(book.tags_matching("vip").len(), 1);
        assert!(book.tags_matching("fresh").is_empty());
    }

    // ===========================================
    // JSON loading
    // ===========================================

    #[test]
    fn records_parse_from_json() {
        let json = r##"[
            {"id": 1, "first_name": "Ada", "last_name": "Lovelace", "note": "#vip"},
            {"id": 2, "organization_name": "Acme Corp", "is_organization": true}
        ]"##;
        let records = records_from_json(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].note, "#vip");
        assert!(records[1].is_organization);
        assert_eq!(records[1].note, "");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(records_from_json("not json".as_bytes()).is_err());
    }
}
