//! Tag index: scans notes, diffs tag sets, and keeps the search tree current.

use crate::domain::{ContactId, Tag};
use crate::scan::TagSyntax;
use crate::tree::{TernarySearchTree, TreeError};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors that can occur during index operations.
///
/// The index derives every tree key from successfully normalized scan
/// output, so these never fire in practice; tree precondition failures
/// still propagate rather than being swallowed.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A tree precondition was violated.
    #[error("tree operation failed: {0}")]
    Tree(#[from] TreeError),
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// One autocomplete row: a tag and the contacts currently using it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagMatch {
    /// The matched tag.
    pub tag: Tag,
    /// Contacts whose note currently contains the tag.
    pub contacts: BTreeSet<ContactId>,
}

/// The tree operations a note change actually performed.
///
/// Tags present in both the old and new note are untouched, so the delta
/// bounds the work done per edit and is directly observable in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDelta {
    /// Tags newly inserted for the contact.
    pub added: BTreeSet<Tag>,
    /// Tags removed for the contact.
    pub removed: BTreeSet<Tag>,
}

impl NoteDelta {
    /// Whether the change touched the tree at all.
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// In-memory index from tags to the contacts whose notes use them.
///
/// Owns the ternary search tree plus a cache of each contact's last applied
/// note, so a note change only needs the new text: the index re-scans both
/// versions, diffs the normalized tag sets, and applies just the delta to
/// the tree. No other component mutates the tree.
///
/// All mutation goes through `&mut self`, so the borrow checker serializes
/// writes against reads; queries on `&self` always observe a fully linked
/// tree. Rebuilding via [`load_all`](Self::load_all) is a single exclusive
/// operation.
///
/// # Examples
///
/// ```
/// use contact_notes::domain::ContactId;
/// use contact_notes::index::TagIndex;
///
/// let mut index = TagIndex::new();
/// index.note_changed(ContactId::new(1), "met at #rustconf")?;
/// let matches = index.tags_matching("rust");
/// assert_eq!(matches[0].tag.as_str(), "rustconf");
/// # Ok::<(), contact_notes::index::IndexError>(())
/// ```
#[derive(Debug, Default)]
pub struct TagIndex {
    syntax: TagSyntax,
    tree: TernarySearchTree<ContactId>,
    notes: HashMap<ContactId, String>,
}

impl TagIndex {
    /// Creates an empty index with the default `#` syntax.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with a custom tag syntax.
    pub fn with_syntax(syntax: TagSyntax) -> Self {
        Self {
            syntax,
            tree: TernarySearchTree::new(),
            notes: HashMap::new(),
        }
    }

    /// The tag syntax this index scans with.
    pub fn syntax(&self) -> TagSyntax {
        self.syntax
    }

    /// Scans a note and normalizes the occurrences into a tag set.
    fn tags_in(&self, text: &str) -> BTreeSet<Tag> {
        self.syntax
            .scan(text)
            .iter()
            .filter_map(|occurrence| occurrence.to_tag().ok())
            .collect()
    }

    /// Applies a contact's new note text.
    ///
    /// Diffs the new tag set against the one derived from the contact's
    /// previous note (empty for a first-seen contact) and applies only the
    /// difference to the tree. Returns the delta actually applied.
    pub fn note_changed(&mut self, id: ContactId, new_text: &str) -> IndexResult<NoteDelta> {
        let old_tags = match self.notes.get(&id) {
            Some(old_text) => self.tags_in(old_text),
            None => BTreeSet::new(),
        };
        let new_tags = self.tags_in(new_text);

        let removed: BTreeSet<Tag> = old_tags.difference(&new_tags).cloned().collect();
        let added: BTreeSet<Tag> = new_tags.difference(&old_tags).cloned().collect();

        for tag in &removed {
            self.tree.remove(tag.as_str(), &id)?;
        }
        for tag in &added {
            self.tree.insert(tag.as_str(), id)?;
        }
        self.notes.insert(id, new_text.to_string());

        Ok(NoteDelta { added, removed })
    }

    /// Drops a contact entirely: removes all of its tags from the tree and
    /// evicts its cached note.
    pub fn contact_removed(&mut self, id: &ContactId) -> IndexResult<NoteDelta> {
        let delta = self.note_changed(*id, "")?;
        self.notes.remove(id);
        Ok(delta)
    }

    /// Returns every tag starting with `prefix` and its current owners, in
    /// lexicographic tag order.
    ///
    /// The prefix is case-folded to match tag normalization, so typing
    /// `Al` finds `#alice`. An empty prefix lists the full vocabulary.
    pub fn tags_matching(&self, prefix: &str) -> Vec<TagMatch> {
        let prefix = prefix.to_lowercase();
        self.tree
            .prefix_search(&prefix)
            .into_iter()
            .filter_map(|(key, contacts)| match Tag::new(&key) {
                Ok(tag) => Some(TagMatch { tag, contacts }),
                Err(_) => {
                    debug_assert!(false, "non-tag key '{key}' stored in tree");
                    log::warn!("tag index: skipping non-tag key '{key}'");
                    None
                }
            })
            .collect()
    }

    /// Returns the contacts currently using `tag` exactly (empty set if
    /// none).
    pub fn contacts_with(&self, tag: &Tag) -> BTreeSet<ContactId> {
        self.tree.lookup(tag.as_str()).cloned().unwrap_or_default()
    }

    /// Returns the tags currently derived from one contact's note.
    pub fn tags_for(&self, id: &ContactId) -> BTreeSet<Tag> {
        self.notes
            .get(id)
            .map(|note| self.tags_in(note))
            .unwrap_or_default()
    }

    /// Number of distinct live tags.
    pub fn tag_count(&self) -> usize {
        self.tree.len()
    }

    /// Rebuilds the index from scratch over a contact/note corpus.
    ///
    /// Clears all existing state first. Contacts with empty notes are
    /// skipped. Returns the number of contacts indexed. Cross-contact order
    /// within the corpus does not matter; operations for distinct contacts
    /// commute.
    pub fn load_all<I>(&mut self, records: I) -> IndexResult<usize>
    where
        I: IntoIterator<Item = (ContactId, String)>,
    {
        self.clear();
        let mut indexed = 0;
        for (id, note) in records {
            if note.is_empty() {
                continue;
            }
            self.note_changed(id, &note)?;
            indexed += 1;
        }
        Ok(indexed)
    }

    /// Drops the whole index: tree and note cache.
    pub fn clear(&mut self) {
        self.tree = TernarySearchTree::new();
        self.notes.clear();
    }
}
