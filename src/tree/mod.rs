//! Ternary search tree: ordered prefix index over tag keys.

use std::collections::BTreeSet;
use std::str::Chars;
use thiserror::Error;

/// Errors that can occur on tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// An empty key was passed to `insert` or `remove`.
    #[error("key cannot be empty")]
    EmptyKey,
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug)]
struct Node<T> {
    ch: char,
    lo: Option<Box<Node<T>>>,
    eq: Option<Box<Node<T>>>,
    hi: Option<Box<Node<T>>>,
    /// `Some` marks the end of a stored key; the set holds its owners.
    /// Pruning clears this back to `None` when the last owner is removed.
    owners: Option<BTreeSet<T>>,
}

impl<T> Node<T> {
    fn new(ch: char) -> Self {
        Self {
            ch,
            lo: None,
            eq: None,
            hi: None,
            owners: None,
        }
    }

    /// A node with no end marker and no subtree holds nothing and can be
    /// dropped by its parent.
    fn is_dead(&self) -> bool {
        self.owners.is_none() && self.lo.is_none() && self.eq.is_none() && self.hi.is_none()
    }
}

/// A mutable prefix-indexed multimap from string keys to owner sets.
///
/// Each node compares one character and branches three ways: less-than,
/// equal (advance to the next key character), greater-than. Keys are
/// enumerated in lexicographic order, which callers rely on for sorted
/// autocomplete lists.
///
/// A key is *live* while its owner set is non-empty. Removing the last
/// owner prunes the key and any node chain it no longer shares with other
/// keys, so enumeration never reports ownerless keys and memory stays
/// bounded by the live key set.
///
/// Empty keys cannot be stored: `insert` and `remove` reject `""` with
/// [`TreeError::EmptyKey`], while `contains` and `lookup` simply report it
/// absent.
///
/// # Examples
///
/// ```
/// use contact_notes::tree::TernarySearchTree;
///
/// let mut tree = TernarySearchTree::new();
/// tree.insert("alice", 1).unwrap();
/// tree.insert("alan", 2).unwrap();
/// let keys: Vec<String> = tree.prefix_search("al").into_iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec!["alan", "alice"]);
/// ```
#[derive(Debug)]
pub struct TernarySearchTree<T> {
    root: Option<Box<Node<T>>>,
    len: usize,
}

impl<T: Ord + Clone> TernarySearchTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of live keys (keys with at least one owner).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `item` to the owner set of `key`, creating the key's node path
    /// if it is absent.
    ///
    /// Returns `Ok(true)` if the (key, item) pair was newly added, and
    /// `Ok(false)` if it was already present; inserting the same pair twice
    /// has no further effect.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyKey`] for an empty key.
    pub fn insert(&mut self, key: &str, item: T) -> TreeResult<bool> {
        let mut chars = key.chars();
        let first = chars.next().ok_or(TreeError::EmptyKey)?;
        let (pair_added, key_added) = Self::insert_at(&mut self.root, first, &mut chars, item);
        if key_added {
            self.len += 1;
        }
        Ok(pair_added)
    }

    fn insert_at(
        slot: &mut Option<Box<Node<T>>>,
        ch: char,
        rest: &mut Chars<'_>,
        item: T,
    ) -> (bool, bool) {
        let node = slot.get_or_insert_with(|| Box::new(Node::new(ch)));
        if ch < node.ch {
            Self::insert_at(&mut node.lo, ch, rest, item)
        } else if ch > node.ch {
            Self::insert_at(&mut node.hi, ch, rest, item)
        } else {
            match rest.next() {
                Some(next) => Self::insert_at(&mut node.eq, next, rest, item),
                None => {
                    let owners = node.owners.get_or_insert_with(BTreeSet::new);
                    let key_added = owners.is_empty();
                    let pair_added = owners.insert(item);
                    (pair_added, key_added)
                }
            }
        }
    }

    /// Removes `item` from the owner set of `key`.
    ///
    /// Returns `Ok(true)` if the pair existed. Removing an unknown pair is
    /// a no-op returning `Ok(false)`. When the last owner of a key is
    /// removed, the key's end marker is cleared and any node chain left
    /// without an end marker or subtree is pruned.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyKey`] for an empty key.
    pub fn remove(&mut self, key: &str, item: &T) -> TreeResult<bool> {
        let mut chars = key.chars();
        let first = chars.next().ok_or(TreeError::EmptyKey)?;
        let (removed, key_gone) = Self::remove_at(&mut self.root, first, &mut chars, item);
        if key_gone {
            self.len -= 1;
        }
        Ok(removed)
    }

    fn remove_at(
        slot: &mut Option<Box<Node<T>>>,
        ch: char,
        rest: &mut Chars<'_>,
        item: &T,
    ) -> (bool, bool) {
        let Some(node) = slot.as_deref_mut() else {
            return (false, false);
        };

        let result = if ch < node.ch {
            Self::remove_at(&mut node.lo, ch, rest, item)
        } else if ch > node.ch {
            Self::remove_at(&mut node.hi, ch, rest, item)
        } else {
            match rest.next() {
                Some(next) => Self::remove_at(&mut node.eq, next, rest, item),
                None => match node.owners.as_mut() {
                    Some(owners) => {
                        let removed = owners.remove(item);
                        let key_gone = removed && owners.is_empty();
                        if key_gone {
                            node.owners = None;
                        }
                        (removed, key_gone)
                    }
                    None => (false, false),
                },
            }
        };

        if slot.as_ref().is_some_and(|n| n.is_dead()) {
            *slot = None;
        }
        result
    }

    /// Whether `key` is live (stored with at least one owner).
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the owner set of `key`, or `None` if the key is not live.
    pub fn lookup(&self, key: &str) -> Option<&BTreeSet<T>> {
        self.find_node(key)
            .and_then(|node| node.owners.as_ref())
            .filter(|owners| !owners.is_empty())
    }

    /// Returns every `(key, owners)` pair whose key starts with `prefix`,
    /// in lexicographic key order.
    ///
    /// The empty prefix enumerates the whole tree; a prefix with no matches
    /// yields an empty vector.
    pub fn prefix_search(&self, prefix: &str) -> Vec<(String, BTreeSet<T>)> {
        let mut out = Vec::new();

        if prefix.is_empty() {
            let mut buf = String::new();
            Self::collect(self.root.as_deref(), &mut buf, &mut out);
            return out;
        }

        let Some(node) = self.find_node(prefix) else {
            return out;
        };
        Self::push_live(prefix, node.owners.as_ref(), &mut out);
        let mut buf = prefix.to_string();
        Self::collect(node.eq.as_deref(), &mut buf, &mut out);
        out
    }

    /// Descends the ternary path for `key`, returning the node matching its
    /// final character. The node may or may not carry an end marker.
    fn find_node(&self, key: &str) -> Option<&Node<T>> {
        let mut chars = key.chars();
        let mut ch = chars.next()?;
        let mut cur = self.root.as_deref()?;
        loop {
            if ch < cur.ch {
                cur = cur.lo.as_deref()?;
            } else if ch > cur.ch {
                cur = cur.hi.as_deref()?;
            } else {
                match chars.next() {
                    Some(next) => {
                        ch = next;
                        cur = cur.eq.as_deref()?;
                    }
                    None => return Some(cur),
                }
            }
        }
    }

    /// In-order traversal: less-than subtree, this key (shorter keys sort
    /// before their extensions), equal subtree, greater-than subtree.
    fn collect(node: Option<&Node<T>>, buf: &mut String, out: &mut Vec<(String, BTreeSet<T>)>) {
        let Some(node) = node else {
            return;
        };
        Self::collect(node.lo.as_deref(), buf, out);
        buf.push(node.ch);
        Self::push_live(buf, node.owners.as_ref(), out);
        Self::collect(node.eq.as_deref(), buf, out);
        buf.pop();
        Self::collect(node.hi.as_deref(), buf, out);
    }

    /// Yields a key if its end marker carries owners. An ownerless end
    /// marker means pruning failed somewhere: fatal in debug builds, logged
    /// and skipped in release builds so enumeration self-heals.
    fn push_live(key: &str, owners: Option<&BTreeSet<T>>, out: &mut Vec<(String, BTreeSet<T>)>) {
        let Some(owners) = owners else {
            return;
        };
        debug_assert!(
            !owners.is_empty(),
            "ownerless terminal node for key '{key}'"
        );
        if owners.is_empty() {
            log::warn!("tag tree: skipping ownerless terminal node for key '{key}'");
            return;
        }
        out.push((key.to_string(), owners.clone()));
    }
}

impl<T: Ord + Clone> Default for TernarySearchTree<T> {
    fn default() -> Self {
        Self::new()
    }
}
