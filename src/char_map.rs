//! ## Case Folding Child Maps
//! This module contains [CharMap], the edge map of the prefix tree, together with the case folding
//! that defines the navigation alphabet of the tree. All lookups and insertions go through
//! [fold_char] so `'A'` and `'a'` lead to the same child.

use rustc_hash::FxHashMap;

use crate::node::NodeId;

/// Fold a single character into the navigation alphabet.
///
/// Characters whose lowercase form spans several characters (e.g. `'İ'`) are kept as they are,
/// so folding never changes the number of characters in a string.
pub fn fold_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => ch,
    }
}

/// Iterate over the folded characters of `s`.
pub fn fold_chars(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(fold_char)
}

/// Check whether `s` starts with `prefix` up to case folding.
pub fn starts_with_folded(s: &str, prefix: &str) -> bool {
    let mut s = fold_chars(s);
    fold_chars(prefix).all(|p| s.next() == Some(p))
}

/// Check whether `a` and `b` are equal up to case folding.
pub fn eq_folded(a: &str, b: &str) -> bool {
    fold_chars(a).eq(fold_chars(b))
}

/// Map from a single character, in any case, to a child node.
#[derive(Debug, Clone, Default)]
pub struct CharMap {
    map: FxHashMap<char, NodeId>,
}

impl CharMap {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// Look up the node stored for `key`.
    pub fn get(&self, key: char) -> Option<NodeId> {
        self.map.get(&fold_char(key)).copied()
    }

    /// Look up the node stored for `key`, calling `make` to create one on a miss. `make` receives
    /// the folded key.
    pub fn get_or_create<F>(&mut self, key: char, make: F) -> NodeId
    where
        F: FnOnce(char) -> NodeId,
    {
        let folded = fold_char(key);
        *self.map.entry(folded).or_insert_with(|| make(folded))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the folded keys and their nodes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.map.iter().map(|(k, v)| (*k, *v))
    }
}
