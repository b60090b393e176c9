//! ## Contents
//! This module contains the ranked items of the prefix tree. The key exported data structures are:
//! - [Content] which wraps a host supplied value together with its keywords, its usage statistic
//!   and the nodes it currently terminates at
//! - [ContentBank] which owns all contents and hands out [ContentId]s for them
//!
//! Contents are identified by value equality: registering an equal value twice yields the same
//! [ContentId].

use std::{cmp::Ordering, hash::Hash};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use crate::{
    char_map::eq_folded, keyword::Keyword, node::NodeId, sorted_array::SortedArray,
    statistic::Statistic,
};

/// Identifier of a [Content] inside its [ContentBank].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentId(u32);

impl ContentId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A host value made reachable through one or more keywords.
#[derive(Debug, Clone)]
pub struct Content<V> {
    value: V,
    statistic: Statistic,
    keywords: SortedArray<Keyword>,
    /// The nodes this content terminates at, without duplicates.
    nodes: Vec<NodeId>,
}

impl<V> Content<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            statistic: Statistic::new(),
            keywords: SortedArray::new(),
            nodes: Vec::new(),
        }
    }

    /// The wrapped value, without any ranking side effect.
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn statistic(&self) -> &Statistic {
        &self.statistic
    }

    /// All keywords of this content, best ranked first.
    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> + '_ {
        self.keywords.iter()
    }

    /// The keyword with exactly the text `text`, case included.
    pub fn keyword(&self, text: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|kw| **kw == *text)
    }

    /// The keywords starting with `prefix` up to case, best ranked first.
    pub fn keywords_with_prefix(&self, prefix: &str) -> Vec<&Keyword> {
        self.keywords
            .iter()
            .filter(|kw| kw.matches_prefix(prefix))
            .collect()
    }

    /// The nodes this content currently terminates at.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Check whether one of the keywords folds to exactly `path`.
    pub fn has_keyword_for_path(&self, path: &str) -> bool {
        self.keywords.iter().any(|kw| eq_folded(kw.text(), path))
    }

    /// Check whether one of the keywords passes through the node at `path`, that is the keyword
    /// starts with `path` up to case.
    pub fn has_keyword_through(&self, path: &str) -> bool {
        self.keywords.iter().any(|kw| kw.matches_prefix(path))
    }

    /// Add a never used keyword, or keep the existing one with the same text. Returns whether the
    /// keyword was new.
    pub(crate) fn add_keyword(&mut self, keyword: Keyword) -> bool {
        if self.keywords.contains(&keyword) {
            return false;
        }
        self.keywords.add_by(keyword, Keyword::rank)
    }

    /// Remember that this content terminates at `node`. Returns whether the node was new.
    pub(crate) fn update_node(&mut self, node: NodeId) -> bool {
        if self.nodes.contains(&node) {
            false
        } else {
            self.nodes.push(node);
            true
        }
    }

    /// Detach this content from `node`, whose path is `path`.
    ///
    /// With a `keyword` only that exact keyword is dropped, without one every keyword leading to
    /// `path` is dropped. The node itself is only forgotten once no remaining keyword leads to
    /// `path`. Returns whether the node was forgotten, in which case the caller must also remove
    /// this content from the node.
    pub(crate) fn delete_node(&mut self, node: NodeId, path: &str, keyword: Option<&str>) -> bool {
        match keyword {
            Some(keyword) => {
                self.keywords.retain(|kw| *kw != *keyword);
            }
            None => self.keywords.retain(|kw| !eq_folded(kw.text(), path)),
        }
        if self.has_keyword_for_path(path) {
            return false;
        }
        let len = self.nodes.len();
        self.nodes.retain(|n| *n != node);
        len != self.nodes.len()
    }

    /// Record a use of the content itself at `now`.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.statistic.update_at(now);
    }

    /// Record a use of the keyword `text` at `now`. Returns `false` if there is no such keyword.
    pub(crate) fn touch_keyword(&mut self, text: &str, now: DateTime<Utc>) -> bool {
        let Some(idx) = self.keywords.iter().position(|kw| *kw == *text) else {
            return false;
        };
        if let Some(mut keyword) = self.keywords.delete(idx) {
            keyword.statistic_mut().update_at(now);
            self.keywords.add_by(keyword, Keyword::rank);
        }
        true
    }

    pub(crate) fn set_statistic(&mut self, statistic: Statistic) {
        self.statistic = statistic;
    }

    /// Overwrite the statistic of the keyword `text`. Returns `false` if there is no such keyword.
    pub(crate) fn set_keyword_statistic(&mut self, text: &str, statistic: Statistic) -> bool {
        if self.keyword(text).is_none() {
            return false;
        }
        self.keywords
            .add_by(Keyword::with_statistic(text, statistic), Keyword::rank);
        true
    }
}

/// Owner of all [Content]s of a prefix tree.
#[derive(Debug, Clone)]
pub struct ContentBank<V> {
    contents: Vec<Option<Content<V>>>,
    by_value: FxHashMap<V, ContentId>,
}

impl<V: Hash + Eq + Clone> ContentBank<V> {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self {
            contents: Vec::new(),
            by_value: FxHashMap::default(),
        }
    }

    /// Return the content for `value`, creating it if the bank does not know an equal value yet.
    pub fn register(&mut self, value: V) -> ContentId {
        if let Some(id) = self.by_value.get(&value) {
            return *id;
        }
        let id = ContentId(
            self.contents
                .len()
                .try_into()
                .unwrap_or_else(|_| panic!("more than {} contents", u32::MAX)),
        );
        self.by_value.insert(value.clone(), id);
        self.contents.push(Some(Content::new(value)));
        id
    }

    /// Find the content holding a value equal to `value`.
    pub fn find(&self, value: &V) -> Option<ContentId> {
        self.by_value.get(value).copied()
    }

    /// Forget the content `id`. Identifiers are never reused.
    pub fn remove(&mut self, id: ContentId) -> Option<Content<V>> {
        let content = self.contents.get_mut(id.index())?.take()?;
        self.by_value.remove(&content.value);
        Some(content)
    }
}

impl<V> ContentBank<V> {
    pub fn get(&self, id: ContentId) -> Option<&Content<V>> {
        self.contents.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ContentId) -> Option<&mut Content<V>> {
        self.contents.get_mut(id.index())?.as_mut()
    }

    /// Number of live contents.
    pub fn len(&self) -> usize {
        self.contents.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all live contents.
    pub fn iter(&self) -> impl Iterator<Item = (ContentId, &Content<V>)> + '_ {
        self.contents
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.as_ref().map(|c| (ContentId(idx as u32), c)))
    }

    /// Ranking order of suggestion caches: the content with the better statistic comes first.
    pub fn rank(&self, a: &ContentId, b: &ContentId) -> Ordering {
        match (self.get(*a), self.get(*b)) {
            (Some(a), Some(b)) => a.statistic.cmp(&b.statistic),
            _ => Ordering::Equal,
        }
    }
}

impl<V: Hash + Eq + Clone> Default for ContentBank<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use chrono::DateTime;

    use crate::{keyword::Keyword, node::NodeId};

    use super::ContentBank;

    #[test]
    fn registering_is_by_value() {
        let mut bank = ContentBank::new();
        let a = bank.register("chicken".to_string());
        let b = bank.register("watch".to_string());
        assert_ne!(a, b);
        assert_eq!(bank.register("chicken".to_string()), a);
        assert_eq!(bank.find(&"watch".to_string()), Some(b));
        assert_eq!(bank.len(), 2);

        let removed = bank.remove(a).unwrap();
        assert_eq!(removed.value(), "chicken");
        assert!(bank.get(a).is_none());
        assert_eq!(bank.find(&"chicken".to_string()), None);
        // identifiers are not reused
        assert_ne!(bank.register("chicken".to_string()), a);
    }

    #[test]
    fn keyword_bookkeeping() {
        let mut bank = ContentBank::new();
        let id = bank.register("dog");
        let content = bank.get_mut(id).unwrap();
        assert!(content.add_keyword(Keyword::new("Dog")));
        assert!(content.add_keyword(Keyword::new("doggo")));
        assert!(!content.add_keyword(Keyword::new("Dog")));

        let now = DateTime::from_timestamp_millis(1_000).unwrap();
        assert!(content.touch_keyword("doggo", now));
        assert!(!content.touch_keyword("DOGGO", now));
        let texts: Vec<_> = content.keywords().map(|kw| kw.text()).collect();
        assert_eq!(texts, vec!["doggo", "Dog"]);

        let texts: Vec<_> = content
            .keywords_with_prefix("DOG")
            .into_iter()
            .map(|kw| kw.text())
            .collect();
        assert_eq!(texts, vec!["doggo", "Dog"]);
        assert!(content.keywords_with_prefix("cat").is_empty());
    }

    #[test]
    fn delete_node_keeps_case_variants() {
        let mut bank = ContentBank::new();
        let id = bank.register("watch");
        let node = NodeId::from_index(3);
        let content = bank.get_mut(id).unwrap();
        content.add_keyword(Keyword::new("abc"));
        content.add_keyword(Keyword::new("ABC"));
        content.update_node(node);

        // another keyword still leads to the node
        assert!(!content.delete_node(node, "abc", Some("abc")));
        assert_eq!(content.nodes(), &[node]);
        assert!(content.delete_node(node, "abc", Some("ABC")));
        assert!(content.nodes().is_empty());
        assert_eq!(content.keywords().count(), 0);
    }

    #[test]
    fn delete_node_without_keyword_drops_all_variants() {
        let mut bank = ContentBank::new();
        let id = bank.register("watch");
        let node = NodeId::from_index(3);
        let content = bank.get_mut(id).unwrap();
        content.add_keyword(Keyword::new("abc"));
        content.add_keyword(Keyword::new("Abc"));
        content.add_keyword(Keyword::new("abcd"));
        content.update_node(node);

        assert!(content.delete_node(node, "abc", None));
        let texts: Vec<_> = content.keywords().map(|kw| kw.text()).collect();
        assert_eq!(texts, vec!["abcd"]);
        assert!(content.has_keyword_through("ab"));
        assert!(!content.has_keyword_for_path("ab"));
    }
}
