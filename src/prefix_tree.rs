//! ## Ranked Prefix Tree
//! This module contains [PrefixTree], a case insensitive trie over keywords where every node caches
//! the rank ordered list of all contents reachable at or below it. The caches are maintained
//! incrementally:
//! - adding or reading a content repositions it in the cache of every node from its terminal
//!   nodes up to the root
//! - deleting a content walks upwards from the node it was detached from and retracts it from the
//!   caches until some ancestor is still justified by another keyword of the content, or the
//!   content is already absent
//!
//! The first character of a keyword selects a root node, every further character one child. A
//! single character keyword therefore only ever creates a root, contents are never attached to
//! roots directly, though roots do cache the suggestions of their subtrees.

use std::hash::Hash;

use chrono::{DateTime, Utc};
use log::{debug, trace};

use crate::{
    char_map::{CharMap, eq_folded, fold_char},
    content::{Content, ContentBank, ContentId},
    keyword::Keyword,
    node::{Node, NodeId},
    recent::RecentlyUsed,
    statistic::Statistic,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeConfig {
    /// How many contents the recently used list remembers.
    pub recent_cutoff: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig { recent_cutoff: 5 }
    }
}

/// One entry of [PrefixTree::suggest].
#[derive(Debug, Clone, Copy)]
pub struct Suggestion<'a, V> {
    pub content: ContentId,
    pub value: &'a V,
    /// The best ranked keyword of the content matching the query.
    pub keyword: Option<&'a Keyword>,
}

#[derive(Debug, Clone)]
pub struct PrefixTree<V> {
    roots: CharMap,
    nodes: Vec<Node>,
    bank: ContentBank<V>,
    recent: RecentlyUsed,
}

/// Queries must be non empty and must neither start nor end with whitespace.
fn is_valid_query(query: &str) -> bool {
    match (query.chars().next(), query.chars().next_back()) {
        (Some(first), Some(last)) => !first.is_whitespace() && !last.is_whitespace(),
        _ => false,
    }
}

fn alloc_node(nodes: &mut Vec<Node>, key: char, parent: Option<NodeId>, depth: usize) -> NodeId {
    let id = NodeId::from_index(nodes.len());
    nodes.push(Node::new(key, parent, depth));
    id
}

impl<V: Hash + Eq + Clone> PrefixTree<V> {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            roots: CharMap::new(),
            nodes: Vec::new(),
            bank: ContentBank::new(),
            recent: RecentlyUsed::new(config.recent_cutoff),
        }
    }

    /// Return the content for `value`, creating it if no equal value is known yet.
    pub fn register(&mut self, value: V) -> ContentId {
        self.bank.register(value)
    }

    pub fn find_content(&self, value: &V) -> Option<ContentId> {
        self.bank.find(value)
    }

    /// Register `value` and make it reachable through `query`.
    pub fn insert(&mut self, query: &str, value: V) -> Option<ContentId> {
        if !is_valid_query(query) || query.chars().count() < 2 {
            debug!("Not inserting under {query:?}");
            return None;
        }
        let id = self.register(value);
        self.add(query, Some(id))?;
        Some(id)
    }

    /// Forget `id` entirely, detaching it from every node first. Returns the wrapped value.
    pub fn remove_content(&mut self, id: ContentId) -> Option<V> {
        self.clean_up(id);
        self.bank.remove(id).map(Content::into_value)
    }

    /// Delete the keyword `keyword` of the content holding `value`. Returns `false` if there was
    /// nothing to delete.
    pub fn delete(&mut self, keyword: &str, value: &V) -> bool {
        let Some(node) = self.search(keyword) else {
            return false;
        };
        self.delete_content(node, value, Some(keyword))
    }

    /// Detach the content holding `value` from `node`. With a `keyword` only that exact keyword
    /// is removed and the content stays attached if another keyword, differing in case, still
    /// leads to `node`. Without a keyword the content is detached unconditionally.
    pub fn delete_content(&mut self, node: NodeId, value: &V, keyword: Option<&str>) -> bool {
        let Some(id) = self.bank.find(value) else {
            return false;
        };
        if !self.holds(node, id) {
            return false;
        }
        self.detach(node, id, keyword)
    }

    /// Move the keyword `keyword` of the content holding `value` to `dest`. The content and the
    /// moved keyword keep their statistics. Does nothing and returns `false` if the content does
    /// not carry exactly `keyword` or `dest` cannot hold contents.
    pub fn move_content(&mut self, keyword: &str, dest: &str, value: &V) -> bool {
        if !is_valid_query(dest) || dest.chars().count() < 2 {
            return false;
        }
        let Some(node) = self.search(keyword) else {
            return false;
        };
        let Some(id) = self.bank.find(value) else {
            return false;
        };
        if !self.holds(node, id) {
            return false;
        }
        let Some(statistic) = self
            .bank
            .get(id)
            .and_then(|c| c.keyword(keyword))
            .map(|kw| *kw.statistic())
        else {
            return false;
        };
        if keyword == dest {
            return true;
        }

        debug!("Moving {id:?} from {keyword:?} to {dest:?}");
        self.detach(node, id, Some(keyword));
        let Some(dest_node) = self.add(dest, None) else {
            return false;
        };
        self.add_content(dest_node, id, dest);
        if let Some(content) = self.bank.get_mut(id) {
            let existing = content.keyword(dest).map(|kw| *kw.statistic());
            if existing.is_none_or(|existing| existing < statistic) {
                content.set_keyword_statistic(dest, statistic);
            }
        }
        true
    }
}

impl<V> PrefixTree<V> {
    /// Make sure the path for `query` exists and, given a `content`, attach it to the terminal node
    /// under the keyword `query`. Returns the terminal node, `None` if `query` is invalid.
    ///
    /// A single character `query` only creates its root node, a given content is ignored.
    pub fn add(&mut self, query: &str, content: Option<ContentId>) -> Option<NodeId> {
        if !is_valid_query(query) {
            debug!("Rejecting keyword {query:?}");
            return None;
        }
        let mut chars = query.chars();
        let first = chars.next()?;
        let nodes = &mut self.nodes;
        let root = self
            .roots
            .get_or_create(first, |key| alloc_node(nodes, key, None, 1));

        let mut cursor = root;
        for ch in chars {
            let depth = self.nodes[cursor.index()].depth() + 1;
            cursor = match self.nodes[cursor.index()].child(ch) {
                Some(child) => child,
                None => {
                    let key = fold_char(ch);
                    let child = alloc_node(&mut self.nodes, key, Some(cursor), depth);
                    self.nodes[cursor.index()]
                        .children_mut()
                        .get_or_create(ch, |_| child);
                    child
                }
            };
        }

        if let Some(content) = content {
            if cursor == root {
                debug!("Ignoring {content:?} for single character keyword {query:?}");
            } else {
                self.add_content(cursor, content, query);
            }
        }
        Some(cursor)
    }

    /// Find the node for `query`, ignoring case. Never creates nodes.
    pub fn search(&self, query: &str) -> Option<NodeId> {
        if !is_valid_query(query) {
            return None;
        }
        let mut chars = query.chars();
        let mut cursor = self.roots.get(chars.next()?)?;
        for ch in chars {
            cursor = self.nodes[cursor.index()].child(ch)?;
        }
        Some(cursor)
    }

    /// Attach `content` to `node` under `keyword` and propagate it up to the root. An empty
    /// `keyword` stands for the folded path of `node`, unless the content already has a keyword
    /// leading there. Returns `false` for unknown contents and nodes, for roots, and for a
    /// `keyword` that does not lead to `node`.
    pub fn add_content(&mut self, node: NodeId, content: ContentId, keyword: &str) -> bool {
        let Some(path) = self.path(node) else {
            return false;
        };
        if self.nodes[node.index()].is_root() {
            debug!("Not attaching {content:?} to root {path:?}");
            return false;
        }
        if !keyword.is_empty() && !eq_folded(keyword, &path) {
            debug!("Keyword {keyword:?} does not lead to {path:?}");
            return false;
        }
        let Some(c) = self.bank.get_mut(content) else {
            return false;
        };
        self.nodes[node.index()].insert_content(content);
        c.update_node(node);
        if !keyword.is_empty() {
            c.add_keyword(Keyword::new(keyword));
        } else if !c.has_keyword_for_path(&path) {
            c.add_keyword(Keyword::new(&path));
        }
        self.update_suggestion_up_to_root(node, content);
        true
    }

    /// Check whether `node` belongs to this tree and has `content` as a member.
    fn holds(&self, node: NodeId, content: ContentId) -> bool {
        self.nodes
            .get(node.index())
            .is_some_and(|n| n.contents().contains(&content))
    }

    /// Reposition `content` in the suggestion cache of `node` and every ancestor. There is no
    /// early exit: a content keeping its index at some node may still move further up.
    fn update_suggestion_up_to_root(&mut self, node: NodeId, content: ContentId) {
        let bank = &self.bank;
        let mut cursor = Some(node);
        let mut visited = 0usize;
        while let Some(id) = cursor {
            let node = &mut self.nodes[id.index()];
            node.suggestions_mut()
                .add_by(content, |a, b| bank.rank(a, b));
            cursor = node.parent();
            visited += 1;
        }
        trace!("Propagated {content:?} through {visited} nodes");
    }

    /// Detach `content` from `node` as described in [PrefixTree::delete_content].
    ///
    /// Whether the content still terminates at `node` is decided once, by the content, and both
    /// sides of the membership are updated from that single decision: first the content forgets
    /// the node, then the node forgets the content. Nothing in between can fail. A `keyword` that
    /// does not lead to `node` detaches nothing.
    fn detach(&mut self, node: NodeId, content: ContentId, keyword: Option<&str>) -> bool {
        let Some(path) = self.path(node) else {
            return false;
        };
        if keyword.is_some_and(|kw| !eq_folded(kw, &path)) {
            debug!("Keyword {keyword:?} does not lead to {path:?}");
            return false;
        }
        let Some(c) = self.bank.get_mut(content) else {
            return false;
        };
        let keywords_before = c.keywords().count();
        let detached = c.delete_node(node, &path, keyword);
        let keyword_removed = c.keywords().count() != keywords_before;
        if detached {
            self.nodes[node.index()].remove_content(content);
            self.update_suggestion_up_to_root_after_deletion(node, content, &path);
        }
        debug!("Detached {content:?} from {path:?}: node {detached}, keyword {keyword_removed}");
        detached || keyword_removed
    }

    /// Retract `content` from the caches starting at `node`, whose path is `path`, walking
    /// upwards. Stops at the first node that some remaining keyword of the content passes
    /// through, or at the first cache that did not contain the content.
    fn update_suggestion_up_to_root_after_deletion(
        &mut self,
        node: NodeId,
        content: ContentId,
        path: &str,
    ) {
        let mut prefix: Vec<char> = path.chars().collect();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let current: String = prefix.iter().collect();
            if self
                .bank
                .get(content)
                .is_some_and(|c| c.has_keyword_through(&current))
            {
                trace!("{content:?} still reachable below {current:?}");
                break;
            }
            let node = &mut self.nodes[id.index()];
            if node.suggestions_mut().delete_element(&content).is_none() {
                trace!("{content:?} already absent at {current:?}");
                break;
            }
            cursor = node.parent();
            prefix.pop();
        }
    }

    /// Detach `id` from every node it terminates at, dropping all of its keywords.
    pub fn clean_up(&mut self, id: ContentId) -> bool {
        let Some(content) = self.bank.get(id) else {
            return false;
        };
        let nodes = content.nodes().to_vec();
        for node in nodes.iter() {
            self.detach(*node, id, None);
        }
        self.recent.remove(id);
        !nodes.is_empty()
    }

    /// Return the value of `id`, recording a use of it first if `update` is set.
    pub fn read(&mut self, id: ContentId, update: bool) -> Option<&V> {
        if update {
            self.read_at(id, Utc::now())
        } else {
            self.bank.get(id).map(Content::value)
        }
    }

    /// Bump the statistic of `id` and reposition it in every cache that contains it.
    pub fn read_at(&mut self, id: ContentId, now: DateTime<Utc>) -> Option<&V> {
        let content = self.bank.get_mut(id)?;
        content.touch(now);
        let nodes = content.nodes().to_vec();
        for node in nodes {
            self.update_suggestion_up_to_root(node, id);
        }
        self.recent.touch(id);
        self.bank.get(id).map(Content::value)
    }

    /// Bump the statistic of the keyword `keyword` of `id`. The suggestion caches are unaffected.
    pub fn read_with_keyword_at(
        &mut self,
        id: ContentId,
        keyword: &str,
        now: DateTime<Utc>,
    ) -> Option<&V> {
        let content = self.bank.get_mut(id)?;
        if !content.touch_keyword(keyword, now) {
            return None;
        }
        Some(content.value())
    }

    pub fn read_with_keyword(&mut self, id: ContentId, keyword: &str) -> Option<&V> {
        self.read_with_keyword_at(id, keyword, Utc::now())
    }

    /// Install a persisted statistic for `id` and reposition it in every cache that contains it.
    pub fn restore_statistic(&mut self, id: ContentId, statistic: Statistic) -> bool {
        let Some(content) = self.bank.get_mut(id) else {
            return false;
        };
        content.set_statistic(statistic);
        let nodes = content.nodes().to_vec();
        for node in nodes {
            self.update_suggestion_up_to_root(node, id);
        }
        true
    }

    pub fn restore_keyword_statistic(
        &mut self,
        id: ContentId,
        keyword: &str,
        statistic: Statistic,
    ) -> bool {
        self.bank
            .get_mut(id)
            .is_some_and(|content| content.set_keyword_statistic(keyword, statistic))
    }

    /// The up to `limit` best suggestions for the typed `prefix`.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<Suggestion<'_, V>> {
        let Some(node) = self.search(prefix) else {
            return Vec::new();
        };
        self.nodes[node.index()]
            .suggestions()
            .iter()
            .take(limit)
            .filter_map(|id| {
                let content = self.bank.get(*id)?;
                Some(Suggestion {
                    content: *id,
                    value: content.value(),
                    keyword: content.keywords_with_prefix(prefix).first().copied(),
                })
            })
            .collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn content(&self, id: ContentId) -> Option<&Content<V>> {
        self.bank.get(id)
    }

    pub fn contents(&self) -> &ContentBank<V> {
        &self.bank
    }

    /// The contents of the node for `query`, empty if there is no such node.
    pub fn contents_at(&self, query: &str) -> &[ContentId] {
        match self.search(query) {
            Some(node) => self.nodes[node.index()].contents(),
            None => &[],
        }
    }

    /// The suggestions of the node for `query`, empty if there is no such node.
    pub fn suggestions_at(&self, query: &str) -> &[ContentId] {
        match self.search(query) {
            Some(node) => self.nodes[node.index()].suggestions(),
            None => &[],
        }
    }

    /// The most recently read contents, most recent first.
    pub fn recent(&self) -> impl Iterator<Item = ContentId> + '_ {
        self.recent.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The folded path of `node`, `None` if `node` does not belong to this tree.
    pub fn path(&self, node: NodeId) -> Option<String> {
        let mut chars = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let node = self.nodes.get(id.index())?;
            chars.push(node.key());
            cursor = node.parent();
        }
        Some(chars.iter().rev().collect())
    }
}

impl<V: Hash + Eq + Clone> Default for PrefixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
