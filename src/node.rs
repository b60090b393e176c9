//! ## Prefix Tree Nodes
//! A [Node] is one vertex of the prefix tree. Besides its children it knows the contents that
//! terminate exactly at it and caches the ranked list of all contents terminating at it or any of
//! its descendants, its suggestions.
//!
//! Nodes live in the arena of their [PrefixTree](crate::prefix_tree::PrefixTree) and refer to each
//! other and to contents through [NodeId]s and [ContentId]s only.

use crate::{char_map::CharMap, content::ContentId, sorted_array::SortedArray};

/// Identifier of a [Node] inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(idx: usize) -> Self {
        NodeId(idx.try_into().unwrap_or_else(|_| panic!("more than {} nodes", u32::MAX)))
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    /// The folded character on the edge leading to this node.
    key: char,
    parent: Option<NodeId>,
    depth: usize,
    children: CharMap,
    contents: Vec<ContentId>,
    suggestions: SortedArray<ContentId>,
}

impl Node {
    pub(crate) fn new(key: char, parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            key,
            parent,
            depth,
            children: CharMap::new(),
            contents: Vec::new(),
            suggestions: SortedArray::new(),
        }
    }

    pub fn key(&self) -> char {
        self.key
    }

    /// The parent node, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Number of characters on the path to this node, `1` for roots.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &CharMap {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut CharMap {
        &mut self.children
    }

    /// The child reached through `key`, in any case.
    pub fn child(&self, key: char) -> Option<NodeId> {
        self.children.get(key)
    }

    /// The contents terminating exactly at this node.
    pub fn contents(&self) -> &[ContentId] {
        &self.contents
    }

    /// The contents terminating at this node or below, best ranked first.
    pub fn suggestions(&self) -> &[ContentId] {
        self.suggestions.as_slice()
    }

    pub(crate) fn suggestions_mut(&mut self) -> &mut SortedArray<ContentId> {
        &mut self.suggestions
    }

    /// Add `content` to the members of this node. Returns whether it was new.
    pub(crate) fn insert_content(&mut self, content: ContentId) -> bool {
        if self.contents.contains(&content) {
            false
        } else {
            self.contents.push(content);
            true
        }
    }

    /// Remove `content` from the members of this node. Returns whether it was a member.
    pub(crate) fn remove_content(&mut self, content: ContentId) -> bool {
        let len = self.contents.len();
        self.contents.retain(|c| *c != content);
        len != self.contents.len()
    }
}
