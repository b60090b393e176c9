//! # KSuggest
//! This library contains a ranked prefix tree for keyword suggestions. Keywords are case
//! insensitive paths through the tree, each of them leading to one or more shared contents. Every
//! node caches the contents reachable at or below it, ordered by how often and how recently they
//! were used, and these caches are maintained incrementally as contents are added, read, moved and
//! deleted. Additionally [catalog] is able to feed a tree from a plain text catalog and to persist
//! usage statistics.

pub mod catalog;
pub mod char_map;
pub mod content;
pub mod keyword;
pub mod node;
pub mod prefix_tree;
pub mod recent;
pub mod sorted_array;
pub mod statistic;
