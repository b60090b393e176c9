//! ## Sorted Arrays
//! This module provides [SortedArray], a vector that is kept in descending rank order by
//! repositioning single elements instead of re-sorting the whole vector after every change.
//!
//! The ranking function is passed to every mutating call rather than stored, as the ranks usually
//! live in some bank that the array itself must not borrow. The caller has to guarantee that,
//! apart from the element being added, the ranks of all stored elements did not change since they
//! were last positioned.

use std::{cmp::Ordering, slice};

/// A vector of unique elements ordered by descending rank. Equality of elements is decided by
/// their [PartialEq] instance, which need not agree with the rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedArray<E> {
    vec: Vec<E>,
}

impl<E: PartialEq> SortedArray<E> {
    /// Create a new empty array.
    pub fn new() -> Self {
        Self { vec: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, E> {
        self.vec.iter()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.vec
    }

    pub fn get(&self, idx: usize) -> Option<&E> {
        self.vec.get(idx)
    }

    pub fn contains(&self, element: &E) -> bool {
        self.position(element).is_some()
    }

    /// Index of the element equal to `element`, if any.
    pub fn position(&self, element: &E) -> Option<usize> {
        self.vec.iter().position(|e| e == element)
    }

    /// Insert `element`, or reposition the stored element equal to it, according to `rank`.
    /// `rank(a, b) == Ordering::Greater` means `a` comes before `b`. A stored equal element is
    /// replaced by `element`.
    ///
    /// Returns whether the order of the array changed, that is `false` iff an equal element was
    /// already present and it stays at its index.
    pub fn add_by<F>(&mut self, element: E, rank: F) -> bool
    where
        F: Fn(&E, &E) -> Ordering,
    {
        let old_idx = self.position(&element);
        if let Some(idx) = old_idx {
            self.vec.remove(idx);
        }

        // Every index in `lo..=hi` keeps the array sorted, `hi` places `element` behind all
        // elements ranked equal to it.
        let lo = self
            .vec
            .partition_point(|e| rank(e, &element) == Ordering::Greater);
        let hi = self
            .vec
            .partition_point(|e| rank(e, &element) != Ordering::Less);

        match old_idx {
            None => {
                self.vec.insert(hi, element);
                true
            }
            Some(old_idx) => {
                let new_idx = old_idx.clamp(lo, hi);
                self.vec.insert(new_idx, element);
                new_idx != old_idx
            }
        }
    }

    /// Remove the element equal to `element`. Returns the removed element, `None` if it was not
    /// contained.
    pub fn delete_element(&mut self, element: &E) -> Option<E> {
        let idx = self.position(element)?;
        Some(self.vec.remove(idx))
    }

    /// Remove the element at `idx`, `None` if out of bounds.
    pub fn delete(&mut self, idx: usize) -> Option<E> {
        if idx < self.vec.len() {
            Some(self.vec.remove(idx))
        } else {
            None
        }
    }

    /// Drop all elements for which `keep` returns `false`, preserving the order of the rest.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&E) -> bool,
    {
        self.vec.retain(keep);
    }
}

impl<E: PartialEq> Default for SortedArray<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E> IntoIterator for &'a SortedArray<E> {
    type Item = &'a E;

    type IntoIter = slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.vec.iter()
    }
}

#[cfg(test)]
mod test {
    use std::{cmp::Ordering, collections::HashMap};

    use super::SortedArray;

    fn by_rank(ranks: &HashMap<char, u32>) -> impl Fn(&char, &char) -> Ordering + '_ {
        move |a, b| ranks[a].cmp(&ranks[b])
    }

    fn contents(array: &SortedArray<char>) -> String {
        array.iter().collect()
    }

    #[test]
    fn basic_insertion_test() {
        let ranks = HashMap::from([('a', 5), ('b', 3), ('c', 1), ('d', 3)]);
        let mut array = SortedArray::new();

        // at the end
        assert!(array.add_by('b', by_rank(&ranks)));
        assert!(array.add_by('c', by_rank(&ranks)));
        // in front
        assert!(array.add_by('a', by_rank(&ranks)));
        // in the middle, behind its equally ranked sibling
        assert!(array.add_by('d', by_rank(&ranks)));
        assert_eq!(contents(&array), "abdc");
        assert_eq!(array.len(), 4);
    }

    #[test]
    fn readding_is_a_noop() {
        let ranks = HashMap::from([('a', 5), ('b', 3), ('c', 3), ('d', 1)]);
        let mut array = SortedArray::new();
        for c in ['a', 'b', 'c', 'd'] {
            array.add_by(c, by_rank(&ranks));
        }

        for c in ['a', 'b', 'c', 'd'] {
            assert!(!array.add_by(c, by_rank(&ranks)), "{c} should stay in place");
        }
        assert_eq!(contents(&array), "abcd");
    }

    #[test]
    fn reposition_test() {
        let mut ranks = HashMap::from([('a', 5), ('b', 3), ('c', 2), ('d', 1)]);
        let mut array = SortedArray::new();
        for c in ['a', 'b', 'c', 'd'] {
            array.add_by(c, by_rank(&ranks));
        }

        ranks.insert('d', 4);
        assert!(array.add_by('d', by_rank(&ranks)));
        assert_eq!(contents(&array), "adbc");

        ranks.insert('a', 0);
        assert!(array.add_by('a', by_rank(&ranks)));
        assert_eq!(contents(&array), "dbca");

        // moves up but not past a strictly better element
        ranks.insert('a', 3);
        assert!(array.add_by('a', by_rank(&ranks)));
        assert_eq!(contents(&array), "dbac");
    }

    #[test]
    fn deletion_test() {
        let ranks = HashMap::from([('a', 3), ('b', 2), ('c', 1)]);
        let mut array = SortedArray::new();
        for c in ['c', 'a', 'b'] {
            array.add_by(c, by_rank(&ranks));
        }

        assert_eq!(array.delete_element(&'b'), Some('b'));
        assert_eq!(array.delete_element(&'b'), None);
        assert_eq!(contents(&array), "ac");
        assert_eq!(array.delete(1), Some('c'));
        assert_eq!(array.delete(1), None);
        assert_eq!(contents(&array), "a");
        assert!(array.contains(&'a'));
        assert!(!array.is_empty());
    }
}
