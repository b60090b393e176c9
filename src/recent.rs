//! ## Recently Used Contents
//! A short, bounded list of the contents that were read most recently. It is kept next to the
//! suggestion caches and never influences their order.

use std::collections::VecDeque;

use crate::content::ContentId;

/// Most recently used first, without duplicates, at most `cutoff` entries.
#[derive(Debug, Clone)]
pub struct RecentlyUsed {
    cutoff: usize,
    list: VecDeque<ContentId>,
}

impl RecentlyUsed {
    pub fn new(cutoff: usize) -> Self {
        Self {
            cutoff,
            list: VecDeque::with_capacity(cutoff),
        }
    }

    /// Move `id` to the front, evicting the oldest entry if the list is full.
    pub fn touch(&mut self, id: ContentId) {
        if self.cutoff == 0 {
            return;
        }
        self.remove(id);
        self.list.push_front(id);
        self.list.truncate(self.cutoff);
    }

    pub fn remove(&mut self, id: ContentId) {
        self.list.retain(|c| *c != id);
    }

    pub fn contains(&self, id: ContentId) -> bool {
        self.list.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ContentId> + '_ {
        self.list.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::content::ContentBank;

    use super::RecentlyUsed;

    #[test]
    fn basic_recent_test() {
        let mut bank = ContentBank::new();
        let ids: Vec<_> = (0..4).map(|i| bank.register(i)).collect();
        let mut recent = RecentlyUsed::new(3);

        recent.touch(ids[0]);
        recent.touch(ids[1]);
        recent.touch(ids[2]);
        recent.touch(ids[0]);
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec![ids[0], ids[2], ids[1]]);

        recent.touch(ids[3]);
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec![ids[3], ids[0], ids[2]]);
        assert!(!recent.contains(ids[1]));

        recent.remove(ids[0]);
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn zero_cutoff_keeps_nothing() {
        let mut bank = ContentBank::new();
        let id = bank.register("x");
        let mut recent = RecentlyUsed::new(0);
        recent.touch(id);
        assert!(recent.is_empty());
    }
}
