//! ## Usage Statistics
//! This module contains [Statistic], the usage record that ranks contents and keywords against
//! each other. A statistic with a higher use count ranks higher, ties are broken by the more
//! recent last use.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage count plus the instant of the last use.
///
/// The [Ord] instance is the ranking order: `a > b` iff `a` should be suggested before `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistic {
    use_count: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    last_used: DateTime<Utc>,
}

impl Statistic {
    /// Create a statistic that was never used.
    pub fn new() -> Self {
        Self {
            use_count: 0,
            last_used: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Create a statistic from persisted values.
    pub fn restore(use_count: u64, last_used: DateTime<Utc>) -> Self {
        Self {
            use_count,
            last_used,
        }
    }

    pub fn use_count(&self) -> u64 {
        self.use_count
    }

    pub fn last_used(&self) -> DateTime<Utc> {
        self.last_used
    }

    /// Record one use at `now`.
    pub fn update_at(&mut self, now: DateTime<Utc>) {
        self.use_count = self.use_count.saturating_add(1);
        // Never move backwards in time, a skewed clock must not demote an item.
        self.last_used = self.last_used.max(now);
    }

    /// Record one use right now.
    pub fn update(&mut self) {
        self.update_at(Utc::now());
    }
}

impl Default for Statistic {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialOrd for Statistic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Statistic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.use_count
            .cmp(&other.use_count)
            .then_with(|| self.last_used.cmp(&other.last_used))
    }
}
