//! ## Keywords
//! A [Keyword] is one concrete, case preserving string through which a content is reachable in the
//! prefix tree. Each keyword carries its own [Statistic] so a content with several aliases can
//! prefer the alias that is actually used.

use std::{cmp::Ordering, fmt::Display};

use crate::{char_map::starts_with_folded, statistic::Statistic};

/// A case preserving keyword with its own usage statistic. Two keywords are equal iff their text
/// is equal, case included, regardless of their statistics.
#[derive(Debug, Clone)]
pub struct Keyword {
    text: String,
    statistic: Statistic,
}

impl Keyword {
    /// Create a never used keyword.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_statistic(text, Statistic::new())
    }

    pub fn with_statistic(text: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            text: text.into(),
            statistic,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn statistic(&self) -> &Statistic {
        &self.statistic
    }

    pub(crate) fn statistic_mut(&mut self) -> &mut Statistic {
        &mut self.statistic
    }

    /// Check whether the keyword starts with `prefix`, ignoring case.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        starts_with_folded(&self.text, prefix)
    }

    /// Ranking order used for the keyword list of a content.
    pub fn rank(a: &Keyword, b: &Keyword) -> Ordering {
        a.statistic.cmp(&b.statistic)
    }
}

impl PartialEq for Keyword {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Keyword {}

impl PartialEq<str> for Keyword {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
