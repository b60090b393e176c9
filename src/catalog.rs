//! ## Keyword Catalogs
//! This module feeds a [PrefixTree] from a plain text catalog and persists usage statistics across
//! sessions. The key exported data structures are:
//! - [CatalogEntry] for one item of a catalog, its value is always its first keyword
//! - [StatisticsSnapshot] for the persisted statistics of all contents and their keywords
//!
//! A catalog has one item per line in the form `value: alias1; alias2`. Blank lines and lines
//! starting with `#` are ignored.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{prefix_tree::PrefixTree, statistic::Statistic};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("malformed statistics: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub value: String,
    /// The value followed by its aliases, without duplicates.
    pub keywords: Vec<String>,
}

/// Parse the catalog `text`.
pub fn parse_catalog(text: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (value, aliases) = line.split_once(':').unwrap_or((line, ""));
        let value = value.trim();
        if value.is_empty() {
            return Err(CatalogError::Parse {
                line: idx + 1,
                reason: "missing value".to_string(),
            });
        }

        let mut keywords = vec![value.to_string()];
        for alias in aliases.split(';').map(str::trim).filter(|a| !a.is_empty()) {
            if !keywords.iter().any(|kw| kw == alias) {
                keywords.push(alias.to_string());
            }
        }
        entries.push(CatalogEntry {
            value: value.to_string(),
            keywords,
        });
    }
    Ok(entries)
}

/// Register every entry of `entries` in `tree`. Returns the number of keywords attached.
pub fn index_catalog(entries: &[CatalogEntry], tree: &mut PrefixTree<String>) -> usize {
    let mut attached = 0;
    for entry in entries {
        let id = tree.register(entry.value.clone());
        for keyword in entry.keywords.iter() {
            if keyword.chars().count() < 2 {
                warn!("Skipping single character keyword {keyword:?} of {:?}", entry.value);
                continue;
            }
            match tree.add(keyword, Some(id)) {
                Some(_) => attached += 1,
                None => warn!("Skipping keyword {keyword:?} of {:?}", entry.value),
            }
        }
    }
    attached
}

/// Read the catalog at `path` into `tree`. Returns the number of entries.
pub fn load_catalog(path: &Path, tree: &mut PrefixTree<String>) -> Result<usize, CatalogError> {
    info!("Opening catalog {path:?}");
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_catalog(&text)?;
    let attached = index_catalog(&entries, tree);
    info!("Indexed {} entries with {attached} keywords", entries.len());
    Ok(entries.len())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub statistic: Statistic,
    #[serde(default)]
    pub keywords: BTreeMap<String, Statistic>,
}

/// Persisted statistics, keyed by content value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticsSnapshot {
    pub contents: BTreeMap<String, ContentSnapshot>,
}

impl StatisticsSnapshot {
    /// Capture the statistics of every content of `tree` that was used at least once.
    pub fn capture(tree: &PrefixTree<String>) -> Self {
        let mut contents = BTreeMap::new();
        for (_, content) in tree.contents().iter() {
            let keywords: BTreeMap<String, Statistic> = content
                .keywords()
                .filter(|kw| kw.statistic().use_count() > 0)
                .map(|kw| (kw.text().to_string(), *kw.statistic()))
                .collect();
            if content.statistic().use_count() == 0 && keywords.is_empty() {
                continue;
            }
            contents.insert(
                content.value().clone(),
                ContentSnapshot {
                    statistic: *content.statistic(),
                    keywords,
                },
            );
        }
        Self { contents }
    }

    /// Install the statistics into `tree`. Values and keywords unknown to `tree` are skipped.
    /// Returns the number of restored contents.
    pub fn apply(&self, tree: &mut PrefixTree<String>) -> usize {
        let mut restored = 0;
        for (value, snapshot) in self.contents.iter() {
            let Some(id) = tree.find_content(value) else {
                warn!("No content {value:?} for persisted statistic");
                continue;
            };
            tree.restore_statistic(id, snapshot.statistic);
            for (keyword, statistic) in snapshot.keywords.iter() {
                tree.restore_keyword_statistic(id, keyword, *statistic);
            }
            restored += 1;
        }
        restored
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read the snapshot at `path`, an absent file yields an empty snapshot.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        fs::write(path, self.to_json()?).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
