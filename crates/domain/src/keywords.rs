//! Keyword reverse index: free-text search terms to tag names

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Tag name (without `#`) to its synonym vocabulary.
///
/// The tag name itself always counts as a synonym.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, BTreeSet<String>>",
    into = "BTreeMap<String, BTreeSet<String>>"
)]
pub struct KeywordIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl KeywordIndex {
    /// Synonyms are stored lower-cased and trimmed
    pub fn new(entries: BTreeMap<String, BTreeSet<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(tag, synonyms)| {
                let synonyms = synonyms
                    .iter()
                    .map(|s| s.trim().to_lowercase())
                    .collect();
                (tag, synonyms)
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.entries
    }

    /// Tags whose name equals the query or whose vocabulary overlaps it.
    ///
    /// Substring matching runs both ways, so short queries may hit several tags.
    pub fn find_matching_tags(&self, query: &str) -> BTreeSet<String> {
        let query = query.trim().to_lowercase();
        let query = query.strip_prefix('#').unwrap_or(&query).trim();
        if query.is_empty() {
            return BTreeSet::new();
        }

        self.entries
            .iter()
            .filter(|(tag, synonyms)| {
                let name = tag.to_lowercase();
                name == query
                    || std::iter::once(&name)
                        .chain(synonyms.iter())
                        .filter(|s| !s.is_empty())
                        .any(|s| s.contains(query) || query.contains(s.as_str()))
            })
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Every synonym and tag name, sorted and de-duplicated
    pub fn all_keywords(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(tag, synonyms)| std::iter::once(tag).chain(synonyms.iter()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for KeywordIndex {
    fn from(entries: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self::new(entries)
    }
}

impl From<KeywordIndex> for BTreeMap<String, BTreeSet<String>> {
    fn from(index: KeywordIndex) -> Self {
        index.entries
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        crate::rulebook::builtin::keyword_index()
    }
}
