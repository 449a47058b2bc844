//! Word-frequency analysis.
//!
//! # Responsibility
//! - Turn free text into case-insensitive word counts.
//! - Keep result ordering deterministic for identical input.
//!
//! # Invariants
//! - Only `a-z`, `а-я`, `і`, `є`, `ї`, `ґ` survive as word characters.
//! - Other characters are deleted, not replaced, so `don't` becomes `dont`.
//! - Entries are ordered by descending count; equal counts keep
//!   first-encountered order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zа-яієїґ \t\n\x0B\f\r]").expect("valid non-word regex")
});
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\n\x0B\f\r]+").expect("valid ws regex"));

/// Ordered word -> count table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequencyTable {
    entries: Vec<(String, u64)>,
}

impl WordFrequencyTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the count for `word`, if present.
    pub fn get(&self, word: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(key, _)| key == word)
            .map(|(_, count)| *count)
    }

    /// Iterates entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn into_vec(self) -> Vec<(String, u64)> {
        self.entries
    }
}

impl Serialize for WordFrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, count) in &self.entries {
            map.serialize_entry(word, count)?;
        }
        map.end()
    }
}

/// Computes word frequencies for `text`.
///
/// Empty, whitespace-only, and punctuation-only input yield an empty table.
pub fn word_frequencies(text: &str) -> WordFrequencyTable {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD_RE.replace_all(&lowered, "");
    if cleaned.trim().is_empty() {
        return WordFrequencyTable::default();
    }

    let mut entries: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for word in WHITESPACE_RE.split(&cleaned).filter(|word| !word.is_empty()) {
        match positions.get(word) {
            Some(&index) => entries[index].1 += 1,
            None => {
                positions.insert(word, entries.len());
                entries.push((word.to_string(), 1));
            }
        }
    }

    // sort_by is stable, so ties keep first-encountered order.
    entries.sort_by(|left, right| right.1.cmp(&left.1));
    WordFrequencyTable { entries }
}
