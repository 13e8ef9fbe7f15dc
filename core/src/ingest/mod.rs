//! Corpus ingestion: accumulate per-run word counts, then flush entries
//! above a frequency boundary into the dictionary store as merge writes.

pub mod html;
pub mod morphology;
pub mod wikipedia;

use crate::alphabet::AlphabetRegistry;
use crate::dictionary::DictionaryStore;
use crate::error::Result;
use crate::letter::{from_letters, to_letters_str, to_lower};
use std::collections::{HashMap, HashSet};

/// Per-run accumulator: lowercased word -> (occurrence count, documents seen in).
#[derive(Debug, Default)]
pub struct WordCounts {
    counts: HashMap<String, (u64, u64)>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, word: &str) {
        let entry = self.counts.entry(word.to_string()).or_insert((0, 0));
        entry.0 += 1;
    }

    /// Mark the end of one source unit (document/element): every *distinct*
    /// word observed in this unit gains one `documents` credit, regardless
    /// of how many times it occurred within the unit. Callers pass the
    /// deduplicated word set of the unit, not its raw token list.
    pub fn credit_document(&mut self, words_in_unit: &HashSet<String>) {
        for w in words_in_unit {
            if let Some(entry) = self.counts.get_mut(w) {
                entry.1 += 1;
            }
        }
    }

    pub fn merge(&mut self, other: WordCounts) {
        for (word, (freq, documents)) in other.counts {
            let entry = self.counts.entry(word).or_insert((0, 0));
            entry.0 += freq;
            entry.1 += documents;
        }
    }

    /// Write every entry at or above `boundary` to the store; discard the
    /// rest. Returns the number of words written.
    pub fn flush(self, store: &DictionaryStore, boundary: u64) -> Result<usize> {
        let mut written = 0;
        for (word, (freq, documents)) in self.counts {
            if freq >= boundary {
                store.write_word_form(&word, freq, documents)?;
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Split `text` on whitespace and the fixed punctuation class, lowercase,
/// and filter by the registered alphabet for `lang`. This is the small
/// internal tokenizer both ingesters use; a production deployment would
/// plug in a real Unicode word splitter here instead.
pub fn tokenize(text: &str, lang: &str, alphabets: &AlphabetRegistry) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || crate::alphabet::AlphabetRegistry::is_drop_character(c))
        .filter(|tok| !tok.is_empty())
        .map(|tok| from_letters(&to_lower(&to_letters_str(tok))))
        .filter(|tok| alphabets.ok(lang, &to_letters_str(tok)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_and_lowercases() {
        let alphabets = AlphabetRegistry::new();
        let tokens = tokenize("Hello, World! 123", "en", &alphabets);
        assert_eq!(tokens, vec!["hello", "world"]);
    }

    #[test]
    fn tokenize_filters_by_alphabet() {
        let mut alphabets = AlphabetRegistry::new();
        alphabets.register("en", "abcdefghijklmnopqrstuvwxyz".chars());
        let tokens = tokenize("hello héllo", "en", &alphabets);
        assert_eq!(tokens, vec!["hello"]);
    }

    #[test]
    fn word_counts_discards_below_boundary() {
        let mut counts = WordCounts::new();
        counts.observe("rare");
        counts.observe("common");
        counts.observe("common");
        counts.observe("common");

        let mut p = std::env::temp_dir();
        p.push(format!(
            "spellwarp_ingest_test_{}.redb",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let store = DictionaryStore::open(&p, std::time::Duration::from_secs(60)).unwrap();
        let written = counts.flush(&store, 2).unwrap();
        assert_eq!(written, 1);
        assert!(store.get_word_form("common").unwrap().is_some());
        assert!(store.get_word_form("rare").unwrap().is_none());
    }
}
