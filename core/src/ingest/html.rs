//! Single-threaded HTML corpus ingester.
//!
//! HTML-to-text extraction is an out-of-scope collaborator; callers pass
//! already-extracted plain text per document.

use super::{tokenize, WordCounts};
use crate::alphabet::AlphabetRegistry;
use crate::dictionary::DictionaryStore;
use crate::error::Result;

pub struct HtmlIngester {
    lang: String,
    boundary: u64,
    counts: WordCounts,
}

impl HtmlIngester {
    pub fn new(lang: impl Into<String>, boundary: u64) -> Self {
        HtmlIngester {
            lang: lang.into(),
            boundary,
            counts: WordCounts::new(),
        }
    }

    /// Ingest one already-extracted document's plain text.
    pub fn ingest_document(&mut self, text: &str, alphabets: &AlphabetRegistry) {
        let words = tokenize(text, &self.lang, alphabets);
        for w in &words {
            self.counts.observe(w);
        }
        let unique: std::collections::HashSet<String> = words.into_iter().collect();
        self.counts.credit_document(&unique);
    }

    /// Flush accumulated counts above the boundary into the store.
    pub fn flush(self, store: &DictionaryStore) -> Result<usize> {
        self.counts.flush(store, self.boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ingests_documents_and_flushes_above_boundary() {
        let alphabets = AlphabetRegistry::new();
        let mut ingester = HtmlIngester::new("en", 2);
        ingester.ingest_document("the cat sat on the mat", &alphabets);
        ingester.ingest_document("the dog sat", &alphabets);

        let mut p = std::env::temp_dir();
        p.push(format!(
            "spellwarp_html_test_{}.redb",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let store = DictionaryStore::open(&p, Duration::from_secs(60)).unwrap();
        let written = ingester.flush(&store).unwrap();

        assert!(written > 0);
        assert!(store.get_word_form("the").unwrap().is_some());
        assert!(store.get_word_form("cat").unwrap().is_none());
    }
}
