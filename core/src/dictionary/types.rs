//! Record types persisted in the dictionary store.

use crate::wire::Versioned;
use serde::{Deserialize, Serialize};

/// A word, its morphological annotation, and its corpus statistics.
///
/// Carries both the correction-store fields (`freq`, `documents`) and the
/// morphological-dictionary fields (`stem`, `root_len`, `features`) on one
/// record: `word` is the sole observed/corrected surface form, and whichever
/// collaborator populated `stem`/`features` (a morphological dictionary load,
/// as opposed to plain corpus ingestion) leaves them empty otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordForm {
    pub word: String,
    pub stem: String,
    pub indexed_id: u64,
    pub root_len: u32,
    pub features: Vec<String>,
    pub freq: u64,
    pub documents: u64,
}

/// 7 fields plus the version slot itself.
impl Versioned for WordForm {
    const FIELD_COUNT: u32 = 8;
}

impl WordForm {
    pub fn new(word: impl Into<String>, indexed_id: u64) -> Self {
        WordForm {
            word: word.into(),
            stem: String::new(),
            indexed_id,
            root_len: 0,
            features: Vec::new(),
            freq: 0,
            documents: 0,
        }
    }

    pub fn with_freq(mut self, freq: u64, documents: u64) -> Self {
        self.freq = freq;
        self.documents = documents;
        self
    }

    /// Lowercased letters of `word`, the form the checker ranks against.
    pub fn lw(&self) -> Vec<char> {
        crate::letter::to_lower(&crate::letter::to_letters_str(&self.word))
    }

    /// Merge `incoming` into `self` per the store's merge operator: sum
    /// `freq`/`documents`; keep the first non-empty value of every other
    /// field (the already-stored value wins, since it was written first).
    pub fn merge(existing: Option<WordForm>, incoming: WordForm) -> WordForm {
        match existing {
            None => incoming,
            Some(e) => WordForm {
                word: if e.word.is_empty() { incoming.word } else { e.word },
                stem: if e.stem.is_empty() { incoming.stem } else { e.stem },
                indexed_id: e.indexed_id,
                root_len: if e.root_len == 0 { incoming.root_len } else { e.root_len },
                features: if e.features.is_empty() { incoming.features } else { e.features },
                freq: e.freq + incoming.freq,
                documents: e.documents + incoming.documents,
            },
        }
    }
}

/// One occurrence of a bigram in a particular indexed word form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NGramPosting {
    pub indexed_id: u64,
}

/// Sorted, id-deduplicated set of postings for one n-gram key.
///
/// Mirrors the upstream merge operator's quirk: postings are deduplicated
/// purely by `indexed_id` (the strict weak ordering used there is keyed on
/// id alone), so only the first-seen posting for a given id survives a merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskIndex {
    postings: Vec<NGramPosting>,
}

impl DiskIndex {
    pub fn postings(&self) -> &[NGramPosting] {
        &self.postings
    }

    /// Union `incoming` into `self`, deduped by `indexed_id`, re-sorted.
    pub fn merge(existing: Option<DiskIndex>, incoming: Vec<NGramPosting>) -> DiskIndex {
        let mut postings = existing.map(|d| d.postings).unwrap_or_default();
        for p in incoming {
            if !postings.iter().any(|existing| existing.indexed_id == p.indexed_id) {
                postings.push(p);
            }
        }
        postings.sort_by_key(|p| p.indexed_id);
        DiskIndex { postings }
    }
}

/// 1 field (`postings`) plus the version slot itself.
impl Versioned for DiskIndex {
    const FIELD_COUNT: u32 = 2;
}

/// Store-wide metadata: the sequence counter used to allocate indexed ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub sequence: u64,
}

/// 1 field (`sequence`) plus the version slot itself.
impl Versioned for Metadata {
    const FIELD_COUNT: u32 = 2;
}
