//! Four-level spell checker: exact match, known correction, Norvig edits,
//! and n-gram candidate fallback, escalating until a level yields a result.

use crate::dictionary::{DictionaryStore, WordForm};
use crate::edits::edits1;
use crate::error::Result;
use crate::error_model::ErrorModel;
use crate::letter::{from_letters, levenshtein, longest_common_substring, split_ngrams, Letter};
use std::collections::HashMap;
use std::sync::RwLock;

/// Minimum bigram-hit count and minimum word length the n-gram fallback
/// requires before it considers a candidate at all.
const NGRAM_MIN_HITS: u32 = 2;
const NGRAM_MIN_WORD_LEN: usize = 4;

#[derive(Debug, Clone)]
pub struct CheckControl {
    pub word: String,
    pub lw: Vec<Letter>,
    pub level: u8,
    pub max_num: usize,
}

/// A checker result: the stored word form plus the edit distance (if any)
/// at which it was found.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub word_form: WordForm,
    pub edit_distance: Option<usize>,
    pub similarity: f64,
}

/// Per-language checker state: the dictionary store and its error model.
/// Registered once, read by every `check` call under a shared lock.
struct LanguageState {
    store: DictionaryStore,
    error_model: ErrorModel,
}

pub struct Checker {
    languages: RwLock<HashMap<String, LanguageState>>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    pub fn new() -> Self {
        Checker {
            languages: RwLock::new(HashMap::new()),
        }
    }

    pub fn register_language(&self, lang: &str, store: DictionaryStore, error_model: ErrorModel) {
        let mut languages = self.languages.write().expect("checker registry poisoned");
        languages.insert(lang.to_string(), LanguageState { store, error_model });
    }

    pub fn check(&self, lang: &str, ctl: &CheckControl) -> Result<Vec<Candidate>> {
        let languages = self.languages.read().expect("checker registry poisoned");
        let state = match languages.get(lang) {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };

        if let Some(wf) = state.store.get_word_form(&ctl.word)? {
            return Ok(vec![Candidate {
                word_form: wf,
                edit_distance: Some(0),
                similarity: 1.0,
            }]);
        }

        if ctl.level >= 1 {
            if let Some(wf) = state.store.get_transform(&ctl.word)? {
                return Ok(vec![Candidate {
                    word_form: wf,
                    edit_distance: None,
                    similarity: 1.0,
                }]);
            }
        }

        let mut level2 = Vec::new();
        if ctl.level >= 2 {
            level2 = self.level2_candidates(state, &ctl.lw)?;
        }

        let mut level3 = Vec::new();
        if ctl.level >= 3 && level2.is_empty() {
            level3 = self.level3_candidates(state, &ctl.lw)?;
        }

        let combined: Vec<(WordForm, usize)> = level2.into_iter().chain(level3).collect();
        Ok(Self::rank(&ctl.lw, combined, ctl.max_num))
    }

    fn level2_candidates(
        &self,
        state: &LanguageState,
        lw: &[Letter],
    ) -> Result<Vec<(WordForm, usize)>> {
        let mut found = Vec::new();
        let e1 = edits1(lw, &state.error_model);

        for e in &e1 {
            if let Some(wf) = state.store.get_word_form(&from_letters(e))? {
                found.push((wf, 1));
            }
        }

        for e in &e1 {
            for e2 in edits1(e, &state.error_model) {
                if let Some(wf) = state.store.get_word_form(&from_letters(&e2))? {
                    found.push((wf, 2));
                }
            }
        }

        Ok(found)
    }

    fn level3_candidates(
        &self,
        state: &LanguageState,
        lw: &[Letter],
    ) -> Result<Vec<(WordForm, usize)>> {
        if lw.len() <= NGRAM_MIN_WORD_LEN {
            return Ok(Vec::new());
        }

        let mut hits: HashMap<u64, u32> = HashMap::new();
        for bigram in split_ngrams(lw, 2) {
            let key: String = bigram.iter().collect();
            let index = state.store.get_ngram_index(&key)?;
            for posting in index.postings() {
                *hits.entry(posting.indexed_id).or_insert(0) += 1;
            }
        }

        let mut found = Vec::new();
        for (id, count) in hits {
            if count > NGRAM_MIN_HITS {
                if let Some(wf) = state.store.get_word_form_by_id(id)? {
                    let d = levenshtein(lw, &wf.lw(), lw.len()).unwrap_or(lw.len());
                    found.push((wf, d));
                }
            }
        }

        Ok(found)
    }

    /// Apply the ranking formula to the combined level-2/level-3 candidate
    /// set: a shrinking Levenshtein cutoff drops far candidates, then each
    /// survivor is scored by frequency share over distance and substring
    /// overlap, sorted by similarity descending, truncated to `max_num`.
    fn rank(lw: &[Letter], candidates: Vec<(WordForm, usize)>, max_num: usize) -> Vec<Candidate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut min_dist = (lw.len() / 2).max(1);
        let mut sum_freq: u64 = 0;
        let mut kept: Vec<(WordForm, usize)> = Vec::new();

        for (wf, _) in candidates {
            let candidate_lw = wf.lw();
            match levenshtein(lw, &candidate_lw, min_dist) {
                None => continue,
                Some(d) => {
                    min_dist = min_dist.min(d);
                    sum_freq += wf.freq;
                    kept.push((wf, d));
                }
            }
        }

        if sum_freq == 0 {
            sum_freq = 1;
        }

        let mut ranked: Vec<Candidate> = kept
            .into_iter()
            .map(|(wf, d)| {
                let candidate_lw = wf.lw();
                let f = wf.freq as f64 / sum_freq as f64;
                let r = (d as f64 / candidate_lw.len().max(1) as f64).max(f64::EPSILON);
                let subdiff = lw.len() as isize
                    - longest_common_substring(lw, &candidate_lw).len() as isize;
                let similarity = if subdiff == 0 {
                    f / r
                } else {
                    f / (r * 10.0 * subdiff as f64)
                };
                Candidate {
                    word_form: wf,
                    edit_distance: Some(d),
                    similarity,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.word_form.indexed_id.cmp(&b.word_form.indexed_id))
        });
        ranked.truncate(max_num);
        ranked
    }
}
