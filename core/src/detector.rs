//! Rank-based n-gram language detector.
//!
//! Trains per-language, per-n (2,3,4) n-gram frequency profiles, keeps only
//! the top-K ranked n-grams per profile, and scores a candidate word by
//! summing ranks (missing n-grams cost a fixed penalty of K). The language
//! with the *lowest* score wins; ties go to whichever language was inserted
//! first, which is why profiles live in an `IndexMap` rather than a
//! `HashMap`.

use crate::error::{CoreError, Result};
use crate::letter::{split_ngrams, Letter};
use crate::wire::{self, Versioned};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

const NS: [usize; 3] = [2, 3, 4];

/// Ranked n-gram profile for one language and one n, built by `sort`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NGramProfile {
    k: usize,
    /// n-gram -> rank, 0 is most frequent.
    ranks: HashMap<String, usize>,
}

impl NGramProfile {
    fn rank_or_default(&self, gram: &str) -> usize {
        self.ranks.get(gram).copied().unwrap_or(self.k)
    }
}

/// Raw (unsorted) per-n n-gram counters plus the derived ranked profiles for
/// one language.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LanguageProfile {
    counts: HashMap<usize, HashMap<String, u64>>,
    profiles: HashMap<usize, NGramProfile>,
}

impl LanguageProfile {
    fn record_text(&mut self, letters: &[Letter]) {
        for n in NS {
            let counter = self.counts.entry(n).or_default();
            for gram in split_ngrams(letters, n) {
                *counter.entry(gram.iter().collect()).or_insert(0) += 1;
            }
        }
    }

    /// Keep the K highest-count n-grams per n, sorted by descending count,
    /// rank 0..K-1.
    fn sort(&mut self, k: usize) {
        for n in NS {
            let counts = self.counts.entry(n).or_default();
            let mut entries: Vec<(&String, &u64)> = counts.iter().collect();
            entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            entries.truncate(k);

            let ranks = entries
                .into_iter()
                .enumerate()
                .map(|(rank, (gram, _count))| (gram.clone(), rank))
                .collect();

            self.profiles.insert(n, NGramProfile { k, ranks });
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
struct DetectorState {
    profile_size: usize,
    languages: IndexMap<String, LanguageProfile>,
}

/// 2 fields (`profile_size`, `languages`) plus the version slot itself.
impl Versioned for DetectorState {
    const FIELD_COUNT: u32 = 3;
}

/// Language detector with atomic save/load and mutex-serialized training.
pub struct Detector {
    state: Mutex<DetectorState>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(400)
    }
}

impl Detector {
    /// `profile_size` is K: how many top n-grams survive per language per n.
    pub fn new(profile_size: usize) -> Self {
        Detector {
            state: Mutex::new(DetectorState {
                profile_size,
                languages: IndexMap::new(),
            }),
        }
    }

    /// Train (or extend) one language's raw counts from `text`, then re-sort
    /// only that language's profile. Serialized under the detector's mutex,
    /// so concurrent `add_language` calls never interleave.
    pub fn add_language(&self, lang: &str, letters: &[Letter]) {
        let mut state = self.state.lock().expect("detector mutex poisoned");
        let k = state.profile_size;
        let profile = state.languages.entry(lang.to_string()).or_default();
        profile.record_text(letters);
        profile.sort(k);
    }

    /// Score `letters` against every trained language; return the language
    /// with the minimum score (ties broken by insertion order), or `None` if
    /// no language has been trained.
    pub fn detect(&self, letters: &[Letter]) -> Option<String> {
        let state = self.state.lock().expect("detector mutex poisoned");
        let mut best: Option<(&str, f64)> = None;

        for (lang, profile) in &state.languages {
            let score = Self::score(letters, profile);
            match best {
                None => best = Some((lang, score)),
                Some((_, best_score)) if score < best_score => best = Some((lang, score)),
                _ => {}
            }
        }

        best.map(|(lang, _)| lang.to_string())
    }

    fn score(letters: &[Letter], profile: &LanguageProfile) -> f64 {
        let mut total = 0.0;
        for n in NS {
            let Some(ranked) = profile.profiles.get(&n) else {
                continue;
            };
            let mut sum = 0usize;
            for gram in split_ngrams(letters, n) {
                let g: String = gram.iter().collect();
                sum += ranked.rank_or_default(&g);
            }
            total += sum as f64 / n as f64;
        }
        total
    }

    /// Serialize all profiles to `path` via a write-to-temp-then-rename, so a
    /// crash mid-write never corrupts the previously saved state.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let state = self.state.lock().expect("detector mutex poisoned");
        let bytes = wire::encode(&*state)?;
        wire::atomic_write_bytes(path, &bytes)
    }

    /// Load profiles from `path`, replacing any in-memory state.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read(path).map_err(CoreError::Io)?;
        let state: DetectorState = wire::decode(&raw)?;
        Ok(Detector {
            state: Mutex::new(state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter::to_letters_str;

    #[test]
    fn detect_returns_none_when_untrained() {
        let d = Detector::new(10);
        assert_eq!(d.detect(&to_letters_str("hello")), None);
    }

    #[test]
    fn detect_prefers_trained_language() {
        let d = Detector::new(50);
        d.add_language("en", &to_letters_str("the quick brown fox jumps over the lazy dog"));
        d.add_language(
            "fr",
            &to_letters_str("le renard brun rapide saute par dessus le chien paresseux"),
        );
        assert_eq!(d.detect(&to_letters_str("the dog")), Some("en".to_string()));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let d = Detector::new(50);
        // Neither language has been trained on anything overlapping the probe,
        // so both score identically (all penalties) and the first inserted wins.
        d.add_language("first", &to_letters_str("aaaa"));
        d.add_language("second", &to_letters_str("aaaa"));
        assert_eq!(d.detect(&to_letters_str("zzzz")), Some("first".to_string()));
    }

    #[test]
    fn sort_keeps_only_top_k() {
        let mut profile = LanguageProfile::default();
        profile.record_text(&to_letters_str("aaaabbbbcccc"));
        profile.sort(1);
        let ranked = profile.profiles.get(&2).unwrap();
        assert_eq!(ranked.ranks.len(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.bin");
        let d = Detector::new(20);
        d.add_language("en", &to_letters_str("hello world"));
        d.save(&path).unwrap();

        let loaded = Detector::load(&path).unwrap();
        assert_eq!(
            loaded.detect(&to_letters_str("hello")),
            d.detect(&to_letters_str("hello"))
        );
    }
}
