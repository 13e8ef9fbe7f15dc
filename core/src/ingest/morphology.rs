//! Morphological dictionary loader: augments word forms with a lemma
//! `stem`, `root_len`, and grammatical feature tags, rather than corpus
//! frequency counts.
//!
//! The original `warp` implementation parses a Zaliznyak-derived dictionary
//! through a hand-rolled state machine keyed on a bracket/feature-bitmask
//! grammar built around a hardcoded Russian grammatical feature table
//! (`examples/original_source/include/warp/feature.hpp`'s `parser`/`zparser`,
//! driven by `examples/original_source/src/pack.cpp`). This loader keeps the
//! same shape -- one lemma heading a block of its surface forms, each
//! carrying a root length and a feature list -- but reads a plain,
//! self-documenting text format instead of replicating that bracket/bitmask
//! grammar or the fixed Russian feature table.

use crate::dictionary::DictionaryStore;
use crate::error::{CoreError, Result};

/// Parse and load a morphological dictionary into `store`.
///
/// Format: blocks separated by blank lines. A block's first line is the
/// lemma; each following line is `surface_word root_len features`, where
/// `features` is a comma-separated tag list (may be empty). Returns the
/// number of surface forms written.
pub fn load_morphology_dict(store: &DictionaryStore, text: &str) -> Result<usize> {
    let mut written = 0;
    let mut lemma: Option<&str> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            lemma = None;
            continue;
        }

        match lemma {
            None => lemma = Some(line),
            Some(stem) => {
                let mut parts = line.splitn(3, ' ');
                let word = parts
                    .next()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| CoreError::InvalidArgument(format!("malformed morphology line: {line}")))?;
                let root_len: u32 = parts
                    .next()
                    .ok_or_else(|| CoreError::InvalidArgument(format!("missing root length: {line}")))?
                    .parse()
                    .map_err(|_| CoreError::InvalidArgument(format!("invalid root length: {line}")))?;
                let features: Vec<String> = parts
                    .next()
                    .map(|f| f.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
                    .unwrap_or_default();

                store.write_morphology(word, stem, root_len, features)?;
                written += 1;
            }
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_store(name: &str) -> DictionaryStore {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "spellwarp_morphology_{}_{}.redb",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        DictionaryStore::open(&p, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn loads_a_multi_lemma_dictionary() {
        let store = temp_store("load");
        let text = "бежать\nбежал 4 гл,прош\nбежит 4 гл,наст\n\nплыть\nплыл 3 гл,прош\n";

        let written = load_morphology_dict(&store, text).unwrap();
        assert_eq!(written, 3);

        let bezhal = store.get_word_form("бежал").unwrap().unwrap();
        assert_eq!(bezhal.stem, "бежать");
        assert_eq!(bezhal.root_len, 4);
        assert_eq!(bezhal.features, vec!["гл".to_string(), "прош".to_string()]);

        let plyl = store.get_word_form("плыл").unwrap().unwrap();
        assert_eq!(plyl.stem, "плыть");
    }

    #[test]
    fn rejects_a_line_missing_root_len() {
        let store = temp_store("malformed");
        let text = "lemma\nsurfaceonly\n";
        let err = load_morphology_dict(&store, text).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn entries_with_no_features_load_with_an_empty_list() {
        let store = temp_store("no_features");
        let text = "lemma\nsurface 2\n";
        load_morphology_dict(&store, text).unwrap();
        let wf = store.get_word_form("surface").unwrap().unwrap();
        assert!(wf.features.is_empty());
        assert_eq!(wf.root_len, 2);
    }
}
