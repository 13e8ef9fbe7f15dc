//! Service façade binding the library surface an external transport (HTTP,
//! in the original design) would call into: `tokenize`, `convert`,
//! `error_check`, `add_language`.

use crate::alphabet::AlphabetRegistry;
use crate::checker::{CheckControl, Checker};
use crate::detector::Detector;
use crate::error::Result;
use crate::letter::{to_letters_str, to_lower};
use std::sync::Arc;

/// Pluggable stemmer, so callers can swap in a language-specific Snowball
/// stemmer (or skip stemming entirely) without touching the façade.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

/// Snowball-backed default implementation.
pub struct SnowballStemmer {
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn new(algorithm: rust_stemmers::Algorithm) -> Self {
        SnowballStemmer {
            inner: rust_stemmers::Stemmer::create(algorithm),
        }
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub surface: String,
    pub lang: Option<String>,
    pub stem: Option<String>,
}

pub struct Service {
    checker: Arc<Checker>,
    detector: Arc<Detector>,
    alphabets: AlphabetRegistry,
    stemmer: Option<Box<dyn Stemmer>>,
}

impl Service {
    pub fn new(checker: Arc<Checker>, detector: Arc<Detector>, alphabets: AlphabetRegistry) -> Self {
        Service {
            checker,
            detector,
            alphabets,
            stemmer: None,
        }
    }

    pub fn with_stemmer(mut self, stemmer: Box<dyn Stemmer>) -> Self {
        self.stemmer = Some(stemmer);
        self
    }

    fn split_words(&self, text: &str) -> Vec<String> {
        text.split(|c: char| c.is_whitespace() || AlphabetRegistry::is_drop_character(c))
            .filter(|tok| !tok.is_empty())
            .map(|tok| tok.to_string())
            .collect()
    }

    /// Split `text`, tag each token's detected language, and attach its stem
    /// if a stemmer is configured.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        self.split_words(text)
            .into_iter()
            .map(|surface| {
                let letters = to_lower(&to_letters_str(&surface));
                let lang = self.detector.detect(&letters);
                let stem = self.stemmer.as_ref().map(|s| s.stem(&surface));
                Token { surface, lang, stem }
            })
            .collect()
    }

    /// Tokenize and replace each token with its top level-3 checker
    /// candidate (falling back to the original surface form if none).
    pub fn convert(&self, text: &str) -> Result<String> {
        let tokens = self.tokenize(text);
        let mut out = Vec::with_capacity(tokens.len());

        for token in tokens {
            let Some(lang) = &token.lang else {
                out.push(token.surface);
                continue;
            };
            let lw = to_lower(&to_letters_str(&token.surface));
            let ctl = CheckControl {
                word: token.surface.clone(),
                lw,
                level: 3,
                max_num: 1,
            };
            let candidates = self.checker.check(lang, &ctl)?;
            match candidates.into_iter().next() {
                Some(c) => out.push(c.word_form.word),
                None => out.push(token.surface),
            }
        }

        Ok(out.join(" "))
    }

    /// Run the checker at `level`/`max_num` for every token of `text`.
    pub fn error_check(
        &self,
        text: &str,
        level: u8,
        max_num: usize,
    ) -> Result<Vec<(Token, Vec<crate::checker::Candidate>)>> {
        let tokens = self.tokenize(text);
        let mut results = Vec::with_capacity(tokens.len());

        for token in tokens {
            let candidates = match &token.lang {
                Some(lang) => {
                    let lw = to_lower(&to_letters_str(&token.surface));
                    let ctl = CheckControl {
                        word: token.surface.clone(),
                        lw,
                        level,
                        max_num,
                    };
                    self.checker.check(lang, &ctl)?
                }
                None => Vec::new(),
            };
            results.push((token.clone(), candidates));
        }

        Ok(results)
    }

    /// Train the detector on a new sample for `lang`.
    pub fn add_language(&self, lang: &str, sample_text: &str) {
        let letters = to_lower(&to_letters_str(sample_text));
        self.detector.add_language(lang, &letters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_model::ErrorModel;
    use std::time::Duration;

    fn temp_store() -> crate::dictionary::DictionaryStore {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "spellwarp_service_test_{}.redb",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        crate::dictionary::DictionaryStore::open(&p, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn tokenize_splits_on_whitespace_and_punctuation() {
        let checker = Arc::new(Checker::new());
        let detector = Arc::new(Detector::new(50));
        let service = Service::new(checker, detector, AlphabetRegistry::new());
        let tokens = service.tokenize("Hello, world!");
        let words: Vec<_> = tokens.iter().map(|t| t.surface.clone()).collect();
        assert_eq!(words, vec!["Hello", "world"]);
    }

    #[test]
    fn convert_falls_back_to_surface_when_no_language_detected() {
        let checker = Arc::new(Checker::new());
        let detector = Arc::new(Detector::new(50));
        let service = Service::new(checker, detector, AlphabetRegistry::new());
        let converted = service.convert("hello world").unwrap();
        assert_eq!(converted, "hello world");
    }

    #[test]
    fn convert_uses_exact_match_when_language_known() {
        let store = temp_store();
        store.write_word_form("hello", 10, 1).unwrap();
        let checker = Arc::new(Checker::new());
        checker.register_language("en", store, ErrorModel::new());

        let detector = Arc::new(Detector::new(50));
        detector.add_language("en", &to_lower(&to_letters_str("hello world this is english text")));

        let service = Service::new(checker, detector, AlphabetRegistry::new());
        let converted = service.convert("hello").unwrap();
        assert_eq!(converted, "hello");
    }
}
