//! Per-letter confusion sets used to generate plausible keyboard/OCR errors.
//!
//! Two maps: `replace` (confusions that can occur anywhere in a word) and
//! `around` (confusions suppressed at the first letter, to avoid turning the
//! leading letter of a word into a keyboard neighbour — the single most
//! common source of false-positive corrections).

use crate::error::{CoreError, Result};
use crate::letter::Letter;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug, Default, Clone)]
pub struct ErrorModel {
    replace: HashMap<Letter, Vec<Letter>>,
    around: HashMap<Letter, Vec<Letter>>,
}

impl ErrorModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replace(mut self, replace: HashMap<Letter, Vec<Letter>>) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_around(mut self, around: HashMap<Letter, Vec<Letter>>) -> Self {
        self.around = around;
        self
    }

    /// `source` itself, plus `replace[source]` always, plus `around[source]`
    /// only when `position != 0`. Order is deterministic: source first, then
    /// replace entries, then around entries, each in insertion order.
    pub fn transform(&self, source: Letter, position: usize) -> Vec<Letter> {
        let mut set: IndexSet<Letter> = IndexSet::new();
        set.insert(source);

        if let Some(letters) = self.replace.get(&source) {
            set.extend(letters.iter().copied());
        }

        if position != 0 {
            if let Some(letters) = self.around.get(&source) {
                set.extend(letters.iter().copied());
            }
        }

        set.into_iter().collect()
    }

    /// Load a `replace` map from a text file: each line is
    /// `<source letter><space><confusable letters...>`.
    pub fn load_replace_file(path: &std::path::Path) -> Result<HashMap<Letter, Vec<Letter>>> {
        load_map(path)
    }

    /// Load an `around` map from a text file, same format as `load_replace_file`.
    pub fn load_around_file(path: &std::path::Path) -> Result<HashMap<Letter, Vec<Letter>>> {
        load_map(path)
    }
}

fn load_map(path: &std::path::Path) -> Result<HashMap<Letter, Vec<Letter>>> {
    let file = std::fs::File::open(path).map_err(CoreError::Io)?;
    let reader = std::io::BufReader::new(file);
    let mut map = HashMap::new();

    for line in reader.lines() {
        let line = line.map_err(CoreError::Io)?;
        let mut chars = line.chars();
        let Some(source) = chars.next() else {
            continue;
        };
        let rest: String = chars.collect();
        let rest = rest.strip_prefix(' ').unwrap_or(&rest);
        if rest.is_empty() {
            continue;
        }
        map.insert(source, rest.chars().collect());
    }

    if map.is_empty() {
        return Err(CoreError::InvalidArgument(format!(
            "could not load error model map from {}",
            path.display()
        )));
    }

    Ok(map)
}
