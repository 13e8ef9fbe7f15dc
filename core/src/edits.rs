//! Norvig-style single/double edit-distance candidate generation.
//!
//! Mirrors the split-at-every-position construction of the original
//! generator: delete, transpose, replace (skipped at the very first
//! position — only insert ever changes the leading letter) and insert (using
//! the error model at the position of the letter being inserted *after*).

use crate::error_model::ErrorModel;
use crate::letter::Letter;
use std::collections::BTreeSet;

/// All letter sequences reachable from `word` by exactly one delete,
/// transpose, replace, or insert, per the confusion sets in `model`.
pub fn edits1(word: &[Letter], model: &ErrorModel) -> BTreeSet<Vec<Letter>> {
    let mut out = BTreeSet::new();
    let n = word.len();

    let splits: Vec<(&[Letter], &[Letter])> = (0..=n).map(|i| (&word[..i], &word[i..])).collect();

    // deletes
    for (a, b) in &splits {
        if !b.is_empty() {
            let mut tmp = Vec::with_capacity(a.len() + b.len() - 1);
            tmp.extend_from_slice(a);
            tmp.extend_from_slice(&b[1..]);
            out.insert(tmp);
        }
    }

    // transposes
    for (a, b) in &splits {
        if b.len() > 1 {
            let mut tmp = Vec::with_capacity(a.len() + b.len());
            tmp.extend_from_slice(a);
            tmp.push(b[1]);
            tmp.push(b[0]);
            tmp.extend_from_slice(&b[2..]);
            out.insert(tmp);
        }
    }

    // replaces (never applied at the first position)
    for (a, b) in &splits {
        if !b.is_empty() && !a.is_empty() {
            for l in model.transform(b[0], a.len()) {
                let mut tmp = Vec::with_capacity(a.len() + b.len());
                tmp.extend_from_slice(a);
                tmp.push(l);
                tmp.extend_from_slice(&b[1..]);
                out.insert(tmp);
            }
        }
    }

    // inserts, using the error model on the previous letter
    for (a, b) in &splits {
        if !a.is_empty() {
            for l in model.transform(a[a.len() - 1], a.len()) {
                let mut tmp = Vec::with_capacity(a.len() + b.len() + 1);
                tmp.extend_from_slice(a);
                tmp.push(l);
                tmp.extend_from_slice(b);
                out.insert(tmp);
            }
        }
    }

    out
}

/// All letter sequences reachable by two edits: the union of `edits1` applied
/// to every member of `edits1(word)`.
pub fn edits2(word: &[Letter], model: &ErrorModel) -> BTreeSet<Vec<Letter>> {
    let mut out = BTreeSet::new();
    for e in edits1(word, model) {
        out.extend(edits1(&e, model));
    }
    out
}
