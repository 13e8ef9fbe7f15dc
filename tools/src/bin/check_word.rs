//! Interactive spell-check CLI: reads words from stdin, prints ranked
//! candidates from a dictionary store.

use anyhow::{Context, Result};
use clap::Parser;
use spellwarp_core::checker::{CheckControl, Checker};
use spellwarp_core::dictionary::DictionaryStore;
use spellwarp_core::error_model::ErrorModel;
use spellwarp_core::letter::{to_letters_str, to_lower};
use std::io::BufRead;

#[derive(Parser)]
struct Args {
    /// Path to the dictionary store (opened read-only).
    #[arg(long)]
    store: std::path::PathBuf,

    /// Language tag the store was ingested under.
    #[arg(long, default_value = "en")]
    lang: String,

    /// Error model replace-map file.
    #[arg(long)]
    replace_map: Option<std::path::PathBuf>,

    /// Error model around-map file.
    #[arg(long)]
    around_map: Option<std::path::PathBuf>,

    /// Number of top results to return.
    #[arg(long, default_value_t = 3)]
    num: usize,

    /// Check level (0: exact/known, 2: plus Norvig edits, 3: plus n-gram fallback).
    #[arg(long, default_value_t = 3)]
    level: u8,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let store = DictionaryStore::open_read_only(&args.store)
        .with_context(|| format!("opening store at {}", args.store.display()))?;

    let mut model = ErrorModel::new();
    if let Some(path) = &args.replace_map {
        let replace = ErrorModel::load_replace_file(path)?;
        model = model.with_replace(replace);
    }
    if let Some(path) = &args.around_map {
        let around = ErrorModel::load_around_file(path)?;
        model = model.with_around(around);
    }

    let checker = Checker::new();
    checker.register_language(&args.lang, store, model);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let word = line.context("reading stdin")?;
        let word = word.trim();
        if word.is_empty() {
            continue;
        }

        let lw = to_lower(&to_letters_str(word));
        let ctl = CheckControl {
            word: word.to_string(),
            lw,
            level: args.level,
            max_num: args.num,
        };

        let results = checker.check(&args.lang, &ctl)?;
        for c in results {
            println!(
                "{word} -> {}, freq: {}, documents: {}, edit_distance: {:?}, similarity: {:.4}",
                c.word_form.word, c.word_form.freq, c.word_form.documents, c.edit_distance, c.similarity
            );
        }
    }

    Ok(())
}
