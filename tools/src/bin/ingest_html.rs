//! Ingest a directory of already-extracted plain-text documents into the
//! dictionary store (HTML-to-text extraction itself is out of scope).

use anyhow::{Context, Result};
use clap::Parser;
use spellwarp_core::alphabet::AlphabetRegistry;
use spellwarp_core::dictionary::DictionaryStore;
use spellwarp_core::ingest::html::HtmlIngester;
use std::time::Duration;

#[derive(Parser)]
struct Args {
    /// Directory of `.txt` documents to ingest.
    #[arg(long)]
    input_dir: std::path::PathBuf,

    /// Path to the dictionary store (created if absent).
    #[arg(long)]
    store: std::path::PathBuf,

    /// Language tag to ingest under.
    #[arg(long, default_value = "en")]
    lang: String,

    /// Minimum occurrence count for a word to be written to the store.
    #[arg(long, default_value_t = 2)]
    boundary: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let store = DictionaryStore::open(&args.store, Duration::from_secs(60))
        .with_context(|| format!("opening store at {}", args.store.display()))?;
    let alphabets = AlphabetRegistry::new();
    let mut ingester = HtmlIngester::new(&args.lang, args.boundary);

    let mut count = 0;
    for entry in std::fs::read_dir(&args.input_dir)
        .with_context(|| format!("reading directory {}", args.input_dir.display()))?
    {
        let entry = entry?;
        if entry.path().extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let text = std::fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        ingester.ingest_document(&text, &alphabets);
        count += 1;
    }

    let written = ingester.flush(&store)?;
    tracing::info!("ingested {count} documents, wrote {written} word forms");
    Ok(())
}
