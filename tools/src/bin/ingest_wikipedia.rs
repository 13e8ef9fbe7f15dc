//! Ingest a Wikipedia XML dump into the dictionary store using the
//! multi-threaded parser/worker pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use spellwarp_core::alphabet::AlphabetRegistry;
use spellwarp_core::dictionary::DictionaryStore;
use spellwarp_core::ingest::wikipedia::WikipediaIngester;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
struct Args {
    /// Path to the Wikipedia XML dump.
    #[arg(long)]
    xml: std::path::PathBuf,

    /// Path to the dictionary store (created if absent).
    #[arg(long)]
    store: std::path::PathBuf,

    /// Language tag to ingest under.
    #[arg(long, default_value = "en")]
    lang: String,

    /// Minimum occurrence count for a word to be written to the store.
    #[arg(long, default_value_t = 2)]
    boundary: u64,

    /// Number of worker threads consuming parsed elements.
    #[arg(long, default_value_t = 4)]
    workers: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let xml = std::fs::read(&args.xml).with_context(|| format!("reading {}", args.xml.display()))?;
    let store = DictionaryStore::open(&args.store, Duration::from_secs(60))
        .with_context(|| format!("opening store at {}", args.store.display()))?;
    let alphabets = AlphabetRegistry::new();
    let ingester = WikipediaIngester::new(&args.lang, args.boundary, args.workers);

    // A caller embedding this pipeline (rather than running it to
    // completion as a one-shot CLI) would flip this flag from another
    // thread to request an early, clean shutdown.
    let cancel = Arc::new(AtomicBool::new(false));

    let written = ingester.run(&xml, &store, &alphabets, cancel)?;
    tracing::info!("wrote {written} word forms");
    Ok(())
}
