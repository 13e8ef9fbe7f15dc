//! Load a morphological dictionary (lemma + surface-form/root-len/feature
//! blocks) into the dictionary store.

use anyhow::{Context, Result};
use clap::Parser;
use spellwarp_core::dictionary::DictionaryStore;
use spellwarp_core::ingest::morphology::load_morphology_dict;
use std::time::Duration;

#[derive(Parser)]
struct Args {
    /// Path to the morphological dictionary text file.
    #[arg(long)]
    input: std::path::PathBuf,

    /// Path to the dictionary store (created if absent).
    #[arg(long)]
    store: std::path::PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let store = DictionaryStore::open(&args.store, Duration::from_secs(60))
        .with_context(|| format!("opening store at {}", args.store.display()))?;

    let written = load_morphology_dict(&store, &text)?;
    tracing::info!("wrote {written} morphological annotations");
    Ok(())
}
