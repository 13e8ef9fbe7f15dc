//! Train (or extend) a language detector profile from plain-text sample
//! files and save it to disk.

use anyhow::{Context, Result};
use clap::Parser;
use spellwarp_core::detector::Detector;
use spellwarp_core::letter::{to_letters_str, to_lower};

#[derive(Parser)]
struct Args {
    /// Existing detector file to extend; omit to start fresh.
    #[arg(long)]
    load: Option<std::path::PathBuf>,

    /// Where to save the trained detector.
    #[arg(long)]
    save: std::path::PathBuf,

    /// K: number of top n-grams kept per language per n.
    #[arg(long, default_value_t = 400)]
    profile_size: usize,

    /// `lang:path` pairs, one sample text file per language.
    #[arg(long = "sample", value_name = "LANG:PATH")]
    samples: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let detector = match &args.load {
        Some(path) => Detector::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Detector::new(args.profile_size),
    };

    for sample in &args.samples {
        let (lang, path) = sample
            .split_once(':')
            .with_context(|| format!("expected LANG:PATH, got {sample}"))?;
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let letters = to_lower(&to_letters_str(&text));
        detector.add_language(lang, &letters);
        tracing::info!("trained {lang} on {path}");
    }

    detector.save(&args.save)?;
    Ok(())
}
