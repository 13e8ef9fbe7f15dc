//! Applying the HTML ingester twice over the same corpus doubles `freq`
//! and `documents` exactly.

use spellwarp_core::alphabet::AlphabetRegistry;
use spellwarp_core::dictionary::DictionaryStore;
use spellwarp_core::ingest::html::HtmlIngester;
use std::time::Duration;

#[test]
fn double_ingestion_doubles_freq_and_documents() {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "spellwarp_ingest_roundtrip_{}.redb",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let store = DictionaryStore::open(&p, Duration::from_secs(60)).unwrap();
    let alphabets = AlphabetRegistry::new();
    let corpus = "the cat sat on the mat";

    let mut once = HtmlIngester::new("en", 1);
    once.ingest_document(corpus, &alphabets);
    once.flush(&store).unwrap();

    let after_first = store.get_word_form("the").unwrap().unwrap();

    let mut twice = HtmlIngester::new("en", 1);
    twice.ingest_document(corpus, &alphabets);
    twice.flush(&store).unwrap();

    let after_second = store.get_word_form("the").unwrap().unwrap();

    assert_eq!(after_second.freq, after_first.freq * 2);
    assert_eq!(after_second.documents, after_first.documents * 2);
}
