//! Multi-threaded Wikipedia XML dump ingester.
//!
//! One parser thread drives a `quick-xml` pull reader and pushes `title`/
//! `text` elements onto a bounded channel; N worker threads consume them,
//! each accumulating its own partial word-count map, merged at the end.
//! The channel's bounded capacity (`2*n_workers`) *is* the backpressure
//! mechanism: a blocking send from the parser thread once the channel is
//! full plays the role the upstream condition-variable-gated queue plays.

use super::{tokenize, WordCounts};
use crate::alphabet::AlphabetRegistry;
use crate::dictionary::DictionaryStore;
use crate::error::{CoreError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A `title` or `text` element with its accumulated character data.
#[derive(Debug, Clone)]
struct Element {
    text: String,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct WikipediaIngester {
    lang: String,
    boundary: u64,
    n_workers: usize,
}

impl WikipediaIngester {
    pub fn new(lang: impl Into<String>, boundary: u64, n_workers: usize) -> Self {
        WikipediaIngester {
            lang: lang.into(),
            boundary,
            n_workers: n_workers.max(1),
        }
    }

    /// Parse `xml` and flush accumulated word counts above the boundary into
    /// `store`. `cancel` is polled cooperatively by both the parser and the
    /// workers; setting it causes an early, clean shutdown.
    pub fn run(
        &self,
        xml: &[u8],
        store: &DictionaryStore,
        alphabets: &AlphabetRegistry,
        cancel: Arc<AtomicBool>,
    ) -> Result<usize> {
        let (tx, rx) = crossbeam_channel::bounded::<Element>(2 * self.n_workers);

        let parser_cancel = Arc::clone(&cancel);
        let xml = xml.to_vec();
        let parser = std::thread::spawn(move || parse_elements(&xml, tx, parser_cancel));

        let mut worker_handles = Vec::with_capacity(self.n_workers);
        for _ in 0..self.n_workers {
            let rx = rx.clone();
            let worker_cancel = Arc::clone(&cancel);
            let lang = self.lang.clone();
            let alphabets_snapshot = alphabets.clone();
            worker_handles.push(std::thread::spawn(move || {
                let mut counts = WordCounts::new();
                loop {
                    if worker_cancel.load(Ordering::SeqCst) {
                        break;
                    }
                    match rx.recv_timeout(POLL_INTERVAL) {
                        Ok(element) => {
                            let words = tokenize(&element.text, &lang, &alphabets_snapshot);
                            for w in &words {
                                counts.observe(w);
                            }
                            let unique: std::collections::HashSet<String> = words.into_iter().collect();
                            counts.credit_document(&unique);
                        }
                        Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
                        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                    }
                }
                counts
            }));
        }

        parser.join().map_err(|_| CoreError::Internal("wikipedia parser thread panicked".into()))??;

        let mut merged = WordCounts::new();
        for handle in worker_handles {
            let partial = handle
                .join()
                .map_err(|_| CoreError::Internal("wikipedia worker thread panicked".into()))?;
            merged.merge(partial);
        }

        merged.flush(store, self.boundary)
    }
}

fn parse_elements(
    xml: &[u8],
    tx: crossbeam_channel::Sender<Element>,
    cancel: Arc<AtomicBool>,
) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text = true;

    let mut buf = Vec::new();
    let mut in_tracked_element = false;
    let mut current_text = String::new();

    loop {
        if cancel.load(Ordering::SeqCst) {
            break;
        }

        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if name.as_ref() == b"title" || name.as_ref() == b"text" {
                    in_tracked_element = true;
                    current_text.clear();
                }
            }
            Ok(Event::Text(e)) if in_tracked_element => {
                if let Ok(decoded) = e.unescape() {
                    current_text.push_str(&decoded);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if in_tracked_element && (name.as_ref() == b"title" || name.as_ref() == b"text") {
                    in_tracked_element = false;
                    if !current_text.is_empty() {
                        // A send failure means every worker has exited (e.g.
                        // cancellation raced us); stop parsing.
                        if tx
                            .send(Element {
                                text: std::mem::take(&mut current_text),
                            })
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CoreError::Internal(format!("xml parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
