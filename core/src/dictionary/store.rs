//! Merge-semantics dictionary store built on `redb`.
//!
//! `redb` has no merge-operator extension point the way RocksDB does, so the
//! merge semantics are realized as explicit read-modify-write transactions:
//! every "merge" write reads the current value inside the same write
//! transaction, combines it with the incoming value per the rules on
//! [`WordForm::merge`]/[`DiskIndex::merge`], and writes the result back.
//!
//! What RocksDB calls key prefixes (`wf.`, `wf_indexed.`, ...) become
//! separate named redb tables here, the same translation the teacher made
//! for its own two logical keyspaces (`user_dict`, `user_bigram`).

use super::types::{DiskIndex, Metadata, NGramPosting, WordForm};
use crate::error::{CoreError, Result};
use crate::letter::{split_ngrams, to_lower, to_letters_str};
use crate::wire;
use redb::{Database, ReadableTable, TableDefinition};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

const WF_TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TableDefinition::new("wf");
const WF_INDEXED_TABLE: TableDefinition<'static, u64, &'static [u8]> = TableDefinition::new("wf_indexed");
const NGRAM_TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TableDefinition::new("ngram");
const TRANSFORM_TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TableDefinition::new("transform");
const META_TABLE: TableDefinition<'static, &'static str, &'static [u8]> = TableDefinition::new("dictionary_meta");
const META_KEY: &str = "meta";

fn open_registry() -> &'static Mutex<HashSet<PathBuf>> {
    static REGISTRY: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashSet::new()))
}

/// A persistent, merge-on-write dictionary store.
pub struct DictionaryStore {
    db: Arc<Database>,
    sequence: Arc<AtomicU64>,
    dirty: Arc<AtomicBool>,
    read_only: bool,
    canonical_path: PathBuf,
    sync_stop: Option<crossbeam_channel::Sender<()>>,
    sync_handle: Option<std::thread::JoinHandle<()>>,
}

impl DictionaryStore {
    /// Open (creating if absent) a read-write store, syncing metadata every
    /// `sync_metadata_timeout` if dirty.
    pub fn open(path: impl AsRef<Path>, sync_metadata_timeout: Duration) -> Result<Self> {
        Self::open_inner(path, false, Some(sync_metadata_timeout))
    }

    /// Open an existing store read-only; all write paths return `ReadOnly`
    /// and no background sync thread is started.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_inner(path, true, None)
    }

    fn open_inner(
        path: impl AsRef<Path>,
        read_only: bool,
        sync_metadata_timeout: Option<Duration>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        {
            let mut open_paths = open_registry().lock().expect("open registry poisoned");
            if !open_paths.insert(canonical.clone()) {
                return Err(CoreError::AlreadyOpen(canonical.display().to_string()));
            }
        }

        let db = if read_only {
            Database::open(path)
        } else {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            Database::create(path)
        };

        let db = match db {
            Ok(db) => db,
            Err(e) => {
                open_registry()
                    .lock()
                    .expect("open registry poisoned")
                    .remove(&canonical);
                return Err(CoreError::Storage(e.to_string()));
            }
        };

        let db = Arc::new(db);
        let sequence = Arc::new(AtomicU64::new(Self::read_metadata(&db)?.sequence));
        let dirty = Arc::new(AtomicBool::new(false));

        let (sync_stop, sync_handle) = if let Some(timeout) = sync_metadata_timeout {
            let db = Arc::clone(&db);
            let sequence = Arc::clone(&sequence);
            let dirty = Arc::clone(&dirty);
            let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
            let handle = std::thread::spawn(move || loop {
                match stop_rx.recv_timeout(timeout) {
                    Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                        let _ = Self::sync_metadata_now(&db, &sequence, &dirty);
                        break;
                    }
                    Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                        if dirty.load(Ordering::SeqCst) {
                            if let Err(e) = Self::sync_metadata_now(&db, &sequence, &dirty) {
                                tracing::warn!("metadata sync failed: {e}");
                            }
                        }
                    }
                }
            });
            (Some(stop_tx), Some(handle))
        } else {
            (None, None)
        };

        Ok(DictionaryStore {
            db,
            sequence,
            dirty,
            read_only,
            canonical_path: canonical,
            sync_stop,
            sync_handle,
        })
    }

    fn read_metadata(db: &Database) -> Result<Metadata> {
        let read = db.begin_read().map_err(CoreError::from)?;
        let table = match read.open_table(META_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Metadata::default()),
            Err(e) => return Err(e.into()),
        };
        match table.get(META_KEY).map_err(CoreError::from)? {
            Some(bytes) => wire::decode(bytes.value()),
            None => Ok(Metadata::default()),
        }
    }

    fn sync_metadata_now(db: &Database, sequence: &AtomicU64, dirty: &AtomicBool) -> Result<()> {
        let metadata = Metadata {
            sequence: sequence.load(Ordering::SeqCst),
        };
        let bytes = wire::encode(&metadata)?;
        let write = db.begin_write().map_err(CoreError::from)?;
        {
            let mut table = write.open_table(META_TABLE).map_err(CoreError::from)?;
            table.insert(META_KEY, bytes.as_slice()).map_err(CoreError::from)?;
        }
        write.commit().map_err(CoreError::from)?;
        dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Allocate the next indexed id and mark metadata dirty.
    pub fn next_indexed_id(&self) -> Result<u64> {
        self.check_writable()?;
        let id = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.dirty.store(true, Ordering::SeqCst);
        Ok(id)
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(CoreError::ReadOnly(self.canonical_path.display().to_string()));
        }
        Ok(())
    }

    /// Exact lookup by surface word.
    pub fn get_word_form(&self, word: &str) -> Result<Option<WordForm>> {
        self.read_keyed(WF_TABLE, word)
    }

    /// Lookup by indexed id, used to resolve n-gram candidate hits.
    pub fn get_word_form_by_id(&self, id: u64) -> Result<Option<WordForm>> {
        let read = self.db.begin_read().map_err(CoreError::from)?;
        let table = match read.open_table(WF_INDEXED_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match table.get(id).map_err(CoreError::from)? {
            Some(bytes) => Ok(Some(wire::decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Known-correction lookup.
    pub fn get_transform(&self, word: &str) -> Result<Option<WordForm>> {
        self.read_keyed(TRANSFORM_TABLE, word)
    }

    /// Last-write-wins write of a known correction.
    pub fn write_transform(&self, word: &str, corrected: &WordForm) -> Result<()> {
        self.check_writable()?;
        let bytes = wire::encode(corrected)?;
        let write = self.db.begin_write().map_err(CoreError::from)?;
        {
            let mut table = write.open_table(TRANSFORM_TABLE).map_err(CoreError::from)?;
            table.insert(word, bytes.as_slice()).map_err(CoreError::from)?;
        }
        write.commit().map_err(CoreError::from)?;
        Ok(())
    }

    fn read_keyed(
        &self,
        def: TableDefinition<'static, &'static str, &'static [u8]>,
        key: &str,
    ) -> Result<Option<WordForm>> {
        let read = self.db.begin_read().map_err(CoreError::from)?;
        let table = match read.open_table(def) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match table.get(key).map_err(CoreError::from)? {
            Some(bytes) => Ok(Some(wire::decode(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Postings for one bigram key.
    pub fn get_ngram_index(&self, bigram: &str) -> Result<DiskIndex> {
        let read = self.db.begin_read().map_err(CoreError::from)?;
        let table = match read.open_table(NGRAM_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(DiskIndex::default()),
            Err(e) => return Err(e.into()),
        };
        match table.get(bigram).map_err(CoreError::from)? {
            Some(bytes) => wire::decode(bytes.value()),
            None => Ok(DiskIndex::default()),
        }
    }

    /// The canonical merge write: allocate a fresh indexed id (the upstream
    /// ingesters always do this, even for a word already present, so every
    /// flush also creates a fresh `wf_indexed.` entry), then merge-write
    /// `wf.<word>`, `wf_indexed.<id>`, and `ngram.<bigram>` for every bigram
    /// of the word's lowercased letters, all in one transaction.
    pub fn write_word_form(&self, word: &str, freq: u64, documents: u64) -> Result<u64> {
        self.check_writable()?;
        let id = self.next_indexed_id()?;
        let incoming = WordForm::new(word, id).with_freq(freq, documents);
        let lw = to_lower(&to_letters_str(word));

        let write = self.db.begin_write().map_err(CoreError::from)?;
        {
            let mut wf_table = write.open_table(WF_TABLE).map_err(CoreError::from)?;
            let existing = match wf_table.get(word).map_err(CoreError::from)? {
                Some(bytes) => Some(wire::decode::<WordForm>(bytes.value())?),
                None => None,
            };
            let merged = WordForm::merge(existing, incoming.clone());
            let bytes = wire::encode(&merged)?;
            wf_table.insert(word, bytes.as_slice()).map_err(CoreError::from)?;
        }
        {
            let mut wf_indexed = write.open_table(WF_INDEXED_TABLE).map_err(CoreError::from)?;
            let bytes = wire::encode(&incoming)?;
            wf_indexed.insert(id, bytes.as_slice()).map_err(CoreError::from)?;
        }
        {
            let mut ngram_table = write.open_table(NGRAM_TABLE).map_err(CoreError::from)?;
            for bigram in split_ngrams(&lw, 2) {
                let key: String = bigram.iter().collect();
                let existing = match ngram_table.get(key.as_str()).map_err(CoreError::from)? {
                    Some(bytes) => Some(wire::decode::<DiskIndex>(bytes.value())?),
                    None => None,
                };
                let posting = NGramPosting { indexed_id: id };
                let merged = DiskIndex::merge(existing, vec![posting]);
                let bytes = wire::encode(&merged)?;
                ngram_table.insert(key.as_str(), bytes.as_slice()).map_err(CoreError::from)?;
            }
        }
        write.commit().map_err(CoreError::from)?;
        self.dirty.store(true, Ordering::SeqCst);
        Ok(id)
    }

    /// Augment the stored form for `word` with morphological annotation
    /// (`stem`, `root_len`, `features`). Creates a bare, zero-frequency entry
    /// if `word` has never been observed; leaves the n-gram index untouched,
    /// since a morphological annotation isn't a frequency observation --
    /// that's what the corpus ingesters' `write_word_form` is for.
    pub fn write_morphology(
        &self,
        word: &str,
        stem: &str,
        root_len: u32,
        features: Vec<String>,
    ) -> Result<u64> {
        self.check_writable()?;
        let write = self.db.begin_write().map_err(CoreError::from)?;
        let id;
        {
            let mut wf_table = write.open_table(WF_TABLE).map_err(CoreError::from)?;
            let existing = match wf_table.get(word).map_err(CoreError::from)? {
                Some(bytes) => Some(wire::decode::<WordForm>(bytes.value())?),
                None => None,
            };
            let is_new = existing.is_none();
            id = match &existing {
                Some(wf) => wf.indexed_id,
                None => self.next_indexed_id()?,
            };

            let mut annotation = WordForm::new(word, id);
            annotation.stem = stem.to_string();
            annotation.root_len = root_len;
            annotation.features = features;

            let merged = WordForm::merge(existing, annotation);
            let bytes = wire::encode(&merged)?;
            wf_table.insert(word, bytes.as_slice()).map_err(CoreError::from)?;

            if is_new {
                let mut wf_indexed = write.open_table(WF_INDEXED_TABLE).map_err(CoreError::from)?;
                wf_indexed.insert(id, bytes.as_slice()).map_err(CoreError::from)?;
            }
        }
        write.commit().map_err(CoreError::from)?;
        Ok(id)
    }

    pub fn current_metadata(&self) -> Metadata {
        Metadata {
            sequence: self.sequence.load(Ordering::SeqCst),
        }
    }
}

impl Drop for DictionaryStore {
    fn drop(&mut self) {
        if let Some(stop) = self.sync_stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.sync_handle.take() {
            let _ = handle.join();
        }
        open_registry()
            .lock()
            .expect("open registry poisoned")
            .remove(&self.canonical_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "spellwarp_test_{}_{}.redb",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn write_then_exact_read_roundtrips() {
        let path = temp_path("exact");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        store.write_word_form("cat", 3, 1).unwrap();
        let wf = store.get_word_form("cat").unwrap().unwrap();
        assert_eq!(wf.word, "cat");
        assert_eq!(wf.freq, 3);
    }

    #[test]
    fn repeated_writes_merge_freq_and_documents() {
        let path = temp_path("merge");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        store.write_word_form("cat", 3, 1).unwrap();
        store.write_word_form("cat", 2, 1).unwrap();
        let wf = store.get_word_form("cat").unwrap().unwrap();
        assert_eq!(wf.freq, 5);
        assert_eq!(wf.documents, 2);
    }

    #[test]
    fn each_write_allocates_a_fresh_indexed_id() {
        let path = temp_path("fresh_id");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        let id1 = store.write_word_form("cat", 1, 1).unwrap();
        let id2 = store.write_word_form("cat", 1, 1).unwrap();
        assert_ne!(id1, id2);
        assert!(store.get_word_form_by_id(id1).unwrap().is_some());
        assert!(store.get_word_form_by_id(id2).unwrap().is_some());
    }

    #[test]
    fn ngram_index_accumulates_across_writes() {
        let path = temp_path("ngram");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        store.write_word_form("cat", 1, 1).unwrap();
        store.write_word_form("cattle", 1, 1).unwrap();
        let index = store.get_ngram_index("ca").unwrap();
        assert_eq!(index.postings().len(), 2);
    }

    #[test]
    fn morphology_creates_bare_entry_and_keeps_first_annotation() {
        let path = temp_path("morphology");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();

        store
            .write_morphology("бежал", "бежать", 4, vec!["гл".into(), "прош".into()])
            .unwrap();
        let wf = store.get_word_form("бежал").unwrap().unwrap();
        assert_eq!(wf.stem, "бежать");
        assert_eq!(wf.root_len, 4);
        assert_eq!(wf.features, vec!["гл".to_string(), "прош".to_string()]);
        assert_eq!(wf.freq, 0);

        // A later annotation never overwrites the first-written stem/features.
        store
            .write_morphology("бежал", "бежать-ALT", 1, vec!["other".into()])
            .unwrap();
        let wf = store.get_word_form("бежал").unwrap().unwrap();
        assert_eq!(wf.stem, "бежать");
    }

    #[test]
    fn morphology_merges_onto_an_existing_frequency_entry() {
        let path = temp_path("morphology_merge");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();

        let id = store.write_word_form("бежал", 5, 2).unwrap();
        store
            .write_morphology("бежал", "бежать", 4, vec!["гл".into()])
            .unwrap();

        let wf = store.get_word_form("бежал").unwrap().unwrap();
        assert_eq!(wf.indexed_id, id);
        assert_eq!(wf.freq, 5);
        assert_eq!(wf.stem, "бежать");
    }

    #[test]
    fn transform_is_last_write_wins() {
        let path = temp_path("transform");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        let first = WordForm::new("cat", 1).with_freq(1, 1);
        let second = WordForm::new("cat", 2).with_freq(99, 99);
        store.write_transform("kat", &first).unwrap();
        store.write_transform("kat", &second).unwrap();
        let stored = store.get_transform("kat").unwrap().unwrap();
        assert_eq!(stored.indexed_id, 2);
        assert_eq!(stored.freq, 99);
    }

    #[test]
    fn double_open_same_process_fails() {
        let path = temp_path("double_open");
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        let second = DictionaryStore::open(&path, Duration::from_secs(60));
        assert!(matches!(second, Err(CoreError::AlreadyOpen(_))));
        drop(store);
    }

    #[test]
    fn read_only_open_rejects_writes() {
        let path = temp_path("read_only");
        {
            let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
            store.write_word_form("cat", 1, 1).unwrap();
        }
        let store = DictionaryStore::open_read_only(&path).unwrap();
        assert!(matches!(
            store.write_word_form("dog", 1, 1),
            Err(CoreError::ReadOnly(_))
        ));
        assert!(store.get_word_form("cat").unwrap().is_some());
    }

    #[test]
    fn sequence_persists_across_reopen() {
        let path = temp_path("seq_persist");
        let first_id = {
            let store = DictionaryStore::open(&path, Duration::from_millis(5)).unwrap();
            let id = store.write_word_form("cat", 1, 1).unwrap();
            DictionaryStore::sync_metadata_now(&store.db, &store.sequence, &store.dirty).unwrap();
            id
        };
        let store = DictionaryStore::open(&path, Duration::from_secs(60)).unwrap();
        let second_id = store.write_word_form("dog", 1, 1).unwrap();
        assert!(second_id > first_id);
    }
}
