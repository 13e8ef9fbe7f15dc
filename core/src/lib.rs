//! Multilingual spelling correction and morphological analysis.
//!
//! Ties together Unicode letter/n-gram primitives, a rank-based language
//! detector, a merge-semantics dictionary store, a four-level spell
//! checker, and two corpus ingesters, behind a thin [`service::Service`]
//! façade.

pub mod alphabet;
pub mod checker;
pub mod config;
pub mod detector;
pub mod dictionary;
pub mod edits;
pub mod error;
pub mod error_model;
pub mod ingest;
pub mod letter;
pub mod service;
pub mod wire;

pub use checker::{CheckControl, Candidate, Checker};
pub use config::ServiceConfig;
pub use detector::Detector;
pub use dictionary::{DictionaryStore, DiskIndex, Metadata, NGramPosting, WordForm};
pub use error::{CoreError, Result};
pub use error_model::ErrorModel;
pub use service::{Service, Stemmer, Token};
