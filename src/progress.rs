//! Progress-callback trait for per-document extraction events.
//!
//! Inject an [`Arc<dyn RosterProgressCallback>`] via
//! [`crate::config::RosterConfigBuilder::progress_callback`] to observe the
//! pipeline as it walks the input PDFs. The CLI uses it to drive a
//! terminal progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use photoroster::{RosterConfig, RosterProgressCallback, StudentRecord};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl RosterProgressCallback for Counter {
//!     fn on_record_extracted(&self, record: &StudentRecord) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("found {}", record.name);
//!     }
//! }
//!
//! let config = RosterConfig::builder()
//!     .progress_callback(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::roster::StudentRecord;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it processes each source document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Documents are processed sequentially, so events
/// arrive in order; the `Send + Sync` bound only lets the config be shared.
pub trait RosterProgressCallback: Send + Sync {
    /// Called once before the first document is opened.
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before a document is opened.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position among the inputs
    /// * `total` — number of input documents
    /// * `path`  — the document being processed
    fn on_document_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called once per (name, email, photo) pairing written to disk.
    fn on_record_extracted(&self, record: &StudentRecord) {
        let _ = record;
    }

    /// Called after a document has been fully scanned.
    fn on_document_complete(&self, index: usize, total: usize, records: usize) {
        let _ = (index, total, records);
    }

    /// Called once the markup has been laid out.
    ///
    /// # Arguments
    /// * `records` — size of the sorted roster
    /// * `pages`   — number of output pages
    fn on_run_complete(&self, records: usize, pages: usize) {
        let _ = (records, pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RosterProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RosterConfig`].
pub type ProgressCallback = Arc<dyn RosterProgressCallback>;
