//! Progress-callback trait for per-file and per-page batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the driver works through the input directory. The CLI uses this to drive
//! its progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdf_ocr_batch::{BatchConfig, BatchProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, _file: &str, _index: usize, _total: usize, _failed_pages: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch driver as it processes each file and page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` arguments are 1-indexed positions in the
/// enumerated batch. Page events are raised from the blocking worker thread
/// that runs the OCR engine, hence `Send + Sync`.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the input directory has been scanned.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is rasterised.
    fn on_file_start(&self, file: &str, index: usize, total: usize) {
        let _ = (file, index, total);
    }

    /// Called after the OCR engine has returned for a page.
    ///
    /// `ok` is false when the page was replaced by an empty segment.
    fn on_page_complete(&self, file: &str, page_num: usize, ok: bool) {
        let _ = (file, page_num, ok);
    }

    /// Called when a file's output has been written.
    fn on_file_complete(&self, file: &str, index: usize, total: usize, failed_pages: usize) {
        let _ = (file, index, total, failed_pages);
    }

    /// Called when a file failed and produced no output.
    fn on_file_error(&self, file: &str, index: usize, total: usize, error: &str) {
        let _ = (file, index, total, error);
    }

    /// Called when a file was skipped because its output already exists.
    fn on_file_skipped(&self, file: &str, index: usize, total: usize) {
        let _ = (file, index, total);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, succeeded: usize, failed: usize) {
        let _ = (total_files, succeeded, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
