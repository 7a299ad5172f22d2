//! # pdf-ocr-batch
//!
//! Batch-convert a folder of PDF files into plain-text files with an external
//! OCR engine, one `<stem>.txt` per input PDF.
//!
//! Each page is rasterised with pdfium, recognised by `tesseract`, cleaned up
//! and joined with the others in page order. A page the engine cannot read
//! becomes an empty segment; a file that cannot be opened is reported and the
//! batch carries on with the next one.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input_files/
//!  │
//!  ├─ 1. Scan     list *.pdf (case-insensitive), sorted by name
//!  ├─ 2. Render   rasterise pages via pdfium (spawn_blocking)
//!  ├─ 3. OCR      tesseract per page, UTF-8 text out
//!  ├─ 4. Clean    strip form feeds, trailing spaces, blank-line runs
//!  ├─ 5. Join     pages in order with the page separator
//!  └─ 6. Write    output_files/<stem>.txt (atomic)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr_batch::{run_batch, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .input_dir("input_files")
//!         .output_dir("output_files")
//!         .ocr_language("eng")
//!         .build()?;
//!     let report = run_batch(config).await?;
//!     eprintln!("{}", report.summary_line());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, run_batch_sync, BatchRunner, RunState};
pub use config::{BatchConfig, BatchConfigBuilder, PageSeparator};
pub use error::{ErrorKind, OcrBatchError, PageError};
pub use output::{BatchReport, ExtractedText, FileOutcome, FileStatus, PageResult};
pub use pipeline::input::{scan_input_dir, DocumentFormat, InputDocument};
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
pub use pipeline::render::{PageImage, PdfiumRasterizer, Rasterizer};
pub use process::DocumentProcessor;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
