//! Error types for the pdf-ocr-batch library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`OcrBatchError`] — a failure of the whole run or of one input file.
//!   Only the [`ErrorKind::Configuration`] variants are fatal; the driver
//!   records every other variant against the offending file and moves on.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to render or to be
//!   recognised. Stored inside [`crate::output::PageResult`]; the page's slot
//!   in the extracted text is left empty.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`OcrBatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input/output directory or external engine unusable. Aborts the run.
    Configuration,
    /// One input file could not be opened or yielded no text.
    DocumentRasterization,
    /// The result for one file could not be persisted.
    OutputWrite,
    /// Unexpected internal failure while handling one file.
    Internal,
}

/// All errors returned by the pdf-ocr-batch library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum OcrBatchError {
    // ── Configuration errors (fatal) ──────────────────────────────────────
    /// The input directory does not exist or is not a directory.
    #[error("Input directory not found: '{path}'\nCreate it or pass --input-dir.")]
    InputDirNotFound { path: PathBuf },

    /// The input directory exists but cannot be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory cannot be created.
    #[error("Cannot create output directory '{path}': {source}")]
    OutputDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OCR engine binary could not be run.
    #[error(
        "OCR engine '{path}' is not usable: {detail}\n\
Install tesseract or point --ocr-engine-path at the executable."
    )]
    EngineUnavailable { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium or set PDFIUM_LIB_PATH to the directory containing it."
    )]
    PdfiumBindingFailed(String),

    /// Builder validation failed, or the runner was misused.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Document errors (per file) ────────────────────────────────────────
    /// The file does not start with the `%PDF` magic bytes.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; batch runs do not take passwords.
    #[error("PDF '{path}' is encrypted and requires a password")]
    PasswordRequired { path: PathBuf },

    /// No rasterizer is registered for the document's format.
    #[error("No rasterizer registered for {format} document '{path}'")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Every page of the document failed; there is no text to write.
    #[error("All {total} pages of '{path}' failed.\nFirst error: {first_error}")]
    AllPagesFailed {
        path: PathBuf,
        total: usize,
        first_error: String,
    },

    /// Another input in this run already produced the same output stem.
    #[error("'{path}' has the same stem '{stem}' as an earlier input; skipping")]
    DuplicateStem { path: PathBuf, stem: String },

    // ── I/O errors (per file) ─────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrBatchError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OcrBatchError::InputDirNotFound { .. }
            | OcrBatchError::InputDirUnreadable { .. }
            | OcrBatchError::OutputDirUnavailable { .. }
            | OcrBatchError::EngineUnavailable { .. }
            | OcrBatchError::PdfiumBindingFailed(_)
            | OcrBatchError::InvalidConfig(_) => ErrorKind::Configuration,
            OcrBatchError::NotAPdf { .. }
            | OcrBatchError::CorruptPdf { .. }
            | OcrBatchError::PasswordRequired { .. }
            | OcrBatchError::UnsupportedFormat { .. }
            | OcrBatchError::AllPagesFailed { .. }
            | OcrBatchError::DuplicateStem { .. } => ErrorKind::DocumentRasterization,
            OcrBatchError::OutputWriteFailed { .. } => ErrorKind::OutputWrite,
            OcrBatchError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error must abort the whole batch.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

/// A non-fatal error for a single page.
///
/// The page contributes an empty segment to the document's text.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The OCR engine failed on this page.
    #[error("Page {page}: recognition failed: {detail}")]
    RecognitionFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } | PageError::RecognitionFailed { page, .. } => {
                *page
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_errors_are_fatal() {
        let missing = OcrBatchError::InputDirNotFound {
            path: PathBuf::from("input_files"),
        };
        assert!(missing.is_fatal());
        assert!(OcrBatchError::PdfiumBindingFailed("nope".into()).is_fatal());

        let corrupt = OcrBatchError::CorruptPdf {
            path: PathBuf::from("a.pdf"),
            detail: "bad xref".into(),
        };
        assert_eq!(corrupt.kind(), ErrorKind::DocumentRasterization);
        assert!(!corrupt.is_fatal());

        let write = OcrBatchError::OutputWriteFailed {
            path: PathBuf::from("out/a.txt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(write.kind(), ErrorKind::OutputWrite);
        assert!(!write.is_fatal());
    }

    #[test]
    fn input_dir_not_found_names_path() {
        let e = OcrBatchError::InputDirNotFound {
            path: PathBuf::from("/nowhere/input_files"),
        };
        assert!(e.to_string().contains("/nowhere/input_files"));
    }

    #[test]
    fn all_pages_failed_display() {
        let e = OcrBatchError::AllPagesFailed {
            path: PathBuf::from("scan.pdf"),
            total: 3,
            first_error: "Page 1: recognition failed: exit 1".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("All 3 pages"), "got: {msg}");
        assert!(msg.contains("scan.pdf"));
    }

    #[test]
    fn page_error_reports_page_number() {
        let e = PageError::RecognitionFailed {
            page: 7,
            detail: "timeout".into(),
        };
        assert_eq!(e.page(), 7);
        assert!(e.to_string().starts_with("Page 7"));
    }
}
