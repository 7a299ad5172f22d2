//! Input enumeration: scan the input directory for supported documents.
//!
//! Files are matched purely on extension; nothing is opened here, so
//! unsupported files are never attempted. The result is sorted by file name
//! so two runs over the same directory process files in the same order.

use crate::error::OcrBatchError;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Document formats the pipeline knows how to rasterise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
}

impl DocumentFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Format of the file at `path`, judged by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("PDF"),
        }
    }
}

/// One source document found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDocument {
    pub path: PathBuf,
    /// File name without its extension; names the output file.
    pub stem: String,
    pub format: DocumentFormat,
}

impl InputDocument {
    /// Build a document record for `path`, or `None` when the extension is
    /// not supported.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = DocumentFormat::from_path(&path)?;
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        Some(Self { path, stem, format })
    }

    /// File name for logs and progress output.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// List every supported document directly inside `dir`, sorted by file name.
///
/// # Errors
/// - [`OcrBatchError::InputDirNotFound`] if `dir` is missing or not a directory
/// - [`OcrBatchError::InputDirUnreadable`] if it cannot be listed
pub async fn scan_input_dir(dir: &Path) -> Result<Vec<InputDocument>, OcrBatchError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(OcrBatchError::InputDirNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(OcrBatchError::InputDirNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(OcrBatchError::InputDirUnreadable {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    }

    let unreadable = |e: std::io::Error| OcrBatchError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut documents = Vec::new();
    let mut ignored = 0usize;

    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        // Follows symlinks so linked PDFs are picked up.
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        match InputDocument::from_path(&path) {
            Some(doc) => documents.push(doc),
            None => {
                debug!("Ignoring unsupported file: {}", path.display());
                ignored += 1;
            }
        }
    }

    documents.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    info!(
        "Found {} documents in {} ({} other files ignored)",
        documents.len(),
        dir.display(),
        ignored
    );
    Ok(documents)
}

/// Verify the file starts with the `%PDF` magic bytes.
///
/// Gives a clear [`OcrBatchError::NotAPdf`] for renamed files instead of an
/// opaque pdfium load error.
pub fn check_pdf_magic(path: &Path) -> Result<(), OcrBatchError> {
    let mut f = std::fs::File::open(path).map_err(|e| OcrBatchError::CorruptPdf {
        path: path.to_path_buf(),
        detail: format!("cannot open: {}", e),
    })?;
    let mut magic = [0u8; 4];
    match f.read_exact(&mut magic) {
        Ok(()) if &magic == b"%PDF" => Ok(()),
        Ok(()) => Err(OcrBatchError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        }),
        Err(e) => Err(OcrBatchError::CorruptPdf {
            path: path.to_path_buf(),
            detail: format!("file too short: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_extension("pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("Pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension("txt"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn input_document_from_path() {
        let doc = InputDocument::from_path("/data/in/Report 2024.PDF").unwrap();
        assert_eq!(doc.stem, "Report 2024");
        assert_eq!(doc.format, DocumentFormat::Pdf);
        assert_eq!(doc.display_name(), "Report 2024.PDF");
        assert!(InputDocument::from_path("/data/in/notes.txt").is_none());
        assert!(InputDocument::from_path("/data/in/pdf").is_none());
    }

    #[tokio::test]
    async fn scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "c.txt", "d.png"] {
            std::fs::write(dir.path().join(name), b"%PDF-1.7").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let docs = scan_input_dir(dir.path()).await.unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.display_name()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[tokio::test]
    async fn scan_empty_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_input_dir(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_missing_dir_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_input_dir(&dir.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, OcrBatchError::InputDirNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn scan_file_instead_of_dir_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("input_files");
        std::fs::write(&file, b"").unwrap();
        let err = scan_input_dir(&file).await.unwrap_err();
        assert!(matches!(err, OcrBatchError::InputDirNotFound { .. }));
    }

    #[test]
    fn magic_check() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdf");
        let bad = dir.path().join("bad.pdf");
        let short = dir.path().join("short.pdf");
        std::fs::write(&good, b"%PDF-1.4\n...").unwrap();
        std::fs::write(&bad, b"PK\x03\x04zip").unwrap();
        std::fs::write(&short, b"%P").unwrap();

        assert!(check_pdf_magic(&good).is_ok());
        assert!(matches!(
            check_pdf_magic(&bad),
            Err(OcrBatchError::NotAPdf { magic, .. }) if &magic == b"PK\x03\x04"
        ));
        assert!(matches!(
            check_pdf_magic(&short),
            Err(OcrBatchError::CorruptPdf { .. })
        ));
    }
}
