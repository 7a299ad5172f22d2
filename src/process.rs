//! Document processing: one input document in, one [`ExtractedText`] out.
//!
//! For each page, in order: rasterise → recognise → clean. A page that fails
//! at either step keeps its slot in the output as an empty segment so the
//! remaining text stays in place; only a document that cannot be opened at
//! all, or whose every page failed, is a document-level error.
//!
//! Processing is blocking and performs no file writes.

use crate::config::{BatchConfig, PageSeparator};
use crate::error::{OcrBatchError, PageError};
use crate::output::{ExtractedText, PageResult};
use crate::pipeline::input::{DocumentFormat, InputDocument};
use crate::pipeline::ocr::{OcrEngine, TesseractEngine};
use crate::pipeline::postprocess::clean_page_text;
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use crate::progress::ProgressCallback;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Turns input documents into extracted text.
pub struct DocumentProcessor {
    rasterizers: HashMap<DocumentFormat, Arc<dyn Rasterizer>>,
    engine: Arc<dyn OcrEngine>,
    language: String,
    separator: PageSeparator,
    progress: Option<ProgressCallback>,
}

impl DocumentProcessor {
    /// A processor with no rasterizers registered yet.
    pub fn new(engine: Arc<dyn OcrEngine>, config: &BatchConfig) -> Self {
        Self {
            rasterizers: HashMap::new(),
            engine,
            language: config.ocr_language.clone(),
            separator: config.page_separator.clone(),
            progress: config.progress_callback.clone(),
        }
    }

    /// The production processor: pdfium for PDFs, tesseract for OCR.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(Arc::new(TesseractEngine::new(config)), config)
            .with_rasterizer(DocumentFormat::Pdf, Arc::new(PdfiumRasterizer::new(config)))
    }

    /// Register the rasterizer used for `format`, replacing any previous one.
    pub fn with_rasterizer(mut self, format: DocumentFormat, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizers.insert(format, rasterizer);
        self
    }

    /// Verify the engine and every registered rasterizer are usable.
    pub fn check(&self) -> Result<(), OcrBatchError> {
        self.engine.check()?;
        for rasterizer in self.rasterizers.values() {
            rasterizer.check()?;
        }
        Ok(())
    }

    /// Rasterise and recognise every page of `doc`.
    ///
    /// # Errors
    /// - [`OcrBatchError::UnsupportedFormat`] when no rasterizer handles the format
    /// - any error from [`Rasterizer::render_pages`] opening the document
    /// - [`OcrBatchError::AllPagesFailed`] when the document has pages but none
    ///   produced text
    pub fn process(&self, doc: &InputDocument) -> Result<ExtractedText, OcrBatchError> {
        let rasterizer =
            self.rasterizers
                .get(&doc.format)
                .ok_or_else(|| OcrBatchError::UnsupportedFormat {
                    path: doc.path.clone(),
                    format: doc.format.to_string(),
                })?;

        let name = doc.display_name();
        let mut pages: Vec<PageResult> = Vec::new();

        let total = rasterizer.render_pages(&doc.path, &mut |rendered| {
            let start = Instant::now();
            let result = rendered.and_then(|img| {
                self.engine
                    .recognize(&img, &self.language)
                    .map(|raw| (img.page_num, clean_page_text(&raw)))
            });
            let duration_ms = start.elapsed().as_millis() as u64;

            let page = match result {
                Ok((page_num, text)) => {
                    debug!("{}: page {} → {} chars", name, page_num, text.len());
                    PageResult {
                        page_num,
                        text,
                        duration_ms,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!("{}: page {} left empty: {}", name, e.page(), e);
                    PageResult {
                        page_num: e.page(),
                        text: String::new(),
                        duration_ms,
                        error: Some(e),
                    }
                }
            };

            if let Some(ref cb) = self.progress {
                cb.on_page_complete(&name, page.page_num, page.is_ok());
            }
            pages.push(page);
        })?;

        if total != pages.len() {
            warn!(
                "{}: document reports {} pages but {} were rendered",
                name,
                total,
                pages.len()
            );
        }

        // Sort by page number for consistent output
        pages.sort_by_key(|p| p.page_num);

        if !pages.is_empty() && pages.iter().all(|p| !p.is_ok()) {
            let first_error = pages
                .iter()
                .find_map(|p| p.error.as_ref())
                .map(PageError::to_string)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(OcrBatchError::AllPagesFailed {
                path: doc.path.clone(),
                total: pages.len(),
                first_error,
            });
        }

        let text = assemble_pages(&pages, &self.separator);
        let extracted = ExtractedText { pages, text };
        info!(
            "{}: {} pages recognised ({} empty-substituted)",
            name,
            extracted.pages.len(),
            extracted.failed_pages()
        );
        Ok(extracted)
    }
}

/// Join page texts in order with `separator` between consecutive pages.
///
/// Failed pages contribute their (empty) text, so every page keeps its slot.
pub fn assemble_pages(pages: &[PageResult], separator: &PageSeparator) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(&separator.render());
        }
        if let Some(header) = separator.page_header(page.page_num) {
            out.push_str(&header);
        }
        out.push_str(&page.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render::PageImage;
    use std::path::Path;

    /// Renders one page per line of the file; a file starting with "BROKEN"
    /// cannot be opened.
    struct LineRasterizer;

    impl Rasterizer for LineRasterizer {
        fn render_pages(
            &self,
            path: &Path,
            visit: &mut dyn FnMut(Result<PageImage, PageError>),
        ) -> Result<usize, OcrBatchError> {
            let body = std::fs::read_to_string(path).map_err(|e| OcrBatchError::CorruptPdf {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
            if body.starts_with("BROKEN") {
                return Err(OcrBatchError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: "bad xref".into(),
                });
            }
            let lines: Vec<&str> = body.lines().collect();
            for (i, line) in lines.iter().enumerate() {
                visit(Ok(PageImage {
                    page_num: i + 1,
                    width: 1,
                    height: 1,
                    png: line.as_bytes().to_vec(),
                }));
            }
            Ok(lines.len())
        }
    }

    /// Echoes the page bytes; pages containing "GARBLED" fail.
    struct EchoEngine;

    impl OcrEngine for EchoEngine {
        fn recognize(&self, page: &PageImage, language: &str) -> Result<String, PageError> {
            assert_eq!(language, "eng");
            let text = String::from_utf8_lossy(&page.png).into_owned();
            if text.contains("GARBLED") {
                Err(PageError::RecognitionFailed {
                    page: page.page_num,
                    detail: "exited with code 1".into(),
                })
            } else {
                Ok(format!("{text}\n\x0c"))
            }
        }
    }

    fn processor(separator: PageSeparator) -> DocumentProcessor {
        let config = BatchConfig::builder().page_separator(separator).build().unwrap();
        DocumentProcessor::new(Arc::new(EchoEngine), &config)
            .with_rasterizer(DocumentFormat::Pdf, Arc::new(LineRasterizer))
    }

    fn doc_with(dir: &Path, name: &str, body: &str) -> InputDocument {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        InputDocument::from_path(path).unwrap()
    }

    fn page(n: usize, text: &str, failed: bool) -> PageResult {
        PageResult {
            page_num: n,
            text: text.to_string(),
            duration_ms: 0,
            error: failed.then(|| PageError::RecognitionFailed {
                page: n,
                detail: "x".into(),
            }),
        }
    }

    #[test]
    fn pages_joined_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_with(dir.path(), "a.pdf", "one\ntwo\nthree");
        let out = processor(PageSeparator::BlankLine).process(&doc).unwrap();
        assert_eq!(out.text, "one\n\ntwo\n\nthree");
        assert_eq!(out.failed_pages(), 0);
    }

    #[test]
    fn failed_page_keeps_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_with(dir.path(), "a.pdf", "one\nGARBLED\nthree");
        let out = processor(PageSeparator::FormFeed).process(&doc).unwrap();
        assert_eq!(out.text, "one\n\x0c\n\n\x0c\nthree");
        assert_eq!(out.failed_pages(), 1);
        assert_eq!(out.pages[1].page_num, 2);
        assert!(out.pages[1].text.is_empty());
    }

    #[test]
    fn all_pages_failed_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_with(dir.path(), "a.pdf", "GARBLED\nGARBLED");
        let err = processor(PageSeparator::BlankLine).process(&doc).unwrap_err();
        assert!(matches!(err, OcrBatchError::AllPagesFailed { total: 2, .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unopenable_document_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_with(dir.path(), "a.pdf", "BROKEN");
        let err = processor(PageSeparator::BlankLine).process(&doc).unwrap_err();
        assert!(matches!(err, OcrBatchError::CorruptPdf { .. }));
    }

    #[test]
    fn missing_rasterizer_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let doc = doc_with(dir.path(), "a.pdf", "one");
        let bare = DocumentProcessor::new(Arc::new(EchoEngine), &BatchConfig::default());
        assert!(matches!(
            bare.process(&doc),
            Err(OcrBatchError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn marker_separator_labels_every_page() {
        let pages = vec![page(1, "alpha", false), page(2, "", true), page(3, "gamma", false)];
        assert_eq!(
            assemble_pages(&pages, &PageSeparator::Marker),
            "[PAGE 1]\nalpha\n\n[PAGE 2]\n\n\n[PAGE 3]\ngamma"
        );
    }

    #[test]
    fn custom_separator() {
        let pages = vec![page(1, "a", false), page(2, "b", false)];
        assert_eq!(
            assemble_pages(&pages, &PageSeparator::Custom("=====".into())),
            "a\n=====\nb"
        );
    }
}
