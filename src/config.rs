//! Configuration types for a batch OCR run.
//!
//! All run behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The config is constructed once, validated in
//! [`BatchConfigBuilder::build`], and then shared read-only by the driver,
//! the document processor and the output writer.

use crate::error::OcrBatchError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default input folder, relative to the working directory.
pub const DEFAULT_INPUT_DIR: &str = "input_files";
/// Default output folder, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output_files";
/// Default tesseract language code.
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";
/// Executable name looked up on `PATH` when no engine path is configured.
pub const DEFAULT_OCR_ENGINE: &str = "tesseract";

/// Configuration for a batch OCR run.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_ocr_batch::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .input_dir("scans")
///     .output_dir("text")
///     .ocr_language("eng+msa")
///     .dpi(200)
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_language, "eng+msa");
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Folder scanned for input documents. Default: `input_files`.
    pub input_dir: PathBuf,

    /// Folder receiving one `<stem>.txt` per document. Default: `output_files`.
    /// Created on demand.
    pub output_dir: PathBuf,

    /// Tesseract language code(s), e.g. `"eng"` or `"eng+msa"`. Default: `"eng"`.
    pub ocr_language: String,

    /// Path to the OCR engine executable. `None` looks up `tesseract` on `PATH`.
    pub ocr_engine_path: Option<PathBuf>,

    /// Tesseract page segmentation mode (`--psm`). Range: 0–13. Default: 4
    /// (single column of text of variable sizes).
    pub page_segmentation_mode: u8,

    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 6000.
    ///
    /// Caps oversized pages (posters, plans) independently of DPI.
    pub max_rendered_pixels: u32,

    /// Directory containing libpdfium, or the library file itself.
    /// `None` binds to the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// How pages are joined in the extracted text. Default: blank line.
    pub page_separator: PageSeparator,

    /// Split each document into files of at most this many pages.
    /// `None` (default) writes a single `<stem>.txt`.
    pub pages_per_chunk: Option<usize>,

    /// Skip documents whose `<stem>.txt` already exists. Default: false.
    pub skip_existing: bool,

    /// Receives per-file and per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
            ocr_engine_path: None,
            page_segmentation_mode: 4,
            dpi: 300,
            max_rendered_pixels: 6000,
            pdfium_lib_path: None,
            page_separator: PageSeparator::default(),
            pages_per_chunk: None,
            skip_existing: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_engine_path", &self.ocr_engine_path)
            .field("page_segmentation_mode", &self.page_segmentation_mode)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("page_separator", &self.page_separator)
            .field("pages_per_chunk", &self.pages_per_chunk)
            .field("skip_existing", &self.skip_existing)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// The engine executable to invoke: the configured path or `tesseract`.
    pub fn engine_program(&self) -> PathBuf {
        self.ocr_engine_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OCR_ENGINE))
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ocr_engine_path = Some(path.into());
        self
    }

    pub fn page_segmentation_mode(mut self, psm: u8) -> Self {
        self.config.page_segmentation_mode = psm;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn pages_per_chunk(mut self, pages: Option<usize>) -> Self {
        self.config.pages_per_chunk = pages;
        self
    }

    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, OcrBatchError> {
        let c = &self.config;
        if c.ocr_language.trim().is_empty() {
            return Err(OcrBatchError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.page_segmentation_mode > 13 {
            return Err(OcrBatchError::InvalidConfig(format!(
                "Page segmentation mode must be 0–13, got {}",
                c.page_segmentation_mode
            )));
        }
        if c.pages_per_chunk == Some(0) {
            return Err(OcrBatchError::InvalidConfig(
                "Pages per chunk must be ≥ 1".into(),
            ));
        }
        if c.input_dir == c.output_dir {
            return Err(OcrBatchError::InvalidConfig(format!(
                "Input and output directory are both '{}'",
                c.input_dir.display()
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How to separate pages in the extracted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSeparator {
    /// Pages joined with a blank line: "\n\n". (default)
    #[default]
    BlankLine,
    /// Form feed on its own line: "\n\x0c\n".
    FormFeed,
    /// Every page prefixed with a `[PAGE n]` line; pages joined with a blank line.
    Marker,
    /// Custom string on its own line between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed between two consecutive pages.
    pub fn render(&self) -> String {
        match self {
            PageSeparator::BlankLine | PageSeparator::Marker => "\n\n".to_string(),
            PageSeparator::FormFeed => "\n\x0c\n".to_string(),
            PageSeparator::Custom(s) => format!("\n{}\n", s),
        }
    }

    /// Heading emitted at the start of page `page_num`, if any.
    pub fn page_header(&self, page_num: usize) -> Option<String> {
        match self {
            PageSeparator::Marker => Some(format!("[PAGE {}]\n", page_num)),
            _ => None,
        }
    }
}
