//! OCR engine interface and the `tesseract` CLI implementation.
//!
//! The engine contract is deliberately narrow: one page image and a language
//! code in, UTF-8 text or a [`PageError`] out. The processor never sees how
//! the engine is run, so tests can script it and other engines can be
//! dropped in without touching the pipeline.

use crate::config::BatchConfig;
use crate::error::{OcrBatchError, PageError};
use crate::pipeline::render::PageImage;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Output};
use tracing::{debug, instrument};

/// A synchronous OCR engine.
pub trait OcrEngine: Send + Sync {
    /// Verify the engine can be invoked before a batch starts.
    fn check(&self) -> Result<(), OcrBatchError> {
        Ok(())
    }

    /// Recognise the text on one page.
    fn recognize(&self, page: &PageImage, language: &str) -> Result<String, PageError>;
}

/// OCR engine wrapping the `tesseract` CLI tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
    page_segmentation_mode: u8,
}

impl TesseractEngine {
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            program: config.engine_program(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Arguments following the input path.
    fn args(&self, language: &str) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
            "--oem".to_string(),
            "3".to_string(),
            "-c".to_string(),
            "preserve_interword_spaces=1".to_string(),
        ]
    }
}

impl OcrEngine for TesseractEngine {
    fn check(&self) -> Result<(), OcrBatchError> {
        let unavailable = |detail: String| OcrBatchError::EngineUnavailable {
            path: self.program.clone(),
            detail,
        };
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(e.to_string()))?;
        if !output.status.success() {
            return Err(unavailable(command_failure(&output)));
        }
        let version = String::from_utf8_lossy(&output.stdout);
        debug!(
            "OCR engine: {}",
            version.lines().next().unwrap_or("tesseract")
        );
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(page = page.page_num))]
    fn recognize(&self, page: &PageImage, language: &str) -> Result<String, PageError> {
        let failed = |detail: String| PageError::RecognitionFailed {
            page: page.page_num,
            detail,
        };

        // Write the page to a temporary file.
        let tmpdir = tempfile::TempDir::with_prefix("tesseract")
            .map_err(|e| failed(format!("cannot create temp dir: {}", e)))?;
        let input_path = tmpdir.path().join("page.png");
        let mut input_file = std::fs::File::create(&input_path)
            .map_err(|e| failed(format!("cannot create tesseract input file: {}", e)))?;
        input_file
            .write_all(&page.png)
            .and_then(|_| input_file.flush())
            .map_err(|e| failed(format!("cannot write tesseract input file: {}", e)))?;

        let output = Command::new(&self.program)
            .arg(&input_path)
            .args(self.args(language))
            .output()
            .map_err(|e| failed(format!("cannot run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            return Err(failed(command_failure(&output)));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Recognised {} chars", text.len());
        Ok(text)
    }
}

/// Describe a failed command from its exit status and stderr.
fn command_failure(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let status = match output.status.code() {
        Some(code) => format!("exited with code {}", code),
        None => "killed by signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr)
    }
}
