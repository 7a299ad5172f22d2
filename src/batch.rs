//! Batch driver: enumerate → process → write over a whole input directory.
//!
//! A [`BatchRunner`] runs exactly once (`Idle → Running → Done`). Directory
//! and engine problems found before the first file abort the run with a
//! configuration error; after that every failure is recorded against its
//! file and the loop moves on to the next one.

use crate::config::BatchConfig;
use crate::error::OcrBatchError;
use crate::output::{BatchReport, FileOutcome, FileStatus};
use crate::pipeline::input::{scan_input_dir, InputDocument};
use crate::pipeline::write;
use crate::process::DocumentProcessor;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Lifecycle of a [`BatchRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Done,
}

/// Drives one batch run over the configured input directory.
pub struct BatchRunner {
    config: Arc<BatchConfig>,
    processor: Arc<DocumentProcessor>,
    state: RunState,
}

impl BatchRunner {
    /// A runner using an explicitly built processor.
    pub fn new(config: BatchConfig, processor: DocumentProcessor) -> Self {
        Self {
            config: Arc::new(config),
            processor: Arc::new(processor),
            state: RunState::Idle,
        }
    }

    /// The production runner: pdfium rasterisation and tesseract OCR.
    pub fn from_config(config: BatchConfig) -> Self {
        let processor = DocumentProcessor::from_config(&config);
        Self::new(config, processor)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Process every supported document in the input directory.
    ///
    /// # Returns
    /// `Ok(BatchReport)` whenever the batch ran, even if individual files
    /// failed (check `report.failed`).
    ///
    /// # Errors
    /// Only configuration errors: missing/unreadable input directory,
    /// output directory that cannot be created, unusable OCR engine or
    /// rasterizer, or a second call on the same runner.
    pub async fn run(&mut self) -> Result<BatchReport, OcrBatchError> {
        if self.state != RunState::Idle {
            return Err(OcrBatchError::InvalidConfig(
                "a BatchRunner can only be run once".into(),
            ));
        }
        self.state = RunState::Running;
        let result = self.run_inner().await;
        self.state = RunState::Done;
        result
    }

    async fn run_inner(&self) -> Result<BatchReport, OcrBatchError> {
        let total_start = Instant::now();
        let config = &self.config;
        info!(
            "Starting batch: {} → {}",
            config.input_dir.display(),
            config.output_dir.display()
        );

        // ── Step 1: Enumerate inputs ─────────────────────────────────────────
        let documents = scan_input_dir(&config.input_dir).await?;

        // ── Step 2: Prepare output directory ─────────────────────────────────
        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .map_err(|e| OcrBatchError::OutputDirUnavailable {
                path: config.output_dir.clone(),
                source: e,
            })?;

        // ── Step 3: Preflight engine and rasterizers ─────────────────────────
        if !documents.is_empty() {
            let processor = Arc::clone(&self.processor);
            tokio::task::spawn_blocking(move || processor.check())
                .await
                .map_err(|e| OcrBatchError::Internal(format!("Preflight task panicked: {}", e)))??;
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(documents.len());
        }

        // ── Step 4: Process files in order ───────────────────────────────────
        let total = documents.len();
        let mut report = BatchReport::default();
        let mut seen_stems: HashSet<String> = HashSet::new();

        for (i, doc) in documents.into_iter().enumerate() {
            let index = i + 1;
            let name = doc.display_name();
            let start = Instant::now();
            let existing = if config.skip_existing {
                write::existing_output(
                    &config.output_dir,
                    &doc.stem,
                    config.pages_per_chunk.is_some(),
                )
                .await
            } else {
                None
            };

            let status = if !seen_stems.insert(doc.stem.clone()) {
                Err(OcrBatchError::DuplicateStem {
                    path: doc.path.clone(),
                    stem: doc.stem.clone(),
                })
            } else if let Some(output) = existing {
                info!("[{}/{}] {}: output exists, skipping", index, total, name);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(&name, index, total);
                }
                Ok(FileStatus::Skipped { output })
            } else {
                info!("[{}/{}] Processing {}", index, total, name);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_start(&name, index, total);
                }
                self.convert_one(&doc).await
            };

            let status = match status {
                Ok(status) => {
                    if let FileStatus::Succeeded {
                        ref outputs,
                        failed_pages,
                        ..
                    } = status
                    {
                        if failed_pages > 0 {
                            warn!(
                                "[{}/{}] {}: written with {} empty pages",
                                index, total, name, failed_pages
                            );
                        }
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_file_complete(&name, index, total, failed_pages);
                        }
                        info!("[{}/{}] Saved {}", index, total, display_paths(outputs));
                    }
                    status
                }
                Err(e) => {
                    error!("[{}/{}] Error processing {}: {}", index, total, name, e);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_file_error(&name, index, total, &e.to_string());
                    }
                    FileStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            report.record(FileOutcome {
                input: doc.path,
                status,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        report.total_duration_ms = total_start.elapsed().as_millis() as u64;
        info!("Batch complete: {}", report.summary_line());
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_complete(report.total, report.succeeded, report.failed);
        }
        Ok(report)
    }

    /// Process one document and write its output.
    async fn convert_one(&self, doc: &InputDocument) -> Result<FileStatus, OcrBatchError> {
        let processor = Arc::clone(&self.processor);
        let owned = doc.clone();
        let extracted = tokio::task::spawn_blocking(move || processor.process(&owned))
            .await
            .map_err(|e| OcrBatchError::Internal(format!("OCR task panicked: {}", e)))??;

        let config = &self.config;
        let outputs = match config.pages_per_chunk {
            Some(per_chunk) => {
                write::write_chunks(
                    &config.output_dir,
                    &doc.stem,
                    &extracted.pages,
                    per_chunk,
                    &config.page_separator,
                )
                .await?
            }
            None => vec![write::write_text(&config.output_dir, &doc.stem, &extracted.text).await?],
        };

        Ok(FileStatus::Succeeded {
            outputs,
            pages: extracted.pages.len(),
            failed_pages: extracted.failed_pages(),
            page_errors: extracted.page_errors(),
        })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run a batch with the production pdfium + tesseract pipeline.
///
/// This is the primary entry point for the library.
///
/// ```rust,no_run
/// use pdf_ocr_batch::{run_batch, BatchConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = BatchConfig::builder().input_dir("scans").build()?;
///     let report = run_batch(config).await?;
///     println!("{}", report.summary_line());
///     Ok(())
/// }
/// ```
pub async fn run_batch(config: BatchConfig) -> Result<BatchReport, OcrBatchError> {
    BatchRunner::from_config(config).run().await
}

/// Synchronous wrapper around [`run_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_batch_sync(config: BatchConfig) -> Result<BatchReport, OcrBatchError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrBatchError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run_batch(config))
}
