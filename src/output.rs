//! Result types produced by the processor and the batch driver.

use crate::error::PageError;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of recognising one page.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cleaned page text; empty when `error` is set.
    pub text: String,
    /// Wall-clock time spent in the OCR engine for this page.
    pub duration_ms: u64,
    /// Set when the page could not be rendered or recognised.
    pub error: Option<PageError>,
}

impl PageResult {
    /// Whether the page contributed recognised text.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The text extracted from one input document.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Per-page results, in page order.
    pub pages: Vec<PageResult>,
    /// All page texts joined by the configured separator.
    pub text: String,
}

impl ExtractedText {
    /// Number of pages whose slot was replaced by an empty segment.
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_ok()).count()
    }

    /// Errors of the empty-substituted pages, in page order.
    pub fn page_errors(&self) -> Vec<PageError> {
        self.pages.iter().filter_map(|p| p.error.clone()).collect()
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Output written; some pages may have been empty-substituted.
    Succeeded {
        outputs: Vec<PathBuf>,
        pages: usize,
        failed_pages: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        page_errors: Vec<PageError>,
    },
    /// No output written for this file.
    Failed { error: String },
    /// `skip_existing` was set and the output already existed.
    Skipped { output: PathBuf },
}

/// Per-file entry in a [`BatchReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
    pub duration_ms: u64,
}

/// Summary of a complete batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// One entry per enumerated input, in processing order.
    pub files: Vec<FileOutcome>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl BatchReport {
    /// Append an outcome and update the counters.
    pub fn record(&mut self, outcome: FileOutcome) {
        self.total += 1;
        match outcome.status {
            FileStatus::Succeeded { .. } => self.succeeded += 1,
            FileStatus::Failed { .. } => self.failed += 1,
            FileStatus::Skipped { .. } => self.skipped += 1,
        }
        self.files.push(outcome);
    }

    /// The one-line summary printed at the end of a run.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} files: {} succeeded, {} failed",
            self.total, self.succeeded, self.failed
        );
        if self.skipped > 0 {
            line.push_str(&format!(", {} skipped", self.skipped));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: FileStatus) -> FileOutcome {
        FileOutcome {
            input: PathBuf::from("in/a.pdf"),
            status,
            duration_ms: 5,
        }
    }

    #[test]
    fn record_updates_counts() {
        let mut report = BatchReport::default();
        report.record(outcome(FileStatus::Succeeded {
            outputs: vec![PathBuf::from("out/a.txt")],
            pages: 2,
            failed_pages: 0,
            page_errors: Vec::new(),
        }));
        report.record(outcome(FileStatus::Failed {
            error: "corrupt".into(),
        }));
        report.record(outcome(FileStatus::Skipped {
            output: PathBuf::from("out/c.txt"),
        }));

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            report.summary_line(),
            "3 files: 1 succeeded, 1 failed, 1 skipped"
        );
    }

    #[test]
    fn summary_omits_zero_skipped() {
        let report = BatchReport {
            total: 2,
            succeeded: 2,
            ..Default::default()
        };
        assert_eq!(report.summary_line(), "2 files: 2 succeeded, 0 failed");
    }

    #[test]
    fn status_serialises_with_tag() {
        let json = serde_json::to_string(&outcome(FileStatus::Failed {
            error: "corrupt".into(),
        }))
        .unwrap();
        assert!(json.contains("\"status\":\"failed\""), "got: {json}");
        assert!(json.contains("\"error\":\"corrupt\""));
    }
}
