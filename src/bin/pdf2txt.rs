//! CLI binary for pdf-ocr-batch.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig`, runs the batch and prints the summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_ocr_batch::pipeline::write;
use pdf_ocr_batch::{
    scan_input_dir, BatchConfig, BatchProgressCallback, BatchReport, BatchRunner, FileStatus,
    PageSeparator, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the files of the batch plus a log
/// line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("OCR");
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} files…"))
        ));
    }

    fn on_file_start(&self, file: &str, _index: usize, _total: usize) {
        self.bar.set_message(file.to_string());
    }

    fn on_page_complete(&self, file: &str, page_num: usize, _ok: bool) {
        self.bar.set_message(format!("{file}  page {page_num}"));
    }

    fn on_file_complete(&self, file: &str, index: usize, total: usize, failed_pages: usize) {
        let note = if failed_pages > 0 {
            red(&format!("{failed_pages} empty pages"))
        } else {
            String::new()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            file,
            note
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file: &str, index: usize, total: usize, error: &str) {
        let first_line = error.lines().next().unwrap_or(error);
        let msg = if first_line.chars().count() > 80 {
            format!("{}\u{2026}", first_line.chars().take(79).collect::<String>())
        } else {
            first_line.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            file,
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, file: &str, index: usize, total: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            dim("-"),
            index,
            total,
            file,
            dim("exists, skipped")
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total_files: usize, _succeeded: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert ./input_files/*.pdf into ./output_files/*.txt
  pdf2txt

  # Explicit folders and language
  pdf2txt --input-dir scans --output-dir text --lang eng+msa

  # Page markers and 10-page chunk files
  pdf2txt --separator marker --pages-per-chunk 10

  # Only convert files without output yet
  pdf2txt --skip-existing

  # List what would be converted
  pdf2txt --dry-run

  # Machine-readable report
  pdf2txt --json > report.json

ENVIRONMENT VARIABLES:
  PDF2TXT_INPUT_DIR       Input folder (default: input_files)
  PDF2TXT_OUTPUT_DIR      Output folder (default: output_files)
  PDF2TXT_LANG            Tesseract language(s) (default: eng)
  TESSERACT_PATH          Path to the tesseract executable
  PDFIUM_LIB_PATH         Directory containing libpdfium, or the library file
  RUST_LOG                Override log filter (e.g. pdf_ocr_batch=debug)

EXIT STATUS:
  0  the batch ran (individual files may have failed; see the summary)
  1  input/output folder inaccessible or OCR engine/pdfium unavailable
"#;

/// Batch-convert PDF files to plain text with tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Batch-convert a folder of PDF files to plain text with tesseract OCR",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the PDF files to convert.
    #[arg(short, long, env = "PDF2TXT_INPUT_DIR", default_value = "input_files")]
    input_dir: PathBuf,

    /// Folder receiving one <stem>.txt per input PDF (created if missing).
    #[arg(short, long, env = "PDF2TXT_OUTPUT_DIR", default_value = "output_files")]
    output_dir: PathBuf,

    /// Tesseract language code(s), e.g. eng or eng+msa.
    #[arg(short = 'l', long = "lang", env = "PDF2TXT_LANG", default_value = "eng")]
    ocr_language: String,

    /// Path to the tesseract executable (default: tesseract on PATH).
    #[arg(long, env = "TESSERACT_PATH")]
    ocr_engine_path: Option<PathBuf>,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "PDF2TXT_PSM", default_value_t = 4,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: u8,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDF2TXT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Cap on the longest edge of a rendered page, in pixels.
    #[arg(long, env = "PDF2TXT_MAX_PIXELS", default_value_t = 6000)]
    max_pixels: u32,

    /// Directory containing libpdfium, or the library file itself.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Page separator: blank, formfeed, marker, or a custom string.
    #[arg(long, env = "PDF2TXT_SEPARATOR", default_value = "blank")]
    separator: String,

    /// Write each document as files of at most N pages (<stem>_p001-010.txt).
    #[arg(long, env = "PDF2TXT_PAGES_PER_CHUNK",
          value_parser = clap::value_parser!(u64).range(1..))]
    pages_per_chunk: Option<u64>,

    /// Skip documents whose <stem>.txt already exists.
    #[arg(long, env = "PDF2TXT_SKIP_EXISTING")]
    skip_existing: bool,

    /// List the documents that would be converted, then exit.
    #[arg(long)]
    dry_run: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let documents = scan_input_dir(&cli.input_dir)
            .await
            .context("Cannot scan input directory")?;
        for doc in &documents {
            println!(
                "{}  →  {}",
                doc.path.display(),
                dry_run_target(&cli.output_dir, &doc.stem, cli.pages_per_chunk)
            );
        }
        if !cli.quiet {
            eprintln!("{} documents would be converted", documents.len());
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run batch ────────────────────────────────────────────────────────
    let report = BatchRunner::from_config(config)
        .run()
        .await
        .context("Batch aborted")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    }
    if !cli.quiet {
        print_summary(&report, show_progress);
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output_dir)
        .ocr_language(cli.ocr_language.trim())
        .page_segmentation_mode(cli.psm)
        .dpi(cli.dpi)
        .max_rendered_pixels(cli.max_pixels)
        .page_separator(parse_separator(&cli.separator))
        .pages_per_chunk(cli.pages_per_chunk.map(|n| n as usize))
        .skip_existing(cli.skip_existing);

    if let Some(ref path) = cli.ocr_engine_path {
        builder = builder.ocr_engine_path(path);
    }
    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Output naming shown by `--dry-run`; the page count is unknown until render.
fn dry_run_target(output_dir: &Path, stem: &str, pages_per_chunk: Option<u64>) -> String {
    match pages_per_chunk {
        Some(n) => format!(
            "{} … ({n} pages per file)",
            write::chunk_path(output_dir, stem, 1, n as usize).display()
        ),
        None => write::output_path(output_dir, stem).display().to_string(),
    }
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "blank" | "none" => PageSeparator::BlankLine,
        "formfeed" | "ff" => PageSeparator::FormFeed,
        "marker" | "page" => PageSeparator::Marker,
        _ => PageSeparator::Custom(s.to_string()),
    }
}

fn print_summary(report: &BatchReport, show_progress: bool) {
    // Without the bar nothing has listed the failures yet.
    if !show_progress {
        for file in &report.files {
            if let FileStatus::Failed { ref error } = file.status {
                eprintln!("{} {}: {}", red("✗"), file.input.display(), error);
            }
        }
    }

    let mark = if report.failed == 0 {
        green("✔")
    } else if report.succeeded == 0 && report.total > 0 {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{}  {}  {}",
        mark,
        bold(&report.summary_line()),
        dim(&format!("{}ms", report.total_duration_ms))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_names() {
        assert_eq!(parse_separator("blank"), PageSeparator::BlankLine);
        assert_eq!(parse_separator("FormFeed"), PageSeparator::FormFeed);
        assert_eq!(parse_separator("marker"), PageSeparator::Marker);
        assert_eq!(
            parse_separator("*****"),
            PageSeparator::Custom("*****".into())
        );
    }

    #[test]
    fn dry_run_target_follows_chunking() {
        let out = Path::new("out");
        assert_eq!(
            dry_run_target(out, "book", None),
            Path::new("out").join("book.txt").display().to_string()
        );
        let chunked = dry_run_target(out, "book", Some(10));
        assert!(chunked.contains("book_p001-010.txt"), "{chunked}");
        assert!(chunked.ends_with("(10 pages per file)"), "{chunked}");
    }

    #[test]
    fn cli_defaults_map_to_config_defaults() {
        let cli = Cli::parse_from(["pdf2txt"]);
        let config = build_config(&cli, None).unwrap();
        let defaults = BatchConfig::default();
        assert_eq!(config.input_dir, defaults.input_dir);
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.dpi, 300);
        assert!(config.ocr_engine_path.is_none());
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "pdf2txt",
            "--input-dir",
            "scans",
            "--lang",
            "eng+msa",
            "--ocr-engine-path",
            "/usr/local/bin/tesseract",
            "--pages-per-chunk",
            "10",
            "--separator",
            "ff",
        ]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("scans"));
        assert_eq!(config.ocr_language, "eng+msa");
        assert_eq!(
            config.engine_program(),
            PathBuf::from("/usr/local/bin/tesseract")
        );
        assert_eq!(config.pages_per_chunk, Some(10));
        assert_eq!(config.page_separator, PageSeparator::FormFeed);
    }
}
