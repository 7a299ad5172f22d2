//! Output writing: persist extracted text as `<stem>.txt` files.
//!
//! Every write goes to a temporary sibling first and is then renamed over the
//! target, so an interrupted run leaves either the previous artifact or the
//! new one, never a truncated file.

use crate::config::PageSeparator;
use crate::error::OcrBatchError;
use crate::output::PageResult;
use crate::pipeline::postprocess::ensure_final_newline;
use crate::process::assemble_pages;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Written in place of an empty document.
pub const EMPTY_PLACEHOLDER: &str = "(No text extracted.)";

/// Path of the single output file for `stem`.
pub fn output_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{stem}.txt"))
}

/// Path of the chunk file covering pages `first..=last`.
pub fn chunk_path(output_dir: &Path, stem: &str, first: usize, last: usize) -> PathBuf {
    output_dir.join(format!("{stem}_p{first:03}-{last:03}.txt"))
}

/// The output already written for `stem`, if any: `<stem>.txt`, or its first
/// chunk file when `chunked`.
pub async fn existing_output(output_dir: &Path, stem: &str, chunked: bool) -> Option<PathBuf> {
    if !chunked {
        let path = output_path(output_dir, stem);
        return match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        };
    }

    let prefix = format!("{stem}_p001-");
    let mut entries = tokio::fs::read_dir(output_dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let is_first_chunk = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".txt"))
            .is_some_and(|last| !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()));
        if is_first_chunk {
            return Some(entry.path());
        }
    }
    None
}

/// Write `text` to `<output_dir>/<stem>.txt`, overwriting any existing file.
pub async fn write_text(
    output_dir: &Path,
    stem: &str,
    text: &str,
) -> Result<PathBuf, OcrBatchError> {
    let path = output_path(output_dir, stem);
    write_atomic(&path, text).await?;
    Ok(path)
}

/// Write a document as several files of at most `pages_per_chunk` pages each.
///
/// Returns the written paths in page order.
pub async fn write_chunks(
    output_dir: &Path,
    stem: &str,
    pages: &[PageResult],
    pages_per_chunk: usize,
    separator: &PageSeparator,
) -> Result<Vec<PathBuf>, OcrBatchError> {
    let mut written = Vec::new();
    for chunk in pages.chunks(pages_per_chunk.max(1)) {
        let (Some(first), Some(last)) = (chunk.first(), chunk.last()) else {
            continue;
        };
        let path = chunk_path(output_dir, stem, first.page_num, last.page_num);
        write_atomic(&path, &assemble_pages(chunk, separator)).await?;
        written.push(path);
    }
    Ok(written)
}

/// Create the parent directory, write to `<path>.tmp`, rename into place.
async fn write_atomic(path: &Path, text: &str) -> Result<(), OcrBatchError> {
    let write_failed = |e: std::io::Error| OcrBatchError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let body = if text.trim().is_empty() {
        ensure_final_newline(EMPTY_PLACEHOLDER)
    } else {
        ensure_final_newline(text)
    };

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, body.as_bytes())
        .await
        .map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }

    debug!("Wrote {} ({} bytes)", path.display(), body.len());
    Ok(())
}
