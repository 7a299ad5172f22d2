//! Pipeline stages for batch PDF-to-text conversion.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and the rendering or OCR backend can be swapped without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ ocr ──▶ postprocess ──▶ write
//! (scan dir) (pdfium)   (PNG)   (tesseract) (cleanup)     (<stem>.txt)
//! ```
//!
//! 1. [`input`]  — list supported documents in the input directory
//! 2. [`render`] — rasterise pages one at a time; blocking, pdfium is not
//!    async-safe
//! 3. [`encode`] — PNG-encode each `DynamicImage` for the engine
//! 4. [`ocr`]    — run the OCR engine on one page
//! 5. [`postprocess`] — deterministic text cleanup of engine output
//! 6. [`write`]  — atomic per-document output files

pub mod encode;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
pub mod write;
