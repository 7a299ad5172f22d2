//! PDF rasterisation: render each page to a PNG [`PageImage`] via pdfium.
//!
//! The [`Rasterizer`] trait is the seam between the document processor and
//! the rendering backend. [`PdfiumRasterizer`] is the production backend;
//! tests substitute their own.
//!
//! Pages are handed to the caller one at a time as they are rendered, so only
//! a single page image is alive at once regardless of document length.
//! Everything here is blocking; the driver calls it from `spawn_blocking`.

use crate::config::BatchConfig;
use crate::error::{OcrBatchError, PageError};
use crate::pipeline::{encode, input};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One rasterised page, ready for the OCR engine.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

/// Renders a document into an ordered sequence of page images.
pub trait Rasterizer: Send + Sync {
    /// Verify the backend is usable before a batch starts.
    fn check(&self) -> Result<(), OcrBatchError> {
        Ok(())
    }

    /// Render every page of `path` in order, calling `visit` once per page.
    ///
    /// A page that fails to render is reported to `visit` as a [`PageError`]
    /// and rendering continues. Returns the document's page count.
    ///
    /// # Errors
    /// Fails only when the document as a whole cannot be opened.
    fn render_pages(
        &self,
        path: &Path,
        visit: &mut dyn FnMut(Result<PageImage, PageError>),
    ) -> Result<usize, OcrBatchError>;
}

/// Rasteriser backed by the pdfium library.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    lib_path: Option<PathBuf>,
    dpi: u32,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            lib_path: config.pdfium_lib_path.clone(),
            dpi: config.dpi,
            max_pixels: config.max_rendered_pixels,
        }
    }

    fn bind(&self) -> Result<Pdfium, OcrBatchError> {
        let bindings = match &self.lib_path {
            Some(p) if p.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(p))
            }
            Some(p) => Pdfium::bind_to_library(p),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| OcrBatchError::PdfiumBindingFailed(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn check(&self) -> Result<(), OcrBatchError> {
        self.bind().map(|_| ())
    }

    fn render_pages(
        &self,
        path: &Path,
        visit: &mut dyn FnMut(Result<PageImage, PageError>),
    ) -> Result<usize, OcrBatchError> {
        input::check_pdf_magic(path)?;
        let pdfium = self.bind()?;

        let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                OcrBatchError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            } else {
                OcrBatchError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} ({} pages)", path.display(), total_pages);

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(self.dpi as f32 / 72.0)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        for (idx, page) in pages.iter().enumerate() {
            let page_num = idx + 1;
            let rendered = page
                .render_with_config(&render_config)
                .map_err(|e| PageError::RenderFailed {
                    page: page_num,
                    detail: format!("{:?}", e),
                })
                .and_then(|bitmap| {
                    let image = bitmap.as_image();
                    let png = encode::encode_png(&image).map_err(|e| PageError::RenderFailed {
                        page: page_num,
                        detail: format!("PNG encoding failed: {}", e),
                    })?;
                    debug!(
                        "Rendered page {} → {}x{} px",
                        page_num,
                        image.width(),
                        image.height()
                    );
                    Ok(PageImage {
                        page_num,
                        width: image.width(),
                        height: image.height(),
                        png,
                    })
                });
            visit(rendered);
        }

        Ok(total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterizer_takes_settings_from_config() {
        let config = BatchConfig::builder()
            .dpi(150)
            .max_rendered_pixels(2000)
            .pdfium_lib_path("/opt/pdfium/lib")
            .build()
            .unwrap();
        let r = PdfiumRasterizer::new(&config);
        assert_eq!(r.dpi, 150);
        assert_eq!(r.max_pixels, 2000);
        assert_eq!(r.lib_path.as_deref(), Some(Path::new("/opt/pdfium/lib")));
    }

    #[test]
    fn non_pdf_is_rejected_before_binding() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake.pdf");
        std::fs::write(&fake, b"GIF89a....").unwrap();

        // The magic check runs first, so this holds even without libpdfium.
        let r = PdfiumRasterizer::new(&BatchConfig::default());
        let err = r.render_pages(&fake, &mut |_| {}).unwrap_err();
        assert!(matches!(err, OcrBatchError::NotAPdf { .. }));
    }
}
