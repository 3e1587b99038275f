//! PDF rasterisation behind a small capability boundary.
//!
//! The converters only need four things from a PDF engine: open a file,
//! report the page count, report encryption, and render one page to pixels.
//! [`PdfBackend`] and [`PdfDocumentHandle`] capture exactly that, so the skip
//! policy, classification and batch logic run unchanged against pdfium in
//! production and against an in-memory fake in tests.
//!
//! A document is closed by dropping its handle.

use crate::config::Colorspace;
use crate::error::{OpenError, PageError, Pdf2ImgError};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Env var naming an existing pdfium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Opens documents.
pub trait PdfBackend {
    /// Open `path`. The returned handle may borrow the backend.
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PdfDocumentHandle + 'a>, OpenError>;
}

/// One open document. Dropping it closes the document.
pub trait PdfDocumentHandle {
    fn page_count(&self) -> usize;

    /// True when the document is password protected and was not unlocked.
    fn is_encrypted(&self) -> bool;

    /// Render the 0-based page `index` at `dpi` onto an opaque white
    /// background, returning an `Rgb8` or `Luma8` raster per `colorspace`.
    fn render_page(
        &self,
        index: usize,
        dpi: u32,
        colorspace: Colorspace,
    ) -> Result<DynamicImage, PageError>;
}

/// Drop any alpha channel and convert to the requested colour model.
pub fn flatten(image: DynamicImage, colorspace: Colorspace) -> DynamicImage {
    match colorspace {
        Colorspace::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
        Colorspace::Gray => DynamicImage::ImageLuma8(image.to_luma8()),
    }
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// [`PdfBackend`] bound to a pdfium shared library via `pdfium-render`.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Bind to pdfium.
    ///
    /// Resolution order: `library` (a library file or the directory holding
    /// it), then `PDFIUM_LIB_PATH`, then the current directory, then the
    /// system library search path.
    pub fn bind(library: Option<&Path>) -> Result<Self, Pdf2ImgError> {
        let explicit = library
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(Into::into));

        let bindings = match explicit {
            Some(path) => {
                let path = if path.is_dir() {
                    Pdfium::pdfium_platform_library_name_at_path(&path)
                } else {
                    path
                };
                debug!("Binding pdfium from {}", path.display());
                Pdfium::bind_to_library(&path).map_err(|e| {
                    Pdf2ImgError::PdfiumBindingFailed(format!("{}: {}", path.display(), e))
                })?
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(e.to_string()))?,
        };

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    /// The bound pdfium instance.
    pub fn pdfium(&self) -> &Pdfium {
        &self.pdfium
    }
}

impl PdfBackend for PdfiumBackend {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PdfDocumentHandle + 'a>, OpenError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(classify_open_error)?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

fn classify_open_error(err: PdfiumError) -> OpenError {
    let detail = format!("{:?}", err);
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            OpenError::PasswordProtected
        }
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError) => {
            OpenError::Corrupt { detail }
        }
        _ => OpenError::Failed { detail },
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl PdfDocumentHandle for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    // pdfium refuses to load a locked document, so an open handle is
    // always unlocked; locked files surface as `OpenError::PasswordProtected`.
    fn is_encrypted(&self) -> bool {
        false
    }

    fn render_page(
        &self,
        index: usize,
        dpi: u32,
        colorspace: Colorspace,
    ) -> Result<DynamicImage, PageError> {
        let page_num = index + 1;
        let render_failed = |detail: String| PageError::RenderFailed {
            page: page_num,
            detail,
        };

        let page_index = PdfPageIndex::try_from(index)
            .map_err(|_| render_failed(format!("page index {index} exceeds pdfium's range")))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| render_failed(format!("{:?}", e)))?;

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_clear_color(PdfColor::WHITE)
            .render_form_data(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| render_failed(format!("{:?}", e)))?;

        let image = flatten(bitmap.as_image(), colorspace);
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
