//! Error types for the pdf2img library.
//!
//! Three error types reflect three distinct blast radii:
//!
//! * [`Pdf2ImgError`] — **Fatal**: the batch cannot start at all (unreadable
//!   settings file, invalid quality or crop bounds, pdfium not bindable,
//!   output folder not creatable). Returned as `Err` before any document is
//!   touched.
//!
//! * [`OpenError`] — **Document-terminal**: one PDF could not be opened
//!   (corrupt, password protected, unreadable). Recorded as a `failed`
//!   [`crate::output::ConversionResult`]; the batch moves on.
//!
//! * [`PageError`] — **Page-isolated**: a single page failed to render, crop
//!   or encode. Stored inside the document's result; the remaining pages are
//!   still converted.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Settings errors ───────────────────────────────────────────────────
    /// The settings file exists but could not be read.
    #[error("Failed to read settings file '{path}': {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON or has a wrongly typed key.
    #[error("Failed to parse settings file '{path}': {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Filesystem errors ─────────────────────────────────────────────────
    /// The output folder could not be created.
    #[error("Failed to create output folder '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the executable, install it system-wide, or\n\
set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases"
    )]
    PdfiumBindingFailed(String),
}

/// Why a document could not be opened. Terminal for that document only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenError {
    /// PDF header/trailer/xref is malformed and cannot be parsed.
    #[error("Corrupt PDF: {detail}")]
    Corrupt { detail: String },

    /// The document needs a password to be opened.
    #[error("Password protected")]
    PasswordProtected,

    /// Any other open-time failure; the message is the underlying cause.
    #[error("{detail}")]
    Failed { detail: String },
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::ConversionResult`] when a page fails.
/// Page numbers are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The renderer could not rasterise the page.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Crop percentages collapse to a zero-area rectangle on this raster.
    #[error("Page {page}: crop region is empty on a {width}x{height} px raster")]
    EmptyCrop {
        page: usize,
        width: u32,
        height: u32,
    },

    /// Encoding or writing the output image failed.
    #[error("Page {page}: failed to write '{path}': {detail}")]
    EncodeFailed {
        page: usize,
        path: PathBuf,
        detail: String,
    },
}

impl PageError {
    /// The 1-indexed page this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::EmptyCrop { page, .. }
            | PageError::EncodeFailed { page, .. } => *page,
        }
    }
}
