//! # pdf2img
//!
//! Batch-convert a folder of PDF documents into per-page JPEG or PNG images.
//!
//! Runs are unattended and repeatable: output names are deterministic,
//! documents and pages that already have an image on disk are left alone,
//! and one broken page or one broken document never stops the rest of the
//! batch unless `fail_fast` asks for it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input/*.pdf  (sorted by name)
//!  │
//!  ├─ 1. Skip     page 1 image already present? → skipped
//!  ├─ 2. Open     pdfium; corrupt / password protected → failed
//!  ├─ 3. Render   each page at `dpi`, opaque, rgb or gray
//!  ├─ 4. Crop     optional percentage window
//!  ├─ 5. Encode   {stem}_{page:03}.jpg|png in output/
//!  └─ 6. Classify success / partial / failed, folded into a BatchResult
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert_batch, load_settings, summary, PdfiumBackend};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = load_settings(Path::new("settings.json"))?;
//!     let backend = PdfiumBackend::bind(None)?;
//!     let batch = convert_batch(&backend, &settings)?;
//!     print!("{}", summary::format_summary(&batch));
//!     std::process::exit(summary::exit_code(&batch).into());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2img = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod summary;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    load_settings, parse_settings, Colorspace, CropSettings, OutputFormat, Settings,
    SettingsBuilder,
};
pub use convert::{
    convert_batch, convert_batch_with_progress, convert_document, convert_document_with_progress,
    find_pdfs,
};
pub use error::{OpenError, PageError, Pdf2ImgError};
pub use output::{BatchResult, ConversionResult, ConversionStatus, PageOutcome};
pub use pipeline::render::{PdfBackend, PdfDocumentHandle, PdfiumBackend};
pub use progress::{ConversionProgressCallback, NoProgress};
