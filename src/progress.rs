//! Progress-callback trait for batch, document and page events.
//!
//! Pass a `&dyn ConversionProgressCallback` to
//! [`crate::convert::convert_batch_with_progress`] to receive events as the
//! batch walks its documents. Conversion is strictly sequential, so events
//! arrive in order from the calling thread.
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{ConversionProgressCallback, ConversionResult};
//! use std::cell::Cell;
//!
//! struct CountingCallback {
//!     documents: Cell<usize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, result: &ConversionResult) {
//!         self.documents.set(self.documents.get() + 1);
//!         eprintln!("{}: {}", result.display_name(), result.status);
//!     }
//! }
//! ```

use crate::error::PageError;
use crate::output::ConversionResult;
use std::path::Path;

/// Called by the converters as they work through a batch.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback {
    /// Called once, after the input folder was scanned.
    ///
    /// # Arguments
    /// * `total_documents` — number of PDFs that will be considered
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before the skip check of each document.
    ///
    /// # Arguments
    /// * `pdf_path` — the source document
    /// * `index`    — 0-based position in the batch
    fn on_document_start(&self, pdf_path: &Path, index: usize) {
        let _ = (pdf_path, index);
    }

    /// Called when a page is converted or an existing page image is kept.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages that will be processed in this document
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page fails; the document continues.
    fn on_page_error(&self, total_pages: usize, error: &PageError) {
        let _ = (total_pages, error);
    }

    /// Called with the final result of each document, including skipped ones.
    fn on_document_complete(&self, result: &ConversionResult) {
        let _ = result;
    }
}

/// A callback that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ConversionProgressCallback for NoProgress {}
