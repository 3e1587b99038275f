//! Result types produced by the converters.
//!
//! Failures below the batch level are values, not errors: a page resolves to
//! a [`PageOutcome`], a document resolves to a [`ConversionResult`] whose
//! [`ConversionStatus`] is computed by one total classification function, and
//! the batch accumulates them in a [`BatchResult`].

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page image is at `path`, freshly written or kept from an earlier run.
    Converted { path: PathBuf },
    /// The page was not produced; the document carries on with the next page.
    Failed(PageError),
}

/// Document-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Success,
    Partial,
    Failed,
    Skipped,
}

impl ConversionStatus {
    /// Classify a document whose page loop ran to completion.
    ///
    /// No failed page → `Success` (including a zero-page document);
    /// some converted and some failed → `Partial`; nothing converted → `Failed`.
    pub fn classify(pages_converted: usize, pages_failed: usize) -> Self {
        if pages_failed == 0 {
            ConversionStatus::Success
        } else if pages_converted > 0 {
            ConversionStatus::Partial
        } else {
            ConversionStatus::Failed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConversionStatus::Success => "success",
            ConversionStatus::Partial => "partial",
            ConversionStatus::Failed => "failed",
            ConversionStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of converting one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Source PDF path.
    pub pdf_path: PathBuf,
    pub status: ConversionStatus,
    /// Page count reported by the document; 0 when it was never opened.
    pub pages_total: usize,
    pub pages_converted: usize,
    pub pages_failed: usize,
    /// One-line reason for `failed` documents.
    pub error_message: Option<String>,
    /// Page images, in page order, including pre-existing ones that were kept.
    pub output_files: Vec<PathBuf>,
    /// Per-page failures, in page order.
    pub page_errors: Vec<PageError>,
}

impl ConversionResult {
    /// A fresh result for `pdf_path`, before any page is processed.
    pub fn new(pdf_path: impl Into<PathBuf>) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            status: ConversionStatus::Success,
            pages_total: 0,
            pages_converted: 0,
            pages_failed: 0,
            error_message: None,
            output_files: Vec::new(),
            page_errors: Vec::new(),
        }
    }

    pub(crate) fn skipped(pdf_path: impl Into<PathBuf>) -> Self {
        Self {
            status: ConversionStatus::Skipped,
            ..Self::new(pdf_path)
        }
    }

    pub(crate) fn failed(pdf_path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            status: ConversionStatus::Failed,
            error_message: Some(message.into()),
            ..Self::new(pdf_path)
        }
    }

    /// Fold one page outcome into the running counts.
    pub(crate) fn record(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Converted { path, .. } => {
                self.pages_converted += 1;
                self.output_files.push(path);
            }
            PageOutcome::Failed(err) => {
                self.pages_failed += 1;
                self.page_errors.push(err);
            }
        }
    }

    /// Source file name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        display_name(&self.pdf_path)
    }
}

/// File name of `path` for logs and summaries, falling back to the full path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Accumulated outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub total_files: usize,
    pub success_count: usize,
    pub partial_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    /// Per-document results in processing order.
    pub results: Vec<ConversionResult>,
}

impl BatchResult {
    /// Append a document's result and bump the matching counter.
    pub fn add(&mut self, result: ConversionResult) {
        self.total_files += 1;
        match result.status {
            ConversionStatus::Success => self.success_count += 1,
            ConversionStatus::Partial => self.partial_count += 1,
            ConversionStatus::Failed => self.failed_count += 1,
            ConversionStatus::Skipped => self.skipped_count += 1,
        }
        self.results.push(result);
    }

    /// Results whose status is `failed`, in processing order.
    pub fn failed(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results
            .iter()
            .filter(|r| r.status == ConversionStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}
