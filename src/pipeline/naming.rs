//! Deterministic output paths: `{stem}_{page:03}.{ext}`.
//!
//! Two sources with the same stem in different folders map to the same
//! names; nothing here detects that collision.

use crate::config::OutputFormat;
use std::path::{Path, PathBuf};

/// Output image path for the 0-based `page_index` of `pdf_path`.
///
/// The page number in the file name is 1-based and zero-padded to at least
/// three digits, so page index 0 becomes `_001` and index 1233 becomes `_1234`.
pub fn output_path(
    pdf_path: &Path,
    page_index: usize,
    output_folder: &Path,
    format: OutputFormat,
) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    output_folder.join(format!(
        "{}_{:03}.{}",
        stem,
        page_index + 1,
        format.extension()
    ))
}
