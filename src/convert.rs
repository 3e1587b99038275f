//! Document and batch conversion entry points.
//!
//! [`convert_document`] turns one PDF into page images and always returns a
//! [`ConversionResult`]: open failures, encryption and page failures all end
//! up as a status inside it. [`convert_batch`] scans the input folder in
//! file-name order, converts each document and accumulates a
//! [`BatchResult`], stopping early only for `fail_fast`.

use crate::config::Settings;
use crate::error::{OpenError, Pdf2ImgError};
use crate::output::{display_name, BatchResult, ConversionResult, ConversionStatus, PageOutcome};
use crate::pipeline::page::convert_page;
use crate::pipeline::render::PdfBackend;
use crate::pipeline::skip::should_skip_document;
use crate::progress::{ConversionProgressCallback, NoProgress};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Convert every page of one PDF.
pub fn convert_document(
    backend: &dyn PdfBackend,
    pdf_path: &Path,
    settings: &Settings,
) -> ConversionResult {
    convert_document_with_progress(backend, pdf_path, settings, &NoProgress)
}

/// [`convert_document`] with per-page progress events.
pub fn convert_document_with_progress(
    backend: &dyn PdfBackend,
    pdf_path: &Path,
    settings: &Settings,
    progress: &dyn ConversionProgressCallback,
) -> ConversionResult {
    let name = display_name(pdf_path);

    // ── Step 1: Skip check (no file opened) ──────────────────────────────
    if should_skip_document(pdf_path, settings) {
        return ConversionResult::skipped(pdf_path);
    }

    // ── Step 2: Open ─────────────────────────────────────────────────────
    let document = match backend.open(pdf_path) {
        Ok(document) => document,
        Err(OpenError::PasswordProtected) => {
            warn!("Encrypted PDF (skipping): {}", name);
            return ConversionResult::failed(pdf_path, OpenError::PasswordProtected.to_string());
        }
        Err(e @ OpenError::Corrupt { .. }) => {
            error!("Corrupt PDF: {} - {}", name, e);
            return ConversionResult::failed(pdf_path, e.to_string());
        }
        Err(e @ OpenError::Failed { .. }) => {
            error!("Failed to open: {} - {}", name, e);
            return ConversionResult::failed(pdf_path, e.to_string());
        }
    };

    // ── Step 3: Encryption check ─────────────────────────────────────────
    if document.is_encrypted() {
        warn!("Encrypted PDF (skipping): {}", name);
        return ConversionResult::failed(pdf_path, OpenError::PasswordProtected.to_string());
    }

    // ── Step 4: Page loop ────────────────────────────────────────────────
    let mut result = ConversionResult::new(pdf_path);
    result.pages_total = document.page_count();
    let pages_to_process = settings.page_limit(result.pages_total);
    debug!(
        "{}: processing {} of {} pages",
        name, pages_to_process, result.pages_total
    );

    for page_index in 0..pages_to_process {
        let outcome = convert_page(&*document, pdf_path, page_index, settings);
        match &outcome {
            PageOutcome::Converted { .. } => {
                progress.on_page_complete(page_index + 1, pages_to_process)
            }
            PageOutcome::Failed(e) => {
                error!("{} in {}", e, name);
                progress.on_page_error(pages_to_process, e);
            }
        }
        result.record(outcome);
    }

    // ── Step 5: Close ────────────────────────────────────────────────────
    drop(document);

    // ── Step 6: Classify ─────────────────────────────────────────────────
    result.status = ConversionStatus::classify(result.pages_converted, result.pages_failed);
    match result.status {
        ConversionStatus::Success => info!(
            "✓ {}: {}/{} pages",
            name, result.pages_converted, result.pages_total
        ),
        ConversionStatus::Partial => warn!(
            "⚠ {}: {}/{} pages ({} failed)",
            name, result.pages_converted, result.pages_total, result.pages_failed
        ),
        ConversionStatus::Failed => {
            result.error_message = Some("All pages failed to render".to_string());
            error!("✗ {}: All pages failed", name);
        }
        ConversionStatus::Skipped => {}
    }

    result
}

/// Convert every PDF directly under `settings.input_folder`.
///
/// A missing, unlistable or non-directory input folder, or a folder without
/// PDFs, yields an empty [`BatchResult`].
///
/// # Errors
/// Returns `Err(Pdf2ImgError)` only when the output folder cannot be
/// created; no document has been touched at that point.
pub fn convert_batch(
    backend: &dyn PdfBackend,
    settings: &Settings,
) -> Result<BatchResult, Pdf2ImgError> {
    convert_batch_with_progress(backend, settings, &NoProgress)
}

/// [`convert_batch`] with progress events.
pub fn convert_batch_with_progress(
    backend: &dyn PdfBackend,
    settings: &Settings,
    progress: &dyn ConversionProgressCallback,
) -> Result<BatchResult, Pdf2ImgError> {
    let start = Instant::now();
    let mut batch = BatchResult::default();

    // ── Step 1: Validate input folder ────────────────────────────────────
    if !settings.input_folder.is_dir() {
        error!(
            "Input folder not found or not a directory: {}",
            settings.input_folder.display()
        );
        return Ok(batch);
    }

    // ── Step 2: Create output folder ─────────────────────────────────────
    std::fs::create_dir_all(&settings.output_folder).map_err(|source| {
        Pdf2ImgError::OutputDirFailed {
            path: settings.output_folder.clone(),
            source,
        }
    })?;

    // ── Step 3: Find PDFs ────────────────────────────────────────────────
    let pdf_files = find_pdfs(&settings.input_folder);
    if pdf_files.is_empty() {
        warn!(
            "No PDF files found in: {}",
            settings.input_folder.display()
        );
        return Ok(batch);
    }
    info!("Found {} PDF file(s)", pdf_files.len());
    progress.on_batch_start(pdf_files.len());

    // ── Step 4: Convert in order ─────────────────────────────────────────
    for (index, pdf_path) in pdf_files.iter().enumerate() {
        progress.on_document_start(pdf_path, index);
        let result = convert_document_with_progress(backend, pdf_path, settings, progress);
        progress.on_document_complete(&result);

        let stop = settings.fail_fast && result.status == ConversionStatus::Failed;
        batch.add(result);
        if stop {
            error!("fail_fast enabled. Stopping.");
            break;
        }
    }

    info!(
        "Batch complete: {} file(s) in {}ms",
        batch.total_files,
        start.elapsed().as_millis()
    );
    Ok(batch)
}

/// Regular files directly under `folder` with a `.pdf` extension (any
/// case), sorted by file name.
///
/// A folder that cannot be listed matches nothing; the failure is logged.
pub fn find_pdfs(folder: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list input folder {}: {}", folder.display(), e);
            return Vec::new();
        }
    };

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", folder.display(), e);
                continue;
            }
        };
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    pdfs
}
