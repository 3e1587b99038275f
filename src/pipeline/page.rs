//! Single-page conversion: render → optional crop → encode → write.

use crate::config::Settings;
use crate::error::PageError;
use crate::output::PageOutcome;
use crate::pipeline::crop::compute_bounds;
use crate::pipeline::encode::save_image;
use crate::pipeline::naming::output_path;
use crate::pipeline::render::PdfDocumentHandle;
use std::path::Path;
use tracing::debug;

/// Convert the 0-based `page_index` of an open document.
///
/// An existing output file is kept as-is unless `overwrite` is set; this
/// per-page check is what lets an interrupted run resume where it stopped.
/// Every failure is returned as [`PageOutcome::Failed`] and never stops the
/// caller's page loop.
pub fn convert_page(
    document: &dyn PdfDocumentHandle,
    pdf_path: &Path,
    page_index: usize,
    settings: &Settings,
) -> PageOutcome {
    let path = output_path(
        pdf_path,
        page_index,
        &settings.output_folder,
        settings.format,
    );

    if path.exists() && !settings.overwrite {
        debug!("Skipping existing: {}", path.display());
        return PageOutcome::Converted { path };
    }

    let page = page_index + 1;
    let image = match document.render_page(page_index, settings.dpi, settings.colorspace) {
        Ok(image) => image,
        Err(e) => return PageOutcome::Failed(e),
    };

    let image = if settings.crop.enabled {
        let Some(bounds) = compute_bounds(image.width(), image.height(), &settings.crop) else {
            return PageOutcome::Failed(PageError::EmptyCrop {
                page,
                width: image.width(),
                height: image.height(),
            });
        };
        debug!(
            "Cropped: ({},{}) to ({},{})",
            bounds.x0, bounds.y0, bounds.x1, bounds.y1
        );
        bounds.apply(&image)
    } else {
        image
    };

    if let Err(e) = save_image(&image, &path, settings.format, settings.jpg_quality) {
        return PageOutcome::Failed(PageError::EncodeFailed {
            page,
            path,
            detail: e.to_string(),
        });
    }

    debug!("Converted: {}", path.display());
    PageOutcome::Converted { path }
}
