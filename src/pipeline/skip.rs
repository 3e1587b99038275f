//! Document-level skip heuristic, evaluated before a PDF is opened.
//!
//! Only page 1's output is checked, so a document whose earlier run stopped
//! after page 1 is reported as already done. Later pages are not inspected.

use crate::config::Settings;
use crate::output::display_name;
use crate::pipeline::naming::output_path;
use std::path::Path;
use tracing::info;

/// True when `pdf_path` can be bypassed without opening it.
pub fn should_skip_document(pdf_path: &Path, settings: &Settings) -> bool {
    if settings.overwrite || !settings.skip_if_exists {
        return false;
    }

    let first_page = output_path(pdf_path, 0, &settings.output_folder, settings.format);
    if first_page.exists() {
        info!("Skipping (output exists): {}", display_name(pdf_path));
        return true;
    }

    false
}
