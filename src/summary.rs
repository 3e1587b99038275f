//! Human-readable batch summary and the process exit-status contract.

use crate::output::BatchResult;

const RULE: &str = "==================================================";

/// Render the end-of-run summary: counts per status, then one
/// `name: reason` line for every failed document.
pub fn format_summary(batch: &BatchResult) -> String {
    let mut out = format!(
        "\n{RULE}\n\
         CONVERSION SUMMARY\n\
         {RULE}\n\
         Total Files:    {}\n  \
         ✓ Success:    {}\n  \
         ⚠ Partial:    {}\n  \
         ✗ Failed:     {}\n  \
         ⊘ Skipped:    {}\n\
         {RULE}\n",
        batch.total_files,
        batch.success_count,
        batch.partial_count,
        batch.failed_count,
        batch.skipped_count,
    );

    if batch.has_failures() {
        out.push_str("\nFailed Files:\n");
        for r in batch.failed() {
            out.push_str(&format!(
                "  - {}: {}\n",
                r.display_name(),
                r.error_message.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    out
}

/// Process exit status for a finished batch: 1 when any document failed.
pub fn exit_code(batch: &BatchResult) -> u8 {
    if batch.has_failures() {
        1
    } else {
        0
    }
}
