//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the rendering backend can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! skip ──▶ render ──▶ crop ──▶ encode
//!  │        (pdfium)   (%→px)   (jpg/png)
//!  └─ naming: {stem}_{page:03}.{ext}
//! ```
//!
//! 1. [`naming`] — deterministic output path per source and page
//! 2. [`skip`]   — pre-open heuristic: is page 1 already on disk?
//! 3. [`render`] — the renderer capability traits and the pdfium binding
//! 4. [`crop`]   — percentage window → pixel rectangle
//! 5. [`encode`] — JPEG/PNG encoding with an atomic rename into place
//! 6. [`page`]   — ties 1, 3, 4 and 5 together for one page

pub mod crop;
pub mod encode;
pub mod naming;
pub mod page;
pub mod render;
pub mod skip;
