//! Batch and document conversion against an in-memory renderer.
//!
//! `FakeBackend` stands in for pdfium: every `.pdf` in the input folder is a
//! placeholder file whose behaviour (page count, encryption, open errors,
//! failing pages, raster size) is looked up by file name. No pdfium library
//! is needed to run these tests.

use image::{DynamicImage, GrayImage, Luma};
use pdf2img::{
    convert_batch, convert_batch_with_progress, convert_document, Colorspace,
    ConversionProgressCallback, ConversionResult, ConversionStatus, CropSettings, OpenError,
    OutputFormat, PageError, PdfBackend, PdfDocumentHandle, Settings,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Fake renderer ────────────────────────────────────────────────────────────

#[derive(Clone)]
struct FakeDoc {
    pages: usize,
    encrypted: bool,
    open_error: Option<OpenError>,
    failing_pages: HashSet<usize>,
    size: (u32, u32),
}

impl FakeDoc {
    fn pages(pages: usize) -> Self {
        Self {
            pages,
            encrypted: false,
            open_error: None,
            failing_pages: HashSet::new(),
            size: (40, 60),
        }
    }

    fn encrypted() -> Self {
        Self {
            encrypted: true,
            ..Self::pages(3)
        }
    }

    fn open_error(err: OpenError) -> Self {
        Self {
            open_error: Some(err),
            ..Self::pages(3)
        }
    }

    fn failing(mut self, page_indices: &[usize]) -> Self {
        self.failing_pages = page_indices.iter().copied().collect();
        self
    }

    fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }
}

#[derive(Default)]
struct FakeBackend {
    docs: HashMap<String, FakeDoc>,
    opened: RefCell<Vec<String>>,
    renders: Cell<usize>,
    open_handles: Cell<isize>,
    last_dpi: Cell<u32>,
}

impl FakeBackend {
    fn with(mut self, name: &str, doc: FakeDoc) -> Self {
        self.docs.insert(name.to_string(), doc);
        self
    }

    fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

struct FakeHandle<'a> {
    doc: &'a FakeDoc,
    backend: &'a FakeBackend,
}

impl PdfBackend for FakeBackend {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PdfDocumentHandle + 'a>, OpenError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.opened.borrow_mut().push(name.clone());
        let doc = self.docs.get(&name).ok_or_else(|| OpenError::Failed {
            detail: format!("no such document: {name}"),
        })?;
        if let Some(err) = &doc.open_error {
            return Err(err.clone());
        }
        self.open_handles.set(self.open_handles.get() + 1);
        Ok(Box::new(FakeHandle { doc, backend: self }))
    }
}

impl Drop for FakeHandle<'_> {
    fn drop(&mut self) {
        self.backend
            .open_handles
            .set(self.backend.open_handles.get() - 1);
    }
}

impl PdfDocumentHandle for FakeHandle<'_> {
    fn page_count(&self) -> usize {
        self.doc.pages
    }

    fn is_encrypted(&self) -> bool {
        self.doc.encrypted
    }

    fn render_page(
        &self,
        index: usize,
        dpi: u32,
        colorspace: Colorspace,
    ) -> Result<DynamicImage, PageError> {
        self.backend.renders.set(self.backend.renders.get() + 1);
        self.backend.last_dpi.set(dpi);
        if self.doc.failing_pages.contains(&index) {
            return Err(PageError::RenderFailed {
                page: index + 1,
                detail: "simulated render failure".into(),
            });
        }
        let (w, h) = self.doc.size;
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([255])));
        Ok(match colorspace {
            Colorspace::Gray => gray,
            Colorspace::Rgb => DynamicImage::ImageRgb8(gray.to_rgb8()),
        })
    }
}

// ── Workspace helpers ────────────────────────────────────────────────────────

struct Workspace {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new(pdfs: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        std::fs::create_dir_all(&input).unwrap();
        // The batch creates the output folder; single-document calls expect it.
        std::fs::create_dir_all(&output).unwrap();
        for name in pdfs {
            std::fs::write(input.join(name), b"%PDF-1.7 placeholder").unwrap();
        }
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    fn settings(&self) -> Settings {
        Settings::builder()
            .input_folder(&self.input)
            .output_folder(&self.output)
            .dpi(150)
            .build()
            .unwrap()
    }

    fn outputs(&self) -> BTreeSet<String> {
        match std::fs::read_dir(&self.output) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => BTreeSet::new(),
        }
    }

    fn seed_output(&self, name: &str) {
        std::fs::write(self.output.join(name), b"earlier run").unwrap();
    }
}

fn names(set: &[&str]) -> BTreeSet<String> {
    set.iter().map(|s| s.to_string()).collect()
}

// ── Document-level scenarios ─────────────────────────────────────────────────

#[test]
fn three_page_report_to_jpg() {
    let ws = Workspace::new(&["report.pdf"]);
    let backend = FakeBackend::default().with("report.pdf", FakeDoc::pages(3));

    let batch = convert_batch(&backend, &ws.settings()).unwrap();

    assert_eq!(batch.total_files, 1);
    assert_eq!(batch.success_count, 1);
    let r = &batch.results[0];
    assert_eq!(r.status, ConversionStatus::Success);
    assert_eq!((r.pages_total, r.pages_converted, r.pages_failed), (3, 3, 0));
    assert_eq!(r.error_message, None);
    assert_eq!(
        ws.outputs(),
        names(&["report_001.jpg", "report_002.jpg", "report_003.jpg"])
    );
    assert_eq!(
        r.output_files,
        vec![
            ws.output.join("report_001.jpg"),
            ws.output.join("report_002.jpg"),
            ws.output.join("report_003.jpg"),
        ]
    );
    assert_eq!(backend.last_dpi.get(), 150);
    assert_eq!(backend.open_handles.get(), 0, "document must be closed");

    let decoded = image::open(ws.output.join("report_002.jpg")).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 60));
}

#[test]
fn encrypted_document_fails_without_output() {
    let ws = Workspace::new(&["locked.pdf"]);
    let backend = FakeBackend::default().with("locked.pdf", FakeDoc::encrypted());

    let r = convert_document(&backend, &ws.input.join("locked.pdf"), &ws.settings());

    assert_eq!(r.status, ConversionStatus::Failed);
    assert!(r
        .error_message
        .as_deref()
        .unwrap()
        .to_lowercase()
        .contains("password"));
    assert_eq!(r.pages_total, 0);
    assert!(r.output_files.is_empty());
    assert_eq!(backend.renders.get(), 0);
    assert_eq!(backend.open_handles.get(), 0, "document must be closed");
    assert!(ws.outputs().is_empty());
}

#[test]
fn password_error_on_open_is_reported_like_encryption() {
    let ws = Workspace::new(&["locked.pdf"]);
    let backend = FakeBackend::default().with(
        "locked.pdf",
        FakeDoc::open_error(OpenError::PasswordProtected),
    );

    let r = convert_document(&backend, &ws.input.join("locked.pdf"), &ws.settings());

    assert_eq!(r.status, ConversionStatus::Failed);
    assert_eq!(r.error_message.as_deref(), Some("Password protected"));
}

#[test]
fn corrupt_and_unopenable_documents_are_distinguished() {
    let ws = Workspace::new(&["broken.pdf", "gone.pdf"]);
    let backend = FakeBackend::default()
        .with(
            "broken.pdf",
            FakeDoc::open_error(OpenError::Corrupt {
                detail: "trailer not found".into(),
            }),
        )
        .with(
            "gone.pdf",
            FakeDoc::open_error(OpenError::Failed {
                detail: "permission denied".into(),
            }),
        );

    let batch = convert_batch(&backend, &ws.settings()).unwrap();

    assert_eq!(batch.failed_count, 2);
    let broken = &batch.results[0];
    assert_eq!(broken.status, ConversionStatus::Failed);
    assert_eq!(
        broken.error_message.as_deref(),
        Some("Corrupt PDF: trailer not found")
    );
    let gone = &batch.results[1];
    assert_eq!(gone.error_message.as_deref(), Some("permission denied"));
}

#[test]
fn page_failure_is_isolated_and_document_is_partial() {
    let ws = Workspace::new(&["mixed.pdf"]);
    let backend = FakeBackend::default().with("mixed.pdf", FakeDoc::pages(4).failing(&[1]));

    let r = convert_document(&backend, &ws.input.join("mixed.pdf"), &ws.settings());

    assert_eq!(r.status, ConversionStatus::Partial);
    assert_eq!((r.pages_converted, r.pages_failed), (3, 1));
    assert_eq!(r.error_message, None);
    assert_eq!(r.page_errors.len(), 1);
    assert_eq!(r.page_errors[0].page(), 2);
    assert_eq!(backend.renders.get(), 4, "later pages still rendered");
    assert_eq!(
        ws.outputs(),
        names(&["mixed_001.jpg", "mixed_003.jpg", "mixed_004.jpg"])
    );
}

#[test]
fn all_pages_failing_fails_the_document() {
    let ws = Workspace::new(&["dead.pdf"]);
    let backend = FakeBackend::default().with("dead.pdf", FakeDoc::pages(2).failing(&[0, 1]));

    let r = convert_document(&backend, &ws.input.join("dead.pdf"), &ws.settings());

    assert_eq!(r.status, ConversionStatus::Failed);
    assert_eq!(r.error_message.as_deref(), Some("All pages failed to render"));
    assert_eq!((r.pages_total, r.pages_converted, r.pages_failed), (2, 0, 2));
}

#[test]
fn zero_page_document_is_a_trivial_success() {
    let ws = Workspace::new(&["empty.pdf"]);
    let backend = FakeBackend::default().with("empty.pdf", FakeDoc::pages(0));

    let r = convert_document(&backend, &ws.input.join("empty.pdf"), &ws.settings());

    assert_eq!(r.status, ConversionStatus::Success);
    assert_eq!((r.pages_total, r.pages_converted, r.pages_failed), (0, 0, 0));
}

#[test]
fn max_pages_limits_the_loop_but_not_the_total() {
    let ws = Workspace::new(&["long.pdf"]);
    let backend = FakeBackend::default().with("long.pdf", FakeDoc::pages(10));
    let settings = ws.settings().to_builder().max_pages_per_pdf(2).build().unwrap();

    let r = convert_document(&backend, &ws.input.join("long.pdf"), &settings);

    assert_eq!(r.status, ConversionStatus::Success);
    assert_eq!((r.pages_total, r.pages_converted), (10, 2));
    assert_eq!(ws.outputs(), names(&["long_001.jpg", "long_002.jpg"]));
}

#[test]
fn crop_is_applied_to_the_rendered_raster() {
    let ws = Workspace::new(&["crop.pdf"]);
    let backend = FakeBackend::default().with("crop.pdf", FakeDoc::pages(1).size(200, 100));
    let settings = ws
        .settings()
        .to_builder()
        .format(OutputFormat::Png)
        .colorspace(Colorspace::Gray)
        .crop(CropSettings::new(true, (10.0, 60.0), (25.0, 100.0)).unwrap())
        .build()
        .unwrap();

    let r = convert_document(&backend, &ws.input.join("crop.pdf"), &settings);

    assert_eq!(r.status, ConversionStatus::Success);
    let decoded = image::open(ws.output.join("crop_001.png")).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 75));
    assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
}

#[test]
fn crop_collapsing_to_zero_pixels_fails_the_page() {
    let ws = Workspace::new(&["tiny.pdf"]);
    let backend = FakeBackend::default().with("tiny.pdf", FakeDoc::pages(1).size(1, 1));
    let settings = ws
        .settings()
        .to_builder()
        .crop(CropSettings::new(true, (10.0, 50.0), (10.0, 50.0)).unwrap())
        .build()
        .unwrap();

    let r = convert_document(&backend, &ws.input.join("tiny.pdf"), &settings);

    assert_eq!(r.status, ConversionStatus::Failed);
    assert!(matches!(r.page_errors[0], PageError::EmptyCrop { page: 1, .. }));
    assert!(ws.outputs().is_empty());
}

// ── Skip, overwrite and resume ───────────────────────────────────────────────

#[test]
fn skip_if_exists_bypasses_the_document_without_opening_it() {
    let ws = Workspace::new(&["done.pdf"]);
    ws.seed_output("done_001.jpg");
    let backend = FakeBackend::default().with("done.pdf", FakeDoc::pages(3));

    let batch = convert_batch(&backend, &ws.settings()).unwrap();

    assert_eq!(batch.skipped_count, 1);
    assert_eq!(batch.results[0].status, ConversionStatus::Skipped);
    assert_eq!(batch.results[0].pages_total, 0);
    assert!(backend.opened().is_empty(), "skipped documents are not opened");
}

#[test]
fn interrupted_run_resumes_at_page_granularity() {
    let ws = Workspace::new(&["book.pdf"]);
    let backend = FakeBackend::default().with("book.pdf", FakeDoc::pages(5));
    // Simulate a run that stopped after page 2. Disabling the document-level
    // heuristic lets the page-level existence check do the work.
    ws.seed_output("book_001.jpg");
    ws.seed_output("book_002.jpg");
    let settings = ws.settings().to_builder().skip_if_exists(false).build().unwrap();

    let r = convert_document(&backend, &ws.input.join("book.pdf"), &settings);

    assert_eq!(r.status, ConversionStatus::Success);
    assert_eq!((r.pages_total, r.pages_converted), (5, 5));
    assert_eq!(backend.renders.get(), 3, "pages 1-2 are not re-rendered");
    assert_eq!(r.output_files.len(), 5);
    assert_eq!(
        std::fs::read(ws.output.join("book_001.jpg")).unwrap(),
        b"earlier run"
    );
    assert_eq!(
        ws.outputs(),
        names(&[
            "book_001.jpg",
            "book_002.jpg",
            "book_003.jpg",
            "book_004.jpg",
            "book_005.jpg"
        ])
    );
}

#[test]
fn page_one_heuristic_keeps_truncated_output() {
    // Documented limitation: only page 1 is checked before opening.
    let ws = Workspace::new(&["book.pdf"]);
    let backend = FakeBackend::default().with("book.pdf", FakeDoc::pages(5));
    ws.seed_output("book_001.jpg");
    ws.seed_output("book_002.jpg");

    let r = convert_document(&backend, &ws.input.join("book.pdf"), &ws.settings());

    assert_eq!(r.status, ConversionStatus::Skipped);
    assert_eq!(ws.outputs().len(), 2);
}

#[test]
fn overwrite_re_renders_existing_pages() {
    let ws = Workspace::new(&["doc.pdf"]);
    ws.seed_output("doc_001.jpg");
    let backend = FakeBackend::default().with("doc.pdf", FakeDoc::pages(2));
    let settings = ws.settings().to_builder().overwrite(true).build().unwrap();

    let r = convert_document(&backend, &ws.input.join("doc.pdf"), &settings);

    assert_eq!(r.status, ConversionStatus::Success);
    assert_eq!(backend.renders.get(), 2);
    assert_ne!(
        std::fs::read(ws.output.join("doc_001.jpg")).unwrap(),
        b"earlier run"
    );
}

#[test]
fn second_run_is_idempotent() {
    let ws = Workspace::new(&["a.pdf", "b.pdf"]);
    let backend = FakeBackend::default()
        .with("a.pdf", FakeDoc::pages(2))
        .with("b.pdf", FakeDoc::pages(3));
    let settings = ws.settings();

    let first = convert_batch(&backend, &settings).unwrap();
    assert_eq!(first.success_count, 2);
    let after_first = ws.outputs();
    let bytes_first = std::fs::read(ws.output.join("b_003.jpg")).unwrap();
    let renders_first = backend.renders.get();

    let second = convert_batch(&backend, &settings).unwrap();

    assert_eq!(second.skipped_count, 2);
    assert_eq!(ws.outputs(), after_first);
    assert_eq!(std::fs::read(ws.output.join("b_003.jpg")).unwrap(), bytes_first);
    assert_eq!(backend.renders.get(), renders_first);
}

// ── Batch-level behaviour ────────────────────────────────────────────────────

#[test]
fn fail_fast_stops_after_first_failed_document() {
    let ws = Workspace::new(&["a.pdf", "b.pdf", "c.pdf"]);
    let backend = FakeBackend::default()
        .with("a.pdf", FakeDoc::pages(1))
        .with(
            "b.pdf",
            FakeDoc::open_error(OpenError::Corrupt {
                detail: "bad".into(),
            }),
        )
        .with("c.pdf", FakeDoc::pages(1));
    let settings = ws.settings().to_builder().fail_fast(true).build().unwrap();

    let batch = convert_batch(&backend, &settings).unwrap();

    assert_eq!(batch.total_files, 2);
    assert_eq!(batch.results[0].status, ConversionStatus::Success);
    assert_eq!(batch.results[1].status, ConversionStatus::Failed);
    assert_eq!(backend.opened(), vec!["a.pdf", "b.pdf"]);
    assert!(ws.outputs().contains("a_001.jpg"), "earlier output is kept");
}

#[test]
fn without_fail_fast_the_batch_continues() {
    let ws = Workspace::new(&["a.pdf", "b.pdf", "c.pdf"]);
    let backend = FakeBackend::default()
        .with("a.pdf", FakeDoc::pages(1))
        .with("b.pdf", FakeDoc::encrypted())
        .with("c.pdf", FakeDoc::pages(1).failing(&[0]));

    let batch = convert_batch(&backend, &ws.settings()).unwrap();

    assert_eq!(batch.total_files, 3);
    assert_eq!(
        (batch.success_count, batch.failed_count),
        (1, 2)
    );
}

#[test]
fn fail_fast_ignores_partial_documents() {
    let ws = Workspace::new(&["a.pdf", "b.pdf"]);
    let backend = FakeBackend::default()
        .with("a.pdf", FakeDoc::pages(2).failing(&[0]))
        .with("b.pdf", FakeDoc::pages(1));
    let settings = ws.settings().to_builder().fail_fast(true).build().unwrap();

    let batch = convert_batch(&backend, &settings).unwrap();

    assert_eq!(batch.total_files, 2);
    assert_eq!(batch.partial_count, 1);
    assert_eq!(batch.success_count, 1);
}

#[test]
fn documents_are_processed_in_name_order() {
    let ws = Workspace::new(&["zeta.pdf", "Alpha.pdf", "beta.PDF", "notes.txt"]);
    let backend = FakeBackend::default()
        .with("zeta.pdf", FakeDoc::pages(1))
        .with("Alpha.pdf", FakeDoc::pages(1))
        .with("beta.PDF", FakeDoc::pages(1));

    let batch = convert_batch(&backend, &ws.settings()).unwrap();

    let order: Vec<_> = batch.results.iter().map(|r| r.display_name()).collect();
    assert_eq!(order, vec!["Alpha.pdf", "beta.PDF", "zeta.pdf"]);
}

#[test]
fn missing_input_folder_is_an_empty_result() {
    let ws = Workspace::new(&[]);
    let settings = ws
        .settings()
        .to_builder()
        .input_folder(ws.input.join("nope"))
        .output_folder(ws.output.join("fresh"))
        .build()
        .unwrap();

    let batch = convert_batch(&FakeBackend::default(), &settings).unwrap();

    assert_eq!(batch.total_files, 0);
    assert!(!batch.has_failures());
    assert!(
        !settings.output_folder.exists(),
        "nothing is created for a missing input"
    );
}

#[test]
fn input_path_that_is_a_file_is_an_empty_result() {
    let ws = Workspace::new(&[]);
    let not_a_folder = ws.input.join("input.pdf");
    std::fs::write(&not_a_folder, b"%PDF-1.7 placeholder").unwrap();
    let settings = ws
        .settings()
        .to_builder()
        .input_folder(&not_a_folder)
        .output_folder(ws.output.join("fresh"))
        .build()
        .unwrap();
    let backend = FakeBackend::default().with("input.pdf", FakeDoc::pages(1));

    let batch = convert_batch(&backend, &settings).unwrap();

    assert_eq!(batch.total_files, 0);
    assert!(!batch.has_failures());
    assert!(backend.opened().is_empty());
    assert!(!settings.output_folder.exists());
}

#[test]
fn empty_input_folder_still_creates_output_folder() {
    let ws = Workspace::new(&[]);
    let settings = ws
        .settings()
        .to_builder()
        .output_folder(ws.output.join("fresh"))
        .build()
        .unwrap();

    let batch = convert_batch(&FakeBackend::default(), &settings).unwrap();

    assert_eq!(batch.total_files, 0);
    assert!(settings.output_folder.is_dir());
}

#[test]
fn uncreatable_output_folder_is_fatal() {
    let ws = Workspace::new(&["a.pdf"]);
    let blocker = ws.input.join("a-file");
    std::fs::write(&blocker, b"").unwrap();
    let settings = ws
        .settings()
        .to_builder()
        .output_folder(blocker.join("out"))
        .build()
        .unwrap();
    let backend = FakeBackend::default().with("a.pdf", FakeDoc::pages(1));

    assert!(matches!(
        convert_batch(&backend, &settings),
        Err(pdf2img::Pdf2ImgError::OutputDirFailed { .. })
    ));
    assert!(backend.opened().is_empty());
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl ConversionProgressCallback for Recorder {
    fn on_batch_start(&self, total_documents: usize) {
        self.events.borrow_mut().push(format!("batch {total_documents}"));
    }

    fn on_document_start(&self, pdf_path: &Path, index: usize) {
        let name = pdf_path.file_name().unwrap().to_string_lossy().into_owned();
        self.events.borrow_mut().push(format!("start {index} {name}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        self.events
            .borrow_mut()
            .push(format!("page {page_num}/{total_pages}"));
    }

    fn on_page_error(&self, _total_pages: usize, error: &PageError) {
        self.events
            .borrow_mut()
            .push(format!("page-error {}", error.page()));
    }

    fn on_document_complete(&self, result: &ConversionResult) {
        self.events
            .borrow_mut()
            .push(format!("done {} {}", result.display_name(), result.status));
    }
}

#[test]
fn progress_events_follow_processing_order() {
    let ws = Workspace::new(&["a.pdf", "b.pdf"]);
    ws.seed_output("b_001.jpg");
    let backend = FakeBackend::default()
        .with("a.pdf", FakeDoc::pages(2).failing(&[1]))
        .with("b.pdf", FakeDoc::pages(1));
    let recorder = Recorder::default();

    convert_batch_with_progress(&backend, &ws.settings(), &recorder).unwrap();

    assert_eq!(
        *recorder.events.borrow(),
        vec![
            "batch 2",
            "start 0 a.pdf",
            "page 1/2",
            "page-error 2",
            "done a.pdf partial",
            "start 1 b.pdf",
            "done b.pdf skipped",
        ]
    );
}
