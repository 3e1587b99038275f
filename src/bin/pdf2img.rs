//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate: locate and load `settings.json`,
//! apply command-line overrides, set up logging, bind pdfium, run the batch
//! and print the summary. Exits non-zero when any document failed.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    convert_batch_with_progress, load_settings, summary, Colorspace, ConversionProgressCallback,
    ConversionResult, ConversionStatus, NoProgress, OutputFormat, PageError, PdfiumBackend,
    Settings,
};
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const SETTINGS_FILE: &str = "settings.json";

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar over the documents of the batch, with a log
/// line per finished document and per failed page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// File name of the document being converted.
    current: RefCell<String>,
}

impl CliProgressCallback {
    /// Start as a spinner; `on_batch_start` turns it into a bar once the
    /// number of PDFs is known.
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Looking for PDFs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            current: RefCell::new(String::new()),
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} PDFs  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_documents as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn on_document_start(&self, pdf_path: &Path, _index: usize) {
        let name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name.clone());
        *self.current.borrow_mut() = name;
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        self.bar.set_message(format!(
            "{} {}",
            self.current.borrow(),
            dim(&format!("page {page_num}/{total_pages}"))
        ));
    }

    fn on_page_error(&self, _total_pages: usize, error: &PageError) {
        let msg = error.to_string();
        // Truncate very long error messages to keep output tidy.
        let msg = match msg.char_indices().nth(100) {
            Some((cut, _)) => format!("{}\u{2026}", &msg[..cut]),
            None => msg,
        };
        self.bar.println(format!(
            "    {} {}  {}",
            red("✗"),
            self.current.borrow(),
            red(&msg)
        ));
    }

    fn on_document_complete(&self, result: &ConversionResult) {
        let (mark, detail) = match result.status {
            ConversionStatus::Success => (
                green("✓"),
                format!("{}/{} pages", result.pages_converted, result.pages_total),
            ),
            ConversionStatus::Partial => (
                yellow("⚠"),
                format!(
                    "{}/{} pages ({} failed)",
                    result.pages_converted, result.pages_total, result.pages_failed
                ),
            ),
            ConversionStatus::Failed => (
                red("✗"),
                red(result.error_message.as_deref().unwrap_or("failed")),
            ),
            ConversionStatus::Skipped => (dim("⊘"), dim("skipped (output exists)")),
        };
        self.bar
            .println(format!("  {} {}  {}", mark, result.display_name(), detail));
        self.bar.inc(1);
    }
}

/// Batch-convert a folder of PDFs into per-page JPEG or PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Batch-convert a folder of PDFs into per-page JPEG or PNG images",
    long_about = "Convert every PDF in the input folder into one image per page, named \
{stem}_{page:03}.{jpg|png}. Settings come from settings.json (current directory, then \
next to the executable) and may be overridden on the command line. Re-runs skip \
documents and pages whose images already exist unless overwrite is enabled.",
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Path to settings.json. Defaults to ./settings.json, then the copy
    /// next to the executable, then built-in defaults.
    settings: Option<PathBuf>,

    /// Folder containing the PDFs to convert.
    #[arg(short, long, env = "PDF2IMG_INPUT")]
    input: Option<PathBuf>,

    /// Folder receiving the page images.
    #[arg(short, long, env = "PDF2IMG_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI.
    #[arg(long, env = "PDF2IMG_DPI",
          value_parser = clap::value_parser!(u32).range(1..))]
    dpi: Option<u32>,

    /// Output image format.
    #[arg(long, env = "PDF2IMG_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2IMG_QUALITY",
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Render in colour or grayscale.
    #[arg(long, env = "PDF2IMG_COLORSPACE", value_enum)]
    colorspace: Option<ColorspaceArg>,

    /// Re-render pages whose images already exist.
    #[arg(long, env = "PDF2IMG_OVERWRITE")]
    overwrite: bool,

    /// Stop after the first document that fails.
    #[arg(long, env = "PDF2IMG_FAIL_FAST")]
    fail_fast: bool,

    /// Convert at most this many pages per PDF (0 = all).
    #[arg(long, env = "PDF2IMG_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Path to libpdfium, or the directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the batch result as JSON instead of the text summary.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Jpg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Jpg => OutputFormat::Jpg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ColorspaceArg {
    Rgb,
    Gray,
}

impl From<ColorspaceArg> for Colorspace {
    fn from(v: ColorspaceArg) -> Self {
        match v {
            ColorspaceArg::Rgb => Colorspace::Rgb,
            ColorspaceArg::Gray => Colorspace::Gray,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", red("Error:"), e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    // ── Settings ─────────────────────────────────────────────────────────
    // Loaded before the real subscriber exists (it needs `log_file`), so a
    // temporary stderr subscriber carries the loader's own messages.
    let settings_path = resolve_settings_path(cli.settings.as_deref());
    let bootstrap = fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.quiet {
            LevelFilter::ERROR
        } else {
            LevelFilter::WARN
        })
        .finish();
    let settings = tracing::subscriber::with_default(bootstrap, || load_settings(&settings_path))
        .context("Error loading settings")?;
    let settings = apply_overrides(cli, &settings)?;

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    init_logging(cli, &settings, show_progress)?;

    info!("{}", "=".repeat(50));
    info!("pdf2img v{}", env!("CARGO_PKG_VERSION"));
    info!("{}", "=".repeat(50));
    info!("Settings: {}", settings_path.display());
    info!("Input:  {}", absolute(&settings.input_folder).display());
    info!("Output: {}", absolute(&settings.output_folder).display());
    info!("DPI: {}, Quality: {}", settings.dpi, settings.jpg_quality);
    info!("{}", "=".repeat(50));

    // ── PDFium ───────────────────────────────────────────────────────────
    let backend =
        PdfiumBackend::bind(cli.pdfium_lib.as_deref()).context("Failed to initialise PDFium")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let bar = show_progress.then(CliProgressCallback::new);
    let progress: &dyn ConversionProgressCallback = match &bar {
        Some(cb) => cb,
        None => &NoProgress,
    };
    let batch = convert_batch_with_progress(&backend, &settings, progress);
    if let Some(cb) = &bar {
        cb.finish();
    }
    let batch = batch.context("Conversion failed")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&batch).context("Failed to serialise result")?
        );
    } else {
        print!("{}", summary::format_summary(&batch));
    }

    Ok(ExitCode::from(summary::exit_code(&batch)))
}

/// Explicit path → `./settings.json` → `settings.json` beside the executable.
///
/// When none exists the first candidate is returned and the loader falls
/// back to defaults.
fn resolve_settings_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = PathBuf::from(SETTINGS_FILE);
    if local.exists() {
        return local;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE)))
        .filter(|p| p.exists())
        .unwrap_or(local)
}

/// Map CLI flags onto the loaded settings and re-validate.
fn apply_overrides(cli: &Cli, settings: &Settings) -> Result<Settings> {
    let mut builder = settings.to_builder();
    if let Some(ref input) = cli.input {
        builder = builder.input_folder(input);
    }
    if let Some(ref output) = cli.output {
        builder = builder.output_folder(output);
    }
    if let Some(dpi) = cli.dpi {
        builder = builder.dpi(dpi);
    }
    if let Some(format) = cli.format {
        builder = builder.format(format.into());
    }
    if let Some(quality) = cli.quality {
        builder = builder.jpg_quality(quality);
    }
    if let Some(colorspace) = cli.colorspace {
        builder = builder.colorspace(colorspace.into());
    }
    if cli.overwrite {
        builder = builder.overwrite(true);
    }
    if cli.fail_fast {
        builder = builder.fail_fast(true);
    }
    if let Some(max_pages) = cli.max_pages {
        builder = builder.max_pages_per_pdf(max_pages);
    }
    builder.build().context("Invalid configuration")
}

/// Console layer filtered by `RUST_LOG` / flags, plus a DEBUG file layer
/// when `log_file` is configured.
fn init_logging(cli: &Cli, settings: &Settings, show_progress: bool) -> Result<()> {
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let console = fmt::layer().with_writer(io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
    );

    let file = match settings.log_file {
        Some(ref path) => {
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
    info!("Logging configured.");
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
