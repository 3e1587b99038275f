//! Configuration types for batch PDF-to-image conversion.
//!
//! All conversion behaviour is controlled through [`Settings`], built via
//! its [`SettingsBuilder`] or loaded from a `settings.json` file with
//! [`load_settings`]. A `Settings` value is validated once at construction
//! and is read-only for the rest of the run: the converters never re-read
//! or re-parse configuration.
//!
//! # Settings file
//!
//! ```json
//! {
//!   "input_folder": "./input",
//!   "output_folder": "./output",
//!   "dpi": 300,
//!   "format": "jpg",
//!   "jpg_quality": 90,
//!   "colorspace": "rgb",
//!   "overwrite": false,
//!   "skip_if_exists": true,
//!   "max_pages_per_pdf": 0,
//!   "fail_fast": false,
//!   "log_file": null,
//!   "crop": {
//!     "enabled": false,
//!     "horizontal": { "start": 0, "end": 100 },
//!     "vertical":   { "start": 0, "end": 100 }
//!   }
//! }
//! ```
//!
//! Every key is optional.

use crate::error::Pdf2ImgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration for one batch run.
///
/// Built via [`Settings::builder()`], [`load_settings`], or
/// [`Settings::default()`].
///
/// # Example
/// ```rust
/// use pdf2img::{OutputFormat, Settings};
///
/// let settings = Settings::builder()
///     .input_folder("scans")
///     .output_folder("pages")
///     .dpi(150)
///     .format(OutputFormat::Png)
///     .build()
///     .unwrap();
/// assert_eq!(settings.dpi, 150);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Folder scanned (non-recursively) for `*.pdf` files. Default: `./input`.
    pub input_folder: PathBuf,

    /// Folder receiving `{stem}_{page:03}.{ext}` images. Created if missing.
    /// Default: `./output`.
    pub output_folder: PathBuf,

    /// Rendering resolution in dots per inch. Default: 300.
    pub dpi: u32,

    /// Output image format. Default: [`OutputFormat::Jpg`].
    pub format: OutputFormat,

    /// JPEG quality, 1–100. Ignored for PNG. Default: 90.
    pub jpg_quality: u8,

    /// Colour model of the rendered raster. Default: [`Colorspace::Rgb`].
    pub colorspace: Colorspace,

    /// Re-render pages whose output file already exists. Default: false.
    pub overwrite: bool,

    /// Skip a whole document when its first page image already exists.
    /// Has no effect when `overwrite` is set. Default: true.
    pub skip_if_exists: bool,

    /// Convert at most this many pages per document; 0 means all. Default: 0.
    pub max_pages_per_pdf: usize,

    /// Stop the batch after the first document whose status is `failed`.
    /// Default: false.
    pub fail_fast: bool,

    /// Optional file receiving DEBUG-level logs in addition to the console.
    pub log_file: Option<PathBuf>,

    /// Percentage-based crop applied to every rendered page.
    pub crop: CropSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("./input"),
            output_folder: PathBuf::from("./output"),
            dpi: 300,
            format: OutputFormat::default(),
            jpg_quality: 90,
            colorspace: Colorspace::default(),
            overwrite: false,
            skip_if_exists: true,
            max_pages_per_pdf: 0,
            fail_fast: false,
            log_file: None,
            crop: CropSettings::default(),
        }
    }
}

impl Settings {
    /// Create a new builder seeded with the defaults.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Create a builder seeded with this value, e.g. to apply CLI overrides.
    pub fn to_builder(&self) -> SettingsBuilder {
        SettingsBuilder {
            settings: self.clone(),
        }
    }

    /// Number of pages to convert for a document with `total_pages` pages.
    pub fn page_limit(&self, total_pages: usize) -> usize {
        if self.max_pages_per_pdf > 0 {
            total_pages.min(self.max_pages_per_pdf)
        } else {
            total_pages
        }
    }
}

/// Builder for [`Settings`].
#[derive(Debug)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn input_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.input_folder = path.into();
        self
    }

    pub fn output_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.output_folder = path.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.settings.dpi = dpi;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.settings.format = format;
        self
    }

    pub fn jpg_quality(mut self, quality: u8) -> Self {
        self.settings.jpg_quality = quality;
        self
    }

    pub fn colorspace(mut self, colorspace: Colorspace) -> Self {
        self.settings.colorspace = colorspace;
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.settings.overwrite = v;
        self
    }

    pub fn skip_if_exists(mut self, v: bool) -> Self {
        self.settings.skip_if_exists = v;
        self
    }

    pub fn max_pages_per_pdf(mut self, n: usize) -> Self {
        self.settings.max_pages_per_pdf = n;
        self
    }

    pub fn fail_fast(mut self, v: bool) -> Self {
        self.settings.fail_fast = v;
        self
    }

    pub fn log_file(mut self, path: Option<PathBuf>) -> Self {
        self.settings.log_file = path;
        self
    }

    pub fn crop(mut self, crop: CropSettings) -> Self {
        self.settings.crop = crop;
        self
    }

    /// Build the settings, validating constraints.
    pub fn build(self) -> Result<Settings, Pdf2ImgError> {
        let s = &self.settings;
        if !(1..=100).contains(&s.jpg_quality) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "jpg_quality must be 1-100, got {}",
                s.jpg_quality
            )));
        }
        if s.dpi == 0 {
            return Err(Pdf2ImgError::InvalidConfig("dpi must be ≥ 1".into()));
        }
        if !(72..=1200).contains(&s.dpi) {
            warn!("DPI {} is unusual. Recommended: 72-600.", s.dpi);
        }
        s.crop.validate()?;
        Ok(self.settings)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Encoded image format of the per-page output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG, honouring `jpg_quality`. (default)
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Colour model used when rasterising pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colorspace {
    /// 8-bit RGB. (default)
    #[default]
    Rgb,
    /// 8-bit single-channel luminance.
    Gray,
}

/// Percentage-based crop window.
///
/// Each bound is a percentage of the rendered raster's width (horizontal) or
/// height (vertical). Invariant, checked by [`CropSettings::new`] and
/// [`SettingsBuilder::build`]: every bound lies in `[0, 100]` and
/// `start < end` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropSettings {
    pub enabled: bool,
    pub horizontal_start: f64,
    pub horizontal_end: f64,
    pub vertical_start: f64,
    pub vertical_end: f64,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            horizontal_start: 0.0,
            horizontal_end: 100.0,
            vertical_start: 0.0,
            vertical_end: 100.0,
        }
    }
}

impl CropSettings {
    /// Validated constructor.
    pub fn new(
        enabled: bool,
        horizontal: (f64, f64),
        vertical: (f64, f64),
    ) -> Result<Self, Pdf2ImgError> {
        let crop = Self {
            enabled,
            horizontal_start: horizontal.0,
            horizontal_end: horizontal.1,
            vertical_start: vertical.0,
            vertical_end: vertical.1,
        };
        crop.validate()?;
        Ok(crop)
    }

    fn validate(&self) -> Result<(), Pdf2ImgError> {
        let bounds = [
            ("horizontal_start", self.horizontal_start),
            ("horizontal_end", self.horizontal_end),
            ("vertical_start", self.vertical_start),
            ("vertical_end", self.vertical_end),
        ];
        for (name, value) in bounds {
            if !(0.0..=100.0).contains(&value) {
                return Err(Pdf2ImgError::InvalidConfig(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }
        if self.horizontal_start >= self.horizontal_end {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "horizontal_start ({}) must be less than horizontal_end ({})",
                self.horizontal_start, self.horizontal_end
            )));
        }
        if self.vertical_start >= self.vertical_end {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "vertical_start ({}) must be less than vertical_end ({})",
                self.vertical_start, self.vertical_end
            )));
        }
        Ok(())
    }
}

// ── settings.json ────────────────────────────────────────────────────────

/// On-disk shape of `settings.json`. Missing keys fall back to defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SettingsFile {
    input_folder: PathBuf,
    output_folder: PathBuf,
    dpi: u32,
    format: OutputFormat,
    jpg_quality: u8,
    colorspace: Colorspace,
    overwrite: bool,
    skip_if_exists: bool,
    max_pages_per_pdf: usize,
    fail_fast: bool,
    log_file: Option<PathBuf>,
    crop: CropFile,
}

impl Default for SettingsFile {
    fn default() -> Self {
        let d = Settings::default();
        Self {
            input_folder: d.input_folder,
            output_folder: d.output_folder,
            dpi: d.dpi,
            format: d.format,
            jpg_quality: d.jpg_quality,
            colorspace: d.colorspace,
            overwrite: d.overwrite,
            skip_if_exists: d.skip_if_exists,
            max_pages_per_pdf: d.max_pages_per_pdf,
            fail_fast: d.fail_fast,
            log_file: d.log_file,
            crop: CropFile::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CropFile {
    enabled: bool,
    horizontal: AxisFile,
    vertical: AxisFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AxisFile {
    start: f64,
    end: f64,
}

impl Default for AxisFile {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 100.0,
        }
    }
}

impl SettingsFile {
    fn into_builder(self) -> SettingsBuilder {
        // An empty string disables the log file, matching `null`.
        let log_file = self.log_file.filter(|p| !p.as_os_str().is_empty());
        Settings::builder()
            .input_folder(self.input_folder)
            .output_folder(self.output_folder)
            .dpi(self.dpi)
            .format(self.format)
            .jpg_quality(self.jpg_quality)
            .colorspace(self.colorspace)
            .overwrite(self.overwrite)
            .skip_if_exists(self.skip_if_exists)
            .max_pages_per_pdf(self.max_pages_per_pdf)
            .fail_fast(self.fail_fast)
            .log_file(log_file)
            .crop(CropSettings {
                enabled: self.crop.enabled,
                horizontal_start: self.crop.horizontal.start,
                horizontal_end: self.crop.horizontal.end,
                vertical_start: self.crop.vertical.start,
                vertical_end: self.crop.vertical.end,
            })
    }
}

/// Parse and validate settings from a JSON string.
pub fn parse_settings(json: &str, origin: &Path) -> Result<Settings, Pdf2ImgError> {
    let file: SettingsFile =
        serde_json::from_str(json).map_err(|source| Pdf2ImgError::SettingsParse {
            path: origin.to_path_buf(),
            source,
        })?;
    file.into_builder().build()
}

/// Load settings from a `settings.json` file.
///
/// A missing file is not an error: a warning is logged and the defaults are
/// returned. Unreadable, malformed or invalid files are fatal.
pub fn load_settings(path: &Path) -> Result<Settings, Pdf2ImgError> {
    if !path.exists() {
        warn!(
            "Settings file not found: {}. Using defaults.",
            path.display()
        );
        return Settings::builder().build();
    }

    info!("Loading settings from: {}", path.display());
    let raw = std::fs::read_to_string(path).map_err(|source| Pdf2ImgError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&raw, path)
}
