//! Image encoding: `DynamicImage` → JPEG or PNG file on disk.
//!
//! Each image is written to `<name>.tmp` and renamed into place. The page
//! converter treats an existing output file as already converted, so a
//! truncated file left behind by a crash must never carry the final name.

use crate::config::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Encode `image` as `format` and write it to `path`.
///
/// `jpg_quality` (1–100) applies to JPEG only.
pub fn save_image(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpg_quality: u8,
) -> ImageResult<()> {
    let tmp_path = tmp_path_for(path);
    let written = write_encoded(image, &tmp_path, format, jpg_quality)
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(Into::into));

    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    } else {
        debug!(
            "Encoded {}x{} px → {}",
            image.width(),
            image.height(),
            path.display()
        );
    }
    written
}

fn write_encoded(
    image: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpg_quality: u8,
) -> ImageResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Jpg => {
            image.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpg_quality))?
        }
        OutputFormat::Png => image.write_with_encoder(PngEncoder::new(&mut writer))?,
    }
    writer.flush()?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
