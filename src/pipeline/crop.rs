//! Percentage crop window → pixel rectangle.

use crate::config::CropSettings;
use image::DynamicImage;

/// Pixel-space crop rectangle, half-open: columns `x0..x1`, rows `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropBounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Copy the window out of `image`.
    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        image.crop_imm(self.x0, self.y0, self.width(), self.height())
    }
}

/// Map `crop` onto a `width` × `height` raster.
///
/// Each bound is `floor(dimension * percent / 100)`, computed independently.
/// Returns `None` when flooring collapses either axis to zero pixels, which
/// can happen on tiny rasters with close percentage pairs.
pub fn compute_bounds(width: u32, height: u32, crop: &CropSettings) -> Option<CropBounds> {
    let x0 = scale(width, crop.horizontal_start);
    let x1 = scale(width, crop.horizontal_end);
    let y0 = scale(height, crop.vertical_start);
    let y1 = scale(height, crop.vertical_end);

    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some(CropBounds { x0, y0, x1, y1 })
}

fn scale(dimension: u32, percent: f64) -> u32 {
    let px = (f64::from(dimension) * percent / 100.0).floor();
    // Validated percentages keep this in 0..=dimension; clamp anyway for NaN.
    px.clamp(0.0, f64::from(dimension)) as u32
}
