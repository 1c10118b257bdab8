//! Normalized RGB raster ready for display

use image::{ImageFormat, RgbImage};
use log::info;
use ndarray::Array3;
use std::io::Cursor;
use std::path::Path;

use crate::errors::{OverlayError, OverlayResult};
use crate::overlay::normalize;
use crate::raster::PixelCube;
use crate::utils::write_utils;

/// 8-bit three-channel image derived from a [`PixelCube`]
///
/// Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayImage {
    pixels: RgbImage,
}

impl DisplayImage {
    /// Normalize a pixel cube into display bytes
    pub fn from_cube(cube: &PixelCube) -> OverlayResult<Self> {
        let (width, height) = match (u32::try_from(cube.width()), u32::try_from(cube.height())) {
            (Ok(w), Ok(h)) => (w, h),
            _ => return Err(OverlayError::Normalization(format!(
                "{}x{} raster is too large for an image", cube.width(), cube.height()))),
        };

        let pixels = RgbImage::from_raw(width, height, normalize::normalize_cube(cube))
            .ok_or_else(|| OverlayError::Normalization("normalized buffer does not match image size".to_string()))?;

        Ok(DisplayImage { pixels })
    }

    /// Load a previously saved display image
    pub fn open(path: &Path) -> OverlayResult<Self> {
        let pixels = image::open(path)?.to_rgb8();
        Ok(DisplayImage { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGB value at column `x`, row `y`
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.pixels
    }

    /// Widen back into a pixel cube (height, width, 3)
    pub fn to_cube(&self) -> OverlayResult<PixelCube> {
        let shape = (self.height() as usize, self.width() as usize, 3);
        let values = self.pixels.as_raw().iter().map(|v| *v as f64).collect();
        let data = Array3::from_shape_vec(shape, values)
            .map_err(|e| OverlayError::Normalization(format!("image buffer does not fit {:?}: {}", shape, e)))?;
        PixelCube::from_array(data)
    }

    /// Save to `path`, encoding by file extension
    pub fn save(&self, path: &Path) -> OverlayResult<()> {
        let format = ImageFormat::from_path(path)?;
        write_utils::write_atomic_with(path, |temp_path| {
            self.pixels.save_with_format(temp_path, format)?;
            Ok(())
        })?;

        info!("Saved {}x{} display image to {}", self.width(), self.height(), path.display());
        Ok(())
    }

    /// Encode as an in-memory PNG
    pub fn encode_png(&self) -> OverlayResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.pixels.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }
}
