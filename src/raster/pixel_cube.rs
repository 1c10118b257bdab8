//! Three-band pixel data in the source's native value range

use ndarray::{stack, Array2, Array3, ArrayView2, Axis};

use crate::errors::{OverlayError, OverlayResult};
use crate::raster::band_reader::RgbBands;
use crate::raster::layout::RGB_BANDS;

/// Bands 1, 2 and 3 stacked along a trailing axis: shape (height, width, 3)
#[derive(Debug, Clone, PartialEq)]
pub struct PixelCube {
    data: Array3<f64>,
}

impl PixelCube {
    /// Stack three row-major bands of `height` x `width` samples
    pub fn from_bands(height: usize, width: usize, bands: RgbBands) -> OverlayResult<Self> {
        let planes = bands
            .into_iter()
            .enumerate()
            .map(|(i, band)| {
                Array2::from_shape_vec((height, width), band).map_err(|e| {
                    OverlayError::MalformedRaster(format!("band {} does not fit {}x{}: {}", i + 1, width, height, e))
                })
            })
            .collect::<OverlayResult<Vec<_>>>()?;

        let views: Vec<ArrayView2<f64>> = planes.iter().map(|p| p.view()).collect();
        let data = stack(Axis(2), &views)
            .map_err(|e| OverlayError::MalformedRaster(format!("cannot stack bands: {}", e)))?;

        Ok(PixelCube { data })
    }

    /// Wrap an existing (height, width, 3) array
    pub fn from_array(data: Array3<f64>) -> OverlayResult<Self> {
        if data.dim().2 != RGB_BANDS {
            return Err(OverlayError::MalformedRaster(format!(
                "pixel cube needs {} bands, got {}", RGB_BANDS, data.dim().2)));
        }
        Ok(PixelCube { data })
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    /// One band as a (height, width) view; `index` is 0-based
    pub fn band(&self, index: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), index)
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacks_bands_on_trailing_axis() {
        let bands = [vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![10.0; 6], vec![-1.0; 6]];
        let cube = PixelCube::from_bands(2, 3, bands).unwrap();
        assert_eq!(cube.data().dim(), (2, 3, 3));
        assert_eq!(cube.data()[[1, 2, 0]], 6.0);
        assert_eq!(cube.data()[[0, 1, 1]], 10.0);
        assert_eq!(cube.band(2)[[1, 0]], -1.0);
    }

    #[test]
    fn rejects_band_of_wrong_length() {
        let bands = [vec![0.0; 6], vec![0.0; 5], vec![0.0; 6]];
        let err = PixelCube::from_bands(2, 3, bands).unwrap_err();
        assert_eq!(err.kind(), "malformed_raster");
    }

    #[test]
    fn from_array_requires_three_bands() {
        assert!(PixelCube::from_array(Array3::zeros((2, 2, 4))).is_err());
        assert!(PixelCube::from_array(Array3::zeros((2, 2, 3))).is_ok());
    }
}
