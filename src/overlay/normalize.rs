//! Sample normalization to display bytes
//!
//! Each sample is floored and clipped to [0, 255]. Values above 255 are
//! clipped rather than rescaled, so high bit depth rasters saturate.

use crate::raster::PixelCube;

/// Normalize one sample: `max(0, min(255, floor(v)))`, NaN becomes 0
pub fn normalize_sample(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, 255.0) as u8
}

/// Normalize every sample of the cube into interleaved RGB bytes, row-major
pub fn normalize_cube(cube: &PixelCube) -> Vec<u8> {
    cube.data().iter().map(|v| normalize_sample(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn clips_and_floors() {
        let values = [-10.0, 0.0, 300.0, 254.99, 0.5, -0.5, f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
        let out: Vec<u8> = values.iter().map(|v| normalize_sample(*v)).collect();
        assert_eq!(out, vec![0, 0, 255, 254, 0, 0, 255, 0, 0]);
    }

    #[test]
    fn identity_on_byte_range() {
        for v in 0..=255u8 {
            assert_eq!(normalize_sample(v as f64), v);
        }
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        for v in [-1e9, -3.7, 12.2, 128.0, 255.5, 4095.0, 1e12] {
            let once = normalize_sample(v);
            assert_eq!(normalize_sample(once as f64), once);
        }
    }

    #[test]
    fn cube_output_is_row_major_interleaved() {
        let mut data = Array3::zeros((1, 2, 3));
        data[[0, 0, 0]] = 300.0;
        data[[0, 1, 2]] = 7.9;
        let cube = PixelCube::from_array(data).unwrap();
        assert_eq!(normalize_cube(&cube), vec![255, 0, 0, 0, 0, 7]);
    }
}
