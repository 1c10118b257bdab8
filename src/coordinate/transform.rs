//! Affine pixel-to-world transform of a north-up raster

use log::debug;

use super::bbox::RasterBounds;
use crate::errors::{OverlayError, OverlayResult};
use crate::tiff::geo_keys::GeoInfo;

/// Geotransform without rotation terms
///
/// World X = origin_x + col * pixel_width, world Y = origin_y + row * pixel_height.
/// `pixel_height` is negative for the usual north-up raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub origin_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build the transform from GeoTIFF model tags
    ///
    /// ModelTransformation takes precedence over scale plus tiepoint. For
    /// PixelIsPoint rasters the origin moves half a pixel up and left so the
    /// transform addresses pixel corners.
    pub fn from_geo_info(geo_info: &GeoInfo) -> OverlayResult<Self> {
        let mut transform = if let Some(m) = geo_info.transformation {
            if m[1] != 0.0 || m[4] != 0.0 {
                return Err(OverlayError::MalformedRaster(
                    "rotated or sheared ModelTransformation is not supported".to_string()));
            }
            GeoTransform {
                origin_x: m[3],
                pixel_width: m[0],
                origin_y: m[7],
                pixel_height: m[5],
            }
        } else if let (Some(scale), Some(tp)) = (geo_info.pixel_scale, geo_info.tie_point) {
            GeoTransform {
                origin_x: tp[3] - tp[0] * scale[0],
                pixel_width: scale[0],
                origin_y: tp[4] + tp[1] * scale[1],
                pixel_height: -scale[1],
            }
        } else {
            return Err(OverlayError::MalformedRaster(
                "missing georeferencing tags (ModelPixelScale + ModelTiepoint or ModelTransformation)".to_string()));
        };

        if geo_info.is_pixel_is_point() {
            transform.origin_x -= transform.pixel_width * 0.5;
            transform.origin_y -= transform.pixel_height * 0.5;
        }

        debug!("Geotransform: {:?}", transform);
        Ok(transform)
    }

    /// World coordinates of the corner of pixel (col, row)
    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        (self.origin_x + col * self.pixel_width, self.origin_y + row * self.pixel_height)
    }

    /// Extent of a `width` x `height` raster under this transform
    pub fn bounds(&self, width: u64, height: u64) -> OverlayResult<RasterBounds> {
        let (x0, y0) = self.pixel_to_world(0.0, 0.0);
        let (x1, y1) = self.pixel_to_world(width as f64, height as f64);

        RasterBounds::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::constants::raster_type;

    fn tiepoint_info(scale: f64, x: f64, y: f64) -> GeoInfo {
        GeoInfo {
            raster_type: raster_type::PIXEL_IS_AREA,
            pixel_scale: Some([scale, scale, 0.0]),
            tie_point: Some([0.0, 0.0, 0.0, x, y, 0.0]),
            ..GeoInfo::default()
        }
    }

    #[test]
    fn bounds_from_scale_and_tiepoint() {
        let transform = GeoTransform::from_geo_info(&tiepoint_info(0.25, 72.0, 23.0)).unwrap();
        let bounds = transform.bounds(4, 4).unwrap();
        assert_eq!((bounds.left(), bounds.bottom(), bounds.right(), bounds.top()), (72.0, 22.0, 73.0, 23.0));
    }

    #[test]
    fn tiepoint_away_from_origin_is_shifted_back() {
        let mut info = tiepoint_info(1.0, 110.0, 90.0);
        info.tie_point = Some([10.0, 10.0, 0.0, 110.0, 90.0, 0.0]);
        let transform = GeoTransform::from_geo_info(&info).unwrap();
        assert_eq!((transform.origin_x, transform.origin_y), (100.0, 100.0));
    }

    #[test]
    fn pixel_is_point_moves_origin_half_a_pixel() {
        let mut info = tiepoint_info(2.0, 100.0, 200.0);
        info.raster_type = raster_type::PIXEL_IS_POINT;
        let bounds = GeoTransform::from_geo_info(&info).unwrap().bounds(10, 5).unwrap();
        assert_eq!((bounds.left(), bounds.top()), (99.0, 201.0));
        assert_eq!((bounds.right(), bounds.bottom()), (119.0, 191.0));
    }

    #[test]
    fn transformation_matrix_is_used_when_present() {
        let mut m = [0.0; 16];
        m[0] = 30.0;
        m[3] = 500000.0;
        m[5] = -30.0;
        m[7] = 2500000.0;
        m[15] = 1.0;
        let info = GeoInfo { transformation: Some(m), raster_type: raster_type::PIXEL_IS_AREA, ..GeoInfo::default() };
        let bounds = GeoTransform::from_geo_info(&info).unwrap().bounds(100, 50).unwrap();
        assert_eq!(bounds.corners(), [[2498500.0, 500000.0], [2500000.0, 503000.0]]);
    }

    #[test]
    fn rotated_matrix_is_rejected() {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[1] = 0.5;
        m[5] = -1.0;
        let info = GeoInfo { transformation: Some(m), ..GeoInfo::default() };
        let err = GeoTransform::from_geo_info(&info).unwrap_err();
        assert_eq!(err.kind(), "malformed_raster");
    }

    #[test]
    fn missing_tags_are_malformed() {
        let err = GeoTransform::from_geo_info(&GeoInfo::default()).unwrap_err();
        assert_eq!(err.kind(), "malformed_raster");
    }

    #[test]
    fn zero_scale_gives_degenerate_bounds() {
        let transform = GeoTransform::from_geo_info(&tiepoint_info(0.0, 72.0, 23.0)).unwrap();
        assert!(transform.bounds(4, 4).is_err());
    }
}
