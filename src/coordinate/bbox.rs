//! Bounding rectangle of a georeferenced raster

use serde::Serialize;

use super::point::LatLon;
use crate::errors::{OverlayError, OverlayResult};

/// The raster's extent in its native coordinate reference system
///
/// Always satisfies `left < right` and `bottom < top`; the only way to build
/// one is through [`RasterBounds::new`], which checks that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RasterBounds {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl RasterBounds {
    /// Create validated bounds
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> OverlayResult<Self> {
        if ![left, bottom, right, top].iter().all(|v| v.is_finite()) {
            return Err(OverlayError::MalformedRaster(format!(
                "non-finite bounds ({}, {}, {}, {})", left, bottom, right, top)));
        }
        if left >= right || bottom >= top {
            return Err(OverlayError::MalformedRaster(format!(
                "degenerate bounds: left={} right={} bottom={} top={}", left, right, bottom, top)));
        }

        Ok(RasterBounds { left, bottom, right, top })
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    /// Get the width of the bounding box
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Get the height of the bounding box
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Arithmetic midpoint, reading y as latitude and x as longitude
    pub fn center(&self) -> LatLon {
        LatLon::new(midpoint(self.bottom, self.top), midpoint(self.left, self.right))
    }

    /// South-west and north-east corners as `[[bottom, left], [top, right]]`
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.bottom, self.left], [self.top, self.right]]
    }

    /// Check if a point lies strictly inside the rectangle
    pub fn contains_strictly(&self, point: &LatLon) -> bool {
        point.lon > self.left && point.lon < self.right &&
            point.lat > self.bottom && point.lat < self.top
    }
}

/// Midpoint of `a` and `b` that stays finite for any finite pair
pub fn midpoint(a: f64, b: f64) -> f64 {
    let half_span = (b - a) / 2.0;
    if half_span.is_finite() {
        a + half_span
    } else {
        a / 2.0 + b / 2.0
    }
}
