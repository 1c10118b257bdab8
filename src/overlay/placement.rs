//! Geographic placement of an overlay

use serde::{Serialize, Serializer};

use crate::coordinate::{LatLon, RasterBounds};

/// Where an overlay sits on the map
///
/// Serializes as `{"center": [lat, lon], "bounds": [[south, west], [north, east]]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayPlacement {
    #[serde(serialize_with = "serialize_lat_lon")]
    center: LatLon,
    bounds: [[f64; 2]; 2],
}

impl OverlayPlacement {
    /// Center and corners of `bounds`, reading y as latitude and x as longitude
    pub fn from_bounds(bounds: &RasterBounds) -> Self {
        OverlayPlacement {
            center: bounds.center(),
            bounds: bounds.corners(),
        }
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    /// `[[south, west], [north, east]]`
    pub fn corners(&self) -> [[f64; 2]; 2] {
        self.bounds
    }
}

fn serialize_lat_lon<S: Serializer>(point: &LatLon, serializer: S) -> Result<S::Ok, S::Error> {
    point.as_pair().serialize(serializer)
}
