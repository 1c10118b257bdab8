//! Geographic point in (latitude, longitude) order

use serde::{Deserialize, Serialize};

/// A point given as latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }

    /// The `[lat, lon]` pair used by map libraries
    pub fn as_pair(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    /// Whether the point is a valid WGS84 position
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}
