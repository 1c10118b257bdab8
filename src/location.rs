//! Location lookups for the project selector
//!
//! A location query names a project in a city; the response carries the
//! coordinates the map should center on. Geocoding is a collaborator behind
//! the [`Geocoder`] trait; when it has no answer the configured fallback
//! position is used.

use log::{info, warn};
use serde::Serialize;

use crate::config::{AppConfig, Place};
use crate::coordinate::LatLon;

/// Forward geocoding: place names to a coordinate pair
pub trait Geocoder {
    fn locate(&self, country: &str, state: &str, city: &str) -> Option<LatLon>;
}

/// Geocoder backed by the configured list of known places
pub struct CatalogGeocoder<'a> {
    places: &'a [Place],
}

impl<'a> CatalogGeocoder<'a> {
    pub fn new(places: &'a [Place]) -> Self {
        CatalogGeocoder { places }
    }
}

impl Geocoder for CatalogGeocoder<'_> {
    fn locate(&self, country: &str, state: &str, city: &str) -> Option<LatLon> {
        let matches = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());
        self.places
            .iter()
            .find(|p| matches(&p.country, country) && matches(&p.state, state) && matches(&p.city, city))
            .map(|p| LatLon::new(p.lat, p.lon))
    }
}

/// A project location request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub country: String,
    pub state: String,
    pub city: String,
    pub project: String,
}

/// `{"status": "success", "message": "...", "coords": [lat, lon]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationResponse {
    pub status: &'static str,
    pub message: String,
    pub coords: [f64; 2],
}

/// Resolve `query` to map coordinates, falling back when the geocoder fails
pub fn resolve(query: &LocationQuery, geocoder: &dyn Geocoder, fallback: LatLon) -> LocationResponse {
    let coords = match geocoder.locate(&query.country, &query.state, &query.city) {
        Some(point) => {
            info!("Located {}, {}, {} at {:?}", query.city, query.state, query.country, point);
            point
        }
        None => {
            warn!("No coordinates for {}, {}, {}; using fallback {:?}",
                  query.city, query.state, query.country, fallback);
            fallback
        }
    };

    LocationResponse {
        status: "success",
        message: format!("Data for {} in {}, {}, {}", query.project, query.city, query.state, query.country),
        coords: coords.as_pair(),
    }
}

/// Resolve `query` with the configured places and fallback
pub fn resolve_with_config(query: &LocationQuery, config: &AppConfig) -> LocationResponse {
    resolve(query, &CatalogGeocoder::new(&config.places), config.fallback)
}
