//! Application configuration
//!
//! Loaded once at startup from the embedded `overlay.toml` defaults,
//! optionally overridden section by section from a user file, validated,
//! and then shared read-only.

use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coordinate::LatLon;
use crate::errors::{OverlayError, OverlayResult};

/// Built-in defaults
const DEFAULT_CONFIG: &str = include_str!("../overlay.toml");

/// Location choices offered to clients
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Catalog {
    pub countries: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub projects: Vec<String>,
}

/// A known place and its coordinates
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Place {
    pub country: String,
    pub state: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// Base map settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MapConfig {
    pub tile_url: String,
    pub attribution: String,
    pub max_zoom: u8,
    /// Default overlay opacity
    pub opacity: f64,
}

/// Artifact settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Extension, and so encoding, of the display image
    pub image_extension: String,
}

/// Immutable application configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub require_geographic_crs: bool,
    pub catalog: Catalog,
    /// Coordinates used when a location cannot be resolved
    pub fallback: LatLon,
    #[serde(default)]
    pub places: Vec<Place>,
    pub map: MapConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load the defaults, overridden by `path` when given
    pub fn load(path: Option<&Path>) -> OverlayResult<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| OverlayError::io(format!("reading config {}", path.display()), e))?;
                info!("Loading configuration overrides from {}", path.display());
                Self::with_overrides(&text)
            }
            None => Self::defaults(),
        }
    }

    /// The embedded default configuration
    pub fn defaults() -> OverlayResult<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Parse and validate a complete configuration document
    pub fn from_toml_str(text: &str) -> OverlayResult<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the top-level keys of `text` over the defaults
    ///
    /// Each key present in `text` replaces the default key as a whole.
    pub fn with_overrides(text: &str) -> OverlayResult<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
        let overrides: toml::Table = toml::from_str(text)?;

        for (key, value) in overrides {
            debug!("Config override: {}", key);
            merged.insert(key, value);
        }

        let config: AppConfig = toml::Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the types alone do not enforce
    pub fn validate(&self) -> OverlayResult<()> {
        if !(0.0..=1.0).contains(&self.map.opacity) {
            return Err(OverlayError::Config(format!("map.opacity {} is outside [0, 1]", self.map.opacity)));
        }
        if self.map.max_zoom == 0 || self.map.max_zoom > 24 {
            return Err(OverlayError::Config(format!("map.max_zoom {} is outside 1..=24", self.map.max_zoom)));
        }
        if !["{z}", "{x}", "{y}"].iter().all(|p| self.map.tile_url.contains(p)) {
            return Err(OverlayError::Config(format!(
                "map.tile_url {:?} needs {{z}}, {{x}} and {{y}} placeholders", self.map.tile_url)));
        }
        if !self.fallback.is_valid() {
            return Err(OverlayError::Config(format!("fallback {:?} is not a valid position", self.fallback)));
        }
        if let Some(place) = self.places.iter().find(|p| !LatLon::new(p.lat, p.lon).is_valid()) {
            return Err(OverlayError::Config(format!("place {} has invalid coordinates", place.city)));
        }
        match image::ImageFormat::from_extension(&self.output.image_extension) {
            Some(image::ImageFormat::Png) | Some(image::ImageFormat::Jpeg) => {}
            _ => return Err(OverlayError::Config(format!(
                "output.image_extension {:?} is not png or jpg", self.output.image_extension))),
        }

        Ok(())
    }
}
