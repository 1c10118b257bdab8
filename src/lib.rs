pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod coordinate;
pub mod raster;
pub mod overlay;
pub mod metadata;
pub mod location;
pub mod config;
pub mod errors;
pub mod commands;
pub mod api;

pub use crate::api::{OverlayArtifacts, RasterOverlay};

pub use config::AppConfig;
pub use coordinate::{CoordinateReferenceId, CoordinateSystem, LatLon, RasterBounds};
pub use errors::{ErrorResponse, OverlayError, OverlayResult};
pub use location::{Geocoder, LocationQuery, LocationResponse};
pub use metadata::RasterMetadata;
pub use overlay::{DisplayImage, LeafletMapSink, MapSink, OverlayCompositor, OverlayPlacement};
pub use raster::{PixelCube, RasterIngestor, RasterScene};
