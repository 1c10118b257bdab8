//! Coordinate handling for georeferenced rasters
//!
//! Bounds, points, coordinate reference identifiers and the affine
//! transform that ties raster pixels to world coordinates.

mod bbox;
mod point;
mod transform;
mod crs;

// Re-export key types
pub use self::bbox::{midpoint, RasterBounds};
pub use self::point::LatLon;
pub use self::transform::GeoTransform;
pub use self::crs::{CoordinateReferenceId, CoordinateSystem};
