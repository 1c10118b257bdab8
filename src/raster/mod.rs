//! Raster ingestion
//!
//! Turns a GeoTIFF into its bounds, coordinate reference id and a
//! three-band pixel cube.

pub mod sample;
pub mod layout;
pub mod band_reader;
pub mod pixel_cube;
pub mod ingestor;

pub use ingestor::{RasterIngestor, RasterScene};
pub use layout::{BlockGrid, RasterLayout};
pub use pixel_cube::PixelCube;
pub use sample::SampleType;
