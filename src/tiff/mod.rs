//! TIFF file format parsing module
//!
//! This module provides structures and functions for reading the
//! directory structure and GeoTIFF tags of TIFF and BigTIFF files.

pub mod errors;
pub mod ifd;
pub(crate) mod types;
pub mod reader;
pub mod geo_keys;
pub mod constants;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geo_keys::{GeoInfo, GeoKeyEntry, GeoKeyParser};
