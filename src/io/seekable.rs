//! Seekable reader trait
//!
//! Every read of a raster (header, tags, GeoKeys and pixel blocks) goes
//! through one value implementing this trait, so a single file handle
//! serves the whole ingest.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
