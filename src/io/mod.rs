//! I/O utilities for raster file handling
//!
//! This module provides the seekable reader abstraction and the byte order
//! strategies used when decoding TIFF structures.

pub mod seekable;
pub mod byte_order;
