//! Handler for Deflate compressed data

use std::io::{self, Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Zlib compression handler (compression codes 8 and 32946)
pub struct AdobeDeflateHandler {
    code: u64,
}

impl AdobeDeflateHandler {
    /// Handler for the standard Adobe Deflate code
    pub fn new() -> Self {
        AdobeDeflateHandler { code: compression::DEFLATE as u64 }
    }

    /// Handler reporting a different Deflate code
    pub fn with_code(code: u64) -> Self {
        AdobeDeflateHandler { code }
    }
}

impl Default for AdobeDeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed_data = Vec::new();
        match decoder.read_to_end(&mut decompressed_data) {
            Ok(_) => Ok(decompressed_data),
            Err(e) => Err(TiffError::IoError(io::Error::new(
                io::ErrorKind::InvalidData, format!("Deflate decompression error: {}", e))))
        }
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        if self.code == compression::DEFLATE_OLD as u64 {
            "Deflate"
        } else {
            "Adobe Deflate"
        }
    }

    fn code(&self) -> u64 {
        self.code
    }
}
