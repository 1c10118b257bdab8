//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;
use super::packbits::PackBitsHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    ///
    /// Both Deflate codes (8 and the pre-standard 32946) carry zlib streams.
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        let code16 = u16::try_from(code).map_err(|_| TiffError::UnsupportedCompression(code))?;
        match code16 {
            compression::NONE => Ok(Box::new(UncompressedHandler)),
            compression::DEFLATE => Ok(Box::new(AdobeDeflateHandler::new())),
            compression::DEFLATE_OLD => Ok(Box::new(AdobeDeflateHandler::with_code(code))),
            compression::ZSTD => Ok(Box::new(ZstdHandler::new())),
            compression::PACKBITS => Ok(Box::new(PackBitsHandler)),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_codes_round_trip_through_their_handler() {
        let data: Vec<u8> = (0..200u32).map(|i| (i / 7) as u8).collect();
        for code in [1u64, 8, 14, 32773, 32946] {
            let handler = CompressionFactory::create_handler(code).unwrap();
            assert_eq!(handler.code(), code);
            let packed = handler.compress(&data).unwrap();
            assert_eq!(handler.decompress(&packed).unwrap(), data, "{}", handler.name());
        }
    }

    #[test]
    fn lzw_and_jpeg_are_unsupported() {
        for code in [5u64, 7, 34887, 70000] {
            match CompressionFactory::create_handler(code) {
                Err(TiffError::UnsupportedCompression(c)) => assert_eq!(c, code),
                _ => panic!("code {} should be unsupported", code),
            }
        }
    }
}
