//! IFD utilities
//!
//! Offset arithmetic for walking the IFD chain.

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

/// Reads an IFD offset (the header's first offset or an IFD's next offset)
///
/// Returns 0 when the chain ends.
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    if is_big_tiff {
        byte_order_handler.read_u64(reader).map_err(TiffError::IoError)
    } else {
        byte_order_handler.read_u32(reader)
            .map(|v| v as u64)
            .map_err(TiffError::IoError)
    }
}

/// Size of the IFD's entry-count field plus all entries, in bytes
///
/// The next-IFD offset follows immediately after.
pub fn calculate_entries_size(ifd: &IFD, is_big_tiff: bool) -> u64 {
    if is_big_tiff {
        // 8 (entry count) + 20 (each entry)
        8 + (20 * ifd.entries.len() as u64)
    } else {
        // 2 (entry count) + 12 (each entry)
        2 + (12 * ifd.entries.len() as u64)
    }
}
