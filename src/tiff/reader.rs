//! TIFF file reader implementation
//!
//! This module implements the TIFF/BigTIFF structure reader. It uses the
//! Strategy pattern to handle different byte orders and reads everything
//! through one caller-owned `SeekableReader`, so the caller decides how long
//! the underlying file handle lives.

use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::{Cursor, SeekFrom};

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Reasonable limit to prevent runaway IFD chains
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF structures
pub struct TiffReader {
    /// Current byte order handler
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
    /// Size of the stream being read, for offset validation
    file_size: u64,
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order_handler: None,
            is_big_tiff: false,
            file_size: 0,
        }
    }

    /// Returns the byte order handler, once the header has been read
    pub fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::Malformed("Byte order not yet determined".to_string()))
    }

    /// Reads the TIFF structure from the given reader
    ///
    /// 1. Detect byte order (little/big endian)
    /// 2. Check for TIFF or BigTIFF format
    /// 3. Read all IFDs (Image File Directories)
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;
        self.file_size = validation::get_file_size(reader)?;

        let handler = format_utils::detect_byte_order(reader)?;
        let (is_big_tiff, _) = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.is_big_tiff = is_big_tiff;
        self.byte_order_handler = Some(handler);

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?)?;
        debug!("First IFD offset: {}", first_ifd_offset);
        validation::validate_ifd_offset(first_ifd_offset, self.file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset)?;

        if tiff.ifds.is_empty() {
            return Err(TiffError::NoImageDirectory);
        }

        info!("Read {} IFD(s) from {} file", tiff.ifds.len(),
              if self.is_big_tiff { "BigTIFF" } else { "TIFF" });
        Ok(tiff)
    }

    /// Reads a chain of IFDs starting from the given offset
    ///
    /// A broken first IFD is an error; a broken link further down the chain
    /// only ends the walk, since overviews are not needed for ingestion.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds = Vec::new();
        let mut visited = HashSet::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            if !visited.insert(ifd_offset) {
                warn!("IFD chain loops back to offset {}, stopping", ifd_offset);
                break;
            }

            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            let next_offset_position = ifd_offset + ifd_utils::calculate_entries_size(&ifd, self.is_big_tiff);
            ifds.push(ifd);

            if let Err(e) = reader.seek(SeekFrom::Start(next_offset_position)) {
                warn!("Error seeking to next IFD offset: {}", e);
                break;
            }

            let next_ifd_offset = match ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    break;
                }
            };

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, self.file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }

            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads the IFD stored at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let entry_count = self.read_ifd_entry_count(reader)?;
        let entry_size = if self.is_big_tiff { 20 } else { 12 };
        validation::validate_data_range(offset, entry_count.saturating_mul(entry_size), self.file_size)?;
        debug!("IFD #{} at offset {} has {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);

        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads the entry count from an IFD
    fn read_ifd_entry_count(&self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let handler = self.handler()?;
        if self.is_big_tiff {
            Ok(handler.read_u64(reader)?)
        } else {
            Ok(handler.read_u16(reader)? as u64)
        }
    }

    /// Reads a single IFD entry
    ///
    /// Inline integer values are decoded here so that `value_offset` holds
    /// the value itself regardless of byte order.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let field_len = if self.is_big_tiff { 8 } else { 4 };
        let mut raw_value = [0u8; 8];
        reader.read_exact(&mut raw_value[..field_len])?;

        let mut field = Cursor::new(&raw_value[..field_len]);
        let value_offset = if self.is_big_tiff {
            handler.read_u64(&mut field)?
        } else {
            handler.read_u32(&mut field)? as u64
        };

        let mut entry = IFDEntry::new(tag, field_type, count, value_offset).with_raw_value(raw_value);

        if count >= 1 && tag_utils::is_integer_type(field_type) && entry.is_value_inline(self.is_big_tiff) {
            let mut field = Cursor::new(&raw_value[..field_len]);
            entry.value_offset = tag_utils::read_single_value(&mut field, field_type, handler)?;
        }

        debug!("Read IFD entry: tag={} ({}), type={}, count={}, value/offset={}",
               tag, tag_utils::get_tag_name(tag), field_type, count, entry.value_offset);
        Ok(entry)
    }

    /// Reads a tag's values as a vector of u64
    ///
    /// Handles both inline and offset storage for all integer field types.
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;
        let handler = self.handler()?;

        let mut values = Vec::new();

        if entry.is_value_inline(self.is_big_tiff) {
            let mut field = Cursor::new(&entry.raw_value()[..]);
            tag_utils::read_tag_value_array(&mut field, entry, handler, &mut values)?;
        } else {
            self.seek_to_values(reader, entry)?;
            tag_utils::read_tag_value_array(reader, entry, handler, &mut values)?;
        }

        Ok(values)
    }

    /// Reads a FLOAT or DOUBLE tag's values as a vector of f64
    pub fn read_tag_doubles(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;
        let handler = self.handler()?;

        if entry.field_type != field_types::DOUBLE && entry.field_type != field_types::FLOAT {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        let mut field = Cursor::new(&entry.raw_value()[..]);
        let source: &mut dyn SeekableReader = if entry.is_value_inline(self.is_big_tiff) {
            &mut field
        } else {
            self.seek_to_values(reader, entry)?;
            reader
        };

        let mut values = Vec::new();
        for _ in 0..entry.count {
            let value = if entry.field_type == field_types::DOUBLE {
                handler.read_f64(source)?
            } else {
                handler.read_f32(source)? as f64
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Seeks to an entry's out-of-line values after checking they lie inside the file
    fn seek_to_values(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<()> {
        validation::validate_data_range(entry.value_offset, entry.data_size(), self.file_size)?;
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        Ok(())
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Size in bytes of the stream last read
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}
