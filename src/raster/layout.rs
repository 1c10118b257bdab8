//! Pixel block layout of a TIFF image
//!
//! Collects everything the band reader needs to know about how samples are
//! stored: dimensions, sample type, interleaving, compression, predictor and
//! the strip or tile grid.

use log::info;

use crate::io::seekable::SeekableReader;
use crate::raster::sample::SampleType;
use crate::tiff::constants::{planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::tag_utils;

/// Number of bands read as red, green and blue
pub const RGB_BANDS: usize = 3;

/// Largest decoded pixel cube or single block accepted, in bytes
pub const MAX_DECODED_BYTES: u64 = 4 << 30;

/// How pixel data is divided into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockGrid {
    /// Full-width strips of `rows_per_strip` rows; the last one may be shorter
    Strips { rows_per_strip: usize },
    /// Fixed-size tiles, padded at the right and bottom edges
    Tiles { tile_width: usize, tile_height: usize },
}

/// Storage layout of the main image
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayout {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub sample_type: SampleType,
    /// PlanarConfiguration = 2: one set of blocks per band
    pub planar: bool,
    pub compression: u64,
    pub predictor: u16,
    pub grid: BlockGrid,
}

impl RasterLayout {
    /// Read and validate the layout of `ifd`
    ///
    /// Fails when the image has fewer than three bands, mixes sample types
    /// or uses a layout the band reader cannot decode.
    pub fn from_ifd(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        if width == 0 || height == 0 {
            return Err(TiffError::Malformed(format!("empty image {}x{}", width, height)));
        }
        Self::check_decoded_size("image", width, height, (RGB_BANDS * std::mem::size_of::<f64>()) as u64)?;

        let samples_per_pixel = ifd.get_samples_per_pixel() as usize;
        if samples_per_pixel < RGB_BANDS {
            return Err(TiffError::Malformed(format!(
                "raster has {} band(s), at least {} are required", samples_per_pixel, RGB_BANDS)));
        }

        let sample_type = Self::read_sample_type(tiff_reader, reader, ifd, samples_per_pixel)?;

        let planar = match ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64) as u16 {
            planar_config::CHUNKY => false,
            planar_config::PLANAR => true,
            other => return Err(TiffError::Malformed(format!("unknown PlanarConfiguration {}", other))),
        };

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);

        let predictor_code = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;
        match predictor_code {
            predictor::NONE => {}
            predictor::HORIZONTAL_DIFFERENCING if !sample_type.is_float() => {}
            _ => return Err(TiffError::Malformed(format!(
                "predictor {} is not supported for {} samples", predictor_code, sample_type.name()))),
        }

        let pixel_bytes = (samples_per_pixel * sample_type.bytes()) as u64;
        let grid = if ifd.is_tiled() {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0);
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0);
            if tile_width == 0 || tile_height == 0 {
                return Err(TiffError::Malformed("tiled image without tile dimensions".to_string()));
            }
            Self::check_decoded_size("tile", tile_width, tile_height, pixel_bytes)?;
            BlockGrid::Tiles { tile_width: tile_width as usize, tile_height: tile_height as usize }
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .unwrap_or(height)
                .min(height) as usize;
            if rows_per_strip == 0 {
                return Err(TiffError::Malformed("RowsPerStrip is 0".to_string()));
            }
            Self::check_decoded_size("strip", width, rows_per_strip as u64, pixel_bytes)?;
            BlockGrid::Strips { rows_per_strip }
        };

        let layout = RasterLayout {
            width: width as usize,
            height: height as usize,
            samples_per_pixel,
            sample_type,
            planar,
            compression,
            predictor: predictor_code,
            grid,
        };

        info!("Raster layout: {}x{}, {} band(s) of {}, {}, {} compression, {:?}",
              layout.width, layout.height, layout.samples_per_pixel, layout.sample_type.name(),
              if layout.planar { "planar" } else { "interleaved" },
              tag_utils::get_compression_name(layout.compression), layout.grid);
        Ok(layout)
    }

    /// Reject dimensions whose decoded size overflows or passes [`MAX_DECODED_BYTES`]
    fn check_decoded_size(what: &str, width: u64, height: u64, pixel_bytes: u64) -> TiffResult<()> {
        let bytes = width.checked_mul(height).and_then(|pixels| pixels.checked_mul(pixel_bytes));
        match bytes {
            Some(bytes) if bytes <= MAX_DECODED_BYTES && usize::try_from(bytes).is_ok() => Ok(()),
            _ => Err(TiffError::Malformed(format!(
                "{} of {}x{} pixels is too large to decode (limit {} bytes)", what, width, height, MAX_DECODED_BYTES))),
        }
    }

    /// Resolve the single sample type shared by every band
    fn read_sample_type(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        samples_per_pixel: usize,
    ) -> TiffResult<SampleType> {
        let bits = Self::per_sample_values(tiff_reader, reader, ifd, tags::BITS_PER_SAMPLE, 1, samples_per_pixel)?;
        let formats = Self::per_sample_values(
            tiff_reader, reader, ifd, tags::SAMPLE_FORMAT, sample_format::UNSIGNED as u64, samples_per_pixel)?;

        let first = (formats[0], bits[0]);
        if bits.iter().zip(&formats).any(|(b, f)| (*f, *b) != first) {
            return Err(TiffError::Malformed(format!(
                "bands mix sample types (bits {:?}, formats {:?})", bits, formats)));
        }

        SampleType::from_tags(first.0 as u16, first.1 as u16)
            .ok_or_else(|| TiffError::Malformed(format!(
                "unsupported sample layout: {} bits, format {}", first.1, first.0)))
    }

    /// Read a per-sample tag, expanding a single value to every sample
    fn per_sample_values(
        tiff_reader: &TiffReader,
        reader: &mut dyn SeekableReader,
        ifd: &IFD,
        tag: u16,
        default: u64,
        samples_per_pixel: usize,
    ) -> TiffResult<Vec<u64>> {
        let values = if ifd.has_tag(tag) {
            tiff_reader.read_tag_values(reader, ifd, tag)?
        } else {
            vec![default]
        };

        match values.len() {
            0 => Err(TiffError::Malformed(format!("tag {} has no values", tag_utils::get_tag_name(tag)))),
            1 => Ok(vec![values[0]; samples_per_pixel]),
            n if n >= samples_per_pixel => Ok(values[..samples_per_pixel].to_vec()),
            n => Err(TiffError::Malformed(format!(
                "tag {} has {} values for {} samples", tag_utils::get_tag_name(tag), n, samples_per_pixel))),
        }
    }

    /// Pixel width of one block
    pub fn block_width(&self) -> usize {
        match self.grid {
            BlockGrid::Strips { .. } => self.width,
            BlockGrid::Tiles { tile_width, .. } => tile_width,
        }
    }

    /// Nominal pixel height of one block
    pub fn block_height(&self) -> usize {
        match self.grid {
            BlockGrid::Strips { rows_per_strip } => rows_per_strip,
            BlockGrid::Tiles { tile_height, .. } => tile_height,
        }
    }

    pub fn blocks_across(&self) -> usize {
        self.width.div_ceil(self.block_width())
    }

    pub fn blocks_down(&self) -> usize {
        self.height.div_ceil(self.block_height())
    }

    /// Number of blocks holding one band (planar) or all bands (interleaved)
    pub fn blocks_per_plane(&self) -> usize {
        self.blocks_across() * self.blocks_down()
    }

    /// Number of planes that must be read to get the RGB bands
    pub fn planes_to_read(&self) -> usize {
        if self.planar { RGB_BANDS } else { 1 }
    }

    /// Interleaved samples per pixel inside one block
    pub fn samples_per_block_pixel(&self) -> usize {
        if self.planar { 1 } else { self.samples_per_pixel }
    }

    /// Rows actually stored in block row `block_y`
    ///
    /// Tiles always hold their full height; the last strip may be shorter.
    pub fn rows_in_block(&self, block_y: usize) -> usize {
        match self.grid {
            BlockGrid::Strips { rows_per_strip } => rows_per_strip.min(self.height - block_y * rows_per_strip),
            BlockGrid::Tiles { tile_height, .. } => tile_height,
        }
    }

    /// Bytes in one row of a block
    pub fn block_row_bytes(&self) -> usize {
        self.block_width() * self.samples_per_block_pixel() * self.sample_type.bytes()
    }

    /// Tags holding the block offsets and byte counts
    pub fn block_tags(&self) -> (u16, u16) {
        match self.grid {
            BlockGrid::Strips { .. } => (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS),
            BlockGrid::Tiles { .. } => (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(grid: BlockGrid, planar: bool) -> RasterLayout {
        RasterLayout {
            width: 10,
            height: 7,
            samples_per_pixel: 4,
            sample_type: SampleType::U16,
            planar,
            compression: 1,
            predictor: 1,
            grid,
        }
    }

    #[test]
    fn strip_grid_shortens_last_strip() {
        let l = layout(BlockGrid::Strips { rows_per_strip: 3 }, false);
        assert_eq!((l.blocks_across(), l.blocks_down()), (1, 3));
        assert_eq!((l.rows_in_block(0), l.rows_in_block(2)), (3, 1));
        assert_eq!(l.block_row_bytes(), 10 * 4 * 2);
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let cube_pixel = (RGB_BANDS * std::mem::size_of::<f64>()) as u64;
        assert!(RasterLayout::check_decoded_size("image", 10_980, 10_980, cube_pixel).is_ok());
        assert!(RasterLayout::check_decoded_size("image", 1 << 20, 1 << 20, cube_pixel).is_err());
        assert!(matches!(
            RasterLayout::check_decoded_size("image", u64::MAX, u64::MAX, cube_pixel),
            Err(TiffError::Malformed(_))));
        assert!(RasterLayout::check_decoded_size("tile", u32::MAX as u64, 1, 12).is_err());
    }

    #[test]
    fn tile_grid_is_padded() {
        let l = layout(BlockGrid::Tiles { tile_width: 4, tile_height: 4 }, true);
        assert_eq!((l.blocks_across(), l.blocks_down()), (3, 2));
        assert_eq!(l.rows_in_block(1), 4);
        assert_eq!(l.block_row_bytes(), 4 * 2);
        assert_eq!(l.planes_to_read(), 3);
        assert_eq!(l.block_tags(), (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS));
    }
}
