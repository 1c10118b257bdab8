//! Band extraction from strips and tiles
//!
//! Walks every block of the main image, decompresses it, undoes the
//! predictor and scatters the first three samples of each pixel into three
//! row-major band buffers. Interleaved and planar storage share the same
//! loop; for planar data each plane holds a single band.

use log::{debug, info};
use std::io::{self, SeekFrom};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrderHandler;
use crate::io::seekable::SeekableReader;
use crate::raster::layout::{RasterLayout, RGB_BANDS};
use crate::tiff::constants::predictor;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::progress::ProgressTracker;

/// Row-major samples of the red, green and blue bands
pub type RgbBands = [Vec<f64>; RGB_BANDS];

/// Reads the RGB bands of one IFD through a shared reader
pub struct BandReader<'a> {
    tiff_reader: &'a TiffReader,
    ifd: &'a IFD,
    layout: &'a RasterLayout,
    show_progress: bool,
}

impl<'a> BandReader<'a> {
    pub fn new(tiff_reader: &'a TiffReader, ifd: &'a IFD, layout: &'a RasterLayout) -> Self {
        BandReader {
            tiff_reader,
            ifd,
            layout,
            show_progress: false,
        }
    }

    /// Draw a progress bar while decoding blocks
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Decode bands 1, 2 and 3 in full
    ///
    /// Any unreadable, short or out-of-file block fails the whole read.
    pub fn read_bands(&self, reader: &mut dyn SeekableReader) -> TiffResult<RgbBands> {
        let layout = self.layout;
        let (offsets_tag, counts_tag) = layout.block_tags();
        let offsets = self.tiff_reader.read_tag_values(reader, self.ifd, offsets_tag)?;
        let byte_counts = self.tiff_reader.read_tag_values(reader, self.ifd, counts_tag)?;

        let planes = if layout.planar { layout.samples_per_pixel } else { 1 };
        let expected_blocks = layout.blocks_per_plane() * planes;
        if offsets.len() < expected_blocks || byte_counts.len() < expected_blocks {
            return Err(TiffError::Malformed(format!(
                "expected {} blocks, found {} offsets and {} byte counts",
                expected_blocks, offsets.len(), byte_counts.len())));
        }

        let byte_order_handler = self.tiff_reader.handler()?;
        let compression_handler = CompressionFactory::create_handler(layout.compression)?;
        info!("Using compression: {}", compression_handler.name());

        let total_blocks = (layout.blocks_per_plane() * layout.planes_to_read()) as u64;
        let progress = if self.show_progress {
            ProgressTracker::new(total_blocks, "Decoding raster blocks")
        } else {
            ProgressTracker::hidden(total_blocks)
        };

        let pixel_count = layout.width * layout.height;
        let mut bands: RgbBands = [vec![0.0; pixel_count], vec![0.0; pixel_count], vec![0.0; pixel_count]];
        let mut row_samples = Vec::with_capacity(layout.block_width() * layout.samples_per_block_pixel());

        for plane in 0..layout.planes_to_read() {
            for block_y in 0..layout.blocks_down() {
                for block_x in 0..layout.blocks_across() {
                    let index = plane * layout.blocks_per_plane() + block_y * layout.blocks_across() + block_x;
                    let block = self.read_block(
                        reader, index, offsets[index], byte_counts[index],
                        &*compression_handler, byte_order_handler, block_y)?;

                    self.scatter_block(&block, byte_order_handler, plane, block_x, block_y, &mut bands, &mut row_samples);
                    progress.increment(1);
                }
            }
        }

        progress.finish();
        debug!("Decoded {} block(s) into {} pixels per band", progress.position(), pixel_count);
        Ok(bands)
    }

    /// Read, decompress and un-predict one block
    fn read_block(
        &self,
        reader: &mut dyn SeekableReader,
        index: usize,
        offset: u64,
        byte_count: u64,
        compression_handler: &dyn CompressionHandler,
        byte_order_handler: &dyn ByteOrderHandler,
        block_y: usize,
    ) -> TiffResult<Vec<u8>> {
        let layout = self.layout;
        debug!("Reading block {} at offset {} with {} bytes", index, offset, byte_count);

        let file_size = self.tiff_reader.file_size();
        if offset.checked_add(byte_count).map_or(true, |end| end > file_size) {
            return Err(TiffError::IoError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("block {} ({} bytes at offset {}) extends past end of file ({} bytes)",
                        index, byte_count, offset, file_size))));
        }

        reader.seek(SeekFrom::Start(offset))?;
        let mut compressed_data = vec![0u8; byte_count as usize];
        reader.read_exact(&mut compressed_data)?;

        let mut block = compression_handler.decompress(&compressed_data)?;

        let row_bytes = layout.block_row_bytes();
        let needed = row_bytes * layout.rows_in_block(block_y);
        if block.len() < needed {
            return Err(TiffError::Malformed(format!(
                "block {} decompressed to {} bytes, expected {}", index, block.len(), needed)));
        }

        if layout.predictor == predictor::HORIZONTAL_DIFFERENCING {
            for row in block[..needed].chunks_exact_mut(row_bytes) {
                byte_order_handler.undo_horizontal_differencing(row, layout.sample_type, layout.samples_per_block_pixel());
            }
        }

        Ok(block)
    }

    /// Copy the RGB samples of a decoded block into the band buffers
    fn scatter_block(
        &self,
        block: &[u8],
        byte_order_handler: &dyn ByteOrderHandler,
        plane: usize,
        block_x: usize,
        block_y: usize,
        bands: &mut RgbBands,
        row_samples: &mut Vec<f64>,
    ) {
        let layout = self.layout;
        let row_bytes = layout.block_row_bytes();
        let stride = layout.samples_per_block_pixel();
        let x0 = block_x * layout.block_width();
        let y0 = block_y * layout.block_height();
        let columns = layout.block_width().min(layout.width - x0);

        for (r, row) in block.chunks_exact(row_bytes).take(layout.rows_in_block(block_y)).enumerate() {
            let y = y0 + r;
            if y >= layout.height {
                break;
            }

            row_samples.clear();
            byte_order_handler.decode_samples(row, layout.sample_type, row_samples);

            let band_row = y * layout.width + x0;
            if layout.planar {
                bands[plane][band_row..band_row + columns].copy_from_slice(&row_samples[..columns]);
            } else {
                for (band, samples) in bands.iter_mut().enumerate() {
                    for x in 0..columns {
                        samples[band_row + x] = row_samples[x * stride + band];
                    }
                }
            }
        }
    }
}
