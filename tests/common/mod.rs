//! Synthetic GeoTIFF files for integration tests

#![allow(dead_code)]

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fs;
use std::path::{Path, PathBuf};

use rasteroverlay::compression::{CompressionFactory, CompressionHandler};

/// Sample encoding of every band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    U8,
    U16,
    I16,
    F32,
}

impl Sample {
    fn bytes(self) -> usize {
        match self {
            Sample::U8 => 1,
            Sample::U16 | Sample::I16 => 2,
            Sample::F32 => 4,
        }
    }

    fn format(self) -> u16 {
        match self {
            Sample::U8 | Sample::U16 => 1,
            Sample::I16 => 2,
            Sample::F32 => 3,
        }
    }
}

/// Builder for a single-IFD GeoTIFF
#[derive(Debug, Clone)]
pub struct GeoTiffFixture {
    pub width: usize,
    pub height: usize,
    pub bands: usize,
    pub sample: Sample,
    pub big_endian: bool,
    pub big_tiff: bool,
    pub planar: bool,
    pub tile: Option<(usize, usize)>,
    pub rows_per_strip: usize,
    pub compression: u16,
    pub predictor: u16,
    pub pixel_scale: Option<[f64; 3]>,
    pub tie_point: Option<[f64; 6]>,
    pub transformation: Option<[f64; 16]>,
    /// Added to every declared block byte count, making the file shorter than its tags claim
    pub inflate_byte_counts: u64,
    /// Width and height written to the tags in place of the real ones
    pub declared_size: Option<(u32, u32)>,
    /// GeoKey (id, inline value) pairs
    pub geo_keys: Vec<(u16, u16)>,
    /// Pixel-interleaved samples, `height * width * bands` values
    pub data: Vec<f64>,
}

impl GeoTiffFixture {
    /// An 8-bit RGB raster covering `bounds` = (left, bottom, right, top) in EPSG:4326
    pub fn rgb(width: usize, height: usize, bounds: (f64, f64, f64, f64)) -> Self {
        let (left, bottom, right, top) = bounds;
        let data = (0..height * width * 3).map(|i| (i % 256) as f64).collect();
        GeoTiffFixture {
            width,
            height,
            bands: 3,
            sample: Sample::U8,
            big_endian: false,
            big_tiff: false,
            planar: false,
            tile: None,
            rows_per_strip: height,
            compression: 1,
            predictor: 1,
            pixel_scale: Some([(right - left) / width as f64, (top - bottom) / height as f64, 0.0]),
            tie_point: Some([0.0, 0.0, 0.0, left, top, 0.0]),
            transformation: None,
            inflate_byte_counts: 0,
            declared_size: None,
            geo_keys: vec![(1024, 2), (1025, 1), (2048, 4326)],
            data,
        }
    }

    pub fn with_data(mut self, sample: Sample, bands: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), self.width * self.height * bands);
        self.sample = sample;
        self.bands = bands;
        self.data = data;
        self
    }

    /// Value of band `band` at (`x`, `y`)
    pub fn value(&self, x: usize, y: usize, band: usize) -> f64 {
        self.data[(y * self.width + x) * self.bands + band]
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.encode()).unwrap();
        path
    }

    /// Encode the whole file
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Out { buf: Vec::new(), big: self.big_endian };

        out.buf.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        if self.big_tiff {
            out.u16(43);
            out.u16(8);
            out.u16(0);
            out.u64(0);
        } else {
            out.u16(42);
            out.u32(0);
        }

        let (offsets, counts) = self.write_blocks(&mut out);
        let entries = self.entries(&out, &offsets, &counts);

        // Out-of-line values first, then the IFD itself
        let value_field = if self.big_tiff { 8 } else { 4 };
        let mut placed = Vec::with_capacity(entries.len());
        for (tag, field_type, count, bytes) in entries {
            if bytes.len() <= value_field {
                let mut inline = bytes;
                inline.resize(value_field, 0);
                placed.push((tag, field_type, count, inline));
            } else {
                out.align();
                let offset = out.buf.len() as u64;
                out.buf.extend_from_slice(&bytes);
                placed.push((tag, field_type, count, out.offset_bytes(offset, self.big_tiff)));
            }
        }

        out.align();
        let ifd_offset = out.buf.len() as u64;
        if self.big_tiff {
            out.u64(placed.len() as u64);
        } else {
            out.u16(placed.len() as u16);
        }
        for (tag, field_type, count, value) in &placed {
            out.u16(*tag);
            out.u16(*field_type);
            if self.big_tiff {
                out.u64(*count);
            } else {
                out.u32(*count as u32);
            }
            out.buf.extend_from_slice(value);
        }
        if self.big_tiff {
            out.u64(0);
        } else {
            out.u32(0);
        }

        if self.big_tiff {
            out.patch_u64(8, ifd_offset);
        } else {
            out.patch_u32(4, ifd_offset as u32);
        }
        out.buf
    }

    fn block_size(&self) -> (usize, usize) {
        self.tile.unwrap_or((self.width, self.rows_per_strip))
    }

    fn write_blocks(&self, out: &mut Out) -> (Vec<u64>, Vec<u64>) {
        let (block_w, block_h) = self.block_size();
        let across = self.width.div_ceil(block_w);
        let down = self.height.div_ceil(block_h);
        let planes = if self.planar { self.bands } else { 1 };
        let stride = if self.planar { 1 } else { self.bands };
        let handler = CompressionFactory::create_handler(self.compression as u64).unwrap();

        let mut offsets = Vec::new();
        let mut counts = Vec::new();
        for plane in 0..planes {
            for by in 0..down {
                for bx in 0..across {
                    let rows = if self.tile.is_some() { block_h } else { block_h.min(self.height - by * block_h) };
                    let mut raw = Vec::new();
                    for r in 0..rows {
                        let mut row = Vec::new();
                        for c in 0..block_w {
                            let (x, y) = (bx * block_w + c, by * block_h + r);
                            for s in 0..stride {
                                let band = if self.planar { plane } else { s };
                                let v = if x < self.width && y < self.height { self.value(x, y, band) } else { 0.0 };
                                self.push_sample(&mut row, v);
                            }
                        }
                        if self.predictor == 2 {
                            self.apply_differencing(&mut row, stride);
                        }
                        raw.extend_from_slice(&row);
                    }

                    let encoded = handler.compress(&raw).unwrap();
                    offsets.push(out.buf.len() as u64);
                    counts.push(encoded.len() as u64);
                    out.buf.extend_from_slice(&encoded);
                }
            }
        }
        (offsets, counts)
    }

    fn push_sample(&self, row: &mut Vec<u8>, v: f64) {
        let mut bytes = [0u8; 4];
        let n = self.sample.bytes();
        match (self.sample, self.big_endian) {
            (Sample::U8, _) => bytes[0] = v as u8,
            (Sample::U16, false) => LittleEndian::write_u16(&mut bytes, v as u16),
            (Sample::U16, true) => BigEndian::write_u16(&mut bytes, v as u16),
            (Sample::I16, false) => LittleEndian::write_i16(&mut bytes, v as i16),
            (Sample::I16, true) => BigEndian::write_i16(&mut bytes, v as i16),
            (Sample::F32, false) => LittleEndian::write_f32(&mut bytes, v as f32),
            (Sample::F32, true) => BigEndian::write_f32(&mut bytes, v as f32),
        }
        row.extend_from_slice(&bytes[..n]);
    }

    /// Forward predictor 2 on one row of integer samples
    fn apply_differencing(&self, row: &mut [u8], stride: usize) {
        let size = self.sample.bytes();
        let count = row.len() / size;
        for i in (stride..count).rev() {
            let (cur, prev) = (i * size, (i - stride) * size);
            match size {
                1 => row[cur] = row[cur].wrapping_sub(row[prev]),
                _ if self.big_endian => {
                    let v = BigEndian::read_u16(&row[cur..]).wrapping_sub(BigEndian::read_u16(&row[prev..]));
                    BigEndian::write_u16(&mut row[cur..cur + 2], v);
                }
                _ => {
                    let v = LittleEndian::read_u16(&row[cur..]).wrapping_sub(LittleEndian::read_u16(&row[prev..]));
                    LittleEndian::write_u16(&mut row[cur..cur + 2], v);
                }
            }
        }
    }

    /// (tag, type, count, value bytes) sorted by tag
    fn entries(&self, out: &Out, offsets: &[u64], counts: &[u64]) -> Vec<(u16, u16, u64, Vec<u8>)> {
        let bands = self.bands;
        let (width, height) = self.declared_size.unwrap_or((self.width as u32, self.height as u32));
        let mut entries = vec![
            (256, 4, 1, out.u32_bytes(&[width])),
            (257, 4, 1, out.u32_bytes(&[height])),
            (258, 3, bands as u64, out.u16_bytes(&vec![(self.sample.bytes() * 8) as u16; bands])),
            (259, 3, 1, out.u16_bytes(&[self.compression])),
            (262, 3, 1, out.u16_bytes(&[if bands >= 3 { 2 } else { 1 }])),
            (277, 3, 1, out.u16_bytes(&[bands as u16])),
            (284, 3, 1, out.u16_bytes(&[if self.planar { 2 } else { 1 }])),
            (339, 3, bands as u64, out.u16_bytes(&vec![self.sample.format(); bands])),
        ];

        let (offsets_tag, counts_tag) = match self.tile {
            Some((tw, th)) => {
                entries.push((322, 4, 1, out.u32_bytes(&[tw as u32])));
                entries.push((323, 4, 1, out.u32_bytes(&[th as u32])));
                (324, 325)
            }
            None => {
                let rows = self.declared_size.map_or(self.rows_per_strip as u32, |(_, h)| h);
                entries.push((278, 4, 1, out.u32_bytes(&[rows])));
                (273, 279)
            }
        };
        let long_type = if self.big_tiff { 16 } else { 4 };
        entries.push((offsets_tag, long_type, offsets.len() as u64, out.offsets_bytes(offsets, self.big_tiff)));
        let declared: Vec<u64> = counts.iter().map(|c| c + self.inflate_byte_counts).collect();
        entries.push((counts_tag, long_type, counts.len() as u64, out.offsets_bytes(&declared, self.big_tiff)));

        if self.predictor != 1 {
            entries.push((317, 3, 1, out.u16_bytes(&[self.predictor])));
        }
        if let Some(scale) = self.pixel_scale {
            entries.push((33550, 12, 3, out.f64_bytes(&scale)));
        }
        if let Some(tie) = self.tie_point {
            entries.push((33922, 12, 6, out.f64_bytes(&tie)));
        }
        if let Some(matrix) = self.transformation {
            entries.push((34264, 12, 16, out.f64_bytes(&matrix)));
        }
        if !self.geo_keys.is_empty() {
            let mut directory = vec![1, 1, 0, self.geo_keys.len() as u16];
            for &(key, value) in &self.geo_keys {
                directory.extend_from_slice(&[key, 0, 1, value]);
            }
            entries.push((34735, 3, directory.len() as u64, out.u16_bytes(&directory)));
        }

        entries.sort_by_key(|e| e.0);
        entries
    }
}

/// Byte sink in the fixture's byte order
struct Out {
    buf: Vec<u8>,
    big: bool,
}

impl Out {
    fn u16(&mut self, v: u16) {
        let bytes = self.u16_bytes(&[v]);
        self.buf.extend_from_slice(&bytes);
    }

    fn u32(&mut self, v: u32) {
        let bytes = self.u32_bytes(&[v]);
        self.buf.extend_from_slice(&bytes);
    }

    fn u64(&mut self, v: u64) {
        let bytes = self.u64_bytes(&[v]);
        self.buf.extend_from_slice(&bytes);
    }

    fn align(&mut self) {
        if self.buf.len() % 2 == 1 {
            self.buf.push(0);
        }
    }

    fn patch_u32(&mut self, at: usize, v: u32) {
        let bytes = self.u32_bytes(&[v]);
        self.buf[at..at + 4].copy_from_slice(&bytes);
    }

    fn patch_u64(&mut self, at: usize, v: u64) {
        let bytes = self.u64_bytes(&[v]);
        self.buf[at..at + 8].copy_from_slice(&bytes);
    }

    fn offset_bytes(&self, offset: u64, big_tiff: bool) -> Vec<u8> {
        self.offsets_bytes(&[offset], big_tiff)
    }

    /// LONG8 values for BigTIFF, LONG otherwise
    fn offsets_bytes(&self, values: &[u64], big_tiff: bool) -> Vec<u8> {
        if big_tiff {
            self.u64_bytes(values)
        } else {
            self.u32_bytes(&values.iter().map(|&v| v as u32).collect::<Vec<_>>())
        }
    }

    fn u16_bytes(&self, values: &[u16]) -> Vec<u8> {
        let mut bytes = vec![0u8; values.len() * 2];
        if self.big {
            BigEndian::write_u16_into(values, &mut bytes);
        } else {
            LittleEndian::write_u16_into(values, &mut bytes);
        }
        bytes
    }

    fn u32_bytes(&self, values: &[u32]) -> Vec<u8> {
        let mut bytes = vec![0u8; values.len() * 4];
        if self.big {
            BigEndian::write_u32_into(values, &mut bytes);
        } else {
            LittleEndian::write_u32_into(values, &mut bytes);
        }
        bytes
    }

    fn u64_bytes(&self, values: &[u64]) -> Vec<u8> {
        let mut bytes = vec![0u8; values.len() * 8];
        if self.big {
            BigEndian::write_u64_into(values, &mut bytes);
        } else {
            LittleEndian::write_u64_into(values, &mut bytes);
        }
        bytes
    }

    fn f64_bytes(&self, values: &[f64]) -> Vec<u8> {
        let mut bytes = vec![0u8; values.len() * 8];
        if self.big {
            BigEndian::write_f64_into(values, &mut bytes);
        } else {
            LittleEndian::write_f64_into(values, &mut bytes);
        }
        bytes
    }
}
