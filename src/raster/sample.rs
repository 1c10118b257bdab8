//! Sample type resolution and decoding
//!
//! Decompressed TIFF blocks are packed runs of samples whose width and
//! interpretation come from the BitsPerSample and SampleFormat tags. This
//! module turns those runs into `f64` values so every supported type is
//! represented exactly in the pixel cube.

use byteorder::ByteOrder as Endian;

use crate::tiff::constants::sample_format;

/// Numeric type of a single band sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolve a sample type from the SampleFormat and BitsPerSample tag values
    ///
    /// Returns None for layouts the ingestor does not decode (1-bit, 12-bit,
    /// complex, 64-bit integer, ...).
    pub fn from_tags(format: u16, bits: u16) -> Option<Self> {
        match (format, bits) {
            (sample_format::UNSIGNED, 8) => Some(SampleType::U8),
            (sample_format::UNSIGNED, 16) => Some(SampleType::U16),
            (sample_format::UNSIGNED, 32) => Some(SampleType::U32),
            (sample_format::SIGNED, 8) => Some(SampleType::I8),
            (sample_format::SIGNED, 16) => Some(SampleType::I16),
            (sample_format::SIGNED, 32) => Some(SampleType::I32),
            (sample_format::IEEEFP, 32) => Some(SampleType::F32),
            (sample_format::IEEEFP, 64) => Some(SampleType::F64),
            _ => None,
        }
    }

    /// Size of one sample in bytes
    pub fn bytes(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, SampleType::F32 | SampleType::F64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::U16 => "uint16",
            SampleType::U32 => "uint32",
            SampleType::I8 => "int8",
            SampleType::I16 => "int16",
            SampleType::I32 => "int32",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        }
    }
}

/// Decode packed samples in byte order `B`, appending them to `out`
///
/// Trailing bytes that do not form a whole sample are ignored.
pub fn decode_into<B: Endian>(bytes: &[u8], sample_type: SampleType, out: &mut Vec<f64>) {
    let size = sample_type.bytes();
    out.reserve(bytes.len() / size);

    for chunk in bytes.chunks_exact(size) {
        let value = match sample_type {
            SampleType::U8 => chunk[0] as f64,
            SampleType::I8 => chunk[0] as i8 as f64,
            SampleType::U16 => B::read_u16(chunk) as f64,
            SampleType::I16 => B::read_i16(chunk) as f64,
            SampleType::U32 => B::read_u32(chunk) as f64,
            SampleType::I32 => B::read_i32(chunk) as f64,
            SampleType::F32 => B::read_f32(chunk) as f64,
            SampleType::F64 => B::read_f64(chunk),
        };
        out.push(value);
    }
}

/// Reverse TIFF predictor 2 on one row of packed integer samples
///
/// Each sample was stored as the difference from the sample `stride`
/// positions before it; addition wraps at the sample width, which gives the
/// same bits for signed and unsigned types.
pub fn undo_differencing<B: Endian>(row: &mut [u8], sample_type: SampleType, stride: usize) {
    let size = sample_type.bytes();
    let count = row.len() / size;

    for i in stride..count {
        let cur = i * size;
        let prev = (i - stride) * size;

        match size {
            1 => row[cur] = row[cur].wrapping_add(row[prev]),
            2 => {
                let value = B::read_u16(&row[cur..]).wrapping_add(B::read_u16(&row[prev..]));
                B::write_u16(&mut row[cur..cur + 2], value);
            }
            4 => {
                let value = B::read_u32(&row[cur..]).wrapping_add(B::read_u32(&row[prev..]));
                B::write_u32(&mut row[cur..cur + 4], value);
            }
            _ => {
                let value = B::read_u64(&row[cur..]).wrapping_add(B::read_u64(&row[prev..]));
                B::write_u64(&mut row[cur..cur + 8], value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn resolves_supported_layouts_only() {
        assert_eq!(SampleType::from_tags(1, 8), Some(SampleType::U8));
        assert_eq!(SampleType::from_tags(2, 16), Some(SampleType::I16));
        assert_eq!(SampleType::from_tags(3, 32), Some(SampleType::F32));
        assert_eq!(SampleType::from_tags(1, 12), None);
        assert_eq!(SampleType::from_tags(3, 16), None);
        assert_eq!(SampleType::from_tags(5, 32), None);
    }

    #[test]
    fn decodes_signed_and_unsigned_words() {
        let bytes = [0xFF, 0xFE, 0x01, 0x00];
        let mut out = Vec::new();
        decode_into::<BigEndian>(&bytes, SampleType::I16, &mut out);
        assert_eq!(out, vec![-2.0, 256.0]);

        out.clear();
        decode_into::<LittleEndian>(&bytes, SampleType::U16, &mut out);
        assert_eq!(out, vec![65279.0, 1.0]);
    }

    #[test]
    fn decodes_floats() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-300.25f32).to_le_bytes());
        let mut out = Vec::new();
        decode_into::<LittleEndian>(&bytes, SampleType::F32, &mut out);
        assert_eq!(out, vec![1.5, -300.25]);
    }

    #[test]
    fn undoes_differencing_for_interleaved_bytes() {
        // two RGB pixels: (10, 20, 30) then (+1, +2, +3)
        let mut row = vec![10, 20, 30, 1, 2, 3];
        undo_differencing::<LittleEndian>(&mut row, SampleType::U8, 3);
        assert_eq!(row, vec![10, 20, 30, 11, 22, 33]);
    }

    #[test]
    fn undoes_differencing_for_big_endian_words() {
        let mut row = vec![0x01, 0x00, 0x00, 0x05, 0xFF, 0xFF];
        undo_differencing::<BigEndian>(&mut row, SampleType::U16, 1);
        let mut out = Vec::new();
        decode_into::<BigEndian>(&row, SampleType::U16, &mut out);
        assert_eq!(out, vec![256.0, 261.0, 260.0]);
    }
}
