//! Handler for PackBits compressed data
//!
//! PackBits is a byte-oriented run-length code: a signed header byte `n`
//! is followed either by `n + 1` literal bytes (0..=127) or by one byte
//! repeated `1 - n` times (-127..=-1). -128 is a no-op.

use std::io;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Longest literal or replicate run a single header can describe
const MAX_RUN: usize = 128;

/// A run header whose data was cut off
fn truncated(run: &str) -> TiffError {
    TiffError::IoError(io::Error::new(
        io::ErrorKind::InvalidData, format!("PackBits {} run past end of data", run)))
}

/// PackBits compression handler (compression code 32773)
pub struct PackBitsHandler;

impl CompressionHandler for PackBitsHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut pos = 0;

        while pos < data.len() {
            let n = data[pos] as i8;
            pos += 1;

            if n >= 0 {
                let len = n as usize + 1;
                let literal = data.get(pos..pos + len)
                    .ok_or_else(|| truncated("literal"))?;
                out.extend_from_slice(literal);
                pos += len;
            } else if n != -128 {
                let value = *data.get(pos)
                    .ok_or_else(|| truncated("replicate"))?;
                out.resize(out.len() + (1 - n as isize) as usize, value);
                pos += 1;
            }
        }

        Ok(out)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
        let mut pos = 0;

        while pos < data.len() {
            let run = data[pos..].iter()
                .take(MAX_RUN)
                .take_while(|b| **b == data[pos])
                .count();

            if run >= 3 {
                out.push((1 - run as isize) as i8 as u8);
                out.push(data[pos]);
                pos += run;
                continue;
            }

            // literal run up to the next stretch of three equal bytes
            let start = pos;
            while pos < data.len() && pos - start < MAX_RUN {
                if pos + 2 < data.len() && data[pos] == data[pos + 1] && data[pos] == data[pos + 2] {
                    break;
                }
                pos += 1;
            }
            out.push((pos - start - 1) as u8);
            out.extend_from_slice(&data[start..pos]);
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "PackBits"
    }

    fn code(&self) -> u64 {
        32773
    }
}
