//! Lookup tables: the dense decode table (code point → `f64`) and the dense fast-path encode
//! table (`f16` bit pattern → code point), plus the (de)serialization and zlib (de)compression
//! used to ship them.
//!
//! The build script runs the builders and compression for every standard format and embeds the
//! payloads; at runtime the payloads are inflated once per format (see `Codec`).
//!
//! Shared with the build script, like the `format` module.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use half::f16;

use crate::format::FormatDescriptor;

/// Number of entries in an encode table: one per `f16` bit pattern.
pub const ENCODE_TABLE_LEN: usize = 1 << 16;

/// Build the table mapping every code point of `format` to its value.
///
/// A nonzero exponent field `e` gives `±(1 + m/2^M) · 2^(e - B)`; an exponent field of 0 gives
/// a zero with the code's sign. Reserved (inf/NaN) code points of the 8-bit MX formats are *not*
/// special-cased: they decode to the arithmetic value of their bits.
pub fn build_decode_table(format: &FormatDescriptor) -> Vec<f64> {
  (0 .. format.code_count())
    .map(|code| {
      let (negative, exponent, mantissa) = format.fields(code as u8);
      let magnitude = if exponent == 0 { 0.0 } else { format.magnitude(exponent, mantissa) };
      if negative { -magnitude } else { magnitude }
    })
    .collect()
}

/// Build the table mapping every `f16` bit pattern to the code point that
/// [`FormatDescriptor::encode`] gives for its value.
pub fn build_encode_table(format: &FormatDescriptor) -> Vec<u8> {
  (0 ..= u16::MAX)
    .map(|bits| format.encode(f16::from_bits(bits).to_f64()))
    .collect()
}

/// Serialize a decode table as a flat array of little-endian `f32`s. Every value of every
/// supported format is exactly representable as an `f32`.
pub fn decode_table_bytes(table: &[f64]) -> Vec<u8> {
  table.iter()
    .flat_map(|&value| {
      debug_assert_eq!(value as f32 as f64, value);
      (value as f32).to_le_bytes()
    })
    .collect()
}

/// Inverse of [`decode_table_bytes`]. Trailing bytes that do not make up a whole `f32` are
/// ignored; callers check the length beforehand.
pub fn decode_table_from_bytes(bytes: &[u8]) -> Vec<f64> {
  bytes.chunks_exact(4)
    .map(|chunk| f64::from(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])))
    .collect()
}

/// Compress a serialized table with zlib.
pub fn compress(bytes: &[u8]) -> io::Result<Vec<u8>> {
  let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
  encoder.write_all(bytes)?;
  encoder.finish()
}

/// Inflate a zlib payload that is expected to hold exactly `expected_len` bytes.
///
/// Reads at most one byte past `expected_len`, so an oversized payload is detected without
/// inflating all of it.
pub fn decompress(payload: &[u8], expected_len: usize) -> io::Result<Vec<u8>> {
  let mut out = Vec::with_capacity(expected_len);
  ZlibDecoder::new(payload)
    .take(expected_len as u64 + 1)
    .read_to_end(&mut out)?;
  if out.len() != expected_len {
    return Err(io::Error::new(
      io::ErrorKind::InvalidData,
      format!("inflated to {} bytes, expected {expected_len}", out.len()),
    ))
  }
  Ok(out)
}
