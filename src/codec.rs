//! The codec facade: one [`FormatDescriptor`] bound to its lookup tables.
//!
//! Encoding through a [`Codec`] takes the fast path: round the input to the nearest `f16`, then
//! index the 65536-entry encode table with its bit pattern. Values that round to an infinite
//! `f16` bypass the table and go straight to the clamp code. Decoding is a single index into the
//! decode table.
//!
//! The tables are materialized on first use, exactly once per codec, through a [`OnceLock`]. For
//! the standard formats they are inflated from zlib payloads embedded at build time; for any other
//! format they are built in-process from the authoritative encoder.

use core::fmt;
use std::sync::OnceLock;

use half::f16;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::format::{FormatDescriptor, OverflowPolicy};
use crate::table::{self, ENCODE_TABLE_LEN};
use crate::{BitSeq, BitSlice};

/// Compressed tables for one format, as produced by the build script.
pub(crate) struct Payload {
  pub(crate) format: FormatDescriptor,
  /// zlib stream of the decode table as little-endian `f32`s.
  pub(crate) decode: &'static [u8],
  /// zlib stream of the encode table, one byte per `f16` bit pattern.
  pub(crate) encode: &'static [u8],
}

include!(concat!(env!("OUT_DIR"), "/payloads.rs"));

/// The materialized tables of a codec. Immutable once built.
struct Tables {
  decode: Box<[f64]>,
  encode: Box<[u8]>,
}

impl Tables {
  fn load(format: &FormatDescriptor) -> Self {
    match PAYLOADS.iter().find(|payload| payload.format == *format) {
      Some(payload) => {
        debug!(%format, "inflating embedded lookup tables");
        // The payloads are constants compiled into the crate; there is nothing to retry.
        Self::inflate(payload)
          .unwrap_or_else(|err| panic!("cannot initialize lookup tables for {format}: {err}"))
      }
      None => {
        debug!(%format, "no embedded lookup tables, building them");
        Self::build(format)
      }
    }
  }

  fn build(format: &FormatDescriptor) -> Self {
    Self {
      decode: table::build_decode_table(format).into_boxed_slice(),
      encode: table::build_encode_table(format).into_boxed_slice(),
    }
  }

  fn inflate(payload: &Payload) -> Result<Self> {
    let format = &payload.format;
    let decode_bytes = table::decompress(payload.decode, 4 * format.code_count())
      .map_err(|source| Error::CorruptTable { message: format!("decode table of {format}"), source: Some(source) })?;
    let encode = table::decompress(payload.encode, ENCODE_TABLE_LEN)
      .map_err(|source| Error::CorruptTable { message: format!("encode table of {format}"), source: Some(source) })?;
    let decode = table::decode_table_from_bytes(&decode_bytes);

    // A payload can inflate to the right length and still belong to another format.
    if let Some(&code) = encode.iter().find(|&&code| usize::from(code) >= format.code_count()) {
      return Err(Error::corrupt(format!("encode table of {format} contains code point {code}")))
    }
    trace!(%format, decode = decode.len(), encode = encode.len(), "inflated lookup tables");
    Ok(Self { decode: decode.into_boxed_slice(), encode: encode.into_boxed_slice() })
  }
}

/// A micro-float format together with its (lazily materialized) lookup tables.
///
/// Codecs for the standard formats are provided as `static`s at the crate root, e.g.
/// [`crate::E4M3_SATURATE`]. A codec for any other format can be made with [`Codec::new`].
///
/// ```
/// # use microfloat::{Codec, E2M1};
/// assert_eq!(E2M1.to_code(1.5), 0b0_01_1);
/// assert_eq!(E2M1.to_float(0b1_11_1).unwrap(), -6.0);
/// assert!(E2M1.to_float(0b1_0000).is_err());
/// ```
pub struct Codec {
  format: FormatDescriptor,
  tables: OnceLock<Tables>,
}

impl Codec {
  /// Bind `format` to a codec. No tables are materialized until the first conversion.
  pub const fn new(format: FormatDescriptor) -> Self {
    Self { format, tables: OnceLock::new() }
  }

  /// The format of this codec.
  #[inline]
  pub const fn format(&self) -> &FormatDescriptor {
    &self.format
  }

  #[inline]
  fn tables(&self) -> &Tables {
    self.tables.get_or_init(|| Tables::load(&self.format))
  }

  /// Convert `x` to a code point via the fast path.
  ///
  /// Gives the same result as [`FormatDescriptor::encode`] applied to `x` rounded to the nearest
  /// `f16`. In particular, the result agrees with the authoritative encoder for every value that
  /// is exactly representable as an `f16`.
  pub fn to_code(&self, x: f64) -> u8 {
    let half = f16::from_f64(x);
    if half.is_infinite() {
      return self.format.clamp(half.is_sign_negative())
    }
    self.tables().encode[usize::from(half.to_bits())]
  }

  /// Convert `x` to a code point via the authoritative (table-free) encoder. Slower than
  /// [`Self::to_code`], but does not round through `f16` first.
  #[inline]
  pub fn to_code_exact(&self, x: f64) -> u8 {
    self.format.encode(x)
  }

  /// The value of code point `code`.
  ///
  /// Codes with a zero exponent field decode to a zero of their sign; every other code,
  /// including those the 8-bit MX formats reserve for inf/NaN, decodes to the arithmetic value
  /// of its bits. Codes at or above `2^(1 + E + M)` are an error.
  pub fn to_float(&self, code: u8) -> Result<f64> {
    self.tables().decode.get(usize::from(code)).copied()
      .ok_or(Error::CodeOutOfRange { code, count: self.format.code_count(), format: self.format })
  }

  /// Encode `x` (via [`Self::to_code`]) as a bit pattern exactly [`FormatDescriptor::width`]
  /// bits long, most significant bit first.
  pub fn to_bits(&self, x: f64) -> BitSeq {
    let code = self.to_code(x);
    let width = self.format.width();
    (0 .. width).rev().map(|i| (code >> i) & 1 == 1).collect()
  }

  /// Decode a bit pattern, most significant bit first. Its length must be exactly
  /// [`FormatDescriptor::width`].
  pub fn from_bits(&self, bits: &BitSlice) -> Result<f64> {
    let width = self.format.width();
    if bits.len() != width as usize {
      return Err(Error::WidthMismatch { len: bits.len(), width, format: self.format })
    }
    let code = bits.iter().by_vals().fold(0u8, |acc, bit| acc << 1 | u8::from(bit));
    self.to_float(code)
  }

  /// The decode table: the value of every code point, indexed by code point.
  pub fn decode_table(&self) -> &[f64] {
    &self.tables().decode
  }

  /// The fast-path encode table: a code point for every `f16` bit pattern.
  pub fn encode_table(&self) -> &[u8] {
    &self.tables().encode
  }

  /// Whether the tables of this codec have been materialized yet.
  pub fn is_initialized(&self) -> bool {
    self.tables.get().is_some()
  }
}

impl fmt::Debug for Codec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Codec")
      .field("format", &self.format)
      .field("initialized", &self.is_initialized())
      .finish()
  }
}
