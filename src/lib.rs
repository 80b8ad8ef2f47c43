//! This crate converts between `f64` and the compact floating point formats used in quantized
//! numeric workloads: the 8-bit "binary8" formats, and the 4-, 6- and 8-bit micro-scaling (MX)
//! formats.
//!
//! # Introduction
//!
//! A micro-float is a tiny IEEE-style float: a sign bit, `E` exponent bits and `M` mantissa bits,
//! with an exponent bias `B`. The layouts supported here are described by a
//! [`FormatDescriptor`]; the conversions themselves go through a [`Codec`].
//!
//! The following references are useful if you are not yet familiar with these formats:
//!
//!   - [8-bit numerical formats for deep neural networks](https://arxiv.org/abs/2206.02915)
//!     (the binary8 `p3` and `p4` formats)
//!   - [OCP Microscaling Formats (MX) v1.0](https://www.opencompute.org/documents/ocp-microscaling-formats-mx-v1-0-spec-final-pdf)
//!     (E2M1, E2M3, E3M2, E4M3, E5M2 and the E8M0 scale)
//!
//! Some behaviours are fixed for bit-compatibility with existing encoders, and differ from what
//! a general float conversion would do:
//!
//!   - The mantissa is **truncated** toward zero, not rounded to nearest.
//!   - There are no subnormals: an exponent field of 0 is zero, and small values flush to zero.
//!   - NaN always encodes to the single code with the sign bit set and all else zero.
//!   - Overflow is never an error; it gives the format's clamp code, which depends on its
//!     [`OverflowPolicy`].
//!
//! # Usage
//!
//! ```
//! use microfloat::{E2M1, E4M3_SATURATE, E4M3_WRAP, bits_from_token};
//!
//! // Encode via the fast table path, decode via the decode table.
//! let code = E4M3_SATURATE.to_code(3.14);
//! assert_eq!(code, 0b0_1000_100);
//! assert_eq!(E4M3_SATURATE.to_float(code).unwrap(), 3.0);
//!
//! // Overflow clamps according to the policy.
//! assert_eq!(E4M3_SATURATE.to_code(1000.0), 0x7e);  // 448
//! assert_eq!(E4M3_WRAP.to_code(1000.0), 0xff);  // NaN
//!
//! // Read a code point from a bit literal.
//! let bits = bits_from_token("0b0111").unwrap();
//! assert_eq!(E2M1.from_bits(&bits).unwrap(), 6.0);
//! ```
//!
//! # Performance
//!
//! [`Codec::to_code`] and [`Codec::to_float`] are a table lookup each. The tables of the standard
//! formats are built when the crate is compiled and embedded compressed; each is inflated the
//! first time its codec is used. The authoritative encoder, [`FormatDescriptor::encode`], needs no
//! tables at all.

mod codec;
mod encode;
mod error;
mod format;
mod scale;
mod table;
mod token;

pub use codec::Codec;
pub use error::{Error, Result};
pub use format::{FormatDescriptor, InvalidFormat, OverflowPolicy};
pub use scale::E8M0;
pub use table::{
  ENCODE_TABLE_LEN,
  build_decode_table,
  build_encode_table,
  compress,
  decode_table_bytes,
  decode_table_from_bytes,
  decompress,
};
pub use token::{Radix, bits_from_token};

/// An owned sequence of bits, most significant first.
pub type BitSeq = bitvec::vec::BitVec<u8, bitvec::order::Msb0>;

/// A borrowed sequence of bits, most significant first.
pub type BitSlice = bitvec::slice::BitSlice<u8, bitvec::order::Msb0>;

/// binary8 `p4` (4 exponent bits, 3 mantissa bits, bias 8).
pub static P4BINARY: Codec = Codec::new(FormatDescriptor::P4BINARY);

/// binary8 `p3` (5 exponent bits, 2 mantissa bits, bias 16).
pub static P3BINARY: Codec = Codec::new(FormatDescriptor::P3BINARY);

/// MX FP4 E2M1.
pub static E2M1: Codec = Codec::new(FormatDescriptor::E2M1);

/// MX FP6 E2M3.
pub static E2M3: Codec = Codec::new(FormatDescriptor::E2M3);

/// MX FP6 E3M2.
pub static E3M2: Codec = Codec::new(FormatDescriptor::E3M2);

/// MX FP8 E4M3, overflow saturating to ±448.
pub static E4M3_SATURATE: Codec = Codec::new(FormatDescriptor::E4M3_SATURATE);

/// MX FP8 E5M2, overflow saturating to ±57344.
pub static E5M2_SATURATE: Codec = Codec::new(FormatDescriptor::E5M2_SATURATE);

/// MX FP8 E4M3, overflow going to NaN.
pub static E4M3_WRAP: Codec = Codec::new(FormatDescriptor::E4M3_WRAP);

/// MX FP8 E5M2, overflow going to ±inf.
pub static E5M2_WRAP: Codec = Codec::new(FormatDescriptor::E5M2_WRAP);

#[cfg(test)]
const PROPTEST_CASES: u32 = if cfg!(debug_assertions) { 0x1000 } else { 0x10000 };
