//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

use crate::format::{FormatDescriptor, InvalidFormat};
use crate::token::Radix;

/// Result type alias for codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong when parsing literals, decoding code points, or materializing
/// lookup tables.
///
/// Overflow and underflow on encode are deliberately *not* errors: they produce the clamp code or
/// zero respectively (see [`FormatDescriptor::encode`]).
#[derive(Debug, Error)]
pub enum Error {
  /// The literal does not start with `0x`, `0b` or `0o` (in either case).
  #[error("invalid literal {token:?}: must start with one of 0x, 0b, 0o")]
  UnknownPrefix { token: String },

  /// A digit that is not valid for the literal's radix.
  #[error("invalid {radix} digit {digit:?} in literal {token:?}")]
  InvalidDigit { radix: Radix, digit: char, token: String },

  /// A code point outside `0 .. 2^(1+E+M)`.
  #[error("code point {code} out of range for {format}: must be below {count}")]
  CodeOutOfRange { code: u8, count: usize, format: FormatDescriptor },

  /// A bit pattern whose length is not the width of the format.
  #[error("bit pattern of length {len} cannot hold {format}: expected {width} bits")]
  WidthMismatch { len: usize, width: u32, format: FormatDescriptor },

  /// Parameters rejected by [`FormatDescriptor::try_new`].
  #[error(transparent)]
  InvalidFormat(#[from] InvalidFormat),

  /// An embedded table payload that does not inflate to the expected table.
  #[error("corrupt lookup table payload: {message}")]
  CorruptTable {
    message: String,
    #[source]
    source: Option<std::io::Error>,
  },

  /// A value given to the E8M0 scale codec that is not an exact power of two in range.
  #[error("{value} is not a valid e8m0 scale: must be exactly 2^i for -127 <= i <= 127, or NaN")]
  NotAScale { value: f64 },
}

impl Error {
  /// Create a [`Error::CorruptTable`] without an underlying I/O error.
  pub(crate) fn corrupt(message: impl Into<String>) -> Self {
    Error::CorruptTable { message: message.into(), source: None }
  }
}
