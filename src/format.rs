//! Descriptors for micro-float layouts: how many exponent and mantissa bits, the exponent bias,
//! and what happens on overflow.
//!
//! A code point of a format with `E` exponent bits and `M` mantissa bits is `1 + E + M` bits
//! wide, laid out from the most significant bit as
//!
//! ```text
//!   sign (1) | exponent (E) | mantissa (M)
//! ```
//!
//! and, if the exponent field `e` is nonzero, has the value `±(1 + m/2^M) · 2^(e - bias)`. An
//! exponent field of 0 is always (signed) zero: there are no subnormals.
//!
//! This module is shared verbatim with the build script, so it may only depend on `std` and on
//! the sibling modules the build script also includes.

use core::fmt;

/// What an encoder returns for values too large in magnitude for the format.
#[derive(Clone, Copy, Debug)]
#[derive(PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
  /// Clamp to the largest finite magnitude.
  Saturate,
  /// Alias into the bit patterns that the reference formats reserve for infinity / NaN.
  Wrap,
}

impl fmt::Display for OverflowPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      OverflowPolicy::Saturate => "saturate",
      OverflowPolicy::Wrap => "wrap",
    })
  }
}

/// The error returned by [`FormatDescriptor::try_new`] for parameters that do not describe a
/// valid format.
#[derive(Clone, Copy, Debug)]
#[derive(PartialEq, Eq)]
pub struct InvalidFormat {
  pub exp_bits: u32,
  pub mantissa_bits: u32,
  pub bias: i32,
  pub reason: &'static str,
}

impl fmt::Display for InvalidFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "invalid format e{}m{} (bias {}): {}", self.exp_bits, self.mantissa_bits, self.bias, self.reason)
  }
}

impl std::error::Error for InvalidFormat {}

/// An immutable description of one micro-float layout, plus the constants derived from it.
///
/// Construct with [`FormatDescriptor::new`] (usable in `const` context; invalid parameters fail
/// at compile time) or [`FormatDescriptor::try_new`]. The standard formats are available as
/// associated constants, e.g. [`FormatDescriptor::E4M3_SATURATE`].
#[derive(Clone, Copy, Debug)]
#[derive(PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
  exp_bits: u32,
  mantissa_bits: u32,
  bias: i32,
  policy: OverflowPolicy,
  pos_clamp: u8,
  neg_clamp: u8,
  max_code: u8,
}

impl FormatDescriptor {
  /// Check the parameters of a format, returning the reason they are invalid, if any.
  pub(crate) const fn check(exp_bits: u32, mantissa_bits: u32, bias: i32) -> Result<(), &'static str> {
    if exp_bits == 0 {
      Err("a format needs at least 1 exponent bit")
    } else if exp_bits > 7 || mantissa_bits > 7 - exp_bits {
      Err("a code point must fit in 8 bits (1 + E + M <= 8)")
    } else if bias < 0 || bias > 127 {
      Err("the bias must be in 0 ..= 127")
    } else {
      Ok(())
    }
  }

  /// Describe a format with `exp_bits` exponent bits, `mantissa_bits` mantissa bits, the given
  /// exponent `bias`, and overflow `policy`.
  ///
  /// Panics (at compile time, in `const` context) if `exp_bits` is 0, if `1 + exp_bits +
  /// mantissa_bits > 8`, or if `bias` is not in `0 ..= 127`.
  pub const fn new(exp_bits: u32, mantissa_bits: u32, bias: i32, policy: OverflowPolicy) -> Self {
    if Self::check(exp_bits, mantissa_bits, bias).is_err() {
      panic!("invalid micro-float format parameters")
    }
    let width = 1 + exp_bits + mantissa_bits;
    // All-ones magnitude, and the same with the sign bit set.
    let generic_pos = ((1u32 << (width - 1)) - 1) as u8;
    let generic_neg = ((1u32 << width) - 1) as u8;

    // The 8-bit MX formats reserve their top bit patterns for inf/NaN, so the clamp codes are
    // fixed by the OCP reference rather than derived.
    let (pos_clamp, neg_clamp, max_code) = match (exp_bits, mantissa_bits, bias, policy) {
      (4, 3, 7, OverflowPolicy::Saturate) => (0b0111_1110, 0b1111_1110, 0b0111_1110),  // ±448
      (4, 3, 7, OverflowPolicy::Wrap) => (0b1111_1111, 0b1111_1111, 0b0111_1110),  // NaN
      (5, 2, 15, OverflowPolicy::Saturate) => (0b0111_1011, 0b1111_1011, 0b0111_1011),  // ±57344
      (5, 2, 15, OverflowPolicy::Wrap) => (0b0111_1100, 0b1111_1100, 0b0111_1011),  // ±inf
      _ => (generic_pos, generic_neg, generic_pos),
    };

    Self { exp_bits, mantissa_bits, bias, policy, pos_clamp, neg_clamp, max_code }
  }

  /// As [`Self::new`], but returns an error instead of panicking on invalid parameters.
  pub fn try_new(exp_bits: u32, mantissa_bits: u32, bias: i32, policy: OverflowPolicy) -> Result<Self, InvalidFormat> {
    match Self::check(exp_bits, mantissa_bits, bias) {
      Ok(()) => Ok(Self::new(exp_bits, mantissa_bits, bias, policy)),
      Err(reason) => Err(InvalidFormat { exp_bits, mantissa_bits, bias, reason }),
    }
  }

  /// Number of exponent bits `E`.
  #[inline]
  pub const fn exp_bits(&self) -> u32 {
    self.exp_bits
  }

  /// Number of mantissa bits `M`.
  #[inline]
  pub const fn mantissa_bits(&self) -> u32 {
    self.mantissa_bits
  }

  /// The exponent bias `B`.
  #[inline]
  pub const fn bias(&self) -> i32 {
    self.bias
  }

  /// What overflow encodes to.
  #[inline]
  pub const fn policy(&self) -> OverflowPolicy {
    self.policy
  }

  /// Width of a code point in bits, `1 + E + M`.
  #[inline]
  pub const fn width(&self) -> u32 {
    1 + self.exp_bits + self.mantissa_bits
  }

  /// Number of distinct code points, `2^(1 + E + M)`; also the length of the decode table.
  #[inline]
  pub const fn code_count(&self) -> usize {
    1 << self.width()
  }

  /// The canonical encoding of NaN: sign bit set, exponent and mantissa all zero.
  #[inline]
  pub const fn nan_code(&self) -> u8 {
    (1u32 << (self.exp_bits + self.mantissa_bits)) as u8
  }

  /// The code returned for `+inf` and positive overflow.
  #[inline]
  pub const fn pos_clamp(&self) -> u8 {
    self.pos_clamp
  }

  /// The code returned for `-inf` and negative overflow.
  #[inline]
  pub const fn neg_clamp(&self) -> u8 {
    self.neg_clamp
  }

  /// The clamp code for the given sign.
  #[inline]
  pub const fn clamp(&self, negative: bool) -> u8 {
    if negative { self.neg_clamp } else { self.pos_clamp }
  }

  /// The largest finite positive code point.
  #[inline]
  pub const fn max_code(&self) -> u8 {
    self.max_code
  }

  /// The value of [`Self::max_code`]; anything larger in magnitude overflows.
  pub const fn max_finite(&self) -> f64 {
    let (_, exponent, mantissa) = self.fields(self.max_code);
    self.magnitude(exponent, mantissa)
  }

  /// The smallest positive value that decodes to something other than zero, `2^(1 - B)`.
  pub const fn min_normal(&self) -> f64 {
    self.magnitude(1, 0)
  }

  /// Split a code point into its (sign, exponent, mantissa) fields. Bits above
  /// [`Self::width`] are ignored.
  #[inline]
  pub const fn fields(&self, code: u8) -> (bool, u32, u32) {
    let code = code as u32;
    let sign = (code >> (self.exp_bits + self.mantissa_bits)) & 1 == 1;
    let exponent = (code >> self.mantissa_bits) & ((1 << self.exp_bits) - 1);
    let mantissa = code & ((1 << self.mantissa_bits) - 1);
    (sign, exponent, mantissa)
  }

  /// Assemble a code point from its fields. The fields must already be in range.
  #[inline]
  pub const fn assemble(&self, sign: bool, exponent: u32, mantissa: u32) -> u8 {
    debug_assert!(exponent >> self.exp_bits == 0 && mantissa >> self.mantissa_bits == 0);
    let sign = (sign as u32) << (self.exp_bits + self.mantissa_bits);
    (sign | exponent << self.mantissa_bits | mantissa) as u8
  }

  /// The value `(1 + mantissa/2^M) · 2^(exponent - B)` for a nonzero `exponent` field, built
  /// directly as `f64` bits (always exact, since `M <= 6` and the exponent is in range).
  pub(crate) const fn magnitude(&self, exponent: u32, mantissa: u32) -> f64 {
    debug_assert!(exponent != 0);
    let biased = (exponent as i64 - self.bias as i64 + 1023) as u64;
    f64::from_bits(biased << 52 | (mantissa as u64) << (52 - self.mantissa_bits))
  }
}

impl fmt::Display for FormatDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "e{}m{} (bias {}, {})", self.exp_bits, self.mantissa_bits, self.bias, self.policy)
  }
}

/// Standard formats
impl FormatDescriptor {
  /// binary8 "p4": 4 exponent bits, 3 mantissa bits, bias 8.
  pub const P4BINARY: Self = Self::new(4, 3, 8, OverflowPolicy::Saturate);

  /// binary8 "p3": 5 exponent bits, 2 mantissa bits, bias 16.
  pub const P3BINARY: Self = Self::new(5, 2, 16, OverflowPolicy::Saturate);

  /// MX FP4: 2 exponent bits, 1 mantissa bit, bias 1.
  pub const E2M1: Self = Self::new(2, 1, 1, OverflowPolicy::Saturate);

  /// MX FP6: 2 exponent bits, 3 mantissa bits, bias 1.
  pub const E2M3: Self = Self::new(2, 3, 1, OverflowPolicy::Saturate);

  /// MX FP6: 3 exponent bits, 2 mantissa bits, bias 3.
  pub const E3M2: Self = Self::new(3, 2, 3, OverflowPolicy::Saturate);

  /// MX FP8 E4M3, clamping overflow to ±448.
  pub const E4M3_SATURATE: Self = Self::new(4, 3, 7, OverflowPolicy::Saturate);

  /// MX FP8 E5M2, clamping overflow to ±57344.
  pub const E5M2_SATURATE: Self = Self::new(5, 2, 15, OverflowPolicy::Saturate);

  /// MX FP8 E4M3, sending overflow to NaN (`0xff`).
  pub const E4M3_WRAP: Self = Self::new(4, 3, 7, OverflowPolicy::Wrap);

  /// MX FP8 E5M2, sending overflow to ±inf (`0x7c` / `0xfc`).
  pub const E5M2_WRAP: Self = Self::new(5, 2, 15, OverflowPolicy::Wrap);

  /// Every standard format, the ones that ship with precomputed tables.
  pub const STANDARD: [Self; 9] = [
    Self::P4BINARY,
    Self::P3BINARY,
    Self::E2M1,
    Self::E2M3,
    Self::E3M2,
    Self::E4M3_SATURATE,
    Self::E5M2_SATURATE,
    Self::E4M3_WRAP,
    Self::E5M2_WRAP,
  ];

  /// A short, file-name safe name for the format, e.g. `e4m3_b7_saturate`.
  pub fn slug(&self) -> String {
    format!("e{}m{}_b{}_{}", self.exp_bits, self.mantissa_bits, self.bias, self.policy)
  }
}
