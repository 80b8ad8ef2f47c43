//! The E8M0 shared-scale format of the MX block formats: an unsigned 8-bit biased exponent with
//! no sign and no mantissa, so every value is an exact power of two `2^(code - 127)`. The all-ones
//! code is NaN.
//!
//! Since every value is a power of two, encoding does no rounding: anything that is not exactly
//! `2^i` for `-127 <= i <= 127` is rejected.

use crate::error::{Error, Result};

/// The E8M0 scale codec.
#[derive(Clone, Copy, Debug)]
pub struct E8M0;

impl E8M0 {
  /// Exponent bias.
  pub const BIAS: i32 = 127;

  /// The code of NaN.
  pub const NAN: u8 = 0xff;

  /// The value of `code`: NaN for [`Self::NAN`], else `2^(code - 127)`.
  pub const fn to_float(code: u8) -> f64 {
    if code == Self::NAN {
      return f64::NAN
    }
    let exp = code as i64 - Self::BIAS as i64;
    f64::from_bits(((exp + F64_EXP_BIAS) as u64) << F64_MANTISSA_BITS)
  }

  /// The code of `x`, which must be NaN or exactly a power of two `2^i`, `-127 <= i <= 127`.
  ///
  /// ```
  /// # use microfloat::E8M0;
  /// assert_eq!(E8M0::to_code(1.0).unwrap(), 127);
  /// assert_eq!(E8M0::to_code(0.25).unwrap(), 125);
  /// assert!(E8M0::to_code(3.0).is_err());
  /// ```
  pub fn to_code(x: f64) -> Result<u8> {
    if x.is_nan() {
      return Ok(Self::NAN)
    }
    let bits = x.to_bits();
    let mantissa = bits & ((1 << F64_MANTISSA_BITS) - 1);
    if !x.is_normal() || x.is_sign_negative() || mantissa != 0 {
      return Err(Error::NotAScale { value: x })
    }
    let exp = (bits >> F64_MANTISSA_BITS) as i64 - F64_EXP_BIAS;
    u8::try_from(exp + i64::from(Self::BIAS))
      .ok()
      .filter(|&code| code != Self::NAN)
      .ok_or(Error::NotAScale { value: x })
  }
}

const F64_MANTISSA_BITS: u32 = f64::MANTISSA_DIGITS - 1;
const F64_EXP_BIAS: i64 = f64::MAX_EXP as i64 - 1;
