//! The authoritative `f64` → code point conversion, by direct bit arithmetic on the IEEE-754
//! representation. No tables are involved, so this path is the ground truth that the fast encode
//! table is generated from.
//!
//! Shared with the build script, like the `format` module.

use crate::format::FormatDescriptor;

/// Number of explicit mantissa bits in an `f64`.
const F64_MANTISSA_BITS: u32 = f64::MANTISSA_DIGITS - 1;

/// Exponent bias of an `f64`.
const F64_EXP_BIAS: i64 = f64::MAX_EXP as i64 - 1;

impl FormatDescriptor {
  /// Convert `x` to the code point of this format, by the following rules:
  ///
  /// - NaN encodes to [`Self::nan_code`]. There is no NaN payload to preserve.
  /// - `±inf` encodes to the clamp code for its sign ([`Self::clamp`]).
  /// - `±0` encodes to `0`.
  /// - Magnitudes above [`Self::max_finite`] overflow to the clamp code for their sign.
  /// - Magnitudes below `2^-B` underflow ("flush") to `0`. There are no subnormals.
  /// - Magnitudes in `[2^-B, 2^(1-B))` get an exponent field of 0, so they decode to zero. If the
  ///   truncated mantissa is also 0 the result is `0`, never the sign-only pattern (the NaN code).
  /// - Otherwise the mantissa is **truncated** toward zero to `M` bits (not rounded to nearest).
  ///
  /// ```
  /// # use microfloat::FormatDescriptor;
  /// let e4m3 = FormatDescriptor::E4M3_SATURATE;
  /// assert_eq!(e4m3.encode(1.0), 0b0_0111_000);
  /// assert_eq!(e4m3.encode(-1.99), 0b1_0111_111);
  /// assert_eq!(e4m3.encode(1e300), e4m3.pos_clamp());
  /// ```
  pub fn encode(&self, x: f64) -> u8 {
    use core::num::FpCategory;
    match x.classify() {
      FpCategory::Nan => self.nan_code(),
      FpCategory::Infinite => self.clamp(x.is_sign_negative()),
      FpCategory::Zero => 0,
      // The bias is at most 127, so `f64` subnormals (< 2^-1022) always underflow.
      FpCategory::Subnormal => 0,
      FpCategory::Normal => self.encode_normal(x),
    }
  }

  /// [`Self::encode`] for a normal (nonzero, finite, not subnormal) `x`.
  fn encode_normal(&self, x: f64) -> u8 {
    debug_assert!(x.is_normal());
    let negative = x.is_sign_negative();
    let abs = x.abs();

    // Anything past the largest finite code overflows. This also keeps the codes that the
    // 8-bit MX formats reserve for inf/NaN out of the result.
    if abs > self.max_finite() {
      return self.clamp(negative)
    }

    // For a normal f64, the exponent field minus the bias is exactly `floor(log2(abs))`, and the
    // top `M` bits of the explicit mantissa are exactly `floor((abs/2^exp - 1) * 2^M)`.
    let bits = abs.to_bits();
    let exp = (bits >> F64_MANTISSA_BITS) as i64 - F64_EXP_BIAS;
    let exp_biased = exp + i64::from(self.bias());

    if exp_biased < 0 {
      return 0
    }
    if exp_biased >= 1 << self.exp_bits() {
      return self.clamp(negative)
    }

    let mantissa = (bits & ((1 << F64_MANTISSA_BITS) - 1)) >> (F64_MANTISSA_BITS - self.mantissa_bits());
    // A negative zero bit pattern would collide with the NaN code.
    if exp_biased == 0 && mantissa == 0 {
      return 0
    }
    self.assemble(negative, exp_biased as u32, mantissa as u32)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::format::OverflowPolicy;
  use proptest::prelude::*;

  /// A deliberately naive rendition of the encoding rules, using floating point arithmetic
  /// instead of bit fields, to check [`FormatDescriptor::encode`] against.
  fn encode_reference(format: &FormatDescriptor, x: f64) -> u8 {
    if x.is_nan() {
      return format.nan_code()
    }
    if x.is_infinite() {
      return format.clamp(x < 0.0)
    }
    if x == 0.0 {
      return 0
    }
    let negative = x < 0.0;
    let a = x.abs();
    if a > format.max_finite() {
      return format.clamp(negative)
    }
    // `log2` can be off by one right below a power of two; nudge until 2^exp <= a < 2^(exp+1).
    let mut exp = a.log2().floor() as i32;
    while 2f64.powi(exp) > a {
      exp -= 1
    }
    while 2f64.powi(exp + 1) <= a {
      exp += 1
    }
    let mantissa = ((a / 2f64.powi(exp) - 1.0) * 2f64.powi(format.mantissa_bits() as i32)).floor();
    let exp_biased = exp + format.bias();
    if exp_biased < 0 {
      return 0
    }
    if exp_biased >= 1 << format.exp_bits() {
      return format.clamp(negative)
    }
    if exp_biased == 0 && mantissa == 0.0 {
      return 0
    }
    let code = (negative as u32) << (format.exp_bits() + format.mantissa_bits())
      | (exp_biased as u32) << format.mantissa_bits()
      | mantissa as u32;
    code as u8
  }

  /// Values spread over the interesting exponent range of every format, rather than over the
  /// whole `f64` range (where nearly everything over- or underflows).
  fn near_range() -> impl Strategy<Value = f64> {
    (any::<bool>(), -20i32 .. 18, 1.0f64 .. 2.0)
      .prop_map(|(negative, exp, frac)| {
        let x = frac * 2f64.powi(exp);
        if negative { -x } else { x }
      })
  }

  /// Instantiate a suite of tests
  macro_rules! make_tests {
    ($format:expr) => {
      use super::*;

      const FORMAT: FormatDescriptor = $format;

      #[test]
      fn zero() {
        assert_eq!(FORMAT.encode(0.0), 0);
        assert_eq!(FORMAT.encode(-0.0), 0);
      }

      #[test]
      fn one() {
        assert_eq!(FORMAT.encode(1.0), FORMAT.assemble(false, FORMAT.bias() as u32, 0));
        assert_eq!(FORMAT.encode(-1.0), FORMAT.assemble(true, FORMAT.bias() as u32, 0));
      }

      #[test]
      fn nan() {
        assert_eq!(FORMAT.encode(f64::NAN), FORMAT.nan_code());
        assert_eq!(FORMAT.encode(-f64::NAN), FORMAT.nan_code());
      }

      #[test]
      fn infinities() {
        assert_eq!(FORMAT.encode(f64::INFINITY), FORMAT.pos_clamp());
        assert_eq!(FORMAT.encode(f64::NEG_INFINITY), FORMAT.neg_clamp());
      }

      #[test]
      fn overflow() {
        assert_eq!(FORMAT.encode(1e300), FORMAT.pos_clamp());
        assert_eq!(FORMAT.encode(-1e300), FORMAT.neg_clamp());
        assert_eq!(FORMAT.encode(f64::MAX), FORMAT.pos_clamp());
      }

      #[test]
      fn max_finite() {
        assert_eq!(FORMAT.encode(FORMAT.max_finite()), FORMAT.max_code());
        assert_eq!(FORMAT.encode(-FORMAT.max_finite()), FORMAT.max_code() | FORMAT.nan_code());
      }

      #[test]
      fn underflow() {
        let tiny = 2f64.powi(-FORMAT.bias() - 1);
        assert_eq!(FORMAT.encode(tiny), 0);
        assert_eq!(FORMAT.encode(-tiny), 0);
        assert_eq!(FORMAT.encode(f64::MIN_POSITIVE), 0);
        assert_eq!(FORMAT.encode(5e-324), 0);
      }

      #[test]
      fn min_normal() {
        assert_eq!(FORMAT.encode(FORMAT.min_normal()), FORMAT.assemble(false, 1, 0));
      }

      proptest!{
        #![proptest_config(ProptestConfig::with_cases(crate::PROPTEST_CASES))]
        #[test]
        fn any_f64(x: f64) {
          prop_assert_eq!(FORMAT.encode(x), encode_reference(&FORMAT, x))
        }

        #[test]
        fn in_range(x in near_range()) {
          prop_assert_eq!(FORMAT.encode(x), encode_reference(&FORMAT, x))
        }
      }
    };
  }

  mod p4binary { make_tests!{FormatDescriptor::P4BINARY} }
  mod p3binary { make_tests!{FormatDescriptor::P3BINARY} }
  mod e2m1 { make_tests!{FormatDescriptor::E2M1} }
  mod e2m3 { make_tests!{FormatDescriptor::E2M3} }
  mod e3m2 { make_tests!{FormatDescriptor::E3M2} }
  mod e4m3_saturate { make_tests!{FormatDescriptor::E4M3_SATURATE} }
  mod e5m2_saturate { make_tests!{FormatDescriptor::E5M2_SATURATE} }
  mod e4m3_wrap { make_tests!{FormatDescriptor::E4M3_WRAP} }
  mod e5m2_wrap { make_tests!{FormatDescriptor::E5M2_WRAP} }
  mod e7m0 { make_tests!{FormatDescriptor::new(7, 0, 63, OverflowPolicy::Saturate)} }
  mod e1m2 { make_tests!{FormatDescriptor::new(1, 2, 0, OverflowPolicy::Wrap)} }

  #[test]
  fn truncates_toward_zero() {
    // 1.9 would round to 2.0 (0b0_10_0); truncation keeps it in the binade of 1.0.
    assert_eq!(FormatDescriptor::E2M1.encode(1.9), 0b0_01_1);
    assert_eq!(FormatDescriptor::E2M1.encode(-1.9), 0b1_01_1);
    assert_eq!(FormatDescriptor::E4M3_SATURATE.encode(1.124), 0b0_0111_000);
  }

  #[test]
  fn just_below_power_of_two() {
    let x = f64::from_bits(2f64.to_bits() - 1);
    assert_eq!(FormatDescriptor::E4M3_SATURATE.encode(x), 0b0_0111_111);
  }

  #[test]
  fn flush_to_zero_e2m1() {
    let e2m1 = FormatDescriptor::E2M1;
    for x in [0.49, 0.25, 0.1, 1e-10] {
      assert_eq!(e2m1.encode(x), 0, "{x}");
      assert_eq!(e2m1.encode(-x), 0, "{x}");
    }
    // Between 2^-B and 2^(1-B) the exponent field is 0, so the code still decodes to zero.
    assert_eq!(e2m1.encode(0.75), 0b0_00_1);
  }

  #[test]
  fn negative_zero_field_is_not_nan() {
    let e2m1 = FormatDescriptor::E2M1;
    assert_eq!(e2m1.encode(-0.5), 0);
    assert_eq!(e2m1.encode(-0.74), 0);
    assert_eq!(e2m1.encode(-0.75), 0b1_00_1);
    let e4m3 = FormatDescriptor::E4M3_WRAP;
    assert_eq!(e4m3.encode(-2f64.powi(-7)), 0);
    assert_ne!(e4m3.encode(-2f64.powi(-7)), e4m3.nan_code());
  }

  #[test]
  fn e4m3_policies() {
    let saturate = FormatDescriptor::E4M3_SATURATE;
    let wrap = FormatDescriptor::E4M3_WRAP;
    assert_eq!(saturate.encode(448.0), 0x7e);
    assert_eq!(wrap.encode(448.0), 0x7e);
    assert_eq!(saturate.encode(449.0), 0x7e);
    assert_eq!(wrap.encode(449.0), 0xff);
    assert_eq!(saturate.encode(-449.0), 0xfe);
    assert_eq!(wrap.encode(-449.0), 0xff);
    // 480 is representable by bit arithmetic (0x7f), but that pattern is NaN.
    assert_eq!(saturate.encode(480.0), 0x7e);
    assert_eq!(wrap.encode(480.0), 0xff);
  }

  #[test]
  fn e5m2_policies() {
    let saturate = FormatDescriptor::E5M2_SATURATE;
    let wrap = FormatDescriptor::E5M2_WRAP;
    assert_eq!(saturate.encode(57344.0), 0x7b);
    assert_eq!(wrap.encode(57344.0), 0x7b);
    assert_eq!(saturate.encode(60000.0), 0x7b);
    assert_eq!(wrap.encode(60000.0), 0x7c);
    assert_eq!(wrap.encode(-60000.0), 0xfc);
    assert_eq!(wrap.encode(f64::NEG_INFINITY), 0xfc);
  }
}
