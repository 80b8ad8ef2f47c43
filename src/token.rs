//! Parsing of prefixed bit literals (`0x…`, `0b…`, `0o…`) into flat bit sequences.
//!
//! Literals are case-insensitive, and whitespace and `_` separators are ignored anywhere in the
//! token, so `"0X_1f"`, `"0x 1F"` and `"0x1f"` all produce the same 8 bits. Each digit expands to
//! a fixed number of bits (4 for hex, 3 for octal, 1 for binary), most significant bit first, so
//! leading zero digits are preserved.

use core::fmt;

use crate::error::{Error, Result};
use crate::BitSeq;

/// The radix of a literal, selected by its two-character prefix.
#[derive(Clone, Copy, Debug)]
#[derive(PartialEq, Eq, Hash)]
pub enum Radix {
  /// `0x`: 4 bits per digit.
  Hex,
  /// `0b`: 1 bit per digit.
  Binary,
  /// `0o`: 3 bits per digit.
  Octal,
}

impl Radix {
  /// Recognise the radix prefix at the start of `token`. The prefix is matched
  /// case-insensitively, but `token` is otherwise taken as-is (no separators are stripped).
  pub fn from_prefix(token: &str) -> Option<Self> {
    match token.as_bytes() {
      [b'0', b'x' | b'X', ..] => Some(Radix::Hex),
      [b'0', b'b' | b'B', ..] => Some(Radix::Binary),
      [b'0', b'o' | b'O', ..] => Some(Radix::Octal),
      _ => None,
    }
  }

  /// The numeric base of this radix.
  pub const fn base(self) -> u32 {
    match self {
      Radix::Hex => 16,
      Radix::Binary => 2,
      Radix::Octal => 8,
    }
  }

  /// How many bits each digit of this radix expands to.
  pub const fn bits_per_digit(self) -> usize {
    match self {
      Radix::Hex => 4,
      Radix::Binary => 1,
      Radix::Octal => 3,
    }
  }

  /// Expand a string of digits (no prefix) in this radix into bits, MSB first. Whitespace and `_`
  /// are skipped; any other character that is not a digit of this radix is an error.
  pub fn parse_digits(self, digits: &str) -> Result<BitSeq> {
    self.expand(digits, digits)
  }

  fn expand(self, digits: &str, token: &str) -> Result<BitSeq> {
    let width = self.bits_per_digit();
    let mut bits = BitSeq::with_capacity(digits.len() * width);
    for c in digits.chars().filter(|&c| !is_separator(c)) {
      let Some(value) = c.to_digit(self.base()) else {
        return Err(Error::InvalidDigit { radix: self, digit: c, token: token.to_owned() })
      };
      bits.extend((0 .. width).rev().map(|i| (value >> i) & 1 == 1));
    }
    Ok(bits)
  }
}

impl fmt::Display for Radix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Radix::Hex => "hex",
      Radix::Binary => "binary",
      Radix::Octal => "octal",
    })
  }
}

fn is_separator(c: char) -> bool {
  c == '_' || c.is_whitespace()
}

/// Parse a prefixed literal token into a bit sequence.
///
/// ```
/// # use microfloat::bits_from_token;
/// let a = bits_from_token("0x1F").unwrap();
/// let b = bits_from_token("0b0001_1111").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(bits_from_token("0o7").unwrap().len(), 3);
/// assert!(bits_from_token("1F").is_err());
/// ```
pub fn bits_from_token(token: &str) -> Result<BitSeq> {
  // Separators may appear anywhere, even inside the prefix (`"0_x1f"`).
  let tidy: String = token.chars().filter(|&c| !is_separator(c)).collect();
  let radix = Radix::from_prefix(&tidy)
    .ok_or_else(|| Error::UnknownPrefix { token: token.to_owned() })?;
  radix.expand(&tidy[2 ..], token)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bits(s: &str) -> BitSeq {
    s.chars().map(|c| c == '1').collect()
  }

  #[test]
  fn hex_matches_binary() {
    assert_eq!(bits_from_token("0x1F").unwrap(), bits_from_token("0b00011111").unwrap());
  }

  #[test]
  fn separators_and_case() {
    let canonical = bits_from_token("0x1f").unwrap();
    assert_eq!(bits_from_token("0X_1f").unwrap(), canonical);
    assert_eq!(bits_from_token("0x 1 F").unwrap(), canonical);
    assert_eq!(bits_from_token(" 0x1F\t").unwrap(), canonical);
    assert_eq!(canonical, bits("00011111"));
  }

  #[test]
  fn octal() {
    assert_eq!(bits_from_token("0o17").unwrap(), bits("001111"));
    assert_eq!(bits_from_token("0O7_0").unwrap(), bits("111000"));
  }

  #[test]
  fn binary_keeps_leading_zeros() {
    assert_eq!(bits_from_token("0b0001").unwrap(), bits("0001"));
    assert_eq!(bits_from_token("0B1_0").unwrap().len(), 2);
  }

  #[test]
  fn empty_digits() {
    assert!(bits_from_token("0x").unwrap().is_empty());
  }

  #[test]
  fn lengths() {
    assert_eq!(bits_from_token("0xabc").unwrap().len(), 12);
    assert_eq!(bits_from_token("0o123").unwrap().len(), 9);
    assert_eq!(bits_from_token("0b101").unwrap().len(), 3);
  }

  #[test]
  fn missing_prefix() {
    assert!(matches!(bits_from_token("1f"), Err(Error::UnknownPrefix { .. })));
    assert!(matches!(bits_from_token("0d12"), Err(Error::UnknownPrefix { .. })));
    assert!(matches!(bits_from_token(""), Err(Error::UnknownPrefix { .. })));
  }

  #[test]
  fn invalid_digit() {
    match bits_from_token("0b102") {
      Err(Error::InvalidDigit { radix, digit, .. }) => {
        assert_eq!(radix, Radix::Binary);
        assert_eq!(digit, '2');
      }
      other => panic!("expected InvalidDigit, got {other:?}"),
    }
    assert!(matches!(bits_from_token("0o8"), Err(Error::InvalidDigit { radix: Radix::Octal, .. })));
    assert!(matches!(bits_from_token("0xfg"), Err(Error::InvalidDigit { digit: 'g', .. })));
  }

  #[test]
  fn parse_digits() {
    assert_eq!(Radix::Hex.parse_digits("A").unwrap(), bits("1010"));
    assert!(Radix::Octal.parse_digits("9").is_err());
  }

  #[test]
  fn separator_inside_prefix() {
    assert_eq!(bits_from_token("0_x1f").unwrap(), bits("00011111"));
  }
}
