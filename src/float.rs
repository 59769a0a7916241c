//! The machine's private 8-bit real number format.
//!
//! ```text
//!   7   6 5 4   3 2 1 0
//! [ s | e e e | m m m m ]
//! ```
//!
//! `s` is the sign, `e` an excess-7 exponent code (real exponent `7 - e`) and
//! `m` a mantissa read as *decimal* digits after the point: `5` means `0.5`,
//! `12` means `0.12`. This is not a binary fraction.

const SIGN: u8 = 0x80;
const EXPONENT: u8 = 0x70;
const MANTISSA: u8 = 0x0F;
const BIAS: i32 = 7;

/// Decodes one byte into the real number it represents.
pub fn decode(byte: u8) -> f32 {
  let mut fraction = f32::from(byte & MANTISSA);
  while fraction >= 1.0 {
    fraction /= 10.0;
  }
  let exponent = BIAS - i32::from((byte & EXPONENT) >> 4);
  let magnitude = fraction * 2f32.powi(exponent);
  if byte & SIGN == 0 {
    magnitude
  } else {
    -magnitude
  }
}

/// Drops the fractional part of `value` and keeps the low eight bits of what
/// remains, so negative sums come out in two's complement.
///
/// No re-encoding into the float format happens here.
pub fn truncate(value: f32) -> u8 {
  // |value| <= 2 * 0.9 * 2^7, well inside i32
  value.trunc() as i32 as u8
}
