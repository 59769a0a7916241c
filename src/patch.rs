//! Text input for poking values into a machine between steps.
//!
//! Values are always hexadecimal, the way they are shown in a memory dump.
//! Register numbers are hexadecimal too (`rA` through `rF`), memory
//! addresses likewise.

use std::str::FromStr;

use crate::vm::{Error, Vm};

/// Parses one hex byte, `00` through `FF`, with an optional `0x` prefix.
pub fn parse_byte(text: &str) -> Result<u8, Error> {
  let digits = text
    .strip_prefix("0x")
    .or_else(|| text.strip_prefix("0X"))
    .unwrap_or(text);
  // from_str_radix would accept a leading `+`
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
    return Err(Error::ValueOutOfRange(text.to_string()));
  }
  u8::from_str_radix(digits, 16).map_err(|_| Error::ValueOutOfRange(text.to_string()))
}

/// A single assignment to a register or memory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch {
  Register { index: usize, value: u8 },
  Memory { address: usize, value: u8 },
}

impl FromStr for Patch {
  type Err = Error;

  /// `r3=1f` sets register 3, `m80=ff` sets memory cell 0x80.
  fn from_str(text: &str) -> Result<Self, Self::Err> {
    let malformed = || Error::MalformedPatch(text.to_string());
    let (target, value) = text.split_once('=').ok_or_else(malformed)?;
    let target = target.trim();
    let value = parse_byte(value.trim())?;

    let mut chars = target.chars();
    let kind = chars.next().ok_or_else(malformed)?;
    let index = usize::from_str_radix(chars.as_str(), 16).map_err(|_| malformed())?;
    match kind.to_ascii_lowercase() {
      'r' => Ok(Self::Register { index, value }),
      'm' => Ok(Self::Memory {
        address: index,
        value,
      }),
      _ => Err(malformed()),
    }
  }
}

impl Vm {
  pub fn apply(&mut self, patch: &Patch) -> Result<(), Error> {
    match *patch {
      Patch::Register { index, value } => self.set_register(index, value),
      Patch::Memory { address, value } => self.set_memory(address, value),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use rstest::rstest;

  #[rstest]
  #[case("00", 0x00)]
  #[case("ff", 0xFF)]
  #[case("FF", 0xFF)]
  #[case("0x7f", 0x7F)]
  #[case("a", 0x0A)]
  fn parses_bytes(#[case] text: &str, #[case] expected: u8) {
    assert_eq!(parse_byte(text).unwrap(), expected);
  }

  #[rstest]
  #[case("")]
  #[case("100")]
  #[case("-1")]
  #[case("+1")]
  #[case("0x")]
  #[case("zz")]
  fn rejects_bytes(#[case] text: &str) {
    assert!(matches!(parse_byte(text), Err(Error::ValueOutOfRange(v)) if v == text));
  }

  #[rstest]
  #[case("r3=1f", Patch::Register { index: 3, value: 0x1F })]
  #[case("rF = 0x80", Patch::Register { index: 15, value: 0x80 })]
  #[case("m80=ff", Patch::Memory { address: 0x80, value: 0xFF })]
  #[case("M0=0", Patch::Memory { address: 0, value: 0 })]
  fn parses_patches(#[case] text: &str, #[case] expected: Patch) {
    assert_eq!(text.parse::<Patch>().unwrap(), expected);
  }

  #[rstest]
  #[case("r3")]
  #[case("=12")]
  #[case("x1=12")]
  #[case("r=12")]
  fn rejects_malformed(#[case] text: &str) {
    assert!(matches!(text.parse::<Patch>(), Err(Error::MalformedPatch(_))));
  }

  #[test]
  fn applies_and_range_checks() {
    let mut vm = Vm::new();
    vm.apply(&"r2=AB".parse().unwrap()).unwrap();
    vm.apply(&"mFF=cd".parse().unwrap()).unwrap();
    assert_eq!(vm.registers()[2], 0xAB);
    assert_eq!(vm.memory()[0xFF], 0xCD);

    // parses fine, but there is no register 0x10
    let patch: Patch = "r10=01".parse().unwrap();
    assert!(matches!(vm.apply(&patch), Err(Error::RegisterOutOfRange(16))));
    let patch: Patch = "m100=01".parse().unwrap();
    assert!(matches!(vm.apply(&patch), Err(Error::AddressOutOfRange(256))));
  }
}
