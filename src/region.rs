use std::str::FromStr;

use crate::patch::parse_byte;
use crate::vm::Error;

/// A program image: bytes destined for memory, starting at `origin`.
pub trait Region {
  fn origin(&self) -> u8;
  fn bytes(&self) -> &[u8];
}

/// A `Chunk` is a single owned program image that our virtual machine may
/// load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
  origin: u8,
  bytes: Vec<u8>,
}

impl Chunk {
  /// The same image, placed at `origin` instead.
  pub fn at(self, origin: u8) -> Self {
    Self { origin, ..self }
  }
}

impl From<Vec<u8>> for Chunk {
  fn from(bytes: Vec<u8>) -> Self {
    Self { origin: 0, bytes }
  }
}

/// Parses whitespace separated hex bytes. `#` starts a comment running to
/// the end of the line.
///
/// ```text
/// 20 A3   # r0 <- A3
/// 30 05   # m[05] <- r0
/// C0 00
/// ```
impl FromStr for Chunk {
  type Err = Error;

  fn from_str(text: &str) -> Result<Self, Self::Err> {
    let bytes = text
      .lines()
      .map(|line| line.split('#').next().unwrap_or_default())
      .flat_map(str::split_whitespace)
      .map(parse_byte)
      .collect::<Result<Vec<_>, _>>()?;
    Ok(bytes.into())
  }
}

impl Region for Chunk {
  fn origin(&self) -> u8 {
    self.origin
  }

  fn bytes(&self) -> &[u8] {
    &self.bytes
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::vm::Vm;

  #[test]
  fn parse_with_comments() {
    let chunk: Chunk = "20 A3 # load\n30 05\n\n# just a comment\nc0 00\n"
      .parse()
      .unwrap();
    assert_eq!(chunk.bytes(), &[0x20, 0xA3, 0x30, 0x05, 0xC0, 0x00]);
    assert_eq!(chunk.origin(), 0);
  }

  #[test]
  fn parse_rejects_non_bytes() {
    assert!(matches!(
      "20 A3 100".parse::<Chunk>(),
      Err(Error::ValueOutOfRange(v)) if v == "100"
    ));
    assert!(matches!(
      "2G".parse::<Chunk>(),
      Err(Error::ValueOutOfRange(_))
    ));
  }

  #[test]
  fn load_at_origin() {
    let chunk = Chunk::from(vec![0x21, 0x05, 0xC0, 0x00]).at(0x10);
    let mut vm = Vm::new();
    vm.load(&chunk).unwrap();
    assert_eq!(vm.memory()[0x10..0x14], [0x21, 0x05, 0xC0, 0x00]);
    assert_eq!(vm.memory()[0x0F], 0);
  }

  #[test]
  fn load_fills_to_the_last_byte() {
    let chunk = Chunk::from(vec![0xC0, 0x00]).at(254);
    let mut vm = Vm::new();
    vm.load(&chunk).unwrap();
    assert_eq!(vm.memory()[255], 0x00);
    assert_eq!(vm.memory()[254], 0xC0);
  }

  #[test]
  fn load_past_the_end_changes_nothing() {
    let chunk = Chunk::from(vec![0x21, 0x05, 0xC0]).at(254);
    let mut vm = Vm::new();
    assert!(matches!(
      vm.load(&chunk),
      Err(Error::ProgramTooLarge { origin: 254, len: 3 })
    ));
    assert!(vm.memory().iter().all(|b| *b == 0));
  }
}
