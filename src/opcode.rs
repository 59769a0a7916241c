/// The high nibble of an instruction's first byte.
///
/// Operand letters below follow the encoding `[op R] [S T]` (or `[op R] [XY]`
/// when the second byte is used whole).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Loads a register from memory.
  ///
  /// | Operation     | Semantics/RTL   | Encoding  |
  /// |---------------|-----------------|-----------|
  /// | Load          | `r[R] ← m[XY]`  | `1R XY`   |
  Load = 0x1,

  /// Loads an immediate value into a register.
  ///
  /// | Operation      | Semantics/RTL | Encoding |
  /// |----------------|---------------|----------|
  /// | Load Immediate | `r[R] ← XY`   | `2R XY`  |
  LoadImmediate = 0x2,

  /// Stores a register into memory.
  ///
  /// | Operation | Semantics/RTL  | Encoding |
  /// |-----------|----------------|----------|
  /// | Store     | `m[XY] ← r[R]` | `3R XY`  |
  Store = 0x3,

  /// Copies one register into another. Note the destination is the *last*
  /// nibble, unlike every other register-writing opcode.
  ///
  /// | Operation | Semantics/RTL | Encoding |
  /// |-----------|---------------|----------|
  /// | Move      | `r[T] ← r[S]` | `40 ST`  |
  Move = 0x4,

  /// Two's complement addition, wrapping on overflow.
  ///
  /// | Operation   | Semantics/RTL        | Encoding |
  /// |-------------|----------------------|----------|
  /// | Integer Add | `r[R] ← r[S] + r[T]` | `5R ST`  |
  AddInt = 0x5,

  /// Adds two registers as custom floats (see [`crate::float`]) and truncates
  /// the real sum back into a byte.
  ///
  /// | Operation | Semantics/RTL                   | Encoding |
  /// |-----------|---------------------------------|----------|
  /// | Float Add | `r[R] ← ⌊f(r[S]) + f(r[T])⌋`    | `6R ST`  |
  AddFloat = 0x6,

  /// | Operation | Semantics/RTL        | Encoding |
  /// |-----------|----------------------|----------|
  /// | Or        | `r[R] ← r[S] ∨ r[T]` | `7R ST`  |
  Or = 0x7,

  /// | Operation | Semantics/RTL        | Encoding |
  /// |-----------|----------------------|----------|
  /// | And       | `r[R] ← r[S] ∧ r[T]` | `8R ST`  |
  And = 0x8,

  /// | Operation | Semantics/RTL        | Encoding |
  /// |-----------|----------------------|----------|
  /// | Xor       | `r[R] ← r[S] ⊕ r[T]` | `9R ST`  |
  Xor = 0x9,

  /// Historically called "rotate", but bits shifted out are lost: this is a
  /// logical right shift.
  ///
  /// | Operation   | Semantics/RTL      | Encoding |
  /// |-------------|--------------------|----------|
  /// | Shift Right | `r[R] ← r[R] >> S` | `AR S0`  |
  Shift = 0xA,

  /// Jumps when a register matches register 0.
  ///
  /// | Operation     | Semantics/RTL                   | Encoding |
  /// |---------------|---------------------------------|----------|
  /// | Jump If Equal | `if r[R] = r[0] : pc ← XY`      | `BR XY`  |
  JumpIfEqual = 0xB,

  /// | Operation | Semantics/RTL      | Encoding |
  /// |-----------|--------------------|----------|
  /// | Halt      | `(stop execution)` | `C0 00`  |
  Halt = 0xC,
}

impl Opcode {
  /// Maps the low four bits of `maybe_nibble` onto an opcode. Nibbles `0x0`,
  /// `0xD`, `0xE` and `0xF` are not assigned.
  pub fn from_nibble(maybe_nibble: u8) -> Option<Self> {
    match maybe_nibble & 0x0F {
      0x1 => Some(Self::Load),
      0x2 => Some(Self::LoadImmediate),
      0x3 => Some(Self::Store),
      0x4 => Some(Self::Move),
      0x5 => Some(Self::AddInt),
      0x6 => Some(Self::AddFloat),
      0x7 => Some(Self::Or),
      0x8 => Some(Self::And),
      0x9 => Some(Self::Xor),
      0xA => Some(Self::Shift),
      0xB => Some(Self::JumpIfEqual),
      0xC => Some(Self::Halt),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nibble_round_trips_through_discriminant() {
    for nibble in 0x1..=0xC {
      let op = Opcode::from_nibble(nibble).unwrap();
      assert_eq!(op as u8, nibble);
    }
  }

  #[test]
  fn unassigned_nibbles() {
    for nibble in [0x0, 0xD, 0xE, 0xF] {
      assert_eq!(Opcode::from_nibble(nibble), None);
    }
  }

  #[test]
  fn only_the_low_nibble_counts() {
    assert_eq!(Opcode::from_nibble(0xF2), Some(Opcode::LoadImmediate));
  }
}
