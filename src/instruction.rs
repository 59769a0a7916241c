use crate::float;
use crate::opcode::Opcode;

/// A decoded two-byte instruction.
///
/// Each variant only carries the operand fields its opcode actually reads.
/// Register operands are already narrowed to `0..16` and can index the
/// register file directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
  /// `r[reg] ← m[address]`
  Load { reg: usize, address: u8 },
  /// `r[reg] ← value`
  LoadImmediate { reg: usize, value: u8 },
  /// `m[address] ← r[reg]`
  Store { reg: usize, address: u8 },
  /// `r[dst] ← r[src]`
  Move { src: usize, dst: usize },
  /// `r[dst] ← op(r[lhs], r[rhs])`
  Alu {
    op: AluOp,
    dst: usize,
    lhs: usize,
    rhs: usize,
  },
  /// `r[reg] ← r[reg] >> amount`
  Shift { reg: usize, amount: u8 },
  /// `if r[reg] = r[0] : pc ← target`
  JumpIfEqual { reg: usize, target: u8 },
  Halt,
  /// The opcode nibble has no meaning. Executing it changes nothing, not
  /// even the program counter.
  Undefined { opcode: u8 },
}

/// The three-register operations, opcodes `5` through `9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
  AddInt,
  AddFloat,
  Or,
  And,
  Xor,
}

impl AluOp {
  pub fn apply(self, lhs: u8, rhs: u8) -> u8 {
    match self {
      // 8-bit two's complement, overflow wraps
      Self::AddInt => (lhs as i8).wrapping_add(rhs as i8) as u8,
      Self::AddFloat => float::truncate(float::decode(lhs) + float::decode(rhs)),
      Self::Or => lhs | rhs,
      Self::And => lhs & rhs,
      Self::Xor => lhs ^ rhs,
    }
  }
}

#[inline]
fn high(byte: u8) -> u8 {
  byte >> 4
}

#[inline]
fn low(byte: u8) -> u8 {
  byte & 0x0F
}

impl Instruction {
  /// Splits the two fetched bytes into opcode and operands.
  ///
  /// A zero first byte is a blank cell rather than an instruction, and
  /// yields `None`.
  pub fn decode(low_byte: u8, high_byte: u8) -> Option<Self> {
    if low_byte == 0 {
      return None;
    }
    let r = low(low_byte) as usize;
    let s = high(high_byte) as usize;
    let t = low(high_byte) as usize;
    let xy = high_byte;

    let Some(op) = Opcode::from_nibble(high(low_byte)) else {
      return Some(Self::Undefined {
        opcode: high(low_byte),
      });
    };
    let alu = |op| Self::Alu {
      op,
      dst: r,
      lhs: s,
      rhs: t,
    };
    let instruction = match op {
      Opcode::Load => Self::Load {
        reg: r,
        address: xy,
      },
      Opcode::LoadImmediate => Self::LoadImmediate { reg: r, value: xy },
      Opcode::Store => Self::Store {
        reg: r,
        address: xy,
      },
      Opcode::Move => Self::Move { src: s, dst: t },
      Opcode::AddInt => alu(AluOp::AddInt),
      Opcode::AddFloat => alu(AluOp::AddFloat),
      Opcode::Or => alu(AluOp::Or),
      Opcode::And => alu(AluOp::And),
      Opcode::Xor => alu(AluOp::Xor),
      Opcode::Shift => Self::Shift {
        reg: r,
        amount: high(high_byte),
      },
      Opcode::JumpIfEqual => Self::JumpIfEqual { reg: r, target: xy },
      Opcode::Halt => Self::Halt,
    };
    Some(instruction)
  }

  /// The opcode this instruction was decoded from, if it had one.
  pub fn opcode(&self) -> Option<Opcode> {
    let op = match self {
      Self::Load { .. } => Opcode::Load,
      Self::LoadImmediate { .. } => Opcode::LoadImmediate,
      Self::Store { .. } => Opcode::Store,
      Self::Move { .. } => Opcode::Move,
      Self::Alu { op, .. } => match op {
        AluOp::AddInt => Opcode::AddInt,
        AluOp::AddFloat => Opcode::AddFloat,
        AluOp::Or => Opcode::Or,
        AluOp::And => Opcode::And,
        AluOp::Xor => Opcode::Xor,
      },
      Self::Shift { .. } => Opcode::Shift,
      Self::JumpIfEqual { .. } => Opcode::JumpIfEqual,
      Self::Halt => Opcode::Halt,
      Self::Undefined { .. } => return None,
    };
    Some(op)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use rstest::rstest;

  #[rstest]
  #[case([0x1A, 0x42], Instruction::Load { reg: 0xA, address: 0x42 })]
  #[case([0x20, 0xA3], Instruction::LoadImmediate { reg: 0, value: 0xA3 })]
  #[case([0x30, 0x05], Instruction::Store { reg: 0, address: 0x05 })]
  #[case([0x40, 0x12], Instruction::Move { src: 1, dst: 2 })]
  #[case([0x4F, 0x12], Instruction::Move { src: 1, dst: 2 })]
  #[case([0x53, 0x12], Instruction::Alu { op: AluOp::AddInt, dst: 3, lhs: 1, rhs: 2 })]
  #[case([0x63, 0x12], Instruction::Alu { op: AluOp::AddFloat, dst: 3, lhs: 1, rhs: 2 })]
  #[case([0x7F, 0xED], Instruction::Alu { op: AluOp::Or, dst: 0xF, lhs: 0xE, rhs: 0xD })]
  #[case([0x80, 0x00], Instruction::Alu { op: AluOp::And, dst: 0, lhs: 0, rhs: 0 })]
  #[case([0x91, 0x23], Instruction::Alu { op: AluOp::Xor, dst: 1, lhs: 2, rhs: 3 })]
  #[case([0xA4, 0x30], Instruction::Shift { reg: 4, amount: 3 })]
  #[case([0xB1, 0x10], Instruction::JumpIfEqual { reg: 1, target: 0x10 })]
  #[case([0xC0, 0x00], Instruction::Halt)]
  #[case([0xD0, 0x00], Instruction::Undefined { opcode: 0xD })]
  #[case([0x05, 0xFF], Instruction::Undefined { opcode: 0x0 })]
  fn decodes(#[case] bytes: [u8; 2], #[case] expected: Instruction) {
    assert_eq!(Instruction::decode(bytes[0], bytes[1]), Some(expected));
  }

  #[test]
  fn blank_first_byte_is_not_an_instruction() {
    assert_eq!(Instruction::decode(0x00, 0x00), None);
    assert_eq!(Instruction::decode(0x00, 0xC0), None);
  }

  #[test]
  fn opcode_matches_the_nibble() {
    for nibble in 0x1..=0xCu8 {
      let instruction = Instruction::decode(nibble << 4, 0x12).unwrap();
      assert_eq!(instruction.opcode().map(|op| op as u8), Some(nibble));
    }
    let undefined = Instruction::decode(0xE1, 0x00).unwrap();
    assert_eq!(undefined.opcode(), None);
  }

  #[rstest]
  #[case::wraps_positive(AluOp::AddInt, 0x7F, 0x01, 0x80)]
  #[case::minus_one_plus_one(AluOp::AddInt, 0xFF, 0x01, 0x00)]
  #[case::negatives(AluOp::AddInt, 0x80, 0x80, 0x00)]
  #[case::plain(AluOp::AddInt, 0x03, 0x04, 0x07)]
  #[case::float_halves(AluOp::AddFloat, 0x05, 0x05, 128)]
  #[case::float_truncates(AluOp::AddFloat, 0x03, 0x03, 76)]
  #[case::float_cancels(AluOp::AddFloat, 0x05, 0x85, 0)]
  #[case::or(AluOp::Or, 0b1100, 0b1010, 0b1110)]
  #[case::and(AluOp::And, 0b1100, 0b1010, 0b1000)]
  #[case::xor(AluOp::Xor, 0b1100, 0b1010, 0b0110)]
  fn alu(#[case] op: AluOp, #[case] lhs: u8, #[case] rhs: u8, #[case] expected: u8) {
    assert_eq!(op.apply(lhs, rhs), expected);
  }
}
