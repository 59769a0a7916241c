use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::instruction::Instruction;
use crate::region::Region;

/// Number of general purpose registers.
pub const REGISTERS: usize = 16;

/// Bytes of addressable memory.
pub const MEMORY: usize = 256;

/// Highest program counter an instruction can be fetched from. Fetches are
/// valid at `0..=253`; 254 and 255 fault.
pub const LAST_FETCH: u8 = (MEMORY - 3) as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Running,
  Halted,
}

/// The storage cell written by the most recent step, so a front end can
/// highlight it. Nothing in execution reads this back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastWrite {
  #[default]
  None,
  Register(usize),
  Memory(usize),
}

/// A 16 register, 256 byte machine with two-byte instructions.
///
/// The machine is stepped from outside: [`Vm::step`] runs exactly one
/// instruction, and state may be patched freely between steps through the
/// setters.
#[derive(Debug, Clone)]
pub struct Vm {
  pc: u8,
  registers: [u8; REGISTERS],
  memory: [u8; MEMORY],
  state: State,
  last_write: LastWrite,
  last_pc: Option<u8>,
  retired: u64,
}

impl Vm {
  /// Create a new, zeroed virtual machine
  pub fn new() -> Self {
    Self {
      pc: 0,
      registers: [0; REGISTERS],
      memory: [0; MEMORY],
      state: State::Running,
      last_write: LastWrite::None,
      last_pc: None,
      retired: 0,
    }
  }

  pub fn with_config(config: &Config) -> Self {
    let mut vm = Self::new();
    vm.pc = config.start_pc;
    vm
  }

  pub fn registers(&self) -> &[u8; REGISTERS] {
    &self.registers
  }

  pub fn memory(&self) -> &[u8; MEMORY] {
    &self.memory
  }

  pub fn pc(&self) -> u8 {
    self.pc
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn is_halted(&self) -> bool {
    self.state == State::Halted
  }

  pub fn last_write(&self) -> LastWrite {
    self.last_write
  }

  /// Address of the last instruction that executed.
  pub fn last_pc(&self) -> Option<u8> {
    self.last_pc
  }

  /// Instructions executed since construction or the last [`Vm::reset`].
  pub fn retired(&self) -> u64 {
    self.retired
  }

  pub fn register(&self, index: usize) -> Result<u8, Error> {
    self
      .registers
      .get(index)
      .copied()
      .ok_or(Error::RegisterOutOfRange(index))
  }

  pub fn read_memory(&self, address: usize) -> Result<u8, Error> {
    self
      .memory
      .get(address)
      .copied()
      .ok_or(Error::AddressOutOfRange(address))
  }

  pub fn set_register(&mut self, index: usize, value: u8) -> Result<(), Error> {
    let slot = self
      .registers
      .get_mut(index)
      .ok_or(Error::RegisterOutOfRange(index))?;
    *slot = value;
    Ok(())
  }

  pub fn set_memory(&mut self, address: usize, value: u8) -> Result<(), Error> {
    let slot = self
      .memory
      .get_mut(address)
      .ok_or(Error::AddressOutOfRange(address))?;
    *slot = value;
    Ok(())
  }

  pub fn clear_register(&mut self, index: usize) -> Result<(), Error> {
    self.set_register(index, 0)
  }

  pub fn clear_memory(&mut self, address: usize) -> Result<(), Error> {
    self.set_memory(address, 0)
  }

  /// Relocates execution. Any byte is accepted; a pc past [`LAST_FETCH`]
  /// only fails once the next step tries to fetch from it.
  pub fn set_pc(&mut self, pc: u8) {
    self.pc = pc;
  }

  /// Copies a program image into memory at its origin.
  pub fn load<R>(&mut self, region: &R) -> Result<(), Error>
  where
    R: Region,
  {
    let origin = region.origin() as usize;
    let bytes = region.bytes();
    let target = self
      .memory
      .get_mut(origin..origin + bytes.len())
      .ok_or(Error::ProgramTooLarge {
        origin: region.origin(),
        len: bytes.len(),
      })?;
    target.copy_from_slice(bytes);
    debug!(origin, len = bytes.len(), "loaded program");
    Ok(())
  }

  /// Zero everything and leave the halted state.
  pub fn reset(&mut self) {
    *self = Self::new();
    debug!("machine reset");
  }

  pub(crate) fn halt(&mut self) {
    self.state = State::Halted;
  }

  /// Fetch, decode and execute a single instruction.
  ///
  /// On error nothing about the machine has changed. An undefined opcode is
  /// *not* an error: it executes as a no-op that leaves the program counter
  /// where it was, so stepping again will execute it again.
  pub fn step(&mut self) -> Result<Instruction, Error> {
    if self.state == State::Halted {
      return Err(Error::MachineHalted);
    }
    let pc = self.pc;
    let (low_byte, high_byte) = self.fetch()?;
    let instruction =
      Instruction::decode(low_byte, high_byte).ok_or(Error::BlankInstruction(pc))?;
    trace!(pc, ?instruction, "executing");
    self.execute(instruction);
    self.last_pc = Some(pc);
    self.retired += 1;
    Ok(instruction)
  }

  /// Step until the machine halts, giving up after `limit` steps. Returns the
  /// number of instructions executed.
  pub fn run(&mut self, limit: usize) -> Result<usize, Error> {
    for executed in 0..limit {
      if self.is_halted() {
        return Ok(executed);
      }
      self.step()?;
    }
    if self.is_halted() {
      Ok(limit)
    } else {
      Err(Error::StepLimit(limit))
    }
  }

  fn fetch(&self) -> Result<(u8, u8), Error> {
    if self.pc > LAST_FETCH {
      return Err(Error::FetchOutOfBounds(self.pc));
    }
    let pc = self.pc as usize;
    Ok((self.memory[pc], self.memory[pc + 1]))
  }

  fn execute(&mut self, instruction: Instruction) {
    let next = self.pc.wrapping_add(2);
    self.last_write = LastWrite::None;
    match instruction {
      Instruction::Load { reg, address } => {
        self.registers[reg] = self.memory[address as usize];
        self.last_write = LastWrite::Register(reg);
        self.pc = next;
      }
      Instruction::LoadImmediate { reg, value } => {
        self.registers[reg] = value;
        self.last_write = LastWrite::Register(reg);
        self.pc = next;
      }
      Instruction::Store { reg, address } => {
        self.memory[address as usize] = self.registers[reg];
        self.last_write = LastWrite::Memory(address as usize);
        self.pc = next;
      }
      Instruction::Move { src, dst } => {
        self.registers[dst] = self.registers[src];
        self.last_write = LastWrite::Register(dst);
        self.pc = next;
      }
      Instruction::Alu { op, dst, lhs, rhs } => {
        self.registers[dst] = op.apply(self.registers[lhs], self.registers[rhs]);
        self.last_write = LastWrite::Register(dst);
        self.pc = next;
      }
      Instruction::Shift { reg, amount } => {
        // bits pushed past the bottom are gone; shifting by 8+ clears the byte
        self.registers[reg] = self.registers[reg]
          .checked_shr(u32::from(amount))
          .unwrap_or(0);
        self.last_write = LastWrite::Register(reg);
        self.pc = next;
      }
      Instruction::JumpIfEqual { reg, target } => {
        self.pc = if self.registers[reg] == self.registers[0] {
          target
        } else {
          next
        };
      }
      Instruction::Halt => {
        self.halt();
        self.pc = next;
        debug!(pc = self.pc, retired = self.retired + 1, "halted");
      }
      Instruction::Undefined { opcode } => {
        warn!(pc = self.pc, opcode, "undefined opcode, pc not advanced");
      }
    }
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::new()
  }
}

/// An error raised by the machine or by the text front end feeding it.
///
/// Every operation that returns one of these has left the machine exactly as
/// it found it.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("register r{0} does not exist (expected 0..16)")]
  RegisterOutOfRange(usize),

  #[error("memory address {0} does not exist (expected 0..256)")]
  AddressOutOfRange(usize),

  #[error("`{0}` is not a byte value (expected hex 00..FF)")]
  ValueOutOfRange(String),

  #[error("cannot fetch at {0:#04x}: instruction would run past the end of memory")]
  FetchOutOfBounds(u8),

  #[error("machine is halted")]
  MachineHalted,

  #[error("blank instruction at {0:#04x}")]
  BlankInstruction(u8),

  #[error("program of {len} bytes does not fit in memory at {origin:#04x}")]
  ProgramTooLarge { origin: u8, len: usize },

  #[error("snapshot has {registers} registers and {memory} memory cells")]
  SnapshotShape { registers: usize, memory: usize },

  #[error("no halt within {0} steps")]
  StepLimit(usize),

  #[error("malformed assignment `{0}` (expected r<reg>=<hex> or m<addr>=<hex>)")]
  MalformedPatch(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
