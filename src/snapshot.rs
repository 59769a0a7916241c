use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::vm::{Error, Vm, MEMORY, REGISTERS};

/// The raw machine state, for saving and restoring a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub pc: u8,
  pub halted: bool,
  pub registers: Vec<u8>,
  pub memory: Vec<u8>,
}

impl Snapshot {
  pub fn to_json(&self) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn from_json(text: &str) -> Result<Self, Error> {
    Ok(serde_json::from_str(text)?)
  }

  pub fn save(&self, path: &Path) -> Result<(), Error> {
    fs::write(path, self.to_json()?)?;
    debug!(path = %path.display(), "saved snapshot");
    Ok(())
  }
}

impl Vm {
  pub fn snapshot(&self) -> Snapshot {
    Snapshot {
      pc: self.pc(),
      halted: self.is_halted(),
      registers: self.registers().to_vec(),
      memory: self.memory().to_vec(),
    }
  }

  /// Builds a machine from a snapshot. The step bookkeeping (last write,
  /// last pc, retired count) starts fresh.
  pub fn restore(snapshot: &Snapshot) -> Result<Self, Error> {
    let shape = || Error::SnapshotShape {
      registers: snapshot.registers.len(),
      memory: snapshot.memory.len(),
    };
    let registers: [u8; REGISTERS] = snapshot
      .registers
      .as_slice()
      .try_into()
      .map_err(|_| shape())?;
    let memory: [u8; MEMORY] = snapshot
      .memory
      .as_slice()
      .try_into()
      .map_err(|_| shape())?;

    let mut vm = Vm::new();
    for (index, value) in registers.into_iter().enumerate() {
      vm.set_register(index, value)?;
    }
    for (address, value) in memory.into_iter().enumerate() {
      vm.set_memory(address, value)?;
    }
    vm.set_pc(snapshot.pc);
    if snapshot.halted {
      vm.halt();
    }
    debug!(pc = snapshot.pc, halted = snapshot.halted, "restored snapshot");
    Ok(vm)
  }
}
