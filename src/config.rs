//! Run configuration for the machine and its front end.
//!
//! Supplied as JSON; every field is optional and falls back to the values
//! in [`defaults`].

use serde::{Deserialize, Serialize};

use crate::vm::Error;

mod defaults {
  /// Where execution starts.
  pub const START_PC: u8 = 0x00;

  /// Steps allowed before a run gives up on reaching a halt. A program can
  /// spin forever on a self-jump or an undefined opcode.
  pub const STEP_LIMIT: usize = 10_000;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub start_pc: u8,
  pub step_limit: usize,
  /// Log every executed instruction.
  pub trace: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      start_pc: defaults::START_PC,
      step_limit: defaults::STEP_LIMIT,
      trace: false,
    }
  }
}

impl Config {
  pub fn from_json(text: &str) -> Result<Self, Error> {
    Ok(serde_json::from_str(text)?)
  }
}
