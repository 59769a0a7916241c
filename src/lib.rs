//! A small teaching machine: sixteen 8-bit registers, 256 bytes of memory and
//! a two-byte instruction format with a 4-bit opcode.
//!
//! The instruction set is twelve opcodes wide (load, store, move, integer and
//! "custom float" add, or/and/xor, shift, jump-if-equal and halt). See
//! [`opcode::Opcode`] for the table and [`vm::Vm`] for the machine itself.

pub mod config;
pub mod float;
pub mod instruction;
pub mod opcode;
pub mod patch;
pub mod region;
pub mod snapshot;
pub mod vm;
