//! 16-bit word primitives.
//!
//! Every memory cell, register and instruction field is a 16-bit word:
//! - `0..=32767` - a literal value
//! - `32768..=32775` - a reference to one of the eight registers
//! - `32776..` - invalid, rejected wherever a register is required

mod operand;
pub mod arith;

pub use operand::{Operand, is_literal, is_register, register_index};
pub use arith::MODULUS;

/// Number of registers in the register file.
pub const NUM_REGISTERS: usize = 8;

/// First word that denotes a register (`r0`).
pub const REGISTER_BASE: u16 = 32768;
