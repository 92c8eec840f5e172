//! Operand resolution.
//!
//! A raw operand word is classified once, when its instruction is decoded.
//! Register operands carry a register index, never a reference into the
//! register file, so the file can be replaced or reset freely.

use crate::word::{NUM_REGISTERS, REGISTER_BASE};
use serde::{Serialize, Deserialize};

/// Returns true if `raw` is a literal value (0-32767).
#[inline]
pub fn is_literal(raw: u16) -> bool {
    raw < REGISTER_BASE
}

/// Returns true if `raw` denotes one of the eight registers (32768-32775).
#[inline]
pub fn is_register(raw: u16) -> bool {
    (REGISTER_BASE..REGISTER_BASE + NUM_REGISTERS as u16).contains(&raw)
}

/// Register index of a register-reference word.
///
/// Only meaningful when [`is_register`] holds; the result is always in 0-7.
#[inline]
pub fn register_index(raw: u16) -> usize {
    (raw.wrapping_sub(REGISTER_BASE) as usize) % NUM_REGISTERS
}

/// A resolved instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Operand {
    /// Immediate value, read-only.
    Literal(u16),
    /// Register slot 0-7, readable and writable.
    Register(u8),
    /// A word of 32776 or above.
    Invalid(u16),
}

impl Operand {
    /// Classify a raw word.
    pub fn resolve(raw: u16) -> Self {
        if is_literal(raw) {
            Operand::Literal(raw)
        } else if is_register(raw) {
            Operand::Register(register_index(raw) as u8)
        } else {
            Operand::Invalid(raw)
        }
    }

    /// The raw word this operand was decoded from.
    pub fn raw(self) -> u16 {
        match self {
            Operand::Literal(v) | Operand::Invalid(v) => v,
            Operand::Register(r) => REGISTER_BASE + r as u16,
        }
    }

    /// Register index, if this operand can be written to.
    pub fn register(self) -> Option<usize> {
        match self {
            Operand::Register(r) => Some(r as usize),
            _ => None,
        }
    }
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Literal(0)
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "0x{:04X}", v),
            Operand::Register(r) => write!(f, "r{}", r),
            Operand::Invalid(v) => write!(f, "?0x{:04X}", v),
        }
    }
}
