//! The register file: eight 16-bit slots, `r0` through `r7`.
//!
//! Indices are always reduced modulo 8, so no access can fall outside the
//! file.

use crate::word::NUM_REGISTERS;

/// The Synacor register file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    slots: [u16; NUM_REGISTERS],
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.slots = [0; NUM_REGISTERS];
    }

    /// Read register `index` (mod 8).
    #[inline]
    pub fn get(&self, index: usize) -> u16 {
        self.slots[index % NUM_REGISTERS]
    }

    /// Write register `index` (mod 8).
    #[inline]
    pub fn set(&mut self, index: usize, value: u16) {
        self.slots[index % NUM_REGISTERS] = value;
    }

    /// All eight slots, `r0` first.
    pub fn as_array(&self) -> [u16; NUM_REGISTERS] {
        self.slots
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, v) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "r{}={:#06x}", i, v)?;
        }
        Ok(())
    }
}
