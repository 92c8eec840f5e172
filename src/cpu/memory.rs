//! Main memory.
//!
//! A flat 15-bit address space of 32768 sixteen-bit words. The size never
//! changes after construction.

use thiserror::Error;

/// The number of addressable words.
pub const MEMORY_SIZE: usize = 32768;

/// Synacor memory: 32768 words, zero-initialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: Vec<u16>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read the word at `addr`.
    #[inline]
    pub fn read(&self, addr: u16) -> Result<u16, MemoryError> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(MemoryError::AddressOutOfRange(addr))
    }

    /// Write the word at `addr`.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u16) -> Result<(), MemoryError> {
        let cell = self.cells
            .get_mut(addr as usize)
            .ok_or(MemoryError::AddressOutOfRange(addr))?;
        *cell = value;
        Ok(())
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy a program image into memory starting at address 0.
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), MemoryError> {
        if program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available: MEMORY_SIZE,
            });
        }
        self.cells[..program.len()].copy_from_slice(program);
        Ok(())
    }

    /// All cells as a slice.
    pub fn as_slice(&self) -> &[u16] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&w| w != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {0:#06x} out of range (0x0000-0x7fff)")]
    AddressOutOfRange(u16),

    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
}
