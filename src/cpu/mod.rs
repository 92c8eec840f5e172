//! CPU emulation for the Synacor architecture.
//!
//! This module implements the complete machine:
//! - 32768 sixteen-bit memory words
//! - 8 registers and an unbounded stack
//! - 22-instruction set with 0-3 operands per instruction

pub mod memory;
pub mod registers;
pub mod stack;
pub mod decode;
pub mod execute;
pub mod io;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::Registers;
pub use stack::Stack;
pub use decode::{decode, Instruction, Opcode, DecodeError};
pub use execute::{Cpu, CpuError, CpuState, Fault, EMPTY_STACK_SENTINEL};
pub use io::{Input, Output, LineInput};
