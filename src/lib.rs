//! # Synacor VM
//!
//! A virtual machine for the Synacor challenge architecture: 32768 words of
//! 16-bit memory, eight registers, an unbounded stack and a 22-opcode
//! instruction set with 15-bit arithmetic.
//!
//! The [`cpu`] module holds the machine itself, [`asm`] the image loader
//! and disassembler, and [`word`] the operand and arithmetic primitives.

pub mod word;
pub mod cpu;
pub mod asm;

// Re-export commonly used types
pub use word::Operand;
pub use cpu::{Cpu, CpuState, CpuError, Fault, Memory, Registers, Stack, Instruction, Opcode};
pub use cpu::{Input, Output, LineInput};
pub use asm::{disassemble, load_image, parse_image, ImageError, ProgramImage};
