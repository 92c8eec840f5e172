//! Program image loading and disassembly.
//!
//! This module provides:
//! - The binary image format (little-endian words → memory)
//! - A linear disassembler (memory → readable text)

pub mod disasm;
pub mod image;

pub use disasm::{disassemble, disassemble_instruction, format_trace, Line, Listing};
pub use image::{encode_image, load_image, parse_image, ImageError, ProgramImage};
