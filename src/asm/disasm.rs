//! Disassembler for Synacor programs.
//!
//! Produces a linear listing over an address range using the same decoder
//! as the CPU. Runs of `OUT` instructions with literal operands are folded
//! into a single string, which makes embedded messages readable.

use crate::cpu::{decode, Instruction, Memory, Opcode, MEMORY_SIZE};
use crate::word::Operand;
use serde::Serialize;
use std::fmt::Write;

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Line {
    /// A decoded instruction.
    Instruction {
        addr: u16,
        opcode: Opcode,
        operands: Vec<Operand>,
    },
    /// Consecutive `OUT <literal>` instructions starting at `addr`, each
    /// printing a single byte.
    Text { addr: u16, text: String },
    /// A word that does not decode as an instruction.
    Data { addr: u16, word: u16 },
}

impl From<&Instruction> for Line {
    fn from(instr: &Instruction) -> Self {
        Line::Instruction {
            addr: instr.addr,
            opcode: instr.opcode,
            operands: instr.operands().to_vec(),
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Line::Instruction { addr, opcode, operands } => {
                write!(f, "0x{:04X}: {}", addr, opcode)?;
                for op in operands {
                    write!(f, " {}", op)?;
                }
                Ok(())
            }
            Line::Text { addr, text } => {
                write!(f, "0x{:04X}: STRING \"{}\"", addr, text.escape_debug())
            }
            Line::Data { addr, word } => write!(f, "0x{:04X}: .word 0x{:04X}", addr, word),
        }
    }
}

/// A disassembled address range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Listing {
    pub lines: Vec<Line>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Format a single instruction as `0xAAAA: MNEMONIC operands`.
pub fn disassemble_instruction(instr: &Instruction) -> String {
    let mut out = String::new();
    let _ = write!(out, "0x{:04X}: {}", instr.addr, instr);
    out
}

/// One trace line: the instruction indented two spaces per call level.
pub fn format_trace(depth: usize, instr: &Instruction) -> String {
    format!("{}{}", "  ".repeat(depth), disassemble_instruction(instr))
}

/// Disassemble `length` words starting at `offset`.
///
/// Scanning stops at the end of the range or the end of memory, whichever
/// comes first. The last instruction may extend past the range.
pub fn disassemble(mem: &Memory, offset: u16, length: usize) -> Listing {
    let end = (offset as usize).saturating_add(length).min(MEMORY_SIZE);
    let mut lines = Vec::new();
    let mut text: Option<(u16, String)> = None;
    let mut pc = offset as usize;

    while pc < end {
        let addr = pc as u16;
        match decode(mem, addr) {
            Ok(instr) => {
                let byte = match (instr.opcode, instr.a()) {
                    (Opcode::Out, Operand::Literal(ch)) => u8::try_from(ch).ok(),
                    _ => None,
                };
                if let Some(byte) = byte {
                    text.get_or_insert_with(|| (addr, String::new()))
                        .1
                        .push(char::from(byte));
                } else {
                    close_text(&mut text, &mut lines);
                    lines.push(Line::from(&instr));
                }
                pc += instr.len() as usize;
            }
            Err(_) => {
                close_text(&mut text, &mut lines);
                lines.push(Line::Data { addr, word: mem.as_slice()[pc] });
                pc += 1;
            }
        }
    }
    close_text(&mut text, &mut lines);

    Listing { lines }
}

fn close_text(text: &mut Option<(u16, String)>, lines: &mut Vec<Line>) {
    if let Some((addr, text)) = text.take() {
        lines.push(Line::Text { addr, text });
    }
}
