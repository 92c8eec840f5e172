//! Instruction decoder.
//!
//! An instruction is one opcode word followed by 0-3 operand words. The
//! operand count depends only on the opcode and comes from a fixed arity
//! table. Decoding reads memory but never writes it, so the same address can
//! be decoded any number of times.

use crate::cpu::Memory;
use crate::word::Operand;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Most operands any instruction takes.
pub const MAX_OPERANDS: usize = 3;

/// The 22 Synacor opcodes, numbered by their encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u16)]
pub enum Opcode {
    /// Stop execution.
    Halt = 0,
    /// `set a b`: register a := b
    Set = 1,
    /// `push a`: push a onto the stack
    Push = 2,
    /// `pop a`: register a := pop
    Pop = 3,
    /// `eq a b c`: a := (b == c)
    Eq = 4,
    /// `gt a b c`: a := (b > c)
    Gt = 5,
    /// `jmp a`
    Jmp = 6,
    /// `jt a b`: jump to b if a is nonzero
    Jt = 7,
    /// `jf a b`: jump to b if a is zero
    Jf = 8,
    /// `add a b c`: a := (b + c) mod 32768
    Add = 9,
    /// `mult a b c`: a := (b * c) mod 32768
    Mult = 10,
    /// `mod a b c`: a := b mod c
    Mod = 11,
    /// `and a b c`
    And = 12,
    /// `or a b c`
    Or = 13,
    /// `not a b`: 15-bit complement
    Not = 14,
    /// `rmem a b`: a := memory[b]
    Rmem = 15,
    /// `wmem a b`: memory[a] := b
    Wmem = 16,
    /// `call a`: push the return address, jump to a
    Call = 17,
    /// `ret`: pop and jump; halts on an empty stack
    Ret = 18,
    /// `out a`: write character a
    Out = 19,
    /// `in a`: read a character into a
    In = 20,
    /// No operation.
    Noop = 21,
}

/// Operand count for each opcode, indexed by encoding.
const ARITY: [u8; 22] = [
    0, 2, 1, 1, 3, 3,
    1, 2, 2, 3, 3, 3,
    3, 3, 2, 2, 2, 1,
    0, 1, 1, 0,
];

const MNEMONICS: [&str; 22] = [
    "HALT", "SET", "PUSH", "POP", "EQ", "GT",
    "JMP", "JT", "JF", "ADD", "MULT", "MOD",
    "AND", "OR", "NOT", "RMEM", "WMEM",
    "CALL", "RET", "OUT", "IN", "NOOP",
];

impl Opcode {
    /// Every opcode in encoding order.
    pub const ALL: [Opcode; 22] = [
        Opcode::Halt, Opcode::Set, Opcode::Push, Opcode::Pop, Opcode::Eq, Opcode::Gt,
        Opcode::Jmp, Opcode::Jt, Opcode::Jf, Opcode::Add, Opcode::Mult, Opcode::Mod,
        Opcode::And, Opcode::Or, Opcode::Not, Opcode::Rmem, Opcode::Wmem,
        Opcode::Call, Opcode::Ret, Opcode::Out, Opcode::In, Opcode::Noop,
    ];

    /// Decode an opcode word. Anything outside 0-21 is `None`.
    pub fn from_word(word: u16) -> Option<Self> {
        Self::ALL.get(word as usize).copied()
    }

    /// Number of operand words following the opcode.
    #[inline]
    pub fn arity(self) -> usize {
        ARITY[self as usize] as usize
    }

    pub fn mnemonic(self) -> &'static str {
        MNEMONICS[self as usize]
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction.
///
/// Instructions are transient: the engine decodes a fresh one from memory at
/// every step, so self-modifying programs behave correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode word.
    pub addr: u16,
    pub opcode: Opcode,
    operands: [Operand; MAX_OPERANDS],
}

impl Instruction {
    /// The operands actually encoded for this opcode.
    pub fn operands(&self) -> &[Operand] {
        &self.operands[..self.opcode.arity()]
    }

    /// First operand (write target for most opcodes).
    #[inline]
    pub fn a(&self) -> Operand {
        self.operands[0]
    }

    #[inline]
    pub fn b(&self) -> Operand {
        self.operands[1]
    }

    #[inline]
    pub fn c(&self) -> Operand {
        self.operands[2]
    }

    /// Encoded length in words: the opcode plus its operands.
    #[inline]
    pub fn len(&self) -> u16 {
        1 + self.opcode.arity() as u16
    }

    /// Address of the word following this instruction.
    #[inline]
    pub fn next_addr(&self) -> u16 {
        self.addr.wrapping_add(self.len())
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.opcode)?;
        for op in self.operands() {
            write!(f, " {}", op)?;
        }
        Ok(())
    }
}

/// Decode the instruction at `pc`.
pub fn decode(mem: &Memory, pc: u16) -> Result<Instruction, DecodeError> {
    let word = mem.read(pc).map_err(|_| DecodeError::Truncated { addr: pc })?;

    // Range-check before the arity table is consulted.
    let opcode = Opcode::from_word(word)
        .ok_or(DecodeError::UnknownOpcode { opcode: word, addr: pc })?;

    let mut operands = [Operand::default(); MAX_OPERANDS];
    for (i, slot) in operands.iter_mut().take(opcode.arity()).enumerate() {
        let at = pc.checked_add(1 + i as u16).ok_or(DecodeError::Truncated { addr: pc })?;
        let raw = mem.read(at).map_err(|_| DecodeError::Truncated { addr: pc })?;
        *slot = Operand::resolve(raw);
    }

    Ok(Instruction { addr: pc, opcode, operands })
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("unknown opcode {opcode} at {addr:#06x}")]
    UnknownOpcode { opcode: u16, addr: u16 },

    #[error("instruction at {addr:#06x} extends past the end of memory")]
    Truncated { addr: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(words: &[u16]) -> Memory {
        let mut mem = Memory::new();
        mem.load_program(words).unwrap();
        mem
    }

    #[test]
    fn test_arity_table() {
        let expected = [
            (Opcode::Halt, 0), (Opcode::Set, 2), (Opcode::Push, 1), (Opcode::Pop, 1),
            (Opcode::Eq, 3), (Opcode::Gt, 3), (Opcode::Jmp, 1), (Opcode::Jt, 2),
            (Opcode::Jf, 2), (Opcode::Add, 3), (Opcode::Mult, 3), (Opcode::Mod, 3),
            (Opcode::And, 3), (Opcode::Or, 3), (Opcode::Not, 2), (Opcode::Rmem, 2),
            (Opcode::Wmem, 2), (Opcode::Call, 1), (Opcode::Ret, 0), (Opcode::Out, 1),
            (Opcode::In, 1), (Opcode::Noop, 0),
        ];
        for (op, arity) in expected {
            assert_eq!(op.arity(), arity, "arity of {}", op);
        }
    }

    #[test]
    fn test_opcode_from_word() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(Opcode::from_word(i as u16), Some(*op));
            assert_eq!(*op as u16, i as u16);
        }
        assert_eq!(Opcode::from_word(22), None);
        assert_eq!(Opcode::from_word(9999), None);
    }

    #[test]
    fn test_decode_halt() {
        let mem = memory_with(&[0]);
        let instr = decode(&mem, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Halt);
        assert!(instr.operands().is_empty());
        assert_eq!(instr.len(), 1);
    }

    #[test]
    fn test_decode_add_mixed_operands() {
        let mem = memory_with(&[9, 32768, 32769, 4]);
        let instr = decode(&mem, 0).unwrap();
        assert_eq!(instr.opcode, Opcode::Add);
        assert_eq!(
            instr.operands(),
            &[Operand::Register(0), Operand::Register(1), Operand::Literal(4)]
        );
        assert_eq!(instr.len(), 4);
        assert_eq!(instr.next_addr(), 4);
    }

    #[test]
    fn test_decode_at_offset() {
        let mem = memory_with(&[21, 19, 65, 0]);
        let instr = decode(&mem, 1).unwrap();
        assert_eq!(instr.addr, 1);
        assert_eq!(instr.opcode, Opcode::Out);
        assert_eq!(instr.a(), Operand::Literal(65));
    }

    #[test]
    fn test_decode_is_repeatable() {
        let mem = memory_with(&[1, 32770, 7]);
        assert_eq!(decode(&mem, 0).unwrap(), decode(&mem, 0).unwrap());
    }

    #[test]
    fn test_decode_unknown_opcode() {
        let mem = memory_with(&[9999]);
        assert_eq!(
            decode(&mem, 0),
            Err(DecodeError::UnknownOpcode { opcode: 9999, addr: 0 })
        );
    }

    #[test]
    fn test_decode_truncated_at_memory_end() {
        let mut mem = Memory::new();
        mem.write(0x7FFE, 9).unwrap();
        assert_eq!(decode(&mem, 0x7FFE), Err(DecodeError::Truncated { addr: 0x7FFE }));
        assert_eq!(decode(&mem, 0x8000), Err(DecodeError::Truncated { addr: 0x8000 }));
    }

    #[test]
    fn test_display() {
        let mem = memory_with(&[4, 32771, 32768, 10]);
        assert_eq!(decode(&mem, 0).unwrap().to_string(), "EQ r3 r0 0x000A");
    }
}
