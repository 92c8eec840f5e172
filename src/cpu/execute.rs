//! CPU execution engine.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers, Stack};
use crate::cpu::decode::{self, DecodeError, Instruction, Opcode};
use crate::cpu::io::{Input, Output};
use crate::cpu::memory::MemoryError;
use crate::word::{arith, Operand};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Value written by POP when the stack is empty.
pub const EMPTY_STACK_SENTINEL: u16 = 0xFFFF;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// Stopped by HALT, by RET on an empty stack, or by end of input.
    Halted,
    /// Stopped by an unrecoverable fault.
    Faulted(Fault),
}

/// The Synacor CPU.
pub struct Cpu<I, O> {
    /// General purpose registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Value and return-address stack.
    pub stack: Stack,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count.
    pub cycles: u64,
    pc: u16,
    depth: usize,
    last_instr: Option<Instruction>,
    input: I,
    output: O,
}

impl<I: Input, O: Output> Cpu<I, O> {
    /// Create a new CPU with zeroed state, wired to the given I/O.
    pub fn new(input: I, output: O) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            stack: Stack::new(),
            state: CpuState::Running,
            cycles: 0,
            pc: 0,
            depth: 0,
            last_instr: None,
            input,
            output,
        }
    }

    /// Reset the CPU to its initial state, clearing memory.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.stack.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.pc = 0;
        self.depth = 0;
        self.last_instr = None;
    }

    /// Load a program image at address 0.
    pub fn load_program(&mut self, program: &[u16]) -> Result<(), MemoryError> {
        self.mem.load_program(program)?;
        debug!(words = program.len(), "program loaded");
        Ok(())
    }

    /// Decode the instruction at the program counter without executing it.
    pub fn peek(&self) -> Result<Instruction, DecodeError> {
        decode::decode(&self.mem, self.pc)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed. A fault moves the CPU to
    /// [`CpuState::Faulted`] and is also returned as an error. An I/O error
    /// leaves the CPU running with the PC still on the failed instruction.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        // Fetch + decode
        let instr = match self.peek() {
            Ok(instr) => instr,
            Err(e) => return Err(self.fault(e.into())),
        };

        // Advance PC before execute (jumps, calls and returns override it)
        let pc = self.pc;
        self.pc = instr.next_addr();

        if let Err(e) = self.execute(&instr) {
            return Err(match e {
                CpuError::Fault(fault) => self.fault(fault),
                other => {
                    // I/O failed before any state changed; retry on next step
                    self.pc = pc;
                    other
                }
            });
        }

        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    fn fault(&mut self, fault: Fault) -> CpuError {
        warn!(pc = self.pc, %fault, "cpu faulted");
        self.state = CpuState::Faulted(fault);
        CpuError::Fault(fault)
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, instr: &Instruction) -> Result<(), CpuError> {
        match instr.opcode {
            // ==================== Control ====================

            Opcode::Halt => {
                debug!(addr = instr.addr, "halt");
                self.state = CpuState::Halted;
            }

            Opcode::Noop => {}

            Opcode::Jmp => {
                self.pc = self.value(instr.a());
            }

            Opcode::Jt => {
                if self.value(instr.a()) != 0 {
                    self.pc = self.value(instr.b());
                }
            }

            Opcode::Jf => {
                if self.value(instr.a()) == 0 {
                    self.pc = self.value(instr.b());
                }
            }

            Opcode::Call => {
                let dest = self.value(instr.a());
                self.stack.push(self.pc);
                self.depth += 1;
                self.pc = dest;
            }

            Opcode::Ret => {
                self.depth = self.depth.saturating_sub(1);
                match self.stack.pop() {
                    Some(ret) => self.pc = ret,
                    None => {
                        debug!(addr = instr.addr, "ret on empty stack");
                        self.state = CpuState::Halted;
                    }
                }
            }

            // ==================== Registers and Stack ====================

            Opcode::Set => {
                let a = self.target(instr, instr.a())?;
                let value = self.value(instr.b());
                self.regs.set(a, value);
            }

            Opcode::Push => {
                let value = self.value(instr.a());
                self.stack.push(value);
            }

            Opcode::Pop => {
                let a = self.target(instr, instr.a())?;
                let value = self.stack.pop().unwrap_or_else(|| {
                    warn!(addr = instr.addr, "pop on empty stack");
                    EMPTY_STACK_SENTINEL
                });
                self.regs.set(a, value);
            }

            // ==================== Arithmetic ====================

            Opcode::Eq => self.binary(instr, arith::eq)?,
            Opcode::Gt => self.binary(instr, arith::gt)?,
            Opcode::Add => self.binary(instr, arith::add)?,
            Opcode::Mult => self.binary(instr, arith::mult)?,
            Opcode::And => self.binary(instr, arith::and)?,
            Opcode::Or => self.binary(instr, arith::or)?,

            Opcode::Mod => {
                let a = self.target(instr, instr.a())?;
                let result = arith::modulo(self.value(instr.b()), self.value(instr.c()))
                    .ok_or(Fault::DivisionByZero { addr: instr.addr })?;
                self.regs.set(a, result);
            }

            Opcode::Not => {
                let a = self.target(instr, instr.a())?;
                let value = arith::not(self.value(instr.b()));
                self.regs.set(a, value);
            }

            // ==================== Memory ====================

            Opcode::Rmem => {
                let a = self.target(instr, instr.a())?;
                let src = self.value(instr.b());
                let value = self.mem.read(src)
                    .map_err(|_| Fault::AddressOutOfRange { value: src, addr: instr.addr })?;
                self.regs.set(a, value);
            }

            Opcode::Wmem => {
                let dst = self.value(instr.a());
                let value = self.value(instr.b());
                self.mem.write(dst, value)
                    .map_err(|_| Fault::AddressOutOfRange { value: dst, addr: instr.addr })?;
            }

            // ==================== I/O ====================

            Opcode::Out => {
                let ch = self.value(instr.a()) as u8;
                self.output.emit(ch)?;
            }

            Opcode::In => {
                let a = self.target(instr, instr.a())?;
                self.output.flush()?;
                match self.input.next_character()? {
                    Some(ch) => self.regs.set(a, ch as u16),
                    None => {
                        debug!(addr = instr.addr, "input exhausted");
                        self.state = CpuState::Halted;
                    }
                }
            }
        }

        Ok(())
    }

    /// `a := f(b, c)` for the three-operand register ops.
    fn binary(&mut self, instr: &Instruction, f: fn(u16, u16) -> u16) -> Result<(), CpuError> {
        let a = self.target(instr, instr.a())?;
        let result = f(self.value(instr.b()), self.value(instr.c()));
        self.regs.set(a, result);
        Ok(())
    }

    /// Current value of an operand. Invalid words read as themselves.
    #[inline]
    fn value(&self, op: Operand) -> u16 {
        match op {
            Operand::Register(r) => self.regs.get(r as usize),
            Operand::Literal(v) | Operand::Invalid(v) => v,
        }
    }

    /// Register index of a write target.
    fn target(&self, instr: &Instruction, op: Operand) -> Result<usize, Fault> {
        op.register().ok_or(Fault::InvalidRegister {
            raw: op.raw(),
            addr: instr.addr,
        })
    }
}

impl<I, O> Cpu<I, O> {
    /// Address of the next instruction to execute.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Number of CALLs not yet matched by a RET.
    pub fn call_depth(&self) -> usize {
        self.depth
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// The fault that stopped the CPU, if any.
    pub fn fault_reason(&self) -> Option<Fault> {
        match self.state {
            CpuState::Faulted(fault) => Some(fault),
            _ => None,
        }
    }
}

impl<I, O> std::fmt::Debug for Cpu<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("pc", &self.pc)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("stack_depth", &self.stack.len())
            .finish()
    }
}

/// Conditions that stop the CPU for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Fault {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid register {raw} at {addr:#06x}")]
    InvalidRegister { raw: u16, addr: u16 },

    #[error("memory address {value} out of range at {addr:#06x}")]
    AddressOutOfRange { value: u16, addr: u16 },

    #[error("division by zero at {addr:#06x}")]
    DivisionByZero { addr: u16 },
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error(transparent)]
    Fault(#[from] Fault),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CpuError {
    fn from(e: std::io::Error) -> Self {
        CpuError::Io(e.to_string())
    }
}
