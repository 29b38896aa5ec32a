//! LS-8 execution engine.
//!
//! The CPU repeatedly fetches an opcode byte at the program counter,
//! fetches as many operand bytes as the opcode declares, advances the
//! program counter past the whole instruction, and then executes it.
//! Control-flow instructions overwrite the already-advanced program
//! counter; CALL pushes it as the return address before redirecting.
//!
//! PRN and TRACE write to an output sink owned by the CPU, standard
//! output by default. Tests swap in a byte buffer.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpu::alu::{self, AluError};
use crate::cpu::decode::{decode, Instruction, Opcode};
use crate::cpu::memory::{Memory, MemoryError};
use crate::cpu::registers::{Flags, RegisterError, Registers, STACK_INIT};

/// Whether the CPU is still executing instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    Running,
    Halted,
}

/// The LS-8 CPU.
///
/// Owns the memory, register file, flags, and program counter, and drives
/// the fetch-decode-execute loop over them.
pub struct Cpu<W = io::Stdout> {
    /// General-purpose registers (R7 = stack pointer).
    pub regs: Registers,
    /// Comparison flags.
    pub flags: Flags,
    /// Main memory.
    pub mem: Memory,
    /// Program counter. Wider than a memory address so that running off
    /// the end of memory is caught by the fetch instead of wrapping.
    pub pc: u16,
    /// Current execution state.
    pub state: CpuState,
    /// Instructions executed since power-on or the last reset.
    pub cycles: u64,
    /// Bytes occupied by the loaded program, for stack collision checks.
    program_len: usize,
    output: W,
}

impl Cpu<io::Stdout> {
    /// Create a CPU in its power-on state, printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Cpu<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Cpu<W> {
    /// Create a CPU in its power-on state with a custom output sink.
    pub fn with_output(output: W) -> Self {
        Self {
            regs: Registers::new(),
            flags: Flags::new(),
            mem: Memory::new(),
            pc: 0,
            state: CpuState::Running,
            cycles: 0,
            program_len: 0,
            output,
        }
    }

    /// Return the CPU to its power-on state, clearing memory.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.flags.clear();
        self.mem.clear();
        self.pc = 0;
        self.state = CpuState::Running;
        self.cycles = 0;
        self.program_len = 0;
    }

    /// Load a program image at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)?;
        self.program_len = program.len();
        Ok(())
    }

    /// Is the CPU still executing?
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    /// Has the CPU executed a HLT?
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// The output sink, for inspecting captured PRN and TRACE output.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Fetch, decode, and execute a single instruction.
    ///
    /// Returns the decoded instruction on success. Any error leaves the
    /// CPU in the state it had reached when the fault was detected.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        let pc = self.pc;
        let byte = self.mem.read(pc)?;
        let opcode = Opcode::from_byte(byte)
            .ok_or(CpuError::UnknownInstruction { opcode: byte, pc })?;

        // Only the operands the opcode declares are fetched, so a one-byte
        // instruction at the last memory cell still executes.
        let count = opcode.operand_count();
        let operand_a = if count >= 1 { self.mem.read(pc + 1)? } else { 0 };
        let operand_b = if count >= 2 { self.mem.read(pc + 2)? } else { 0 };

        self.pc = pc + 1 + count as u16;

        let instr = decode(opcode, operand_a, operand_b);
        self.execute(instr)?;
        self.cycles += 1;

        Ok(instr)
    }

    /// Run until HLT or a fault.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions. Returns the number
    /// actually executed, which is smaller only if the CPU halted.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    fn execute(&mut self, instr: Instruction) -> Result<(), CpuError> {
        match instr {
            // ==================== Arithmetic ====================

            Instruction::Add { reg_a, reg_b } => {
                alu::apply(Opcode::Add, &mut self.regs, &mut self.flags, reg_a, reg_b)?;
            }

            Instruction::Mul { reg_a, reg_b } => {
                alu::apply(Opcode::Mul, &mut self.regs, &mut self.flags, reg_a, reg_b)?;
            }

            Instruction::Cmp { reg_a, reg_b } => {
                alu::apply(Opcode::Cmp, &mut self.regs, &mut self.flags, reg_a, reg_b)?;
            }

            // ==================== Data Transfer ====================

            Instruction::Ldi { reg, value } => {
                self.regs.set(reg, value)?;
            }

            Instruction::Prn { reg } => {
                let value = self.regs.get(reg)?;
                // Output failures never abort the run.
                writeln!(self.output, "{value}").ok();
            }

            // ==================== Stack ====================

            Instruction::Push { reg } => {
                // The stack pointer moves first, so PUSH R7 stores the
                // already-decremented pointer.
                let addr = self.stack_reserve()?;
                let value = self.regs.get(reg)?;
                self.mem.write(u16::from(addr), value)?;
            }

            Instruction::Pop { reg } => {
                // The transfer happens before the pointer moves, so POP R7
                // increments the freshly popped value.
                let value = self.stack_top()?;
                self.regs.set(reg, value)?;
                self.regs.set_sp(self.regs.sp().wrapping_add(1));
            }

            // ==================== Control Flow ====================

            Instruction::Call { reg } => {
                // The program counter already points past the CALL, which
                // is exactly the return address to save.
                let ret = u8::try_from(self.pc)
                    .map_err(|_| CpuError::Memory(MemoryError::AddressOutOfRange(self.pc)))?;
                let addr = self.stack_reserve()?;
                self.mem.write(u16::from(addr), ret)?;
                self.pc = u16::from(self.regs.get(reg)?);
            }

            Instruction::Ret => {
                let addr = self.stack_top()?;
                self.regs.set_sp(self.regs.sp().wrapping_add(1));
                self.pc = u16::from(addr);
            }

            Instruction::Jmp { reg } => {
                self.pc = u16::from(self.regs.get(reg)?);
            }

            Instruction::Jeq { reg } => {
                if self.flags.equal() {
                    self.pc = u16::from(self.regs.get(reg)?);
                }
            }

            Instruction::Jne { reg } => {
                if !self.flags.equal() {
                    self.pc = u16::from(self.regs.get(reg)?);
                }
            }

            Instruction::Hlt => {
                self.state = CpuState::Halted;
            }
        }

        Ok(())
    }

    /// Move the stack pointer down one cell and return the new top-of-stack
    /// address, rejecting pushes that would wrap below address 0 or land
    /// inside the loaded program image.
    fn stack_reserve(&mut self) -> Result<u8, CpuError> {
        let sp = self.regs.sp();
        if sp == 0 {
            return Err(CpuError::StackOverflow);
        }

        let new_sp = sp - 1;
        if usize::from(new_sp) < self.program_len {
            return Err(CpuError::StackCollision {
                addr: new_sp,
                program_len: self.program_len,
            });
        }

        self.regs.set_sp(new_sp);
        Ok(new_sp)
    }

    /// Read the byte at the top of the stack, rejecting pops from an empty
    /// stack. The caller moves the stack pointer.
    fn stack_top(&self) -> Result<u8, CpuError> {
        let sp = self.regs.sp();
        if sp == STACK_INIT {
            return Err(CpuError::StackUnderflow);
        }
        Ok(self.mem.read(u16::from(sp))?)
    }

    /// Print a one-line state trace: program counter, the three bytes at
    /// the program counter, and all eight registers, in hex.
    ///
    /// Reads past the end of memory show as 00 and output failures are
    /// ignored, so tracing never faults a run.
    pub fn trace(&mut self) {
        let m0 = self.mem.read(self.pc).unwrap_or(0);
        let m1 = self.mem.read(self.pc + 1).unwrap_or(0);
        let m2 = self.mem.read(self.pc + 2).unwrap_or(0);

        write!(
            self.output,
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc, m0, m1, m2
        )
        .ok();
        for reg in self.regs.all() {
            write!(self.output, " {reg:02X}").ok();
        }
        writeln!(self.output).ok();
    }

    /// Capture the complete machine state for serialization.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.pc,
            state: self.state,
            cycles: self.cycles,
            registers: self.regs.clone(),
            flags: self.flags,
            memory: self.mem.clone(),
        }
    }
}

impl<W> fmt::Debug for Cpu<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("pc", &self.pc)
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .field("flags", &self.flags)
            .field("mem", &self.mem)
            .finish_non_exhaustive()
    }
}

/// A serializable point-in-time copy of the machine state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub pc: u16,
    pub state: CpuState,
    pub cycles: u64,
    pub registers: Registers,
    pub flags: Flags,
    pub memory: Memory,
}

/// Errors that halt execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("unknown instruction {opcode:#010b} at address {pc}")]
    UnknownInstruction { opcode: u8, pc: u16 },

    #[error("stack overflow: stack pointer would wrap below address 0")]
    StackOverflow,

    #[error(
        "stack collision: push at address {addr:#04X} would overwrite \
         the {program_len}-byte program image"
    )]
    StackCollision { addr: u8, program_len: usize },

    #[error("stack underflow: pop from an empty stack")]
    StackUnderflow,

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("register error: {0}")]
    Register(#[from] RegisterError),

    #[error("ALU error: {0}")]
    Alu(#[from] AluError),
}
