//! # LS-8 Emulator
//!
//! An emulator of the LS-8, an 8-bit educational computer with 256 bytes
//! of memory, 8 general-purpose registers, and a downward-growing stack.
//!
//! Programs are plain-text `.ls8` files of binary-encoded bytes. The CPU
//! runs them through a fetch-decode-execute loop until a HLT instruction
//! or a fault.

pub mod cpu;
pub mod loader;

// Re-export commonly used types
pub use cpu::{
    Cpu, CpuError, CpuState, Flags, Instruction, Memory, Opcode, Registers, Snapshot,
};
pub use loader::{load_program, parse_program, LoadError, ProgramFile};
