//! The LS-8 CPU: memory, registers, ALU, decoder, and execution engine.

pub mod alu;
pub mod decode;
pub mod execute;
pub mod memory;
pub mod registers;

pub use decode::{decode, Instruction, Opcode};
pub use execute::{Cpu, CpuError, CpuState, Snapshot};
pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Flags, RegisterError, Registers, NUM_REGISTERS, SP, STACK_INIT};
