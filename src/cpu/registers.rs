//! LS-8 CPU registers.
//!
//! The LS-8 has 8 general-purpose 8-bit registers, R0-R7. R7 is reserved
//! as the stack pointer and powers on pointing at the top of memory.
//! Alongside the register file lives the FL condition register: three
//! single-bit flags (less-than, greater-than, equal) written only by CMP
//! and read only by the conditional jumps.

use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of general-purpose registers.
pub const NUM_REGISTERS: usize = 8;

/// The register reserved as the stack pointer.
pub const SP: usize = 7;

/// Power-on value of the stack pointer: the stack grows downward from the
/// top of memory.
pub const STACK_INIT: u8 = 0xFF;

/// The LS-8 register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    regs: [u8; NUM_REGISTERS],
}

impl Registers {
    /// Create a new register file: R7 holds [`STACK_INIT`], the rest zero.
    pub fn new() -> Self {
        let mut regs = [0; NUM_REGISTERS];
        regs[SP] = STACK_INIT;
        Self { regs }
    }

    /// Read a register by index (0-7).
    ///
    /// Register operands come straight from program bytes, so the index is
    /// untrusted and checked here.
    #[inline]
    pub fn get(&self, index: u8) -> Result<u8, RegisterError> {
        self.regs
            .get(usize::from(index))
            .copied()
            .ok_or(RegisterError::IndexOutOfRange(index))
    }

    /// Write a register by index (0-7).
    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), RegisterError> {
        let slot = self
            .regs
            .get_mut(usize::from(index))
            .ok_or(RegisterError::IndexOutOfRange(index))?;
        *slot = value;
        Ok(())
    }

    /// Current stack pointer (R7).
    #[inline]
    pub fn sp(&self) -> u8 {
        self.regs[SP]
    }

    /// Set the stack pointer (R7).
    #[inline]
    pub fn set_sp(&mut self, value: u8) {
        self.regs[SP] = value;
    }

    /// All register values in order, for traces and snapshots.
    pub fn all(&self) -> &[u8; NUM_REGISTERS] {
        &self.regs
    }

    /// Reset all registers to their power-on values.
    pub fn reset(&mut self) {
        self.regs = [0; NUM_REGISTERS];
        self.regs[SP] = STACK_INIT;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// The FL condition register.
///
/// Exactly one flag is set after any comparison; all three start clear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    less: bool,
    greater: bool,
    equal: bool,
}

impl Flags {
    /// Create a flags register with all flags clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare two values, clearing all flags and then setting exactly one.
    pub fn compare(&mut self, a: u8, b: u8) {
        self.clear();
        match a.cmp(&b) {
            Ordering::Less => self.less = true,
            Ordering::Greater => self.greater = true,
            Ordering::Equal => self.equal = true,
        }
    }

    /// Clear all three flags.
    pub fn clear(&mut self) {
        self.less = false;
        self.greater = false;
        self.equal = false;
    }

    /// Was the last comparison less-than?
    #[inline]
    pub fn less(&self) -> bool {
        self.less
    }

    /// Was the last comparison greater-than?
    #[inline]
    pub fn greater(&self) -> bool {
        self.greater
    }

    /// Was the last comparison equal?
    #[inline]
    pub fn equal(&self) -> bool {
        self.equal
    }
}

/// Errors that can occur accessing the register file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("register index {0} out of range (0-{})", NUM_REGISTERS - 1)]
    IndexOutOfRange(u8),
}
