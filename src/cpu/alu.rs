//! LS-8 arithmetic logic unit.
//!
//! The ALU handles the opcodes with bit 5 set: ADD, MUL, and CMP. All
//! arithmetic is modulo 256, wrapping silently on overflow as the hardware
//! would. ADD and MUL write their result back to the first register; CMP
//! writes only the FL flags.

use thiserror::Error;

use crate::cpu::decode::Opcode;
use crate::cpu::registers::{Flags, RegisterError, Registers};

/// Apply an ALU operation to a pair of registers.
///
/// Returns [`AluError::UnsupportedOperation`] for opcodes the ALU does not
/// implement, so a decode bug surfaces as an error instead of a silent
/// no-op.
pub fn apply(
    op: Opcode,
    regs: &mut Registers,
    flags: &mut Flags,
    reg_a: u8,
    reg_b: u8,
) -> Result<(), AluError> {
    let a = regs.get(reg_a)?;
    let b = regs.get(reg_b)?;

    match op {
        Opcode::Add => regs.set(reg_a, a.wrapping_add(b))?,
        Opcode::Mul => regs.set(reg_a, a.wrapping_mul(b))?,
        Opcode::Cmp => flags.compare(a, b),
        other => return Err(AluError::UnsupportedOperation(other)),
    }

    Ok(())
}

/// Errors that can occur in the ALU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AluError {
    #[error("unsupported ALU operation {0}")]
    UnsupportedOperation(Opcode),

    #[error("register error: {0}")]
    Register(#[from] RegisterError),
}
