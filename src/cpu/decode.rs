//! LS-8 instruction decoding.
//!
//! Every LS-8 instruction is a single opcode byte followed by zero, one, or
//! two operand bytes. The encoding is self-describing: the top two bits of
//! the opcode hold the operand count, and bit 5 marks ALU operations.
//!
//! Decoding happens in two steps. [`Opcode::from_byte`] classifies the raw
//! opcode byte (rejecting bytes outside the instruction set), and [`decode`]
//! pairs the opcode with its fetched operands to build an [`Instruction`]
//! ready for execution.

use std::fmt;

/// An LS-8 opcode byte.
///
/// Discriminants are the exact on-the-wire encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Halt the CPU.
    Hlt = 0b0000_0001,
    /// Load an immediate value into a register.
    Ldi = 0b1000_0010,
    /// Print the decimal value of a register.
    Prn = 0b0100_0111,
    /// Add two registers, storing the result in the first.
    Add = 0b1010_0000,
    /// Multiply two registers, storing the result in the first.
    Mul = 0b1010_0010,
    /// Compare two registers, setting the FL flags.
    Cmp = 0b1010_0111,
    /// Push a register onto the stack.
    Push = 0b0100_0101,
    /// Pop the top of the stack into a register.
    Pop = 0b0100_0110,
    /// Call the subroutine at the address in a register.
    Call = 0b0101_0000,
    /// Return from the current subroutine.
    Ret = 0b0001_0001,
    /// Jump to the address in a register.
    Jmp = 0b0101_0100,
    /// Jump if the equal flag is set.
    Jeq = 0b0101_0101,
    /// Jump if the equal flag is clear.
    Jne = 0b0101_0110,
}

impl Opcode {
    /// Classify a raw opcode byte, or `None` if it is not a valid LS-8
    /// instruction.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            b if b == Opcode::Hlt as u8 => Some(Opcode::Hlt),
            b if b == Opcode::Ldi as u8 => Some(Opcode::Ldi),
            b if b == Opcode::Prn as u8 => Some(Opcode::Prn),
            b if b == Opcode::Add as u8 => Some(Opcode::Add),
            b if b == Opcode::Mul as u8 => Some(Opcode::Mul),
            b if b == Opcode::Cmp as u8 => Some(Opcode::Cmp),
            b if b == Opcode::Push as u8 => Some(Opcode::Push),
            b if b == Opcode::Pop as u8 => Some(Opcode::Pop),
            b if b == Opcode::Call as u8 => Some(Opcode::Call),
            b if b == Opcode::Ret as u8 => Some(Opcode::Ret),
            b if b == Opcode::Jmp as u8 => Some(Opcode::Jmp),
            b if b == Opcode::Jeq as u8 => Some(Opcode::Jeq),
            b if b == Opcode::Jne as u8 => Some(Opcode::Jne),
            _ => None,
        }
    }

    /// Number of operand bytes following this opcode (0-2).
    ///
    /// Matches the count encoded in the opcode's top two bits.
    pub const fn operand_count(self) -> usize {
        match self {
            Opcode::Hlt | Opcode::Ret => 0,
            Opcode::Prn
            | Opcode::Push
            | Opcode::Pop
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Jeq
            | Opcode::Jne => 1,
            Opcode::Ldi | Opcode::Add | Opcode::Mul | Opcode::Cmp => 2,
        }
    }

    /// Whether bit 5 marks this opcode as an ALU operation.
    pub const fn is_alu(self) -> bool {
        (self as u8) & 0b0010_0000 != 0
    }

    /// The assembly mnemonic for this opcode.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Add => "ADD",
            Opcode::Mul => "MUL",
            Opcode::Cmp => "CMP",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Jmp => "JMP",
            Opcode::Jeq => "JEQ",
            Opcode::Jne => "JNE",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A fully decoded LS-8 instruction with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // ==================== Arithmetic ====================

    /// Add: R[a] := (R[a] + R[b]) mod 256
    Add { reg_a: u8, reg_b: u8 },

    /// Multiply: R[a] := (R[a] * R[b]) mod 256
    Mul { reg_a: u8, reg_b: u8 },

    /// Compare R[a] with R[b], setting exactly one FL flag
    Cmp { reg_a: u8, reg_b: u8 },

    // ==================== Data Transfer ====================

    /// Load immediate: R[reg] := value
    Ldi { reg: u8, value: u8 },

    /// Print R[reg] as a decimal integer
    Prn { reg: u8 },

    // ==================== Stack ====================

    /// Push R[reg] onto the stack
    Push { reg: u8 },

    /// Pop the top of the stack into R[reg]
    Pop { reg: u8 },

    // ==================== Control Flow ====================

    /// Call the subroutine at R[reg], pushing the return address
    Call { reg: u8 },

    /// Return to the address on top of the stack
    Ret,

    /// Jump: PC := R[reg]
    Jmp { reg: u8 },

    /// Jump if the Equal flag is set
    Jeq { reg: u8 },

    /// Jump if the Equal flag is clear
    Jne { reg: u8 },

    /// Halt execution
    Hlt,
}

/// Pair an opcode with its fetched operand bytes.
///
/// Operands beyond the opcode's [`operand_count`](Opcode::operand_count)
/// are ignored, so callers may pass zero for unfetched slots.
pub fn decode(opcode: Opcode, operand_a: u8, operand_b: u8) -> Instruction {
    match opcode {
        Opcode::Hlt => Instruction::Hlt,
        Opcode::Ldi => Instruction::Ldi { reg: operand_a, value: operand_b },
        Opcode::Prn => Instruction::Prn { reg: operand_a },
        Opcode::Add => Instruction::Add { reg_a: operand_a, reg_b: operand_b },
        Opcode::Mul => Instruction::Mul { reg_a: operand_a, reg_b: operand_b },
        Opcode::Cmp => Instruction::Cmp { reg_a: operand_a, reg_b: operand_b },
        Opcode::Push => Instruction::Push { reg: operand_a },
        Opcode::Pop => Instruction::Pop { reg: operand_a },
        Opcode::Call => Instruction::Call { reg: operand_a },
        Opcode::Ret => Instruction::Ret,
        Opcode::Jmp => Instruction::Jmp { reg: operand_a },
        Opcode::Jeq => Instruction::Jeq { reg: operand_a },
        Opcode::Jne => Instruction::Jne { reg: operand_a },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OPCODES: [Opcode; 13] = [
        Opcode::Hlt,
        Opcode::Ldi,
        Opcode::Prn,
        Opcode::Add,
        Opcode::Mul,
        Opcode::Cmp,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Call,
        Opcode::Ret,
        Opcode::Jmp,
        Opcode::Jeq,
        Opcode::Jne,
    ];

    #[test]
    fn test_encodings() {
        assert_eq!(Opcode::Hlt as u8, 0b0000_0001);
        assert_eq!(Opcode::Ldi as u8, 0b1000_0010);
        assert_eq!(Opcode::Prn as u8, 0b0100_0111);
        assert_eq!(Opcode::Add as u8, 0b1010_0000);
        assert_eq!(Opcode::Mul as u8, 0b1010_0010);
        assert_eq!(Opcode::Cmp as u8, 0b1010_0111);
        assert_eq!(Opcode::Push as u8, 0b0100_0101);
        assert_eq!(Opcode::Pop as u8, 0b0100_0110);
        assert_eq!(Opcode::Call as u8, 0b0101_0000);
        assert_eq!(Opcode::Ret as u8, 0b0001_0001);
        assert_eq!(Opcode::Jmp as u8, 0b0101_0100);
        assert_eq!(Opcode::Jeq as u8, 0b0101_0101);
        assert_eq!(Opcode::Jne as u8, 0b0101_0110);
    }

    #[test]
    fn test_from_byte_round_trips() {
        for op in ALL_OPCODES {
            assert_eq!(Opcode::from_byte(op as u8), Some(op));
        }
    }

    #[test]
    fn test_from_byte_rejects_unknown() {
        assert_eq!(Opcode::from_byte(0b0000_0000), None);
        assert_eq!(Opcode::from_byte(0b0000_0010), None);
        assert_eq!(Opcode::from_byte(0b1111_1111), None);
    }

    #[test]
    fn test_operand_count_matches_top_bits() {
        for op in ALL_OPCODES {
            let encoded = (op as u8 >> 6) as usize;
            assert_eq!(op.operand_count(), encoded, "{op}");
        }
    }

    #[test]
    fn test_alu_bit() {
        assert!(Opcode::Add.is_alu());
        assert!(Opcode::Mul.is_alu());
        assert!(Opcode::Cmp.is_alu());
        assert!(!Opcode::Ldi.is_alu());
        assert!(!Opcode::Push.is_alu());
        assert!(!Opcode::Jmp.is_alu());
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(
            decode(Opcode::Ldi, 3, 42),
            Instruction::Ldi { reg: 3, value: 42 }
        );
        assert_eq!(
            decode(Opcode::Mul, 0, 1),
            Instruction::Mul { reg_a: 0, reg_b: 1 }
        );
        assert_eq!(decode(Opcode::Prn, 5, 0), Instruction::Prn { reg: 5 });
        assert_eq!(decode(Opcode::Hlt, 0, 0), Instruction::Hlt);
        assert_eq!(decode(Opcode::Ret, 0, 0), Instruction::Ret);
    }

    #[test]
    fn test_display_mnemonics() {
        assert_eq!(Opcode::Ldi.to_string(), "LDI");
        assert_eq!(Opcode::Jne.to_string(), "JNE");
    }
}
