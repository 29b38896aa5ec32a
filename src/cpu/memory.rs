//! LS-8 memory subsystem.
//!
//! The LS-8 has 256 bytes of flat RAM holding both the program image
//! (loaded at address 0) and the downward-growing stack (top of memory).

use serde::{Serialize, Deserialize};

/// The number of addressable bytes in the LS-8.
pub const MEMORY_SIZE: usize = 256;

/// LS-8 memory: 256 byte cells, zero-initialized.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read the byte at an address (0-255).
    ///
    /// Fails with [`MemoryError::AddressOutOfRange`] for addresses past the
    /// end of memory.
    #[inline]
    pub fn read(&self, addr: u16) -> Result<u8, MemoryError> {
        let index = self.index(addr)?;
        Ok(self.cells[index])
    }

    /// Write a byte at an address (0-255).
    ///
    /// Fails with [`MemoryError::AddressOutOfRange`] for addresses past the
    /// end of memory.
    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), MemoryError> {
        let index = self.index(addr)?;
        self.cells[index] = value;
        Ok(())
    }

    /// Convert an address to a cell index, checking bounds.
    fn index(&self, addr: u16) -> Result<usize, MemoryError> {
        let index = usize::from(addr);
        if index >= MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfRange(addr));
        }
        Ok(index)
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = 0;
        }
    }

    /// Load a program into memory starting at the given address.
    pub fn load_program(&mut self, start_addr: usize, program: &[u8]) -> Result<(), MemoryError> {
        if start_addr + program.len() > MEMORY_SIZE {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available: MEMORY_SIZE - start_addr,
            });
        }

        for (i, &byte) in program.iter().enumerate() {
            self.cells[start_addr + i] = byte;
        }

        Ok(())
    }

    /// View the full memory contents (for debugging).
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    AddressOutOfRange(u16),
    /// Program is too large to fit in memory.
    ProgramTooLarge { size: usize, available: usize },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::AddressOutOfRange(addr) => {
                write!(f, "memory address {} out of range (0-{})", addr, MEMORY_SIZE - 1)
            }
            MemoryError::ProgramTooLarge { size, available } => {
                write!(f, "program size {} exceeds available space {}", size, available)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_starts_zeroed() {
        let mem = Memory::new();
        for addr in 0..MEMORY_SIZE as u16 {
            assert_eq!(mem.read(addr).unwrap(), 0);
        }
    }

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();

        mem.write(10, 42).unwrap();
        assert_eq!(mem.read(10).unwrap(), 42);
    }

    #[test]
    fn test_memory_bounds() {
        let mut mem = Memory::new();

        // Valid addresses: 0-255
        assert!(mem.read(0).is_ok());
        assert!(mem.read(255).is_ok());
        assert!(mem.write(255, 1).is_ok());

        // Invalid addresses
        assert_eq!(mem.read(256), Err(MemoryError::AddressOutOfRange(256)));
        assert_eq!(mem.write(256, 1), Err(MemoryError::AddressOutOfRange(256)));
        assert!(mem.read(0x1000).is_err());
    }

    #[test]
    fn test_load_program() {
        let mut mem = Memory::new();
        let program = [0b1000_0010, 0, 8];

        mem.load_program(0, &program).unwrap();

        assert_eq!(mem.read(0).unwrap(), 0b1000_0010);
        assert_eq!(mem.read(1).unwrap(), 0);
        assert_eq!(mem.read(2).unwrap(), 8);
        assert_eq!(mem.read(3).unwrap(), 0);
        assert_eq!(&mem.as_bytes()[..3], &program[..]);
    }

    #[test]
    fn test_load_program_too_large() {
        let mut mem = Memory::new();
        let program = vec![0; MEMORY_SIZE + 1];

        let err = mem.load_program(0, &program).unwrap_err();
        assert_eq!(
            err,
            MemoryError::ProgramTooLarge {
                size: MEMORY_SIZE + 1,
                available: MEMORY_SIZE,
            }
        );

        // A full-size program still fits
        assert!(mem.load_program(0, &vec![0; MEMORY_SIZE]).is_ok());
    }

    #[test]
    fn test_clear() {
        let mut mem = Memory::new();
        mem.write(100, 0xAB).unwrap();

        mem.clear();

        assert_eq!(mem.read(100).unwrap(), 0);
    }
}
