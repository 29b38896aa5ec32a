//! The `.ls8` program file format.
//!
//! `.ls8` is a plain-text encoding of LS-8 machine code:
//! - One byte per line, written as 8 binary digits
//! - Everything after the first whitespace on a line is ignored
//!   (conventionally a human-readable comment)
//! - Lines starting with `#` are comments
//! - Blank lines are ignored

use std::path::Path;

use thiserror::Error;

/// A loaded `.ls8` program.
#[derive(Debug, Clone, Default)]
pub struct ProgramFile {
    /// The raw machine-code bytes, in load order.
    pub bytes: Vec<u8>,
    /// Original source lines (for debugging).
    pub source_lines: Vec<String>,
}

impl ProgramFile {
    /// Create a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one machine-code byte with the source line it came from.
    pub fn push(&mut self, byte: u8, source: &str) {
        self.bytes.push(byte);
        self.source_lines.push(source.to_string());
    }

    /// Number of machine-code bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Parse `.ls8` source text into a program image.
pub fn parse_program(source: &str) -> Result<ProgramFile, LoadError> {
    let mut program = ProgramFile::new();

    for (line_num, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // The first whitespace-separated field is the instruction byte.
        let token = match trimmed.split_whitespace().next() {
            Some(token) => token,
            None => continue,
        };

        if token.len() != 8 || !token.bytes().all(|b| matches!(b, b'0' | b'1')) {
            return Err(LoadError::Parse {
                line: line_num + 1,
                message: format!("expected 8 binary digits, found {token:?}"),
            });
        }

        let byte = token.bytes().fold(0u8, |acc, b| (acc << 1) | (b - b'0'));
        program.push(byte, trimmed);
    }

    Ok(program)
}

/// Load a `.ls8` program from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<ProgramFile, LoadError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| LoadError::Io(e.to_string()))?;
    parse_program(&source)
}

/// Errors that can occur loading a program file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Cpu;

    fn demo(name: &str) -> String {
        format!(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/{}"), name)
    }

    fn run_demo(name: &str) -> Vec<u8> {
        let program = load_program(demo(name)).unwrap();
        let mut cpu = Cpu::with_output(Vec::new());
        cpu.load_program(&program.bytes).unwrap();
        cpu.run().unwrap();
        cpu.output().clone()
    }

    #[test]
    fn test_parse_simple_program() {
        let program = parse_program("10000010\n00000000\n00001000\n00000001\n").unwrap();

        assert_eq!(program.bytes, vec![0b1000_0010, 0, 8, 1]);
        assert_eq!(program.len(), 4);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let source = "\
# A header comment

00000001 # HLT

  # an indented comment
";
        let program = parse_program(source).unwrap();

        assert_eq!(program.bytes, vec![1]);
    }

    #[test]
    fn test_ignores_text_after_first_token() {
        let program = parse_program("10000010 LDI R0,8 anything goes here\n").unwrap();

        assert_eq!(program.bytes, vec![0b1000_0010]);
        assert_eq!(program.source_lines[0], "10000010 LDI R0,8 anything goes here");
    }

    #[test]
    fn test_empty_source_is_an_empty_program() {
        let program = parse_program("# only comments\n\n").unwrap();

        assert!(program.is_empty());
    }

    #[test]
    fn test_rejects_short_token() {
        let err = parse_program("00000001\n\n1010\n").unwrap_err();

        assert_eq!(
            err,
            LoadError::Parse {
                line: 3,
                message: "expected 8 binary digits, found \"1010\"".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_long_token() {
        let err = parse_program("100000100\n").unwrap_err();

        assert!(matches!(err, LoadError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_rejects_non_binary_digits() {
        let err = parse_program("00000001\n1020a010\n").unwrap_err();

        assert!(matches!(err, LoadError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_program("no/such/file.ls8").unwrap_err();

        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_demo_print8() {
        assert_eq!(run_demo("print8.ls8"), b"8\n");
    }

    #[test]
    fn test_demo_mult() {
        assert_eq!(run_demo("mult.ls8"), b"72\n");
    }

    #[test]
    fn test_demo_stack() {
        assert_eq!(run_demo("stack.ls8"), b"2\n1\n");
    }

    #[test]
    fn test_demo_call() {
        assert_eq!(run_demo("call.ls8"), b"99\n");
    }

    #[test]
    fn test_demo_countdown() {
        assert_eq!(run_demo("countdown.ls8"), b"5\n4\n3\n2\n1\n");
    }
}
