//! LS-8 Emulator - CLI Entry Point
//!
//! Runs a `.ls8` program file:
//! - `ls8-emu <program>` - run until HLT
//! - `ls8-emu --trace <program>` - print a TRACE line before every instruction
//! - `ls8-emu --dump-state <path> <program>` - also write the final machine
//!   state as JSON
//!
//! Exits 0 when the program halts normally and 1 on any load or CPU fault.

use std::path::PathBuf;

use clap::Parser;

use ls8::{load_program, Cpu};

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(version)]
#[command(about = "An emulator of the LS-8 8-bit educational computer")]
struct Cli {
    /// Path to the .ls8 program file to execute
    program: PathBuf,

    /// Print a TRACE line before every instruction
    #[arg(short, long)]
    trace: bool,

    /// Write the final machine state to a JSON file after the run
    #[arg(long, value_name = "PATH")]
    dump_state: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let program = match load_program(&cli.program) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", cli.program.display(), e);
            std::process::exit(1);
        }
    };

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load_program(&program.bytes) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    while cpu.is_running() {
        if cli.trace {
            cpu.trace();
        }

        let pc = cpu.pc;
        if let Err(e) = cpu.step() {
            eprintln!("❌ CPU error at PC={}: {}", pc, e);
            std::process::exit(1);
        }
    }

    if let Some(path) = &cli.dump_state {
        let json = match serde_json::to_string_pretty(&cpu.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = std::fs::write(path, json) {
            eprintln!("❌ Failed to write {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
