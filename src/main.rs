//! Synacor VM - CLI Entry Point
//!
//! `synacor-vm <image> [trace]` runs a program image until it halts.
//! A nonzero `trace` prints every instruction to stderr before it executes,
//! indented two spaces per active CALL.

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use synacor::asm::format_trace;
use synacor::{load_image, Cpu, LineInput};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synacor-vm")]
#[command(version)]
#[command(about = "Run a Synacor challenge program image")]
struct Cli {
    /// Path to the binary program image
    image: PathBuf,
    /// Nonzero to trace every instruction on stderr
    #[arg(default_value_t = 0)]
    trace: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    run_program(&cli.image, cli.trace != 0);
}

fn run_program(path: &Path, trace: bool) {
    info!(path = %path.display(), "starting virtual machine");

    let image = match load_image(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Failed to load {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    if image.is_empty() {
        eprintln!("Invalid program: {} contains no words", path.display());
        std::process::exit(1);
    }

    let mut cpu = Cpu::new(LineInput::new(io::stdin().lock()), io::stdout());
    if let Err(e) = cpu.load_program(image.as_slice()) {
        eprintln!("Failed to load program: {}", e);
        std::process::exit(1);
    }

    while cpu.is_running() {
        if trace {
            if let Ok(instr) = cpu.peek() {
                eprintln!("{}", format_trace(cpu.call_depth(), &instr));
            }
        }

        let pc = cpu.pc();
        if let Err(e) = cpu.step() {
            let _ = cpu.output_mut().flush();
            eprintln!("CPU error at PC=0x{:04X}: {}", pc, e);
            eprintln!("  {}", cpu.regs);
            std::process::exit(1);
        }
    }

    if let Err(msg) = flush_output(cpu.output_mut()) {
        eprintln!("{}", msg);
        std::process::exit(1);
    }
    info!(cycles = cpu.cycles, state = ?cpu.state, "virtual machine stopped");
}

/// Flush program output after a halt, describing any failure.
fn flush_output<W: Write>(out: &mut W) -> Result<(), String> {
    out.flush().map_err(|e| format!("Failed to flush output: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let msg = flush_output(&mut ClosedPipe).unwrap_err();
        assert_eq!(msg, "Failed to flush output: pipe closed");
    }

    #[test]
    fn test_flush_success() {
        let mut out: Vec<u8> = Vec::new();
        assert!(flush_output(&mut out).is_ok());
    }
}
