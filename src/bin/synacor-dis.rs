//! Linear disassembler for Synacor program images.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use synacor::cpu::MEMORY_SIZE;
use synacor::{disassemble, load_image, Memory};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synacor-dis")]
#[command(version)]
#[command(about = "Disassemble a Synacor challenge program image")]
struct Cli {
    /// Path to the binary program image
    image: PathBuf,
    /// First address to disassemble (decimal or 0x hex)
    #[arg(short, long, default_value = "0", value_parser = parse_address)]
    offset: u16,
    /// Number of words to cover (default: to the end of the image)
    #[arg(short, long, value_parser = parse_count)]
    length: Option<usize>,
    /// Print the listing as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let image = match load_image(&cli.image) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.image.display(), e);
            std::process::exit(1);
        }
    };

    let mut mem = Memory::new();
    if let Err(e) = mem.load_program(image.as_slice()) {
        eprintln!("Failed to load program: {}", e);
        std::process::exit(1);
    }

    let length = cli
        .length
        .unwrap_or_else(|| image.len().saturating_sub(cli.offset as usize));
    let listing = disassemble(&mem, cli.offset, length);

    if cli.json {
        match serde_json::to_string_pretty(&listing) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize listing: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", listing);
    }
}

fn parse_count(s: &str) -> Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

fn parse_address(s: &str) -> Result<u16, String> {
    let value = parse_count(s)?;
    if value >= MEMORY_SIZE {
        return Err(format!("address {:#x} is outside memory (0x0000-0x7fff)", value));
    }
    Ok(value as u16)
}
