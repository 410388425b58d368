use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use rv32_disasm::{listing, load_raw_bin, render_text};
use rv32i_core::disasm::RegNames;

#[derive(Parser, Debug)]
#[command(author, version, about = "RV32I disassembler CLI", long_about = None)]
struct Cli {
    /// Load address for the binary in target address space
    #[arg(long, default_value = "0", value_parser = parse_u32)]
    base: u32,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path (little-endian words)
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Print ABI register names (a0, sp, ...) instead of x0..x31
    #[arg(long, global = true)]
    abi: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disassemble a range [start, end) in bytes
    Range {
        /// Start address (hex or dec)
        #[arg(value_parser = parse_u32)]
        start: u32,
        /// End address (hex or dec, exclusive)
        #[arg(value_parser = parse_u32)]
        end: u32,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
    },
    /// Disassemble the whole image
    Dump {
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Show instruction bytes (text format only)
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let img = load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len)?;
    let names = if cli.abi { RegNames::Abi } else { RegNames::Numeric };

    match cli.cmd {
        Command::Range { start, end, show_bytes } => {
            anyhow::ensure!(end >= start, "end must be >= start");
            anyhow::ensure!(start % 4 == 0, "start must be word aligned");
            print!("{}", render_text(&listing(&img, start, end, names), show_bytes));
        }
        Command::Dump { format, show_bytes, out } => {
            let entries = listing(&img, img.base, img.end(), names);
            let text = match format {
                OutputFormat::Text => render_text(&entries, show_bytes),
                OutputFormat::Json => serde_json::to_string_pretty(&entries)? + "\n",
            };
            if let Some(path) = out {
                std::fs::write(path, text)?;
            } else {
                print!("{text}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u32_hex_and_dec() {
        assert_eq!(parse_u32("0x10").unwrap(), 0x10);
        assert_eq!(parse_u32("16").unwrap(), 16);
        assert!(parse_u32("zz").is_err());
    }

    #[test]
    fn cli_parses_range() {
        let args = ["rv32-disasm", "--base", "0x80", "prog.bin", "range", "0x80", "0x90"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.base, 0x80);
        assert!(matches!(cli.cmd, Command::Range { start: 0x80, end: 0x90, show_bytes: false }));
        assert!(!cli.abi);

        let args = ["rv32-disasm", "prog.bin", "dump", "--abi", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.abi);
        assert!(matches!(cli.cmd, Command::Dump { format: OutputFormat::Json, .. }));
    }
}
