use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rv32i_core::{decode, Assembler, AssemblerConfig, Program};

#[derive(Parser, Debug)]
#[command(author, version, about = "RV32I subset assembler")]
struct Opts {
    /// Input assembly file (one instruction or label per line)
    #[arg(short, long)]
    input: PathBuf,
    /// Output binary file (little-endian words)
    #[arg(short, long)]
    output: PathBuf,
    /// Address of the first instruction (only affects the listing)
    #[arg(long, default_value_t = 0u32)]
    origin: u32,
    /// Print an address/word/disassembly listing to stdout
    #[arg(long)]
    listing: bool,
}

fn render_listing(program: &Program) -> String {
    let mut out = String::new();
    let mut addr = program.origin;
    for (i, &word) in program.words.iter().enumerate() {
        let offset = addr.wrapping_sub(program.origin);
        for (name, _) in program.labels.iter().filter(|&(_, &off)| off == offset) {
            out.push_str(&format!("{name}:\n"));
        }
        out.push_str(&format!(
            "  {addr:#010x}: {word:08x}  {:<28} # line {}\n",
            decode(word).to_string(),
            program.lines[i]
        ));
        addr = addr.wrapping_add(4);
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let asm = Assembler::with_config(AssemblerConfig { origin: opts.origin });
    let program = asm
        .assemble_program(&text)
        .with_context(|| format!("assembling {}", opts.input.display()))?;
    fs::write(&opts.output, program.to_le_bytes())?;
    if opts.listing {
        print!("{}", render_listing(&program));
    }
    Ok(())
}
