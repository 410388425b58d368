use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use rv32i_core::{Assembler, AssemblerConfig, ByteMask, Memory};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble an RV32I source into word-addressed memory and dump it"
)]
struct Opts {
    /// Memory size in bytes
    #[arg(short, long, default_value_t = 1024)]
    size: usize,
    /// Byte address the program is loaded at
    #[arg(long, default_value_t = 0)]
    origin: u32,
    /// Whitespace-separated decimal words preloaded from address 0
    #[arg(long)]
    init: Option<String>,
    /// Masked write applied after loading: ADDR=VALUE[/MASK], MASK like 0011
    #[arg(short, long = "write", value_name = "ADDR=VALUE[/MASK]")]
    writes: Vec<String>,
    #[arg(long, value_enum, default_value_t = Format::Hex)]
    format: Format,
    /// Print zero words too
    #[arg(long)]
    all: bool,
    #[arg(value_name = "SOURCE")]
    input: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Hex,
    Json,
}

#[derive(Debug, PartialEq, Eq)]
struct Poke {
    addr: u32,
    value: u32,
    mask: ByteMask,
}

fn parse_num(s: &str) -> Result<u32> {
    let s = s.trim();
    let v = if let Some(h) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(h, 16)?
    } else if let Some(neg) = s.strip_prefix('-') {
        neg.parse::<u32>().map(u32::wrapping_neg)?
    } else {
        s.parse::<u32>()?
    };
    Ok(v)
}

fn parse_poke(s: &str) -> Result<Poke> {
    let (addr, rest) = s.split_once('=').context("expected ADDR=VALUE[/MASK]")?;
    let (value, mask) = match rest.split_once('/') {
        Some((v, m)) => (v, m.parse::<ByteMask>()?),
        None => (rest, ByteMask::WORD),
    };
    Ok(Poke { addr: parse_num(addr)?, value: parse_num(value)?, mask })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut mem = match &opts.init {
        Some(init) => Memory::from_init_str(opts.size, init)?,
        None => Memory::new(opts.size, None)?,
    };

    if let Some(path) = &opts.input {
        let src = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let asm = Assembler::with_config(AssemblerConfig { origin: opts.origin });
        let prog = asm.assemble_program(&src).with_context(|| format!("assembling {path}"))?;
        mem.load_words(prog.origin, &prog.words).with_context(|| {
            format!("loading {} words at {:#010x}", prog.words.len(), prog.origin)
        })?;
    }

    for w in &opts.writes {
        let p = parse_poke(w).with_context(|| format!("bad --write `{w}`"))?;
        mem.write(p.addr, p.value, p.mask)?;
    }

    match opts.format {
        Format::Hex => {
            for (i, word) in mem.words().iter().enumerate() {
                if *word != 0 || opts.all {
                    println!("{:#010x}: {word:08x}", i * 4);
                }
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&mem)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokes_parse() {
        assert_eq!(
            parse_poke("0x10=0xAABBCCDD/0011").unwrap(),
            Poke { addr: 0x10, value: 0xAABB_CCDD, mask: ByteMask::LOW_HALF }
        );
        assert_eq!(
            parse_poke("4=-1").unwrap(),
            Poke { addr: 4, value: u32::MAX, mask: ByteMask::WORD }
        );
        assert!(parse_poke("4").is_err());
        assert!(parse_poke("4=1/01").is_err());
    }

    #[test]
    fn cli_parses_repeated_writes() {
        let args = ["rv32-mem", "-s", "64", "-w", "0=1", "-w", "4=2/1000", "prog.s"];
        let o = Opts::try_parse_from(args).unwrap();
        assert_eq!(o.size, 64);
        assert_eq!(o.writes, vec!["0=1", "4=2/1000"]);
        assert_eq!(o.input.as_deref(), Some("prog.s"));
    }
}
