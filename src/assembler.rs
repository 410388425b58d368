//! Two-pass assembler for the RV32I subset.
//!
//! Pass 1 walks the source once to assign every label the byte offset of
//! the next instruction; pass 2 walks it again and encodes each instruction
//! line, resolving label operands to `label - pc`. The label table and the
//! pc cursor live on the stack of a single call.
//!
//! Label-only lines are zero-width: `loop:` on its own line names the
//! instruction that follows it, exactly as `loop: add x1, x1, x2` does.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::encoder::{encode_b, encode_i, encode_j, encode_r, encode_s, encode_u};
use crate::error::{Error, Result};
use crate::instructions::{instruction, InstrDesc, Syntax};
use crate::isa::rv32i::register_index_of;

/// Every instruction occupies one 32-bit slot.
pub const INSTRUCTION_BYTES: u32 = 4;

const RA: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Absolute address of the first instruction. Only reported addresses
    /// depend on it; encoded offsets are pc-relative.
    pub origin: u32,
}

/// Output of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    pub origin: u32,
    pub words: Vec<u32>,
    /// Label -> byte offset from the first instruction.
    pub labels: BTreeMap<String, u32>,
    /// 1-based source line of each word.
    pub lines: Vec<usize>,
}

impl Program {
    /// Absolute address of a label.
    pub fn address_of(&self, label: &str) -> Option<u32> {
        self.labels.get(label).map(|off| self.origin.wrapping_add(*off))
    }

    /// Little-endian byte image of the program.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    cfg: AssemblerConfig,
}

/// One non-blank source line after comment stripping.
#[derive(Debug)]
struct Line<'a> {
    number: usize,
    labels: Vec<&'a str>,
    body: Option<&'a str>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: AssemblerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> AssemblerConfig {
        self.cfg
    }

    pub fn assemble(&self, source: &str) -> Result<Vec<u32>> {
        self.assemble_program(source).map(|p| p.words)
    }

    pub fn assemble_program(&self, source: &str) -> Result<Program> {
        let lines = split_lines(source)?;

        // Pass 1: labels
        let mut labels: BTreeMap<String, u32> = BTreeMap::new();
        let mut pc = 0u32;
        for line in &lines {
            for &name in &line.labels {
                if labels.insert(name.to_string(), pc).is_some() {
                    return Err(Error::DuplicateLabel { label: name.to_string() });
                }
            }
            if line.body.is_some() {
                pc = pc.wrapping_add(INSTRUCTION_BYTES);
            }
        }
        debug!(lines = lines.len(), labels = labels.len(), bytes = pc, "label scan done");

        // Pass 2: encode
        let mut words = Vec::with_capacity((pc / INSTRUCTION_BYTES) as usize);
        let mut word_lines = Vec::with_capacity(words.capacity());
        pc = 0;
        for line in &lines {
            let Some(body) = line.body else { continue };
            let word = encode_line(body, pc, &labels).inspect_err(|e| {
                debug!(line = line.number, error = %e, "encode failed");
            })?;
            trace!(line = line.number, pc, word, body, "encoded");
            words.push(word);
            word_lines.push(line.number);
            pc = pc.wrapping_add(INSTRUCTION_BYTES);
        }
        debug!(words = words.len(), "encode done");

        Ok(Program { origin: self.cfg.origin, words, labels, lines: word_lines })
    }
}

/// Assembles a whole source text with the default configuration.
pub fn assemble(source: &str) -> Result<Vec<u32>> {
    Assembler::new().assemble(source)
}

/// Encodes the first instruction of `text` at pc 0. Labels written in front
/// of it resolve to 0; no other labels are in scope.
pub fn assemble_instruction(text: &str) -> Result<u32> {
    let mut labels = BTreeMap::new();
    let mut body = "";
    for line in split_lines(text)? {
        for name in line.labels {
            labels.insert(name.to_string(), 0);
        }
        if let Some(b) = line.body {
            body = b;
            break;
        }
    }
    encode_line(body, 0, &labels)
}

fn strip_comment(raw: &str) -> &str {
    raw.split_once('#').map_or(raw, |(code, _)| code)
}

fn is_label_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn split_lines(source: &str) -> Result<Vec<Line<'_>>> {
    let mut out = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let mut rest = strip_comment(raw).trim();
        if rest.is_empty() {
            continue;
        }
        let mut labels = Vec::new();
        while let Some((head, tail)) = rest.split_once(':') {
            let name = head.trim();
            if !is_label_name(name) {
                return Err(Error::InvalidLabel { name: head.trim().to_string() });
            }
            labels.push(name);
            rest = tail.trim();
        }
        let body = (!rest.is_empty()).then_some(rest);
        out.push(Line { number: i + 1, labels, body });
    }
    Ok(out)
}

/// Operand access for one instruction line.
struct Operands<'a> {
    desc: &'static InstrDesc,
    ops: Vec<&'a str>,
    pc: u32,
    labels: &'a BTreeMap<String, u32>,
}

impl<'a> Operands<'a> {
    fn expect(&self, n: usize) -> Result<()> {
        if self.ops.len() != n {
            return Err(self.count_error(n));
        }
        Ok(())
    }

    fn count_error(&self, expected: usize) -> Error {
        Error::OperandCount {
            mnemonic: self.desc.mnemonic.to_string(),
            expected,
            found: self.ops.len(),
        }
    }

    fn reg(&self, i: usize) -> Result<u32> {
        register_index_of(self.ops[i]).map(u32::from)
    }

    fn imm(&self, i: usize) -> Result<i32> {
        immediate(self.ops[i], self.pc, self.labels)
    }

    /// `offset(reg)`, with the offset optional.
    fn mem(&self, i: usize) -> Result<(i32, u32)> {
        let tok = self.ops[i];
        let bad = || Error::InvalidOperand { operand: tok.to_string() };
        let (off, reg) = tok
            .strip_suffix(')')
            .and_then(|t| t.split_once('('))
            .ok_or_else(bad)?;
        if reg.is_empty() || reg.contains('(') {
            return Err(bad());
        }
        let off = if off.is_empty() { 0 } else { immediate(off, self.pc, self.labels)? };
        Ok((off, u32::from(register_index_of(reg)?)))
    }
}

fn encode_line(body: &str, pc: u32, labels: &BTreeMap<String, u32>) -> Result<u32> {
    let mut toks = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    let Some(mnemonic) = toks.next() else {
        return Err(Error::UnknownInstruction { mnemonic: String::new() });
    };
    let mnemonic = mnemonic.to_lowercase();
    let desc = instruction(&mnemonic).ok_or(Error::UnknownInstruction { mnemonic })?;
    let o = Operands { desc, ops: toks.collect(), pc, labels };

    let opcode = u32::from(desc.opcode);
    let funct3 = u32::from(desc.funct3.unwrap_or(0));
    let funct7 = u32::from(desc.funct7.unwrap_or(0));

    let word = match desc.syntax {
        Syntax::RegReg => {
            o.expect(3)?;
            encode_r(funct7, o.reg(2)?, o.reg(1)?, funct3, o.reg(0)?, opcode)
        }
        Syntax::RegImm => {
            o.expect(3)?;
            encode_i(o.imm(2)?, o.reg(1)?, funct3, o.reg(0)?, opcode)
        }
        Syntax::Shift => {
            o.expect(3)?;
            let shamt = (o.imm(2)? as u32) & 0x1F;
            encode_i(((funct7 << 5) | shamt) as i32, o.reg(1)?, funct3, o.reg(0)?, opcode)
        }
        Syntax::Load => {
            o.expect(2)?;
            let (off, base) = o.mem(1)?;
            encode_i(off, base, funct3, o.reg(0)?, opcode)
        }
        Syntax::Store => {
            o.expect(2)?;
            let (off, base) = o.mem(1)?;
            encode_s(off, o.reg(0)?, base, funct3, opcode)
        }
        Syntax::Branch => {
            o.expect(3)?;
            encode_b(o.imm(2)?, o.reg(1)?, o.reg(0)?, funct3, opcode)
        }
        Syntax::Upper => {
            o.expect(2)?;
            encode_u(o.imm(1)?, o.reg(0)?, opcode)
        }
        Syntax::Jump => match o.ops.len() {
            1 => encode_j(o.imm(0)?, RA, opcode),
            2 => encode_j(o.imm(1)?, o.reg(0)?, opcode),
            _ => return Err(o.count_error(2)),
        },
        Syntax::JumpReg => match o.ops.len() {
            2 => {
                let (off, base) = o.mem(1)?;
                encode_i(off, base, funct3, o.reg(0)?, opcode)
            }
            3 => encode_i(o.imm(2)?, o.reg(1)?, funct3, o.reg(0)?, opcode),
            _ => return Err(o.count_error(3)),
        },
        Syntax::System => {
            o.expect(0)?;
            encode_i(i32::from(desc.funct12.unwrap_or(0)), 0, funct3, 0, opcode)
        }
    };
    Ok(word)
}

/// Integer literal (optional sign, `0x`/`0o`/`0b` prefixes) or a label
/// resolved pc-relative. Literals wider than 32 bits keep their low bits.
fn immediate(tok: &str, pc: u32, labels: &BTreeMap<String, u32>) -> Result<i32> {
    let starts_numeric = tok
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+');
    if starts_numeric {
        return parse_int(tok)
            .map(|v| v as i32)
            .ok_or_else(|| Error::InvalidImmediate { text: tok.to_string() });
    }
    let target = labels
        .get(tok)
        .ok_or_else(|| Error::UndefinedLabel { label: tok.to_string() })?;
    Ok(target.wrapping_sub(pc) as i32)
}

fn parse_int(tok: &str) -> Option<i64> {
    let (neg, digits) = match tok.as_bytes().first()? {
        b'-' => (true, &tok[1..]),
        b'+' => (false, &tok[1..]),
        _ => (false, tok),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(h) = lower.strip_prefix("0x") {
        (16, h)
    } else if let Some(o) = lower.strip_prefix("0o") {
        (8, o)
    } else if let Some(b) = lower.strip_prefix("0b") {
        (2, b)
    } else {
        (10, lower.as_str())
    };
    let body = body.replace('_', "");
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }
    let v = i64::from_str_radix(&body, radix).ok()?;
    Some(if neg { v.wrapping_neg() } else { v })
}
