use std::collections::HashMap;
use std::sync::OnceLock;

use crate::isa::rv32i::opcodes::*;
use crate::isa::rv32i::Format;

/// Mnemonic reported for words outside the supported subset.
pub const UNKNOWN: &str = "unknown";

/// [`mnemonic_of`] answer for the SYSTEM row, which only imm[11:0] splits.
pub const ECALL_EBREAK: &str = "ecall/ebreak";

/// Operand shape accepted by the assembler for an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `rd, rs1, rs2`
    RegReg,
    /// `rd, rs1, imm`
    RegImm,
    /// `rd, rs1, shamt`
    Shift,
    /// `rd, offset(rs1)`
    Load,
    /// `rs2, offset(rs1)`
    Store,
    /// `rs1, rs2, target`
    Branch,
    /// `rd, imm20`
    Upper,
    /// `[rd,] target`
    Jump,
    /// `rd, rs1, imm` or `rd, offset(rs1)`
    JumpReg,
    /// no operands
    System,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: &'static str,
    pub format: Format,
    pub opcode: u8,
    pub funct3: Option<u8>,
    pub funct7: Option<u8>,
    /// Fixed imm[11:0] (SYSTEM rows only).
    pub funct12: Option<u16>,
    pub syntax: Syntax,
}

const fn desc(
    mnemonic: &'static str,
    format: Format,
    opcode: u8,
    funct3: Option<u8>,
    funct7: Option<u8>,
    syntax: Syntax,
) -> InstrDesc {
    InstrDesc { mnemonic, format, opcode, funct3, funct7, funct12: None, syntax }
}

const fn r(mnemonic: &'static str, funct3: u8, funct7: u8) -> InstrDesc {
    desc(mnemonic, Format::R, OP_REG, Some(funct3), Some(funct7), Syntax::RegReg)
}

const fn alu_imm(mnemonic: &'static str, funct3: u8) -> InstrDesc {
    desc(mnemonic, Format::I, OP_IMM, Some(funct3), None, Syntax::RegImm)
}

const fn shift_imm(mnemonic: &'static str, funct3: u8, funct7: u8) -> InstrDesc {
    desc(mnemonic, Format::I, OP_IMM, Some(funct3), Some(funct7), Syntax::Shift)
}

const fn load(mnemonic: &'static str, funct3: u8) -> InstrDesc {
    desc(mnemonic, Format::I, LOAD, Some(funct3), None, Syntax::Load)
}

const fn store(mnemonic: &'static str, funct3: u8) -> InstrDesc {
    desc(mnemonic, Format::S, STORE, Some(funct3), None, Syntax::Store)
}

const fn branch(mnemonic: &'static str, funct3: u8) -> InstrDesc {
    desc(mnemonic, Format::B, BRANCH, Some(funct3), None, Syntax::Branch)
}

const fn system(mnemonic: &'static str, funct12: u16) -> InstrDesc {
    InstrDesc {
        mnemonic,
        format: Format::I,
        opcode: SYSTEM,
        funct3: Some(0b000),
        funct7: None,
        funct12: Some(funct12),
        syntax: Syntax::System,
    }
}

pub static TABLE: &[InstrDesc] = &[
    r("add", 0b000, 0b000_0000),
    r("sub", 0b000, 0b010_0000),
    r("sll", 0b001, 0b000_0000),
    r("slt", 0b010, 0b000_0000),
    r("sltu", 0b011, 0b000_0000),
    r("xor", 0b100, 0b000_0000),
    r("srl", 0b101, 0b000_0000),
    r("sra", 0b101, 0b010_0000),
    r("or", 0b110, 0b000_0000),
    r("and", 0b111, 0b000_0000),
    alu_imm("addi", 0b000),
    alu_imm("slti", 0b010),
    alu_imm("sltiu", 0b011),
    alu_imm("xori", 0b100),
    alu_imm("ori", 0b110),
    alu_imm("andi", 0b111),
    shift_imm("slli", 0b001, 0b000_0000),
    shift_imm("srli", 0b101, 0b000_0000),
    shift_imm("srai", 0b101, 0b010_0000),
    load("lb", 0b000),
    load("lh", 0b001),
    load("lw", 0b010),
    load("lbu", 0b100),
    load("lhu", 0b101),
    store("sb", 0b000),
    store("sh", 0b001),
    store("sw", 0b010),
    branch("beq", 0b000),
    branch("bne", 0b001),
    branch("blt", 0b100),
    branch("bge", 0b101),
    branch("bltu", 0b110),
    branch("bgeu", 0b111),
    desc("jal", Format::J, JAL, None, None, Syntax::Jump),
    desc("jalr", Format::I, JALR, Some(0b000), None, Syntax::JumpReg),
    desc("lui", Format::U, LUI, None, None, Syntax::Upper),
    desc("auipc", Format::U, AUIPC, None, None, Syntax::Upper),
    system("ecall", 0),
    system("ebreak", 1),
];

/// Descriptor for a (lower-case) mnemonic.
pub fn instruction(mnemonic: &str) -> Option<&'static InstrDesc> {
    static BY_MNEMONIC: OnceLock<HashMap<&'static str, &'static InstrDesc>> = OnceLock::new();
    BY_MNEMONIC
        .get_or_init(|| TABLE.iter().map(|d| (d.mnemonic, d)).collect())
        .get(mnemonic)
        .copied()
}

/// Row lookup in the order: exact (opcode, funct3, funct7), then rows keyed by
/// the opcode alone, then (opcode, funct3) rows without a funct7 selector.
pub fn lookup(opcode: u8, funct3: u8, funct7: Option<u8>) -> Option<&'static InstrDesc> {
    let same_op = || TABLE.iter().filter(move |d| d.opcode == opcode);
    if let Some(f7) = funct7 {
        if let Some(d) = same_op().find(|d| d.funct3 == Some(funct3) && d.funct7 == Some(f7)) {
            return Some(d);
        }
    }
    if let Some(d) = same_op().find(|d| d.funct3.is_none()) {
        return Some(d);
    }
    same_op().find(|d| d.funct3 == Some(funct3) && d.funct7.is_none())
}

/// Mnemonic for an (opcode, funct3[, funct7]) triple. The triple cannot tell
/// `ecall` from `ebreak`, so that row reports [`ECALL_EBREAK`]; use
/// [`describe_word`] on the full word to split them.
pub fn mnemonic_of(opcode: u8, funct3: u8, funct7: Option<u8>) -> &'static str {
    match lookup(opcode, funct3, funct7) {
        Some(d) if d.funct12.is_some() => ECALL_EBREAK,
        Some(d) => d.mnemonic,
        None => UNKNOWN,
    }
}

/// Full classification of an instruction word, including the fixed
/// immediates of `ecall`/`ebreak` (which also require rd = rs1 = x0).
pub fn describe_word(word: u32) -> Option<&'static InstrDesc> {
    let opcode = (word & 0x7F) as u8;
    let funct3 = ((word >> 12) & 0x7) as u8;
    let funct7 = (word >> 25) as u8;
    if opcode == SYSTEM {
        let funct12 = (word >> 20) as u16;
        let rd = (word >> 7) & 0x1F;
        let rs1 = (word >> 15) & 0x1F;
        if rd != 0 || rs1 != 0 {
            return None;
        }
        return TABLE
            .iter()
            .find(|d| d.opcode == SYSTEM && d.funct3 == Some(funct3) && d.funct12 == Some(funct12));
    }
    lookup(opcode, funct3, Some(funct7))
}

pub fn mnemonic_of_word(word: u32) -> &'static str {
    describe_word(word).map_or(UNKNOWN, |d| d.mnemonic)
}
