//! RV32I base integer subset: major opcodes, encoding formats and the ABI
//! register names.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Major opcodes (bits 6-0).
pub mod opcodes {
    /// add, sub, sll, slt, sltu, xor, srl, sra, or, and
    pub const OP_REG: u8 = 0b011_0011;
    /// addi, slti, sltiu, xori, ori, andi, slli, srli, srai
    pub const OP_IMM: u8 = 0b001_0011;
    pub const LOAD: u8 = 0b000_0011;
    pub const STORE: u8 = 0b010_0011;
    /// beq, bne, blt, bge, bltu, bgeu
    pub const BRANCH: u8 = 0b110_0011;
    pub const JAL: u8 = 0b110_1111;
    pub const JALR: u8 = 0b110_0111;
    pub const LUI: u8 = 0b011_0111;
    pub const AUIPC: u8 = 0b001_0111;
    /// ecall, ebreak
    pub const SYSTEM: u8 = 0b111_0011;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// register-register
    R,
    /// immediate: OP-IMM, loads, jalr, system
    I,
    /// stores
    S,
    /// conditional branches
    B,
    /// upper immediate
    U,
    /// jal
    J,
}

/// Instruction family selected by the major opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpcodeClass {
    OpReg,
    OpImm,
    Load,
    Store,
    Branch,
    Jal,
    Jalr,
    Lui,
    Auipc,
    System,
    Unknown,
}

impl OpcodeClass {
    pub fn of(opcode: u8) -> Self {
        use opcodes::*;
        match opcode {
            OP_REG => Self::OpReg,
            OP_IMM => Self::OpImm,
            LOAD => Self::Load,
            STORE => Self::Store,
            BRANCH => Self::Branch,
            JAL => Self::Jal,
            JALR => Self::Jalr,
            LUI => Self::Lui,
            AUIPC => Self::Auipc,
            SYSTEM => Self::System,
            _ => Self::Unknown,
        }
    }
}

/// Encoding format of a major opcode, `None` for opcodes outside the subset.
pub fn format_of(opcode: u8) -> Option<Format> {
    match OpcodeClass::of(opcode) {
        OpcodeClass::OpReg => Some(Format::R),
        OpcodeClass::OpImm
        | OpcodeClass::Load
        | OpcodeClass::Jalr
        | OpcodeClass::System => Some(Format::I),
        OpcodeClass::Store => Some(Format::S),
        OpcodeClass::Branch => Some(Format::B),
        OpcodeClass::Lui | OpcodeClass::Auipc => Some(Format::U),
        OpcodeClass::Jal => Some(Format::J),
        OpcodeClass::Unknown => None,
    }
}

pub const NUM_REGISTERS: usize = 32;

/// ABI names indexed by register number.
pub const REGISTER_NAMES: [&str; NUM_REGISTERS] = [
    "zero", // hardwired zero
    "ra",   // return address
    "sp",   // stack pointer
    "gp",   // global pointer
    "tp",   // thread pointer
    "t0", "t1", "t2",
    "s0", "s1",
    "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
    "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11",
    "t3", "t4", "t5", "t6",
];

/// Resolves an ABI name (`sp`, `a0`, `fp`, ...) or an `x<N>` literal to a register index.
pub fn register_index_of(name: &str) -> Result<u8> {
    let invalid = || Error::InvalidRegister { name: name.to_string() };
    let name = name.trim();
    if name == "fp" {
        return Ok(8);
    }
    if let Some(i) = REGISTER_NAMES.iter().position(|&n| n == name) {
        return Ok(i as u8);
    }
    let digits = name.strip_prefix('x').ok_or_else(invalid)?;
    // reject "x+1", "x01" style spellings that `parse` would accept
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return Err(invalid());
    }
    match digits.parse::<u8>() {
        Ok(n) if (n as usize) < NUM_REGISTERS => Ok(n),
        _ => Err(invalid()),
    }
}

/// ABI name of a register index (only the low 5 bits are used).
pub fn register_name(index: u8) -> &'static str {
    REGISTER_NAMES[(index & 0x1F) as usize]
}
