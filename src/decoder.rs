use serde::Serialize;

use crate::instructions::mnemonic_of_word;
use crate::isa::rv32i::{format_of, Format, OpcodeClass};

/// Every field of an instruction word, with all five immediate readings.
///
/// Which immediate is meaningful depends on `format`; the others are still
/// computed so callers can inspect a word without classifying it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedInstruction {
    pub raw: u32,
    pub opcode: u8,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub funct3: u8,
    pub funct7: u8,
    pub i_imm: i32,
    pub s_imm: i32,
    pub b_imm: i32,
    pub u_imm: i32,
    pub j_imm: i32,
    pub format: Option<Format>,
    pub mnemonic: &'static str,
}

#[inline]
fn sign_ext(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

#[inline]
fn bits(word: u32, hi: u32, lo: u32) -> u32 {
    (word >> lo) & ((1u32 << (hi - lo + 1)) - 1)
}

/// I-type: `inst[31:20]`, sign-extended.
pub fn i_immediate(word: u32) -> i32 {
    (word as i32) >> 20
}

/// S-type: `inst[31:25] ++ inst[11:7]`, sign-extended.
pub fn s_immediate(word: u32) -> i32 {
    let v = (bits(word, 31, 25) << 5) | bits(word, 11, 7);
    sign_ext(v, 12)
}

/// B-type: `inst[31] ++ inst[7] ++ inst[30:25] ++ inst[11:8] ++ 0`, sign-extended from bit 12.
pub fn b_immediate(word: u32) -> i32 {
    let v = (bits(word, 31, 31) << 12)
        | (bits(word, 7, 7) << 11)
        | (bits(word, 30, 25) << 5)
        | (bits(word, 11, 8) << 1);
    sign_ext(v, 13)
}

/// U-type: `inst[31:12]` in place, low 12 bits zero.
pub fn u_immediate(word: u32) -> i32 {
    (word & 0xFFFF_F000) as i32
}

/// J-type: `inst[31] ++ inst[19:12] ++ inst[20] ++ inst[30:21] ++ 0`, sign-extended from bit 20.
pub fn j_immediate(word: u32) -> i32 {
    let v = (bits(word, 31, 31) << 20)
        | (bits(word, 19, 12) << 12)
        | (bits(word, 20, 20) << 11)
        | (bits(word, 30, 21) << 1);
    sign_ext(v, 21)
}

/// Splits a word into its fields. Never fails: a word outside the supported
/// subset keeps its structural fields and gets the `unknown` mnemonic.
pub fn decode(word: u32) -> DecodedInstruction {
    let opcode = bits(word, 6, 0) as u8;
    DecodedInstruction {
        raw: word,
        opcode,
        rd: bits(word, 11, 7) as u8,
        rs1: bits(word, 19, 15) as u8,
        rs2: bits(word, 24, 20) as u8,
        funct3: bits(word, 14, 12) as u8,
        funct7: bits(word, 31, 25) as u8,
        i_imm: i_immediate(word),
        s_imm: s_immediate(word),
        b_imm: b_immediate(word),
        u_imm: u_immediate(word),
        j_imm: j_immediate(word),
        format: format_of(opcode),
        mnemonic: mnemonic_of_word(word),
    }
}

impl From<u32> for DecodedInstruction {
    fn from(word: u32) -> Self {
        decode(word)
    }
}

impl DecodedInstruction {
    pub fn class(&self) -> OpcodeClass {
        OpcodeClass::of(self.opcode)
    }

    /// The immediate selected by the format; `None` for R-type and unknown opcodes.
    pub fn immediate(&self) -> Option<i32> {
        match self.format? {
            Format::R => None,
            Format::I => Some(self.i_imm),
            Format::S => Some(self.s_imm),
            Format::B => Some(self.b_imm),
            Format::U => Some(self.u_imm),
            Format::J => Some(self.j_imm),
        }
    }

    /// Shift amount of `slli`/`srli`/`srai` (the rs2 position).
    pub fn shamt(&self) -> u8 {
        self.rs2
    }

    pub fn is_known(&self) -> bool {
        self.mnemonic != crate::instructions::UNKNOWN
    }

    pub fn is_op_reg(&self) -> bool {
        self.class() == OpcodeClass::OpReg
    }
    pub fn is_op_imm(&self) -> bool {
        self.class() == OpcodeClass::OpImm
    }
    pub fn is_load(&self) -> bool {
        self.class() == OpcodeClass::Load
    }
    pub fn is_store(&self) -> bool {
        self.class() == OpcodeClass::Store
    }
    pub fn is_branch(&self) -> bool {
        self.class() == OpcodeClass::Branch
    }
    pub fn is_jal(&self) -> bool {
        self.class() == OpcodeClass::Jal
    }
    pub fn is_jalr(&self) -> bool {
        self.class() == OpcodeClass::Jalr
    }
    pub fn is_lui(&self) -> bool {
        self.class() == OpcodeClass::Lui
    }
    pub fn is_auipc(&self) -> bool {
        self.class() == OpcodeClass::Auipc
    }
    pub fn is_system(&self) -> bool {
        self.class() == OpcodeClass::System
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_helper() {
        assert_eq!(bits(0xF000_0000, 31, 28), 0xF);
        assert_eq!(bits(0x0000_0F80, 11, 7), 0x1F);
    }

    #[test]
    fn sign_extension_from_top_bit() {
        assert_eq!(sign_ext(0xFFB, 12), -5);
        assert_eq!(sign_ext(0x7FF, 12), 2047);
        assert_eq!(sign_ext(0x1000, 13), -4096);
        assert_eq!(sign_ext(0x10_0000, 21), -(1 << 20));
    }
}
