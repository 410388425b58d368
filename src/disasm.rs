use std::fmt;

use crate::decoder::DecodedInstruction;
use crate::instructions::{describe_word, Syntax};
use crate::isa::rv32i::register_name;

/// Register spelling used in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegNames {
    /// `x0`..`x31`
    #[default]
    Numeric,
    /// `zero`, `ra`, `sp`, ...
    Abi,
}

impl RegNames {
    fn of(self, index: u8) -> String {
        match self {
            RegNames::Numeric => format!("x{index}"),
            RegNames::Abi => register_name(index).to_string(),
        }
    }
}

/// Canonical assembly text for a decoded word. Assembling the result at the
/// same pc reproduces the word; unsupported words print as `.word`.
pub fn fmt_decoded(d: &DecodedInstruction) -> String {
    fmt_decoded_with(d, RegNames::Numeric)
}

pub fn fmt_decoded_with(d: &DecodedInstruction, names: RegNames) -> String {
    let Some(desc) = describe_word(d.raw) else {
        return format!(".word {:#010x}", d.raw);
    };
    let mn = desc.mnemonic;
    let (rd, rs1, rs2) = (names.of(d.rd), names.of(d.rs1), names.of(d.rs2));
    match desc.syntax {
        Syntax::RegReg => format!("{mn} {rd}, {rs1}, {rs2}"),
        Syntax::RegImm => format!("{mn} {rd}, {rs1}, {}", d.i_imm),
        Syntax::Shift => format!("{mn} {rd}, {rs1}, {}", d.shamt()),
        Syntax::Load => format!("{mn} {rd}, {}({rs1})", d.i_imm),
        Syntax::Store => format!("{mn} {rs2}, {}({rs1})", d.s_imm),
        Syntax::Branch => format!("{mn} {rs1}, {rs2}, {}", d.b_imm),
        Syntax::Upper => format!("{mn} {rd}, {:#x}", (d.u_imm as u32) >> 12),
        Syntax::Jump => format!("{mn} {rd}, {}", d.j_imm),
        Syntax::JumpReg => format!("{mn} {rd}, {}({rs1})", d.i_imm),
        Syntax::System => mn.to_string(),
    }
}

/// Absolute branch/jump target of a pc-relative instruction at `pc`.
pub fn branch_target(d: &DecodedInstruction, pc: u32) -> Option<u32> {
    let off = match describe_word(d.raw)?.syntax {
        Syntax::Branch => d.b_imm,
        Syntax::Jump => d.j_imm,
        _ => return None,
    };
    Some(pc.wrapping_add(off as u32))
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&fmt_decoded(self))
    }
}
