//! Bit packers for the six RV32I encoding formats.
//!
//! Register and selector fields are masked to their width; immediates are
//! truncated to the bits the format can hold, so an out-of-range immediate
//! encodes silently rather than failing.

#[inline]
fn fields(rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    ((rs1 & 0x1F) << 15) | ((funct3 & 0x7) << 12) | ((rd & 0x1F) << 7) | (opcode & 0x7F)
}

/// `funct7 | rs2 | rs1 | funct3 | rd | opcode`
pub fn encode_r(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    ((funct7 & 0x7F) << 25) | ((rs2 & 0x1F) << 20) | fields(rs1, funct3, rd, opcode)
}

/// `imm[11:0] | rs1 | funct3 | rd | opcode`
pub fn encode_i(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
    let imm = imm as u32;
    ((imm & 0xFFF) << 20) | fields(rs1, funct3, rd, opcode)
}

/// `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`
pub fn encode_s(imm: i32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 5) & 0x7F) << 25)
        | ((rs2 & 0x1F) << 20)
        | ((rs1 & 0x1F) << 15)
        | ((funct3 & 0x7) << 12)
        | ((imm & 0x1F) << 7)
        | (opcode & 0x7F)
}

/// `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`
pub fn encode_b(imm: i32, rs2: u32, rs1: u32, funct3: u32, opcode: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 12) & 0x1) << 31)
        | (((imm >> 5) & 0x3F) << 25)
        | ((rs2 & 0x1F) << 20)
        | ((rs1 & 0x1F) << 15)
        | ((funct3 & 0x7) << 12)
        | (((imm >> 1) & 0xF) << 8)
        | (((imm >> 11) & 0x1) << 7)
        | (opcode & 0x7F)
}

/// `imm[19:0] | rd | opcode`; `imm` is the upper 20-bit value, not a byte offset.
pub fn encode_u(imm: i32, rd: u32, opcode: u32) -> u32 {
    let imm = imm as u32;
    ((imm & 0xF_FFFF) << 12) | ((rd & 0x1F) << 7) | (opcode & 0x7F)
}

/// `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`
pub fn encode_j(imm: i32, rd: u32, opcode: u32) -> u32 {
    let imm = imm as u32;
    (((imm >> 20) & 0x1) << 31)
        | (((imm >> 1) & 0x3FF) << 21)
        | (((imm >> 11) & 0x1) << 20)
        | (((imm >> 12) & 0xFF) << 12)
        | ((rd & 0x1F) << 7)
        | (opcode & 0x7F)
}
