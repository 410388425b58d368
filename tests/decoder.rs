use rv32i_core::encoder::{encode_b, encode_i, encode_j, encode_r, encode_s, encode_u};
use rv32i_core::isa::rv32i::opcodes::*;
use rv32i_core::instructions::ECALL_EBREAK;
use rv32i_core::{
    assemble_instruction, decode, mnemonic_of, DecodedInstruction, Format, OpcodeClass,
};

fn dec(text: &str) -> DecodedInstruction {
    decode(assemble_instruction(text).unwrap())
}

#[test]
fn r_type_fields() {
    let d = dec("sub x5, x6, x7");
    assert_eq!(d.opcode, OP_REG);
    assert_eq!((d.rd, d.rs1, d.rs2), (5, 6, 7));
    assert_eq!(d.funct3, 0);
    assert_eq!(d.funct7, 0b010_0000);
    assert_eq!(d.format, Some(Format::R));
    assert_eq!(d.mnemonic, "sub");
    assert_eq!(d.immediate(), None);
}

#[test]
fn i_type_sign_extends() {
    let d = dec("addi x1, x2, -5");
    assert_eq!(d.i_imm, -5);
    assert_eq!(d.immediate(), Some(-5));
    assert_eq!(d.mnemonic, "addi");

    let d = decode(encode_i(2047, 0, 0, 0, OP_IMM as u32));
    assert_eq!(d.i_imm, 2047);
    let d = decode(encode_i(-2048, 0, 0, 0, OP_IMM as u32));
    assert_eq!(d.i_imm, -2048);
}

#[test]
fn s_type_reassembles_split_immediate() {
    let d = dec("sw x2, -12(x1)");
    assert_eq!(d.s_imm, -12);
    assert_eq!((d.rs1, d.rs2), (1, 2));
    assert_eq!(d.format, Some(Format::S));
    assert_eq!(d.mnemonic, "sw");

    for imm in [-2048, -1, 0, 1, 31, 32, 2047] {
        let w = encode_s(imm, 3, 4, 0b010, STORE as u32);
        assert_eq!(decode(w).s_imm, imm);
    }
}

#[test]
fn b_type_offsets() {
    for imm in [-4096, -4, 0, 4, 8, 2046, 4094] {
        let w = encode_b(imm, 2, 1, 0, BRANCH as u32);
        assert_eq!(decode(w).b_imm, imm, "{imm}");
    }
    // bit 0 is not encodable
    assert_eq!(decode(encode_b(5, 0, 0, 0, BRANCH as u32)).b_imm, 4);
}

#[test]
fn j_type_offsets() {
    for imm in [-1_048_576, -2048, -4, 0, 4, 2048, 1_048_574] {
        let w = encode_j(imm, 1, JAL as u32);
        assert_eq!(decode(w).j_imm, imm, "{imm}");
    }
    let d = dec("jal x1, 2048");
    assert_eq!(d.raw, 0x0010_00EF);
    assert!(d.is_jal());
}

#[test]
fn u_type_keeps_upper_bits() {
    let d = decode(encode_u(0x12345, 1, LUI as u32));
    assert_eq!(d.raw, 0x1234_50B7);
    assert_eq!(d.u_imm, 0x1234_5000);
    assert!(d.is_lui());

    let d = decode(encode_u(0xFFFFF, 1, AUIPC as u32));
    assert_eq!(d.u_imm as u32, 0xFFFF_F000);
    assert!(d.is_auipc());
}

#[test]
fn fields_survive_round_trip() {
    let w = encode_r(0b010_0000, 31, 17, 0b101, 9, OP_REG as u32);
    let d = decode(w);
    assert_eq!(d.funct7, 0b010_0000);
    assert_eq!(d.rs2, 31);
    assert_eq!(d.rs1, 17);
    assert_eq!(d.funct3, 0b101);
    assert_eq!(d.rd, 9);
    assert_eq!(d.mnemonic, "sra");
}

#[test]
fn predicates_follow_the_opcode() {
    let cases: [(&str, fn(&DecodedInstruction) -> bool, OpcodeClass); 10] = [
        ("add x1, x2, x3", DecodedInstruction::is_op_reg, OpcodeClass::OpReg),
        ("xori x1, x2, 1", DecodedInstruction::is_op_imm, OpcodeClass::OpImm),
        ("lbu x1, 0(x2)", DecodedInstruction::is_load, OpcodeClass::Load),
        ("sh x1, 0(x2)", DecodedInstruction::is_store, OpcodeClass::Store),
        ("bgeu x1, x2, 8", DecodedInstruction::is_branch, OpcodeClass::Branch),
        ("jal x0, 8", DecodedInstruction::is_jal, OpcodeClass::Jal),
        ("jalr x0, 0(x1)", DecodedInstruction::is_jalr, OpcodeClass::Jalr),
        ("lui x1, 1", DecodedInstruction::is_lui, OpcodeClass::Lui),
        ("auipc x1, 1", DecodedInstruction::is_auipc, OpcodeClass::Auipc),
        ("ecall", DecodedInstruction::is_system, OpcodeClass::System),
    ];
    for (text, pred, class) in cases {
        let d = dec(text);
        assert!(pred(&d), "{text}");
        assert_eq!(d.class(), class, "{text}");
        assert!(d.is_known(), "{text}");
    }
}

#[test]
fn system_words_need_exact_immediates() {
    assert_eq!(decode(0x0000_0073).mnemonic, "ecall");
    assert_eq!(decode(0x0010_0073).mnemonic, "ebreak");
    // funct12 = 2 is not in the subset
    assert_eq!(decode(0x0020_0073).mnemonic, "unknown");
    // rd != x0
    assert_eq!(decode(0x0000_00F3).mnemonic, "unknown");
}

#[test]
fn field_lookup_cannot_split_system_row() {
    for word in [0x0000_0073u32, 0x0010_0073] {
        let d = decode(word);
        assert_eq!(mnemonic_of(d.opcode, d.funct3, Some(d.funct7)), ECALL_EBREAK);
        assert!(ECALL_EBREAK.split('/').any(|m| m == d.mnemonic));
    }
    let d = decode(0x4031_00B3); // sub x1, x2, x3
    assert_eq!(mnemonic_of(d.opcode, d.funct3, Some(d.funct7)), d.mnemonic);
}

#[test]
fn unsupported_words_decode_structurally() {
    // mul x1, x2, x3 (RV32M)
    let d = decode(0x0231_00B3);
    assert_eq!(d.opcode, OP_REG);
    assert_eq!(d.funct7, 1);
    assert_eq!(d.mnemonic, "unknown");
    assert!(!d.is_known());
    assert_eq!(d.format, Some(Format::R));

    let d = decode(0xFFFF_FFFF);
    assert_eq!(d.opcode, 0x7F);
    assert_eq!(d.format, None);
    assert_eq!(d.class(), OpcodeClass::Unknown);
    assert_eq!(d.immediate(), None);
    assert_eq!(d.i_imm, -1);

    let d = decode(0);
    assert_eq!(d.mnemonic, "unknown");
}

#[test]
fn shift_amount_sits_in_rs2() {
    let d = dec("srai x3, x4, 17");
    assert_eq!(d.shamt(), 17);
    assert_eq!(d.funct7, 0b010_0000);
    assert_eq!(d.mnemonic, "srai");
    assert_eq!(dec("srli x3, x4, 17").mnemonic, "srli");
}
