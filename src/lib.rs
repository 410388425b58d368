pub mod assembler;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod error;
pub mod instructions;
pub mod memory;
pub mod registers;

pub mod isa {
    pub mod rv32i; // RV32I base integer subset
}

pub use assembler::{assemble, assemble_instruction, Assembler, AssemblerConfig, Program};
pub use decoder::{decode, DecodedInstruction};
pub use error::{Error, ErrorKind, Result};
pub use instructions::mnemonic_of;
pub use isa::rv32i::{format_of, register_index_of, Format, OpcodeClass};
pub use memory::{Bus, ByteMask, Memory, Width};
pub use registers::RegisterFile;
