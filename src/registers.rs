use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::isa::rv32i::NUM_REGISTERS;

/// x0..x31. x0 reads as zero and ignores writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    regs: [u32; NUM_REGISTERS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self { regs: [0; NUM_REGISTERS] }
    }

    pub fn read(&self, index: u8) -> Result<u32> {
        let i = check(index)?;
        Ok(if i == 0 { 0 } else { self.regs[i] })
    }

    pub fn write(&mut self, index: u8, value: u32) -> Result<()> {
        let i = check(index)?;
        if i != 0 {
            self.regs[i] = value;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.regs = [0; NUM_REGISTERS];
    }
}

fn check(index: u8) -> Result<usize> {
    let i = index as usize;
    if i >= NUM_REGISTERS {
        return Err(Error::InvalidRegister { name: format!("x{index}") });
    }
    Ok(i)
}
