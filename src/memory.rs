use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

bitflags! {
/// Byte lanes of a 32-bit word selected by a masked write.
///
/// Written as text the mask reads most-significant byte first, so `"1000"`
/// is [`ByteMask::B3`] (bits 31-24) and `"0001"` is [`ByteMask::B0`] (bits 7-0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteMask: u8 {
const B0 = 1 << 0; // bits 7-0
const B1 = 1 << 1; // bits 15-8
const B2 = 1 << 2; // bits 23-16
const B3 = 1 << 3; // bits 31-24
const LOW_HALF = Self::B0.bits() | Self::B1.bits();
const HIGH_HALF = Self::B2.bits() | Self::B3.bits();
const WORD = Self::LOW_HALF.bits() | Self::HIGH_HALF.bits();
}
}

impl ByteMask {
    /// Flags ordered most-significant byte first.
    pub fn from_lanes(lanes: [bool; 4]) -> Self {
        lanes
            .iter()
            .fold(ByteMask::empty(), |m, &on| {
                ByteMask::from_bits_truncate((m.bits() << 1) | on as u8)
            })
    }

    pub fn lanes(self) -> [bool; 4] {
        [
            self.contains(ByteMask::B3),
            self.contains(ByteMask::B2),
            self.contains(ByteMask::B1),
            self.contains(ByteMask::B0),
        ]
    }

    /// Expands each selected lane to `0xFF` at its position in the word.
    pub fn bit_mask(self) -> u32 {
        (0..4)
            .filter(|lane| self.bits() & (1 << lane) != 0)
            .fold(0, |m, lane| m | (0xFF << (8 * lane)))
    }
}

impl FromStr for ByteMask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::InvalidMask { text: s.to_string() };
        let b = s.as_bytes();
        if b.len() != 4 {
            return Err(bad());
        }
        let mut lanes = [false; 4];
        for (lane, ch) in lanes.iter_mut().zip(b) {
            *lane = match ch {
                b'1' => true,
                b'0' => false,
                _ => return Err(bad()),
            };
        }
        Ok(ByteMask::from_lanes(lanes))
    }
}

impl fmt::Display for ByteMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for on in self.lanes() {
            f.write_str(if on { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Access width of a load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    Byte = 1,
    Half = 2,
    Word = 4,
}

impl Width {
    pub fn bytes(self) -> u32 {
        self as u32
    }
}

/// Word-granular bus. Narrow accesses are derived from full-word reads and
/// masked writes using little-endian lane numbering (byte offset 0 is bits 7-0).
pub trait Bus {
    fn read_word(&self, addr: u32) -> Result<u32>;
    fn write_word(&mut self, addr: u32, value: u32, mask: ByteMask) -> Result<()>;

    fn load(&self, addr: u32, width: Width, signed: bool) -> Result<u32> {
        let offset = lane_offset(addr, width)?;
        let word = self.read_word(addr & !3)? >> (8 * offset);
        let bits = 8 * width.bytes();
        if bits == 32 {
            return Ok(word);
        }
        let v = word & ((1 << bits) - 1);
        Ok(if signed {
            (((v << (32 - bits)) as i32) >> (32 - bits)) as u32
        } else {
            v
        })
    }

    /// `sb`/`sh`/`sw`: one masked write on the containing word.
    fn store(&mut self, addr: u32, value: u32, width: Width) -> Result<()> {
        let offset = lane_offset(addr, width)?;
        let lanes = match width {
            Width::Byte => ByteMask::B0,
            Width::Half => ByteMask::LOW_HALF,
            Width::Word => ByteMask::WORD,
        };
        let mask = ByteMask::from_bits_truncate(lanes.bits() << offset);
        self.write_word(addr & !3, value << (8 * offset), mask)
    }
}

fn lane_offset(addr: u32, width: Width) -> Result<u32> {
    if addr % width.bytes() != 0 {
        return Err(Error::Unaligned { addr });
    }
    Ok(addr & 3)
}

/// Word-addressed RAM: `address / 4` selects a 32-bit cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    words: Vec<u32>,
    byte_capacity: usize,
}

impl Memory {
    /// `ceil(byte_capacity / 4)` zeroed cells, optionally preloaded from offset 0.
    pub fn new(byte_capacity: usize, initial_words: Option<&[u32]>) -> Result<Self> {
        let mut mem = Self {
            words: vec![0; byte_capacity.div_ceil(4)],
            byte_capacity,
        };
        if let Some(init) = initial_words {
            mem.load_words(0, init)?;
        }
        Ok(mem)
    }

    /// Parses the whitespace-separated decimal initialisation string.
    pub fn from_init_str(byte_capacity: usize, init: &str) -> Result<Self> {
        let values = init
            .split_whitespace()
            .map(|tok| {
                tok.parse::<i64>()
                    .map(|v| v as u32)
                    .map_err(|_| Error::InvalidImmediate { text: tok.to_string() })
            })
            .collect::<Result<Vec<u32>>>()?;
        Self::new(byte_capacity, Some(&values))
    }

    /// Writes consecutive full words starting at `addr`. Nothing is written
    /// unless every word fits.
    pub fn load_words(&mut self, addr: u32, words: &[u32]) -> Result<()> {
        let start = self.index_of(addr).or_else(|e| match e {
            // loading zero words at the end of memory is fine
            Error::OutOfBounds { .. } if words.is_empty() && addr % 4 == 0 => Ok(self.words.len()),
            e => Err(e),
        })?;
        let end = start + words.len();
        if end > self.words.len() {
            let first_missing = u32::try_from(self.words.len() * 4).unwrap_or(u32::MAX);
            return Err(Error::OutOfBounds { addr: first_missing });
        }
        self.words[start..end].copy_from_slice(words);
        trace!(addr, count = words.len(), "loaded words");
        Ok(())
    }

    pub fn read(&self, addr: u32) -> Result<u32> {
        let i = self.index_of(addr)?;
        Ok(self.words[i])
    }

    /// Replaces the byte lanes selected by `mask` with the same lanes of
    /// `value`; the other lanes keep their contents.
    pub fn write(&mut self, addr: u32, value: u32, mask: ByteMask) -> Result<()> {
        let i = self.index_of(addr)?;
        let m = mask.bit_mask();
        let old = self.words[i];
        self.words[i] = (old & !m) | (value & m);
        trace!(addr, value, %mask, old, new = self.words[i], "write");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.words.fill(0);
    }

    pub fn slot_count(&self) -> usize {
        self.words.len()
    }

    pub fn byte_capacity(&self) -> usize {
        self.byte_capacity
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    fn index_of(&self, addr: u32) -> Result<usize> {
        if addr % 4 != 0 {
            return Err(Error::Unaligned { addr });
        }
        let i = (addr / 4) as usize;
        if i >= self.words.len() {
            return Err(Error::OutOfBounds { addr });
        }
        Ok(i)
    }
}

impl Bus for Memory {
    fn read_word(&self, addr: u32) -> Result<u32> {
        self.read(addr)
    }

    fn write_word(&mut self, addr: u32, value: u32, mask: ByteMask) -> Result<()> {
        self.write(addr, value, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_text_is_msb_first() {
        assert_eq!("1000".parse::<ByteMask>().unwrap(), ByteMask::B3);
        assert_eq!("0001".parse::<ByteMask>().unwrap(), ByteMask::B0);
        assert_eq!("1111".parse::<ByteMask>().unwrap(), ByteMask::WORD);
        assert_eq!("0000".parse::<ByteMask>().unwrap(), ByteMask::empty());
        assert_eq!(ByteMask::HIGH_HALF.to_string(), "1100");
        assert!("10".parse::<ByteMask>().is_err());
        let err = "10x1".parse::<ByteMask>().unwrap_err();
        assert_eq!(err, Error::InvalidMask { text: "10x1".into() });
        assert_eq!(err.to_string(), "invalid byte mask `10x1`, expected four 0/1 digits");
    }

    #[test]
    fn mask_expands_to_lanes() {
        assert_eq!(ByteMask::B3.bit_mask(), 0xFF00_0000);
        assert_eq!(ByteMask::B1.bit_mask(), 0x0000_FF00);
        assert_eq!(ByteMask::LOW_HALF.bit_mask(), 0x0000_FFFF);
        assert_eq!(ByteMask::WORD.bit_mask(), 0xFFFF_FFFF);
        assert_eq!(ByteMask::empty().bit_mask(), 0);
        assert_eq!(ByteMask::from_lanes([false, true, false, true]), ByteMask::B2 | ByteMask::B0);
    }
}
