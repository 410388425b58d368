use anyhow::Result;
use std::path::Path;

/// A flat little-endian word image loaded at `base`.
#[derive(Debug, Clone)]
pub struct Image {
    pub base: u32,
    pub bytes: Vec<u8>,
}

impl Image {
    pub fn end(&self) -> u32 {
        self.base.wrapping_add(self.bytes.len() as u32)
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.base && addr < self.end()
    }

    /// Little-endian word at `addr`, `None` if any of its bytes is unmapped.
    pub fn word(&self, addr: u32) -> Option<u32> {
        if !self.contains(addr) {
            return None;
        }
        let off = (addr - self.base) as usize;
        let b = self.bytes.get(off..off + 4)?;
        Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Every complete word from `start` (inclusive) to `end` (exclusive).
    pub fn words(&self, start: u32, end: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        (start..end)
            .step_by(4)
            .map_while(move |pc| self.word(pc).map(|w| (pc, w)))
    }
}

pub fn load_raw_bin(path: &Path, base: u32, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    Ok(Image { base, bytes: payload.to_vec() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let path = std::env::temp_dir().join("_rv32_model_test.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        let img = load_raw_bin(&path, 0x1000_0000, 2, Some(5)).unwrap();
        assert_eq!(img.base, 0x1000_0000);
        assert_eq!(img.bytes, vec![2, 3, 4, 5, 6]);
        assert_eq!(img.word(0x1000_0000).unwrap(), 0x0504_0302);
        // only one byte left past the first word
        assert!(img.word(0x1000_0004).is_none());
        assert!(img.word(0x0FFF_FFFC).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn words_stop_at_partial_tail() {
        let img = Image { base: 0, bytes: vec![0x13, 0, 0, 0, 0x73, 0, 0, 0, 0xFF] };
        let got: Vec<_> = img.words(0, img.end()).collect();
        assert_eq!(got, vec![(0, 0x13), (4, 0x73)]);
    }
}
