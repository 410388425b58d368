use serde::Serialize;
use std::fmt::Write as _;

use rv32i_core::disasm::{branch_target, fmt_decoded_with, RegNames};
use rv32i_core::{decode, DecodedInstruction};

use crate::model::Image;

#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub addr: u32,
    pub word: u32,
    pub text: String,
    pub target: Option<u32>,
    pub decoded: DecodedInstruction,
}

/// Decodes every complete word in `[start, end)`.
pub fn listing(img: &Image, start: u32, end: u32, names: RegNames) -> Vec<Entry> {
    img.words(start, end)
        .map(|(addr, word)| {
            let d = decode(word);
            Entry {
                addr,
                word,
                text: fmt_decoded_with(&d, names),
                target: branch_target(&d, addr),
                decoded: d,
            }
        })
        .collect()
}

pub fn render_text(entries: &[Entry], show_bytes: bool) -> String {
    let mut buf = String::new();
    for e in entries {
        let _ = write!(buf, "{:#010x}: ", e.addr);
        if show_bytes {
            for b in e.word.to_le_bytes() {
                let _ = write!(buf, "{b:02x} ");
            }
            buf.push(' ');
        }
        buf.push_str(&e.text);
        if let Some(t) = e.target {
            let _ = write!(buf, "  # -> {t:#010x}");
        }
        buf.push('\n');
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_resolves_branch_targets() {
        let words = rv32i_core::assemble("top: addi a0, zero, 1\nbne a0, zero, top").unwrap();
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let img = Image { base: 0x100, bytes };
        let entries = listing(&img, img.base, img.end(), RegNames::Numeric);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "addi x10, x0, 1");
        assert_eq!(entries[1].text, "bne x10, x0, -4");
        assert_eq!(entries[1].target, Some(0x100));

        let text = render_text(&entries, true);
        assert!(text.starts_with("0x00000100: 13 05 10 00  addi x10, x0, 1\n"));
        assert!(text.contains("# -> 0x00000100"));

        let abi = listing(&img, img.base, img.end(), RegNames::Abi);
        assert_eq!(abi[1].text, "bne a0, zero, -4");
    }
}
