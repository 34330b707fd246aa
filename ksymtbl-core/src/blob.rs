//! KSYMTBL blob layout encoder.

use crate::entry::SymbolEntry;
use crate::error::{Error, Result};

pub const MAGIC: u32 = 0x2023_3202;
const HEADER_WORDS: usize = 10;
pub const HEADER_SZ: u32 = (HEADER_WORDS * 4) as u32;

fn align_up(v: u32, align: u32) -> u32 {
    (v + align - 1) & !(align - 1)
}

/// The fully laid-out blob: a flat byte buffer plus the section
/// offsets a reader (or a test) needs to slice into it.
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub base: u64,
    pub symbol_count: u32,
    pub off_o2s: u32,
    pub off_s2o: u32,
    pub off_oft: u32,
    pub off_syt: u32,
    pub off_str: u32,
}

/// Packs a `u16` sequence into `u32` words: pairs `(lo, hi)` are
/// stored so that a little-endian reader sees `lo` at the lower
/// address. `host_little_endian` selects which transpose is applied;
/// the byte layout is otherwise target-independent.
fn pack_u16_pairs(values: &[u16], host_little_endian: bool) -> Vec<u8> {
    let mut padded = values.to_vec();
    if padded.len() % 2 != 0 {
        padded.push(0);
    }
    let mut out = Vec::with_capacity(padded.len() * 2);
    for pair in padded.chunks_exact(2) {
        let (lo, hi) = (pair[0], pair[1]);
        let word: u32 = if host_little_endian {
            ((hi as u32) << 16) | (lo as u32 & 0xFFFF)
        } else {
            ((lo as u32) << 16) | (hi as u32 & 0xFFFF)
        };
        out.extend_from_slice(&word.to_le_bytes());
    }
    out
}

/// Encodes `entries` (already filtered, and optionally already
/// compressed) into a KSYMTBL blob. Entries outside the 4 GiB window
/// anchored on the first `T`-class entry are silently skipped
/// (`WindowOverflow`).
pub fn encode(entries: &[SymbolEntry]) -> Result<Blob> {
    let anchor = entries
        .iter()
        .find(|e| e.class_upper() == b'T')
        .ok_or(Error::NoTextSymbol)?;
    let base = anchor.addr & 0xFFFF_FFFF_0000_0000;

    let mut windowed: Vec<SymbolEntry> = Vec::new();
    let mut skipped = 0usize;
    for e in entries {
        if e.addr & 0xFFFF_FFFF_0000_0000 == base {
            windowed.push(e.clone());
        } else {
            skipped += 1;
        }
    }
    if skipped > 0 {
        log::warn!(
            "{skipped} entries fall outside the {base:#x} 4GiB window and were dropped (WindowOverflow)"
        );
    }

    windowed.sort_by_key(|e| e.addr);
    let n = windowed.len() as u32;
    for (idx, e) in windowed.iter_mut().enumerate() {
        e.oft_idx = Some(idx as u32);
    }
    let oft: Vec<u32> = windowed.iter().map(|e| (e.addr & 0xFFFF_FFFF) as u32).collect();

    let mut by_name: Vec<usize> = (0..windowed.len()).collect();
    by_name.sort_by(|&a, &b| windowed[a].symbol.cmp(&windowed[b].symbol));

    let mut syt: Vec<u32> = vec![0; windowed.len()];
    let mut str_bytes: Vec<u8> = Vec::new();
    for (syt_idx, &orig_idx) in by_name.iter().enumerate() {
        syt[syt_idx] = str_bytes.len() as u32;
        str_bytes.push(windowed[orig_idx].class_char);
        str_bytes.extend_from_slice(&windowed[orig_idx].symbol);
        str_bytes.push(0);
        windowed[orig_idx].syt_idx = Some(syt_idx as u32);
    }
    while str_bytes.len() % 4 != 0 {
        str_bytes.push(0);
    }

    let mut o2s: Vec<u16> = vec![0; windowed.len()];
    let mut s2o: Vec<u16> = vec![0; windowed.len()];
    for e in &windowed {
        let oft_idx = e.oft_idx.unwrap() as usize;
        let syt_idx = e.syt_idx.unwrap() as usize;
        o2s[oft_idx] = syt_idx as u16;
        s2o[syt_idx] = oft_idx as u16;
    }

    let host_little_endian = cfg!(target_endian = "little");
    let o2s_bytes = pack_u16_pairs(&o2s, host_little_endian);
    let s2o_bytes = pack_u16_pairs(&s2o, host_little_endian);
    let oft_bytes: Vec<u8> = oft.iter().flat_map(|w| w.to_le_bytes()).collect();
    let syt_bytes: Vec<u8> = syt.iter().flat_map(|w| w.to_le_bytes()).collect();

    let off_o2s = align_up(HEADER_SZ, 4);
    let off_s2o = align_up(off_o2s + o2s_bytes.len() as u32, 4);
    let off_oft = align_up(off_s2o + s2o_bytes.len() as u32, 4);
    let off_syt = align_up(off_oft + oft_bytes.len() as u32, 4);
    let off_str = align_up(off_syt + syt_bytes.len() as u32, 4);
    let total_size = off_str + str_bytes.len() as u32;

    let mut bytes = Vec::with_capacity(total_size as usize);
    bytes.extend_from_slice(&MAGIC.to_le_bytes());
    bytes.extend_from_slice(&n.to_le_bytes());
    bytes.extend_from_slice(&total_size.to_le_bytes());
    bytes.extend_from_slice(&((base & 0xFFFF_FFFF) as u32).to_le_bytes());
    bytes.extend_from_slice(&((base >> 32) as u32).to_le_bytes());
    bytes.extend_from_slice(&off_o2s.to_le_bytes());
    bytes.extend_from_slice(&off_s2o.to_le_bytes());
    bytes.extend_from_slice(&off_oft.to_le_bytes());
    bytes.extend_from_slice(&off_syt.to_le_bytes());
    bytes.extend_from_slice(&off_str.to_le_bytes());
    debug_assert_eq!(bytes.len() as u32, HEADER_SZ);

    bytes.extend_from_slice(&o2s_bytes);
    bytes.extend_from_slice(&s2o_bytes);
    bytes.extend_from_slice(&oft_bytes);
    bytes.extend_from_slice(&syt_bytes);
    bytes.extend_from_slice(&str_bytes);

    Ok(Blob {
        bytes,
        base,
        symbol_count: n,
        off_o2s,
        off_s2o,
        off_oft,
        off_syt,
        off_str,
    })
}

/// Renders a blob's `u32` words as a packaging-convenience C wrapper,
/// matching the `.ksymtbl`-sectioned array the original extraction
/// tooling emitted. Generating the C *source* is this crate's job;
/// what a build system does with that source, such as where it links
/// it, is a linker script concern.
pub fn render_c_wrapper(blob: &Blob) -> String {
    let words: Vec<u32> = blob
        .bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let mut out = String::new();
    out.push_str("#include <stdint.h>\n\n");
    out.push_str(&format!("#define KSYMTBL_MAGIC 0x{MAGIC:08x}u\n"));
    out.push_str(&format!("#define KSYMTBL_SYMBOL_COUNT {}\n", blob.symbol_count));
    out.push_str(&format!("#define KSYMTBL_WORD_COUNT {}\n\n", words.len()));
    out.push_str("uint32_t\n__attribute__((section(\".ksymtbl\")))\nksymtbl_blob[KSYMTBL_WORD_COUNT] = {\n");
    for chunk in words.chunks(6) {
        out.push_str("    ");
        for w in chunk {
            out.push_str(&format!("0x{w:08x}, "));
        }
        out.push('\n');
    }
    out.push_str("};\n");
    out
}
