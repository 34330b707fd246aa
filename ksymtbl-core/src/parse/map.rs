use crate::entry::SymbolEntry;
use crate::error::{Error, Result};

const ANCHOR: &str = "Linker script and memory map";
const STOP_MARKER: &str = "*(__patchable_function_entries)";

/// Output of the linker-map dialect parser: the flat entry list plus
/// the `.text` program section's base/size, kept only as a diagnostic.
/// The blob's offset base is always derived from the first retained
/// `T`-class entry's own address, never from these fields.
#[derive(Debug, Clone)]
pub struct ParsedMap {
    pub entries: Vec<SymbolEntry>,
    pub text_base: u64,
    pub text_size: u64,
}

fn parse_hex(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(s, 16).ok()
}

/// Matches a line that announces the `.text` program section with its
/// base and size, e.g. ` .text   0x0000000080200000   0x10000`.
fn match_text_section_line(line: &str) -> Option<(u64, u64)> {
    let trimmed = line.trim();
    let mut tokens = trimmed.split_whitespace();
    let name = tokens.next()?;
    if name != ".text" {
        return None;
    }
    let base = parse_hex(tokens.next()?)?;
    let size = parse_hex(tokens.next()?)?;
    Some((base, size))
}

pub fn parse_map(text: &str) -> Result<ParsedMap> {
    let mut lines = text.lines();

    let found = lines.by_ref().any(|line| line.trim() == ANCHOR);
    if !found {
        return Err(Error::MalformedInput {
            context: "linker map".into(),
            detail: format!("anchor line {ANCHOR:?} not found"),
        });
    }

    let mut text_base = None;
    let mut text_size = None;
    for line in lines.by_ref() {
        if let Some((base, size)) = match_text_section_line(line) {
            text_base = Some(base);
            text_size = Some(size);
            break;
        }
    }
    let (text_base, text_size) = match (text_base, text_size) {
        (Some(b), Some(s)) => (b, s),
        _ => {
            return Err(Error::MalformedInput {
                context: "linker map".into(),
                detail: "no .text program section with base/size found".into(),
            })
        }
    };

    let mut entries = Vec::new();
    for line in lines {
        if line.trim() == STOP_MARKER {
            break;
        }
        if line.is_empty() {
            continue;
        }
        // Block header lines (`<hex> <hex> <path-to-.o>`) are not
        // indented; content lines (`<hex>  <C-identifier>`) are. We
        // only care about content lines, so indentation alone decides
        // whether a line is worth parsing further.
        let is_indented = line.starts_with(' ') || line.starts_with('\t');
        if !is_indented {
            continue;
        }
        let trimmed = line.trim();
        let mut tokens = trimmed.split_whitespace();
        let (Some(addr_tok), Some(name_tok), None) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };
        let Some(addr) = parse_hex(addr_tok) else {
            continue;
        };
        entries.push(SymbolEntry::new(name_tok.as_bytes().to_vec(), addr, b'T'));
    }

    Ok(ParsedMap {
        entries,
        text_base,
        text_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_map() {
        let text = "\
some preamble
Linker script and memory map

 .text           0x0000000080200000        0x10000
 *(.text)
 0x0000000080200000 0x20 build/foo.o
    0x0000000080200000  foo_function
    0x0000000080200010  bar_function
 0x0000000080200020 0x10 build/baz.o
    0x0000000080200020  baz_function
*(__patchable_function_entries)
 trailing garbage is ignored
";
        let parsed = parse_map(text).unwrap();
        assert_eq!(parsed.text_base, 0x80200000);
        assert_eq!(parsed.text_size, 0x10000);
        assert_eq!(parsed.entries.len(), 3);
        assert_eq!(parsed.entries[0].symbol, b"foo_function");
        assert_eq!(parsed.entries[0].addr, 0x80200000);
        assert_eq!(parsed.entries[2].symbol, b"baz_function");
    }

    #[test]
    fn empty_block_contributes_nothing() {
        let text = "\
Linker script and memory map
 .text 0x0 0x10
 0x0 0x0 build/empty.o
 0x10 0x10 build/full.o
    0x10  only_symbol
*(__patchable_function_entries)
";
        let parsed = parse_map(text).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].symbol, b"only_symbol");
    }

    #[test]
    fn missing_anchor_is_malformed() {
        let err = parse_map("nothing here").unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }
}
