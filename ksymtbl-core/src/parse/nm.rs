use crate::entry::SymbolEntry;
use crate::error::{Error, Result};

const ANCHOR: &str = "Symbols from";

fn parse_hex(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(s, 16).ok()
}

pub fn parse_nm(text: &str) -> Result<Vec<SymbolEntry>> {
    let mut lines = text.lines();

    let found = lines.by_ref().any(|line| line.contains(ANCHOR));
    if !found {
        return Err(Error::MalformedInput {
            context: "nm table".into(),
            detail: format!("anchor line containing {ANCHOR:?} not found"),
        });
    }
    // blank, header, blank
    for _ in 0..3 {
        if lines.next().is_none() {
            return Err(Error::MalformedInput {
                context: "nm table".into(),
                detail: "input truncated before the symbol table header".into(),
            });
        }
    }

    let mut entries = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() != 7 {
            return Err(Error::MalformedInput {
                context: "nm table".into(),
                detail: format!(
                    "expected 7 `|`-separated fields, found {}: {line:?}",
                    fields.len()
                ),
            });
        }
        let symbol = fields[0];
        let addr = parse_hex(fields[1]).ok_or_else(|| Error::MalformedInput {
            context: "nm table".into(),
            detail: format!("not a hex address: {:?}", fields[1]),
        })?;
        let class_char = fields[2].bytes().next().ok_or_else(|| Error::MalformedInput {
            context: "nm table".into(),
            detail: "empty class field".into(),
        })?;
        entries.push(SymbolEntry::new(symbol.as_bytes().to_vec(), addr, class_char));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const S1: &str = "\
Symbols from foo.elf:

Name                  Value              Class  Type  Size  Line  Section

foo  | 00000000ffff1000 | T | FUNC | 4 |  | .text
bar  | 00000000ffff1004 | t | FUNC | 4 |  | .text
";

    #[test]
    fn parses_minimal_nm() {
        let entries = parse_nm(S1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].symbol, b"foo");
        assert_eq!(entries[0].addr, 0xffff1000);
        assert_eq!(entries[0].class_char, b'T');
        assert_eq!(entries[1].class_char, b't');
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let text = "Symbols from foo.elf:\n\n\n\nfoo | 1 | T\n";
        let err = parse_nm(text).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn missing_anchor_is_malformed() {
        assert!(parse_nm("no anchor here").is_err());
    }
}
