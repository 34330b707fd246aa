use std::collections::HashMap;

use crate::error::{Error, Result};

/// Maps a tid to its display name and the monotonically increasing
/// display id assigned the order it was read (starting at 10 — the
/// convention of the trace format this output imitates, where ids
/// below 10 are reserved).
#[derive(Debug, Clone, Default)]
pub struct ThreadNameMap {
    by_tid: HashMap<u64, (String, u32)>,
}

impl ThreadNameMap {
    pub fn parse(text: &str) -> Result<ThreadNameMap> {
        let mut by_tid = HashMap::new();
        let mut next_id = 10u32;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(addr_tok), Some(name)) = (fields.next(), fields.next()) else {
                return Err(Error::MalformedInput {
                    context: "thread name map".into(),
                    detail: format!("line {}: expected `<hex> <name>`, got {line:?}", lineno + 1),
                });
            };
            let addr_tok = addr_tok.strip_prefix("0x").unwrap_or(addr_tok);
            let tid = u64::from_str_radix(addr_tok, 16).map_err(|_| Error::MalformedInput {
                context: "thread name map".into(),
                detail: format!("line {}: not a hex address: {addr_tok:?}", lineno + 1),
            })?;
            by_tid.insert(tid, (name.to_string(), next_id));
            next_id += 1;
        }
        Ok(ThreadNameMap { by_tid })
    }

    pub fn lookup(&self, tid: u64) -> Option<&(String, u32)> {
        self.by_tid.get(&tid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_increasing_ids_starting_at_ten() {
        let text = "a 0x0\nb 0x1\nc 0x2\n";
        let map = ThreadNameMap::parse(text).unwrap();
        assert_eq!(map.lookup(0).unwrap(), &("a".to_string(), 10));
        assert_eq!(map.lookup(1).unwrap(), &("b".to_string(), 11));
        assert_eq!(map.lookup(2).unwrap(), &("c".to_string(), 12));
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(ThreadNameMap::parse("just_one_token\n").is_err());
    }
}
