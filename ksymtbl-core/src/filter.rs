use regex::Regex;

use crate::entry::SymbolEntry;
use crate::error::{Error, Result};

const REJECTED_CLASSES: [u8; 3] = [b'A', b'D', b'B'];

/// A pure predicate over [`SymbolEntry`], with no state beyond the
/// compiled deny-list. Rejects absolute/data/bss classes and any
/// symbol matching a deny-rule.
#[derive(Debug)]
pub struct SymbolFilter {
    deny_rules: Vec<Regex>,
}

/// Anchors `pattern` at the start of the subject, matching the
/// original tool's `re.match` semantics rather than `is_match`'s
/// search-anywhere default: a symbol only has to *start* with the
/// deny-rule, not contain it.
fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})")
}

impl SymbolFilter {
    /// The default deny-list: compiler-generated `__FUNCTION__.NNN`
    /// labels.
    pub fn new() -> Result<Self> {
        Self::with_extra_patterns(&[])
    }

    /// Builds a filter with the default rule plus any caller-supplied
    /// extra patterns (the CLI's `--deny`).
    pub fn with_extra_patterns(extra: &[String]) -> Result<Self> {
        let mut deny_rules = vec![Regex::new(&anchored(r"__FUNCTION__\.\d+"))
            .expect("built-in deny pattern is valid")];
        for pattern in extra {
            let re = Regex::new(&anchored(pattern))
                .map_err(|e| Error::InvalidDenyPattern(pattern.clone(), e))?;
            deny_rules.push(re);
        }
        Ok(SymbolFilter { deny_rules })
    }

    pub fn accepts(&self, entry: &SymbolEntry) -> bool {
        if REJECTED_CLASSES.contains(&entry.class_upper()) {
            return false;
        }
        let name = entry.symbol_str_lossy();
        !self.deny_rules.iter().any(|re| re.is_match(&name))
    }

    /// Filters `entries` in place, preserving relative order.
    pub fn retain(&self, entries: Vec<SymbolEntry>) -> Vec<SymbolEntry> {
        entries.into_iter().filter(|e| self.accepts(e)).collect()
    }
}

impl Default for SymbolFilter {
    fn default() -> Self {
        Self::new().expect("default filter always compiles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str, class_char: u8) -> SymbolEntry {
        SymbolEntry::new(symbol.as_bytes().to_vec(), 0x1000, class_char)
    }

    #[test]
    fn rejects_absolute_data_bss() {
        let f = SymbolFilter::new().unwrap();
        assert!(!f.accepts(&entry("x", b'A')));
        assert!(!f.accepts(&entry("x", b'D')));
        assert!(!f.accepts(&entry("x", b'B')));
        assert!(!f.accepts(&entry("x", b'a')));
    }

    #[test]
    fn accepts_text_and_weak() {
        let f = SymbolFilter::new().unwrap();
        assert!(f.accepts(&entry("main", b'T')));
        assert!(f.accepts(&entry("helper", b't')));
        assert!(f.accepts(&entry("weak_sym", b'W')));
    }

    #[test]
    fn rejects_default_deny_pattern() {
        let f = SymbolFilter::new().unwrap();
        assert!(!f.accepts(&entry("__FUNCTION__.123", b'T')));
        assert!(f.accepts(&entry("__FUNCTION__not_a_number", b'T')));
    }

    #[test]
    fn deny_pattern_is_anchored_at_start() {
        let f = SymbolFilter::new().unwrap();
        assert!(f.accepts(&entry("foo__FUNCTION__.5", b'T')));
    }

    #[test]
    fn extra_deny_pattern_applies() {
        let f = SymbolFilter::with_extra_patterns(&["^noise_".to_string()]).unwrap();
        assert!(!f.accepts(&entry("noise_thing", b'T')));
        assert!(f.accepts(&entry("real_thing", b'T')));
    }

    #[test]
    fn invalid_pattern_errors() {
        let err = SymbolFilter::with_extra_patterns(&["(".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidDenyPattern(..)));
    }
}
