/// A single symbol retained after filtering.
///
/// `symbol` holds raw bytes rather than `String` because the
/// compressor rewrites them to contain byte codes `0x80..=0xFE` that
/// are not valid UTF-8 on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub symbol: Vec<u8>,
    pub addr: u64,
    pub class_char: u8,
    /// Position within the address-sorted ordering, filled in by the
    /// blob encoder. `None` until then.
    pub oft_idx: Option<u32>,
    /// Position within the name-sorted ordering, filled in by the
    /// blob encoder. `None` until then.
    pub syt_idx: Option<u32>,
}

impl SymbolEntry {
    pub fn new(symbol: Vec<u8>, addr: u64, class_char: u8) -> Self {
        SymbolEntry {
            symbol,
            addr,
            class_char,
            oft_idx: None,
            syt_idx: None,
        }
    }

    pub fn class_upper(&self) -> u8 {
        self.class_char.to_ascii_uppercase()
    }

    pub fn symbol_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.symbol)
    }
}
