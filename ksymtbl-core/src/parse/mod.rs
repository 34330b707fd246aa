//! Symbol listing parsers.
//!
//! Two textual dialects are supported (linker map and BSD/SysV `nm`
//! tables); both are re-architected here as a tagged [`InputFormat`]
//! that drives a single parse entry point returning a flat
//! `Vec<SymbolEntry>`, rather than the conditional-branch style of the
//! original extraction scripts.

mod map;
mod nm;

use crate::entry::SymbolEntry;
use crate::error::Result;

pub use map::ParsedMap;

/// Which textual dialect a listing is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// GNU ld `-Map` output.
    LinkerMap,
    /// BSD/SysV `nm -P`-style pipe-delimited table.
    NmTable,
}

impl InputFormat {
    /// Guesses the dialect from a file extension, falling back to
    /// `NmTable` for anything unrecognized. The CLI front end is free
    /// to override this; the core only offers a default.
    pub fn from_extension(path: &std::path::Path) -> InputFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some("map") => InputFormat::LinkerMap,
            _ => InputFormat::NmTable,
        }
    }
}

/// Parses `text` per `format`, returning the flat, unfiltered entry
/// sequence. Filtering is a separate, stateless pass over this output.
pub fn parse(format: InputFormat, text: &str) -> Result<Vec<SymbolEntry>> {
    match format {
        InputFormat::LinkerMap => map::parse_map(text).map(|parsed| parsed.entries),
        InputFormat::NmTable => nm::parse_nm(text),
    }
}

/// Parses a linker map and also returns the `.text` section metadata,
/// for callers that want to log it as a diagnostic alongside the
/// entries.
pub fn parse_linker_map(text: &str) -> Result<ParsedMap> {
    map::parse_map(text)
}
