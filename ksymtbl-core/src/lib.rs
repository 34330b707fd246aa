//! Core logic for the kernel symbol table (KSYMTBL) build step.
//!
//! This crate has no knowledge of argument parsing, file discovery, or
//! how diagnostics get to the user's terminal — those are the `symtab-compile`
//! binary's job. It exposes a pipeline of pure functions: parse, filter,
//! optionally compress, then lay out a blob.

pub mod blob;
pub mod compress;
pub mod entry;
pub mod error;
pub mod filter;
pub mod parse;

pub use entry::SymbolEntry;
pub use error::{Error, Result};
