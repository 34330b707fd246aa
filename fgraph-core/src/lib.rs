//! Per-CPU call-graph event decoding and global trace reconstruction.
//!
//! As with `ksymtbl-core`, this crate owns no file discovery or
//! argument parsing; `fgraph-merge` wires it up to the filesystem.

pub mod error;
pub mod event;
pub mod merge;
pub mod reader;
pub mod threadmap;

pub use error::{Error, Result};
pub use event::Event;
pub use threadmap::ThreadNameMap;
