use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "symtab-compile",
    version,
    about = "Compiles a linker symbol listing (map or nm) into a KSYMTBL blob.",
    long_about = r#"
symtab-compile turns a linker-produced symbol listing into the binary
KSYMTBL blob the kernel consults to resolve address <-> symbol lookups,
wrapped in a C source file ready to link into the image.

EXAMPLES:
    # Compile a GNU ld map file, writing the C wrapper to stdout:
    symtab-compile kernel.map > ksymtbl.c

    # Compile an nm -P table with the substring compressor enabled:
    symtab-compile --compress kernel.nm > ksymtbl.c
"#
)]
pub struct Opt {
    /// Path to the symbol listing (`.map` for a linker map, anything
    /// else is treated as an nm -P table).
    pub input: PathBuf,

    /// Run the dictionary-based substring compressor over accepted
    /// symbol names before laying out the blob.
    #[arg(long)]
    pub compress: bool,

    /// Extra deny-list regex for the symbol filter; may be repeated.
    /// The built-in `__FUNCTION__\.\d+` rule always applies.
    #[arg(long = "deny", value_name = "PATTERN")]
    pub deny_patterns: Vec<String>,
}
