use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "fgraph-merge",
    version,
    about = "Merges per-CPU logging-<N>.bin call-graph dumps into fgraph.txt.",
    long_about = r#"
fgraph-merge reads every logging-<N>.bin file in a directory, resolves
thread ids against a thread name map, and reconstructs a single
globally timestamp-ordered function-graph trace, written to
fgraph.txt in the current directory.

EXAMPLE:
    fgraph-merge ./trace-dump ./func-name-0.txt
"#
)]
pub struct Opt {
    /// Directory containing the `logging-<N>.bin` dumps.
    pub logging_dir: PathBuf,

    /// Whitespace-separated `<hex_tid> <name>` thread name map.
    pub thread_name_file: PathBuf,
}
