mod cli;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use fgraph_core::{merge, reader, ThreadNameMap};

fn main() -> ExitCode {
    env_logger::init();
    let opt = cli::Opt::parse();

    if !opt.logging_dir.is_dir() {
        eprintln!("fgraph-merge: no such directory {:?}", opt.logging_dir);
        return ExitCode::from(1);
    }

    let name_text = match fs::read_to_string(&opt.thread_name_file) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("fgraph-merge: could not open {:?}: {err}", opt.thread_name_file);
            return ExitCode::from(1);
        }
    };
    let names = match ThreadNameMap::parse(&name_text) {
        Ok(names) => names,
        Err(err) => {
            eprintln!("fgraph-merge: {err}");
            return ExitCode::from(2);
        }
    };

    let events = reader::read_all_events(&opt.logging_dir);
    log::info!("{} events collected from {:?}", events.len(), opt.logging_dir);

    let trace = match merge::merge(events, &names) {
        Ok(trace) => trace,
        Err(err) => {
            eprintln!("fgraph-merge: {err}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = fs::write("fgraph.txt", trace) {
        eprintln!("fgraph-merge: failed writing fgraph.txt: {err}");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
