mod cli;

use std::fs;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use ksymtbl_core::{blob, compress, filter, parse};

fn main() -> ExitCode {
    env_logger::init();
    let opt = cli::Opt::parse();

    let text = match fs::read_to_string(&opt.input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("symtab-compile: could not open {:?}: {err}", opt.input);
            return ExitCode::from(1);
        }
    };

    let format = parse::InputFormat::from_extension(&opt.input);
    log::info!("parsing {:?} as {format:?}", opt.input);

    let mut entries = match format {
        parse::InputFormat::LinkerMap => match parse::parse_linker_map(&text) {
            Ok(parsed) => {
                log::debug!(
                    "linker map .text section: base={:#x} size={:#x} (diagnostic only, not used as the blob base)",
                    parsed.text_base,
                    parsed.text_size
                );
                parsed.entries
            }
            Err(err) => {
                eprintln!("symtab-compile: {err}");
                return ExitCode::from(2);
            }
        },
        parse::InputFormat::NmTable => match parse::parse(format, &text) {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("symtab-compile: {err}");
                return ExitCode::from(2);
            }
        },
    };
    log::info!("{} symbols parsed before filtering", entries.len());

    let symbol_filter = match filter::SymbolFilter::with_extra_patterns(&opt.deny_patterns) {
        Ok(f) => f,
        Err(err) => {
            eprintln!("symtab-compile: {err}");
            return ExitCode::from(2);
        }
    };
    entries = symbol_filter.retain(entries);
    log::info!("{} symbols retained after filtering", entries.len());

    if opt.compress {
        let report = compress::compress(&mut entries);
        log::info!(
            "compression: {}/{} bytes ({:.1}% of original), {} codes assigned{}",
            report.total_after,
            report.total_before,
            report.ratio() * 100.0,
            report.tokens_assigned,
            if report.exhausted_early { ", dictionary exhausted early" } else { "" }
        );
    }

    let blob = match blob::encode(&entries) {
        Ok(blob) => blob,
        Err(err) => {
            eprintln!("symtab-compile: {err}");
            return ExitCode::from(2);
        }
    };

    let wrapper = blob::render_c_wrapper(&blob);
    if let Err(err) = std::io::stdout().write_all(wrapper.as_bytes()) {
        eprintln!("symtab-compile: failed writing output: {err}");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
