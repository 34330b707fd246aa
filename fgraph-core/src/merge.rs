//! Merges per-CPU event streams into one globally ordered, textual
//! function-graph trace.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::event::Event;
use crate::threadmap::ThreadNameMap;

#[derive(Debug, Clone)]
struct Record {
    timestamp: u64,
    line: String,
}

fn split_seconds(ts: u64) -> (u64, u64) {
    (ts / 1_000_000_000, ts % 1_000_000_000)
}

fn render_entry(tname: &str, tid_display: u32, cpuid: u32, entry_time: u64, func: u64, depth: usize) -> String {
    let (sec, nsec) = split_seconds(entry_time);
    format!(
        "{tname}-{tid_display} [{cpuid:03}] {sec:3}.{nsec:09}: funcgraph_entry:       func:0x{func:x} depth:{depth}"
    )
}

fn render_exit(
    tname: &str,
    tid_display: u32,
    cpuid: u32,
    exit_time: u64,
    func: u64,
    depth: usize,
    entry_time: u64,
) -> String {
    let (sec, nsec) = split_seconds(exit_time);
    format!(
        "{tname}-{tid_display} [{cpuid:03}] {sec:3}.{nsec:09}: funcgraph_exit:        func:0x{func:x} depth:{depth} overrun:0 calltime:0x{entry_time:x} rettime=0x{exit_time:x}"
    )
}

/// Per-tid call-depth stack, plus bookkeeping for the out-of-order
/// diagnostic (logged, non-fatal).
struct ThreadState {
    stack: Vec<Event>,
    last_emitted_ts: u64,
}

/// Merges `events` (already gathered from every CPU) against `names`
/// into the newline-terminated trace text. Returns [`Error::UnknownTid`]
/// if an event's tid has no entry in `names`: the name map must cover
/// every observed tid.
pub fn merge(mut events: Vec<Event>, names: &ThreadNameMap) -> Result<String> {
    events.sort_by_key(|e| e.entry_time);

    let mut threads: HashMap<u64, ThreadState> = HashMap::new();
    let mut records: Vec<Record> = Vec::with_capacity(events.len() * 2);

    for event in &events {
        let (tname, tid_display) = names
            .lookup(event.tid)
            .ok_or(Error::UnknownTid(event.tid))?
            .clone();
        let state = threads.entry(event.tid).or_insert_with(|| ThreadState {
            stack: Vec::new(),
            last_emitted_ts: 0,
        });

        while let Some(top) = state.stack.last() {
            if top.exit_time >= event.entry_time {
                break;
            }
            let top = state.stack.pop().unwrap();
            emit_exit(&tname, tid_display, &top, state.stack.len(), state, &mut records);
        }

        let depth = state.stack.len();
        records.push(Record {
            timestamp: event.entry_time,
            line: render_entry(&tname, tid_display, event.cpuid, event.entry_time, event.entry_address, depth),
        });
        state.last_emitted_ts = event.entry_time;
        state.stack.push(*event);
    }

    // Drain whatever remains on every tid's stack, inner-to-outer.
    for (tid, mut state) in threads {
        let (tname, tid_display) = names.lookup(tid).ok_or(Error::UnknownTid(tid))?.clone();
        while let Some(top) = state.stack.pop() {
            let depth = state.stack.len();
            emit_exit(&tname, tid_display, &top, depth, &mut state, &mut records);
        }
    }

    records.sort_by_key(|r| r.timestamp);

    let mut out = String::with_capacity(records.len() * 96);
    for record in &records {
        out.push_str(&record.line);
        out.push('\n');
    }
    Ok(out)
}

fn emit_exit(
    tname: &str,
    tid_display: u32,
    event: &Event,
    depth: usize,
    state: &mut ThreadState,
    records: &mut Vec<Record>,
) {
    if event.exit_time < state.last_emitted_ts {
        log::warn!(
            "tid {tid_display} ({tname}): exit_time {:#x} moved backward relative to last emitted timestamp {:#x}",
            event.exit_time,
            state.last_emitted_ts
        );
    }
    records.push(Record {
        timestamp: event.exit_time,
        line: render_exit(tname, tid_display, event.cpuid, event.exit_time, event.entry_address, depth, event.entry_time),
    });
    state.last_emitted_ts = event.exit_time;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: &[(u64, &str)]) -> ThreadNameMap {
        let text: String = pairs.iter().map(|(tid, name)| format!("{tid:x} {name}\n")).collect();
        ThreadNameMap::parse(&text).unwrap()
    }

    fn ev(addr: u64, entry: u64, exit: u64, tid: u64, cpu: u32) -> Event {
        Event {
            entry_address: addr,
            entry_time: entry,
            exit_time: exit,
            tid,
            cpuid: cpu,
        }
    }

    #[test]
    fn s3_single_cpu_nesting() {
        let names = names(&[(7, "task")]);
        let events = vec![
            ev(0xA, 100, 200, 7, 0),
            ev(0xB, 120, 180, 7, 0),
            ev(0xC, 210, 300, 7, 0),
        ];
        let text = merge(events, &names).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("funcgraph_entry") && lines[0].contains("func:0xa") && lines[0].contains("depth:0"));
        assert!(lines[1].contains("func:0xb") && lines[1].contains("depth:1") && lines[1].contains("entry"));
        assert!(lines[2].contains("func:0xb") && lines[2].contains("depth:1") && lines[2].contains("exit"));
        assert!(lines[3].contains("func:0xa") && lines[3].contains("depth:0") && lines[3].contains("exit"));
        assert!(lines[4].contains("func:0xc") && lines[4].contains("depth:0") && lines[4].contains("entry"));
        assert!(lines[5].contains("func:0xc") && lines[5].contains("depth:0") && lines[5].contains("exit"));
    }

    #[test]
    fn s4_cross_cpu_interleave() {
        let names = names(&[(1, "a"), (2, "b")]);
        let events = vec![ev(0xA, 100, 300, 1, 0), ev(0xB, 150, 250, 2, 1)];
        let text = merge(events, &names).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("func:0xa") && lines[0].contains("[000]") && lines[0].contains("depth:0"));
        assert!(lines[1].contains("func:0xb") && lines[1].contains("[001]") && lines[1].contains("depth:0"));
        assert!(lines[2].contains("func:0xb") && lines[2].contains("exit") && lines[2].contains("depth:0"));
        assert!(lines[3].contains("func:0xa") && lines[3].contains("exit") && lines[3].contains("depth:0"));
    }

    #[test]
    fn exactly_one_entry_and_exit_per_event() {
        let names = names(&[(1, "a")]);
        let events = vec![ev(0xA, 0, 10, 1, 0), ev(0xB, 2, 5, 1, 0), ev(0xC, 20, 30, 1, 0)];
        let text = merge(events.clone(), &names).unwrap();
        assert_eq!(text.lines().count(), events.len() * 2);
        for event in &events {
            let needle = format!("func:0x{:x}", event.entry_address);
            assert_eq!(text.matches(&needle).count(), 2);
        }
    }

    #[test]
    fn unknown_tid_is_an_error() {
        let names = names(&[]);
        let events = vec![ev(0xA, 0, 10, 42, 0)];
        assert!(matches!(merge(events, &names), Err(Error::UnknownTid(42))));
    }

    #[test]
    fn exit_line_calltime_and_rettime_match_input() {
        let names = names(&[(1, "a")]);
        let events = vec![ev(0xA, 100, 200, 1, 0)];
        let text = merge(events, &names).unwrap();
        let exit_line = text.lines().find(|l| l.contains("funcgraph_exit")).unwrap();
        assert!(exit_line.contains("calltime:0x64"));
        assert!(exit_line.contains("rettime=0xc8"));
    }
}
