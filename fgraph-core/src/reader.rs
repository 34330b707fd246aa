use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::event::{Event, RECORD_SIZE};

/// Reads every `logging-<cpu>.bin` file in `dir`, for `cpu = 0, 1, ...`
/// until opening the next one fails — that failure ends discovery, it
/// is not an error: the set of per-CPU dump files is sparse by nature,
/// not every CPU core necessarily produced one.
pub fn read_all_events(dir: &Path) -> Vec<Event> {
    let mut events = Vec::new();
    let mut cpuid = 0u32;
    loop {
        let path = dir.join(format!("logging-{cpuid}.bin"));
        let Ok(mut file) = File::open(&path) else {
            break;
        };
        let mut buf = Vec::new();
        if file.read_to_end(&mut buf).is_err() {
            break;
        }
        let count = read_events_from_buffer(&buf, cpuid, &mut events);
        log::info!("cpu {cpuid}: {count} events from {path:?}");
        cpuid += 1;
    }
    events
}

/// Decodes fixed-width records out of `buf`, tagging each with
/// `cpuid`, appending to `out`. A short final chunk (< 32 bytes)
/// silently ends the stream — a torn trailing record is what a reader
/// that caught the dump mid-write leaves behind, not a malformed file.
fn read_events_from_buffer(buf: &[u8], cpuid: u32, out: &mut Vec<Event>) -> usize {
    let mut count = 0;
    for chunk in buf.chunks(RECORD_SIZE) {
        if chunk.len() < RECORD_SIZE {
            break;
        }
        let record: [u8; RECORD_SIZE] = chunk.try_into().expect("chunk length checked above");
        out.push(Event::decode(&record, cpuid));
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{ByteOrder, LittleEndian};
    use std::io::Write;

    fn encode_record(entry_addr: u64, entry_time: u64, exit_time: u64, tid: u64) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        LittleEndian::write_u64(&mut buf[0..8], entry_addr);
        LittleEndian::write_u64(&mut buf[8..16], entry_time);
        LittleEndian::write_u64(&mut buf[16..24], exit_time);
        LittleEndian::write_u64(&mut buf[24..32], tid);
        buf
    }

    #[test]
    fn short_trailing_chunk_ends_stream() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&encode_record(1, 10, 20, 99));
        buf.extend_from_slice(&[0u8; 5]); // short trailing garbage
        let mut events = Vec::new();
        let n = read_events_from_buffer(&buf, 0, &mut events);
        assert_eq!(n, 1);
        assert_eq!(events[0].entry_address, 1);
    }

    #[test]
    fn reads_multiple_cpu_files_until_missing() {
        let dir = std::env::temp_dir().join(format!("fgraph-core-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for cpu in 0..2u32 {
            let mut f = File::create(dir.join(format!("logging-{cpu}.bin"))).unwrap();
            f.write_all(&encode_record(0x1000 + cpu as u64, 1, 2, 5)).unwrap();
        }
        let events = read_all_events(&dir);
        assert_eq!(events.len(), 2);
        assert!(events.iter().any(|e| e.cpuid == 0));
        assert!(events.iter().any(|e| e.cpuid == 1));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
