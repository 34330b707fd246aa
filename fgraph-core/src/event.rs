use byteorder::{ByteOrder, LittleEndian};

/// A single call-graph record: one function's observed lifetime on one
/// CPU, for one thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub entry_address: u64,
    pub entry_time: u64,
    pub exit_time: u64,
    pub tid: u64,
    pub cpuid: u32,
}

/// Width of one on-disk event record: four little-endian `u64` fields.
pub const RECORD_SIZE: usize = 32;

impl Event {
    /// Decodes one fixed-width record. The caller is responsible for
    /// having read exactly [`RECORD_SIZE`] bytes; a short final read
    /// is the reader's EOF signal, not this function's concern.
    pub fn decode(record: &[u8; RECORD_SIZE], cpuid: u32) -> Event {
        Event {
            entry_address: LittleEndian::read_u64(&record[0..8]),
            entry_time: LittleEndian::read_u64(&record[8..16]),
            exit_time: LittleEndian::read_u64(&record[16..24]),
            tid: LittleEndian::read_u64(&record[24..32]),
            cpuid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fields_in_order() {
        let mut buf = [0u8; RECORD_SIZE];
        LittleEndian::write_u64(&mut buf[0..8], 0xdead_beef);
        LittleEndian::write_u64(&mut buf[8..16], 100);
        LittleEndian::write_u64(&mut buf[16..24], 200);
        LittleEndian::write_u64(&mut buf[24..32], 7);

        let event = Event::decode(&buf, 3);
        assert_eq!(event.entry_address, 0xdead_beef);
        assert_eq!(event.entry_time, 100);
        assert_eq!(event.exit_time, 200);
        assert_eq!(event.tid, 7);
        assert_eq!(event.cpuid, 3);
    }
}
