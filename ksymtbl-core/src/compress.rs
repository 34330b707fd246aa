//! Dictionary-based substring compressor.
//!
//! Re-architected as an arena of [`ViewSlot`]s rather than the
//! parent-linked-back-reference graph of the original extraction
//! script: each symbol owns a [`Node`] buffer, and every candidate
//! substring is a `(node, start, len)` triple addressed by a stable
//! [`ViewId`] so that shifting a surviving view's position (after a
//! splice shrinks an *earlier* part of the same buffer) never requires
//! touching the token dictionary that references it.

use indexmap::IndexMap;

use crate::entry::SymbolEntry;

/// Initial substring window: only substrings of length `2..=WINDOW_L`
/// are registered during setup, bounding the enumeration cost.
const WINDOW_L: usize = 5;
/// Re-split window radii: new substrings must begin within
/// `BEGIN_RADIUS` bytes before the splice point, or end within
/// `END_RADIUS` bytes after it.
const BEGIN_RADIUS: usize = 2;
const END_RADIUS: usize = 3;
const FIRST_CODE: u16 = 0x80;
const LAST_CODE: u16 = 0xFE;

type ViewId = usize;

struct ViewSlot {
    node_idx: usize,
    start: usize,
    len: usize,
    alive: bool,
}

struct Node {
    buffer: Vec<u8>,
    view_ids: Vec<ViewId>,
}

struct Token {
    occurrences: Vec<ViewId>,
}

/// Outcome of a compression pass, fit for a diagnostic log line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionReport {
    pub total_before: usize,
    pub total_after: usize,
    pub tokens_assigned: u32,
    pub exhausted_early: bool,
}

impl CompressionReport {
    pub fn ratio(&self) -> f64 {
        if self.total_before == 0 {
            1.0
        } else {
            self.total_after as f64 / self.total_before as f64
        }
    }
}

struct Arena {
    slots: Vec<ViewSlot>,
    nodes: Vec<Node>,
    dict: IndexMap<Vec<u8>, Token>,
}

impl Arena {
    fn view_bytes(&self, id: ViewId) -> Vec<u8> {
        let slot = &self.slots[id];
        self.nodes[slot.node_idx].buffer[slot.start..slot.start + slot.len].to_vec()
    }

    fn register_view(&mut self, node_idx: usize, start: usize, len: usize) {
        let id = self.slots.len();
        self.slots.push(ViewSlot {
            node_idx,
            start,
            len,
            alive: true,
        });
        self.nodes[node_idx].view_ids.push(id);
        let bytes = self.view_bytes(id);
        self.dict
            .entry(bytes)
            .or_insert_with(|| Token {
                occurrences: Vec::new(),
            })
            .occurrences
            .push(id);
    }

    fn unregister_view(&mut self, id: ViewId) {
        let bytes = self.view_bytes(id);
        self.slots[id].alive = false;
        if let Some(token) = self.dict.get_mut(&bytes) {
            token.occurrences.retain(|&v| v != id);
            if token.occurrences.is_empty() {
                self.dict.shift_remove(&bytes);
            }
        }
    }

    /// Generates every length->=2 substring of `buf` starting at
    /// offsets `0..len(buf)` with length up to `WINDOW_L`.
    fn seed_node(&mut self, node_idx: usize) {
        let len = self.nodes[node_idx].buffer.len();
        let mut spans = Vec::new();
        for start in 0..len {
            let max_len = WINDOW_L.min(len - start);
            for l in 2..=max_len.max(1) {
                if l < 2 {
                    continue;
                }
                spans.push((start, l));
            }
        }
        for (start, l) in spans {
            self.register_view(node_idx, start, l);
        }
    }

    /// Removes every view on `node_idx` intersecting
    /// `[start_idx, end_idx)`, and shifts the start of every surviving
    /// view located entirely at or after `end_idx` by `shift` (always
    /// `1 - match_len`, i.e. negative, since the match shrinks to one
    /// byte). Views entirely before `start_idx` are untouched.
    fn invalidate_and_shift(&mut self, node_idx: usize, start_idx: usize, end_idx: usize, shift: isize) {
        let view_ids: Vec<ViewId> = self.nodes[node_idx].view_ids.clone();
        let mut survivors = Vec::with_capacity(view_ids.len());
        for id in view_ids {
            if !self.slots[id].alive {
                continue;
            }
            let (s, l) = (self.slots[id].start, self.slots[id].len);
            let overlaps = !(s >= end_idx || start_idx >= s + l);
            if overlaps {
                self.unregister_view(id);
                continue;
            }
            if s >= end_idx {
                let new_start = (s as isize + shift) as usize;
                self.slots[id].start = new_start;
            }
            survivors.push(id);
        }
        self.nodes[node_idx].view_ids = survivors;
    }

    /// Re-splits `node_idx` around `start_idx` (the position of the
    /// just-inserted code byte). Four spans are registered, each
    /// pinning one boundary at `start_idx` and varying the other: two
    /// ending at `start_idx + 1` with their start walked back through
    /// `BEGIN_RADIUS`, and two starting at `start_idx` with their end
    /// walked forward through `END_RADIUS`. This is not the cross
    /// product of begin and end offsets — only these four spans are
    /// ever useful, since anything else duplicates a substring the
    /// original window already covered.
    fn resplit(&mut self, node_idx: usize, start_idx: usize) {
        let buf_len = self.nodes[node_idx].buffer.len();
        let lo = start_idx.saturating_sub(BEGIN_RADIUS);
        let hi = (start_idx + END_RADIUS).min(buf_len);

        let mut spans = Vec::new();
        for idx in lo..=hi {
            if idx < start_idx {
                spans.push((idx, start_idx + 1 - idx));
            } else if idx > start_idx + 1 {
                spans.push((start_idx, idx - start_idx));
            }
        }
        for (start, len) in spans {
            self.register_view(node_idx, start, len);
        }
    }

    fn best_token(&self) -> Option<(Vec<u8>, usize)> {
        let mut best: Option<(&Vec<u8>, usize)> = None;
        for (bytes, token) in self.dict.iter() {
            let value = token.occurrences.len() * bytes.len();
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((bytes, value)),
            }
        }
        best.map(|(bytes, _)| {
            let occ = self.dict[bytes].occurrences.len();
            (bytes.clone(), occ)
        })
    }
}

/// Runs the greedy substring compressor over `entries`, rewriting each
/// entry's `symbol` bytes in place. Opt-in: callers decide whether to
/// invoke this at all.
pub fn compress(entries: &mut [SymbolEntry]) -> CompressionReport {
    let total_before: usize = entries.iter().map(|e| e.symbol.len()).sum();

    let mut arena = Arena {
        slots: Vec::new(),
        nodes: entries
            .iter()
            .map(|e| Node {
                buffer: e.symbol.clone(),
                view_ids: Vec::new(),
            })
            .collect(),
        dict: IndexMap::new(),
    };
    let total_nodes = arena.nodes.len();
    let mut last_decile = 0u32;
    for idx in 0..total_nodes {
        arena.seed_node(idx);
        if total_nodes > 0 {
            let decile = ((idx + 1) as u64 * 10 / total_nodes as u64) as u32;
            if decile > last_decile {
                last_decile = decile;
                log::debug!("compressor: enumerated substrings for {}% of entries", decile * 10);
            }
        }
    }

    let mut tokens_assigned = 0u32;
    let mut exhausted_early = false;

    for code in FIRST_CODE..=LAST_CODE {
        let Some((bytes, occ_count)) = arena.best_token() else {
            exhausted_early = true;
            break;
        };
        if occ_count < 2 {
            exhausted_early = true;
            break;
        }
        let match_len = bytes.len();
        let code_byte = code as u8;

        let occurrences = arena.dict.shift_remove(&bytes).unwrap().occurrences;
        for view_id in occurrences {
            if !arena.slots[view_id].alive {
                continue;
            }
            let node_idx = arena.slots[view_id].node_idx;
            let start_idx = arena.slots[view_id].start;
            let end_idx = start_idx + match_len;
            arena.slots[view_id].alive = false;
            arena.nodes[node_idx].view_ids.retain(|&v| v != view_id);

            let shift = 1isize - match_len as isize;
            arena.invalidate_and_shift(node_idx, start_idx, end_idx, shift);

            let buf = &mut arena.nodes[node_idx].buffer;
            let mut spliced = Vec::with_capacity(buf.len() - match_len + 1);
            spliced.extend_from_slice(&buf[..start_idx]);
            spliced.push(code_byte);
            spliced.extend_from_slice(&buf[end_idx..]);
            *buf = spliced;

            arena.resplit(node_idx, start_idx);
        }
        tokens_assigned += 1;
        if code % 16 == 0 {
            log::debug!(
                "compressor: assigned {tokens_assigned} codes, {} dictionary entries remain",
                arena.dict.len()
            );
        }
    }

    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.symbol = std::mem::take(&mut arena.nodes[idx].buffer);
    }

    let total_after: usize = entries.iter().map(|e| e.symbol.len()).sum();
    let report = CompressionReport {
        total_before,
        total_after,
        tokens_assigned,
        exhausted_early,
    };
    if exhausted_early {
        log::warn!(
            "compressor dictionary exhausted after {tokens_assigned} codes (fewer than 127 useful tokens)"
        );
    }
    log::info!(
        "compression ratio: {}/{} = {:.4}",
        report.total_after,
        report.total_before,
        report.ratio()
    );
    report
}
