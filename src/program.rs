//! The sparse line-number-addressed program store (spec.md §3, §4.3).
//!
//! A `BTreeMap` gets us the sparse array plus the `first_line`/
//! `last_line` bookends spec.md asks for without hand-maintaining a
//! cache: `first_key`/`last_key` are the bookends by construction.

use crate::constants::MAX_LINENO;
use std::collections::BTreeMap;

pub struct ProgramStore {
    lines: BTreeMap<u16, Vec<u8>>,
}

impl ProgramStore {
    pub fn new() -> ProgramStore {
        ProgramStore {
            lines: BTreeMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn first_line(&self) -> u16 {
        self.lines.keys().next().copied().unwrap_or(0)
    }

    pub fn last_line(&self) -> u16 {
        self.lines.keys().next_back().copied().unwrap_or(0)
    }

    pub fn text(&self, line_no: u16) -> Option<&[u8]> {
        self.lines.get(&line_no).map(|v| v.as_slice())
    }

    pub fn contains(&self, line_no: u16) -> bool {
        self.lines.contains_key(&line_no)
    }

    /// The line whose number is >= `line_no`, used to resolve `XFER`/
    /// `NXTLN` targets that land between two defined lines.
    pub fn line_at_or_after(&self, line_no: u16) -> Option<u16> {
        self.lines.range(line_no..).next().map(|(n, _)| *n)
    }

    /// Inserts `text` under `line_no`, ensuring a trailing line feed
    /// (spec.md §3: "holding the raw line text ending in a line-feed").
    /// An empty body deletes the line (spec.md §4.3).
    pub fn insert(&mut self, line_no: u16, text: &[u8]) -> bool {
        if line_no == 0 || line_no > MAX_LINENO {
            return false;
        }
        if text.is_empty() {
            self.delete(line_no);
            return true;
        }
        let mut owned = text.to_vec();
        if owned.last() != Some(&b'\n') {
            owned.push(b'\n');
        }
        self.lines.insert(line_no, owned);
        true
    }

    pub fn delete(&mut self, line_no: u16) {
        self.lines.remove(&line_no);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &[u8])> {
        self.lines.iter().map(|(n, v)| (*n, v.as_slice()))
    }

    pub fn range(&self, start: u16, end: u16) -> impl Iterator<Item = (u16, &[u8])> {
        self.lines.range(start..=end).map(|(n, v)| (*n, v.as_slice()))
    }
}

impl Default for ProgramStore {
    fn default() -> Self {
        ProgramStore::new()
    }
}
