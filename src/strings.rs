//! The reference-counted string heap (spec.md §3 "String", §4.2).
//!
//! Modeled as the tagged union spec.md §9 recommends: `Owned(bytes)` for
//! dynamic strings, and `Line(lineno)` for static strings that borrow
//! their bytes from the program store. A slab (`Vec<Option<StringEntry>>`
//! plus a free list) stands in for the reference implementation's
//! singly-linked heap; handles are indices into the slab and remain
//! stable across a sweep, so a `Value::Str` handle held on the
//! expression stack is never invalidated by unrelated allocations.

use crate::program::ProgramStore;

pub type StringHandle = u32;

/// The shared, ref-count-exempt empty string (spec.md §3: "The singleton
/// empty string is shared and exempt from ref-counting").
pub const EMPTY_STRING: StringHandle = 0;

enum StringBuf {
    Owned(Vec<u8>),
    /// Borrows a byte range out of `ProgramStore::text(line)`.
    /// Invalidated to `Owned(vec![])` when that line is edited or
    /// deleted (spec.md §3 invariant on static strings, §9 "Borrowed
    /// (line_no, offset, len)").
    Line { line_no: u16, start: usize, len: usize },
}

struct StringEntry {
    buf: StringBuf,
    refcount: u32,
    /// BASIC line active when this entry was allocated; 0 in direct
    /// mode. Carried for diagnostics only.
    origin_line: u16,
}

pub struct StringHeap {
    entries: Vec<Option<StringEntry>>,
    free: Vec<u32>,
    needs_sweep: bool,
}

impl StringHeap {
    pub fn new() -> StringHeap {
        let empty = StringEntry {
            buf: StringBuf::Owned(Vec::new()),
            refcount: u32::MAX,
            origin_line: 0,
        };
        StringHeap {
            entries: vec![Some(empty)],
            free: Vec::new(),
            needs_sweep: false,
        }
    }

    /// Resets the heap to its just-constructed state (`INIT` opcode).
    pub fn reset(&mut self) {
        *self = StringHeap::new();
    }

    fn alloc(&mut self, buf: StringBuf, origin_line: u16) -> StringHandle {
        let entry = Some(StringEntry {
            buf,
            refcount: 1,
            origin_line,
        });
        if let Some(index) = self.free.pop() {
            self.entries[index as usize] = entry;
            index
        } else {
            self.entries.push(entry);
            (self.entries.len() - 1) as u32
        }
    }

    pub fn alloc_owned(&mut self, bytes: Vec<u8>, origin_line: u16) -> StringHandle {
        if bytes.is_empty() {
            self.retain(EMPTY_STRING);
            return EMPTY_STRING;
        }
        self.alloc(StringBuf::Owned(bytes), origin_line)
    }

    /// Allocates a static string that borrows a byte range of program-
    /// store line text.
    pub fn alloc_line_ref(&mut self, line_no: u16, start: usize, len: usize, origin_line: u16) -> StringHandle {
        self.alloc(StringBuf::Line { line_no, start, len }, origin_line)
    }

    pub fn retain(&mut self, handle: StringHandle) {
        if handle == EMPTY_STRING {
            return;
        }
        if let Some(entry) = self.entries[handle as usize].as_mut() {
            entry.refcount += 1;
        }
    }

    pub fn release(&mut self, handle: StringHandle) {
        if handle == EMPTY_STRING {
            return;
        }
        if let Some(entry) = self.entries[handle as usize].as_mut() {
            debug_assert!(entry.refcount > 0);
            entry.refcount -= 1;
            if entry.refcount == 0 {
                self.needs_sweep = true;
            }
        }
    }

    /// Reads out the bytes of a handle, resolving `Line` entries against
    /// the program store. Returns an owned copy: callers that need to
    /// retain the borrow across a mutation of `program` should copy
    /// first anyway, since line edits invalidate borrows.
    pub fn bytes(&self, handle: StringHandle, program: &ProgramStore) -> Vec<u8> {
        match &self.entries[handle as usize] {
            Some(entry) => match &entry.buf {
                StringBuf::Owned(bytes) => bytes.clone(),
                StringBuf::Line { line_no, start, len } => program
                    .text(*line_no)
                    .and_then(|line| line.get(*start..*start + *len))
                    .map(|s| s.to_vec())
                    .unwrap_or_default(),
            },
            None => Vec::new(),
        }
    }

    pub fn len(&self, handle: StringHandle, program: &ProgramStore) -> usize {
        match &self.entries[handle as usize] {
            Some(entry) => match &entry.buf {
                StringBuf::Owned(bytes) => bytes.len(),
                StringBuf::Line { line_no, start, len } => program
                    .text(*line_no)
                    .filter(|line| line.len() >= *start + *len)
                    .map(|_| *len)
                    .unwrap_or(0),
            },
            None => 0,
        }
    }

    pub fn is_static(&self, handle: StringHandle) -> bool {
        matches!(
            self.entries.get(handle as usize),
            Some(Some(StringEntry { buf: StringBuf::Line { .. }, .. }))
        )
    }

    /// Invalidates every static string referencing `line_no` (spec.md §3
    /// invariant, §4.2). Called before the next statement executes, once
    /// the line has actually changed in the program store.
    pub fn invalidate_line(&mut self, line_no: u16) {
        for slot in self.entries.iter_mut() {
            if let Some(entry) = slot.as_mut() {
                if matches!(entry.buf, StringBuf::Line { line_no: n, .. } if n == line_no) {
                    entry.buf = StringBuf::Owned(Vec::new());
                }
            }
        }
    }

    /// Concatenates two handles into a freshly allocated dynamic string.
    pub fn concat(&mut self, a: StringHandle, b: StringHandle, program: &ProgramStore, origin_line: u16) -> StringHandle {
        let mut bytes = self.bytes(a, program);
        bytes.extend(self.bytes(b, program));
        self.alloc_owned(bytes, origin_line)
    }

    /// Runs the deferred sweep pass if any release dropped a refcount to
    /// zero (spec.md §4.2: "A sweep runs lazily at the top of each
    /// dispatch iteration").
    pub fn sweep(&mut self) {
        if !self.needs_sweep {
            return;
        }
        for i in 1..self.entries.len() {
            let dead = matches!(&self.entries[i], Some(entry) if entry.refcount == 0);
            if dead {
                self.entries[i] = None;
                self.free.push(i as u32);
            }
        }
        self.needs_sweep = false;
    }

    /// `true` when `handle` has at least one outstanding reference
    /// (spec.md §8 invariant 3).
    pub fn is_live(&self, handle: StringHandle) -> bool {
        handle == EMPTY_STRING
            || matches!(self.entries.get(handle as usize), Some(Some(e)) if e.refcount > 0)
    }
}

impl Default for StringHeap {
    fn default() -> Self {
        StringHeap::new()
    }
}
