//! Cursor state: where the statement lexer/parser currently sits within
//! the line buffer, which BASIC line that buffer came from, and the
//! bookmark `DATA` scanning needs to resume from (spec.md §3 "Cursor
//! state").

use crate::constants::LINE_BUFFER_SIZE;

/// A saved `(line, offset)` pair, used by `SAV`/`RSTR` to let `DATA`
/// scanning leave the main cursor untouched while it hunts for the next
/// unread item.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SavedPosition {
    pub line: u16,
    pub offset: u16,
}

pub struct Cursor {
    /// The line currently loaded into `buffer`. 0 means direct mode.
    pub line_no: u16,
    pub buffer: Vec<u8>,
    /// Byte offset of the next unread character in `buffer`.
    pub offset: u16,
    saved: Option<SavedPosition>,
    /// IL address the collector jumps to once the current line is fully
    /// consumed, set by `ONDONE` and consulted by `DONE`/`DONEM`.
    pub on_done: Option<u16>,
}

impl Cursor {
    pub fn new() -> Cursor {
        Cursor {
            line_no: 0,
            buffer: Vec::with_capacity(LINE_BUFFER_SIZE),
            offset: 0,
            saved: None,
            on_done: None,
        }
    }

    pub fn reset(&mut self) {
        self.line_no = 0;
        self.buffer.clear();
        self.offset = 0;
        self.saved = None;
        self.on_done = None;
    }

    /// Loads a fresh line into the buffer and rewinds the cursor to its
    /// start, as `GETLINE`/`INSRT` require.
    pub fn load(&mut self, line_no: u16, text: &[u8]) {
        self.line_no = line_no;
        self.buffer.clear();
        self.buffer.extend_from_slice(text);
        self.offset = 0;
    }

    pub fn peek(&self) -> Option<u8> {
        self.buffer.get(self.offset as usize).copied()
    }

    pub fn peek_at(&self, delta: usize) -> Option<u8> {
        self.buffer.get(self.offset as usize + delta).copied()
    }

    pub fn advance(&mut self) {
        if (self.offset as usize) < self.buffer.len() {
            self.offset += 1;
        }
    }

    pub fn at_eol(&self) -> bool {
        match self.peek() {
            None => true,
            Some(b'\n') => true,
            _ => false,
        }
    }

    /// `true` when nothing but whitespace remains before the end of line
    /// (`TSTEOL`/`ADVEOL`).
    pub fn rest_is_blank(&self) -> bool {
        self.buffer[self.offset as usize..]
            .iter()
            .take_while(|&&b| b != b'\n')
            .all(|&b| b == b' ' || b == b'\t')
    }

    pub fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.advance();
        }
    }

    pub fn save(&mut self) {
        self.saved = Some(SavedPosition {
            line: self.line_no,
            offset: self.offset,
        });
    }

    /// Returns the bookmark without consuming it, so `RSTR` can report a
    /// VM abort if called with nothing saved.
    pub fn saved(&self) -> Option<SavedPosition> {
        self.saved
    }

    pub fn clear_saved(&mut self) {
        self.saved = None;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::new()
    }
}
