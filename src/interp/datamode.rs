//! `DMODE` and the DATA-item scanning it shares with `DSTORE`
//! (spec.md §4.1 "DATA mode").

use super::{Branch, Vm};
use crate::cursor::SavedPosition;
use crate::error::{BasicErrorKind, Fault, OpResult, VmAbort};
use crate::value::{Value, VarKind};

/// `literal` selects: 1 enter DATA mode, 0 leave normally, 2 leave and
/// raise out-of-data, 3 reset the DATA pointer to the first line.
pub fn dispatch(vm: &mut Vm, literal: u8) -> OpResult<Branch> {
    match literal {
        1 => op_enter(vm),
        0 => {
            op_leave(vm);
            Ok(Branch::Fallthrough)
        }
        2 => {
            op_leave(vm);
            Err(BasicErrorKind::OutOfData.into())
        }
        3 => {
            vm.data_ptr = SavedPosition { line: vm.program.first_line(), offset: 0 };
            Ok(Branch::Fallthrough)
        }
        _ => Err(Fault::Abort(VmAbort {
            message: "bad DMODE literal",
            opc_pc: 0,
            opcode: 0,
        })),
    }
}

fn op_enter(vm: &mut Vm) -> OpResult<Branch> {
    if vm.in_data_mode {
        return Err(Fault::Abort(VmAbort {
            message: "nested DMODE entry",
            opc_pc: 0,
            opcode: 0,
        }));
    }
    vm.cursor.save();
    if vm.data_ptr.line == 0 {
        vm.data_ptr = SavedPosition { line: vm.program.first_line(), offset: 0 };
    }
    let pos = vm.data_ptr;
    vm.load_line(pos.line);
    vm.cursor.offset = pos.offset;
    vm.in_data_mode = true;
    Ok(Branch::Fallthrough)
}

fn op_leave(vm: &mut Vm) {
    vm.data_ptr = SavedPosition { line: vm.cursor.line_no, offset: vm.cursor.offset };
    if let Some(saved) = vm.cursor.saved() {
        vm.load_line(saved.line);
        vm.cursor.offset = saved.offset;
    }
    vm.cursor.clear_saved();
    vm.in_data_mode = false;
}

/// Advances the cursor to the start of the next unread DATA item,
/// crossing into subsequent `DATA` lines as the current one is
/// exhausted. Returns `OUT OF DATA` once the program is exhausted.
pub fn advance_to_data(vm: &mut Vm) -> OpResult<()> {
    loop {
        vm.cursor.skip_blanks();
        match vm.cursor.peek() {
            Some(b',') => {
                vm.cursor.advance();
                vm.cursor.skip_blanks();
                continue;
            }
            Some(b) if b != b'\n' => return Ok(()),
            _ => {}
        }
        // Current line exhausted: hunt for the next line whose text
        // contains a `DATA` statement.
        match next_data_line(vm, vm.cursor.line_no) {
            Some((line_no, offset)) => {
                vm.load_line(line_no);
                vm.cursor.offset = offset;
            }
            None => return Err(BasicErrorKind::OutOfData.into()),
        }
    }
}

fn next_data_line(vm: &Vm, after: u16) -> Option<(u16, u16)> {
    let mut candidate = after + 1;
    while let Some(line_no) = vm.program.line_at_or_after(candidate) {
        if let Some(text) = vm.program.text(line_no) {
            if let Some(pos) = find_keyword(text, b"DATA") {
                return Some((line_no, (pos + 4) as u16));
            }
        }
        candidate = line_no + 1;
    }
    None
}

fn find_keyword(text: &[u8], kw: &[u8]) -> Option<usize> {
    if text.len() < kw.len() {
        return None;
    }
    (0..=text.len() - kw.len()).find(|&i| text[i..i + kw.len()].eq_ignore_ascii_case(kw))
}

/// Parses one comma-separated DATA item at the cursor, coerced to
/// `kind`, and leaves the cursor positioned at the separator (or line
/// end) that follows.
pub fn parse_data_item(vm: &mut Vm, kind: VarKind) -> OpResult<Value> {
    let buf = vm.cursor.buffer.clone();
    let start = vm.cursor.offset as usize;
    if buf.get(start) == Some(&b'"') {
        let mut i = start + 1;
        while i < buf.len() && buf[i] != b'"' && buf[i] != b'\n' {
            i += 1;
        }
        let text = buf[start + 1..i].to_vec();
        vm.cursor.offset = if buf.get(i) == Some(&b'"') { (i + 1) as u16 } else { i as u16 };
        return coerce(vm, kind, text);
    }
    let mut i = start;
    while i < buf.len() && buf[i] != b',' && buf[i] != b'\n' {
        i += 1;
    }
    let mut end = i;
    while end > start && (buf[end - 1] == b' ' || buf[end - 1] == b'\t') {
        end -= 1;
    }
    let text = buf[start..end].to_vec();
    vm.cursor.offset = i as u16;
    coerce(vm, kind, text)
}

fn coerce(vm: &mut Vm, kind: VarKind, text: Vec<u8>) -> OpResult<Value> {
    match kind {
        VarKind::Number => {
            let s = String::from_utf8_lossy(&text);
            let n = crate::number::parse(s.trim()).ok_or(BasicErrorKind::Syntax)?;
            Ok(Value::Number(n))
        }
        VarKind::Str => {
            let h = vm.strings.alloc_owned(text, vm.cursor.line_no);
            Ok(Value::Str(h))
        }
    }
}
