//! Line collector interface: `INIT`, `GETLINE`, `TSTL`, `INSRT`
//! (spec.md §4.1).

use super::{Branch, Mode, Operand, Vm};
use crate::constants::LINE_BUFFER_SIZE;
use crate::error::OpResult;
use crate::host::{FileHandle, Host, ReadOutcome};
use crate::opcode::OpCode;

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand, host: &mut dyn Host) -> OpResult<Branch> {
    match opcode {
        OpCode::Init => op_init(vm),
        OpCode::GetLine => op_getline(vm, host),
        OpCode::Tstl => op_tstl(vm, operand.label()),
        OpCode::Insrt => op_insrt(vm),
        _ => unreachable!(),
    }
}

fn op_init(vm: &mut Vm) -> OpResult<Branch> {
    vm.full_reset();
    Ok(Branch::Fallthrough)
}

/// Up-cases letters outside double-quoted spans, matching classical
/// Tiny BASIC's case folding of unquoted source.
fn fold_case(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut in_quote = false;
    for &b in bytes {
        if b == b'"' {
            in_quote = !in_quote;
            out.push(b);
        } else if in_quote {
            out.push(b);
        } else {
            out.push(b.to_ascii_uppercase());
        }
    }
    out
}

fn op_getline(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let source = vm.loading_file.unwrap_or(FileHandle::CONSOLE);
    match host.read_line(source) {
        ReadOutcome::Eof => {
            if vm.loading_file.take().is_some() {
                // End of the file being LOADed: fall back to the console
                // and resume direct mode (spec.md §4.1 state machine).
                vm.mode = Mode::Direct;
                vm.cursor.reset();
                Ok(Branch::Fallthrough)
            } else {
                Ok(Branch::Halt)
            }
        }
        ReadOutcome::Break => {
            host.write_bytes(FileHandle::CONSOLE, b"BREAK\r\n");
            vm.mode = Mode::Direct;
            vm.loading_file = None;
            vm.cursor.reset();
            Ok(Branch::Fallthrough)
        }
        ReadOutcome::Line(mut bytes) => {
            if bytes.len() > LINE_BUFFER_SIZE {
                host.write_bytes(FileHandle::CONSOLE, b"?LINE TOO LONG\r\n");
                bytes.clear();
            }
            let folded = fold_case(&bytes);
            vm.cursor.load(0, &folded);
            Ok(Branch::Fallthrough)
        }
    }
}

/// Parses a leading unsigned decimal line number from the cursor
/// buffer. Returns the value and how many bytes it occupied.
fn parse_leading_number(buf: &[u8]) -> Option<(u32, usize)> {
    let mut i = 0;
    while buf.get(i) == Some(&b' ') || buf.get(i) == Some(&b'\t') {
        i += 1;
    }
    let start = i;
    while buf.get(i).map_or(false, |b| b.is_ascii_digit()) {
        i += 1;
    }
    if i == start {
        return None;
    }
    let text = std::str::from_utf8(&buf[start..i]).ok()?;
    let value: u32 = text.parse().ok()?;
    Some((value, i))
}

fn op_tstl(vm: &mut Vm, label: u16) -> OpResult<Branch> {
    match parse_leading_number(&vm.cursor.buffer) {
        Some((value, _)) if value >= 1 && value <= u16::MAX as u32 => Ok(Branch::Fallthrough),
        _ => Ok(Branch::Jump(label)),
    }
}

fn op_insrt(vm: &mut Vm) -> OpResult<Branch> {
    let (line_no, consumed) = parse_leading_number(&vm.cursor.buffer)
        .map(|(v, c)| (v as u16, c))
        .unwrap_or((0, 0));
    let mut rest = &vm.cursor.buffer[consumed..];
    while rest.first() == Some(&b' ') || rest.first() == Some(&b'\t') {
        rest = &rest[1..];
    }
    let trimmed: &[u8] = {
        let mut end = rest.len();
        while end > 0 && (rest[end - 1] == b'\n' || rest[end - 1] == b' ' || rest[end - 1] == b'\t') {
            end -= 1;
        }
        &rest[..end]
    };
    vm.strings.invalidate_line(line_no);
    vm.program.insert(line_no, trimmed);
    vm.suppress_ok = true;
    Ok(Branch::Fallthrough)
}
