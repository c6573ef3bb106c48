//! Console I/O opcodes: `PRS`, `PRN`, `SPC`, `NLINE`, `ADVCRS`,
//! `INNUM`, `INVAR` (spec.md §4.1).

use super::{Branch, Operand, Vm};
use crate::constants::TAB_WIDTH;
use crate::error::{BasicErrorKind, OpResult};
use crate::host::{FileHandle, Host, ReadOutcome};
use crate::number::{self, Number};
use crate::opcode::OpCode;
use crate::value::{Value, VarKind};

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand, host: &mut dyn Host) -> OpResult<Branch> {
    match opcode {
        OpCode::Prs => op_prs(vm, host),
        OpCode::Prn => op_prn(vm, host),
        OpCode::Spc => op_spc(vm, host),
        OpCode::Nline => op_nline(vm, host),
        OpCode::AdvCrs => op_advcrs(vm, host, operand.byte()),
        OpCode::Innum => op_innum(vm, host),
        OpCode::Invar => op_invar(vm, host),
        _ => unreachable!(),
    }
}

fn write(vm: &mut Vm, host: &mut dyn Host, bytes: &[u8]) {
    host.write_bytes(FileHandle::CONSOLE, bytes);
    for &b in bytes {
        if b == b'\n' {
            vm.console_col = 0;
        } else {
            vm.console_col += 1;
        }
    }
}

/// Prints an inline quoted string straight out of the BASIC line, up to
/// the closing quote, without touching the expression stack.
fn op_prs(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    if vm.cursor.peek() != Some(b'"') {
        return Err(BasicErrorKind::Syntax.into());
    }
    vm.cursor.advance();
    let start = vm.cursor.offset as usize;
    let buf = vm.cursor.buffer.clone();
    let mut i = start;
    while i < buf.len() && buf[i] != b'"' && buf[i] != b'\n' {
        i += 1;
    }
    write(vm, host, &buf[start..i]);
    vm.cursor.offset = if buf.get(i) == Some(&b'"') { (i + 1) as u16 } else { i as u16 };
    Ok(Branch::Fallthrough)
}

fn op_prn(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let v = vm.pop_value()?;
    match v {
        Value::Number(n) => write(vm, host, number::format(n).as_bytes()),
        Value::Str(h) => {
            let bytes = vm.strings.bytes(h, &vm.program);
            write(vm, host, &bytes);
            vm.strings.release(h);
        }
        _ => return Err(BasicErrorKind::WrongValueType.into()),
    }
    Ok(Branch::Fallthrough)
}

fn op_spc(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let pad = TAB_WIDTH - (vm.console_col % TAB_WIDTH);
    write(vm, host, &vec![b' '; pad]);
    Ok(Branch::Fallthrough)
}

fn op_nline(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    write(vm, host, b"\r\n");
    Ok(Branch::Fallthrough)
}

/// `literal` selects relative (0) or absolute (1) column motion; the
/// target column comes off the expression stack.
fn op_advcrs(vm: &mut Vm, host: &mut dyn Host, literal: u8) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let n = number::to_i64(n).max(0) as usize;
    let target = if literal == 0 { vm.console_col + n } else { n };
    if target > vm.console_col {
        write(vm, host, &vec![b' '; target - vm.console_col]);
    }
    Ok(Branch::Fallthrough)
}

fn op_innum(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    loop {
        write(vm, host, b"? ");
        match host.read_line(FileHandle::CONSOLE) {
            ReadOutcome::Eof => return Ok(Branch::Halt),
            ReadOutcome::Break => {
                write(vm, host, b"BREAK\r\n");
                return Err(BasicErrorKind::Syntax.into());
            }
            ReadOutcome::Line(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                match number::parse(&text) {
                    Some(n) => {
                        vm.push_value(Value::Number(n))?;
                        return Ok(Branch::Fallthrough);
                    }
                    None => write(vm, host, b"?REDO\r\n"),
                }
            }
        }
    }
}

/// Parses one `INPUT` value per MS-BASIC quoting rules (spec.md §6):
/// leading whitespace stripped, trailing whitespace preserved; a
/// leading quote allows only whitespace after the closing quote.
fn parse_input_value(text: &str, kind: VarKind, vm: &mut Vm) -> OpResult<Value> {
    let trimmed_start = text.trim_start();
    match kind {
        VarKind::Number => {
            let n = number::parse(trimmed_start.trim()).ok_or(BasicErrorKind::Syntax)?;
            Ok(Value::Number(n))
        }
        VarKind::Str => {
            let bytes = if let Some(rest) = trimmed_start.strip_prefix('"') {
                match rest.find('"') {
                    Some(end) => rest[..end].as_bytes().to_vec(),
                    None => rest.as_bytes().to_vec(),
                }
            } else {
                trimmed_start.as_bytes().to_vec()
            };
            let h = vm.strings.alloc_owned(bytes, vm.cursor.line_no);
            Ok(Value::Str(h))
        }
    }
}

fn op_invar(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let r = vm.pop_var_ref()?;
    write(vm, host, b"? ");
    match host.read_line(FileHandle::CONSOLE) {
        ReadOutcome::Eof => Ok(Branch::Halt),
        ReadOutcome::Break => {
            write(vm, host, b"BREAK\r\n");
            Err(BasicErrorKind::Syntax.into())
        }
        ReadOutcome::Line(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let value = parse_input_value(&text, r.kind(), vm)?;
            vm.write_var(r, value)?;
            if let Value::Str(h) = value {
                vm.strings.release(h);
            }
            Ok(Branch::Fallthrough)
        }
    }
}
