//! `LDPRG`, `SVPRG`, `LST`, `LSTX` (spec.md §4.1 "Program I/O", §4.3
//! "Listing").

use super::{Branch, Mode, Operand, Vm};
use crate::error::{BasicErrorKind, OpResult};
use crate::host::{FileHandle, Host, OpenMode};
use crate::number;
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand, host: &mut dyn Host) -> OpResult<Branch> {
    match opcode {
        OpCode::LdPrg => op_ldprg(vm, host),
        OpCode::SvPrg => op_svprg(vm, host),
        OpCode::Lst => op_lst(vm, host),
        OpCode::LstX => op_lstx(vm, host),
        _ => {
            let _ = operand;
            unreachable!()
        }
    }
}

/// Resolves the `(string | literal 0 meaning "last file")` filename
/// convention shared by `LDPRG`/`SVPRG`.
fn resolve_filename(vm: &mut Vm) -> OpResult<Vec<u8>> {
    let v = vm.pop_value()?;
    let name = match v {
        Value::Number(n) if number::is_zero(n) => vm
            .last_filename
            .clone()
            .ok_or(BasicErrorKind::FileNotFound)?,
        Value::Str(h) => {
            let bytes = vm.strings.bytes(h, &vm.program);
            vm.strings.release(h);
            bytes
        }
        _ => return Err(BasicErrorKind::WrongValueType.into()),
    };
    vm.last_filename = Some(name.clone());
    Ok(name)
}

fn op_ldprg(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let name = resolve_filename(vm)?;
    let handle = host
        .open(&name, OpenMode::Read)
        .map_err(|_| BasicErrorKind::FileNotFound)?;
    vm.loading_file = Some(handle);
    vm.mode = Mode::Loading;
    Ok(Branch::Fallthrough)
}

/// Formats the program store the way `LST`/`LSTX` print it: lines in
/// number order, right-justified to the widest line number in range
/// (spec.md §4.3).
fn format_listing(vm: &Vm, start: u16, end: u16) -> Vec<u8> {
    let width = end.to_string().len();
    let mut out = Vec::new();
    for (n, text) in vm.program.range(start, end) {
        out.extend(format!("{:>width$} ", n, width = width).into_bytes());
        out.extend_from_slice(text);
    }
    out
}

fn op_svprg(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let name = resolve_filename(vm)?;
    let handle = host
        .open(&name, OpenMode::Write)
        .map_err(|_| BasicErrorKind::FileNotFound)?;
    let (first, last) = (vm.program.first_line(), vm.program.last_line());
    let bytes = format_listing(vm, first, last);
    host.write_bytes(handle, &bytes);
    host.close(handle);
    Ok(Branch::Fallthrough)
}

fn op_lst(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let (first, last) = (vm.program.first_line(), vm.program.last_line());
    let bytes = format_listing(vm, first, last);
    host.write_bytes(FileHandle::CONSOLE, &bytes);
    Ok(Branch::Fallthrough)
}

fn op_lstx(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let end = number::to_i64(vm.pop_number()?);
    let start = number::to_i64(vm.pop_number()?);
    if start < 0 || end < 0 || start > u16::MAX as i64 || end > u16::MAX as i64 {
        return Err(BasicErrorKind::LineNumberOutOfRange.into());
    }
    let bytes = format_listing(vm, start as u16, end as u16);
    host.write_bytes(FileHandle::CONSOLE, &bytes);
    Ok(Branch::Fallthrough)
}
