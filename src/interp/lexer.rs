//! Statement lexer/parser opcodes: `XINIT`, `TST`, `SCAN`, `TSTV`,
//! `TSTN`, `TSTS`, `TSTEOL`, `TSTSOL`, `ADVEOL` (spec.md §4.1).

use super::{Branch, Operand, Vm};
use crate::error::{BasicErrorKind, OpResult};
use crate::number::Number;
use crate::opcode::OpCode;
use crate::value::{Value, VarKind, VarRef};

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand) -> OpResult<Branch> {
    match opcode {
        OpCode::Xinit => op_xinit(vm),
        OpCode::Tst => op_tst(vm, operand.label(), operand.string()),
        OpCode::Scan => op_scan(vm, operand.label(), operand.string()),
        OpCode::Tstv => op_tstv(vm, operand.label()),
        OpCode::Tstn => op_tstn(vm, operand.label()),
        OpCode::Tsts => op_tsts(vm, operand.label()),
        OpCode::TstEol => op_tsteol(vm, operand.label()),
        OpCode::TstSol => op_tstsol(vm, operand.label()),
        OpCode::AdvEol => op_adveol(vm),
        _ => unreachable!(),
    }
}

fn op_xinit(vm: &mut Vm) -> OpResult<Branch> {
    if vm.loading_file.is_some() {
        return Err(BasicErrorKind::Syntax.into());
    }
    vm.expr.clear();
    Ok(Branch::Fallthrough)
}

/// Matches `kw` (already upper-case, as `GETLINE` folds source case)
/// case-insensitively at the cursor, skipping leading blanks first.
fn op_tst(vm: &mut Vm, label: u16, kw: &[u8]) -> OpResult<Branch> {
    vm.cursor.skip_blanks();
    let start = vm.cursor.offset as usize;
    let slice = &vm.cursor.buffer[start..];
    if slice.len() >= kw.len() && slice[..kw.len()].eq_ignore_ascii_case(kw) {
        vm.cursor.offset += kw.len() as u16;
        Ok(Branch::Fallthrough)
    } else {
        Ok(Branch::Jump(label))
    }
}

/// Scans forward for `kw` outside double-quoted spans, advancing past
/// it on success; branches to `label` if the line ends first.
fn op_scan(vm: &mut Vm, label: u16, kw: &[u8]) -> OpResult<Branch> {
    let buf = vm.cursor.buffer.clone();
    let mut i = vm.cursor.offset as usize;
    let mut in_quote = false;
    while i < buf.len() && buf[i] != b'\n' {
        if buf[i] == b'"' {
            in_quote = !in_quote;
            i += 1;
            continue;
        }
        if !in_quote && buf[i..].len() >= kw.len() && buf[i..i + kw.len()].eq_ignore_ascii_case(kw) {
            vm.cursor.offset = (i + kw.len()) as u16;
            return Ok(Branch::Fallthrough);
        }
        i += 1;
    }
    Ok(Branch::Jump(label))
}

fn op_tstv(vm: &mut Vm, label: u16) -> OpResult<Branch> {
    vm.cursor.skip_blanks();
    let letter = match vm.cursor.peek() {
        Some(b) if b.is_ascii_uppercase() => b,
        _ => return Ok(Branch::Jump(label)),
    };
    vm.cursor.advance();
    let kind = if vm.cursor.peek() == Some(b'$') {
        vm.cursor.advance();
        VarKind::Str
    } else {
        VarKind::Number
    };
    vm.push_value(Value::VarRef(VarRef::Scalar { letter, kind }))?;
    Ok(Branch::Fallthrough)
}

fn op_tstn(vm: &mut Vm, label: u16) -> OpResult<Branch> {
    vm.cursor.skip_blanks();
    let start = vm.cursor.offset as usize;
    let mut i = start;
    let buf = &vm.cursor.buffer;
    while buf.get(i).map_or(false, |b| b.is_ascii_digit()) {
        i += 1;
    }
    let mut has_frac = false;
    if buf.get(i) == Some(&b'.') {
        has_frac = true;
        i += 1;
        while buf.get(i).map_or(false, |b| b.is_ascii_digit()) {
            i += 1;
        }
    }
    if i == start || (has_frac && i == start + 1) {
        return Ok(Branch::Jump(label));
    }
    let text = std::str::from_utf8(&buf[start..i]).unwrap();
    let value: Number = if crate::number::INTEGER_ONLY {
        match text.parse::<i64>() {
            Ok(v) => crate::number::from_i64(v),
            Err(_) => return Err(BasicErrorKind::NumberOutOfRange.into()),
        }
    } else {
        match text.parse::<f64>() {
            Ok(v) => v as Number,
            Err(_) => return Err(BasicErrorKind::NumberOutOfRange.into()),
        }
    };
    vm.cursor.offset = i as u16;
    vm.push_value(Value::Number(value))?;
    Ok(Branch::Fallthrough)
}

fn op_tsts(vm: &mut Vm, label: u16) -> OpResult<Branch> {
    if vm.cursor.peek() != Some(b'"') {
        return Ok(Branch::Jump(label));
    }
    let open = vm.cursor.offset as usize + 1;
    let buf = vm.cursor.buffer.clone();
    let mut i = open;
    while i < buf.len() && buf[i] != b'"' && buf[i] != b'\n' {
        i += 1;
    }
    if buf.get(i) != Some(&b'"') {
        return Err(BasicErrorKind::Syntax.into());
    }
    let handle = vm.strings.alloc_line_ref(vm.cursor.line_no, open, i - open, vm.cursor.line_no);
    vm.cursor.offset = (i + 1) as u16;
    vm.push_value(Value::Str(handle))?;
    Ok(Branch::Fallthrough)
}

fn op_tsteol(vm: &mut Vm, label: u16) -> OpResult<Branch> {
    if vm.cursor.rest_is_blank() {
        Ok(Branch::Fallthrough)
    } else {
        Ok(Branch::Jump(label))
    }
}

fn op_tstsol(vm: &mut Vm, label: u16) -> OpResult<Branch> {
    if vm.cursor.offset == 0 {
        Ok(Branch::Fallthrough)
    } else {
        Ok(Branch::Jump(label))
    }
}

fn op_adveol(vm: &mut Vm) -> OpResult<Branch> {
    while !vm.cursor.at_eol() {
        vm.cursor.advance();
    }
    Ok(Branch::Fallthrough)
}
