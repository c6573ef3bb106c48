//! String opcodes: `STR`, `HEX`, `VAL`, `STRLEN`, `ASC`, `CHR`, `CPY`,
//! `POP`, `UPRLWR`, `MKS`, `SBSTR` (spec.md §4.1 "Strings").

use super::{Branch, Operand, Vm};
use crate::error::{BasicErrorKind, OpResult};
use crate::number;
use crate::opcode::OpCode;
use crate::strings::EMPTY_STRING;
use crate::value::Value;

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand) -> OpResult<Branch> {
    match opcode {
        OpCode::Str => op_str(vm),
        OpCode::Hex => op_hex(vm),
        OpCode::Val => op_val(vm),
        OpCode::StrLen => op_strlen(vm),
        OpCode::Asc => op_asc(vm),
        OpCode::Chr => op_chr(vm),
        OpCode::Cpy => op_cpy(vm),
        OpCode::Pop => op_pop(vm),
        OpCode::UprLwr => op_uprlwr(vm, operand.byte()),
        OpCode::Mks => op_mks(vm),
        OpCode::Sbstr => op_sbstr(vm, operand.byte()),
        _ => unreachable!(),
    }
}

fn op_str(vm: &mut Vm) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let h = vm.strings.alloc_owned(number::format(n).into_bytes(), vm.cursor.line_no);
    vm.push_value(Value::Str(h))?;
    Ok(Branch::Fallthrough)
}

fn op_hex(vm: &mut Vm) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let v = number::to_i64(n);
    if v < 0 {
        return Err(BasicErrorKind::IllegalQuantity.into());
    }
    let mut text = format!("{:X}", v);
    if text.len() % 2 != 0 {
        text.insert(0, '0');
    }
    let h = vm.strings.alloc_owned(text.into_bytes(), vm.cursor.line_no);
    vm.push_value(Value::Str(h))?;
    Ok(Branch::Fallthrough)
}

fn op_val(vm: &mut Vm) -> OpResult<Branch> {
    let h = vm.pop_str()?;
    let bytes = vm.strings.bytes(h, &vm.program);
    vm.strings.release(h);
    let text = String::from_utf8_lossy(&bytes);
    let n = number::parse(text.trim()).unwrap_or_else(|| number::from_i64(0));
    vm.push_value(Value::Number(n))?;
    Ok(Branch::Fallthrough)
}

fn op_strlen(vm: &mut Vm) -> OpResult<Branch> {
    let h = vm.pop_str()?;
    let len = vm.strings.len(h, &vm.program);
    vm.strings.release(h);
    vm.push_value(Value::Number(number::from_i64(len as i64)))?;
    Ok(Branch::Fallthrough)
}

fn op_asc(vm: &mut Vm) -> OpResult<Branch> {
    let h = vm.pop_str()?;
    let bytes = vm.strings.bytes(h, &vm.program);
    vm.strings.release(h);
    let code = bytes.first().copied().unwrap_or(0);
    vm.push_value(Value::Number(number::from_i64(code as i64)))?;
    Ok(Branch::Fallthrough)
}

fn op_chr(vm: &mut Vm) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let code = number::to_i64(n);
    if !(0..=255).contains(&code) {
        return Err(BasicErrorKind::IllegalQuantity.into());
    }
    let h = vm.strings.alloc_owned(vec![code as u8], vm.cursor.line_no);
    vm.push_value(Value::Str(h))?;
    Ok(Branch::Fallthrough)
}

fn op_cpy(vm: &mut Vm) -> OpResult<Branch> {
    let top = *vm.expr.peek().ok_or(BasicErrorKind::ExpressionTooComplex)?;
    if let Value::Str(h) = top {
        vm.strings.retain(h);
    }
    vm.push_value(top)?;
    Ok(Branch::Fallthrough)
}

fn op_pop(vm: &mut Vm) -> OpResult<Branch> {
    let v = vm.pop_value()?;
    if let Value::Str(h) = v {
        vm.strings.release(h);
    }
    Ok(Branch::Fallthrough)
}

/// `literal`: 0 lower-case, 1 upper-case.
fn op_uprlwr(vm: &mut Vm, literal: u8) -> OpResult<Branch> {
    let h = vm.pop_str()?;
    let mut bytes = vm.strings.bytes(h, &vm.program);
    vm.strings.release(h);
    if literal == 0 {
        bytes.make_ascii_lowercase();
    } else {
        bytes.make_ascii_uppercase();
    }
    let out = vm.strings.alloc_owned(bytes, vm.cursor.line_no);
    vm.push_value(Value::Str(out))?;
    Ok(Branch::Fallthrough)
}

/// Pops `(source, count)` and builds a `count`-byte string repeating
/// `source`'s code (if numeric) or its first character (if a string).
fn op_mks(vm: &mut Vm) -> OpResult<Branch> {
    let count = vm.pop_number()?;
    let count = number::to_i64(count);
    if count < 0 {
        return Err(BasicErrorKind::IllegalQuantity.into());
    }
    let source = vm.pop_value()?;
    let byte = match source {
        Value::Number(n) => {
            let code = number::to_i64(n);
            if !(0..=255).contains(&code) {
                return Err(BasicErrorKind::IllegalQuantity.into());
            }
            code as u8
        }
        Value::Str(h) => {
            let bytes = vm.strings.bytes(h, &vm.program);
            vm.strings.release(h);
            bytes.first().copied().unwrap_or(b' ')
        }
        _ => return Err(BasicErrorKind::WrongValueType.into()),
    };
    let h = vm.strings.alloc_owned(vec![byte; count as usize], vm.cursor.line_no);
    vm.push_value(Value::Str(h))?;
    Ok(Branch::Fallthrough)
}

/// `mode` 0: `(string, start, length)`; 1: `(string, start)` to end;
/// 2: `(string, length)` taking the last N. Start positions are
/// 1-based.
fn op_sbstr(vm: &mut Vm, mode: u8) -> OpResult<Branch> {
    let (h, start_1based, len): (_, i64, Option<i64>) = match mode {
        0 => {
            let length = number::to_i64(vm.pop_number()?);
            let start = number::to_i64(vm.pop_number()?);
            let h = vm.pop_str()?;
            (h, start, Some(length))
        }
        1 => {
            let start = number::to_i64(vm.pop_number()?);
            let h = vm.pop_str()?;
            (h, start, None)
        }
        2 => {
            let length = number::to_i64(vm.pop_number()?);
            let h = vm.pop_str()?;
            (h, -1, Some(length))
        }
        _ => return Err(BasicErrorKind::Syntax.into()),
    };

    let bytes = vm.strings.bytes(h, &vm.program);
    vm.strings.release(h);
    let total = bytes.len() as i64;

    let (start0, count) = match mode {
        2 => {
            let length = len.unwrap();
            if length < 0 || length > total {
                return Err(BasicErrorKind::IllegalQuantity.into());
            }
            (total - length, length)
        }
        _ => {
            if start_1based < 1 || start_1based > total + 1 {
                return Err(BasicErrorKind::IllegalQuantity.into());
            }
            let start0 = start_1based - 1;
            let available = total - start0;
            let length = match len {
                Some(l) => {
                    if l < 0 || l > available {
                        return Err(BasicErrorKind::IllegalQuantity.into());
                    }
                    l
                }
                None => available,
            };
            (start0, length)
        }
    };

    if count == 0 {
        vm.push_value(Value::Str(EMPTY_STRING))?;
        return Ok(Branch::Fallthrough);
    }
    let slice = bytes[start0 as usize..(start0 + count) as usize].to_vec();
    let out = vm.strings.alloc_owned(slice, vm.cursor.line_no);
    vm.push_value(Value::Str(out))?;
    Ok(Branch::Fallthrough)
}
