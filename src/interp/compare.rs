//! `CMPR`/`CMPRX` (spec.md §4.1 "Comparison").

use super::{Branch, Operand, Vm};
use crate::error::{BasicErrorKind, Fault, OpResult, VmAbort};
use crate::number::Number;
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand) -> OpResult<Branch> {
    match opcode {
        OpCode::Cmpr => op_cmpr(vm, None),
        OpCode::CmprX => op_cmpr(vm, Some(operand.label())),
        _ => unreachable!(),
    }
}

fn order(lhs: &Value, rhs: &Value) -> OpResult<std::cmp::Ordering> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            Ok(num_cmp(*a, *b))
        }
        (Value::Str(_), Value::Str(_)) => unreachable!("resolved by caller with heap access"),
        _ => Err(BasicErrorKind::WrongValueType.into()),
    }
}

fn num_cmp(a: Number, b: Number) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

/// `op` is an integer 0..5 denoting `=, <, <=, <>, >, >=` (spec.md
/// §4.1). Pushed in the order `lhs`, `rhs`, `op` by the compiled
/// expression, so `op` sits on top of the stack.
fn op_cmpr(vm: &mut Vm, branch_on_false: Option<u16>) -> OpResult<Branch> {
    let op = vm.pop_number()?;
    let rhs = vm.pop_value()?;
    let lhs = vm.pop_value()?;

    let ordering = match (&lhs, &rhs) {
        (Value::Str(a), Value::Str(b)) => {
            let a_bytes = vm.strings.bytes(*a, &vm.program);
            let b_bytes = vm.strings.bytes(*b, &vm.program);
            let cmp = a_bytes.cmp(&b_bytes);
            vm.strings.release(*a);
            vm.strings.release(*b);
            cmp
        }
        _ => order(&lhs, &rhs)?,
    };

    let op_code = crate::number::to_i64(op);
    let truth = match op_code {
        0 => ordering == std::cmp::Ordering::Equal,
        1 => ordering == std::cmp::Ordering::Less,
        2 => ordering != std::cmp::Ordering::Greater,
        3 => ordering != std::cmp::Ordering::Equal,
        4 => ordering == std::cmp::Ordering::Greater,
        5 => ordering != std::cmp::Ordering::Less,
        _ => {
            return Err(Fault::Abort(VmAbort {
                message: "bad CMPR operator code",
                opc_pc: 0,
                opcode: 0,
            }))
        }
    };

    if truth {
        Ok(Branch::Fallthrough)
    } else {
        match branch_on_false {
            Some(label) => Ok(Branch::Jump(label)),
            None => vm.op_nxt(None),
        }
    }
}
