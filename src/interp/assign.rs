//! `STORE` and `DSTORE` (spec.md §4.1 "Assignment").

use super::datamode::{advance_to_data, parse_data_item};
use super::{Branch, Vm};
use crate::error::OpResult;
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(vm: &mut Vm, opcode: OpCode) -> OpResult<Branch> {
    match opcode {
        OpCode::Store => op_store(vm),
        OpCode::DStore => op_dstore(vm),
        _ => unreachable!(),
    }
}

fn op_store(vm: &mut Vm) -> OpResult<Branch> {
    let value = vm.pop_value()?;
    let r = vm.pop_var_ref()?;
    vm.write_var(r, value)?;
    if let Value::Str(h) = value {
        vm.strings.release(h);
    }
    Ok(Branch::Fallthrough)
}

/// The DATA-mode variant of `STORE`: the cursor has been redirected
/// (via `DMODE 1`) to point into a line of comma-separated DATA items.
/// Parses one item, coerces it to the target variable's type, and
/// advances the cursor past the separator.
fn op_dstore(vm: &mut Vm) -> OpResult<Branch> {
    let r = vm.pop_var_ref()?;
    advance_to_data(vm)?;
    let value = parse_data_item(vm, r.kind())?;
    vm.write_var(r, value)?;
    if let Value::Str(h) = value {
        vm.strings.release(h);
    }
    Ok(Branch::Fallthrough)
}
