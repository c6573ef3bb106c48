//! `DIM` and `ARRY` (spec.md §4.1 "Arrays").
//!
//! Neither opcode carries an operand naming its rank, so the number of
//! dimensions is read back from however many numbers the compiled
//! expression pushed ahead of the trailing `VarRef` — by construction
//! the expression stack holds nothing else at this point (`XINIT` just
//! reset it for the statement in progress).

use super::{Branch, Vm};
use crate::error::OpResult;
use crate::number;
use crate::opcode::OpCode;
use crate::value::{Value, VarKind, VarRef};

pub fn dispatch(vm: &mut Vm, opcode: OpCode) -> OpResult<Branch> {
    match opcode {
        OpCode::Dim => op_dim(vm),
        OpCode::Arry => op_arry(vm),
        _ => unreachable!(),
    }
}

fn drain_dims(vm: &mut Vm) -> OpResult<Vec<u32>> {
    let mut dims = Vec::new();
    while !vm.expr.is_empty() {
        let n = vm.pop_number()?;
        dims.push(number::to_i64(n) as u32);
    }
    dims.reverse();
    Ok(dims)
}

fn op_dim(vm: &mut Vm) -> OpResult<Branch> {
    let r = vm.pop_var_ref()?;
    let dims = drain_dims(vm)?;
    match r.kind() {
        VarKind::Number => vm.vars.dim_number(r.letter(), dims)?,
        VarKind::Str => vm.vars.dim_string(r.letter(), dims)?,
    }
    Ok(Branch::Fallthrough)
}

fn op_arry(vm: &mut Vm) -> OpResult<Branch> {
    let r = vm.pop_var_ref()?;
    let indices = drain_dims(vm)?;
    let letter = r.letter();
    let kind = r.kind();
    vm.vars.ensure_dimensioned(letter, kind, indices.len())?;
    let flat_index = vm.vars.array_flat_index(letter, &indices)?;
    vm.push_value(Value::VarRef(VarRef::Element { letter, kind, flat_index }))?;
    Ok(Branch::Fallthrough)
}
