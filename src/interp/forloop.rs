//! `FOR`, `STEP`, `NXTFOR` (spec.md §4.1 "FOR loops").

use super::{Branch, Vm};
use crate::error::{BasicErrorKind, Fault, OpResult};
use crate::number::{self, Number};
use crate::opcode::OpCode;
use crate::stacks::Frame;
use crate::value::Value;

pub fn dispatch(vm: &mut Vm, opcode: OpCode) -> OpResult<Branch> {
    match opcode {
        OpCode::For => op_for(vm),
        OpCode::Step => op_step(vm),
        OpCode::NxtFor => op_nxtfor(vm),
        _ => unreachable!(),
    }
}

/// Pops `(end, start, var)` (pushed in `var, start, end` order),
/// initialises the variable, and pushes a FOR frame bound to the first
/// statement of the loop body — the line right after the `FOR` line —
/// so `NXTFOR` can jump straight back into the body rather than
/// re-running the `FOR` statement itself.
fn op_for(vm: &mut Vm) -> OpResult<Branch> {
    let end = vm.pop_number()?;
    let start = vm.pop_number()?;
    let var = vm.pop_var_ref()?;
    vm.write_var(var, Value::Number(start))?;
    let body_line = vm
        .program
        .line_at_or_after(vm.cursor.line_no + 1)
        .unwrap_or(0);
    vm.frames
        .push_for_frame(Frame::For { var, loop_line: body_line, end, step: number::from_i64(1) })
        .map_err(Fault::from)?;
    Ok(Branch::Fallthrough)
}

fn op_step(vm: &mut Vm) -> OpResult<Branch> {
    let step = vm.pop_number()?;
    if number::is_zero(step) {
        return Err(BasicErrorKind::IllegalQuantity.into());
    }
    let frame = vm.frames.find_for_frame(None)?;
    match frame {
        Frame::For { var, loop_line, end, .. } => {
            vm.frames
                .push_for_frame(Frame::For { var, loop_line, end, step })
                .map_err(Fault::from)?;
        }
        _ => unreachable!(),
    }
    Ok(Branch::Fallthrough)
}

fn carried_past(step: Number, next: Number, end: Number) -> bool {
    if number::to_i64(step) >= 0 {
        next > end
    } else {
        next < end
    }
}

fn op_nxtfor(vm: &mut Vm) -> OpResult<Branch> {
    let var = match vm.pop_value()? {
        Value::VarRef(r) => Some(r),
        Value::Uninit => None,
        _ => return Err(BasicErrorKind::WrongValueType.into()),
    };
    let frame = vm.frames.find_for_frame(var)?;
    match frame {
        Frame::For { var, loop_line, end, step } => {
            let cur = vm
                .read_var(var)?
                .as_number()
                .ok_or(BasicErrorKind::WrongValueType)?;
            let next = cur + step;
            vm.write_var(var, Value::Number(next))?;
            if carried_past(step, next, end) {
                Ok(Branch::Fallthrough)
            } else {
                vm.frames
                    .push_for_frame(Frame::For { var, loop_line, end, step })
                    .map_err(Fault::from)?;
                vm.load_line(loop_line);
                Ok(Branch::Jump(vm.executor_addr))
            }
        }
        _ => unreachable!(),
    }
}
