//! Expression arithmetic: `LIT`, `IND`, the binary/unary numeric
//! opcodes, the transcendental functions, and `RND`/`SRND`
//! (spec.md §4.1).

use super::{Branch, Operand, Vm};
use crate::error::{BasicErrorKind, OpResult};
use crate::host::Host;
use crate::number::{self, Number};
use crate::opcode::OpCode;
use crate::value::Value;

pub fn dispatch(vm: &mut Vm, opcode: OpCode, operand: &Operand, host: &mut dyn Host) -> OpResult<Branch> {
    use OpCode::*;
    match opcode {
        Lit => {
            vm.push_value(Value::Number(number::from_i64(operand.byte() as i64)))?;
            Ok(Branch::Fallthrough)
        }
        Ind => {
            let r = vm.pop_var_ref()?;
            let v = vm.read_var(r)?;
            vm.push_value(v)?;
            Ok(Branch::Fallthrough)
        }
        Add => op_add(vm, host),
        Sub => op_binary(vm, host, |a, b| a - b),
        Mul => op_binary(vm, host, |a, b| a * b),
        Div => op_div(vm, host),
        Mod => op_mod(vm, host),
        Pow => op_binary(vm, host, number::pow),
        Neg => op_unary(vm, host, |a| -a),
        Fix => op_unary(vm, host, number::fix),
        Flr => op_unary(vm, host, number::floor),
        Ceil => op_unary(vm, host, number::ceil),
        Sgn => op_unary(vm, host, number::sgn),
        Abs => op_unary(vm, host, number::abs),
        Atn => op_transcendental(vm, host, f64::atan),
        Cos => op_transcendental(vm, host, f64::cos),
        Sin => op_transcendental(vm, host, f64::sin),
        Tan => op_transcendental(vm, host, f64::tan),
        Exp => op_transcendental(vm, host, f64::exp),
        Log => op_transcendental(vm, host, f64::ln),
        Sqr => op_transcendental(vm, host, f64::sqrt),
        DegRad => op_degrad(vm, operand.byte()),
        Rnd => op_rnd(vm),
        Srnd => op_srnd(vm, host),
        _ => unreachable!(),
    }
}

fn check_exceptions(vm: &mut Vm, host: &mut dyn Host) -> OpResult {
    let ex = host.pull_and_clear();
    if ex.divide_by_zero {
        return Err(BasicErrorKind::DivisionByZero.into());
    }
    if ex.arithmetic {
        return Err(BasicErrorKind::ArithmeticException.into());
    }
    Ok(())
}

fn op_binary(vm: &mut Vm, host: &mut dyn Host, f: impl Fn(Number, Number) -> Number) -> OpResult<Branch> {
    let rhs = vm.pop_number()?;
    let lhs = vm.pop_number()?;
    let result = f(lhs, rhs);
    check_exceptions(vm, host)?;
    vm.push_value(Value::Number(result))?;
    Ok(Branch::Fallthrough)
}

fn op_unary(vm: &mut Vm, host: &mut dyn Host, f: impl Fn(Number) -> Number) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let result = f(n);
    check_exceptions(vm, host)?;
    vm.push_value(Value::Number(result))?;
    Ok(Branch::Fallthrough)
}

/// `ADD` additionally concatenates two strings when both operands are
/// strings (spec.md §4.1).
fn op_add(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let rhs = vm.pop_value()?;
    let lhs = vm.pop_value()?;
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => {
            let h = vm.strings.concat(a, b, &vm.program, vm.cursor.line_no);
            vm.strings.release(a);
            vm.strings.release(b);
            vm.push_value(Value::Str(h))?;
        }
        (Value::Number(a), Value::Number(b)) => {
            let result = a + b;
            check_exceptions(vm, host)?;
            vm.push_value(Value::Number(result))?;
        }
        _ => return Err(BasicErrorKind::WrongValueType.into()),
    }
    Ok(Branch::Fallthrough)
}

fn op_div(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let rhs = vm.pop_number()?;
    let lhs = vm.pop_number()?;
    if number::is_zero(rhs) {
        return Err(BasicErrorKind::DivisionByZero.into());
    }
    let result = lhs / rhs;
    check_exceptions(vm, host)?;
    vm.push_value(Value::Number(result))?;
    Ok(Branch::Fallthrough)
}

fn op_mod(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let rhs = vm.pop_number()?;
    let lhs = vm.pop_number()?;
    if number::is_zero(rhs) {
        return Err(BasicErrorKind::DivisionByZero.into());
    }
    let result = lhs % rhs;
    check_exceptions(vm, host)?;
    vm.push_value(Value::Number(result))?;
    Ok(Branch::Fallthrough)
}

fn op_transcendental(vm: &mut Vm, host: &mut dyn Host, f: impl Fn(f64) -> f64) -> OpResult<Branch> {
    if number::INTEGER_ONLY {
        return Err(BasicErrorKind::Syntax.into());
    }
    let n = vm.pop_number()?;
    let result = f(number::to_f64(n));
    check_exceptions(vm, host)?;
    vm.push_value(Value::Number(number::from_f64(result)))?;
    Ok(Branch::Fallthrough)
}

/// `literal` selects degrees-to-radians (0) or radians-to-degrees (1).
fn op_degrad(vm: &mut Vm, literal: u8) -> OpResult<Branch> {
    if number::INTEGER_ONLY {
        return Err(BasicErrorKind::Syntax.into());
    }
    let n = vm.pop_number()?;
    let arg = number::to_f64(n);
    let result = if literal == 0 {
        arg.to_radians()
    } else {
        arg.to_degrees()
    };
    vm.push_value(Value::Number(number::from_f64(result)))?;
    Ok(Branch::Fallthrough)
}

fn op_rnd(vm: &mut Vm) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let bound = number::to_i64(n);
    let result = if bound > 1 {
        number::from_i64((vm.next_rng_u32() as i64 % bound) + 1)
    } else if bound == 0 {
        if number::INTEGER_ONLY {
            return Err(BasicErrorKind::Syntax.into());
        }
        let r = vm.next_rng_u32() as f64 / (u32::MAX as f64 + 1.0);
        number::from_f64(r)
    } else {
        return Err(BasicErrorKind::IllegalQuantity.into());
    };
    vm.push_value(Value::Number(result))?;
    Ok(Branch::Fallthrough)
}

fn op_srnd(vm: &mut Vm, host: &mut dyn Host) -> OpResult<Branch> {
    let n = vm.pop_number()?;
    let seed = if number::is_zero(n) {
        let t = host.real_time_seconds();
        if t == 0.0 {
            vm.step_counter_seed()
        } else {
            t.to_bits()
        }
    } else {
        number::to_i64(n) as u64
    };
    vm.seed_rng(seed.max(1));
    Ok(Branch::Fallthrough)
}
