use crate::interp::{compare, Branch, Operand, Vm};
use crate::number;
use crate::opcode::OpCode;
use crate::value::Value;

fn push_cmp(vm: &mut Vm, lhs: i64, rhs: i64, op: i64) {
    vm.push_value(Value::Number(number::from_i64(lhs))).unwrap();
    vm.push_value(Value::Number(number::from_i64(rhs))).unwrap();
    vm.push_value(Value::Number(number::from_i64(op))).unwrap();
}

#[test]
fn cmpr_falls_through_when_the_comparison_holds() {
    let mut vm = Vm::new();
    push_cmp(&mut vm, 1, 2, 1); // 1 < 2
    let branch = compare::dispatch(&mut vm, OpCode::Cmpr, &Operand::None).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
}

#[test]
fn cmprx_branches_to_the_label_when_the_comparison_fails() {
    let mut vm = Vm::new();
    push_cmp(&mut vm, 2, 1, 1); // 2 < 1 is false
    let branch = compare::dispatch(&mut vm, OpCode::CmprX, &Operand::Label(55)).unwrap();
    assert!(matches!(branch, Branch::Jump(55)));
}

#[test]
fn cmpr_equal_operator_matches_equal_numbers() {
    let mut vm = Vm::new();
    push_cmp(&mut vm, 4, 4, 0); // =
    let branch = compare::dispatch(&mut vm, OpCode::Cmpr, &Operand::None).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
}
