use super::TestHost;
use crate::interp::{arith, Branch, Operand, Vm};
use crate::number;
use crate::opcode::OpCode;
use crate::value::Value;

#[test]
fn lit_pushes_the_byte_operand_as_a_number() {
    let mut vm = Vm::new();
    let mut host = TestHost::new(&[]);
    let branch = arith::dispatch(&mut vm, OpCode::Lit, &Operand::Byte(42), &mut host).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
    assert_eq!(vm.pop_value().unwrap().as_number(), Some(number::from_i64(42)));
}

#[test]
fn add_pops_two_numbers_and_pushes_their_sum() {
    let mut vm = Vm::new();
    let mut host = TestHost::new(&[]);
    vm.push_value(Value::Number(number::from_i64(2))).unwrap();
    vm.push_value(Value::Number(number::from_i64(3))).unwrap();
    arith::dispatch(&mut vm, OpCode::Add, &Operand::None, &mut host).unwrap();
    assert_eq!(vm.pop_value().unwrap().as_number(), Some(number::from_i64(5)));
}

#[test]
fn neg_pushes_the_negation_of_the_popped_number() {
    let mut vm = Vm::new();
    let mut host = TestHost::new(&[]);
    vm.push_value(Value::Number(number::from_i64(7))).unwrap();
    arith::dispatch(&mut vm, OpCode::Neg, &Operand::None, &mut host).unwrap();
    assert_eq!(vm.pop_value().unwrap().as_number(), Some(number::from_i64(-7)));
}
