use crate::interp::{assign, Vm};
use crate::number;
use crate::opcode::OpCode;
use crate::value::{Value, VarKind, VarRef};

#[test]
fn store_pops_value_then_var_ref_and_writes_the_variable() {
    let mut vm = Vm::new();
    let r = VarRef::Scalar { letter: b'X', kind: VarKind::Number };
    vm.push_value(Value::VarRef(r)).unwrap();
    vm.push_value(Value::Number(number::from_i64(99))).unwrap();
    assign::dispatch(&mut vm, OpCode::Store).unwrap();
    assert_eq!(vm.vars.get_number(b'X'), number::from_i64(99));
}
