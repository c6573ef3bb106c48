use crate::interp::{lexer, Branch, Operand, Vm};
use crate::number;
use crate::opcode::OpCode;
use crate::value::{VarKind, VarRef};

#[test]
fn tst_matches_a_keyword_case_insensitively_and_advances_the_cursor() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"  print 5");
    let branch = lexer::dispatch(&mut vm, OpCode::Tst, &Operand::LabelStr(7, b"PRINT".to_vec())).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
    assert_eq!(vm.cursor.buffer[vm.cursor.offset as usize..], b" 5"[..]);
}

#[test]
fn tst_branches_on_mismatch() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"LET A=5");
    let branch = lexer::dispatch(&mut vm, OpCode::Tst, &Operand::LabelStr(7, b"PRINT".to_vec())).unwrap();
    assert!(matches!(branch, Branch::Jump(7)));
}

#[test]
fn tstn_parses_a_leading_number_and_pushes_it() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"123 rest");
    let branch = lexer::dispatch(&mut vm, OpCode::Tstn, &Operand::Label(9)).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
    let popped = vm.pop_value().unwrap();
    assert_eq!(popped.as_number(), Some(number::from_i64(123)));
}

#[test]
fn tstn_branches_when_no_digits_follow() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"ABC");
    let branch = lexer::dispatch(&mut vm, OpCode::Tstn, &Operand::Label(9)).unwrap();
    assert!(matches!(branch, Branch::Jump(9)));
}

#[test]
fn tstv_parses_a_numeric_and_string_variable_reference() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"A$ REST");
    let branch = lexer::dispatch(&mut vm, OpCode::Tstv, &Operand::Label(9)).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
    let popped = vm.pop_value().unwrap();
    assert_eq!(popped.as_var_ref(), Some(VarRef::Scalar { letter: b'A', kind: VarKind::Str }));
}

#[test]
fn tsteol_falls_through_on_a_blank_remainder() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"PRINT");
    vm.cursor.offset = 5;
    let branch = lexer::dispatch(&mut vm, OpCode::TstEol, &Operand::Label(1)).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
}
