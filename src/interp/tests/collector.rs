use super::TestHost;
use crate::host::FileHandle;
use crate::interp::{collector, Branch, Mode, Operand, Vm};
use crate::opcode::OpCode;

#[test]
fn getline_upcases_unquoted_text_and_preserves_quoted_case() {
    let mut vm = Vm::new();
    let mut host = TestHost::new(&["10 let a = \"mixed Case\""]);
    let branch = collector::dispatch(&mut vm, OpCode::GetLine, &Operand::None, &mut host).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
    assert_eq!(vm.cursor.buffer, b"10 LET A = \"mixed Case\"");
}

#[test]
fn getline_halts_on_console_eof_with_no_file_loading() {
    let mut vm = Vm::new();
    let mut host = TestHost::new(&[]);
    let branch = collector::dispatch(&mut vm, OpCode::GetLine, &Operand::None, &mut host).unwrap();
    assert!(matches!(branch, Branch::Halt));
}

#[test]
fn getline_falls_back_to_console_when_a_loading_file_hits_eof() {
    let mut vm = Vm::new();
    vm.loading_file = Some(FileHandle(0));
    vm.mode = Mode::Loading;
    let mut host = TestHost::new(&[]);
    let branch = collector::dispatch(&mut vm, OpCode::GetLine, &Operand::None, &mut host).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
    assert!(vm.loading_file.is_none());
    assert_eq!(vm.mode, Mode::Direct);
}

#[test]
fn tstl_falls_through_on_a_leading_line_number() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"10 PRINT 5");
    let mut host = TestHost::new(&[]);
    let branch = collector::dispatch(&mut vm, OpCode::Tstl, &Operand::Label(99), &mut host).unwrap();
    assert!(matches!(branch, Branch::Fallthrough));
}

#[test]
fn tstl_branches_when_there_is_no_line_number() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"PRINT 5");
    let mut host = TestHost::new(&[]);
    let branch = collector::dispatch(&mut vm, OpCode::Tstl, &Operand::Label(42), &mut host).unwrap();
    assert!(matches!(branch, Branch::Jump(42)));
}

#[test]
fn insrt_stores_the_trimmed_line_and_suppresses_ok() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"10   LET A=5   \n");
    let mut host = TestHost::new(&[]);
    collector::dispatch(&mut vm, OpCode::Insrt, &Operand::None, &mut host).unwrap();
    assert_eq!(vm.program.text(10), Some(&b"LET A=5"[..]));
    assert!(vm.suppress_ok);
}

#[test]
fn insrt_with_no_leading_number_stores_under_line_zero() {
    let mut vm = Vm::new();
    vm.cursor.load(0, b"NEW\n");
    let mut host = TestHost::new(&[]);
    collector::dispatch(&mut vm, OpCode::Insrt, &Operand::None, &mut host).unwrap();
    assert_eq!(vm.program.text(0), Some(&b"NEW"[..]));
}
