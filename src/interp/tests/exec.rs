use super::{run, Builder};
use crate::opcode::OpCode::*;

/// Exercises the real fetch/decode/dispatch loop end to end: a direct
/// statement that adds two literals and prints the result, then a
/// second line hits console EOF and the loop halts cleanly.
#[test]
fn runs_a_direct_mode_statement_through_the_whole_loop() {
    let image = Builder::new()
        .mark("CO")
        .op(GetLine)
        .label(Tstl, "direct")
        .op(Insrt)
        .label(Jmp, "CO")
        .mark("direct")
        .label(Jmp, "XEC")
        .mark("XEC")
        .byte(Lit, 5)
        .byte(Lit, 3)
        .op(Add)
        .op(Prn)
        .op(Fin)
        .finish("CO", "XEC");

    let (_vm, host) = run(image, &["PRINT 5+3"]);
    assert_eq!(host.output_str(), "8");
}

#[test]
fn a_stored_program_line_does_not_print_anything_on_its_own() {
    let image = Builder::new()
        .mark("CO")
        .op(GetLine)
        .label(Tstl, "direct")
        .op(Insrt)
        .label(Jmp, "CO")
        .mark("direct")
        .label(Jmp, "XEC")
        .mark("XEC")
        .byte(Lit, 5)
        .byte(Lit, 3)
        .op(Add)
        .op(Prn)
        .op(Fin)
        .finish("CO", "XEC");

    let (vm, host) = run(image, &["10 LET A=5"]);
    assert_eq!(host.output_str(), "");
    assert_eq!(vm.program.text(10), Some(&b"LET A=5"[..]));
}
