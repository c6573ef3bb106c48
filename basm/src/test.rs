use crate::labels::{process_program, OperandValue};
use crate::parser::{IlParser, Rule};
use matches::assert_matches;
use pest::Parser;

fn parse_program(input: &str) -> pest::iterators::Pair<Rule> {
    IlParser::parse(Rule::program, input).unwrap().next().unwrap()
}

#[test]
fn parses_statement_with_no_operand() {
    let pair = IlParser::parse(Rule::statement, "EXIT").unwrap().next().unwrap();
    assert_eq!(pair.as_rule(), Rule::statement);
    assert_eq!(pair.as_str(), "EXIT");
}

#[test]
fn parses_labeled_statement() {
    let pair = IlParser::parse(Rule::statement, "loop: JMP loop").unwrap().next().unwrap();
    let mut fields = pair.into_inner();
    assert_eq!(fields.next().unwrap().as_rule(), Rule::label);
    assert_eq!(fields.next().unwrap().as_str(), "JMP");
}

#[test]
fn parses_label_string_operand() {
    let pair = IlParser::parse(Rule::statement, "TST skip, 'LET'").unwrap().next().unwrap();
    let mut fields = pair.into_inner();
    assert_eq!(fields.next().unwrap().as_str(), "TST");
    let operands = fields.next().unwrap();
    assert_eq!(operands.as_rule(), Rule::operands);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let input = "; a header comment\n\nEXIT ; trailing\n";
    let pair = parse_program(input);
    let statements: Vec<_> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::statement)
        .collect();
    assert_eq!(statements.len(), 1);
}

#[test]
fn assigns_addresses_across_operand_shapes() {
    let input = "CO: EXIT\nJMP CO\nXEC: LIT 5\n";
    let pair = parse_program(input);
    let (statements, labels) = process_program(pair).unwrap();

    assert_eq!(labels["CO"], 0);
    assert_eq!(statements[0].address, 0);
    assert_eq!(statements[1].address, 1);
    assert_matches!(&statements[1].operand, OperandValue::Label(l) if l == "CO");
    assert_eq!(labels["XEC"], 4);
    assert_eq!(statements[2].address, 4);
    assert_matches!(statements[2].operand, OperandValue::Byte(5));
}

#[test]
fn rejects_duplicate_labels() {
    let input = "CO: EXIT\nCO: EXIT\n";
    let pair = parse_program(input);
    assert!(process_program(pair).is_err());
}

#[test]
fn rejects_unknown_mnemonic() {
    let input = "NOTANOPCODE\n";
    let pair = parse_program(input);
    assert!(process_program(pair).is_err());
}

#[test]
fn assembles_a_minimal_program_and_resolves_required_symbols() {
    let input = "CO: JMP XEC\nXEC: EXIT\n";
    let image = crate::assemble(input).unwrap();

    assert_eq!(image.collector(), 0);
    assert_eq!(image.executor(), 3);
    assert_eq!(image.code().len(), 4);
}

#[test]
fn assemble_fails_without_required_symbols() {
    let input = "loop: JMP loop\n";
    assert!(crate::assemble(input).is_err());
}

#[test]
fn assembles_tst_with_label_and_string_operand() {
    let input = "CO: EXIT\nXEC: TST skip, 'LET'\nskip: EXIT\n";
    let image = crate::assemble(input).unwrap();
    assert_eq!(image.executor(), 1);
    // opcode byte + 2-byte label + 3 literal chars with the high bit
    // set on the last one
    let tst_start = 1;
    assert_eq!(image.code()[tst_start + 3], b'L');
    assert_eq!(image.code()[tst_start + 5], b'T' | 0x80);
}
