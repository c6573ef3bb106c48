//! First pass: walk the parsed program once, assigning a byte address
//! to every statement and recording every label declaration. Mirrors
//! the role `vasm/src/labels.rs` plays for VASM's label table, minus
//! the separate data/instruction label namespaces — this format has
//! just one.

use crate::error::{AssembleError, Error, ParseError};
use crate::Rule;
use basic_vm::opcode::{OpCode, OperandSpec};
use pest::iterators::Pair;
use std::collections::HashMap;
use std::str::FromStr;

pub type LabelMap = HashMap<String, u16>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperandValue {
    None,
    Label(String),
    Byte(u8),
    LabelStr(String, Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub opcode: OpCode,
    pub operand: OperandValue,
    pub address: u16,
}

fn operand_error(mnemonic: &str, expected: &'static str) -> Error {
    AssembleError::OperandMismatch { mnemonic: mnemonic.to_string(), expected }.into()
}

fn first_inner(pair: Pair<Rule>) -> Pair<Rule> {
    pair.into_inner().next().unwrap()
}

fn build_operand(
    opcode: OpCode,
    mnemonic: &str,
    operands_pair: Option<Pair<Rule>>,
) -> Result<OperandValue, Error> {
    match opcode.operand_spec() {
        OperandSpec::None => Ok(OperandValue::None),
        OperandSpec::Byte => {
            let operands = operands_pair.ok_or_else(|| operand_error(mnemonic, "byte"))?;
            let operand = first_inner(operands);
            let literal = first_inner(operand);
            match literal.as_rule() {
                Rule::number => {
                    let n: i64 = literal.as_str().parse().map_err(ParseError::from)?;
                    if !(0..=255).contains(&n) {
                        return Err(AssembleError::ByteOperandOutOfRange(n).into());
                    }
                    Ok(OperandValue::Byte(n as u8))
                }
                _ => Err(operand_error(mnemonic, "byte")),
            }
        }
        OperandSpec::Label => {
            let operands = operands_pair.ok_or_else(|| operand_error(mnemonic, "label"))?;
            let operand = first_inner(operands);
            let literal = first_inner(operand);
            match literal.as_rule() {
                Rule::identifier => Ok(OperandValue::Label(literal.as_str().to_string())),
                _ => Err(operand_error(mnemonic, "label")),
            }
        }
        OperandSpec::LabelStr => {
            let operands = operands_pair.ok_or_else(|| operand_error(mnemonic, "label, 'string'"))?;
            let mut fields = operands.into_inner();
            let operand = fields.next().unwrap();
            let literal = first_inner(operand);
            let label = match literal.as_rule() {
                Rule::identifier => literal.as_str().to_string(),
                _ => return Err(operand_error(mnemonic, "label, 'string'")),
            };
            let string_pair = fields
                .next()
                .ok_or_else(|| operand_error(mnemonic, "label, 'string'"))?;
            let inner_string = first_inner(string_pair);
            Ok(OperandValue::LabelStr(label, inner_string.as_str().as_bytes().to_vec()))
        }
    }
}

/// Total byte size of a statement, opcode byte included. `fixed_size`
/// covers every shape but `LabelStr`, whose size also depends on the
/// embedded string (spec.md §6 "IL binary format").
fn statement_size(opcode: OpCode, operand: &OperandValue) -> u32 {
    match opcode.fixed_size() {
        Some(n) => n as u32,
        None => match operand {
            OperandValue::LabelStr(_, bytes) => 3 + bytes.len().max(1) as u32,
            _ => unreachable!("operand_spec() guarantees LabelStr here"),
        },
    }
}

pub fn process_program(pair: Pair<Rule>) -> Result<(Vec<Statement>, LabelMap), Error> {
    let mut labels = LabelMap::new();
    let mut statements = Vec::new();
    let mut address: u32 = 0;

    for stmt_pair in pair.into_inner() {
        if stmt_pair.as_rule() != Rule::statement {
            continue;
        }

        let mut fields = stmt_pair.into_inner();
        let mut next = fields.next();

        let mut label_name = None;
        if let Some(p) = next.as_ref() {
            if p.as_rule() == Rule::label {
                let ident = first_inner(p.clone());
                label_name = Some(ident.as_str().to_string());
                next = fields.next();
            }
        }

        let mnemonic_pair = next.expect("grammar guarantees a mnemonic in every statement");
        let mnemonic_str = mnemonic_pair.as_str().to_uppercase();
        let opcode = OpCode::from_str(&mnemonic_str)
            .map_err(|_| Error::from(AssembleError::UnknownMnemonic(mnemonic_str.clone())))?;

        let operand = build_operand(opcode, &mnemonic_str, fields.next())?;

        if address > u16::MAX as u32 {
            return Err(AssembleError::AddressOutOfRange(mnemonic_str).into());
        }
        let this_address = address as u16;

        if let Some(name) = label_name {
            if labels.insert(name.clone(), this_address).is_some() {
                return Err(AssembleError::DuplicateLabel(name).into());
            }
        }

        address += statement_size(opcode, &operand);

        statements.push(Statement { opcode, operand, address: this_address });
    }

    Ok((statements, labels))
}
