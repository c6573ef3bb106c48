//! Second pass: walk the statements `labels::process_program` produced
//! and resolve every label reference against the now-complete symbol
//! table, mirroring the split between `vasm/src/labels.rs`'s pass and
//! `vasm/src/instructions.rs`'s `assemble_instructions` finalization
//! step.

use crate::error::{AssembleError, Error};
use crate::labels::{LabelMap, OperandValue, Statement};

pub fn emit(statements: &[Statement], labels: &LabelMap) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    for stmt in statements {
        out.push(stmt.opcode.to_byte());
        match &stmt.operand {
            OperandValue::None => {}
            OperandValue::Byte(b) => out.push(*b),
            OperandValue::Label(name) => {
                out.extend_from_slice(&resolve(labels, name)?.to_le_bytes());
            }
            OperandValue::LabelStr(name, bytes) => {
                out.extend_from_slice(&resolve(labels, name)?.to_le_bytes());
                out.extend_from_slice(&encode_imm_string(bytes));
            }
        }
    }
    Ok(out)
}

fn resolve(labels: &LabelMap, name: &str) -> Result<u16, Error> {
    labels
        .get(name)
        .copied()
        .ok_or_else(|| AssembleError::UndefinedLabel(name.to_string()).into())
}

/// Encodes a string the way `Vm::read_imm_string` decodes it: every
/// byte verbatim except the last, which carries the high bit as a
/// terminator. An empty string is encoded as a single terminator byte.
pub fn encode_imm_string(bytes: &[u8]) -> Vec<u8> {
    if bytes.is_empty() {
        return vec![0x80];
    }
    let mut out = Vec::with_capacity(bytes.len());
    out.extend(bytes[..bytes.len() - 1].iter().map(|b| b & 0x7f));
    out.push(bytes[bytes.len() - 1] | 0x80);
    out
}

pub fn required_symbol(labels: &LabelMap, name: &'static str) -> Result<u16, Error> {
    labels
        .get(name)
        .copied()
        .ok_or(AssembleError::MissingRequiredSymbol(name).into())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encodes_nonempty_string_with_high_bit_terminator() {
        assert_eq!(encode_imm_string(b"AB"), vec![b'A', b'B' | 0x80]);
    }

    #[test]
    fn encodes_empty_string_as_single_terminator() {
        assert_eq!(encode_imm_string(b""), vec![0x80]);
    }
}
