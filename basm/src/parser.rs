//! The pest grammar for IL assembly source (spec.md §6 "IL assembly
//! source syntax"): `[label:] mnemonic [operand [, 'string']]` per
//! line, semicolon comments, blank lines ignored. Grounded on the
//! teacher's `vasm` crate's split into a dedicated parser module, with
//! the grammar itself authored fresh since no VASM `.data`/
//! `.instructions` section syntax applies here.

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "il.pest"]
pub struct IlParser;
