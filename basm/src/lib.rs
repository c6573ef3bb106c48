//! Two-pass assembler for IL assembly source (spec.md §4.4 "Assembler
//! design", §6 "IL assembly source syntax").
//!
//! # IL Assembly Language
//!
//! A program is a sequence of statements, one per line:
//!
//! ```text
//! [label:] mnemonic [operand [, 'string']]
//! ```
//!
//! A label declaration binds the current byte address to a name so
//! later statements can reference it as an operand. A semicolon starts
//! a comment that runs to the end of the line. Blank lines are
//! ignored.
//!
//! Operands come in three shapes, one per mnemonic (see
//! [`basic_vm::opcode::OpCode::operand_spec`]):
//!
//! - a bare label reference (`JMP loop`)
//! - a decimal byte literal in `0..=255` (`LIT 5`)
//! - a label reference followed by a quoted string (`TST skip, 'LET'`)
//!
//! Two labels are required in every program: `CO`, the collector's
//! entry point, and `XEC`, the executor's entry point. Their addresses
//! become the two-word trailer of the assembled image (spec.md §6 "IL
//! binary format").
//!
//! Parsing is implemented with [pest], following the same approach the
//! teacher's `vasm` crate took for its own (differently shaped)
//! assembly language.
//!
//! [pest]: https://docs.rs/pest/

mod emit;
pub mod error;
mod labels;
mod parser;

#[cfg(test)]
mod test;

pub use error::{AssembleError, Error, ParseError};
pub use labels::{LabelMap, OperandValue, Statement};

use parser::{IlParser, Rule};
use pest::iterators::Pair;
use pest::Parser;

pub type Result<T> = std::result::Result<T, Error>;

/// Assembles `input` into an image ready for `Vm::load_image` or
/// `bimage::write`.
pub fn assemble(input: &str) -> Result<bimage::Image> {
    let (statements, labels) = labels::process_program(parse(input)?)?;
    let code = emit::emit(&statements, &labels)?;
    let collector = emit::required_symbol(&labels, "CO")?;
    let executor = emit::required_symbol(&labels, "XEC")?;
    Ok(bimage::Image::new(code, collector, executor))
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(IlParser::parse(Rule::program, input)?.next().unwrap())
}
