//! Assembler error types. Grounded on `vasm/src/error.rs`'s split
//! between a parse-time `ParseError` (pest, integer literals, enum
//! names) and an assemble-time `AssembleError`, joined by a top-level
//! `Error`.

use crate::Rule;
use pest::error::Error as PestError;
use std::fmt;
use std::num::ParseIntError;
use util::ParseEnumError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    Pest(PestError<Rule>),
    ParseInt(ParseIntError),
    ParseEnum(ParseEnumError),
}

impl From<PestError<Rule>> for ParseError {
    fn from(err: PestError<Rule>) -> ParseError {
        ParseError::Pest(err)
    }
}

impl From<ParseIntError> for ParseError {
    fn from(err: ParseIntError) -> ParseError {
        ParseError::ParseInt(err)
    }
}

impl From<ParseEnumError> for ParseError {
    fn from(err: ParseEnumError) -> ParseError {
        ParseError::ParseEnum(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Pest(err) => write!(f, "{}", err),
            ParseError::ParseInt(err) => write!(f, "{}", err),
            ParseError::ParseEnum(err) => write!(f, "{}", err),
        }
    }
}

/// Failures found only once the whole program is visible: unresolved
/// symbols, a missing `CO`/`XEC` label, an operand shape mismatch
/// against `OpCode::operand_spec()`, or a byte operand out of range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssembleError {
    UnknownMnemonic(String),
    DuplicateLabel(String),
    UndefinedLabel(String),
    MissingRequiredSymbol(&'static str),
    OperandMismatch { mnemonic: String, expected: &'static str },
    ByteOperandOutOfRange(i64),
    AddressOutOfRange(String),
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssembleError::UnknownMnemonic(m) => write!(f, "unknown mnemonic \"{}\"", m),
            AssembleError::DuplicateLabel(l) => write!(f, "label \"{}\" is defined more than once", l),
            AssembleError::UndefinedLabel(l) => write!(f, "label \"{}\" is never defined", l),
            AssembleError::MissingRequiredSymbol(s) => {
                write!(f, "required symbol \"{}\" is never defined", s)
            }
            AssembleError::OperandMismatch { mnemonic, expected } => {
                write!(f, "{} expects a {} operand", mnemonic, expected)
            }
            AssembleError::ByteOperandOutOfRange(n) => {
                write!(f, "byte operand {} is out of range 0..=255", n)
            }
            AssembleError::AddressOutOfRange(l) => {
                write!(f, "address of label \"{}\" does not fit in 16 bits", l)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Parse(ParseError),
    Assemble(AssembleError),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<AssembleError> for Error {
    fn from(err: AssembleError) -> Error {
        Error::Assemble(err)
    }
}

impl From<PestError<Rule>> for Error {
    fn from(err: PestError<Rule>) -> Error {
        Error::Parse(ParseError::Pest(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{}", err),
            Error::Assemble(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}
