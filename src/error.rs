//! The two disjoint failure categories of spec.md §7, modeled as
//! ordinary control flow instead of the reference implementation's
//! `setjmp`/`longjmp` (spec.md §9 "Control-flow via structured
//! non-local exits").
//!
//! Opcode implementations are infallible from their own point of view:
//! they return a [`Fault`] instead of unwinding, and the dispatch loop
//! in [`crate::interp`] is the only place that interprets it.

use std::error::Error as StdError;
use std::fmt;

/// One of the named BASIC errors from spec.md §7. `Display` renders the
/// exact wire form used by `tbvm.c`'s `basic_error` helpers: a leading
/// `?` followed by the all-caps name.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BasicErrorKind {
    Syntax,
    MissingLine,
    LineNumberOutOfRange,
    TooManyGosubs,
    ReturnWithoutGosub,
    TooManyForLoops,
    NextWithoutFor,
    ExpressionTooComplex,
    DivisionByZero,
    ArithmeticException,
    NumberOutOfRange,
    WrongValueType,
    FileNotFound,
    WrongMode,
    IllegalQuantity,
    OutOfData,
    BadSubscript,
    RedimdArray,
    OutOfMemory,
}

impl BasicErrorKind {
    pub fn name(self) -> &'static str {
        use BasicErrorKind::*;
        match self {
            Syntax => "SYNTAX ERROR",
            MissingLine => "MISSING LINE",
            LineNumberOutOfRange => "LINE NUMBER OUT OF RANGE",
            TooManyGosubs => "TOO MANY GOSUBS",
            ReturnWithoutGosub => "RETURN WITHOUT GOSUB",
            TooManyForLoops => "TOO MANY FOR LOOPS",
            NextWithoutFor => "NEXT WITHOUT FOR",
            ExpressionTooComplex => "EXPRESSION TOO COMPLEX",
            DivisionByZero => "DIVISION BY ZERO",
            ArithmeticException => "ARITHMETIC EXCEPTION",
            NumberOutOfRange => "NUMBER OUT OF RANGE",
            WrongValueType => "WRONG VALUE TYPE",
            FileNotFound => "FILE NOT FOUND",
            WrongMode => "WRONG MODE",
            IllegalQuantity => "ILLEGAL QUANTITY",
            OutOfData => "OUT OF DATA",
            BadSubscript => "BAD SUBSCRIPT",
            RedimdArray => "REDIM'D ARRAY",
            OutOfMemory => "OUT OF MEMORY",
        }
    }
}

impl fmt::Display for BasicErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "?{}", self.name())
    }
}

impl StdError for BasicErrorKind {
    fn description(&self) -> &str {
        self.name()
    }
}

/// A violated VM invariant: bad opcode, stack imbalance, a corrupt
/// program image. Always fatal to the current `exec` call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VmAbort {
    pub message: &'static str,
    pub opc_pc: usize,
    pub opcode: u8,
}

impl fmt::Display for VmAbort {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "!{}, PC={}, OPC={}",
            self.message, self.opc_pc, self.opcode
        )
    }
}

impl StdError for VmAbort {
    fn description(&self) -> &str {
        self.message
    }
}

/// The outcome of one opcode implementation. `Continue` lets dispatch
/// fall through to the next instruction (or, for branch opcodes, take
/// the branch); the other two variants are interpreted by the dispatch
/// loop per spec.md §4.1 "Failure semantics".
#[derive(Debug)]
pub enum Fault {
    Basic(BasicErrorKind),
    Abort(VmAbort),
}

impl From<BasicErrorKind> for Fault {
    fn from(k: BasicErrorKind) -> Fault {
        Fault::Basic(k)
    }
}

pub type OpResult<T = ()> = Result<T, Fault>;
