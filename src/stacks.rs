//! The three cooperating stacks of spec.md §3: control, subroutine/frame,
//! and expression. Overflow and underflow are both reported as BASIC
//! errors (spec.md §3, and the "Recovered behavior" note in
//! SPEC_FULL.md about `tbvm.c`'s `stack_push`/`stack_pop` sentinel
//! returns) rather than aborting the VM.

use crate::constants::{CONTROL_STACK_SIZE, EXPR_STACK_SIZE, FRAME_STACK_SIZE};
use crate::error::BasicErrorKind;
use crate::number::Number;
use crate::value::{Value, VarRef};

/// IL return addresses pushed by `CALL` and popped by `RTN`. This is the
/// bytecode's own subroutine linkage (used by the hand-written collector
/// and executor routines), distinct from BASIC's `GOSUB`.
#[derive(Default)]
pub struct ControlStack {
    items: Vec<u16>,
}

impl ControlStack {
    pub fn new() -> ControlStack {
        ControlStack { items: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `CALL`/`RTN` imbalance is an IL-authoring bug, not a user-facing
    /// BASIC condition, so both directions abort the VM.
    pub fn push(&mut self, addr: u16) -> Result<(), &'static str> {
        if self.items.len() >= CONTROL_STACK_SIZE {
            return Err("control stack overflow");
        }
        self.items.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, &'static str> {
        self.items.pop().ok_or("control stack underflow")
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Frame {
    Gosub { return_line: u16, return_offset: u16 },
    For { var: VarRef, loop_line: u16, end: Number, step: Number },
}

impl Frame {
    fn is_for(&self) -> bool {
        matches!(self, Frame::For { .. })
    }
}

#[derive(Default)]
pub struct FrameStack {
    items: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> FrameStack {
        FrameStack { items: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, frame: Frame) -> Result<(), BasicErrorKind> {
        if self.items.len() >= FRAME_STACK_SIZE {
            return Err(if frame.is_for() {
                BasicErrorKind::TooManyForLoops
            } else {
                BasicErrorKind::TooManyGosubs
            });
        }
        self.items.push(frame);
        Ok(())
    }

    /// Pops the top frame, which must be a `Gosub` frame (`RSTR`).
    pub fn pop_gosub(&mut self) -> Result<Frame, BasicErrorKind> {
        match self.items.last() {
            Some(Frame::Gosub { .. }) => Ok(self.items.pop().unwrap()),
            _ => Err(BasicErrorKind::ReturnWithoutGosub),
        }
    }

    /// Finds the innermost `For` frame bound to `var` (or, if `var` is
    /// `None`, the innermost `For` frame regardless of variable),
    /// discarding any frames above it (spec.md §4.1 `NXTFOR`).
    pub fn find_for_frame(&mut self, var: Option<VarRef>) -> Result<Frame, BasicErrorKind> {
        let index = self.items.iter().rposition(|f| match (f, var) {
            (Frame::For { var: fv, .. }, Some(v)) => *fv == v,
            (Frame::For { .. }, None) => true,
            _ => false,
        });
        match index {
            Some(i) => {
                self.items.truncate(i + 1);
                Ok(self.items.pop().unwrap())
            }
            None => Err(BasicErrorKind::NextWithoutFor),
        }
    }

    pub fn push_for_frame(&mut self, frame: Frame) -> Result<(), BasicErrorKind> {
        debug_assert!(frame.is_for());
        self.push(frame)
    }

    pub fn top_is_for(&self) -> bool {
        matches!(self.items.last(), Some(Frame::For { .. }))
    }
}

#[derive(Default)]
pub struct ExprStack {
    items: Vec<Value>,
}

impl ExprStack {
    pub fn new() -> ExprStack {
        ExprStack { items: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, value: Value) -> Result<(), BasicErrorKind> {
        if self.items.len() >= EXPR_STACK_SIZE {
            return Err(BasicErrorKind::ExpressionTooComplex);
        }
        self.items.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, BasicErrorKind> {
        self.items.pop().ok_or(BasicErrorKind::ExpressionTooComplex)
    }

    pub fn peek(&self) -> Option<&Value> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }
}
