//! Sizing constants for the program store and the three VM stacks.
//!
//! Mirrors tbvm.c's `#define`s for `NUM_VARS`, `SIZE_CSTK`, `SIZE_SBRSTK`,
//! `SIZE_AESTK` and `MAX_LINENO` (spec.md §3, §8).

/// `A..Z`. Numeric and string scalars each get one slot per letter.
pub const NUM_VARS: usize = 26;

/// Highest line number a program may use. Line 0 means "direct mode".
pub const MAX_LINENO: u16 = 65535;

/// Control stack depth (`CALL`/`RTN` — IL-internal subroutine linkage).
pub const CONTROL_STACK_SIZE: usize = 64;

/// Frame stack depth, shared between GOSUB frames and FOR frames.
pub const FRAME_STACK_SIZE: usize = 64;

/// Expression stack depth.
pub const EXPR_STACK_SIZE: usize = 64;

/// Column width BASIC's `TAB`/`SPC` advance to (spec.md §4.1 `SPC`).
pub const TAB_WIDTH: usize = 10;

/// Implicit array size per dimension when `DIM` was never called
/// (spec.md §3 "Variable store").
pub const IMPLICIT_ARRAY_DIM: u32 = 11;

/// Direct-mode line buffer size, matching tbvm.c's `SIZE_LBUF`.
pub const LINE_BUFFER_SIZE: usize = 256;
