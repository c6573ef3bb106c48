//! The host driver surface (spec.md §6, §9 "Global mutable state" and
//! "Math-exception polling"). The VM never touches a terminal, a clock,
//! or hardware FP flags directly; it calls back through these three
//! small operation tables, exactly as the reference implementation's
//! `io_getchar`/`io_putchar` function pointers do, but expressed as
//! traits so a host can be a terminal, a test harness, or a headless
//! batch runner without the VM knowing which.

use std::io;

/// A file handle, or the distinguished console handle. The teacher's
/// `CompositeMemory` uses a similar "opaque handle, host resolves it"
/// split (`src/memory/composite.rs`); here the host owns actual file
/// handles and the VM only ever carries this token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FileHandle(pub u32);

impl FileHandle {
    pub const CONSOLE: FileHandle = FileHandle(u32::MAX);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpenMode {
    Read,
    Write,
    ReadWrite,
}

/// Parses the `'i'`/`'o'` mode-character sequence from `LDPRG`/`SVPRG`
/// (spec.md §6: "combined into one of {read-binary, write-binary,
/// read/write-binary}").
pub fn parse_mode(chars: &str) -> Option<OpenMode> {
    let has_in = chars.contains('i');
    let has_out = chars.contains('o');
    match (has_in, has_out) {
        (true, true) => Some(OpenMode::ReadWrite),
        (true, false) => Some(OpenMode::Read),
        (false, true) => Some(OpenMode::Write),
        (false, false) => None,
    }
}

/// Result of one blocking console read, modeling the abstract `BREAK`
/// sentinel of spec.md §5 ("a break may additionally interrupt the
/// in-progress character fetch").
#[derive(Debug)]
pub enum ReadOutcome {
    Line(Vec<u8>),
    Eof,
    Break,
}

pub trait FileOps {
    fn open(&mut self, name: &[u8], mode: OpenMode) -> io::Result<FileHandle>;
    fn close(&mut self, handle: FileHandle);

    /// Reads one line (up to and not including the terminator) from
    /// `handle`. `handle == FileHandle::CONSOLE` blocks for terminal
    /// input and must observe `check_break`.
    fn read_line(&mut self, handle: FileHandle) -> ReadOutcome;

    fn write_bytes(&mut self, handle: FileHandle, bytes: &[u8]);

    /// Polled at the top of the dispatch loop and during blocking reads
    /// (spec.md §5 "Ordering"). Must be safe to call from a context that
    /// cannot observe a torn value written by a signal handler.
    fn check_break(&mut self) -> bool;
}

pub trait TimeOps {
    /// Wall-clock seconds, used only to seed `RND` via `SRND 0`
    /// (spec.md §4.1).
    fn real_time_seconds(&mut self) -> f64;
}

/// Bitmask returned by [`MathExceptionOps::pull_and_clear`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MathExceptions {
    pub divide_by_zero: bool,
    pub arithmetic: bool,
}

impl MathExceptions {
    pub fn any(self) -> bool {
        self.divide_by_zero || self.arithmetic
    }
}

pub trait MathExceptionOps {
    /// Pulls and clears whatever hardware FP exception flags fired since
    /// the last call. Hosts without hardware FP flags satisfy this by
    /// always returning `MathExceptions::default()` (spec.md §9).
    fn pull_and_clear(&mut self) -> MathExceptions;
}

/// Bundles the three host tables the VM depends on (spec.md §6). Kept as
/// one trait with supertraits so `Vm::exec` takes a single generic
/// parameter instead of three.
pub trait Host: FileOps + TimeOps + MathExceptionOps {}
impl<T: FileOps + TimeOps + MathExceptionOps> Host for T {}
