//! A tagged-value stack machine that interprets a Tiny-BASIC-derived IL
//! (spec.md §1, §3, §4.1), plus the scaffolding it is built from: the
//! value model, string heap, program store, stacks, variable store, and
//! the host contract the VM calls back through.
//!
//! `Vm::exec` is the public entry point: it runs the fetch-decode-
//! dispatch loop in [`interp`] against a [`Host`] implementation until
//! `EXIT`, a fatal VM abort, or console EOF (spec.md §4.1 "Public
//! contract").

extern crate num;
#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod cursor;
pub mod error;
pub mod host;
pub mod interp;
pub mod number;
pub mod opcode;
pub mod program;
pub mod stacks;
pub mod strings;
pub mod value;
pub mod variables;

pub use error::{BasicErrorKind, Fault, OpResult, VmAbort};
pub use host::{FileOps, Host, MathExceptionOps, MathExceptions, OpenMode, ReadOutcome, TimeOps};
pub use interp::{Mode, Vm};
pub use opcode::{OpCode, OperandSpec};
pub use util::ParseEnumError;

#[cfg(test)]
mod tests {
    use super::host::{FileHandle, FileOps, MathExceptionOps, MathExceptions, OpenMode, ReadOutcome, TimeOps};
    use super::interp::Vm;
    use std::collections::VecDeque;

    /// A host with no files, no break signal, and no hardware FP flags:
    /// enough to drive the VM through `exec` without touching the
    /// filesystem or a real terminal.
    struct TestHost {
        input: VecDeque<Vec<u8>>,
        output: Vec<u8>,
    }

    impl TestHost {
        fn new(lines: &[&str]) -> TestHost {
            TestHost {
                input: lines.iter().map(|l| l.as_bytes().to_vec()).collect(),
                output: Vec::new(),
            }
        }
    }

    impl FileOps for TestHost {
        fn open(&mut self, _name: &[u8], _mode: OpenMode) -> std::io::Result<FileHandle> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no files in test host"))
        }
        fn close(&mut self, _handle: FileHandle) {}
        fn read_line(&mut self, _handle: FileHandle) -> ReadOutcome {
            match self.input.pop_front() {
                Some(line) => ReadOutcome::Line(line),
                None => ReadOutcome::Eof,
            }
        }
        fn write_bytes(&mut self, _handle: FileHandle, bytes: &[u8]) {
            self.output.extend_from_slice(bytes);
        }
        fn check_break(&mut self) -> bool {
            false
        }
    }

    impl TimeOps for TestHost {
        fn real_time_seconds(&mut self) -> f64 {
            0.0
        }
    }

    impl MathExceptionOps for TestHost {
        fn pull_and_clear(&mut self) -> MathExceptions {
            MathExceptions::default()
        }
    }

    /// `EXIT` with a zero-address trailer: exercises `load_image`'s
    /// trailer stripping without depending on `basm`.
    fn minimal_image() -> Vec<u8> {
        let mut bytes = vec![super::opcode::OpCode::Exit.to_byte()];
        let collector: u16 = 0;
        let executor: u16 = 0;
        bytes.extend_from_slice(&collector.to_le_bytes());
        bytes.extend_from_slice(&executor.to_le_bytes());
        bytes
    }

    #[test]
    fn exec_halts_on_exit() {
        let mut vm = Vm::new();
        vm.load_image(minimal_image()).unwrap();
        let mut host = TestHost::new(&[]);
        vm.exec(&mut host);
        assert!(host.output.is_empty());
    }

    #[test]
    fn load_image_rejects_short_buffer() {
        let mut vm = Vm::new();
        assert!(vm.load_image(vec![1, 2, 3]).is_err());
    }
}
