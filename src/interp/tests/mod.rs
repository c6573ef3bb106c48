//! Shared test harness for per-opcode-family tests (mirrors the
//! teacher's `src/test/instructions/*.rs` split, one file per family).
//! Images are hand-assembled here rather than through `basm`, since
//! `basm` depends on this crate and a dependency the other way would be
//! circular.

mod arith;
mod assign;
mod collector;
mod compare;
mod exec;
mod lexer;

use super::Vm;
use crate::host::{FileHandle, FileOps, MathExceptionOps, MathExceptions, OpenMode, ReadOutcome, TimeOps};
use crate::opcode::OpCode;
use std::collections::VecDeque;

pub struct TestHost {
    pub input: VecDeque<Vec<u8>>,
    pub output: Vec<u8>,
}

impl TestHost {
    pub fn new(lines: &[&str]) -> TestHost {
        TestHost {
            input: lines.iter().map(|l| l.as_bytes().to_vec()).collect(),
            output: Vec::new(),
        }
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
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

/// Builds a raw IL image byte-by-byte, tracking label fixups so tests
/// can write the collector/executor split the way `basm` would emit
/// it, without going through `basm` itself.
#[derive(Default)]
pub struct Builder {
    code: Vec<u8>,
    fixups: Vec<(usize, String)>,
    labels: std::collections::HashMap<String, u16>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn mark(mut self, name: &str) -> Builder {
        let here = self.code.len() as u16;
        self.labels.insert(name.to_string(), here);
        self
    }

    pub fn op(mut self, code: OpCode) -> Builder {
        self.code.push(code.to_byte());
        self
    }

    pub fn byte(mut self, code: OpCode, b: u8) -> Builder {
        self.code.push(code.to_byte());
        self.code.push(b);
        self
    }

    pub fn label(mut self, code: OpCode, target: &str) -> Builder {
        self.code.push(code.to_byte());
        self.fixups.push((self.code.len(), target.to_string()));
        self.code.extend_from_slice(&[0, 0]);
        self
    }

    pub fn labelstr(mut self, code: OpCode, target: &str, s: &[u8]) -> Builder {
        self.code.push(code.to_byte());
        self.fixups.push((self.code.len(), target.to_string()));
        self.code.extend_from_slice(&[0, 0]);
        if s.is_empty() {
            self.code.push(0x80);
        } else {
            self.code.extend(s[..s.len() - 1].iter().map(|b| b & 0x7f));
            self.code.push(s[s.len() - 1] | 0x80);
        }
        self
    }

    pub fn finish(mut self, collector: &str, executor: &str) -> Vec<u8> {
        for (at, name) in &self.fixups {
            let addr = self.labels[name];
            self.code[*at..*at + 2].copy_from_slice(&addr.to_le_bytes());
        }
        let collector_addr = self.labels[collector];
        let executor_addr = self.labels[executor];
        self.code.extend_from_slice(&collector_addr.to_le_bytes());
        self.code.extend_from_slice(&executor_addr.to_le_bytes());
        self.code
    }
}

pub fn run(image: Vec<u8>, lines: &[&str]) -> (Vm, TestHost) {
    let mut vm = Vm::new();
    vm.load_image(image).unwrap();
    let mut host = TestHost::new(lines);
    vm.exec(&mut host);
    (vm, host)
}
