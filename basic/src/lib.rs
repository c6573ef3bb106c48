//! The terminal-backed host (spec.md §6): wires `basic_vm::Host`'s
//! three operation tables to stdin/stdout line I/O, wall-clock time,
//! and (per SPEC_FULL.md's "math-exception polling" note) an
//! always-empty floating point exception report, since this host has
//! no hardware FP flags to poll. Grounded on the teacher's `vex`
//! binary's role as the thin driver that turns a `Processor` loose on
//! a concrete environment (`vex/src/lib.rs`).

use basic_vm::host::{FileHandle, FileOps, MathExceptionOps, MathExceptions, OpenMode, ReadOutcome, TimeOps};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::time::{SystemTime, UNIX_EPOCH};

enum OpenFile {
    Read(BufReader<File>),
    Write(BufWriter<File>),
}

/// A host bound to the process's own stdin/stdout and real files on
/// disk. File handles are small integers minted in `open` order; the
/// console is the VM's `FileHandle::CONSOLE` sentinel and never enters
/// `files`.
pub struct TerminalHost {
    files: HashMap<u32, OpenFile>,
    next_handle: u32,
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TerminalHost {
    pub fn new() -> TerminalHost {
        TerminalHost {
            files: HashMap::new(),
            next_handle: 0,
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }

    fn read_console_line(&mut self) -> ReadOutcome {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => ReadOutcome::Eof,
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                ReadOutcome::Line(line.into_bytes())
            }
            Err(_) => ReadOutcome::Eof,
        }
    }
}

impl Default for TerminalHost {
    fn default() -> TerminalHost {
        TerminalHost::new()
    }
}

impl FileOps for TerminalHost {
    fn open(&mut self, name: &[u8], mode: OpenMode) -> io::Result<FileHandle> {
        let path = String::from_utf8_lossy(name).into_owned();
        let file = match mode {
            OpenMode::Read => OpenFile::Read(BufReader::new(File::open(&path)?)),
            OpenMode::Write => OpenFile::Write(BufWriter::new(File::create(&path)?)),
            OpenMode::ReadWrite => OpenFile::Write(BufWriter::new(
                OpenOptions::new().read(true).write(true).create(true).open(&path)?,
            )),
        };
        let handle = self.next_handle;
        self.next_handle += 1;
        self.files.insert(handle, file);
        Ok(FileHandle(handle))
    }

    fn close(&mut self, handle: FileHandle) {
        if let Some(OpenFile::Write(mut w)) = self.files.remove(&handle.0) {
            let _ = w.flush();
        }
    }

    fn read_line(&mut self, handle: FileHandle) -> ReadOutcome {
        if handle == FileHandle::CONSOLE {
            return self.read_console_line();
        }
        match self.files.get_mut(&handle.0) {
            Some(OpenFile::Read(r)) => {
                let mut line = String::new();
                match r.read_line(&mut line) {
                    Ok(0) => ReadOutcome::Eof,
                    Ok(_) => {
                        while line.ends_with('\n') || line.ends_with('\r') {
                            line.pop();
                        }
                        ReadOutcome::Line(line.into_bytes())
                    }
                    Err(_) => ReadOutcome::Eof,
                }
            }
            _ => ReadOutcome::Eof,
        }
    }

    fn write_bytes(&mut self, handle: FileHandle, bytes: &[u8]) {
        if handle == FileHandle::CONSOLE {
            let _ = self.stdout.lock().write_all(bytes);
            return;
        }
        if let Some(OpenFile::Write(w)) = self.files.get_mut(&handle.0) {
            let _ = w.write_all(bytes);
        }
    }

    /// This host runs to completion without a signal handler wired up;
    /// there is no asynchronous break source to observe.
    fn check_break(&mut self) -> bool {
        false
    }
}

impl TimeOps for TerminalHost {
    fn real_time_seconds(&mut self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl MathExceptionOps for TerminalHost {
    fn pull_and_clear(&mut self) -> MathExceptions {
        MathExceptions::default()
    }
}
