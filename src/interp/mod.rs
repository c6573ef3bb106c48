//! The fetch-decode-dispatch loop (spec.md §4.1) and the `Vm` state it
//! operates on. Each opcode family lives in its own submodule, mirroring
//! the spec's own subsection breaks; this file owns decode, the
//! dispatch `match`, and the handful of opcodes ("Control flow") that
//! don't fit cleanly under any other family.

mod arith;
mod arrays;
mod assign;
mod collector;
mod compare;
mod datamode;
mod forloop;
mod io;
mod lexer;
mod progio;
mod strops;

#[cfg(test)]
mod tests;

use crate::cursor::{Cursor, SavedPosition};
use crate::error::{BasicErrorKind, Fault, OpResult, VmAbort};
use crate::host::{FileHandle, Host};
use crate::opcode::{OpCode, OperandSpec};
use crate::program::ProgramStore;
use crate::stacks::{ControlStack, ExprStack, Frame, FrameStack};
use crate::strings::StringHeap;
use crate::value::Value;
use crate::variables::VariableStore;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Direct,
    Running,
    Loading,
}

/// What an opcode implementation wants dispatch to do next.
pub enum Branch {
    /// Continue at the address right after this instruction's encoding.
    Fallthrough,
    /// Jump to an absolute IL address.
    Jump(u16),
    /// Stop the dispatch loop (`EXIT`).
    Halt,
}

/// The decoded operand of one instruction, per spec.md §4.1 "Fetch/decode".
pub enum Operand {
    None,
    Label(u16),
    Byte(u8),
    LabelStr(u16, Vec<u8>),
}

impl Operand {
    fn label(&self) -> u16 {
        match self {
            Operand::Label(l) => *l,
            Operand::LabelStr(l, _) => *l,
            _ => 0,
        }
    }

    fn byte(&self) -> u8 {
        match self {
            Operand::Byte(b) => *b,
            _ => 0,
        }
    }

    fn string(&self) -> &[u8] {
        match self {
            Operand::LabelStr(_, s) => s,
            _ => &[],
        }
    }
}

pub struct Vm {
    pub program: ProgramStore,
    pub strings: StringHeap,
    pub vars: VariableStore,
    pub control: ControlStack,
    pub frames: FrameStack,
    pub expr: ExprStack,
    pub cursor: Cursor,
    image: Vec<u8>,
    pc: usize,
    pub mode: Mode,
    rng_state: u64,
    step_counter: u64,
    /// Current position of the `READ` pointer used by `DSTORE` while in
    /// DATA mode (spec.md §4.1 `DMODE`).
    pub data_ptr: SavedPosition,
    in_data_mode: bool,
    pub loading_file: Option<FileHandle>,
    pub listing_file: Option<FileHandle>,
    /// Name behind the most recent `LDPRG`/`SVPRG` call, reused when the
    /// filename operand is the literal `0` ("last file", spec.md §4.1).
    pub last_filename: Option<Vec<u8>>,
    collector_addr: u16,
    executor_addr: u16,
    pub console_col: usize,
    pub suppress_ok: bool,
}

impl Vm {
    pub fn new() -> Vm {
        Vm {
            program: ProgramStore::new(),
            strings: StringHeap::new(),
            vars: VariableStore::new(),
            control: ControlStack::new(),
            frames: FrameStack::new(),
            expr: ExprStack::new(),
            cursor: Cursor::new(),
            image: Vec::new(),
            pc: 0,
            mode: Mode::Direct,
            rng_state: 1,
            step_counter: 0,
            data_ptr: SavedPosition::default(),
            in_data_mode: false,
            loading_file: None,
            listing_file: None,
            last_filename: None,
            collector_addr: 0,
            executor_addr: 0,
            console_col: 0,
            suppress_ok: false,
        }
    }

    /// Loads a program image: the raw IL byte stream followed by the
    /// two 16-bit little-endian collector/executor labels (spec.md §4.1
    /// "Public contract"). The trailer is stripped before execution.
    pub fn load_image(&mut self, mut bytes: Vec<u8>) -> Result<(), &'static str> {
        if bytes.len() < 4 {
            return Err("program image too short");
        }
        let exec_hi = bytes.pop().unwrap();
        let exec_lo = bytes.pop().unwrap();
        let coll_hi = bytes.pop().unwrap();
        let coll_lo = bytes.pop().unwrap();
        self.collector_addr = u16::from_le_bytes([coll_lo, coll_hi]);
        self.executor_addr = u16::from_le_bytes([exec_lo, exec_hi]);
        self.image = bytes;
        Ok(())
    }

    fn read_u8(&self, pc: usize) -> Result<u8, Fault> {
        self.image.get(pc).copied().ok_or_else(|| {
            Fault::Abort(VmAbort {
                message: "image read past end",
                opc_pc: pc,
                opcode: 0,
            })
        })
    }

    fn read_label(&self, pc: usize) -> Result<u16, Fault> {
        let lo = self.read_u8(pc)?;
        let hi = self.read_u8(pc + 1)?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Reads a high-bit-terminated immediate string starting at `pc`,
    /// returning the bytes (with the terminator's low 7 bits appended)
    /// and the address right after the terminator.
    fn read_imm_string(&self, mut pc: usize) -> Result<(Vec<u8>, usize), Fault> {
        let mut out = Vec::new();
        loop {
            let b = self.read_u8(pc)?;
            pc += 1;
            if b & 0x80 != 0 {
                out.push(b & 0x7f);
                return Ok((out, pc));
            }
            out.push(b);
        }
    }

    fn decode(&self, opc_pc: usize) -> Result<(OpCode, Operand, usize), Fault> {
        let byte = self.read_u8(opc_pc)?;
        let opcode = OpCode::from_byte(byte).ok_or_else(|| {
            Fault::Abort(VmAbort {
                message: "unknown opcode",
                opc_pc,
                opcode: byte,
            })
        })?;
        let after_opcode = opc_pc + 1;
        let (operand, next) = match opcode.operand_spec() {
            OperandSpec::None => (Operand::None, after_opcode),
            OperandSpec::Label => {
                let label = self.read_label(after_opcode)?;
                (Operand::Label(label), after_opcode + 2)
            }
            OperandSpec::Byte => {
                let byte = self.read_u8(after_opcode)?;
                (Operand::Byte(byte), after_opcode + 1)
            }
            OperandSpec::LabelStr => {
                let label = self.read_label(after_opcode)?;
                let (s, next) = self.read_imm_string(after_opcode + 2)?;
                (Operand::LabelStr(label, s), next)
            }
        };
        Ok((opcode, operand, next))
    }

    fn push_value(&mut self, v: Value) -> OpResult {
        self.expr.push(v).map_err(Fault::from)
    }

    fn pop_value(&mut self) -> OpResult<Value> {
        self.expr.pop().map_err(Fault::from)
    }

    fn pop_number(&mut self) -> OpResult<crate::number::Number> {
        self.pop_value()?
            .as_number()
            .ok_or_else(|| Fault::from(BasicErrorKind::WrongValueType))
    }

    fn pop_str(&mut self) -> OpResult<crate::strings::StringHandle> {
        self.pop_value()?
            .as_str_handle()
            .ok_or_else(|| Fault::from(BasicErrorKind::WrongValueType))
    }

    fn pop_var_ref(&mut self) -> OpResult<crate::value::VarRef> {
        self.pop_value()?
            .as_var_ref()
            .ok_or_else(|| Fault::from(BasicErrorKind::WrongValueType))
    }

    /// `INIT` (spec.md §4.1 "Line collector interface"): clears
    /// everything and seeds the RNG to 1.
    fn full_reset(&mut self) {
        self.program.clear();
        self.strings.reset();
        let dangling = self.vars.reset();
        for h in dangling {
            self.strings.release(h);
        }
        self.control.clear();
        self.frames.clear();
        self.expr.clear();
        self.cursor.reset();
        self.rng_state = 1;
        self.step_counter = 0;
        self.in_data_mode = false;
        self.data_ptr = SavedPosition::default();
        self.loading_file = None;
        self.listing_file = None;
        self.console_col = 0;
        self.mode = Mode::Direct;
    }

    /// Fallback `SRND` seed when the host has no usable wall clock
    /// (spec.md §4.1 "falling back to an instruction counter").
    pub fn step_counter_seed(&self) -> u64 {
        self.step_counter.max(1)
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng_state = seed;
    }

    fn next_rng_u32(&mut self) -> u32 {
        // xorshift64*, seeded either explicitly (`SRND n`) or from host
        // wall-clock time; deterministic and dependency-free.
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        (x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 32) as u32
    }

    /// Raises a BASIC error: prints the message (with `AT LINE n` when
    /// not in direct mode), restores direct mode, and resumes at the
    /// collector entry (spec.md §4.1 "Failure semantics").
    fn handle_basic_error(&mut self, host: &mut dyn Host, kind: BasicErrorKind) {
        if self.cursor.line_no == 0 {
            host.write_bytes(FileHandle::CONSOLE, format!("{}\r\n", kind).as_bytes());
        } else {
            host.write_bytes(
                FileHandle::CONSOLE,
                format!("{} AT LINE {}\r\n", kind, self.cursor.line_no).as_bytes(),
            );
        }
        self.in_data_mode = false;
        if let Some(h) = self.loading_file.take() {
            host.close(h);
        }
        if let Some(h) = self.listing_file.take() {
            host.close(h);
        }
        self.mode = Mode::Direct;
        self.expr.clear();
        self.cursor.reset();
        self.pc = self.collector_addr as usize;
    }

    fn handle_vm_abort(&mut self, host: &mut dyn Host, abort: &VmAbort) {
        host.write_bytes(FileHandle::CONSOLE, format!("{}\r\n", abort).as_bytes());
    }

    /// Runs the dispatch loop until `EXIT`, a fatal VM abort, or console
    /// EOF (spec.md §4.1 "Public contract").
    pub fn exec(&mut self, host: &mut dyn Host) {
        self.pc = self.collector_addr as usize;
        loop {
            self.strings.sweep();
            if host.check_break() {
                host.write_bytes(FileHandle::CONSOLE, b"BREAK\r\n");
                self.mode = Mode::Direct;
                self.expr.clear();
                self.cursor.reset();
                self.pc = self.collector_addr as usize;
                continue;
            }

            let opc_pc = self.pc;
            let decoded = self.decode(opc_pc);
            let (opcode, operand, fallthrough) = match decoded {
                Ok(v) => v,
                Err(Fault::Abort(a)) => {
                    self.handle_vm_abort(host, &a);
                    return;
                }
                Err(Fault::Basic(k)) => {
                    self.handle_basic_error(host, k);
                    continue;
                }
            };

            self.step_counter = self.step_counter.wrapping_add(1);

            let result = self.dispatch(opcode, &operand, host);
            match result {
                Ok(Branch::Fallthrough) => self.pc = fallthrough,
                Ok(Branch::Jump(addr)) => self.pc = addr as usize,
                Ok(Branch::Halt) => return,
                Err(Fault::Basic(k)) => self.handle_basic_error(host, k),
                Err(Fault::Abort(mut a)) => {
                    a.opc_pc = opc_pc;
                    a.opcode = opcode.to_byte();
                    self.handle_vm_abort(host, &a);
                    return;
                }
            }
        }
    }

    fn dispatch(&mut self, opcode: OpCode, operand: &Operand, host: &mut dyn Host) -> OpResult<Branch> {
        use OpCode::*;
        match opcode {
            // --- Control flow ---------------------------------------
            Jmp => Ok(Branch::Jump(operand.label())),
            Call => {
                self.control.push(operand.label()).map_err(|m| {
                    Fault::Abort(VmAbort { message: m, opc_pc: 0, opcode: 0 })
                })?;
                Ok(Branch::Jump(operand.label()))
            }
            Rtn => {
                let addr = self
                    .control
                    .pop()
                    .map_err(|m| Fault::Abort(VmAbort { message: m, opc_pc: 0, opcode: 0 }))?;
                Ok(Branch::Jump(addr))
            }
            Nxt => self.op_nxt(None),
            NxtLn => self.op_nxt(Some(operand.label())),
            Fin => {
                self.mode = Mode::Direct;
                self.cursor.reset();
                Ok(Branch::Jump(self.collector_addr))
            }
            Exit => Ok(Branch::Halt),
            Run => {
                let released = self.vars.reset();
                for h in released {
                    self.strings.release(h);
                }
                self.frames.clear();
                self.control.clear();
                self.expr.clear();
                self.mode = Mode::Running;
                let first = self.program.first_line();
                if first == 0 {
                    self.mode = Mode::Direct;
                    return Ok(Branch::Jump(self.collector_addr));
                }
                self.load_line(first);
                Ok(Branch::Jump(self.executor_addr))
            }
            Err => ::std::result::Result::Err(Fault::from(BasicErrorKind::Syntax)),
            Done => self.op_done(),
            DoneM => self.op_donem(operand.byte()),
            OnDone => {
                self.cursor.on_done = Some(operand.label());
                Ok(Branch::Fallthrough)
            }
            Xfer => self.op_xfer(),
            Sav => {
                let line = if self.cursor.line_no == 0 { 0 } else { self.cursor.line_no };
                self.frames
                    .push(Frame::Gosub { return_line: line, return_offset: self.cursor.offset })
                    .map_err(Fault::from)?;
                Ok(Branch::Fallthrough)
            }
            Rstr => {
                match self.frames.pop_gosub()? {
                    Frame::Gosub { return_line, return_offset } => {
                        if return_line == 0 {
                            self.mode = Mode::Direct;
                            self.cursor.reset();
                        } else {
                            self.load_line(return_line);
                            self.cursor.offset = return_offset;
                        }
                        Ok(Branch::Fallthrough)
                    }
                    _ => unreachable!(),
                }
            }

            // --- Line collector interface -----------------------------
            Init | GetLine | Tstl | Insrt => collector::dispatch(self, opcode, operand, host),

            // --- Statement lexer/parser --------------------------------
            Xinit | Tst | Scan | Tstv | Tstn | Tsts | TstEol | TstSol | AdvEol => {
                lexer::dispatch(self, opcode, operand)
            }

            // --- Expression arithmetic ---------------------------------
            Lit | Ind | Add | Sub | Neg | Mul | Div | Mod | Pow | Fix | Flr | Ceil | Sgn | Abs
            | Atn | Cos | Sin | Tan | Exp | Log | Sqr | DegRad | Rnd | Srnd => {
                arith::dispatch(self, opcode, operand, host)
            }

            // --- Comparison --------------------------------------------
            Cmpr | CmprX => compare::dispatch(self, opcode, operand),

            // --- I/O -----------------------------------------------------
            Prs | Prn | Spc | Nline | AdvCrs | Innum | Invar => {
                io::dispatch(self, opcode, operand, host)
            }

            // --- Assignment ----------------------------------------------
            Store | DStore => assign::dispatch(self, opcode),

            // --- Arrays --------------------------------------------------
            Dim | Arry => arrays::dispatch(self, opcode),

            // --- Strings -------------------------------------------------
            Str | Hex | Val | StrLen | Asc | Chr | Cpy | Pop | UprLwr | Mks | Sbstr => {
                strops::dispatch(self, opcode, operand)
            }

            // --- FOR loops -------------------------------------------------
            For | Step | NxtFor => forloop::dispatch(self, opcode),

            // --- Program I/O -----------------------------------------------
            LdPrg | SvPrg | Lst | LstX => progio::dispatch(self, opcode, operand, host),

            // --- DATA mode -------------------------------------------------
            Dmode => datamode::dispatch(self, operand.byte()),
        }
    }

    /// `NXT`/`NXTLN`: advances to the next defined BASIC line. `NXTLN`
    /// branches to `label` on end-of-program instead of falling back to
    /// direct mode (spec.md §4.1 "Control flow").
    fn op_nxt(&mut self, on_end: Option<u16>) -> OpResult<Branch> {
        match self.program.line_at_or_after(self.cursor.line_no + 1) {
            Some(next) => {
                self.load_line(next);
                Ok(Branch::Jump(self.executor_addr))
            }
            None => match on_end {
                Some(label) => Ok(Branch::Jump(label)),
                None => {
                    self.mode = Mode::Direct;
                    self.cursor.reset();
                    Ok(Branch::Jump(self.collector_addr))
                }
            },
        }
    }

    fn op_done(&mut self) -> OpResult<Branch> {
        if !self.cursor.rest_is_blank() {
            return Err(Fault::from(BasicErrorKind::Syntax));
        }
        if let Some(hook) = self.cursor.on_done.take() {
            return Ok(Branch::Jump(hook));
        }
        self.op_nxt(None)
    }

    fn op_donem(&mut self, literal: u8) -> OpResult<Branch> {
        let expected_running = literal == 0;
        let is_running = matches!(self.mode, Mode::Running);
        if expected_running != is_running {
            return Err(Fault::Abort(VmAbort {
                message: "DONEM mode assertion failed",
                opc_pc: 0,
                opcode: 0,
            }));
        }
        self.op_done()
    }

    /// `XFER`: pops a line number and transfers control to it. Zero is a
    /// line-number error (spec.md §4.1 "Control flow").
    fn op_xfer(&mut self) -> OpResult<Branch> {
        let n = self.pop_number()?;
        let target = crate::number::to_i64(n);
        if target <= 0 || target > u16::MAX as i64 || !self.program.contains(target as u16) {
            return Err(Fault::from(BasicErrorKind::MissingLine));
        }
        self.load_line(target as u16);
        Ok(Branch::Jump(self.executor_addr))
    }

    /// Reads the current value bound to `r` (`IND`). A string result is
    /// retained before being pushed, since the expression stack owns a
    /// reference to every string value it holds.
    pub fn read_var(&mut self, r: crate::value::VarRef) -> OpResult<Value> {
        use crate::value::{VarKind, VarRef};
        match r {
            VarRef::Scalar { letter, kind: VarKind::Number } => {
                Ok(Value::Number(self.vars.get_number(letter)))
            }
            VarRef::Scalar { letter, kind: VarKind::Str } => {
                let h = self.vars.get_string(letter);
                self.strings.retain(h);
                Ok(Value::Str(h))
            }
            VarRef::Element { letter, kind: VarKind::Number, flat_index } => {
                Ok(Value::Number(self.vars.get_array_number(letter, flat_index)))
            }
            VarRef::Element { letter, kind: VarKind::Str, flat_index } => {
                let h = self.vars.get_array_string(letter, flat_index);
                self.strings.retain(h);
                Ok(Value::Str(h))
            }
        }
    }

    /// Assigns `value` to `r`, type-checked against `r`'s namespace
    /// (`STORE`). Releases the string previously held there, if any.
    pub fn write_var(&mut self, r: crate::value::VarRef, value: Value) -> OpResult {
        use crate::value::{VarKind, VarRef};
        match (r, value) {
            (VarRef::Scalar { letter, kind: VarKind::Number }, Value::Number(n)) => {
                self.vars.set_number(letter, n);
                Ok(())
            }
            (VarRef::Scalar { letter, kind: VarKind::Str }, Value::Str(h)) => {
                self.strings.retain(h);
                let old = self.vars.set_string(letter, h);
                self.strings.release(old);
                Ok(())
            }
            (VarRef::Element { letter, kind: VarKind::Number, flat_index }, Value::Number(n)) => {
                self.vars.set_array_number(letter, flat_index, n);
                Ok(())
            }
            (VarRef::Element { letter, kind: VarKind::Str, flat_index }, Value::Str(h)) => {
                self.strings.retain(h);
                let old = self.vars.set_array_string(letter, flat_index, h);
                self.strings.release(old);
                Ok(())
            }
            _ => Err(Fault::from(BasicErrorKind::WrongValueType)),
        }
    }

    /// Loads `line_no`'s text into the cursor, stripping the leading
    /// decimal line number left over from direct-entry syntax (program
    /// lines are stored with their number already peeled off by
    /// `INSRT`, so this is a straight load).
    pub fn load_line(&mut self, line_no: u16) {
        let text = self.program.text(line_no).map(|b| b.to_vec()).unwrap_or_default();
        self.cursor.load(line_no, &text);
    }
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}
