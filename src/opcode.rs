//! The IL instruction set (spec.md §4.1). One byte per opcode, grouped
//! into the same families the spec's own subsection breaks use — the
//! same texture as the teacher's `OpCode`/`ALUFunct` enums
//! (`src/processor/enums.rs`), just with the DLX instruction set swapped
//! for this VM's stack-machine one.

use num::traits::ToPrimitive;
use std::fmt;
use std::str::FromStr;
use util::ParseEnumError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive)]
pub enum OpCode {
    // --- Control flow ---------------------------------------------------
    Jmp,
    Call,
    Rtn,
    Nxt,
    NxtLn,
    Fin,
    Exit,
    Run,
    Err,
    Done,
    DoneM,
    OnDone,
    Xfer,
    Sav,
    Rstr,

    // --- Line collector interface ---------------------------------------
    Init,
    GetLine,
    Tstl,
    Insrt,

    // --- Statement lexer/parser ------------------------------------------
    Xinit,
    Tst,
    Scan,
    Tstv,
    Tstn,
    Tsts,
    TstEol,
    TstSol,
    AdvEol,

    // --- Expression arithmetic -------------------------------------------
    Lit,
    Ind,
    Add,
    Sub,
    Neg,
    Mul,
    Div,
    Mod,
    Pow,
    Fix,
    Flr,
    Ceil,
    Sgn,
    Abs,
    Atn,
    Cos,
    Sin,
    Tan,
    Exp,
    Log,
    Sqr,
    DegRad,
    Rnd,
    Srnd,

    // --- Comparison --------------------------------------------------------
    Cmpr,
    CmprX,

    // --- I/O -----------------------------------------------------------
    Prs,
    Prn,
    Spc,
    Nline,
    AdvCrs,
    Innum,
    Invar,

    // --- Assignment -------------------------------------------------------
    Store,
    DStore,

    // --- Arrays -------------------------------------------------------
    Dim,
    Arry,

    // --- Strings -------------------------------------------------------
    Str,
    Hex,
    Val,
    StrLen,
    Asc,
    Chr,
    Cpy,
    Pop,
    UprLwr,
    Mks,
    Sbstr,

    // --- FOR loops -------------------------------------------------------
    For,
    Step,
    NxtFor,

    // --- Program I/O -------------------------------------------------------
    LdPrg,
    SvPrg,
    Lst,
    LstX,

    // --- DATA mode -------------------------------------------------------
    Dmode,
}

impl OpCode {
    pub fn to_byte(self) -> u8 {
        ToPrimitive::to_u8(&self).unwrap()
    }

    pub fn from_byte(byte: u8) -> Option<OpCode> {
        num::FromPrimitive::from_u8(byte)
    }

    /// Mnemonic as it appears in IL assembly source (spec.md §6).
    pub fn mnemonic(self) -> &'static str {
        use OpCode::*;
        match self {
            Jmp => "JMP",
            Call => "CALL",
            Rtn => "RTN",
            Nxt => "NXT",
            NxtLn => "NXTLN",
            Fin => "FIN",
            Exit => "EXIT",
            Run => "RUN",
            Err => "ERR",
            Done => "DONE",
            DoneM => "DONEM",
            OnDone => "ONDONE",
            Xfer => "XFER",
            Sav => "SAV",
            Rstr => "RSTR",
            Init => "INIT",
            GetLine => "GETLINE",
            Tstl => "TSTL",
            Insrt => "INSRT",
            Xinit => "XINIT",
            Tst => "TST",
            Scan => "SCAN",
            Tstv => "TSTV",
            Tstn => "TSTN",
            Tsts => "TSTS",
            TstEol => "TSTEOL",
            TstSol => "TSTSOL",
            AdvEol => "ADVEOL",
            Lit => "LIT",
            Ind => "IND",
            Add => "ADD",
            Sub => "SUB",
            Neg => "NEG",
            Mul => "MUL",
            Div => "DIV",
            Mod => "MOD",
            Pow => "POW",
            Fix => "FIX",
            Flr => "FLR",
            Ceil => "CEIL",
            Sgn => "SGN",
            Abs => "ABS",
            Atn => "ATN",
            Cos => "COS",
            Sin => "SIN",
            Tan => "TAN",
            Exp => "EXP",
            Log => "LOG",
            Sqr => "SQR",
            DegRad => "DEGRAD",
            Rnd => "RND",
            Srnd => "SRND",
            Cmpr => "CMPR",
            CmprX => "CMPRX",
            Prs => "PRS",
            Prn => "PRN",
            Spc => "SPC",
            Nline => "NLINE",
            AdvCrs => "ADVCRS",
            Innum => "INNUM",
            Invar => "INVAR",
            Store => "STORE",
            DStore => "DSTORE",
            Dim => "DIM",
            Arry => "ARRY",
            Str => "STR",
            Hex => "HEX",
            Val => "VAL",
            StrLen => "STRLEN",
            Asc => "ASC",
            Chr => "CHR",
            Cpy => "CPY",
            Pop => "POP",
            UprLwr => "UPRLWR",
            Mks => "MKS",
            Sbstr => "SBSTR",
            For => "FOR",
            Step => "STEP",
            NxtFor => "NXTFOR",
            LdPrg => "LDPRG",
            SvPrg => "SVPRG",
            Lst => "LST",
            LstX => "LSTX",
            Dmode => "DMODE",
        }
    }

    pub const ALL: &'static [OpCode] = &[
        OpCode::Jmp, OpCode::Call, OpCode::Rtn, OpCode::Nxt, OpCode::NxtLn, OpCode::Fin,
        OpCode::Exit, OpCode::Run, OpCode::Err, OpCode::Done, OpCode::DoneM, OpCode::OnDone,
        OpCode::Xfer, OpCode::Sav, OpCode::Rstr, OpCode::Init, OpCode::GetLine, OpCode::Tstl,
        OpCode::Insrt, OpCode::Xinit, OpCode::Tst, OpCode::Scan, OpCode::Tstv, OpCode::Tstn,
        OpCode::Tsts, OpCode::TstEol, OpCode::TstSol, OpCode::AdvEol, OpCode::Lit, OpCode::Ind,
        OpCode::Add, OpCode::Sub, OpCode::Neg, OpCode::Mul, OpCode::Div, OpCode::Mod,
        OpCode::Pow, OpCode::Fix, OpCode::Flr, OpCode::Ceil, OpCode::Sgn, OpCode::Abs,
        OpCode::Atn, OpCode::Cos, OpCode::Sin, OpCode::Tan, OpCode::Exp, OpCode::Log,
        OpCode::Sqr, OpCode::DegRad, OpCode::Rnd, OpCode::Srnd, OpCode::Cmpr, OpCode::CmprX,
        OpCode::Prs, OpCode::Prn, OpCode::Spc, OpCode::Nline, OpCode::AdvCrs, OpCode::Innum,
        OpCode::Invar, OpCode::Store, OpCode::DStore, OpCode::Dim, OpCode::Arry, OpCode::Str,
        OpCode::Hex, OpCode::Val, OpCode::StrLen, OpCode::Asc, OpCode::Chr, OpCode::Cpy,
        OpCode::Pop, OpCode::UprLwr, OpCode::Mks, OpCode::Sbstr, OpCode::For, OpCode::Step,
        OpCode::NxtFor, OpCode::LdPrg, OpCode::SvPrg, OpCode::Lst, OpCode::LstX, OpCode::Dmode,
    ];
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for OpCode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<OpCode, ParseEnumError> {
        OpCode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic() == s)
            .ok_or_else(|| ParseEnumError {
                value: s.to_string(),
                enum_name: "OpCode",
            })
    }
}

/// The operand shape a mnemonic encodes with, generalized from
/// `tbvm_opcodes.h`'s `OPC_F_LABEL`/`OPC_F_STRING`/`OPC_F_NUMBER` flags
/// (see SPEC_FULL.md "Recovered/supplemented behavior"). `LabelStr` is
/// this VM's one addition, needed by `TST`/`SCAN`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandSpec {
    None,
    Label,
    Byte,
    LabelStr,
}

impl OpCode {
    pub fn operand_spec(self) -> OperandSpec {
        use OpCode::*;
        use OperandSpec::*;
        match self {
            Jmp | Call | NxtLn | OnDone | Tstl | TstEol | TstSol | Tstv | Tstn | Tsts
            | CmprX => Label,
            Tst | Scan => LabelStr,
            DoneM | Lit | DegRad | AdvCrs | UprLwr | Sbstr | Dmode => Byte,
            _ => None,
        }
    }

    /// Size in bytes of this opcode's encoding, including the opcode
    /// byte itself, for every operand shape except `LabelStr` (whose
    /// size depends on the embedded string's length and so cannot be
    /// known from the opcode alone).
    pub fn fixed_size(self) -> Option<usize> {
        match self.operand_spec() {
            OperandSpec::None => Some(1),
            OperandSpec::Label => Some(3),
            OperandSpec::Byte => Some(2),
            OperandSpec::LabelStr => None,
        }
    }
}
