//! Interpreter CLI (spec.md §6 "Interpreter CLI"): prints a name/
//! version banner, then runs until `EXIT`, a fatal VM abort, or console
//! EOF, exiting 0 on normal termination. Grounded on `jttb.c`'s `main`,
//! which prints a version banner and hands a statically embedded IL
//! program straight to `tbvm_exec` with no further setup.
//!
//! Unlike `jttb`, this binary takes one optional positional argument
//! (SPEC_FULL.md's "Configuration" note) so a human can hand it a
//! pre-assembled `.bvx` image, or a `.basm` source file to assemble on
//! the spot, instead of always running the embedded bootstrap command
//! interpreter.

#[macro_use]
extern crate clap;

use basic_vm::interp::Vm;
use clap::Arg;
use std::fs;
use std::path::Path;

/// The command interpreter run when no override image is given. A
/// deliberately small LET/PRINT direct-mode loop, not a full BASIC
/// dialect — see DESIGN.md for why the real dialect's bytecode table
/// (`jttb_vmprog.h` in the original sources) isn't available to port.
const BOOTSTRAP: &str = include_str!("../../demos/bootstrap.basm");

enum Error {
    ReadInput(std::io::Error, String),
    ReadImage(std::io::Error, String),
    Assemble(basm::Error),
    Load(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ReadInput(err, path) => write!(f, "reading \"{}\" failed: {}", path, err),
            Error::ReadImage(err, path) => write!(f, "reading image \"{}\" failed: {}", path, err),
            Error::Assemble(err) => write!(f, "assembling failed: {}", err),
            Error::Load(msg) => write!(f, "{}", msg),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PROGRAM")
                .help("A pre-assembled .bvx image, or a .basm source file to assemble and run")
                .index(1),
        )
        .get_matches();

    println!("{}, version {}", crate_name!(), crate_version!());

    let image = match matches.value_of("PROGRAM") {
        Some(path) => load_program(path),
        None => basm::assemble(BOOTSTRAP).map_err(Error::Assemble),
    };

    let image = match image {
        Ok(image) => image,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let mut vm = Vm::new();
    if let Err(msg) = vm.load_image(image.into_bytes()) {
        eprintln!("{}", Error::Load(msg));
        std::process::exit(1);
    }

    let mut host = basic::TerminalHost::new();
    vm.exec(&mut host);
}

fn load_program(path: &str) -> Result<bimage::Image, Error> {
    if Path::new(path).extension().and_then(|e| e.to_str()) == Some("basm") {
        let text = fs::read_to_string(path).map_err(|err| Error::ReadInput(err, path.to_string()))?;
        basm::assemble(&text).map_err(Error::Assemble)
    } else {
        bimage::read_file(path).map_err(|err| Error::ReadImage(err, path.to_string()))
    }
}
