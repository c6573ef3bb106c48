//! `asm [-o out.bin] in.asm` or `asm -H[out.h] in.asm` (spec.md §6
//! "Assembler CLI"): exits 0 on success, nonzero on any diagnostic.
//! Grounded on `vasm/src/main.rs`'s clap-based driver, trading its
//! `-o`/`-m` (output/source-map) pair for this format's `-o`/`-H`
//! (binary/C-header) output-mode pair.

#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs;
use std::path::{Path, PathBuf};

enum Error {
    ReadInput(std::io::Error, PathBuf),
    WriteOutput(std::io::Error, PathBuf),
    Assemble(basm::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ReadInput(err, path) => {
                write!(f, "reading input file \"{}\" failed: {}", path.display(), err)
            }
            Error::WriteOutput(err, path) => {
                write!(f, "writing output file \"{}\" failed: {}", path.display(), err)
            }
            Error::Assemble(err) => write!(f, "assembling failed: {}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("IL assembly source file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Write the assembled image to this path (default: input with a .bin extension)")
                .conflicts_with("header"),
        )
        .arg(
            Arg::with_name("header")
                .short("H")
                .long("header")
                .takes_value(true)
                .min_values(0)
                .value_name("OUTPUT")
                .help("Write a C-style byte-array header instead of a raw image"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();

    let result = if matches.is_present("header") {
        run_header(input, matches.value_of("header"))
    } else {
        run_binary(input, matches.value_of("output"))
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn read_source(input: &str) -> Result<(PathBuf, String), Error> {
    let path = Path::new(input).to_owned();
    let text = fs::read_to_string(&path).map_err(|err| Error::ReadInput(err, path.clone()))?;
    Ok((path, text))
}

fn run_binary(input: &str, output: Option<&str>) -> Result<(), Error> {
    let (path, text) = read_source(input)?;
    let image = basm::assemble(&text).map_err(Error::Assemble)?;
    let output_path = output.map(PathBuf::from).unwrap_or_else(|| path.with_extension("bin"));
    bimage::write_file(&output_path, &image).map_err(|err| Error::WriteOutput(err, output_path))
}

fn run_header(input: &str, output: Option<&str>) -> Result<(), Error> {
    let (path, text) = read_source(input)?;
    let image = basm::assemble(&text).map_err(Error::Assemble)?;
    let array_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("basic_image");
    let header = bimage::format_header(&image, array_name);
    let output_path = output.map(PathBuf::from).unwrap_or_else(|| path.with_extension("h"));
    fs::write(&output_path, header).map_err(|err| Error::WriteOutput(err, output_path))
}
