//! Reads and writes the IL binary image format (spec.md §6 "IL binary
//! format"): a raw opcode byte stream followed by a two-word trailer
//! giving the collector and executor entry addresses, both 16-bit
//! little-endian. Modeled on the teacher's `vexfile` crate, minus the
//! separate data/instructions split `vexfile` needed for the DLX
//! processor's memory image — this VM has no separate data segment, so
//! the whole format collapses to one byte stream plus the trailer.

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use util::Endian;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    code: Vec<u8>,
    collector: u16,
    executor: u16,
}

impl Image {
    pub fn new(code: Vec<u8>, collector: u16, executor: u16) -> Image {
        Image { code, collector, executor }
    }

    pub fn code(&self) -> &[u8] {
        &self.code[..]
    }

    pub fn collector(&self) -> u16 {
        self.collector
    }

    pub fn executor(&self) -> u16 {
        self.executor
    }

    /// Appends the trailer to the code stream, producing the bytes the
    /// VM's `load_image` expects.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = self.code;
        bytes.extend_from_slice(&self.collector.to_le_bytes());
        bytes.extend_from_slice(&self.executor.to_le_bytes());
        bytes
    }
}

pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Image> {
    let mut code = Vec::new();
    reader.read_to_end(&mut code)?;
    if code.len() < 4 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "image shorter than the four-byte collector/executor trailer",
        ));
    }
    let trailer_at = code.len() - 4;
    let executor = u16::from_le_bytes([code[trailer_at + 2], code[trailer_at + 3]]);
    let collector = u16::from_le_bytes([code[trailer_at], code[trailer_at + 1]]);
    code.truncate(trailer_at);
    Ok(Image::new(code, collector, executor))
}

pub fn write<W: Write>(writer: &mut W, image: &Image) -> std::io::Result<()> {
    writer.write_all(&image.code)?;
    writer.write_u16::<Endian>(image.collector)?;
    writer.write_u16::<Endian>(image.executor)?;
    Ok(())
}

pub trait ReadImageExt: Read + Sized {
    fn read_image(&mut self) -> std::io::Result<Image> {
        read(self)
    }
}

impl<R: Read + Sized> ReadImageExt for R {}

pub trait WriteImageExt: Write + Sized {
    fn write_image(&mut self, image: &Image) -> std::io::Result<()> {
        write(self, image)
    }
}

impl<W: Write + Sized> WriteImageExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<Image> {
    BufReader::new(File::open(path)?).read_image()
}

pub fn write_file<P: AsRef<Path>>(path: P, image: &Image) -> std::io::Result<()> {
    BufWriter::new(File::create(path)?).write_image(image)
}

/// Renders `image.code()` as a C-style byte-array header, the second
/// output mode `basm`'s `-H` flag selects (spec.md §4.4 "Output modes").
pub fn format_header(image: &Image, array_name: &str) -> String {
    let mut out = format!("static const unsigned char {}[] = {{\n", array_name);
    for chunk in image.code().chunks(12) {
        out.push_str("    ");
        for byte in chunk {
            out.push_str(&format!("0x{:02x}, ", byte));
        }
        out.push('\n');
    }
    out.push_str("};\n");
    out.push_str(&format!(
        "static const unsigned short {}_collector = {};\n",
        array_name, image.collector
    ));
    out.push_str(&format!(
        "static const unsigned short {}_executor = {};\n",
        array_name, image.executor
    ));
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let image = Image::new(vec![1, 2, 3, 4], 0x1234, 0xabcd);
        let mut buf = Vec::new();
        write(&mut buf, &image).unwrap();
        let decoded = read(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn into_bytes_matches_vm_trailer_layout() {
        let image = Image::new(vec![0xaa], 1, 2);
        let bytes = image.into_bytes();
        assert_eq!(bytes, vec![0xaa, 1, 0, 2, 0]);
    }

    #[test]
    fn read_rejects_short_buffer() {
        let mut buf: &[u8] = &[1, 2, 3];
        assert!(read(&mut buf).is_err());
    }
}
