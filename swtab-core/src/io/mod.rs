//! File format I/O modules for swtab
//!
//! Readers and writers for ssearch36 output, run-length tables, FASTA
//! compression and the tabular output, plus opening of plain, gzipped and
//! standard streams.

pub mod fasta;
pub mod rle;
pub mod ssearch;
pub mod table;

pub use fasta::{encode_fastx_file, encode_fastx_reader, EncodeSummary};
pub use rle::{read_rle_file, read_rle_files, read_rle_tables, write_rle_table, RleWriter};
pub use ssearch::{normalize_key, SsearchReader};
pub use table::{parse_extras, parse_fieldnames, resolve_columns, write_table, TableOptions, TableWriter};

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn is_gzipped(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".gz")
}

/// Open a path for buffered reading; `None` or `-` means standard input.
/// Paths ending in `.gz` are decompressed on the fly.
pub fn open_input(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        None => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(p) if is_stdio(p) => Ok(Box::new(BufReader::new(io::stdin()))),
        Some(p) => {
            let file = File::open(p)?;
            if is_gzipped(p) {
                Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
            } else {
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// A buffered output stream, plain or gzip-compressed.
///
/// Call [`Output::finish`] once everything is written: it flushes the buffer,
/// writes the gzip trailer and reports any error doing so. Dropping an
/// unfinished stream loses those errors.
pub enum Output {
    Plain(BufWriter<Box<dyn Write>>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    pub fn finish(self) -> io::Result<()> {
        match self {
            Output::Plain(mut writer) => writer.flush(),
            Output::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Plain(writer) => writer.write(buf),
            Output::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Plain(writer) => writer.flush(),
            Output::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Open a path for buffered writing; `None` or `-` means standard output.
/// Paths ending in `.gz` are gzip-compressed.
pub fn open_output(path: Option<&Path>) -> io::Result<Output> {
    match path {
        None => Ok(Output::Plain(BufWriter::new(Box::new(io::stdout())))),
        Some(p) if is_stdio(p) => Ok(Output::Plain(BufWriter::new(Box::new(io::stdout())))),
        Some(p) => {
            let file = File::create(p)?;
            if is_gzipped(p) {
                Ok(Output::Gzip(GzEncoder::new(BufWriter::new(file), Compression::default())))
            } else {
                Ok(Output::Plain(BufWriter::new(Box::new(file))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlignmentRecord;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_plain_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        {
            let mut out = open_output(Some(&path)).unwrap();
            writeln!(out, "hello").unwrap();
            out.finish().unwrap();
        }
        let mut text = String::new();
        open_input(Some(&path)).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "hello\n");
    }

    #[test]
    fn test_gzip_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv.gz");
        {
            let mut out = open_output(Some(&path)).unwrap();
            assert!(matches!(out, Output::Gzip(_)));
            writeln!(out, "compressed line").unwrap();
            out.finish().unwrap();
        }
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let mut text = String::new();
        open_input(Some(&path)).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "compressed line\n");
    }

    #[test]
    fn test_gzip_table_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hits.csv.gz");
        let records = vec![
            AlignmentRecord::new().with_field("q_name", "q1").with_field("t_name", "t1"),
            AlignmentRecord::new().with_field("q_name", "q2").with_field("t_name", "t2"),
        ];

        let mut out = open_output(Some(&path)).unwrap();
        let rows = write_table(&mut out, records.into_iter().map(Ok), &TableOptions::default()).unwrap();
        out.finish().unwrap();
        assert_eq!(rows, 2);

        let mut text = String::new();
        open_input(Some(&path)).unwrap().read_to_string(&mut text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![r#""q_name","t_name""#, r#""q1","t1""#, r#""q2","t2""#]);
    }

    #[test]
    fn test_missing_input() {
        assert!(open_input(Some(Path::new("/nonexistent/alignments.txt"))).is_err());
    }
}
