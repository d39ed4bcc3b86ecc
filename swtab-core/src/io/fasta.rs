//! Homopolymer compression of FASTA/FASTQ files
//!
//! Sequences are read with needletail (gzip detected from the stream) and
//! written back as FASTA with every homopolymer run collapsed to one residue.
//! The run lengths go to a run-length table file that can later expand
//! alignments of the compressed sequences.

use std::io::{Read, Write};
use std::path::Path;

use needletail::{parse_fastx_file, parse_fastx_reader, FastxReader};

use crate::error::{Result, SwtabError};
use crate::io::rle::RleWriter;
use crate::rle::encode;

/// Totals for one encoding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub sequences: usize,
    pub residues: usize,
    pub compressed_residues: usize,
}

impl EncodeSummary {
    /// Fraction of residues kept after compression.
    pub fn ratio(&self) -> f64 {
        if self.residues == 0 {
            return 1.0;
        }
        self.compressed_residues as f64 / self.residues as f64
    }
}

fn sequence_error<E: std::fmt::Display>(e: E) -> SwtabError {
    SwtabError::Sequence(e.to_string())
}

/// Compress every sequence of a FASTA/FASTQ file.
pub fn encode_fastx_file<P, F, R>(path: P, fasta: F, rle: &mut RleWriter<R>) -> Result<EncodeSummary>
where
    P: AsRef<Path>,
    F: Write,
    R: Write,
{
    let reader = parse_fastx_file(path.as_ref()).map_err(sequence_error)?;
    encode_records(reader, fasta, rle)
}

/// Compress every sequence read from any FASTA/FASTQ source.
pub fn encode_fastx_reader<S, F, R>(source: S, fasta: F, rle: &mut RleWriter<R>) -> Result<EncodeSummary>
where
    S: Read + Send,
    F: Write,
    R: Write,
{
    let reader = parse_fastx_reader(source).map_err(sequence_error)?;
    encode_records(reader, fasta, rle)
}

fn encode_records<F, R>(
    mut reader: Box<dyn FastxReader + '_>,
    mut fasta: F,
    rle: &mut RleWriter<R>,
) -> Result<EncodeSummary>
where
    F: Write,
    R: Write,
{
    let mut summary = EncodeSummary::default();

    while let Some(record) = reader.next() {
        let record = record.map_err(sequence_error)?;
        // The name is the first word of the header, as ssearch reports it
        let header = String::from_utf8_lossy(record.id()).into_owned();
        let name = header.split_whitespace().next().unwrap_or("").to_string();
        let seq = String::from_utf8_lossy(&record.seq()).into_owned();

        let (compressed, table) = encode(&seq)?;
        writeln!(fasta, ">{}", header)?;
        writeln!(fasta, "{}", compressed)?;
        rle.write(&name, &table)?;

        summary.sequences += 1;
        summary.residues += table.expanded_len();
        summary.compressed_residues += table.len();
        log::trace!("Compressed '{}' from {} to {} residues", name, table.expanded_len(), table.len());
    }

    fasta.flush()?;
    rle.flush()?;
    Ok(summary)
}
