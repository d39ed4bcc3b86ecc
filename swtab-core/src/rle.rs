//! Homopolymer run-length codec
//!
//! A homopolymer-compressed sequence keeps one residue per run; the run
//! lengths live in a separate [`RunLengthTable`] stored as a compact ASCII
//! code with one printable byte per compressed residue (count = byte - 33,
//! so `'"'` is a run of 1 and `'~'` a run of 93). Longer runs cannot be
//! represented and are rejected when encoding.

use std::collections::HashMap;

use crate::error::{Result, Side, SwtabError};
use crate::types::GAP;

/// Offset added to a run count to obtain its ASCII code.
pub const RUN_CODE_OFFSET: u8 = 33;

/// Longest run a single code byte can hold.
pub const MAX_RUN: u32 = (b'~' - RUN_CODE_OFFSET) as u32;

/// How the decoder lines up the two rows of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPadding {
    /// Expand each row independently; rows may end up with different lengths.
    #[default]
    None,
    /// Pad the shorter expansion of every column with gaps so both rows keep
    /// the same length and stay column-aligned.
    Synchronize,
}

/// Run counts for one compressed sequence, in residue order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLengthTable {
    runs: Vec<u32>,
}

impl RunLengthTable {
    pub fn new(runs: Vec<u32>) -> Self {
        Self { runs }
    }

    /// Decode the compact ASCII form.
    pub fn from_ascii(code: &str) -> Result<Self> {
        let runs = code
            .bytes()
            .enumerate()
            .map(|(offset, byte)| {
                if byte > RUN_CODE_OFFSET && byte <= b'~' {
                    Ok((byte - RUN_CODE_OFFSET) as u32)
                } else {
                    Err(SwtabError::InvalidRunCode { byte, offset })
                }
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(Self { runs })
    }

    /// Encode into the compact ASCII form.
    pub fn to_ascii(&self) -> Result<String> {
        self.runs
            .iter()
            .map(|&run| {
                if run == 0 || run > MAX_RUN {
                    Err(SwtabError::RunTooLong { length: run as usize, max: MAX_RUN })
                } else {
                    Ok((run as u8 + RUN_CODE_OFFSET) as char)
                }
            })
            .collect()
    }

    pub fn runs(&self) -> &[u32] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Length of the sequence before compression.
    pub fn expanded_len(&self) -> usize {
        self.runs.iter().map(|&r| r as usize).sum()
    }
}

/// Run-length tables keyed by sequence name.
#[derive(Debug, Clone, Default)]
pub struct RunLengthTables {
    tables: HashMap<String, RunLengthTable>,
}

impl RunLengthTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the table for `name`.
    pub fn insert<S: Into<String>>(&mut self, name: S, table: RunLengthTable) -> Option<RunLengthTable> {
        self.tables.insert(name.into(), table)
    }

    pub fn get(&self, name: &str) -> Result<&RunLengthTable> {
        self.tables
            .get(name)
            .ok_or_else(|| SwtabError::unknown_sequence(name))
    }

    /// Merge `other` into `self`; entries of `other` win.
    pub fn extend(&mut self, other: RunLengthTables) {
        self.tables.extend(other.tables);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Collapse homopolymer runs of `seq` into one residue each.
pub fn encode(seq: &str) -> Result<(String, RunLengthTable)> {
    let mut compressed = String::new();
    let mut runs: Vec<u32> = Vec::new();
    let mut chars = seq.chars().peekable();

    while let Some(c) = chars.next() {
        let mut length = 1usize;
        while chars.next_if_eq(&c).is_some() {
            length += 1;
        }
        if length > MAX_RUN as usize {
            return Err(SwtabError::RunTooLong { length, max: MAX_RUN });
        }
        compressed.push(c);
        runs.push(length as u32);
    }

    Ok((compressed, RunLengthTable::new(runs)))
}

/// Expand one aligned compressed sequence.
///
/// Gaps are copied through and consume no run; every other character consumes
/// the next run of `table`. Exhaustion is reported against [`Side::Query`].
pub fn decode_sequence(aligned: &str, table: &RunLengthTable) -> Result<String> {
    let mut runs = table.runs().iter().copied();
    let mut out = String::with_capacity(table.expanded_len() + aligned.len());
    for (column, c) in aligned.chars().enumerate() {
        expand_column(&mut out, c, &mut runs)
            .ok_or(SwtabError::RunTableExhausted { side: Side::Query, column })?;
    }
    Ok(out)
}

/// Where an aligned row sits in its sequence, as 1-based residue positions
/// of the compressed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedSpan {
    /// First residue printed in the aligned row; defaults to `al_start`
    pub display_start: Option<usize>,
    pub al_start: usize,
    pub al_stop: usize,
    /// Declared sequence length, when the aligner reports it
    pub seq_len: Option<usize>,
}

impl AlignedSpan {
    pub fn new(al_start: usize, al_stop: usize) -> Self {
        Self {
            display_start: None,
            al_start,
            al_stop,
            seq_len: None,
        }
    }

    pub fn with_display_start(mut self, display_start: usize) -> Self {
        self.display_start = Some(display_start);
        self
    }

    pub fn with_seq_len(mut self, seq_len: usize) -> Self {
        self.seq_len = Some(seq_len);
        self
    }

    /// Check `table` and the aligned row against the coordinates and return
    /// the runs starting at the first displayed residue.
    ///
    /// The table must have one entry per residue of the declared sequence,
    /// the displayed residues must start inside the table, and they must
    /// cover the aligned region exactly (or, with a display start, at least
    /// reach `al_stop`).
    pub fn runs<'t>(&self, side: Side, table: &'t RunLengthTable, aligned: &str) -> Result<&'t [u32]> {
        if let Some(seq_len) = self.seq_len {
            if seq_len != table.len() {
                return Err(SwtabError::RunTableLength {
                    side,
                    table: table.len(),
                    sequence: seq_len,
                });
            }
        }

        let display_start = self.display_start.unwrap_or(self.al_start);
        let residues = aligned.chars().filter(|&c| c != GAP).count();
        let mismatch = || SwtabError::SpanMismatch {
            side,
            residues,
            start: self.al_start,
            stop: self.al_stop,
        };

        if display_start == 0 || self.al_start < display_start || self.al_stop < self.al_start {
            return Err(mismatch());
        }
        let offset = display_start - 1;
        let shown_stop = offset + residues;
        let covers = match self.display_start {
            Some(_) => shown_stop >= self.al_stop,
            None => shown_stop == self.al_stop,
        };
        if !covers {
            return Err(mismatch());
        }

        table.runs().get(offset..).ok_or(SwtabError::RunTableOffset {
            side,
            start: display_start,
            len: table.len(),
        })
    }
}

/// Expand both rows of an aligned pair of compressed sequences in lock-step.
///
/// `query_runs` and `target_runs` start at the first residue shown in each
/// row; see [`AlignedSpan::runs`]. Unused trailing runs belong to residues
/// after the displayed region.
pub fn decode_alignment(
    query: &str,
    query_runs: &[u32],
    target: &str,
    target_runs: &[u32],
    padding: RunPadding,
) -> Result<(String, String)> {
    let query_columns = query.chars().count();
    let target_columns = target.chars().count();
    if query_columns != target_columns {
        return Err(SwtabError::AlignmentLengthMismatch {
            query: query_columns,
            target: target_columns,
        });
    }

    let mut q_runs = query_runs.iter().copied();
    let mut t_runs = target_runs.iter().copied();
    let mut q_out = String::with_capacity(query_columns * 2);
    let mut t_out = String::with_capacity(target_columns * 2);

    for (column, (qc, tc)) in query.chars().zip(target.chars()).enumerate() {
        let q_width = expand_column(&mut q_out, qc, &mut q_runs)
            .ok_or(SwtabError::RunTableExhausted { side: Side::Query, column })?;
        let t_width = expand_column(&mut t_out, tc, &mut t_runs)
            .ok_or(SwtabError::RunTableExhausted { side: Side::Target, column })?;

        if padding == RunPadding::Synchronize {
            let width = q_width.max(t_width);
            q_out.extend(std::iter::repeat(GAP).take(width - q_width));
            t_out.extend(std::iter::repeat(GAP).take(width - t_width));
        }
    }

    log::trace!(
        "Runs after the displayed region: query {}, target {}",
        q_runs.count(),
        t_runs.count()
    );

    Ok((q_out, t_out))
}

// Returns the number of characters written, or None when the runs ran out.
fn expand_column<I: Iterator<Item = u32>>(out: &mut String, c: char, runs: &mut I) -> Option<usize> {
    if c == GAP {
        out.push(GAP);
        return Some(1);
    }
    let run = runs.next()? as usize;
    out.extend(std::iter::repeat(c).take(run));
    Some(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_sequence_runs(aligned: &str, runs: &[u32]) -> String {
        decode_sequence(aligned, &RunLengthTable::new(runs.to_vec())).unwrap()
    }

    #[test]
    fn test_ascii_codes() {
        let table = RunLengthTable::from_ascii("\"$~").unwrap();
        assert_eq!(table.runs(), &[1, 3, 93]);
        assert_eq!(table.to_ascii().unwrap(), "\"$~");
        assert_eq!(table.expanded_len(), 97);
    }

    #[test]
    fn test_invalid_code() {
        assert!(matches!(
            RunLengthTable::from_ascii("\"!"),
            Err(SwtabError::InvalidRunCode { byte: b'!', offset: 1 })
        ));
        assert!(RunLengthTable::from_ascii(" ").is_err());
    }

    #[test]
    fn test_encode() {
        let (compressed, table) = encode("AAACCGTTTT").unwrap();
        assert_eq!(compressed, "ACGT");
        assert_eq!(table.runs(), &[3, 2, 1, 4]);
    }

    #[test]
    fn test_encode_run_too_long() {
        let seq = "A".repeat(94);
        assert!(matches!(encode(&seq), Err(SwtabError::RunTooLong { length: 94, .. })));
        assert!(encode(&"A".repeat(93)).is_ok());
    }

    #[test]
    fn test_decode_keeps_internal_gap() {
        let table = RunLengthTable::new(vec![3, 2, 1]);
        assert_eq!(decode_sequence("A-CG", &table).unwrap(), "AAA-CCG");
    }

    #[test]
    fn test_decode_alignment_independent_rows() {
        let q = RunLengthTable::new(vec![3, 2, 1]);
        let t = RunLengthTable::new(vec![1, 1, 4]);
        let (q_out, t_out) = decode_alignment("A-CG", q.runs(), "AT-G", t.runs(), RunPadding::None).unwrap();
        assert_eq!(q_out, "AAA-CCG");
        assert_eq!(t_out, "AT-GGGG");
    }

    #[test]
    fn test_decode_alignment_synchronized_rows() {
        let q = RunLengthTable::new(vec![3, 2, 1]);
        let t = RunLengthTable::new(vec![1, 1, 4]);
        let (q_out, t_out) =
            decode_alignment("A-CG", q.runs(), "AT-G", t.runs(), RunPadding::Synchronize).unwrap();
        assert_eq!(q_out, "AAA-CCG---");
        assert_eq!(t_out, "A--T--GGGG");
        assert_eq!(q_out.len(), t_out.len());
    }

    #[test]
    fn test_decode_exhausted_table() {
        let q = RunLengthTable::new(vec![1, 1]);
        let t = RunLengthTable::new(vec![1, 1, 1]);
        let err = decode_alignment("ACG", q.runs(), "ACG", t.runs(), RunPadding::None).unwrap_err();
        assert!(matches!(
            err,
            SwtabError::RunTableExhausted { side: Side::Query, column: 2 }
        ));
    }

    #[test]
    fn test_decode_length_mismatch() {
        let table = RunLengthTable::new(vec![1, 1, 1]);
        let err = decode_alignment("ACG", table.runs(), "AC", table.runs(), RunPadding::None).unwrap_err();
        assert!(matches!(
            err,
            SwtabError::AlignmentLengthMismatch { query: 3, target: 2 }
        ));
    }

    #[test]
    fn test_span_skips_runs_before_display_start() {
        let table = RunLengthTable::new(vec![1, 1, 2, 2]);
        let span = AlignedSpan::new(3, 4).with_display_start(3).with_seq_len(4);
        let runs = span.runs(Side::Target, &table, "GT").unwrap();
        assert_eq!(runs, &[2, 2]);
        assert_eq!(decode_sequence_runs("GT", runs), "GGTT");

        // Without a display start the row begins at al_start
        let runs = AlignedSpan::new(2, 3).runs(Side::Query, &table, "C-G").unwrap();
        assert_eq!(runs, &[1, 2, 2]);
    }

    #[test]
    fn test_span_display_context_past_stop() {
        let table = RunLengthTable::new(vec![1; 6]);
        let span = AlignedSpan::new(2, 3).with_display_start(1);
        assert_eq!(span.runs(Side::Query, &table, "ACGTA").unwrap().len(), 6);
        assert!(matches!(
            span.runs(Side::Query, &table, "A-"),
            Err(SwtabError::SpanMismatch { side: Side::Query, residues: 1, start: 2, stop: 3 })
        ));
    }

    #[test]
    fn test_span_rejects_table_of_other_sequence() {
        let table = RunLengthTable::new(vec![5; 6]);
        let err = AlignedSpan::new(1, 2)
            .with_seq_len(2)
            .runs(Side::Query, &table, "AC")
            .unwrap_err();
        assert!(matches!(
            err,
            SwtabError::RunTableLength { side: Side::Query, table: 6, sequence: 2 }
        ));

        // Residue count disagrees with the aligned region
        let err = AlignedSpan::new(1, 5).runs(Side::Target, &table, "AC").unwrap_err();
        assert!(matches!(err, SwtabError::SpanMismatch { residues: 2, .. }));
    }

    #[test]
    fn test_span_display_start_beyond_table() {
        let table = RunLengthTable::new(vec![1, 1]);
        let span = AlignedSpan::new(4, 4).with_display_start(4);
        assert!(matches!(
            span.runs(Side::Target, &table, "A"),
            Err(SwtabError::RunTableOffset { side: Side::Target, start: 4, len: 2 })
        ));
        assert!(AlignedSpan::new(2, 1).runs(Side::Query, &table, "").is_err());
        assert!(AlignedSpan::new(1, 1).with_display_start(0).runs(Side::Query, &table, "A").is_err());
    }

    #[test]
    fn test_tables_lookup() {
        let mut tables = RunLengthTables::new();
        tables.insert("s1", RunLengthTable::new(vec![2]));
        assert_eq!(tables.get("s1").unwrap().runs(), &[2]);
        assert!(matches!(tables.get("s2"), Err(SwtabError::UnknownSequence { .. })));

        let mut other = RunLengthTables::new();
        other.insert("s1", RunLengthTable::new(vec![5]));
        tables.extend(other);
        assert_eq!(tables.get("s1").unwrap().runs(), &[5]);
    }

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(seq in "[ACGTN]{0,200}") {
            let (compressed, table) = encode(&seq).unwrap();
            let code = table.to_ascii().unwrap();
            let table = RunLengthTable::from_ascii(&code).unwrap();

            let expanded = decode_sequence(&compressed, &table).unwrap();
            prop_assert_eq!(&expanded, &seq);

            let (recompressed, again) = encode(&expanded).unwrap();
            prop_assert_eq!(recompressed, compressed);
            prop_assert_eq!(again.to_ascii().unwrap(), code);
        }
    }
}
