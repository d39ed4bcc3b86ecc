//! Record selection and aggregation stages
//!
//! Every stage is a lazy iterator over `Result<AlignmentRecord>`: nothing is
//! read until the consumer asks for the next record, and an error travels
//! down the chain as an item so the consumer aborts on it. Stages, in order:
//!
//! 1. row cap (`limit`), applied to the raw parsed stream
//! 2. `sw_zscore` filter
//! 3. grouping by contiguous `q_name` (top record per query, or all)
//! 4. run-length decoding of `q_seq`/`t_seq`
//! 5. diff annotation (see [`annotate`]; kept separate so a caller can inspect
//!    the decoded stream before it)

use crate::diff::add_diff;
use crate::error::{Result, Side, SwtabError};
use crate::rle::{decode_alignment, AlignedSpan, RunLengthTable, RunLengthTables, RunPadding};
use crate::types::AlignmentRecord;

/// A boxed lazy record stream.
pub type Records<'a> = Box<dyn Iterator<Item = Result<AlignmentRecord>> + 'a>;

/// Which records of a group of same-query alignments are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// Every record, in input order
    #[default]
    All,
    /// Only the first record of each query, assumed best by the aligner
    Top,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Keep at most this many parsed records
    pub limit: Option<usize>,
    /// Drop records with `sw_zscore` below this value
    pub min_zscore: Option<f64>,
    pub group_mode: GroupMode,
    /// Run-length tables for homopolymer decoding
    pub rle: Option<RunLengthTables>,
    pub padding: RunPadding,
    /// Add `q_diff`/`t_diff`
    pub with_diff: bool,
}

/// Iterator with a single-element pushback buffer.
///
/// A consumer can take an item, look at it, and hand it back so it is
/// returned again by the next call to `next`.
pub struct Pushback<I: Iterator> {
    inner: I,
    buffer: Option<I::Item>,
}

impl<I: Iterator> Pushback<I> {
    pub fn new(inner: I) -> Self {
        Self { inner, buffer: None }
    }

    /// Return `item` to the front of the stream. Only one item can be held.
    pub fn push_back(&mut self, item: I::Item) {
        debug_assert!(self.buffer.is_none(), "pushback buffer already occupied");
        self.buffer = Some(item);
    }
}

impl<I: Iterator> Iterator for Pushback<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.take().or_else(|| self.inner.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let extra = usize::from(self.buffer.is_some());
        let (lower, upper) = self.inner.size_hint();
        (lower.saturating_add(extra), upper.and_then(|u| u.checked_add(extra)))
    }
}

/// Keeps records whose `sw_zscore` is at least `min_zscore`.
pub struct ScoreFilter<I> {
    inner: I,
    min_zscore: f64,
    dropped: usize,
}

impl<I> ScoreFilter<I> {
    pub fn new(inner: I, min_zscore: f64) -> Self {
        Self { inner, min_zscore, dropped: 0 }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<I: Iterator<Item = Result<AlignmentRecord>>> Iterator for ScoreFilter<I> {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.inner.next() {
                Some(Ok(record)) => record,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    log::debug!("Score filter dropped {} alignments", self.dropped);
                    return None;
                }
            };
            match record.require_f64("sw_zscore") {
                Ok(z) if z >= self.min_zscore => return Some(Ok(record)),
                Ok(_) => self.dropped += 1,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Partitions the stream into runs of records sharing `q_name`.
///
/// Records of one query must already be adjacent; the stream is never
/// re-sorted, and only the key of the open group is remembered.
pub struct GroupByQuery<I> {
    inner: I,
    mode: GroupMode,
    current: Option<String>,
    groups: usize,
}

impl<I> GroupByQuery<I> {
    pub fn new(inner: I, mode: GroupMode) -> Self {
        Self {
            inner,
            mode,
            current: None,
            groups: 0,
        }
    }

    /// Number of groups opened so far.
    pub fn groups(&self) -> usize {
        self.groups
    }
}

impl<I: Iterator<Item = Result<AlignmentRecord>>> Iterator for GroupByQuery<I> {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.inner.next() {
                Some(Ok(record)) => record,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    log::debug!("Grouped alignments into {} queries", self.groups);
                    return None;
                }
            };
            let q_name = match record.require("q_name") {
                Ok(q_name) => q_name,
                Err(e) => return Some(Err(e)),
            };

            let same_group = self.current.as_deref() == Some(q_name);
            if !same_group {
                self.current = Some(q_name.to_string());
                self.groups += 1;
            }

            match self.mode {
                GroupMode::All => return Some(Ok(record)),
                GroupMode::Top if !same_group => return Some(Ok(record)),
                GroupMode::Top => continue,
            }
        }
    }
}

/// Coordinates of one row of an alignment, from the `q_`/`t_` fields.
fn aligned_span(align: &AlignmentRecord, prefix: &str) -> Result<AlignedSpan> {
    let field = |name: &str| format!("{}{}", prefix, name);
    let mut span = AlignedSpan::new(
        align.require_usize(&field("al_start"))?,
        align.require_usize(&field("al_stop"))?,
    );
    span.display_start = align.optional_usize(&field("al_display_start"))?;
    span.seq_len = align.optional_usize(&field("sq_len"))?;
    Ok(span)
}

fn decode_rows(
    align: &AlignmentRecord,
    q_table: &RunLengthTable,
    t_table: &RunLengthTable,
    padding: RunPadding,
) -> Result<(String, String)> {
    let q_seq = align.require("q_seq")?;
    let t_seq = align.require("t_seq")?;
    let q_runs = aligned_span(align, "q_")?.runs(Side::Query, q_table, q_seq)?;
    let t_runs = aligned_span(align, "t_")?.runs(Side::Target, t_table, t_seq)?;
    decode_alignment(q_seq, q_runs, t_seq, t_runs, padding)
}

/// Replace `q_seq`/`t_seq` with their homopolymer-decoded forms.
///
/// Each table must describe the sequence the aligner saw: its length must
/// match `sq_len` when present, and the aligned row must cover the
/// `al_start`..`al_stop` residues counted from `al_display_start`.
pub fn decode_record(
    mut align: AlignmentRecord,
    tables: &RunLengthTables,
    padding: RunPadding,
) -> Result<AlignmentRecord> {
    let q_name = align.require("q_name")?;
    let t_name = align.require("t_name")?;
    let q_table = tables.get(q_name)?;
    let t_table = tables.get(t_name)?;

    let (q_seq, t_seq) = decode_rows(&align, q_table, t_table, padding).map_err(|e| SwtabError::Decode {
        query: q_name.to_string(),
        target: t_name.to_string(),
        source: Box::new(e),
    })?;

    align.insert("q_seq", q_seq);
    align.insert("t_seq", t_seq);
    Ok(align)
}

/// Apply cap, score filter, grouping and decoding to a parsed stream.
pub fn select<'a, I>(records: I, options: &'a PipelineOptions) -> Records<'a>
where
    I: Iterator<Item = Result<AlignmentRecord>> + 'a,
{
    let mut stream: Records<'a> = Box::new(records);

    if let Some(limit) = options.limit {
        log::debug!("Limiting input to {} alignments", limit);
        stream = Box::new(stream.take(limit));
    }

    if let Some(min_zscore) = options.min_zscore {
        log::debug!("Excluding alignments with sw_zscore < {}", min_zscore);
        stream = Box::new(ScoreFilter::new(stream, min_zscore));
    }

    stream = Box::new(GroupByQuery::new(stream, options.group_mode));

    if let Some(tables) = &options.rle {
        let padding = options.padding;
        stream = Box::new(stream.map(move |r| r.and_then(|align| decode_record(align, tables, padding))));
    }

    stream
}

/// Add diff annotation when requested.
pub fn annotate<'a>(records: Records<'a>, with_diff: bool) -> Records<'a> {
    if with_diff {
        Box::new(records.map(|r| r.and_then(|align| add_diff(&align))))
    } else {
        records
    }
}

/// [`select`] followed by [`annotate`].
pub fn build<'a, I>(records: I, options: &'a PipelineOptions) -> Records<'a>
where
    I: Iterator<Item = Result<AlignmentRecord>> + 'a,
{
    annotate(select(records, options), options.with_diff)
}
