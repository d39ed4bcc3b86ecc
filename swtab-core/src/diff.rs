//! Per-position comparison of the aligned regions of a record.

use crate::ambiguity::is_similar;
use crate::error::{Result, SwtabError};
use crate::types::{AlignmentRecord, GAP};

/// Marker written into both diff strings where the residues are compatible.
pub const MATCH_MARK: char = '.';

/// Extract the aligned regions of `q_seq` and `t_seq` and annotate them.
///
/// Returns a copy of `align` with `q_diff` and `t_diff` set: `.` where the
/// query and target residues are compatible under the IUPAC ambiguity rules,
/// the lower-cased residues otherwise.
pub fn add_diff(align: &AlignmentRecord) -> Result<AlignmentRecord> {
    let q_start = align.require_usize("q_al_start")?;
    let q_stop = align.require_usize("q_al_stop")?;
    let t_start = align.require_usize("t_al_start")?;
    let t_stop = align.require_usize("t_al_stop")?;

    let q_region = aligned_region(align.require("q_seq")?, q_start, q_stop);
    let t_region = aligned_region(align.require("t_seq")?, t_start, t_stop);

    if q_region.len() != t_region.len() {
        return Err(SwtabError::CoordinateMismatch {
            query: q_region.len(),
            target: t_region.len(),
        });
    }

    let (q_diff, t_diff) = diff_strings(&q_region, &t_region);

    let mut annotated = align.clone();
    annotated.insert("q_diff", q_diff);
    annotated.insert("t_diff", t_diff);
    Ok(annotated)
}

/// Annotate two equal-length residue slices.
pub fn diff_strings(query: &[char], target: &[char]) -> (String, String) {
    query
        .iter()
        .zip(target)
        .map(|(&q, &t)| {
            if is_similar(q, t) {
                (MATCH_MARK, MATCH_MARK)
            } else {
                (q.to_ascii_lowercase(), t.to_ascii_lowercase())
            }
        })
        .unzip()
}

// 1-based inclusive [start, stop] of the gap-trimmed sequence, clamped to its length
fn aligned_region(seq: &str, start: usize, stop: usize) -> Vec<char> {
    let trimmed: Vec<char> = seq.trim_matches(GAP).chars().collect();
    let begin = start.saturating_sub(1).min(trimmed.len());
    let end = stop.min(trimmed.len()).max(begin);
    trimmed[begin..end].to_vec()
}
