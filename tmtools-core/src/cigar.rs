//! Run-length edit-operation encoding of gapped alignment pairs.
//!
//! Turns two equal-length gapped rows (as emitted in a TM-align report
//! block) into a compact CIGAR-style operation list, the ungapped start
//! offsets of the aligned region, and the aligned rows with any leading
//! indel columns discarded.

use thiserror::Error;

use crate::types::{AlignOp, EncodedAlignment, OpRun, GAP};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("aligned rows differ in length: query has {query} columns, target has {target}")]
    LengthMismatch { query: usize, target: usize },
}

/// Encoder phase: leading indel columns are provisional until the first
/// matched column anchors the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeFirstMatch,
    AfterFirstMatch,
}

/// Classify one alignment column.
///
/// A column with a gap in both rows is not meaningful input; it falls
/// into the deletion arm.
fn classify(query: char, target: char) -> AlignOp {
    if query != GAP && target != GAP {
        AlignOp::Match
    } else if query == GAP {
        AlignOp::Deletion
    } else {
        AlignOp::Insertion
    }
}

/// Extend the current run or start a new one.
fn push_op(ops: &mut Vec<OpRun>, op: AlignOp) {
    match ops.last_mut() {
        Some(run) if run.op == op => run.len += 1,
        _ => ops.push(OpRun { len: 1, op }),
    }
}

/// Encode a pair of equal-length gapped rows into an [`EncodedAlignment`].
///
/// Columns are classified left to right as match, insertion, or deletion.
/// Runs of insertions or deletions before the first matched column are
/// discarded: the operation list starts at that column, and the start
/// offsets record how many residues each row had consumed when it was
/// reached. The aligned rows keep every column from the first match
/// onward, including indel runs trailing past the final match.
///
/// A pair with no matched column yields an empty operation list, zero
/// offsets, and aligned rows holding every input column.
///
/// # Errors
///
/// Returns [`EncodeError::LengthMismatch`] when the rows do not have the
/// same number of columns.
///
/// # Examples
///
/// ```
/// use tmtools_core::cigar::encode_gapped_pair;
///
/// let enc = encode_gapped_pair("--ACGT", "TTACGT").unwrap();
/// assert_eq!(enc.cigar(), "4M");
/// assert_eq!(enc.query_start, 0);
/// assert_eq!(enc.target_start, 2);
/// ```
pub fn encode_gapped_pair(query: &str, target: &str) -> Result<EncodedAlignment, EncodeError> {
    let query_cols: Vec<char> = query.chars().collect();
    let target_cols: Vec<char> = target.chars().collect();

    if query_cols.len() != target_cols.len() {
        return Err(EncodeError::LengthMismatch {
            query: query_cols.len(),
            target: target_cols.len(),
        });
    }

    let mut ops: Vec<OpRun> = Vec::new();
    let mut query_aligned = String::new();
    let mut target_aligned = String::new();
    let mut query_pos = 0;
    let mut target_pos = 0;
    let mut query_start = 0;
    let mut target_start = 0;
    let mut phase = Phase::BeforeFirstMatch;

    for (&qc, &tc) in query_cols.iter().zip(target_cols.iter()) {
        let op = classify(qc, tc);

        if phase == Phase::BeforeFirstMatch && op == AlignOp::Match {
            // First matched column: drop the provisional leading indel
            // columns and anchor both start offsets here.
            query_aligned.clear();
            target_aligned.clear();
            query_start = query_pos;
            target_start = target_pos;
            phase = Phase::AfterFirstMatch;
        }

        if phase == Phase::AfterFirstMatch {
            push_op(&mut ops, op);
        }

        // The row accumulators are appended unconditionally, so a pair
        // with no matched column still retains every column here.
        match op {
            AlignOp::Match => {
                query_aligned.push(qc);
                target_aligned.push(tc);
                query_pos += 1;
                target_pos += 1;
            }
            AlignOp::Insertion => {
                query_aligned.push(qc);
                target_aligned.push(GAP);
                query_pos += 1;
            }
            AlignOp::Deletion => {
                query_aligned.push(GAP);
                target_aligned.push(tc);
                target_pos += 1;
            }
        }
    }

    Ok(EncodedAlignment {
        ops,
        query_start,
        target_start,
        query_aligned,
        target_aligned,
    })
}

/// Render operation runs as a compact string (e.g. `"3M1D4M"`).
///
/// An empty slice renders as the empty string.
pub fn cigar_string(ops: &[OpRun]) -> String {
    let mut s = String::new();
    for run in ops {
        s.push_str(&run.len.to_string());
        s.push(run.op.code());
    }
    s
}

/// Number of query residues consumed by the operations (M + I).
pub fn query_consumed(ops: &[OpRun]) -> usize {
    ops.iter()
        .filter(|run| matches!(run.op, AlignOp::Match | AlignOp::Insertion))
        .map(|run| run.len)
        .sum()
}

/// Number of target residues consumed by the operations (M + D).
pub fn target_consumed(ops: &[OpRun]) -> usize {
    ops.iter()
        .filter(|run| matches!(run.op, AlignOp::Match | AlignOp::Deletion))
        .map(|run| run.len)
        .sum()
}
