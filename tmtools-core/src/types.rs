use serde::{Deserialize, Serialize};

/// Residue index or count within a single (ungapped) sequence.
pub type Position = usize;

/// Symbol marking an empty column position in a gapped aligned row.
pub const GAP: char = '-';

/// Edit operation relating one alignment column of a query/target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignOp {
    /// Both rows hold a residue.
    Match,
    /// Residue in the query row, gap in the target row.
    Insertion,
    /// Gap in the query row, residue in the target row.
    Deletion,
}

impl AlignOp {
    /// Single-character CIGAR code.
    pub fn code(self) -> char {
        match self {
            AlignOp::Match => 'M',
            AlignOp::Insertion => 'I',
            AlignOp::Deletion => 'D',
        }
    }
}

impl From<AlignOp> for char {
    fn from(op: AlignOp) -> Self {
        op.code()
    }
}

/// A maximal run of identical edit operations, rendered as `<len><code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpRun {
    pub len: usize,
    pub op: AlignOp,
}

/// Output of the alignment encoder for one gapped pair.
///
/// `query_start` / `target_start` are 0-based offsets into each row's
/// ungapped residues, anchored at the first matched column. The aligned
/// rows keep every column from that anchor onward, including indel runs
/// trailing past the final match; trimming those is the report parser's
/// job. When the pair contains no matched column at all, `ops` is empty,
/// both offsets are zero, and the rows hold every column of the input —
/// the two are not length-consistent in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedAlignment {
    pub ops: Vec<OpRun>,
    pub query_start: Position,
    pub target_start: Position,
    pub query_aligned: String,
    pub target_aligned: String,
}

impl EncodedAlignment {
    /// Render the run-length operation string (e.g. `"3M1D4M"`).
    pub fn cigar(&self) -> String {
        crate::cigar::cigar_string(&self.ops)
    }
}

/// Structured result of parsing one TM-align report.
///
/// Ranges are 1-based and inclusive. `query` / `target` / `tm_score`
/// are `None` when the corresponding marker line is absent from the
/// report. `cigar` and the aligned rows are trimmed to end at the last
/// column where both rows hold a residue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmAlignResult {
    pub query: Option<String>,
    pub target: Option<String>,
    pub query_start: Position,
    pub query_end: Position,
    pub target_start: Position,
    pub target_end: Position,
    pub cigar: String,
    pub tm_score: Option<f64>,
    pub query_aligned: String,
    pub target_aligned: String,
}
