//! TMtools Core Library
//!
//! Structured access to TM-align output: a run-length edit-operation
//! encoder for gapped sequence pairs and a parser for the fixed-format
//! TM-align text report. The alignment engine itself is an external
//! collaborator; this crate only consumes the report text it produces.

pub mod types;
pub mod cigar;
pub mod report;

// Re-export commonly used types and functions
pub use types::{AlignOp, EncodedAlignment, OpRun, Position, TmAlignResult, GAP};
pub use cigar::{encode_gapped_pair, EncodeError};
pub use report::{ReportError, TmReportParser};

/// Version information for the TMtools core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
