//! TM-align report parser
//!
//! Scans the fixed-format text report produced by TM-align, extracts the
//! chain identifiers, the Chain_1-normalized TM-score, and the first
//! aligned block, then re-encodes that block as a run-length operation
//! string trimmed to end at the last matched column.

use std::io::BufRead;

use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::cigar::{encode_gapped_pair, EncodeError};
use crate::types::{EncodedAlignment, TmAlignResult, GAP};

/// Marker introducing the query structure's identifier.
pub const CHAIN1_NAME_PREFIX: &str = "Name of Chain_1:";
/// Marker introducing the target structure's identifier.
pub const CHAIN2_NAME_PREFIX: &str = "Name of Chain_2:";
/// Marker introducing a TM-score line.
pub const TM_SCORE_PREFIX: &str = "TM-score=";
/// Substring selecting the Chain_1-normalized TM-score line.
pub const CHAIN1_NORMALIZED_TAG: &str = "Chain_1";
/// Marker introducing the alignment symbol legend. The query row follows
/// on the next line, then an annotation line, then the target row.
pub const LEGEND_PREFIX: &str = "(\":\" denotes";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid aligned block: {0}")]
    InvalidAlignedBlock(#[from] EncodeError),
}

/// Parser for TM-align report text.
pub struct TmReportParser;

impl TmReportParser {
    /// Parse one TM-align report.
    ///
    /// Returns `Ok(None)` when the report contains no aligned block (no
    /// legend line). Missing chain-name or TM-score markers leave the
    /// corresponding fields unset rather than failing the parse. Only
    /// the first aligned block is consumed even if more exist, and each
    /// marker line is captured once: later occurrences never overwrite
    /// an earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidAlignedBlock`] when the two aligned
    /// rows of the block do not have the same number of columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use tmtools_core::report::TmReportParser;
    ///
    /// let report = "Name of Chain_1: q.pdb:A\n\
    ///               Name of Chain_2: t.pdb:B\n\
    ///               TM-score= 0.5 (if normalized by length of Chain_1)\n\
    ///               (\":\" denotes aligned residue pairs\n\
    ///               ACGT\n\
    ///               ::::\n\
    ///               ACGT\n";
    ///
    /// let result = TmReportParser::parse(report).unwrap().unwrap();
    /// assert_eq!(result.query.as_deref(), Some("q.pdb:A"));
    /// assert_eq!(result.cigar, "4M");
    /// ```
    pub fn parse(report: &str) -> Result<Option<TmAlignResult>, ReportError> {
        let lines: Vec<&str> = report.lines().collect();

        let mut query: Option<String> = None;
        let mut target: Option<String> = None;
        let mut tm_score: Option<f64> = None;

        for (i, line) in lines.iter().enumerate() {
            if query.is_none() && line.starts_with(CHAIN1_NAME_PREFIX) {
                query = Self::name_token(line);
            }
            if target.is_none() && line.starts_with(CHAIN2_NAME_PREFIX) {
                target = Self::name_token(line);
            }
            if tm_score.is_none()
                && line.starts_with(TM_SCORE_PREFIX)
                && line.contains(CHAIN1_NORMALIZED_TAG)
            {
                tm_score = line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|token| token.parse().ok());
            }
            if line.starts_with(LEGEND_PREFIX) {
                log::debug!("aligned block located at line {}", i + 1);
                let query_row = lines.get(i + 1).map(|s| s.trim()).unwrap_or("");
                let target_row = lines.get(i + 3).map(|s| s.trim()).unwrap_or("");
                let encoded = encode_gapped_pair(query_row, target_row)?;
                return Ok(Some(Self::trim_result(query, target, tm_score, encoded)));
            }
        }

        Ok(None)
    }

    /// Parse a report from any `BufRead` source.
    pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<Option<TmAlignResult>> {
        let mut report = String::new();
        reader.read_to_string(&mut report)?;
        Self::parse(&report).map_err(|e| anyhow!("error parsing TM-align report: {}", e))
    }

    /// Identifier on a chain-name marker line: the 4th whitespace-separated
    /// token, trimmed.
    fn name_token(line: &str) -> Option<String> {
        line.split_whitespace()
            .nth(3)
            .map(|token| token.trim().to_string())
    }

    /// Trim the encoded block at the last matched column and assemble the
    /// final result with 1-based inclusive ranges.
    fn trim_result(
        query: Option<String>,
        target: Option<String>,
        tm_score: Option<f64>,
        encoded: EncodedAlignment,
    ) -> TmAlignResult {
        let query_cols: Vec<char> = encoded.query_aligned.chars().collect();
        let target_cols: Vec<char> = encoded.target_aligned.chars().collect();

        let mut last_match_index = 0;
        let mut query_span = 0;
        let mut target_span = 0;
        for (j, (&qc, &tc)) in query_cols.iter().zip(target_cols.iter()).enumerate() {
            if qc != GAP {
                query_span += 1;
            }
            // The target span is also counted from the query row; it is
            // not derived independently from the target row.
            if qc != GAP {
                target_span += 1;
            }
            if qc != GAP && tc != GAP {
                last_match_index = j;
            }
        }

        // Drop every run after the final match run, partial or not.
        let full_cigar = encoded.cigar();
        let cigar = match full_cigar.rfind('M') {
            Some(idx) => full_cigar[..=idx].to_string(),
            None => String::new(),
        };

        let query_aligned: String = query_cols.iter().take(last_match_index + 1).collect();
        let target_aligned: String = target_cols.iter().take(last_match_index + 1).collect();

        TmAlignResult {
            query,
            target,
            query_start: encoded.query_start + 1,
            query_end: encoded.query_start + query_span + 1,
            target_start: encoded.target_start + 1,
            target_end: encoded.target_start + target_span + 1,
            cigar,
            tm_score,
            query_aligned,
            target_aligned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FULL_REPORT: &str = r#" **************************************************************************
 *                        TM-align (Version 20220412)                     *
 * An algorithm for protein structure alignment and comparison            *
 * Reference: Y Zhang and J Skolnick, Nucl Acids Res 2005 33, 2302-9      *
 * Please email comments and suggestions to yangzhanglab@umich.edu        *
 **************************************************************************

Name of Chain_1: /tmp/query.pdb:A (to be superimposed onto Chain_2)
Name of Chain_2: /tmp/target.pdb:B
Length of Chain_1: 7 residues
Length of Chain_2: 9 residues

Aligned length= 7, RMSD=   1.42, Seq_ID=n_identical/n_aligned= 1.000
TM-score= 0.83917 (if normalized by length of Chain_1, i.e., LN=7, d0=0.97)
TM-score= 0.71205 (if normalized by length of Chain_2, i.e., LN=9, d0=1.32)
(You should use TM-score normalized by length of the reference structure)

(":" denotes residue pairs of d < 5.0 Angstrom, "." denotes other aligned residues)
MKT-AYIA--
::: ::::
MKTQAYI-AA
"#;

    /// Minimal report: one legend line followed by an aligned block.
    fn report_with_rows(query_row: &str, target_row: &str) -> String {
        format!(
            "(\":\" denotes residue pairs of d < 5.0 Angstrom\n{}\n{}\n{}\n",
            query_row,
            ":".repeat(query_row.len()),
            target_row
        )
    }

    #[test]
    fn test_parse_full_report() {
        let result = TmReportParser::parse(FULL_REPORT).unwrap().unwrap();

        assert_eq!(result.query.as_deref(), Some("/tmp/query.pdb:A"));
        assert_eq!(result.target.as_deref(), Some("/tmp/target.pdb:B"));
        assert_eq!(result.tm_score, Some(0.83917));
        assert_eq!(result.query_start, 1);
        assert_eq!(result.query_end, 8);
        assert_eq!(result.target_start, 1);
        assert_eq!(result.target_end, 8);
        // The trailing 1I2D region after the final match run is dropped.
        assert_eq!(result.cigar, "3M1D3M");
        assert_eq!(result.query_aligned, "MKT-AYI");
        assert_eq!(result.target_aligned, "MKTQAYI");
    }

    #[test]
    fn test_missing_legend_returns_none() {
        let report = "Name of Chain_1: q.pdb:A\n\
                      Name of Chain_2: t.pdb:B\n\
                      TM-score= 0.5 (if normalized by length of Chain_1)\n";

        assert_eq!(TmReportParser::parse(report).unwrap(), None);
    }

    #[test]
    fn test_missing_names_and_score_tolerated() {
        // Only the Chain_2-normalized score line is present, so no field
        // before the block is captured.
        let report = format!(
            "TM-score= 0.71205 (if normalized by length of Chain_2)\n{}",
            report_with_rows("ACGT", "ACGT")
        );
        let result = TmReportParser::parse(&report).unwrap().unwrap();

        assert_eq!(result.query, None);
        assert_eq!(result.target, None);
        assert_eq!(result.tm_score, None);
        assert_eq!(result.cigar, "4M");
    }

    #[test]
    fn test_chain_name_token_extraction() {
        let report = format!(
            "Name of Chain_1: queryA.pdb:A\n{}",
            report_with_rows("AC", "AC")
        );
        let result = TmReportParser::parse(&report).unwrap().unwrap();

        assert_eq!(result.query.as_deref(), Some("queryA.pdb:A"));
    }

    #[test]
    fn test_first_marker_wins() {
        let report = format!(
            "Name of Chain_1: first.pdb:A\n\
             Name of Chain_1: second.pdb:A\n\
             Name of Chain_2: t1.pdb:B\n\
             Name of Chain_2: t2.pdb:B\n\
             TM-score= 0.41 (if normalized by length of Chain_1)\n\
             TM-score= 0.52 (if normalized by length of Chain_1, alternative)\n{}",
            report_with_rows("AC", "AC")
        );
        let result = TmReportParser::parse(&report).unwrap().unwrap();

        assert_eq!(result.query.as_deref(), Some("first.pdb:A"));
        assert_eq!(result.target.as_deref(), Some("t1.pdb:B"));
        assert_eq!(result.tm_score, Some(0.41));
    }

    #[test]
    fn test_only_first_block_consumed() {
        let report = format!(
            "{}{}",
            report_with_rows("AAAA", "AAAA"),
            report_with_rows("CCCC", "CCCC")
        );
        let result = TmReportParser::parse(&report).unwrap().unwrap();

        assert_eq!(result.query_aligned, "AAAA");
    }

    #[test]
    fn test_target_end_counts_query_row_residues() {
        // Query row has 5 residues, target row only 3. Both range ends
        // are derived from the query row count.
        let result = TmReportParser::parse(&report_with_rows("ACGTA", "AC--A"))
            .unwrap()
            .unwrap();

        assert_eq!(result.query_end, 6);
        assert_eq!(result.target_end, 6);
        assert_eq!(result.cigar, "2M2I1M");
    }

    #[test]
    fn test_trim_is_noop_without_trailing_indels() {
        let result = TmReportParser::parse(&report_with_rows("MKT-AYI", "MKTQAYI"))
            .unwrap()
            .unwrap();

        assert_eq!(result.cigar, "3M1D3M");
        assert_eq!(result.query_aligned, "MKT-AYI");
        assert_eq!(result.target_aligned, "MKTQAYI");
    }

    #[test]
    fn test_block_without_matches() {
        let result = TmReportParser::parse(&report_with_rows("A-", "-T"))
            .unwrap()
            .unwrap();

        assert_eq!(result.cigar, "");
        assert_eq!(result.query_aligned, "A");
        assert_eq!(result.target_aligned, "-");
        assert_eq!(result.query_start, 1);
        assert_eq!(result.query_end, 2);
    }

    #[test]
    fn test_report_truncated_after_legend() {
        let report = "Name of Chain_1: q.pdb:A\n(\":\" denotes residue pairs";
        let result = TmReportParser::parse(report).unwrap().unwrap();

        assert_eq!(result.query.as_deref(), Some("q.pdb:A"));
        assert_eq!(result.cigar, "");
        assert_eq!(result.query_aligned, "");
        assert_eq!(result.query_start, 1);
        assert_eq!(result.query_end, 1);
    }

    #[test]
    fn test_mismatched_rows_error() {
        let result = TmReportParser::parse(&report_with_rows("ACGT", "AC"));
        assert!(matches!(
            result,
            Err(ReportError::InvalidAlignedBlock(_))
        ));
    }

    #[test]
    fn test_parse_reader() {
        let cursor = Cursor::new(FULL_REPORT);
        let result = TmReportParser::parse_reader(cursor).unwrap().unwrap();

        assert_eq!(result.target.as_deref(), Some("/tmp/target.pdb:B"));
        assert_eq!(result.cigar, "3M1D3M");
    }
}
