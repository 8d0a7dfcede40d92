//! Inspection tools for field-path chunks.
//!
//! This crate backs the `fpdec-tools` binary:
//!
//! - Decode a chunk from a capture file and print its paths
//! - Dump the operation table with its Huffman codes
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see which operations a chunk used.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use bitstream::BitReader;
use fieldpath::{
    field_path_tree, DecodeLimits, FieldOp, FieldPath, FieldPathDecoder, FieldPathState,
    LogTrace, TraceSink,
};
use serde::Serialize;

/// Options for [`decode_chunk`].
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Bit offset of the chunk within the input.
    pub offset_bits: usize,
    /// Limits applied to the decode.
    pub limits: DecodeLimits,
    /// Forward every operation to the `log` facade.
    pub trace: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            offset_bits: 0,
            limits: DecodeLimits::unlimited(),
            trace: false,
        }
    }
}

/// Result of decoding one chunk.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Decoded paths, in stream order.
    pub paths: Vec<FieldPath>,
    /// Names of the operations applied, terminal included.
    pub ops: Vec<&'static str>,
    /// Reader position after the terminal operation.
    pub bit_position: usize,
    /// Bits consumed by the chunk.
    pub bits_used: usize,
    /// Bits available in the input.
    pub bits_total: usize,
}

/// One row of the operation table.
#[derive(Debug, Clone, Serialize)]
pub struct CodeEntry {
    pub index: usize,
    pub name: &'static str,
    pub weight: u32,
    pub code: String,
}

struct ReportTrace {
    ops: Vec<&'static str>,
    log: bool,
}

impl TraceSink for ReportTrace {
    fn before(&mut self, op: FieldOp, state: &FieldPathState, bit_position: usize) {
        if self.log {
            LogTrace.before(op, state, bit_position);
        }
    }

    fn after(&mut self, op: FieldOp, state: &FieldPathState, bit_position: usize) {
        self.ops.push(op.name());
        if self.log {
            LogTrace.after(op, state, bit_position);
        }
    }
}

/// Decodes the chunk starting `options.offset_bits` into `bytes`.
pub fn decode_chunk(bytes: &[u8], options: &DecodeOptions) -> Result<DecodeReport> {
    let mut reader = BitReader::with_bit_offset(bytes, options.offset_bits)
        .with_context(|| format!("seek to bit {}", options.offset_bits))?;
    let mut sink = ReportTrace {
        ops: Vec::new(),
        log: options.trace,
    };
    let mut paths = Vec::new();
    let decoder = FieldPathDecoder::new().with_limits(options.limits.clone());
    if let Err(err) = decoder.decode_into(&mut reader, &mut sink, &mut paths) {
        log::debug!(
            "decode failed after {} paths at bit {}",
            paths.len(),
            reader.bit_position()
        );
        return Err(err).context("decode field paths");
    }

    let bit_position = reader.bit_position();
    Ok(DecodeReport {
        paths,
        ops: sink.ops,
        bit_position,
        bits_used: bit_position - options.offset_bits,
        bits_total: bytes.len() * 8,
    })
}

/// Returns the operation table with each operation's code.
pub fn code_table() -> Vec<CodeEntry> {
    let tree = field_path_tree();
    FieldOp::ALL
        .iter()
        .map(|op| CodeEntry {
            index: op.index(),
            name: op.name(),
            weight: op.weight(),
            code: tree
                .code(op.index())
                .map(|code| code.to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Formats a decode report as one path per line.
pub fn format_decode_text(report: &DecodeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "paths: {} ops: {} bits: {}..{} of {}",
        report.paths.len(),
        report.ops.len(),
        report.bit_position - report.bits_used,
        report.bit_position,
        report.bits_total
    );
    for (i, path) in report.paths.iter().enumerate() {
        let _ = writeln!(out, "  {i:>4}: {path}");
    }
    out
}

/// Formats the code table as aligned columns.
pub fn format_code_table(entries: &[CodeEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:>2} {:<width$} {:>6} {}",
            entry.index, entry.name, entry.weight, entry.code
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reports_paths_and_position() {
        let report = decode_chunk(&[0b0000_0100], &DecodeOptions::default()).unwrap();
        let paths: Vec<String> = report.paths.iter().map(ToString::to_string).collect();
        assert_eq!(paths, ["0", "1"]);
        assert_eq!(report.ops, ["PlusOne", "PlusOne", "FieldPathEncodeFinish"]);
        assert_eq!(report.bit_position, 4);
        assert_eq!(report.bits_used, 4);
        assert_eq!(report.bits_total, 8);
    }

    #[test]
    fn decode_honors_offset() {
        // Three junk bits, then PlusOne and finish.
        let options = DecodeOptions {
            offset_bits: 3,
            ..DecodeOptions::default()
        };
        let report = decode_chunk(&[0b0001_0111], &options).unwrap();
        assert_eq!(report.paths.len(), 1);
        assert_eq!(report.bit_position, 6);
        assert_eq!(report.bits_used, 3);
    }

    #[test]
    fn default_options_accept_large_chunks() {
        assert_eq!(DecodeOptions::default().limits, DecodeLimits::unlimited());
        // 5000 PlusOne codes (all zero bits) then the finish code "10".
        let mut bytes = vec![0u8; 625];
        bytes.push(0b0000_0001);
        let report = decode_chunk(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(report.paths.len(), 5000);
        assert_eq!(report.bit_position, 5002);
    }

    #[test]
    fn decode_offset_past_end_fails() {
        let options = DecodeOptions {
            offset_bits: 9,
            ..DecodeOptions::default()
        };
        assert!(decode_chunk(&[0x00], &options).is_err());
    }

    #[test]
    fn decode_error_mentions_stream() {
        let err = decode_chunk(&[], &DecodeOptions::default()).unwrap_err();
        assert!(format!("{err:#}").contains("malformed"));
    }

    #[test]
    fn report_serializes_paths_as_arrays() {
        let report = decode_chunk(&[0b0000_0100], &DecodeOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["paths"], serde_json::json!([[0], [1]]));
        assert_eq!(json["bit_position"], 4);
    }

    #[test]
    fn code_table_covers_every_operation() {
        let table = code_table();
        assert_eq!(table.len(), FieldOp::COUNT);
        assert_eq!(table[0].name, "PlusOne");
        assert_eq!(table[0].code, "0");
        let finish = &table[FieldOp::FieldPathEncodeFinish.index()];
        assert_eq!(finish.code, "10");
    }

    #[test]
    fn text_formats_list_every_row() {
        let report = decode_chunk(&[0b0000_0100], &DecodeOptions::default()).unwrap();
        let text = format_decode_text(&report);
        assert!(text.starts_with("paths: 2 ops: 3 bits: 0..4 of 8"));
        assert!(text.contains("   1: 1"));

        let table = format_code_table(&code_table());
        assert_eq!(table.lines().count(), FieldOp::COUNT);
        assert!(table.contains("FieldPathEncodeFinish"));
    }
}
