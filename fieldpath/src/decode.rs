//! The field-path decode loop.

use bitstream::BitReader;

use crate::error::{FieldPathError, FieldPathResult};
use crate::huffman::{field_path_tree, HuffmanTree};
use crate::limits::DecodeLimits;
use crate::op::FieldOp;
use crate::path::{FieldPath, FieldPathState};
use crate::trace::{NoopTrace, TraceSink};

/// Decodes one field-path chunk with no path limit and no tracing.
///
/// Output is bounded by the input: every path costs at least one bit.
/// On success the reader rests on the first bit after the terminal code.
pub fn decode_field_paths(reader: &mut BitReader<'_>) -> FieldPathResult<Vec<FieldPath>> {
    FieldPathDecoder::new().decode(reader)
}

/// Decodes one field-path chunk with explicit limits and a trace sink.
pub fn decode_field_paths_with(
    reader: &mut BitReader<'_>,
    limits: &DecodeLimits,
    sink: &mut dyn TraceSink,
) -> FieldPathResult<Vec<FieldPath>> {
    let mut out = Vec::new();
    FieldPathDecoder::new()
        .with_limits(limits.clone())
        .decode_into(reader, sink, &mut out)?;
    Ok(out)
}

/// A configured decoder: a tree plus limits.
///
/// The decoder holds no per-chunk state and can be shared freely; every call
/// starts from a fresh [`FieldPathState`].
#[derive(Debug, Clone)]
pub struct FieldPathDecoder<'t> {
    tree: &'t HuffmanTree,
    limits: DecodeLimits,
}

impl Default for FieldPathDecoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPathDecoder<'static> {
    /// Creates a decoder over the shared field-path tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(field_path_tree())
    }
}

impl<'t> FieldPathDecoder<'t> {
    /// Creates a decoder over an explicit tree, with no path limit.
    ///
    /// Leaves whose symbol has no operation fail with
    /// [`FieldPathError::UnknownSymbol`].
    #[must_use]
    pub fn with_tree(tree: &'t HuffmanTree) -> Self {
        Self {
            tree,
            limits: DecodeLimits::unlimited(),
        }
    }

    /// Replaces the decode limits.
    #[must_use]
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the active limits.
    #[must_use]
    pub const fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Decodes one chunk into a new vector.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> FieldPathResult<Vec<FieldPath>> {
        let mut out = Vec::new();
        self.decode_into(reader, &mut NoopTrace, &mut out)?;
        Ok(out)
    }

    /// Decodes one chunk, appending paths to `out`.
    ///
    /// `out` is cleared first. On error it keeps the paths decoded before the
    /// failure; they are for diagnostics only.
    pub fn decode_into(
        &self,
        reader: &mut BitReader<'_>,
        sink: &mut dyn TraceSink,
        out: &mut Vec<FieldPath>,
    ) -> FieldPathResult<()> {
        out.clear();
        let mut state = FieldPathState::new();

        while !state.is_finished() {
            let symbol = self.tree.read_symbol(reader)?;
            let op = FieldOp::from_index(symbol)
                .ok_or(FieldPathError::UnknownSymbol { index: symbol })?;

            sink.before(op, &state, reader.bit_position());
            state.apply(op, reader)?;
            sink.after(op, &state, reader.bit_position());

            if state.is_finished() {
                break;
            }
            if out.len() >= self.limits.max_paths {
                return Err(FieldPathError::LimitsExceeded {
                    limit: self.limits.max_paths,
                    actual: out.len() + 1,
                });
            }
            out.push(state.snapshot());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bitstream::{BitError, BitWriter};

    use super::*;
    use crate::trace::{RecordingTrace, TracePhase};

    fn write_op(writer: &mut BitWriter, op: FieldOp) {
        let code = field_path_tree().code(op.index()).unwrap();
        writer.write_bits(code.bits(), code.len()).unwrap();
    }

    fn rendered(paths: &[FieldPath]) -> Vec<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn finish_only_yields_no_paths() {
        // FieldPathEncodeFinish is "10": bit 1 then bit 0.
        let bytes = [0b0000_0001];
        let mut reader = BitReader::new(&bytes);
        let paths = decode_field_paths(&mut reader).unwrap();
        assert!(paths.is_empty());
        assert_eq!(reader.bit_position(), 2);
    }

    #[test]
    fn plus_one_run() {
        let mut writer = BitWriter::new();
        for _ in 0..3 {
            write_op(&mut writer, FieldOp::PlusOne);
        }
        write_op(&mut writer, FieldOp::FieldPathEncodeFinish);
        let bits = writer.bits_written();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let paths = decode_field_paths(&mut reader).unwrap();
        assert_eq!(rendered(&paths), vec!["0", "1", "2"]);
        assert_eq!(reader.bit_position(), bits);
    }

    #[test]
    fn empty_stream_is_malformed() {
        let mut reader = BitReader::new(&[]);
        let err = decode_field_paths(&mut reader).unwrap_err();
        assert_eq!(
            err,
            FieldPathError::MalformedStream(BitError::UnexpectedEof {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn missing_terminal_is_malformed() {
        // Eight PlusOne codes and nothing after.
        let mut reader = BitReader::new(&[0x00]);
        let mut out = Vec::new();
        let err = FieldPathDecoder::new()
            .decode_into(&mut reader, &mut NoopTrace, &mut out)
            .unwrap_err();
        assert!(matches!(err, FieldPathError::MalformedStream(_)));
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn limit_trips_on_extra_path() {
        let mut reader = BitReader::new(&[0x00, 0x00]);
        let decoder = FieldPathDecoder::new().with_limits(DecodeLimits { max_paths: 4 });
        let err = decoder.decode(&mut reader).unwrap_err();
        assert_eq!(
            err,
            FieldPathError::LimitsExceeded {
                limit: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn default_decoder_has_no_path_limit() {
        assert_eq!(FieldPathDecoder::new().limits(), &DecodeLimits::unlimited());

        let mut writer = BitWriter::new();
        for _ in 0..5000 {
            write_op(&mut writer, FieldOp::PlusOne);
        }
        write_op(&mut writer, FieldOp::FieldPathEncodeFinish);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let paths = decode_field_paths(&mut reader).unwrap();
        assert_eq!(paths.len(), 5000);
        assert_eq!(paths[4999].to_string(), "4999");
    }

    #[test]
    fn default_limits_are_opt_in() {
        let mut writer = BitWriter::new();
        for _ in 0..5000 {
            write_op(&mut writer, FieldOp::PlusOne);
        }
        write_op(&mut writer, FieldOp::FieldPathEncodeFinish);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let err = decode_field_paths_with(&mut reader, &DecodeLimits::default(), &mut NoopTrace)
            .unwrap_err();
        assert_eq!(
            err,
            FieldPathError::LimitsExceeded {
                limit: 4096,
                actual: 4097
            }
        );
    }

    #[test]
    fn penultimate_at_root_fails() {
        let mut writer = BitWriter::new();
        write_op(&mut writer, FieldOp::NonTopoPenultimatePlusOne);
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert!(matches!(
            decode_field_paths(&mut reader),
            Err(FieldPathError::PathUnderflow {
                op: FieldOp::NonTopoPenultimatePlusOne,
                cursor: 0,
                ..
            })
        ));
    }

    #[test]
    fn unknown_symbol_is_reported() {
        // A tree with one more symbol than the operation table.
        let mut weights = FieldOp::weights().to_vec();
        weights.push(1_000_000);
        let tree = HuffmanTree::build(&weights).unwrap();
        let code = tree.code(FieldOp::COUNT).unwrap();
        let mut writer = BitWriter::new();
        writer.write_bits(code.bits(), code.len()).unwrap();
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let err = FieldPathDecoder::with_tree(&tree)
            .decode(&mut reader)
            .unwrap_err();
        assert_eq!(
            err,
            FieldPathError::UnknownSymbol {
                index: FieldOp::COUNT
            }
        );
    }

    #[test]
    fn trace_sees_every_operation() {
        let mut writer = BitWriter::new();
        write_op(&mut writer, FieldOp::PlusOne);
        write_op(&mut writer, FieldOp::PushOneLeftDeltaZeroRightZero);
        write_op(&mut writer, FieldOp::FieldPathEncodeFinish);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        let mut sink = RecordingTrace::new();
        let paths =
            decode_field_paths_with(&mut reader, &DecodeLimits::for_testing(), &mut sink).unwrap();
        assert_eq!(rendered(&paths), vec!["0", "0/0"]);

        let events = sink.events();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].phase, TracePhase::Before);
        assert_eq!(events[0].path.to_string(), "-1");
        assert_eq!(events[0].bit_position, 1);
        assert_eq!(events[3].path.to_string(), "0/0");
        assert_eq!(
            sink.ops().collect::<Vec<_>>(),
            vec![
                FieldOp::PlusOne,
                FieldOp::PushOneLeftDeltaZeroRightZero,
                FieldOp::FieldPathEncodeFinish
            ]
        );
    }

    #[test]
    fn decode_into_clears_previous_output() {
        let mut out = vec![FieldPath::new(&[9]).unwrap()];
        let mut reader = BitReader::new(&[0b0000_0001]);
        FieldPathDecoder::new()
            .decode_into(&mut reader, &mut NoopTrace, &mut out)
            .unwrap();
        assert!(out.is_empty());
    }
}
