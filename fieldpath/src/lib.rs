//! Field-path decoding for bit-packed entity snapshot streams.
//!
//! A delta update names the properties it changes with a chunk of *field
//! paths*: each path is a short list of indices into nested entity state,
//! and consecutive paths are coded as small edits (push, pop, increment) of
//! the previous one. Each edit is a Huffman-coded operation drawn from a
//! fixed table, followed by its operands.
//!
//! This crate decodes such a chunk into the ordered list of paths. It does
//! not know what the paths refer to and does not read property values.
//!
//! # Design Principles
//!
//! - **Bit exact** - The tree shape and every operand layout follow the wire format.
//! - **Bounded** - Path depth is fixed at [`MAX_DEPTH`]; pushes and pops are checked.
//! - **Panic free** - Truncated or hostile input returns an error.
//! - **Shared tree** - The Huffman tree is built once and read concurrently.
//!
//! # Example
//!
//! ```
//! use bitstream::BitReader;
//! use fieldpath::decode_field_paths;
//!
//! // PlusOne ("0"), PlusOne ("0"), FieldPathEncodeFinish ("10")
//! let bytes = [0b0000_0100];
//! let mut reader = BitReader::new(&bytes);
//! let paths = decode_field_paths(&mut reader).unwrap();
//!
//! let rendered: Vec<String> = paths.iter().map(ToString::to_string).collect();
//! assert_eq!(rendered, ["0", "1"]);
//! assert_eq!(reader.bit_position(), 4);
//! ```

mod decode;
mod error;
mod huffman;
mod limits;
mod op;
mod path;
mod trace;

pub use decode::{decode_field_paths, decode_field_paths_with, FieldPathDecoder};
pub use error::{FieldPathError, FieldPathResult, TreeError};
pub use huffman::{field_path_tree, HuffmanCode, HuffmanTree, Node, MAX_SYMBOLS};
pub use limits::DecodeLimits;
pub use op::FieldOp;
pub use path::{FieldPath, FieldPathState, MAX_DEPTH};
pub use trace::{LogTrace, NoopTrace, RecordingTrace, TraceEvent, TracePhase, TraceSink};
