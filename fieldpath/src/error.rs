//! Error types for field-path decoding.

use std::fmt;

use crate::op::FieldOp;

/// Result type for field-path operations.
pub type FieldPathResult<T> = Result<T, FieldPathError>;

/// Errors that can occur while decoding a field-path chunk.
///
/// Every variant is fatal for the current chunk: the stream has no
/// resynchronization point once a single operation is misread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPathError {
    /// The bit source ran dry or held an invalid varint before the
    /// terminal operation was reached.
    MalformedStream(bitstream::BitError),

    /// A push would nest deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    PathOverflow {
        /// Operation that attempted the push.
        op: FieldOp,
        /// Depth the push would have produced.
        depth: usize,
    },

    /// A pop (or a penultimate-level adjustment) went past the root.
    PathUnderflow {
        /// Operation that attempted the pop.
        op: FieldOp,
        /// Cursor at the time of the pop.
        cursor: usize,
        /// Number of levels requested.
        levels: usize,
    },

    /// The tree produced a leaf with no matching operation.
    UnknownSymbol {
        /// The leaf's symbol index.
        index: usize,
    },

    /// The chunk decoded to more paths than the configured limit.
    LimitsExceeded {
        /// Configured maximum.
        limit: usize,
        /// Paths seen when the limit tripped.
        actual: usize,
    },
}

/// Errors raised when building a Huffman tree from a weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// Fewer than two symbols were supplied.
    TooFewSymbols { count: usize },
    /// More symbols than codes of at most 63 bits can cover.
    TooManySymbols { count: usize, max: usize },
}

impl fmt::Display for FieldPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedStream(e) => write!(f, "malformed field-path stream: {e}"),
            Self::PathOverflow { op, depth } => {
                write!(f, "{} overflows field path: depth {depth}", op.name())
            }
            Self::PathUnderflow { op, cursor, levels } => {
                write!(
                    f,
                    "{} underflows field path: pop {levels} from cursor {cursor}",
                    op.name()
                )
            }
            Self::UnknownSymbol { index } => {
                write!(f, "unknown field-path symbol {index}")
            }
            Self::LimitsExceeded { limit, actual } => {
                write!(f, "field path limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSymbols { count } => {
                write!(f, "a tree needs at least 2 symbols, got {count}")
            }
            Self::TooManySymbols { count, max } => {
                write!(f, "{count} symbols exceed the maximum of {max}")
            }
        }
    }
}

impl std::error::Error for FieldPathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedStream(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for TreeError {}

impl From<bitstream::BitError> for FieldPathError {
    fn from(err: bitstream::BitError) -> Self {
        Self::MalformedStream(err)
    }
}
