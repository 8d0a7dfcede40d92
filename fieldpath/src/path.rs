//! Field-path state and immutable path snapshots.

use std::fmt;

use crate::error::{FieldPathError, FieldPathResult};
use crate::op::FieldOp;

/// Maximum nesting depth of a field path.
pub const MAX_DEPTH: usize = 6;

/// An immutable field path: one index per nesting level, outermost first.
///
/// Paths are fixed-size and `Copy`, so collecting them never allocates per
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: [i32; MAX_DEPTH],
    len: u8,
}

impl FieldPath {
    /// Creates a path from its segments.
    ///
    /// Returns `None` for an empty slice or one deeper than [`MAX_DEPTH`].
    #[must_use]
    pub fn new(segments: &[i32]) -> Option<Self> {
        if segments.is_empty() || segments.len() > MAX_DEPTH {
            return None;
        }
        let mut buf = [0; MAX_DEPTH];
        buf[..segments.len()].copy_from_slice(segments);
        #[allow(clippy::cast_possible_truncation)]
        let len = segments.len() as u8;
        Some(Self { segments: buf, len })
    }

    /// Returns the segment values, outermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.segments[..self.len as usize]
    }

    /// Returns the number of levels in the path.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.len as usize
    }

    /// Returns the segment at `level`, if present.
    #[must_use]
    pub fn get(&self, level: usize) -> Option<i32> {
        self.as_slice().get(level).copied()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_segments(f, self.as_slice())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

fn write_segments(f: &mut fmt::Formatter<'_>, segments: &[i32]) -> fmt::Result {
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            f.write_str("/")?;
        }
        write!(f, "{segment}")?;
    }
    Ok(())
}

/// The working path mutated by field-path operations.
///
/// `segments[0..=cursor]` is the active path. The root starts at `-1` so the
/// first increment lands on index 0. Levels dropped by a pop are reset to 0,
/// so every push starts from a clean level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPathState {
    segments: [i32; MAX_DEPTH],
    cursor: usize,
    finished: bool,
}

impl Default for FieldPathState {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPathState {
    /// Creates the initial state: `[-1]` at cursor 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: [-1, 0, 0, 0, 0, 0],
            cursor: 0,
            finished: false,
        }
    }

    /// Returns the active segments, `segments[0..=cursor]`.
    #[must_use]
    pub fn segments(&self) -> &[i32] {
        &self.segments[..=self.cursor]
    }

    /// Returns the index of the deepest active level.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns `true` once the terminal operation has been applied.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Takes an independent copy of the active path.
    #[must_use]
    pub fn snapshot(&self) -> FieldPath {
        let mut segments = [0; MAX_DEPTH];
        segments[..=self.cursor].copy_from_slice(self.segments());
        #[allow(clippy::cast_possible_truncation)]
        let len = (self.cursor + 1) as u8;
        FieldPath { segments, len }
    }

    /// Applies one operation, reading any operands it carries from `reader`.
    pub fn apply(
        &mut self,
        op: FieldOp,
        reader: &mut bitstream::BitReader<'_>,
    ) -> FieldPathResult<()> {
        op.apply(reader, self)
    }

    pub(crate) fn add_top(&mut self, delta: i32) {
        self.add_at(self.cursor, delta);
    }

    pub(crate) fn add_at(&mut self, level: usize, delta: i32) {
        self.segments[level] = self.segments[level].wrapping_add(delta);
    }

    pub(crate) fn push(&mut self, op: FieldOp, value: i32) -> FieldPathResult<()> {
        let next = self.cursor + 1;
        if next >= MAX_DEPTH {
            return Err(FieldPathError::PathOverflow {
                op,
                depth: next + 1,
            });
        }
        self.cursor = next;
        self.segments[next] = value;
        Ok(())
    }

    pub(crate) fn pop(&mut self, op: FieldOp, levels: usize) -> FieldPathResult<()> {
        if levels > self.cursor {
            return Err(FieldPathError::PathUnderflow {
                op,
                cursor: self.cursor,
                levels,
            });
        }
        let target = self.cursor - levels;
        self.segments[target + 1..=self.cursor].fill(0);
        self.cursor = target;
        Ok(())
    }

    pub(crate) fn pop_all_but_one(&mut self) {
        self.segments[1..=self.cursor].fill(0);
        self.cursor = 0;
    }

    pub(crate) fn add_penultimate(&mut self, op: FieldOp, delta: i32) -> FieldPathResult<()> {
        let Some(level) = self.cursor.checked_sub(1) else {
            return Err(FieldPathError::PathUnderflow {
                op,
                cursor: self.cursor,
                levels: 1,
            });
        };
        self.add_at(level, delta);
        Ok(())
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}

impl fmt::Display for FieldPathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_segments(f, self.segments())
    }
}
