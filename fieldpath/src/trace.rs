//! Per-operation tracing hooks for the decode loop.

use crate::op::FieldOp;
use crate::path::{FieldPath, FieldPathState};

/// Observer notified around every operation the decode loop applies.
///
/// `bit_position` is the reader position at the time of the call: after the
/// operation's code for `before`, after its operands for `after`.
pub trait TraceSink {
    /// Called once the operation is resolved, before it is applied.
    fn before(&mut self, _op: FieldOp, _state: &FieldPathState, _bit_position: usize) {}

    /// Called after the operation was applied successfully.
    fn after(&mut self, _op: FieldOp, _state: &FieldPathState, _bit_position: usize) {}
}

/// A sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;

impl TraceSink for NoopTrace {}

/// A sink that forwards every operation to the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn before(&mut self, op: FieldOp, state: &FieldPathState, bit_position: usize) {
        log::trace!("before {} {state} pos={bit_position}", op.name());
    }

    fn after(&mut self, op: FieldOp, state: &FieldPathState, bit_position: usize) {
        log::trace!("after {} {state} pos={bit_position}", op.name());
    }
}

/// When a [`TraceEvent`] was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracePhase {
    Before,
    After,
}

/// One recorded trace callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub phase: TracePhase,
    pub op: FieldOp,
    pub path: FieldPath,
    pub bit_position: usize,
}

/// A sink that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingTrace {
    events: Vec<TraceEvent>,
}

impl RecordingTrace {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Returns the operations applied, in order.
    pub fn ops(&self) -> impl Iterator<Item = FieldOp> + '_ {
        self.events
            .iter()
            .filter(|event| event.phase == TracePhase::Before)
            .map(|event| event.op)
    }

    fn record(
        &mut self,
        phase: TracePhase,
        op: FieldOp,
        state: &FieldPathState,
        bit_position: usize,
    ) {
        self.events.push(TraceEvent {
            phase,
            op,
            path: state.snapshot(),
            bit_position,
        });
    }
}

impl TraceSink for RecordingTrace {
    fn before(&mut self, op: FieldOp, state: &FieldPathState, bit_position: usize) {
        self.record(TracePhase::Before, op, state, bit_position);
    }

    fn after(&mut self, op: FieldOp, state: &FieldPathState, bit_position: usize) {
        self.record(TracePhase::After, op, state, bit_position);
    }
}
