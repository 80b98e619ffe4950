//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AgentSnapshotRow, EvacuationRow, FrameRow, OutputResult, TickSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of agent snapshots.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write the rows of one frame.
    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()>;

    /// Write the per-agent evacuation ticks at the end of the run.
    fn write_evacuations(&mut self, rows: &[EvacuationRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}

impl<W: OutputWriter + ?Sized> OutputWriter for Box<W> {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        (**self).write_snapshots(rows)
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        (**self).write_tick_summary(row)
    }

    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()> {
        (**self).write_frame(rows)
    }

    fn write_evacuations(&mut self, rows: &[EvacuationRow]) -> OutputResult<()> {
        (**self).write_evacuations(rows)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
