//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use ev_agent::Population;
use ev_core::Tick;
use ev_grid::Frame;
use ev_sim::{RunSummary, SimObserver, TickStats};

use crate::row::{AgentSnapshotRow, EvacuationRow, FrameRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent snapshots, tick summaries, frames, and
/// evacuation ticks to any [`OutputWriter`] backend.
///
/// Tick summaries are written every tick.  Agent snapshots and frames are
/// written every `snapshot_interval` ticks (default 1); frames can be turned
/// off with [`frames(false)`](Self::frames).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:            W,
    snapshot_interval: u64,
    write_frames:      bool,
    last_error:        Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            snapshot_interval: 1,
            write_frames:      true,
            last_error:        None,
        }
    }

    /// Write snapshots and frames only on ticks divisible by `every`.
    /// `0` disables them.
    pub fn snapshot_interval(mut self, every: u64) -> Self {
        self.snapshot_interval = every;
        self
    }

    /// Enable or disable `frames` output.
    pub fn frames(mut self, enabled: bool) -> Self {
        self.write_frames = enabled;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn is_snapshot_tick(&self, tick: Tick) -> bool {
        self.snapshot_interval > 0 && tick.0 % self.snapshot_interval == 0
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, stats: &TickStats) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(stats));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, frame: &Frame, population: &Population) {
        if !self.is_snapshot_tick(tick) {
            return;
        }

        let rows: Vec<AgentSnapshotRow> =
            population.iter().map(|ped| AgentSnapshotRow::new(tick, ped)).collect();
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }

        if self.write_frames {
            let result = self.writer.write_frame(&FrameRow::from_frame(frame));
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, summary: &RunSummary) {
        let rows: Vec<EvacuationRow> =
            summary.evacuation_ticks.iter().copied().map(EvacuationRow::from).collect();
        let result = self.writer.write_evacuations(&rows);
        self.store_err(result);

        let result = self.writer.finish();
        self.store_err(result);
    }
}
