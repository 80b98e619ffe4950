//! In-memory frame sink for renderers.

use ev_agent::Population;
use ev_core::Tick;
use ev_grid::Frame;
use ev_sim::{RunSummary, SimObserver};

/// Keeps every post-commit [`Frame`] in tick order.
///
/// ```rust,ignore
/// let mut frames = FrameRecorder::new();
/// sim.run(&mut frames)?;
/// for frame in frames.frames() {
///     renderer.draw(frame.tick, frame);
/// }
/// ```
#[derive(Debug, Default)]
pub struct FrameRecorder {
    frames:  Vec<Frame>,
    summary: Option<RunSummary>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The most recent frame.
    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Set once the run ends.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl SimObserver for FrameRecorder {
    fn on_snapshot(&mut self, _tick: Tick, frame: &Frame, _population: &Population) {
        self.frames.push(frame.clone());
    }

    fn on_sim_end(&mut self, _final_tick: Tick, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}
