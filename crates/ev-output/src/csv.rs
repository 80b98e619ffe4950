//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `frames.csv` (one record per grid row per tick)
//! - `evacuations.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, EvacuationRow, FrameRow, OutputResult, TickSummaryRow};

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    snapshots:   Writer<File>,
    summaries:   Writer<File>,
    frames:      Writer<File>,
    evacuations: Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(["agent_id", "tick", "row", "col", "exit_row", "exit_col"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "remaining",
            "evacuated",
            "moved",
            "unreachable",
            "conflict_cells",
            "resolution_rounds",
            "cache_size",
        ])?;

        let mut frames = Writer::from_path(dir.join("frames.csv"))?;
        frames.write_record(["tick", "row", "cells"])?;

        let mut evacuations = Writer::from_path(dir.join("evacuations.csv"))?;
        evacuations.write_record(["agent_id", "tick"])?;

        Ok(Self {
            snapshots,
            summaries,
            frames,
            evacuations,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.row.to_string(),
                row.col.to_string(),
                row.exit_row.to_string(),
                row.exit_col.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.remaining.to_string(),
            row.evacuated.to_string(),
            row.moved.to_string(),
            row.unreachable.to_string(),
            row.conflict_cells.to_string(),
            row.resolution_rounds.to_string(),
            row.cache_size.to_string(),
        ])?;
        Ok(())
    }

    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()> {
        for row in rows {
            self.frames
                .write_record(&[row.tick.to_string(), row.row.to_string(), row.cells.clone()])?;
        }
        Ok(())
    }

    fn write_evacuations(&mut self, rows: &[EvacuationRow]) -> OutputResult<()> {
        for row in rows {
            self.evacuations.write_record(&[row.agent_id.to_string(), row.tick.to_string()])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.frames.flush()?;
        self.evacuations.flush()?;
        Ok(())
    }
}
