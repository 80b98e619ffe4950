//! Integration tests for ev-output.

use ev_behavior::FloorFieldBehavior;
use ev_core::{EvacConfig, Position};
use ev_field::PreferenceMatrix;
use ev_sim::{Sim, SimBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// One agent walking straight down a 10×10 floor to the exit at (9, 5).
fn straight_walk() -> Sim<FloorFieldBehavior> {
    let behavior = FloorFieldBehavior::new(PreferenceMatrix::new([[0.0, 1.0, 0.0], [0.0; 3], [0.0; 3]]), 50.0);
    SimBuilder::new(EvacConfig::open_floor(10, 10, vec![Position::new(9, 5)]), behavior)
        .agents([Position::new(0, 5)])
        .build()
        .unwrap()
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::straight_walk;
    use crate::csv::CsvWriter;
    use crate::row::{AgentSnapshotRow, EvacuationRow, FrameRow, NO_EXIT, TickSummaryRow};
    use crate::writer::OutputWriter;
    use crate::SimOutputObserver;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read_rows(dir: &TempDir, file: &str) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        for file in ["agent_snapshots.csv", "tick_summaries.csv", "frames.csv", "evacuations.csv"] {
            assert!(dir.path().join(file).exists(), "{file}");
        }
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["agent_id", "tick", "row", "col", "exit_row", "exit_col"]);

        let mut rdr = csv::Reader::from_path(dir.path().join("frames.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["tick", "row", "cells"]);
    }

    #[test]
    fn csv_snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[
            AgentSnapshotRow { agent_id: 0, tick: 5, row: 2, col: 3, exit_row: 9, exit_col: 5 },
            AgentSnapshotRow { agent_id: 1, tick: 5, row: 4, col: 4, exit_row: NO_EXIT, exit_col: NO_EXIT },
        ])
        .unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir, "agent_snapshots.csv");
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "2");
        assert_eq!(&rows[0][4], "9");
        assert_eq!(&rows[1][4], "-1");
    }

    #[test]
    fn csv_tick_summary_and_evacuations() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:              3,
            remaining:         7,
            evacuated:         2,
            moved:             6,
            unreachable:       0,
            conflict_cells:    1,
            resolution_rounds: 1,
            cache_size:        4,
        })
        .unwrap();
        w.write_evacuations(&[EvacuationRow { agent_id: 4, tick: 3 }]).unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir, "tick_summaries.csv");
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "7");
        assert_eq!(&rows[0][7], "4");

        let rows = read_rows(&dir, "evacuations.csv");
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][1], "3");
    }

    #[test]
    fn csv_frame_rows_are_digit_strings() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_frame(&[FrameRow { tick: 0, row: 0, cells: "0123".into() }]).unwrap();
        w.finish().unwrap();

        let rows = read_rows(&dir, "frames.csv");
        assert_eq!(&rows[0][2], "0123");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn integration_csv() {
        let mut sim = straight_walk();
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer).snapshot_interval(2);
        let summary = sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert_eq!(summary.ticks, 9);

        // One summary per tick.
        assert_eq!(read_rows(&dir, "tick_summaries.csv").len(), 9);

        // Snapshot ticks 0, 2, 4, 6 have one agent; at tick 8 the floor is empty.
        let snaps = read_rows(&dir, "agent_snapshots.csv");
        let ticks: Vec<&str> = snaps.iter().map(|r| r.get(1).unwrap()).collect();
        assert_eq!(ticks, ["0", "2", "4", "6"]);
        assert_eq!(&snaps[1][2], "3", "row after tick 2");

        // Five snapshot ticks × ten grid rows.
        let frames = read_rows(&dir, "frames.csv");
        assert_eq!(frames.len(), 50);
        assert_eq!(&frames[1][2], "0000010000", "tick 0, row 1");
        assert_eq!(&frames[49][2], "0000020000", "tick 8, exit row, agent gone");

        let evac = read_rows(&dir, "evacuations.csv");
        assert_eq!(evac.len(), 1);
        assert_eq!(&evac[0][1], "8");
    }

    #[test]
    fn frames_can_be_disabled() {
        let mut sim = straight_walk();
        let dir = tmp();
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap()).frames(false);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());
        assert!(read_rows(&dir, "frames.csv").is_empty());
        assert_eq!(read_rows(&dir, "agent_snapshots.csv").len(), 8);
    }
}

// ── Frame recorder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod recorder_tests {
    use ev_core::{CellState, Tick};

    use super::straight_walk;
    use crate::FrameRecorder;

    #[test]
    fn records_one_frame_per_tick() {
        let mut sim = straight_walk();
        let mut rec = FrameRecorder::new();
        let summary = sim.run(&mut rec).unwrap();

        assert_eq!(rec.len() as u64, summary.ticks);
        assert_eq!(rec.summary(), Some(&summary));
        for (t, frame) in rec.frames().iter().enumerate() {
            assert_eq!(frame.tick, Tick(t as u64));
            assert_eq!(frame.width, 10);
            assert_eq!(frame.cells.len(), 100);
        }
        assert_eq!(rec.last().unwrap().count(CellState::Occupied), 0);
    }

    #[test]
    fn frames_are_independent_copies() {
        let mut sim = straight_walk();
        let mut rec = FrameRecorder::new();
        sim.run_ticks(2, &mut rec).unwrap();

        let frames = rec.into_frames();
        assert_eq!(frames[0].get(1, 5), Some(CellState::Occupied.code()));
        assert_eq!(frames[0].get(2, 5), Some(CellState::Empty.code()));
        assert_eq!(frames[1].get(1, 5), Some(CellState::Empty.code()));
        assert_eq!(frames[1].get(2, 5), Some(CellState::Occupied.code()));
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use tempfile::TempDir;

    use super::straight_walk;
    use crate::row::{AgentSnapshotRow, TickSummaryRow};
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;
    use crate::SimOutputObserver;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn count(dir: &TempDir, table: &str) -> i64 {
        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_snapshot_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        let rows: Vec<AgentSnapshotRow> = (0..3)
            .map(|i| AgentSnapshotRow { agent_id: i, tick: 1, row: i as i32, col: 0, exit_row: -1, exit_col: -1 })
            .collect();
        w.write_snapshots(&rows).unwrap();
        w.finish().unwrap();
        assert_eq!(count(&dir, "agent_snapshots"), 3);
    }

    #[test]
    fn sqlite_tick_summary() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:              7,
            remaining:         42,
            evacuated:         3,
            moved:             30,
            unreachable:       0,
            conflict_cells:    2,
            resolution_rounds: 1,
            cache_size:        5,
        })
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let (remaining, evacuated): (i64, i64) = conn
            .query_row(
                "SELECT remaining, evacuated FROM tick_summaries WHERE tick = 7",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(remaining, 42);
        assert_eq!(evacuated, 3);
    }

    #[test]
    fn integration_sqlite() {
        let mut sim = straight_walk();
        let dir = tmp();
        let mut obs = SimOutputObserver::new(SqliteWriter::new(dir.path()).unwrap());
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        assert_eq!(count(&dir, "tick_summaries"), 9);
        assert_eq!(count(&dir, "agent_snapshots"), 8);
        assert_eq!(count(&dir, "frames"), 90);
        assert_eq!(count(&dir, "evacuations"), 1);
    }
}
