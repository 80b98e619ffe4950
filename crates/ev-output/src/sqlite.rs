//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! four tables: `agent_snapshots`, `tick_summaries`, `frames`, and
//! `evacuations`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, EvacuationRow, FrameRow, OutputResult, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 agent_id INTEGER NOT NULL,
                 tick     INTEGER NOT NULL,
                 row      INTEGER NOT NULL,
                 col      INTEGER NOT NULL,
                 exit_row INTEGER NOT NULL,
                 exit_col INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick              INTEGER PRIMARY KEY,
                 remaining         INTEGER NOT NULL,
                 evacuated         INTEGER NOT NULL,
                 moved             INTEGER NOT NULL,
                 unreachable       INTEGER NOT NULL,
                 conflict_cells    INTEGER NOT NULL,
                 resolution_rounds INTEGER NOT NULL,
                 cache_size        INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS frames (
                 tick  INTEGER NOT NULL,
                 row   INTEGER NOT NULL,
                 cells TEXT    NOT NULL,
                 PRIMARY KEY (tick, row)
             );
             CREATE TABLE IF NOT EXISTS evacuations (
                 agent_id INTEGER PRIMARY KEY,
                 tick     INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (agent_id, tick, row, col, exit_row, exit_col) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick as i64,
                    row.row,
                    row.col,
                    row.exit_row,
                    row.exit_col,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, remaining, evacuated, moved, unreachable, conflict_cells, resolution_rounds, cache_size) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.tick as i64,
                row.remaining as i64,
                row.evacuated as i64,
                row.moved as i64,
                row.unreachable as i64,
                row.conflict_cells as i64,
                row.resolution_rounds as i64,
                row.cache_size as i64,
            ],
        )?;
        Ok(())
    }

    fn write_frame(&mut self, rows: &[FrameRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO frames (tick, row, cells) VALUES (?1, ?2, ?3)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick as i64, row.row, row.cells])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_evacuations(&mut self, rows: &[EvacuationRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO evacuations (agent_id, tick) VALUES (?1, ?2)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.agent_id, row.tick as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
