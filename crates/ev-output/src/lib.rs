//! `ev-output` — snapshot sinks for the evacuation simulator.
//!
//! | Sink                 | Feature   | Output                                                  |
//! |----------------------|-----------|---------------------------------------------------------|
//! | [`FrameRecorder`]    | *(none)*  | `Vec<Frame>` in memory, for a renderer                  |
//! | [`CsvWriter`]        | *(none)*  | `agent_snapshots.csv`, `tick_summaries.csv`, `frames.csv`, `evacuations.csv` |
//! | `SqliteWriter`       | `sqlite`  | `output.db`                                             |
//!
//! The file backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `ev_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ev_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer).snapshot_interval(5);
//! sim.run(&mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod recorder;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use recorder::FrameRecorder;
pub use row::{AgentSnapshotRow, EvacuationRow, FrameRow, NO_EXIT, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
