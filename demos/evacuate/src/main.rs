//! evacuate — run one floor-field evacuation scenario.
//!
//! Without `--config` the built-in scenario is used: a 50×50 floor with three
//! rooms, three exits, and 100 pedestrians.  Any field of the config can be
//! overridden from a JSON file; omitted fields keep their defaults.
//!
//! ```text
//! cargo run --release -p evacuate -- --agents 250 --output output/evacuate
//! cargo run --release -p evacuate --features parallel -- --config floor.json -v
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ev_agent::Population;
use ev_behavior::FloorFieldBehavior;
use ev_core::{CellState, ConflictPolicy, EvacConfig, Tick};
use ev_grid::Frame;
use ev_output::{CsvWriter, FrameRecorder, OutputWriter, SimOutputObserver};
use ev_sim::{RunSummary, SimBuilder, SimObserver, TickStats};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "evacuate")]
#[command(about = "Grid floor-field pedestrian evacuation simulator")]
struct Cli {
    /// JSON scenario file (fields not given keep their defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of pedestrians
    #[arg(short, long)]
    agents: Option<usize>,

    /// Override the RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many ticks even if agents remain
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Draw conflict winners uniformly instead of by probability mass
    #[arg(long)]
    uniform_conflicts: bool,

    /// Directory for CSV (or SQLite) output; nothing is written without it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write agent snapshots and frames every N ticks
    #[arg(long, default_value = "1")]
    snapshot_interval: u64,

    /// Skip frames in the file output
    #[arg(long)]
    no_frames: bool,

    /// Write output.db instead of CSV files
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    sqlite: bool,

    /// Print the first and last frame as text
    #[arg(long)]
    ascii: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

// ── Observers ─────────────────────────────────────────────────────────────────

type FileObserver = SimOutputObserver<Box<dyn OutputWriter>>;

/// Fans every hook out to a frame recorder and an optional file writer.
struct DriverObserver {
    frames: FrameRecorder,
    files:  Option<FileObserver>,
}

impl SimObserver for DriverObserver {
    fn on_tick_start(&mut self, tick: Tick) {
        if let Some(files) = &mut self.files {
            files.on_tick_start(tick);
        }
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        if let Some(files) = &mut self.files {
            files.on_tick_end(tick, stats);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, frame: &Frame, population: &Population) {
        self.frames.on_snapshot(tick, frame, population);
        if let Some(files) = &mut self.files {
            files.on_snapshot(tick, frame, population);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, summary: &RunSummary) {
        self.frames.on_sim_end(final_tick, summary);
        if let Some(files) = &mut self.files {
            files.on_sim_end(final_tick, summary);
        }
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> Result<EvacConfig> {
    let mut config: EvacConfig = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EvacConfig::default(),
    };

    if let Some(n) = cli.agents {
        config.agent_count = n;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.max_ticks.is_some() {
        config.max_ticks = cli.max_ticks;
    }
    if cli.uniform_conflicts {
        config.conflict_policy = ConflictPolicy::Uniform;
    }
    Ok(config)
}

#[cfg(feature = "parallel")]
fn configure_threads(config: &EvacConfig) -> Result<()> {
    if let Some(n) = config.num_threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_threads(_config: &EvacConfig) -> Result<()> {
    Ok(())
}

fn open_writer(cli: &Cli, dir: &Path) -> Result<FileObserver> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    #[cfg(feature = "sqlite")]
    let writer: Box<dyn OutputWriter> = if cli.sqlite {
        Box::new(ev_output::SqliteWriter::new(dir)?)
    } else {
        Box::new(CsvWriter::new(dir)?)
    };
    #[cfg(not(feature = "sqlite"))]
    let writer: Box<dyn OutputWriter> = Box::new(CsvWriter::new(dir)?);

    Ok(SimOutputObserver::new(writer)
        .snapshot_interval(cli.snapshot_interval)
        .frames(!cli.no_frames))
}

fn print_frame(label: &str, frame: &Frame) {
    println!("{label} ({}):", frame.tick);
    for r in 0..frame.height {
        let line: String = frame
            .row(r)
            .iter()
            .map(|&c| match CellState::try_from(c) {
                Ok(CellState::Empty) => '.',
                Ok(CellState::Occupied) => 'o',
                Ok(CellState::Exit) => 'E',
                Ok(CellState::Wall) => '#',
                Err(_) => '?',
            })
            .collect();
        println!("  {line}");
    }
    println!();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 1. Scenario.
    let config = load_config(&cli)?;
    configure_threads(&config)?;
    println!("=== evacuate ===");
    println!(
        "Floor: {}x{}  |  Rooms: {}  |  Exits: {}  |  Agents: {}  |  Seed: {}",
        config.height,
        config.width,
        config.rooms.len(),
        config.exits.len(),
        config.agent_count,
        config.seed,
    );
    println!();

    // 2. Build sim.
    let behavior = FloorFieldBehavior::from_config(&config);
    let mut sim = SimBuilder::new(config, behavior).build()?;
    let initial = sim.frame();

    // 3. Set up output.
    let files = match &cli.output {
        Some(dir) => Some(open_writer(&cli, dir)?),
        None => None,
    };
    let mut obs = DriverObserver { frames: FrameRecorder::new(), files };

    // 4. Run.
    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();
    info!(elapsed_ms = elapsed.as_millis() as u64, "run complete");

    if let Some(e) = obs.files.as_mut().and_then(|f| f.take_error()) {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!("Simulation finished in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks       : {}", summary.ticks);
    println!("  evacuated   : {} / {}", summary.evacuated, summary.initial_agents);
    println!("  remaining   : {}", summary.remaining);
    if let Some(mean) = summary.mean_evacuation_tick() {
        println!("  mean exit   : tick {mean:.1}");
    }
    if let Some(last) = summary.last_evacuation() {
        println!("  last exit   : {last}");
    }
    if !summary.completed {
        println!("  (stopped by the tick limit)");
    }
    if let Some(dir) = &cli.output {
        println!("  output      : {}", dir.display());
    }
    println!();

    if cli.ascii {
        print_frame("initial", &initial);
        if let Some(last) = obs.frames.last() {
            print_frame("final", last);
        }
    }

    Ok(())
}
