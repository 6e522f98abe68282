//! shopfloor — pallet-flow on the 58 × 8 workstation layout.
//!
//! Twelve carriers start on the roadway and are sent from station to
//! station at random.  Carrier tracks and sector load are written to
//! `output/shopfloor/`.
//!
//! Usage: `shopfloor [config.json]`.  The optional file holds a
//! `ControllerConfig` in JSON; missing fields keep their defaults.
//! Log verbosity follows `RUST_LOG` (default `info`).

mod layout;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pf_core::{ControllerConfig, Tick};
use pf_fleet::Fleet;
use pf_graph::{GraphStore, build_from_floor};
use pf_output::{CsvWriter, OutputWriter, TrafficOutputObserver};
use pf_sim::{ControllerBuilder, TickFault, TickObserver, TickReport};
use pf_traffic::TrafficState;

// ── Constants ─────────────────────────────────────────────────────────────────

const CARRIER_COUNT: usize = 12;
const TOTAL_TICKS:   u64   = 600;
const OUTPUT_DIR:    &str  = "output/shopfloor";

// ── Observer wrapper to count faults ─────────────────────────────────────────

struct FaultCounter<W: OutputWriter> {
    inner:       TrafficOutputObserver<W>,
    crowded:     usize,
    bound_hits:  usize,
    snapshots:   usize,
}

impl<W: OutputWriter> FaultCounter<W> {
    fn new(inner: TrafficOutputObserver<W>) -> Self {
        Self { inner, crowded: 0, bound_hits: 0, snapshots: 0 }
    }
}

impl<W: OutputWriter> TickObserver for FaultCounter<W> {
    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        for fault in &report.faults {
            match fault {
                TickFault::OccupancyViolated { .. }         => self.crowded += 1,
                TickFault::CoordinationBoundExceeded { .. } => self.bound_hits += 1,
            }
        }
        self.inner.on_tick_end(tick, report);
    }

    fn on_snapshot(&mut self, tick: Tick, fleet: &Fleet, graph: &GraphStore, traffic: &TrafficState) {
        self.snapshots += 1;
        self.inner.on_snapshot(tick, fleet, graph, traffic);
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        self.inner.on_run_end(final_tick);
    }
}

fn load_config(path: Option<&str>) -> Result<ControllerConfig> {
    let Some(path) = path else {
        return Ok(ControllerConfig { total_ticks: TOTAL_TICKS, ..ControllerConfig::default() });
    };
    let file = File::open(path).with_context(|| format!("opening config {path}"))?;
    let config: ControllerConfig =
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path}"))?;
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let arg = std::env::args().nth(1);
    let config = load_config(arg.as_deref())?;

    println!("=== shopfloor — pallet-flow ===");
    println!(
        "Carriers: {CARRIER_COUNT}  |  Ticks: {}  |  Horizon: {}  |  Mode: {:?}  |  Seed: {}",
        config.total_ticks, config.horizon, config.weight_mode, config.seed
    );

    // 1. Floor plan and graphs.
    let plan = layout::floor_plan()?;
    let graph = build_from_floor(&plan, layout::SECTOR_W, layout::SECTOR_H)?;
    println!(
        "Graphs: {} cells, {} sectors",
        graph.cell_count(),
        graph.sector_count()
    );

    // 2. Controller.
    let spawns = layout::spawn_points(&graph, CARRIER_COUNT);
    let mut ctl = ControllerBuilder::new(config, graph)
        .stations(layout::stations())
        .build()?;
    for pos in spawns {
        ctl.add_carrier(pos)?;
    }

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = FaultCounter::new(TrafficOutputObserver::new(writer));

    // 4. Run.
    let t0 = Instant::now();
    let summary = ctl.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        warn!(error = %e, "output error");
    }

    // 5. Summary.
    println!();
    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!("  ticks          : {}", summary.ticks);
    println!("  faulted ticks  : {}", summary.faulted_ticks);
    println!("  occupancy hits : {}", obs.crowded);
    println!("  bound overruns : {}", obs.bound_hits);
    println!("  carriers       : {}", ctl.fleet().len());
    println!("  snapshots      : {} (written to {OUTPUT_DIR})", obs.snapshots);
    println!();

    println!("{:<8} {:<10} {:<10} {:<10} {:<6}", "Carrier", "Position", "Station", "Target", "Waited");
    println!("{}", "-".repeat(48));
    for carrier in ctl.fleet().iter() {
        let pos = ctl.graph().cell_pos(carrier.position);
        println!(
            "{:<8} {:<10} {:<10} {:<10} {:<6}",
            carrier.id.0,
            pos.to_string(),
            carrier.station.as_deref().unwrap_or("-"),
            carrier.target.as_deref().unwrap_or("-"),
            carrier.waited,
        );
    }
    println!();

    println!("{:<8} {:<10}", "Station", "State");
    println!("{}", "-".repeat(20));
    for station in ctl.stations() {
        println!("{:<8} {:<10}", station.name, station.state.to_string());
    }
    println!();

    println!("Recent events:");
    for line in ctl.events().lines() {
        println!("  {line}");
    }

    Ok(())
}
