//! The `Controller` struct and its tick state machine.

use std::collections::VecDeque;

use tracing::{error, info};

use pf_core::{CarrierId, CellId, ControllerConfig, EventLog, GridPos, SectorId, SimRng, Tick};
use pf_fleet::{Carrier, Fleet, Station, StationState};
use pf_graph::GraphStore;
use pf_plan::{
    ConflictCoordinator, CoordinationOutcome, NegotiationPolicy, PathPlanner, PlanRequest, Snapshot,
};
use pf_traffic::{CongestionModel, PredictionWindow, TrafficState, TrafficView};

use crate::report::{RunSummary, SectorLoad, SectorSnapshot, TickFault, TickReport};
use crate::{SimError, SimResult, TickObserver};

// ── Controller ────────────────────────────────────────────────────────────────

/// Owns the graph, the fleet and the current traffic snapshot, and advances
/// them one synchronous tick at a time.
///
/// Each [`tick`](Self::tick) runs these steps in order:
///
/// 1. **Archive** the per-sector occupancy and weight into the bounded
///    topology history.
/// 2. **Goals**: every carrier without a goal, or standing on it, is sent to
///    a random online station other than its current one.
/// 3. **Re-plan** every carrier from scratch if step 2 assigned a goal, an
///    external request is pending, or `idle_step % H == 0`.
/// 4. **Window**: rebuild the prediction window from every plan.
/// 5. **Coordinate** to a conflict-free window whenever step 3 ran, then
///    reset `idle_step`.
/// 6. **Advance** every carrier one step.
/// 7. **Promote** window step 1 to the current snapshot.
/// 8. **Verify** that no cell holds two carriers.
/// 9. Bump `idle_step`, refresh station states and queues.
///
/// Create via [`ControllerBuilder`][crate::ControllerBuilder].
pub struct Controller<P: PathPlanner, N: NegotiationPolicy> {
    pub(crate) config:           ControllerConfig,
    pub(crate) graph:            GraphStore,
    pub(crate) model:            CongestionModel,
    pub(crate) traffic:          TrafficState,
    pub(crate) fleet:            Fleet,
    pub(crate) stations:         Vec<Station>,
    /// Entry cell of `stations[i]`.
    pub(crate) entries:          Vec<CellId>,
    pub(crate) window:           PredictionWindow,
    pub(crate) coordinator:      ConflictCoordinator<N>,
    pub(crate) planner:          P,
    pub(crate) rng:              SimRng,
    pub(crate) events:           EventLog,
    pub(crate) topology_history: VecDeque<SectorSnapshot>,
    pub(crate) tick:             Tick,
    pub(crate) idle_step:        usize,
    /// Set by external requests; forces a re-plan on the next tick.
    pub(crate) pending:          bool,
}

impl<P: PathPlanner, N: NegotiationPolicy> Controller<P, N> {
    // ── Run loop ──────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    ///
    /// Faults do not stop the run; they reach the observer through
    /// [`TickObserver::on_tick_end`] and are counted in the summary.
    pub fn run<O: TickObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let mut summary = RunSummary::default();
        while self.tick < self.config.end_tick() {
            self.observed_tick(observer, &mut summary)?;
        }
        observer.on_run_end(self.tick);
        Ok(summary)
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: TickObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..n {
            self.observed_tick(observer, &mut summary)?;
        }
        Ok(summary)
    }

    fn observed_tick<O: TickObserver>(&mut self, observer: &mut O, summary: &mut RunSummary) -> SimResult<()> {
        let now = self.tick;
        observer.on_tick_start(now);
        let report = self.tick()?;
        observer.on_tick_end(now, &report);

        let every = self.config.output_interval_ticks;
        if every > 0 && now.0.is_multiple_of(every) {
            observer.on_snapshot(now, &self.fleet, &self.graph, &self.traffic);
        }

        summary.ticks += 1;
        if !report.is_clean() {
            summary.faulted_ticks += 1;
        }
        Ok(())
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance every carrier by one step.
    ///
    /// Invariant violations do not return `Err`; they are logged and listed
    /// in the report.  Use [`TickReport::into_result`] to make them fatal.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        let now = self.tick;
        info!(tick = %now, carriers = self.fleet.len(), "tick start");
        let mut faults = Vec::new();

        // ── 1. Archive ────────────────────────────────────────────────────
        self.archive(now);

        // ── 2. Goals ──────────────────────────────────────────────────────
        let assigned = self.assign_goals()?;
        let unexpected = std::mem::take(&mut self.pending) || assigned;

        // ── 3. Re-plan ────────────────────────────────────────────────────
        let replan = unexpected || self.idle_step % self.config.horizon == 0;
        if replan {
            self.replan_all()?;
        }

        // ── 4. Window ─────────────────────────────────────────────────────
        self.window
            .rebuild(&self.graph, &self.traffic, &self.model, &self.fleet.paths());

        // ── 5. Coordinate ─────────────────────────────────────────────────
        let coordination = if replan {
            let snap = Snapshot { graph: &self.graph, model: &self.model, base: &self.traffic };
            let outcome = self.coordinator.resolve(
                snap,
                &mut self.fleet,
                &mut self.window,
                &self.planner,
                &mut self.events,
            )?;
            self.idle_step = 0;
            if let CoordinationOutcome::BoundExceeded { rounds } = outcome {
                self.events.push(format!("Coordination stopped after {rounds} rounds."));
                faults.push(TickFault::CoordinationBoundExceeded { rounds });
            }
            Some(outcome)
        } else {
            None
        };

        // ── 6. Advance ────────────────────────────────────────────────────
        self.advance_all();

        // ── 7. Promote ────────────────────────────────────────────────────
        self.traffic = self.window.promote(&self.traffic, 1);

        // ── 8. Verify ─────────────────────────────────────────────────────
        let crowded = self.traffic.overcrowded_cells();
        if !crowded.is_empty() {
            let labels: Vec<u32> = crowded.iter().map(|&c| self.graph.cell_label(c)).collect();
            error!(tick = %now, cells = ?labels, "occupancy invariant violated");
            self.events.push(format!("Occupancy violated on {labels:?}."));
            faults.push(TickFault::OccupancyViolated { cells: crowded });
        }

        // ── 9. Bookkeeping ────────────────────────────────────────────────
        self.idle_step += 1;
        self.refresh_stations();
        self.tick = now.next();

        Ok(TickReport { tick: now, replanned: replan, coordination, faults })
    }

    fn archive(&mut self, now: Tick) {
        if self.config.history_len == 0 {
            return;
        }
        while self.topology_history.len() >= self.config.history_len {
            self.topology_history.pop_front();
        }
        self.topology_history.push_back(SectorSnapshot {
            tick:     now,
            occupied: self.traffic.sector_occupancies().to_vec(),
            weights:  self.traffic.sector_weights().to_vec(),
        });
    }

    /// Returns `true` if any carrier received a new goal.
    fn assign_goals(&mut self) -> SimResult<bool> {
        let mut assigned = false;
        let ids: Vec<CarrierId> = self.fleet.ids().collect();
        for id in ids {
            let carrier = self.fleet.get_mut(id)?;
            if !carrier.needs_goal() {
                continue;
            }
            let Some(k) = pick_station(&self.stations, carrier.station.as_deref(), &mut self.rng) else {
                continue;
            };
            send_to(carrier, &self.stations[k], self.entries[k]);
            info!(carrier = %id, station = %self.stations[k].name, "goal assigned");
            assigned = true;
        }
        Ok(assigned)
    }

    fn replan_all(&mut self) -> SimResult<()> {
        let ids: Vec<CarrierId> = self.fleet.ids().collect();
        for id in ids {
            let carrier = self.fleet.get(id)?;
            let source = carrier.position;
            let target = carrier.goal.unwrap_or(source);
            let route = self
                .planner
                .plan(&self.graph, &self.traffic, PlanRequest::new(id, source, target));
            self.fleet.get_mut(id)?.set_path(route.cells)?;
        }
        Ok(())
    }

    fn advance_all(&mut self) {
        let reroute = self.config.spontaneous_reroute;
        for carrier in self.fleet.iter_mut() {
            carrier.advance();

            if carrier.goal == Some(carrier.position) && carrier.target.is_some() && carrier.station != carrier.target {
                carrier.station = carrier.target.clone();
                info!(carrier = %carrier.id, station = ?carrier.station, "arrived");
            }

            let Some(p) = reroute else { continue };
            if !carrier.is_idle() || !self.rng.gen_bool(p) {
                continue;
            }
            if let Some(k) = pick_station(&self.stations, carrier.station.as_deref(), &mut self.rng) {
                send_to(carrier, &self.stations[k], self.entries[k]);
                info!(carrier = %carrier.id, station = %self.stations[k].name, "spontaneous re-route");
                self.pending = true;
            }
        }
    }

    fn refresh_stations(&mut self) {
        let graph = &self.graph;
        let fleet = &self.fleet;
        for station in &mut self.stations {
            let occupied = fleet.iter().any(|c| station.contains(graph.cell_pos(c.position)));
            station.refresh_state(occupied);
            station.refresh_queue(|pos| graph.cell_at(pos).and_then(|cell| fleet.at(cell)));
        }
    }

    // ── External requests ─────────────────────────────────────────────────

    /// Place a new carrier on the cell at `pos`.
    pub fn add_carrier(&mut self, pos: GridPos) -> SimResult<CarrierId> {
        let cell = self.graph.cell_at(pos).ok_or(SimError::NoCellAt(pos))?;
        if self.traffic.cell_occupancy(cell) > 0 {
            return Err(SimError::CellOccupied(pos));
        }

        let id = self.fleet.add(cell);
        if let Some(s) = self.stations.iter().find(|s| s.contains(pos)) {
            self.fleet.get_mut(id)?.station = Some(s.name.clone());
        }
        self.traffic.place(&self.graph, cell);
        self.traffic.recompute_weights(&self.graph, &self.model);
        self.refresh_stations();
        self.pending = true;

        info!(carrier = %id, at = %pos, "carrier added");
        Ok(id)
    }

    /// Take a carrier off the floor.
    pub fn remove_carrier(&mut self, id: CarrierId) -> SimResult<Carrier> {
        let carrier = self.fleet.remove(id)?;
        self.traffic.vacate(&self.graph, carrier.position);
        self.traffic.recompute_weights(&self.graph, &self.model);
        self.refresh_stations();
        self.pending = true;

        info!(carrier = %id, "carrier removed");
        Ok(carrier)
    }

    /// Send a carrier to the entry of the named station.
    pub fn route_to_station(&mut self, id: CarrierId, name: &str) -> SimResult<()> {
        let k = self
            .station_index(name)
            .ok_or_else(|| SimError::UnknownStation(name.to_owned()))?;
        let carrier = self.fleet.get_mut(id)?;
        send_to(carrier, &self.stations[k], self.entries[k]);
        self.pending = true;
        Ok(())
    }

    /// Send a carrier to the cell at `pos`.
    pub fn route_to_position(&mut self, id: CarrierId, pos: GridPos) -> SimResult<()> {
        let cell = self.graph.cell_at(pos).ok_or(SimError::NoCellAt(pos))?;
        let carrier = self.fleet.get_mut(id)?;
        carrier.goal = Some(cell);
        carrier.target = None;
        self.pending = true;
        Ok(())
    }

    /// Take a station on or off line.  Online states are re-derived from
    /// occupancy at the end of every tick.
    pub fn set_station_state(&mut self, name: &str, state: StationState) -> SimResult<()> {
        let k = self
            .station_index(name)
            .ok_or_else(|| SimError::UnknownStation(name.to_owned()))?;
        self.stations[k].state = state;
        if state != StationState::Offline {
            self.refresh_stations();
        }
        Ok(())
    }

    fn station_index(&self, name: &str) -> Option<usize> {
        self.stations.iter().position(|s| s.name == name)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The next tick to be processed.
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn traffic(&self) -> &TrafficState {
        &self.traffic
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn carrier(&self, id: CarrierId) -> SimResult<&Carrier> {
        Ok(self.fleet.get(id)?)
    }

    /// The carrier's plan; `path[0]` is its current cell.
    pub fn path(&self, id: CarrierId) -> SimResult<&[CellId]> {
        Ok(self.fleet.get(id)?.path())
    }

    pub fn position(&self, id: CarrierId) -> SimResult<GridPos> {
        Ok(self.graph.cell_pos(self.fleet.get(id)?.position))
    }

    /// Grid position of every carrier, in ascending id order.
    pub fn positions(&self) -> Vec<(CarrierId, GridPos)> {
        self.fleet
            .positions()
            .map(|(id, cell)| (id, self.graph.cell_pos(cell)))
            .collect()
    }

    /// Occupancy, capacity and weight of every sector.
    pub fn sector_load(&self) -> Vec<SectorLoad> {
        (0..self.graph.sector_count())
            .map(|s| {
                let sector = SectorId(s as u32);
                SectorLoad {
                    sector,
                    label:    self.graph.sector_label(sector),
                    occupied: self.traffic.sector_occupancy(sector),
                    capacity: self.graph.capacity(sector),
                    weight:   self.traffic.sector_weight(sector),
                }
            })
            .collect()
    }

    /// Cells the carrier has stood on after each tick, oldest first.
    pub fn history(&self, id: CarrierId) -> SimResult<&[CellId]> {
        Ok(&self.fleet.get(id)?.history)
    }

    /// [`history`](Self::history) as grid positions.
    pub fn track(&self, id: CarrierId) -> SimResult<Vec<GridPos>> {
        let carrier = self.fleet.get(id)?;
        Ok(carrier.history.iter().map(|&c| self.graph.cell_pos(c)).collect())
    }

    /// The rolling negotiation and fault log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Archived sector snapshots, oldest first.
    pub fn topology_history(&self) -> impl Iterator<Item = &SectorSnapshot> + '_ {
        self.topology_history.iter()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, name: &str) -> Option<&Station> {
        self.station_index(name).map(|k| &self.stations[k])
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A random online station other than `current`, as an index.
fn pick_station(stations: &[Station], current: Option<&str>, rng: &mut SimRng) -> Option<usize> {
    let candidates: Vec<usize> = stations
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_online() && current != Some(s.name.as_str()))
        .map(|(k, _)| k)
        .collect();
    rng.choose(&candidates).copied()
}

fn send_to(carrier: &mut Carrier, station: &Station, entry: CellId) {
    carrier.goal = Some(entry);
    carrier.target = Some(station.name.clone());
}
