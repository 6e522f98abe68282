//! Fluent builder for constructing a [`Controller`].

use std::collections::{HashSet, VecDeque};

use pf_core::{ControllerConfig, EventLog, SimRng, Tick};
use pf_fleet::{Fleet, Station};
use pf_graph::GraphStore;
use pf_plan::{ConflictCoordinator, LongestWait, NegotiationPolicy, PathPlanner, TwoLevelPlanner};
use pf_traffic::{CongestionModel, PredictionWindow, TrafficState};

use crate::{Controller, SimError, SimResult};

/// Fluent builder for [`Controller<P, N>`].
///
/// # Required inputs
///
/// - [`ControllerConfig`]: horizon, gain, weight mode, seed, …
/// - [`GraphStore`]: the topology and roadmap carriers move on
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                          |
/// |-----------------|----------------------------------|
/// | `.stations(v)`  | none; carriers never get goals   |
/// | `.planner(p)`   | [`TwoLevelPlanner`]              |
/// | `.policy(n)`    | [`LongestWait`]                  |
///
/// # Example
///
/// ```rust,ignore
/// let mut ctl = ControllerBuilder::new(config, graph)
///     .stations(stations)
///     .build()?;
/// ctl.add_carrier(GridPos::new(3, 4))?;
/// ctl.run(&mut NoopObserver)?;
/// ```
pub struct ControllerBuilder<P = TwoLevelPlanner, N = LongestWait> {
    config:   ControllerConfig,
    graph:    GraphStore,
    stations: Vec<Station>,
    planner:  P,
    policy:   N,
}

impl ControllerBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: ControllerConfig, graph: GraphStore) -> Self {
        Self {
            config,
            graph,
            stations: Vec::new(),
            planner:  TwoLevelPlanner,
            policy:   LongestWait,
        }
    }
}

impl<P: PathPlanner, N: NegotiationPolicy> ControllerBuilder<P, N> {
    /// Supply the workstations carriers are sent between.
    ///
    /// Each entry position must be a roadmap cell; names must be unique.
    pub fn stations(mut self, stations: impl IntoIterator<Item = Station>) -> Self {
        self.stations.extend(stations);
        self
    }

    /// Swap in a different path planner.
    pub fn planner<Q: PathPlanner>(self, planner: Q) -> ControllerBuilder<Q, N> {
        ControllerBuilder {
            config:   self.config,
            graph:    self.graph,
            stations: self.stations,
            planner,
            policy:   self.policy,
        }
    }

    /// Swap in a different negotiation policy.
    pub fn policy<M: NegotiationPolicy>(self, policy: M) -> ControllerBuilder<P, M> {
        ControllerBuilder {
            config:   self.config,
            graph:    self.graph,
            stations: self.stations,
            planner:  self.planner,
            policy,
        }
    }

    /// Validate inputs and return an empty, ready-to-run [`Controller`].
    pub fn build(self) -> SimResult<Controller<P, N>> {
        self.config.validate()?;

        // ── Resolve station entries ───────────────────────────────────────
        let mut names = HashSet::new();
        let mut entries = Vec::with_capacity(self.stations.len());
        for station in &self.stations {
            if !names.insert(station.name.as_str()) {
                return Err(SimError::DuplicateStation(station.name.clone()));
            }
            let cell = self
                .graph
                .cell_at(station.entry)
                .ok_or(SimError::NoCellAt(station.entry))?;
            entries.push(cell);
        }

        let model   = CongestionModel::from_config(&self.graph, &self.config);
        let mut traffic = TrafficState::new(&self.graph);
        traffic.recompute_weights(&self.graph, &model);

        Ok(Controller {
            window:           PredictionWindow::new(self.config.horizon),
            coordinator:      ConflictCoordinator::new(self.policy, self.config.max_coordination_rounds),
            rng:              SimRng::new(self.config.seed),
            events:           EventLog::new(self.config.event_log_len),
            topology_history: VecDeque::with_capacity(self.config.history_len),
            tick:             Tick::ZERO,
            idle_step:        0,
            pending:          false,
            fleet:            Fleet::new(),
            planner:          self.planner,
            stations:         self.stations,
            entries,
            model,
            traffic,
            graph:            self.graph,
            config:           self.config,
        })
    }
}
