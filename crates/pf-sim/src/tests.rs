//! Unit tests for pf-sim.

#[cfg(test)]
mod helpers {
    use pf_core::{ControllerConfig, FloorPlan, GridPos, Rect};
    use pf_fleet::Station;
    use pf_graph::{build_from_floor, GraphStore};
    use pf_plan::{LongestWait, TwoLevelPlanner};

    use crate::{Controller, ControllerBuilder};

    pub type Ctl = Controller<TwoLevelPlanner, LongestWait>;

    pub fn config() -> ControllerConfig {
        ControllerConfig { total_ticks: 20, ..ControllerConfig::default() }
    }

    /// Open 10 × 4 floor in four 5 × 2 sectors.
    pub fn floor() -> GraphStore {
        build_from_floor(&FloorPlan::new(10, 4).unwrap(), 5, 2).unwrap()
    }

    /// One-cell-wide 6 × 1 corridor in three 2 × 1 sectors.
    pub fn corridor() -> GraphStore {
        build_from_floor(&FloorPlan::new(6, 1).unwrap(), 2, 1).unwrap()
    }

    pub fn west() -> Station {
        Station::new("west", Rect::new(0, 0, 2, 4), GridPos::new(0, 1), GridPos::new(1, 1))
    }

    pub fn east() -> Station {
        Station::new("east", Rect::new(8, 0, 2, 4), GridPos::new(9, 2), GridPos::new(8, 2))
            .with_queue([GridPos::new(7, 2)])
    }

    pub fn controller(config: ControllerConfig) -> Ctl {
        ControllerBuilder::new(config, floor())
            .stations([west(), east()])
            .build()
            .unwrap()
    }

    pub fn bare(config: ControllerConfig) -> Ctl {
        ControllerBuilder::new(config, floor()).build().unwrap()
    }

    pub fn p(x: i32, y: i32) -> GridPos {
        GridPos::new(x, y)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use pf_core::{ControllerConfig, GridPos, PfError, Rect};
    use pf_fleet::Station;

    use super::helpers::{config, east, floor, west};
    use crate::{ControllerBuilder, SimError};

    #[test]
    fn builds_with_defaults() {
        let ctl = ControllerBuilder::new(ControllerConfig::default(), floor()).build().unwrap();
        assert!(ctl.fleet().is_empty());
        assert!(ctl.stations().is_empty());
        assert_eq!(ctl.current_tick().0, 0);
        assert_eq!(ctl.sector_load().len(), 4);
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = ControllerConfig { horizon: 0, ..config() };
        let result = ControllerBuilder::new(bad, floor()).build();
        assert!(matches!(result, Err(SimError::Config(PfError::Config(_)))));
    }

    #[test]
    fn duplicate_station_rejected() {
        let result = ControllerBuilder::new(config(), floor())
            .stations([west(), east(), west()])
            .build();
        assert!(matches!(result, Err(SimError::DuplicateStation(name)) if name == "west"));
    }

    #[test]
    fn station_entry_must_be_a_cell() {
        let off = Station::new("off", Rect::new(0, 0, 1, 1), GridPos::new(20, 0), GridPos::new(0, 0));
        let result = ControllerBuilder::new(config(), floor()).stations([off]).build();
        assert!(matches!(result, Err(SimError::NoCellAt(pos)) if pos == GridPos::new(20, 0)));
    }
}

// ── Carriers and requests ─────────────────────────────────────────────────────

#[cfg(test)]
mod requests {
    use pf_core::CarrierId;
    use pf_fleet::{FleetError, StationState};

    use super::helpers::{bare, config, controller, p};
    use crate::SimError;

    #[test]
    fn add_places_and_weighs() {
        let mut ctl = bare(config());
        let id = ctl.add_carrier(p(1, 1)).unwrap();
        assert_eq!(ctl.position(id).unwrap(), p(1, 1));
        assert!(ctl.traffic().is_consistent(ctl.graph()));

        let load = ctl.sector_load();
        assert_eq!(load[0].occupied, 1);
        assert_eq!(load[0].capacity, 10);
        assert!(load[0].weight > 0.0);
        assert_eq!(load[1].occupied, 0);
    }

    #[test]
    fn add_rejects_occupied_and_missing_cells() {
        let mut ctl = bare(config());
        ctl.add_carrier(p(2, 2)).unwrap();
        assert!(matches!(ctl.add_carrier(p(2, 2)), Err(SimError::CellOccupied(_))));
        assert!(matches!(ctl.add_carrier(p(-1, 0)), Err(SimError::NoCellAt(_))));
        assert_eq!(ctl.fleet().len(), 1);
    }

    #[test]
    fn add_inside_station_marks_it_busy() {
        let mut ctl = controller(config());
        let id = ctl.add_carrier(p(0, 0)).unwrap();
        assert_eq!(ctl.carrier(id).unwrap().station.as_deref(), Some("west"));
        assert_eq!(ctl.station("west").unwrap().state, StationState::Busy);
        assert_eq!(ctl.station("east").unwrap().state, StationState::Starving);
    }

    #[test]
    fn remove_frees_the_cell() {
        let mut ctl = bare(config());
        let id = ctl.add_carrier(p(3, 0)).unwrap();
        let removed = ctl.remove_carrier(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(ctl.traffic().sector_occupancies().iter().all(|&n| n == 0));
        ctl.add_carrier(p(3, 0)).unwrap();

        assert!(matches!(
            ctl.remove_carrier(CarrierId(42)),
            Err(SimError::Fleet(FleetError::UnknownCarrier(CarrierId(42))))
        ));
    }

    #[test]
    fn unknown_station_requests() {
        let mut ctl = controller(config());
        let id = ctl.add_carrier(p(4, 0)).unwrap();
        assert!(matches!(ctl.route_to_station(id, "north"), Err(SimError::UnknownStation(_))));
        assert!(matches!(
            ctl.set_station_state("north", StationState::Offline),
            Err(SimError::UnknownStation(_))
        ));
        assert!(matches!(ctl.route_to_position(id, p(30, 30)), Err(SimError::NoCellAt(_))));
    }
}

// ── Tick behaviour ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick {
    use pf_core::ControllerConfig;
    use pf_fleet::StationState;

    use super::helpers::{bare, config, controller, corridor, p};
    use crate::{ControllerBuilder, NoopObserver, TickFault};

    #[test]
    fn route_to_position_walks_shortest_path() {
        let mut ctl = bare(config());
        let id = ctl.add_carrier(p(0, 0)).unwrap();
        ctl.route_to_position(id, p(4, 0)).unwrap();

        let first = ctl.tick().unwrap();
        assert!(first.replanned);
        assert_eq!(ctl.position(id).unwrap(), p(1, 0));

        ctl.run_ticks(3, &mut NoopObserver).unwrap();
        assert_eq!(ctl.position(id).unwrap(), p(4, 0));
        assert_eq!(ctl.track(id).unwrap(), vec![p(0, 0), p(1, 0), p(2, 0), p(3, 0), p(4, 0)]);

        // No stations: the carrier idles once there.
        ctl.run_ticks(2, &mut NoopObserver).unwrap();
        assert_eq!(ctl.position(id).unwrap(), p(4, 0));
        assert_eq!(ctl.history(id).unwrap().len(), 7);
    }

    #[test]
    fn arriving_sets_station() {
        let mut ctl = controller(config());
        let id = ctl.add_carrier(p(0, 0)).unwrap();
        ctl.route_to_station(id, "east").unwrap();

        ctl.run_ticks(11, &mut NoopObserver).unwrap();
        assert_eq!(ctl.position(id).unwrap(), p(9, 2));
        assert_eq!(ctl.carrier(id).unwrap().station.as_deref(), Some("east"));
        assert_eq!(ctl.station("east").unwrap().state, StationState::Busy);
        assert_eq!(ctl.station("west").unwrap().state, StationState::Starving);
    }

    #[test]
    fn idle_carriers_get_a_different_station() {
        let mut ctl = controller(config());
        let id = ctl.add_carrier(p(1, 3)).unwrap();
        ctl.tick().unwrap();
        let carrier = ctl.carrier(id).unwrap();
        assert_eq!(carrier.target.as_deref(), Some("east"));
        assert_eq!(carrier.goal, ctl.graph().cell_at(p(9, 2)));
    }

    #[test]
    fn offline_stations_are_never_chosen() {
        let mut ctl = controller(config());
        ctl.set_station_state("east", StationState::Offline).unwrap();
        let id = ctl.add_carrier(p(1, 3)).unwrap();
        ctl.run_ticks(3, &mut NoopObserver).unwrap();
        assert_eq!(ctl.carrier(id).unwrap().goal, None);
        assert_eq!(ctl.position(id).unwrap(), p(1, 3));
        assert_eq!(ctl.station("east").unwrap().state, StationState::Offline);
    }

    #[test]
    fn replans_every_horizon_without_events() {
        let mut ctl = bare(ControllerConfig { horizon: 3, ..config() });
        let id = ctl.add_carrier(p(0, 3)).unwrap();
        ctl.route_to_position(id, p(9, 3)).unwrap();

        let replanned: Vec<bool> = (0..7).map(|_| ctl.tick().unwrap().replanned).collect();
        assert_eq!(replanned, vec![true, false, false, true, false, false, true]);
        assert_eq!(ctl.position(id).unwrap(), p(7, 3));
    }

    #[test]
    fn external_request_forces_replan() {
        let mut ctl = bare(ControllerConfig { horizon: 4, ..config() });
        let id = ctl.add_carrier(p(0, 0)).unwrap();
        ctl.tick().unwrap();
        assert!(!ctl.tick().unwrap().replanned);

        ctl.route_to_position(id, p(0, 3)).unwrap();
        let report = ctl.tick().unwrap();
        assert!(report.replanned);
        assert!(report.coordination.is_some());
        assert_eq!(ctl.position(id).unwrap(), p(0, 1));
    }

    #[test]
    fn spontaneous_reroute_sends_idle_carriers_away() {
        let cfg = ControllerConfig { spontaneous_reroute: Some(1.0), ..config() };
        let mut ctl = controller(cfg);
        let id = ctl.add_carrier(p(1, 1)).unwrap();
        ctl.route_to_position(id, p(2, 1)).unwrap();
        ctl.tick().unwrap();

        let carrier = ctl.carrier(id).unwrap();
        assert_eq!(carrier.position, ctl.graph().cell_at(p(2, 1)).unwrap());
        assert_eq!(carrier.target.as_deref(), Some("east"));
    }

    #[test]
    fn reroute_disabled_by_default() {
        let mut ctl = controller(config());
        let id = ctl.add_carrier(p(1, 1)).unwrap();
        ctl.route_to_position(id, p(2, 1)).unwrap();
        ctl.tick().unwrap();
        assert_eq!(ctl.carrier(id).unwrap().target, None);
    }

    #[test]
    fn head_on_in_a_corridor_never_collides() {
        let mut ctl = ControllerBuilder::new(config(), corridor()).build().unwrap();
        let a = ctl.add_carrier(p(1, 0)).unwrap();
        let b = ctl.add_carrier(p(4, 0)).unwrap();
        ctl.route_to_position(a, p(5, 0)).unwrap();
        ctl.route_to_position(b, p(0, 0)).unwrap();

        for _ in 0..10 {
            let report = ctl.tick().unwrap();
            assert!(
                !report.faults.iter().any(|f| matches!(f, TickFault::OccupancyViolated { .. })),
                "{report:?}"
            );
        }
        assert_ne!(ctl.position(a).unwrap(), ctl.position(b).unwrap());
        assert!(ctl.events().lines().any(|l| l.starts_with("Negotiating...")));
    }
}

// ── Invariants over long runs ─────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use pf_core::{ControllerConfig, GridPos, WeightMode};

    use super::helpers::{config, controller, p, Ctl};
    use crate::{NoopObserver, TickFault};

    fn busy(cfg: ControllerConfig) -> Ctl {
        let mut ctl = controller(cfg);
        for pos in [p(0, 0), p(1, 2), p(4, 1), p(5, 3), p(7, 0), p(9, 3)] {
            ctl.add_carrier(pos).unwrap();
        }
        ctl
    }

    fn check_run(mut ctl: Ctl, ticks: usize) {
        for _ in 0..ticks {
            let report = ctl.tick().unwrap();
            assert!(
                !report.faults.iter().any(|f| matches!(f, TickFault::OccupancyViolated { .. })),
                "{report:?}"
            );
            assert!(ctl.traffic().is_consistent(ctl.graph()));
            assert!(ctl.traffic().cell_occupancies().iter().all(|&n| n <= 1));
        }
    }

    #[test]
    fn no_cell_ever_holds_two_carriers() {
        check_run(busy(config()), 150);
    }

    #[test]
    fn consensus_mode_keeps_invariants() {
        check_run(busy(ControllerConfig { weight_mode: WeightMode::Consensus, ..config() }), 100);
    }

    fn check_clean_run(mut ctl: Ctl, ticks: usize) {
        for _ in 0..ticks {
            let report = ctl.tick().unwrap();
            assert!(report.is_clean(), "{report:?}");
            assert!(ctl.traffic().is_consistent(ctl.graph()));
            for carrier in ctl.fleet().iter() {
                assert_eq!(carrier.path()[0], carrier.position, "carrier {:?}", carrier.id);
            }
        }
    }

    #[test]
    fn longer_horizons_keep_invariants() {
        for horizon in [2, 3, 5] {
            for weight_mode in [WeightMode::Origin, WeightMode::Consensus] {
                for seed in 0..4 {
                    let cfg = ControllerConfig { horizon, weight_mode, seed, ..config() };
                    check_clean_run(busy(cfg), 150);
                }
            }
        }
    }

    #[test]
    fn carriers_shuttle_between_stations() {
        let mut ctl = busy(config());
        ctl.run_ticks(120, &mut NoopObserver).unwrap();
        let visited = ctl
            .fleet()
            .iter()
            .filter(|c| c.history.iter().any(|&cell| ctl.graph().cell_pos(cell) == GridPos::new(9, 2)))
            .count();
        assert!(visited > 0);
    }

    #[test]
    fn same_seed_same_run() {
        let cfg = ControllerConfig { seed: 7, ..config() };
        let mut a = busy(cfg.clone());
        let mut b = busy(cfg);
        a.run_ticks(60, &mut NoopObserver).unwrap();
        b.run_ticks(60, &mut NoopObserver).unwrap();
        assert_eq!(a.positions(), b.positions());
        for id in a.fleet().ids() {
            assert_eq!(a.history(id).unwrap(), b.history(id).unwrap());
        }
        assert_eq!(a.events().lines().collect::<Vec<_>>(), b.events().lines().collect::<Vec<_>>());
    }

    #[test]
    fn topology_history_is_bounded() {
        let mut ctl = busy(ControllerConfig { history_len: 3, ..config() });
        ctl.run_ticks(10, &mut NoopObserver).unwrap();
        let ticks: Vec<u64> = ctl.topology_history().map(|s| s.tick.0).collect();
        assert_eq!(ticks, vec![7, 8, 9]);
        for snap in ctl.topology_history() {
            assert_eq!(snap.occupied.iter().sum::<u32>(), 6);
            assert_eq!(snap.weights.len(), 4);
        }
    }
}

// ── Reports and observers ─────────────────────────────────────────────────────

#[cfg(test)]
mod reporting {
    use pf_core::{CellId, ControllerConfig, Tick};
    use pf_fleet::Fleet;
    use pf_graph::GraphStore;
    use pf_traffic::TrafficState;

    use super::helpers::{controller, p};
    use crate::{SimError, TickFault, TickObserver, TickReport};

    #[derive(Default)]
    struct Recorder {
        starts:    Vec<u64>,
        ends:      Vec<u64>,
        snapshots: Vec<(u64, usize)>,
        finished:  Option<Tick>,
    }

    impl TickObserver for Recorder {
        fn on_tick_start(&mut self, tick: Tick) {
            self.starts.push(tick.0);
        }

        fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
            assert_eq!(tick, report.tick);
            self.ends.push(tick.0);
        }

        fn on_snapshot(&mut self, tick: Tick, fleet: &Fleet, _graph: &GraphStore, _traffic: &TrafficState) {
            self.snapshots.push((tick.0, fleet.len()));
        }

        fn on_run_end(&mut self, final_tick: Tick) {
            self.finished = Some(final_tick);
        }
    }

    #[test]
    fn run_calls_every_hook() {
        let cfg = ControllerConfig { total_ticks: 5, output_interval_ticks: 2, ..ControllerConfig::default() };
        let mut ctl = controller(cfg);
        ctl.add_carrier(p(0, 0)).unwrap();

        let mut rec = Recorder::default();
        let summary = ctl.run(&mut rec).unwrap();

        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.faulted_ticks, 0);
        assert_eq!(rec.starts, vec![0, 1, 2, 3, 4]);
        assert_eq!(rec.ends, rec.starts);
        assert_eq!(rec.snapshots, vec![(0, 1), (2, 1), (4, 1)]);
        assert_eq!(rec.finished, Some(Tick(5)));

        // Already at the end.
        assert_eq!(ctl.run(&mut rec).unwrap().ticks, 0);
    }

    #[test]
    fn faults_convert_to_errors() {
        let clean = TickReport { tick: Tick(3), replanned: false, coordination: None, faults: vec![] };
        assert!(clean.is_clean());
        assert!(clean.into_result().is_ok());

        let crowded = TickReport {
            tick:         Tick(4),
            replanned:    true,
            coordination: None,
            faults:       vec![TickFault::OccupancyViolated { cells: vec![CellId(2)] }],
        };
        assert!(matches!(
            crowded.into_result(),
            Err(SimError::OccupancyInvariantViolated { tick: Tick(4), .. })
        ));

        let stuck = TickReport {
            tick:         Tick(5),
            replanned:    true,
            coordination: None,
            faults:       vec![TickFault::CoordinationBoundExceeded { rounds: 9 }],
        };
        assert!(matches!(
            stuck.into_result(),
            Err(SimError::UnboundedCoordinationLoop { rounds: 9, .. })
        ));
    }
}
