//! Unit tests for pf-plan.

#[cfg(test)]
mod helpers {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use pf_core::{CarrierId, CellId, EventLog, FloorPlan, GridPos, WeightMode};
    use pf_fleet::Fleet;
    use pf_graph::{build_from_floor, GraphStore};
    use pf_traffic::{CongestionModel, PredictionWindow, TrafficState};

    use crate::{ConflictCoordinator, CoordinationOutcome, NegotiationPolicy, Snapshot, TwoLevelPlanner};

    /// An open `w × h` floor cut into `sw × sh` sectors.
    pub fn floor(w: i32, h: i32, sw: i32, sh: i32) -> GraphStore {
        build_from_floor(&FloorPlan::new(w, h).unwrap(), sw, sh).unwrap()
    }

    pub fn at(graph: &GraphStore, x: i32, y: i32) -> CellId {
        graph.cell_at(GridPos::new(x, y)).unwrap()
    }

    /// Log sink shared between a test and its scoped subscriber.
    #[derive(Clone, Default)]
    pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with `WARN`-and-above events captured as plain text.
    pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buf = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buf.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
        (out, text)
    }

    /// A graph plus a fleet with hand-written plans, ready to coordinate.
    pub struct Rig {
        pub graph:   GraphStore,
        pub model:   CongestionModel,
        pub fleet:   Fleet,
        pub log:     EventLog,
        pub horizon: usize,
    }

    impl Rig {
        pub fn new(graph: GraphStore, horizon: usize) -> Self {
            let model = CongestionModel::new(&graph, WeightMode::Origin, 10.0);
            Self { graph, model, fleet: Fleet::new(), log: EventLog::new(16), horizon }
        }

        pub fn add(&mut self, path: &[CellId], waited: u32) -> CarrierId {
            let id = self.fleet.add(path[0]);
            let c = self.fleet.get_mut(id).unwrap();
            c.set_path(path.to_vec()).unwrap();
            c.goal = path.last().copied();
            c.waited = waited;
            id
        }

        pub fn base(&self) -> TrafficState {
            let mut base = TrafficState::new(&self.graph);
            for c in self.fleet.iter() {
                base.place(&self.graph, c.position);
            }
            base.recompute_weights(&self.graph, &self.model);
            base
        }

        pub fn resolve_with<N: NegotiationPolicy>(&mut self, coord: &ConflictCoordinator<N>) -> CoordinationOutcome {
            let base = self.base();
            let mut window = PredictionWindow::new(self.horizon);
            window.rebuild(&self.graph, &base, &self.model, &self.fleet.paths());
            let snap = Snapshot { graph: &self.graph, model: &self.model, base: &base };
            coord
                .resolve(snap, &mut self.fleet, &mut window, &TwoLevelPlanner, &mut self.log)
                .unwrap()
        }

        pub fn path(&self, id: CarrierId) -> Vec<CellId> {
            self.fleet.get(id).unwrap().path().to_vec()
        }
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use pf_core::{CarrierId, SectorId, WeightMode};
    use pf_traffic::{CongestionModel, TrafficState};

    use super::helpers::{at, capture_warnings, floor};
    use crate::{PathPlanner, PlanRequest, RouteQuality, TwoLevelPlanner};

    #[test]
    fn same_cell_is_a_single_step() {
        let g = floor(3, 1, 3, 1);
        let s = TrafficState::new(&g);
        let a = at(&g, 1, 0);
        let r = TwoLevelPlanner.plan(&g, &s, PlanRequest::new(CarrierId(0), a, a));
        assert_eq!(r.cells, vec![a]);
        assert_eq!(r.quality, RouteQuality::Direct);
    }

    #[test]
    fn direct_route_starts_at_source() {
        let g = floor(6, 2, 2, 2);
        let s = TrafficState::new(&g);
        let (from, to) = (at(&g, 0, 0), at(&g, 5, 1));
        let r = TwoLevelPlanner.plan(&g, &s, PlanRequest::new(CarrierId(0), from, to));
        assert_eq!(r.quality, RouteQuality::Direct);
        assert_eq!(r.cells.first(), Some(&from));
        assert_eq!(r.cells.last(), Some(&to));
        // Manhattan distance 6 → 7 cells on an open floor.
        assert_eq!(r.cells.len(), 7);
    }

    #[test]
    fn excluded_sector_falls_back_to_degraded() {
        // Three 2×2 sectors in a row; excluding a cell of the middle one
        // leaves no sector corridor, but the cell level can go around it.
        let g = floor(6, 2, 2, 2);
        let s = TrafficState::new(&g);
        let (from, to) = (at(&g, 0, 0), at(&g, 5, 0));
        let blocked = [at(&g, 2, 0)];
        let (r, logged) = capture_warnings(|| {
            TwoLevelPlanner.plan(&g, &s, PlanRequest::new(CarrierId(0), from, to).excluding(&blocked))
        });
        assert_eq!(r.quality, RouteQuality::Degraded);
        assert!(logged.contains("WARN"), "{logged}");
        assert!(logged.contains("no sector corridor under exclusion"), "{logged}");
        assert_eq!(r.cells.first(), Some(&from));
        assert_eq!(r.cells.last(), Some(&to));
        assert!(!r.cells.contains(&blocked[0]));
    }

    #[test]
    fn unreachable_target_strands() {
        let g = floor(3, 1, 3, 1);
        let s = TrafficState::new(&g);
        let (from, to) = (at(&g, 0, 0), at(&g, 2, 0));
        let blocked = [at(&g, 1, 0)];
        let r = TwoLevelPlanner.plan(
            &g,
            &s,
            PlanRequest::new(CarrierId(0), from, to).excluding(&blocked),
        );
        assert_eq!(r.quality, RouteQuality::Stranded);
        assert_eq!(r.cells, vec![from, from]);
    }

    #[test]
    fn congestion_steers_between_corridors() {
        // 2×2 sectors on a 4×4 floor: s0 top-left, s1 top-right,
        // s2 bottom-left, s3 bottom-right.  Going s0 → s3 can pass s1 or s2.
        let g = floor(4, 4, 2, 2);
        let m = CongestionModel::new(&g, WeightMode::Origin, 10.0);
        let mut s = TrafficState::new(&g);
        // Load the top-right sector.
        s.place(&g, at(&g, 3, 0));
        s.place(&g, at(&g, 2, 0));
        s.recompute_weights(&g, &m);
        assert!(s.sector_weights()[1] > 0.0);

        let (from, to) = (at(&g, 1, 1), at(&g, 2, 2));
        let r = TwoLevelPlanner.plan(&g, &s, PlanRequest::new(CarrierId(0), from, to));
        let via_top_right = r.cells.iter().any(|&c| g.host(c) == SectorId(1));
        assert!(!via_top_right, "route {:?} should avoid the loaded sector", r.cells);
    }
}

// ── Negotiation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod negotiation {
    use pf_core::CarrierId;

    use crate::{negotiation_line, Contender, LongestWait, NegotiationPolicy};

    fn k(id: u32, waited: u32) -> Contender {
        Contender { id: CarrierId(id), waited }
    }

    #[test]
    fn longest_wait_wins() {
        let p = LongestWait;
        assert_eq!(p.negotiate(&[k(0, 0), k(1, 5)], &[]), Some(CarrierId(1)));
        assert_eq!(p.negotiate(&[k(0, 5), k(1, 0)], &[]), Some(CarrierId(0)));
    }

    #[test]
    fn ties_go_to_first() {
        assert_eq!(LongestWait.negotiate(&[k(2, 3), k(4, 3), k(6, 1)], &[]), Some(CarrierId(2)));
    }

    #[test]
    fn incumbent_beats_waiting() {
        let got = LongestWait.negotiate(&[k(0, 9), k(1, 0), k(2, 0)], &[CarrierId(1), CarrierId(2)]);
        assert_eq!(got, Some(CarrierId(1)));
    }

    #[test]
    fn nothing_to_decide() {
        assert_eq!(LongestWait.negotiate(&[k(0, 0)], &[]), None);
        assert_eq!(LongestWait.negotiate(&[], &[]), None);
    }

    #[test]
    fn deterministic() {
        let set = [k(3, 2), k(5, 7), k(8, 7)];
        let first = LongestWait.negotiate(&set, &[]);
        for _ in 0..10 {
            assert_eq!(LongestWait.negotiate(&set, &[]), first);
        }
    }

    #[test]
    fn log_line_format() {
        assert_eq!(
            negotiation_line(&[k(1, 0), k(4, 2)], Some(CarrierId(4))),
            "Negotiating... [1, 4] Negotiating ended: 4 won."
        );
        assert_eq!(negotiation_line(&[k(1, 0)], None), "Negotiating... [1] Negotiating ended: None.");
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod coordinator {
    use pf_core::CarrierId;

    use super::helpers::{at, floor, Rig};
    use crate::{Contender, ConflictCoordinator, CoordinationOutcome, LongestWait, NegotiationPolicy};

    fn coord() -> ConflictCoordinator<LongestWait> {
        ConflictCoordinator::new(LongestWait, 64)
    }

    #[test]
    fn conflict_free_window_is_untouched() {
        let g = floor(5, 2, 5, 2);
        let mut rig = Rig::new(g, 3);
        let top = [at(&rig.graph, 0, 0), at(&rig.graph, 1, 0), at(&rig.graph, 2, 0)];
        let bottom = [at(&rig.graph, 4, 1), at(&rig.graph, 3, 1)];
        let a = rig.add(&top, 0);
        let b = rig.add(&bottom, 0);

        assert_eq!(rig.resolve_with(&coord()), CoordinationOutcome::Resolved { rounds: 0 });
        assert_eq!(rig.path(a), top.to_vec());
        assert_eq!(rig.path(b), bottom.to_vec());
        assert!(rig.log.is_empty());

        assert_eq!(rig.resolve_with(&coord()), CoordinationOutcome::Resolved { rounds: 0 });
        assert_eq!(rig.path(a), top.to_vec());
    }

    #[test]
    fn lot_conflict_loser_waits_once() {
        // L2 L1 C R1 R2: both head for C, arriving at step 2.
        let g = floor(5, 1, 5, 1);
        let mut rig = Rig::new(g, 2);
        let [l2, l1, c, r1, r2] = [0, 1, 2, 3, 4].map(|x| at(&rig.graph, x, 0));
        let a = rig.add(&[l2, l1, c], 0);
        let b = rig.add(&[r2, r1, c], 1);

        let outcome = rig.resolve_with(&coord());
        assert_eq!(outcome, CoordinationOutcome::Resolved { rounds: 1 });
        assert_eq!(rig.path(a), vec![l2, l1, l1, c]);
        assert_eq!(rig.path(b), vec![r2, r1, c]);
        assert_eq!(rig.log.latest(), Some("Negotiating... [0, 1] Negotiating ended: 1 won."));
    }

    #[test]
    fn longer_wait_wins_lot() {
        let g = floor(5, 1, 5, 1);
        let mut rig = Rig::new(g, 2);
        let [l2, l1, c, r1, r2] = [0, 1, 2, 3, 4].map(|x| at(&rig.graph, x, 0));
        let a = rig.add(&[l2, l1, c], 5);
        let b = rig.add(&[r2, r1, c], 0);

        rig.resolve_with(&coord());
        assert_eq!(rig.path(a), vec![l2, l1, c]);
        assert_eq!(rig.path(b), vec![r2, r1, r1, c]);
    }

    #[test]
    fn incumbent_keeps_its_cell() {
        // B is parked on C; A wants to pass through it.
        let g = floor(5, 1, 5, 1);
        let mut rig = Rig::new(g, 2);
        let [l1, c, r1] = [1, 2, 3].map(|x| at(&rig.graph, x, 0));
        let a = rig.add(&[l1, c, r1], 9);
        let b = rig.add(&[c], 0);

        rig.resolve_with(&coord());
        assert_eq!(rig.path(b), vec![c]);
        assert_eq!(rig.path(a)[1], l1);
    }

    #[test]
    fn transition_loser_replans_around_winner() {
        // a b c
        // d e f
        let g = floor(3, 2, 3, 2);
        let mut rig = Rig::new(g, 2);
        let [a, b, c] = [0, 1, 2].map(|x| at(&rig.graph, x, 0));
        let d = at(&rig.graph, 0, 1);
        let e = at(&rig.graph, 1, 1);
        let p = rig.add(&[a, b, c], 3);
        let q = rig.add(&[b, a, d], 0);

        let outcome = rig.resolve_with(&coord());
        assert_eq!(outcome, CoordinationOutcome::Resolved { rounds: 1 });
        assert_eq!(rig.path(p), vec![a, b, c]);

        let qp = rig.path(q);
        assert_eq!(qp[0], b);
        assert_ne!(qp[1], a);
        assert_eq!(qp.last(), Some(&d));
        assert_eq!(qp, vec![b, e, d]);
    }

    #[test]
    fn resolution_is_deterministic() {
        let run = || {
            let g = floor(5, 1, 5, 1);
            let mut rig = Rig::new(g, 3);
            let cells = [0, 1, 2, 3, 4].map(|x| at(&rig.graph, x, 0));
            rig.add(&[cells[0], cells[1], cells[2], cells[3]], 0);
            rig.add(&[cells[4], cells[3], cells[2]], 0);
            rig.resolve_with(&coord());
            rig.fleet.paths()
        };
        assert_eq!(run(), run());
    }

    struct NeverDecide;

    impl NegotiationPolicy for NeverDecide {
        fn negotiate(&self, _: &[Contender], _: &[CarrierId]) -> Option<CarrierId> {
            None
        }
    }

    #[test]
    fn bound_exceeded_is_reported() {
        let g = floor(5, 1, 5, 1);
        let mut rig = Rig::new(g, 2);
        let [l2, l1, c, r1, r2] = [0, 1, 2, 3, 4].map(|x| at(&rig.graph, x, 0));
        rig.add(&[l2, l1, c], 0);
        rig.add(&[r2, r1, c], 0);

        let stuck = ConflictCoordinator::new(NeverDecide, 3);
        assert_eq!(rig.resolve_with(&stuck), CoordinationOutcome::BoundExceeded { rounds: 3 });
        assert_eq!(rig.log.len(), 3);
    }
}
