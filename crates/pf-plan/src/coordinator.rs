//! Conflict detection and resolution over the prediction window.
//!
//! # Algorithm
//!
//! ```text
//! loop
//!     scan t = 1..=H, lot before transition at each t
//!     no conflict            → Resolved
//!     rounds == max_rounds   → BoundExceeded
//!     negotiate, mutate the losers' plans, rebuild the window, rounds += 1
//! ```
//!
//! | Conflict     | Detected when                                 | Loser's fix                       |
//! |--------------|-----------------------------------------------|-----------------------------------|
//! | `Lot`        | a cell holds > 1 carrier at step `t`          | one-tick wait inserted at `t`     |
//! | `Transition` | two carriers swap cells between `t-1` and `t` | re-plan from `t-1`, avoiding the winner's cell |
//!
//! Every fix either delays a carrier or moves it off the contested edge, so
//! in practice the loop settles in a handful of rounds; the bound only
//! guards against pathological layouts.

use tracing::{error, warn};

use pf_core::{CarrierId, CellId, EventLog};
use pf_fleet::Fleet;
use pf_graph::GraphStore;
use pf_traffic::{CongestionModel, PredictionWindow, TrafficState};

use crate::error::PlanResult;
use crate::negotiation::{negotiation_line, Contender, NegotiationPolicy};
use crate::planner::{PathPlanner, PlanRequest};

/// The first conflict found in a window scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// Several carriers predicted on `cell` at `step`.
    Lot { step: usize, cell: CellId, contenders: Vec<CarrierId> },
    /// `first` and `second` swap cells between `step - 1` and `step`.
    Transition { step: usize, first: CarrierId, second: CarrierId },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordinationOutcome {
    /// A full scan found nothing after `rounds` fixes.
    Resolved { rounds: usize },
    /// Gave up after `rounds` fixes; plans may still conflict.
    BoundExceeded { rounds: usize },
}

/// Read-only inputs every coordination round needs.
#[derive(Copy, Clone)]
pub struct Snapshot<'a> {
    pub graph: &'a GraphStore,
    pub model: &'a CongestionModel,
    /// Step 0 of the window.
    pub base:  &'a TrafficState,
}

/// Drives the window to a conflict-free fixed point.
#[derive(Clone, Debug)]
pub struct ConflictCoordinator<N> {
    policy:     N,
    max_rounds: usize,
}

impl<N: NegotiationPolicy> ConflictCoordinator<N> {
    pub fn new(policy: N, max_rounds: usize) -> Self {
        Self { policy, max_rounds: max_rounds.max(1) }
    }

    pub fn policy(&self) -> &N {
        &self.policy
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    // ── Detection ─────────────────────────────────────────────────────────

    /// The first conflict in `window`.  `ids[k]` owns `window.paths()[k]`.
    pub fn find_conflict(&self, ids: &[CarrierId], window: &PredictionWindow, base: &TrafficState) -> Option<Conflict> {
        let paths = window.paths();
        for t in 1..=window.horizon() {
            if let Some(cell) = window.overcrowded(base, t) {
                let contenders = ids
                    .iter()
                    .zip(paths)
                    .filter(|(_, p)| p[t] == cell)
                    .map(|(&id, _)| id)
                    .collect();
                return Some(Conflict::Lot { step: t, cell, contenders });
            }
            for i in 0..paths.len() {
                let (a0, a1) = (paths[i][t - 1], paths[i][t]);
                if a0 == a1 {
                    continue;
                }
                for j in i + 1..paths.len() {
                    if paths[j][t - 1] == a1 && paths[j][t] == a0 {
                        return Some(Conflict::Transition { step: t, first: ids[i], second: ids[j] });
                    }
                }
            }
        }
        None
    }

    // ── Resolution ────────────────────────────────────────────────────────

    /// Resolve conflicts until none remain or the round bound is hit.
    ///
    /// `window` must have been rebuilt from `fleet.paths()` against
    /// `snap.base`; it is left consistent with the fleet on return.
    pub fn resolve<P: PathPlanner + ?Sized>(
        &self,
        snap: Snapshot<'_>,
        fleet: &mut Fleet,
        window: &mut PredictionWindow,
        planner: &P,
        log: &mut EventLog,
    ) -> PlanResult<CoordinationOutcome> {
        let mut rounds = 0;
        loop {
            let ids: Vec<CarrierId> = fleet.ids().collect();
            let Some(conflict) = self.find_conflict(&ids, window, snap.base) else {
                return Ok(CoordinationOutcome::Resolved { rounds });
            };
            if rounds >= self.max_rounds {
                error!(rounds, ?conflict, "coordination bound exceeded");
                return Ok(CoordinationOutcome::BoundExceeded { rounds });
            }
            rounds += 1;

            match conflict {
                Conflict::Lot { step, cell, contenders } => {
                    self.resolve_lot(snap.graph, fleet, window, step, cell, &contenders, log)?;
                }
                Conflict::Transition { step, first, second } => {
                    self.resolve_transition(snap, fleet, window, planner, step, [first, second], log)?;
                }
            }
            window.rebuild(snap.graph, snap.base, snap.model, &fleet.paths());
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_lot(
        &self,
        graph: &GraphStore,
        fleet: &mut Fleet,
        window: &PredictionWindow,
        t: usize,
        cell: CellId,
        ids: &[CarrierId],
        log: &mut EventLog,
    ) -> PlanResult<()> {
        warn!(step = t, cell = graph.cell_label(cell), carriers = ?ids, "lot conflict");
        log_paths(graph, fleet, ids);

        let mut contenders = Vec::with_capacity(ids.len());
        let mut prioritized = Vec::new();
        for &id in ids {
            contenders.push(Contender { id, waited: fleet.get(id)?.waited });
            let held = row_of(fleet, id)
                .and_then(|k| window.cell_at(k, t - 1))
                .is_some_and(|c| c == cell);
            if held {
                prioritized.push(id);
            }
        }

        let winner = self.policy.negotiate(&contenders, &prioritized);
        log.push(negotiation_line(&contenders, winner));
        let Some(winner) = winner else { return Ok(()) };

        for &id in ids {
            if id != winner {
                fleet.get_mut(id)?.insert_wait(t)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_transition<P: PathPlanner + ?Sized>(
        &self,
        snap: Snapshot<'_>,
        fleet: &mut Fleet,
        window: &PredictionWindow,
        planner: &P,
        t: usize,
        pair: [CarrierId; 2],
        log: &mut EventLog,
    ) -> PlanResult<()> {
        warn!(step = t, first = %pair[0], second = %pair[1], "transition conflict");
        log_paths(snap.graph, fleet, &pair);

        let contenders = [
            Contender { id: pair[0], waited: fleet.get(pair[0])?.waited },
            Contender { id: pair[1], waited: fleet.get(pair[1])?.waited },
        ];
        let winner = self.policy.negotiate(&contenders, &[]);
        log.push(negotiation_line(&contenders, winner));
        let Some(winner) = winner else { return Ok(()) };
        let loser = if winner == pair[0] { pair[1] } else { pair[0] };

        let (Some(kl), Some(kw)) = (row_of(fleet, loser), row_of(fleet, winner)) else {
            return Ok(());
        };
        let (Some(source), Some(held)) = (window.cell_at(kl, t - 1), window.cell_at(kw, t - 1)) else {
            return Ok(());
        };
        let blocked = [held];
        let target = fleet
            .get(loser)?
            .goal
            .or_else(|| window.paths()[kl].last().copied())
            .unwrap_or(source);
        let view = window.view(snap.base, t - 1);
        let route = planner.plan(
            snap.graph,
            &view,
            PlanRequest::new(loser, source, target).excluding(&blocked),
        );
        fleet.get_mut(loser)?.splice_from(t - 1, route.cells)?;
        Ok(())
    }
}

/// Window row of `id`: rows follow the fleet's ascending id order.
fn row_of(fleet: &Fleet, id: CarrierId) -> Option<usize> {
    fleet.ids().position(|x| x == id)
}

fn log_paths(graph: &GraphStore, fleet: &Fleet, ids: &[CarrierId]) {
    for &id in ids {
        if let Ok(c) = fleet.get(id) {
            let labels: Vec<u32> = c.path().iter().map(|&cell| graph.cell_label(cell)).collect();
            warn!(carrier = %id, path = ?labels, "conflicting plan");
        }
    }
}
