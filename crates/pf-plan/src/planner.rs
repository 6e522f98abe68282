//! Path planning trait and the default two-level planner.
//!
//! # Pluggability
//!
//! The controller and coordinator call planning through the [`PathPlanner`]
//! trait, so a different search strategy can be dropped in without touching
//! the tick loop.  [`TwoLevelPlanner`] is the default.
//!
//! # Recovery ladder
//!
//! | Situation                                         | Result                 |
//! |---------------------------------------------------|------------------------|
//! | sector path found under exclusion, cell path found | `Direct`              |
//! | sector path only found without exclusion           | `Degraded`            |
//! | no sector path, or no cell path in the corridor    | `Stranded`, `[s, s]`  |
//!
//! Planning never fails outright; a stranded carrier simply holds.

use tracing::{debug, warn};

use pf_core::{CarrierId, CellId, EdgeId};
use pf_graph::{GraphStore, SectorMask};
use pf_traffic::TrafficView;

// ── Request / result ──────────────────────────────────────────────────────────

/// What to plan.
#[derive(Copy, Clone, Debug)]
pub struct PlanRequest<'a> {
    pub carrier:  CarrierId,
    pub source:   CellId,
    pub target:   CellId,
    /// Cells the path must avoid.  Their sectors are avoided too, except the
    /// source and target sectors.
    pub excluded: &'a [CellId],
}

impl<'a> PlanRequest<'a> {
    pub fn new(carrier: CarrierId, source: CellId, target: CellId) -> Self {
        Self { carrier, source, target, excluded: &[] }
    }

    pub fn excluding(mut self, excluded: &'a [CellId]) -> Self {
        self.excluded = excluded;
        self
    }
}

/// How the returned route was obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteQuality {
    /// Planned under the requested exclusions.
    Direct,
    /// The sector exclusions had to be dropped to find a corridor.
    Degraded,
    /// No route at all; the carrier holds at its source.
    Stranded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedRoute {
    /// Cells to visit, starting with the source.
    pub cells:   Vec<CellId>,
    pub quality: RouteQuality,
}

impl PlannedRoute {
    fn stranded(source: CellId) -> Self {
        Self { cells: vec![source, source], quality: RouteQuality::Stranded }
    }
}

// ── PathPlanner trait ─────────────────────────────────────────────────────────

/// Pluggable path planning.
///
/// `traffic` supplies the weights of the snapshot being planned against;
/// usually the current state, sometimes a look-ahead step.
pub trait PathPlanner {
    fn plan(&self, graph: &GraphStore, traffic: &dyn TrafficView, request: PlanRequest<'_>) -> PlannedRoute;
}

// ── TwoLevelPlanner ───────────────────────────────────────────────────────────

/// Sector-level Dijkstra on the topology, then cell-level Dijkstra inside the
/// chosen sector corridor.
#[derive(Copy, Clone, Debug, Default)]
pub struct TwoLevelPlanner;

impl PathPlanner for TwoLevelPlanner {
    fn plan(&self, graph: &GraphStore, traffic: &dyn TrafficView, req: PlanRequest<'_>) -> PlannedRoute {
        if req.source == req.target {
            return PlannedRoute { cells: vec![req.source], quality: RouteQuality::Direct };
        }

        let source_sector = graph.host(req.source);
        let target_sector = graph.host(req.target);

        // ── Sector level ──────────────────────────────────────────────────
        let mut allowed = SectorMask::all(graph.sector_count());
        for &cell in req.excluded {
            allowed.remove(graph.host(cell));
        }
        allowed.insert(source_sector);
        allowed.insert(target_sector);

        let sector_cost = |e: EdgeId| traffic.topology_edge_weight(graph, e);
        let mut quality = RouteQuality::Direct;
        let corridor = match graph.sector_path(source_sector, target_sector, &allowed, sector_cost) {
            Ok(seq) => seq,
            Err(_) => {
                warn!(
                    carrier = %req.carrier,
                    target = graph.cell_label(req.target),
                    "no sector corridor under exclusion; routing through excluded sectors"
                );
                quality = RouteQuality::Degraded;
                let all = SectorMask::all(graph.sector_count());
                match graph.sector_path(source_sector, target_sector, &all, sector_cost) {
                    Ok(seq) => seq,
                    Err(e) => {
                        warn!(carrier = %req.carrier, error = %e, "carrier stranded");
                        return PlannedRoute::stranded(req.source);
                    }
                }
            }
        };

        // ── Cell level ────────────────────────────────────────────────────
        let mut cells = graph.members_mask(&corridor);
        for &cell in req.excluded {
            cells.remove(cell);
        }
        cells.insert(req.source);

        let cell_cost = |e: EdgeId| traffic.roadmap_edge_weight(graph, e);
        match graph.cell_path(req.source, req.target, &cells, cell_cost) {
            Ok(path) => {
                debug!(
                    carrier = %req.carrier,
                    from = graph.cell_label(req.source),
                    to = graph.cell_label(req.target),
                    len = path.len(),
                    ?quality,
                    "path generated"
                );
                PlannedRoute { cells: path, quality }
            }
            Err(e) => {
                warn!(
                    carrier = %req.carrier,
                    at = graph.cell_label(req.source),
                    error = %e,
                    "no cell path in corridor; holding position"
                );
                PlannedRoute::stranded(req.source)
            }
        }
    }
}
