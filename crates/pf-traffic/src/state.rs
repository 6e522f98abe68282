//! The current traffic snapshot and the read-only view shared with the
//! prediction window.

use pf_core::{CellId, EdgeId, SectorId};
use pf_graph::GraphStore;

use crate::congestion::CongestionModel;

// ── TrafficView ───────────────────────────────────────────────────────────────

/// Occupancy and weights of one snapshot.
///
/// Implemented by [`TrafficState`] (the current snapshot) and by
/// `StepView` (a look-ahead step).  Edge weights are derived on read from
/// the sector weights.
pub trait TrafficView {
    fn cell_occupancy(&self, cell: CellId) -> u32;
    fn sector_occupancy(&self, sector: SectorId) -> u32;
    fn sector_weight(&self, sector: SectorId) -> f64;

    /// `max(distance + w[target], 0)`.
    fn topology_edge_weight(&self, graph: &GraphStore, edge: EdgeId) -> f64 {
        let t = graph.topology();
        let target = t.edge_to[edge.index()];
        (t.edge_distance[edge.index()] + self.sector_weight(target)).max(0.0)
    }

    /// `max(1 + w[host(target)], 0)` on a sector crossing, 1 otherwise.
    fn roadmap_edge_weight(&self, graph: &GraphStore, edge: EdgeId) -> f64 {
        let rm = graph.roadmap();
        if !rm.edge_crosses[edge.index()] {
            return 1.0;
        }
        let target = rm.edge_to[edge.index()];
        (1.0 + self.sector_weight(graph.host(target))).max(0.0)
    }
}

// ── TrafficState ──────────────────────────────────────────────────────────────

/// Dense per-cell and per-sector occupancy plus per-sector weight.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficState {
    cell_occ:      Vec<u32>,
    sector_occ:    Vec<u32>,
    sector_weight: Vec<f64>,
}

impl TrafficState {
    /// An empty snapshot: nothing placed, every weight zero.
    pub fn new(graph: &GraphStore) -> Self {
        Self {
            cell_occ:      vec![0; graph.cell_count()],
            sector_occ:    vec![0; graph.sector_count()],
            sector_weight: vec![0.0; graph.sector_count()],
        }
    }

    pub(crate) fn from_parts(cell_occ: Vec<u32>, sector_occ: Vec<u32>, sector_weight: Vec<f64>) -> Self {
        Self { cell_occ, sector_occ, sector_weight }
    }

    /// One more carrier on `cell` (and its host sector).
    pub fn place(&mut self, graph: &GraphStore, cell: CellId) {
        self.cell_occ[cell.index()] += 1;
        self.sector_occ[graph.host(cell).index()] += 1;
    }

    /// One fewer carrier on `cell`.  Returns `false` if the cell was empty.
    pub fn vacate(&mut self, graph: &GraphStore, cell: CellId) -> bool {
        let c = &mut self.cell_occ[cell.index()];
        if *c == 0 {
            return false;
        }
        *c -= 1;
        let s = &mut self.sector_occ[graph.host(cell).index()];
        *s = s.saturating_sub(1);
        true
    }

    /// Recompute every sector weight from the current occupancy.
    pub fn recompute_weights(&mut self, graph: &GraphStore, model: &CongestionModel) {
        self.sector_weight = model.sector_weights(graph, &self.sector_occ);
    }

    pub fn cell_occupancies(&self) -> &[u32] {
        &self.cell_occ
    }

    pub fn sector_occupancies(&self) -> &[u32] {
        &self.sector_occ
    }

    pub fn sector_weights(&self) -> &[f64] {
        &self.sector_weight
    }

    /// Cells holding more than one carrier, ascending.
    pub fn overcrowded_cells(&self) -> Vec<CellId> {
        self.cell_occ
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 1)
            .map(|(i, _)| CellId(i as u32))
            .collect()
    }

    /// `true` when every sector count equals the sum over its members.
    pub fn is_consistent(&self, graph: &GraphStore) -> bool {
        (0..graph.sector_count()).all(|s| {
            let sector = SectorId(s as u32);
            let sum: u32 = graph.members(sector).iter().map(|c| self.cell_occ[c.index()]).sum();
            sum == self.sector_occ[s]
        })
    }
}

impl TrafficView for TrafficState {
    #[inline]
    fn cell_occupancy(&self, cell: CellId) -> u32 {
        self.cell_occ[cell.index()]
    }

    #[inline]
    fn sector_occupancy(&self, sector: SectorId) -> u32 {
        self.sector_occ[sector.index()]
    }

    #[inline]
    fn sector_weight(&self, sector: SectorId) -> f64 {
        self.sector_weight[sector.index()]
    }
}
