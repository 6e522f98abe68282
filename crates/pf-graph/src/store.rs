//! `GraphStore` — owner of both graphs and the cell↔sector mapping.

use pf_core::{CellId, EdgeId, GridPos, SectorId};

use crate::error::{GraphError, GraphKind, GraphResult};
use crate::mask::{CellMask, SectorMask};
use crate::roadmap::Roadmap;
use crate::search::shortest_path;
use crate::topology::Topology;

/// The immutable two-tier workspace graph.
///
/// Built once, then shared by reference with every planner, window and
/// controller for the lifetime of a run.
pub struct GraphStore {
    topology: Topology,
    roadmap:  Roadmap,
}

impl GraphStore {
    /// Validate the pair and fill each sector's member list.
    ///
    /// # Errors
    ///
    /// - [`GraphError::ZeroCapacity`] for a sector with capacity 0.
    /// - [`GraphError::UnknownSector`] for a cell hosted by a missing sector.
    /// - [`GraphError::BadDistance`] for a negative or non-finite distance.
    pub fn new(mut topology: Topology, roadmap: Roadmap) -> GraphResult<Self> {
        for (i, &cap) in topology.capacity.iter().enumerate() {
            if cap == 0 {
                return Err(GraphError::ZeroCapacity(topology.sector_label[i]));
            }
        }
        check_distances(
            GraphKind::Topology,
            &topology.edge_distance,
            |e| (topology.sector_label[topology.edge_from[e].index()],
                 topology.sector_label[topology.edge_to[e].index()]),
        )?;
        check_distances(
            GraphKind::Roadmap,
            &roadmap.edge_distance,
            |e| (roadmap.cell_label[roadmap.edge_from[e].index()],
                 roadmap.cell_label[roadmap.edge_to[e].index()]),
        )?;

        let sector_count = topology.sector_count();
        let mut members = vec![Vec::new(); sector_count];
        for (i, &sector) in roadmap.cell_sector.iter().enumerate() {
            if sector.index() >= sector_count {
                return Err(GraphError::UnknownSector {
                    cell:   roadmap.cell_label[i],
                    sector: sector.0,
                });
            }
            members[sector.index()].push(CellId(i as u32));
        }
        topology.members = members;

        Ok(Self { topology, roadmap })
    }

    // ── Graph access ──────────────────────────────────────────────────────

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn cell_count(&self) -> usize {
        self.roadmap.cell_count()
    }

    pub fn sector_count(&self) -> usize {
        self.topology.sector_count()
    }

    // ── Cell/sector mapping ───────────────────────────────────────────────

    /// Owning sector of `cell`.
    #[inline]
    pub fn host(&self, cell: CellId) -> SectorId {
        self.roadmap.cell_sector[cell.index()]
    }

    /// Member cells of `sector`, ascending.
    pub fn members(&self, sector: SectorId) -> &[CellId] {
        &self.topology.members[sector.index()]
    }

    pub fn capacity(&self, sector: SectorId) -> u32 {
        self.topology.capacity[sector.index()]
    }

    pub fn cell_pos(&self, cell: CellId) -> GridPos {
        self.roadmap.cell_pos[cell.index()]
    }

    pub fn cell_label(&self, cell: CellId) -> u32 {
        self.roadmap.cell_label[cell.index()]
    }

    pub fn sector_label(&self, sector: SectorId) -> u32 {
        self.topology.sector_label[sector.index()]
    }

    pub fn cell_by_label(&self, label: u32) -> Option<CellId> {
        self.roadmap.by_label(label)
    }

    pub fn sector_by_label(&self, label: u32) -> Option<SectorId> {
        self.topology.by_label(label)
    }

    pub fn cell_at(&self, pos: GridPos) -> Option<CellId> {
        self.roadmap.cell_at(pos)
    }

    pub fn nearest_cell(&self, pos: GridPos) -> Option<CellId> {
        self.roadmap.nearest_cell(pos)
    }

    pub fn neighbours(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.roadmap.neighbours(cell)
    }

    /// Cells belonging to any of `sectors`, as a mask.
    pub fn members_mask(&self, sectors: &[SectorId]) -> CellMask {
        let mut mask = CellMask::none(self.cell_count());
        for &s in sectors {
            for &c in self.members(s) {
                mask.insert(c);
            }
        }
        mask
    }

    // ── Restricted shortest paths ─────────────────────────────────────────

    /// Cheapest sector sequence `from → to` inside `allowed`.
    ///
    /// `cost` receives topology `EdgeId`s.
    pub fn sector_path<C>(
        &self,
        from: SectorId,
        to: SectorId,
        allowed: &SectorMask,
        cost: C,
    ) -> GraphResult<Vec<SectorId>>
    where
        C: Fn(EdgeId) -> f64,
    {
        shortest_path(
            &self.topology,
            from.index(),
            to.index(),
            |s| allowed.contains_index(s),
            |e| cost(EdgeId(e as u32)),
        )
        .map(|p| p.into_iter().map(|s| SectorId(s as u32)).collect())
        .ok_or_else(|| GraphError::NoPathFound {
            graph: GraphKind::Topology,
            from:  self.sector_label(from),
            to:    self.sector_label(to),
        })
    }

    /// Cheapest cell sequence `from → to` inside `allowed`.
    ///
    /// `cost` receives roadmap `EdgeId`s.
    pub fn cell_path<C>(
        &self,
        from: CellId,
        to: CellId,
        allowed: &CellMask,
        cost: C,
    ) -> GraphResult<Vec<CellId>>
    where
        C: Fn(EdgeId) -> f64,
    {
        shortest_path(
            &self.roadmap,
            from.index(),
            to.index(),
            |c| allowed.contains_index(c),
            |e| cost(EdgeId(e as u32)),
        )
        .map(|p| p.into_iter().map(|c| CellId(c as u32)).collect())
        .ok_or_else(|| GraphError::NoPathFound {
            graph: GraphKind::Roadmap,
            from:  self.cell_label(from),
            to:    self.cell_label(to),
        })
    }
}

fn check_distances<F>(graph: GraphKind, distances: &[f64], labels: F) -> GraphResult<()>
where
    F: Fn(usize) -> (u32, u32),
{
    for (e, &d) in distances.iter().enumerate() {
        if !d.is_finite() || d < 0.0 {
            let (from, to) = labels(e);
            return Err(GraphError::BadDistance { graph, from, to, distance: d });
        }
    }
    Ok(())
}
