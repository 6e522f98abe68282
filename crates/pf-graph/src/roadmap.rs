//! Fine-grained roadmap graph: one node per cell a carrier can occupy.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** form.  Given
//! a `CellId c`, its outgoing edges occupy
//!
//! ```text
//! edge_to[ node_out_start[c] .. node_out_start[c+1] ]
//! ```
//!
//! All edge arrays are sorted by source cell and indexed by `EdgeId`.
//! `edge_crosses[e]` is precomputed at build time: `true` when the two
//! endpoints belong to different sectors.  Only crossing edges carry a
//! congestion-dependent weight.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps grid positions to cells for exact and
//! nearest lookups (placing carriers, routing to coordinates).

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use pf_core::{CellId, EdgeId, GridPos, SectorId};

use crate::search::Csr;

// ── R-tree cell entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct CellEntry {
    point: [i32; 2],
    id:    CellId,
}

impl RTreeObject for CellEntry {
    type Envelope = AABB<[i32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CellEntry {
    fn distance_2(&self, point: &[i32; 2]) -> i32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Roadmap ───────────────────────────────────────────────────────────────────

/// Directed cell graph in CSR format plus a position index.
///
/// Do not construct directly; use [`RoadmapBuilder`].
pub struct Roadmap {
    // ── Cell data ─────────────────────────────────────────────────────────
    /// External label of each cell (the id used in graph definition files).
    pub cell_label: Vec<u32>,

    /// Grid position of each cell.
    pub cell_pos: Vec<GridPos>,

    /// Host sector of each cell.
    pub cell_sector: Vec<SectorId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `cell_count + 1`.
    pub node_out_start: Vec<u32>,

    pub edge_from: Vec<CellId>,
    pub edge_to: Vec<CellId>,

    /// Immutable definition distance.  Kept for reporting; routing costs
    /// come from the traffic snapshot.
    pub edge_distance: Vec<f64>,

    /// `true` if the edge leaves its source cell's sector.
    pub edge_crosses: Vec<bool>,

    label_index: FxHashMap<u32, CellId>,
    spatial_idx: RTree<CellEntry>,
}

impl Roadmap {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn cell_count(&self) -> usize {
        self.cell_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `cell`.
    #[inline]
    pub fn out_edges(&self, cell: CellId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[cell.index()] as usize;
        let end   = self.node_out_start[cell.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Cells reachable from `cell` over one edge.
    pub fn neighbours(&self, cell: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.out_edges(cell).map(|e| self.edge_to[e.index()])
    }

    /// The edge `from → to`, if one exists.
    pub fn edge_between(&self, from: CellId, to: CellId) -> Option<EdgeId> {
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn by_label(&self, label: u32) -> Option<CellId> {
        self.label_index.get(&label).copied()
    }

    /// The cell located exactly at `pos`.
    pub fn cell_at(&self, pos: GridPos) -> Option<CellId> {
        self.spatial_idx
            .locate_at_point(&[pos.x, pos.y])
            .map(|e| e.id)
    }

    /// The cell nearest to `pos` (Euclidean).  `None` only for an empty roadmap.
    pub fn nearest_cell(&self, pos: GridPos) -> Option<CellId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }
}

impl Csr for Roadmap {
    fn node_count(&self) -> usize {
        self.cell_count()
    }

    fn out_range(&self, node: usize) -> std::ops::Range<usize> {
        self.node_out_start[node] as usize..self.node_out_start[node + 1] as usize
    }

    fn edge_target(&self, edge: usize) -> usize {
        self.edge_to[edge].index()
    }
}

// ── RoadmapBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Roadmap`] incrementally, then call [`build`](Self::build).
///
/// Cells must be added with the `SectorId` of an already-defined topology
/// sector; `GraphStore::new` verifies that every referenced sector exists.
pub struct RoadmapBuilder {
    cells:     Vec<RawCell>,
    raw_edges: Vec<RawEdge>,
}

struct RawCell {
    label:  u32,
    pos:    GridPos,
    sector: SectorId,
}

struct RawEdge {
    from:     CellId,
    to:       CellId,
    distance: f64,
}

impl RoadmapBuilder {
    pub fn new() -> Self {
        Self { cells: Vec::new(), raw_edges: Vec::new() }
    }

    pub fn with_capacity(cells: usize, edges: usize) -> Self {
        Self {
            cells:     Vec::with_capacity(cells),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a cell and return its `CellId` (sequential from 0).
    pub fn add_cell(&mut self, label: u32, pos: GridPos, sector: SectorId) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(RawCell { label, pos, sector });
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: CellId, to: CellId, distance: f64) {
        self.raw_edges.push(RawEdge { from, to, distance });
    }

    /// Add edges in both directions.
    pub fn add_link(&mut self, a: CellId, b: CellId, distance: f64) {
        self.add_directed_edge(a, b, distance);
        self.add_directed_edge(b, a, distance);
    }

    pub fn cell_count(&self) -> usize { self.cells.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`Roadmap`].
    ///
    /// O(E log E) for the edge sort plus O(N log N) for the R-tree bulk load.
    pub fn build(self) -> Roadmap {
        let cell_count = self.cells.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps insertion order among a cell's edges, which
        // fixes Dijkstra's tie-breaking.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let cell_sector: Vec<SectorId> = self.cells.iter().map(|c| c.sector).collect();

        let edge_from:     Vec<CellId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<CellId> = raw.iter().map(|e| e.to).collect();
        let edge_distance: Vec<f64>    = raw.iter().map(|e| e.distance).collect();
        let edge_crosses:  Vec<bool>   = raw
            .iter()
            .map(|e| cell_sector[e.from.index()] != cell_sector[e.to.index()])
            .collect();

        let mut node_out_start = vec![0u32; cell_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=cell_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[cell_count] as usize, edge_count);

        let label_index = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.label, CellId(i as u32)))
            .collect();

        let entries: Vec<CellEntry> = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, c)| CellEntry { point: [c.pos.x, c.pos.y], id: CellId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        Roadmap {
            cell_label: self.cells.iter().map(|c| c.label).collect(),
            cell_pos: self.cells.iter().map(|c| c.pos).collect(),
            cell_sector,
            node_out_start,
            edge_from,
            edge_to,
            edge_distance,
            edge_crosses,
            label_index,
            spatial_idx,
        }
    }
}

impl Default for RoadmapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
