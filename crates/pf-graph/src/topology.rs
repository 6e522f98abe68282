//! Coarse topology graph: one node per sector.
//!
//! Same CSR layout as the roadmap.  Each sector knows its capacity and the
//! ordered list of roadmap cells it owns ("members"), filled in by
//! `GraphStore::new` once the roadmap exists.

use rustc_hash::FxHashMap;

use pf_core::{CellId, EdgeId, SectorId};

use crate::search::Csr;

/// Directed sector graph in CSR format.
pub struct Topology {
    pub sector_label: Vec<u32>,

    /// Nominal number of carriers the sector holds before saturating.
    pub capacity: Vec<u32>,

    /// Member cells of each sector, ascending `CellId`.
    pub members: Vec<Vec<CellId>>,

    pub node_out_start: Vec<u32>,
    pub edge_from: Vec<SectorId>,
    pub edge_to: Vec<SectorId>,

    /// Immutable edge distance; also the adjacency weight of the Laplacian.
    pub edge_distance: Vec<f64>,

    label_index: FxHashMap<u32, SectorId>,
}

impl Topology {
    pub fn sector_count(&self) -> usize {
        self.sector_label.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    #[inline]
    pub fn out_edges(&self, sector: SectorId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[sector.index()] as usize;
        let end   = self.node_out_start[sector.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    pub fn neighbours(&self, sector: SectorId) -> impl Iterator<Item = SectorId> + '_ {
        self.out_edges(sector).map(|e| self.edge_to[e.index()])
    }

    pub fn by_label(&self, label: u32) -> Option<SectorId> {
        self.label_index.get(&label).copied()
    }
}

impl Csr for Topology {
    fn node_count(&self) -> usize {
        self.sector_count()
    }

    fn out_range(&self, node: usize) -> std::ops::Range<usize> {
        self.node_out_start[node] as usize..self.node_out_start[node + 1] as usize
    }

    fn edge_target(&self, edge: usize) -> usize {
        self.edge_to[edge].index()
    }
}

/// Construct a [`Topology`] incrementally.
pub struct TopologyBuilder {
    sectors:   Vec<(u32, u32)>, // (label, capacity)
    raw_edges: Vec<(SectorId, SectorId, f64)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self { sectors: Vec::new(), raw_edges: Vec::new() }
    }

    /// Add a sector and return its `SectorId` (sequential from 0).
    pub fn add_sector(&mut self, label: u32, capacity: u32) -> SectorId {
        let id = SectorId(self.sectors.len() as u32);
        self.sectors.push((label, capacity));
        id
    }

    pub fn add_directed_edge(&mut self, from: SectorId, to: SectorId, distance: f64) {
        self.raw_edges.push((from, to, distance));
    }

    pub fn add_link(&mut self, a: SectorId, b: SectorId, distance: f64) {
        self.add_directed_edge(a, b, distance);
        self.add_directed_edge(b, a, distance);
    }

    pub fn sector_count(&self) -> usize { self.sectors.len() }

    pub fn build(self) -> Topology {
        let n = self.sectors.len();
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.0 .0);

        let mut node_out_start = vec![0u32; n + 1];
        for e in &raw {
            node_out_start[e.0.index() + 1] += 1;
        }
        for i in 1..=n {
            node_out_start[i] += node_out_start[i - 1];
        }

        Topology {
            sector_label:   self.sectors.iter().map(|s| s.0).collect(),
            capacity:       self.sectors.iter().map(|s| s.1).collect(),
            members:        vec![Vec::new(); n],
            node_out_start,
            edge_from:      raw.iter().map(|e| e.0).collect(),
            edge_to:        raw.iter().map(|e| e.1).collect(),
            edge_distance:  raw.iter().map(|e| e.2).collect(),
            label_index:    self
                .sectors
                .iter()
                .enumerate()
                .map(|(i, s)| (s.0, SectorId(i as u32)))
                .collect(),
        }
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
