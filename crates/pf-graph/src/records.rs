//! Graph definition records and their JSON readers.
//!
//! Each graph is a JSON array of node records.  Neighbour ids and distances
//! are parallel arrays; every listed neighbour becomes one directed edge.
//!
//! ```json
//! [{ "node": 1, "neighbor": [2], "distance": [3.0], "capacity": 4 }]
//! [{ "node": 101, "neighbor": [102], "distance": [1.0], "position": [0, 0] }]
//! ```
//!
//! A roadmap record without `sector` is hosted by topology node
//! `node / 100`.

use std::io::Read;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use pf_core::{CellId, GridPos, SectorId};

use crate::error::{GraphError, GraphKind, GraphResult};
use crate::roadmap::RoadmapBuilder;
use crate::store::GraphStore;
use crate::topology::TopologyBuilder;

/// One topology (sector) node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyRecord {
    pub node: u32,
    #[serde(default)]
    pub neighbor: Vec<u32>,
    #[serde(default)]
    pub distance: Vec<f64>,
    pub capacity: u32,
}

/// One roadmap (cell) node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadmapRecord {
    pub node: u32,
    #[serde(default)]
    pub neighbor: Vec<u32>,
    #[serde(default)]
    pub distance: Vec<f64>,
    pub position: [i32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<u32>,
}

impl RoadmapRecord {
    /// Label of the hosting topology node.
    pub fn host_label(&self) -> u32 {
        self.sector.unwrap_or(self.node / 100)
    }
}

pub fn read_topology_json<R: Read>(reader: R) -> GraphResult<Vec<TopologyRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_roadmap_json<R: Read>(reader: R) -> GraphResult<Vec<RoadmapRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

impl GraphStore {
    /// Build both graphs from definition records.
    ///
    /// Arena ids follow record order.
    pub fn from_records(
        topology: &[TopologyRecord],
        roadmap: &[RoadmapRecord],
    ) -> GraphResult<GraphStore> {
        // ── Topology ──────────────────────────────────────────────────────
        let mut tb = TopologyBuilder::new();
        let mut sector_ids: FxHashMap<u32, SectorId> = FxHashMap::default();
        for rec in topology {
            if sector_ids.contains_key(&rec.node) {
                return Err(GraphError::DuplicateNode { graph: GraphKind::Topology, label: rec.node });
            }
            sector_ids.insert(rec.node, tb.add_sector(rec.node, rec.capacity));
        }
        for rec in topology {
            check_lengths(GraphKind::Topology, rec.node, &rec.neighbor, &rec.distance)?;
            let from = sector_ids[&rec.node];
            for (n, &d) in rec.neighbor.iter().zip(&rec.distance) {
                let to = *sector_ids.get(n).ok_or(GraphError::UnknownNeighbor {
                    graph: GraphKind::Topology,
                    from:  rec.node,
                    to:    *n,
                })?;
                tb.add_directed_edge(from, to, d);
            }
        }

        // ── Roadmap ───────────────────────────────────────────────────────
        let edge_hint = roadmap.iter().map(|r| r.neighbor.len()).sum();
        let mut rb = RoadmapBuilder::with_capacity(roadmap.len(), edge_hint);
        let mut cell_ids: FxHashMap<u32, CellId> = FxHashMap::default();
        let mut positions: FxHashMap<GridPos, u32> = FxHashMap::default();
        for rec in roadmap {
            if cell_ids.contains_key(&rec.node) {
                return Err(GraphError::DuplicateNode { graph: GraphKind::Roadmap, label: rec.node });
            }
            let pos = GridPos::from(rec.position);
            if let Some(&first) = positions.get(&pos) {
                return Err(GraphError::DuplicatePosition { first, second: rec.node, pos });
            }
            positions.insert(pos, rec.node);
            let host = rec.host_label();
            let sector = *sector_ids
                .get(&host)
                .ok_or(GraphError::UnknownSector { cell: rec.node, sector: host })?;
            let id = rb.add_cell(rec.node, pos, sector);
            cell_ids.insert(rec.node, id);
        }
        let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();
        for rec in roadmap {
            check_lengths(GraphKind::Roadmap, rec.node, &rec.neighbor, &rec.distance)?;
            let from = cell_ids[&rec.node];
            for (n, &d) in rec.neighbor.iter().zip(&rec.distance) {
                let to = *cell_ids.get(n).ok_or(GraphError::UnknownNeighbor {
                    graph: GraphKind::Roadmap,
                    from:  rec.node,
                    to:    *n,
                })?;
                // Repeated neighbour entries collapse to one edge.
                if seen.insert((rec.node, *n)) {
                    rb.add_directed_edge(from, to, d);
                }
            }
        }

        GraphStore::new(tb.build(), rb.build())
    }
}

fn check_lengths(graph: GraphKind, label: u32, neighbor: &[u32], distance: &[f64]) -> GraphResult<()> {
    if neighbor.len() != distance.len() {
        return Err(GraphError::LengthMismatch {
            graph,
            label,
            neighbors: neighbor.len(),
            distances: distance.len(),
        });
    }
    Ok(())
}
