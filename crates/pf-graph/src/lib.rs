//! `pf-graph` — the two-tier workspace graph.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`roadmap`]  | `Roadmap` (cell CSR + R-tree), `RoadmapBuilder`            |
//! | [`topology`] | `Topology` (sector CSR), `TopologyBuilder`                 |
//! | [`mask`]     | `Mask<I>` — allowed node set for restricted searches      |
//! | [`search`]   | Dijkstra over any CSR graph with real-valued edge costs    |
//! | [`store`]    | `GraphStore` — owns both graphs, host/member mapping      |
//! | [`records`]  | Graph definition records and JSON readers                  |
//! | [`floor`]    | `build_from_floor` — derive both graphs from a floor plan  |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                             |
//!
//! The store is immutable once built.  Everything that changes per tick
//! (occupancy, weights) lives in `pf-traffic` and is fed back into the
//! searches through cost closures.

pub mod error;
pub mod floor;
pub mod mask;
pub mod records;
pub mod roadmap;
pub mod search;
pub mod store;
pub mod topology;


pub use error::{GraphError, GraphKind, GraphResult};
pub use floor::build_from_floor;
pub use mask::{CellMask, Mask, SectorMask};
pub use records::{read_roadmap_json, read_topology_json, RoadmapRecord, TopologyRecord};
pub use roadmap::{Roadmap, RoadmapBuilder};
pub use store::GraphStore;
pub use topology::{Topology, TopologyBuilder};
