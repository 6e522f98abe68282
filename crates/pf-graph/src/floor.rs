//! Derive both graphs from a `FloorPlan`.
//!
//! | Graph    | Nodes                                   | Edges                          |
//! |----------|-----------------------------------------|--------------------------------|
//! | roadmap  | every traversable cell                  | 4-neighbour links, distance 1  |
//! | topology | every block holding ≥ 1 roadmap cell    | blocks joined by a cell link   |
//!
//! Blocks tile the plan in `sector_w × sector_h` rectangles, scanned row by
//! row.  Sector labels count up from 1 in that order; cell labels are
//! `sector * 100 + k` where `k` is the cell's rank within its block, so the
//! default `label / 100` host rule holds for every generated cell.

use std::collections::{BTreeMap, BTreeSet};

use pf_core::{CellId, FloorPlan, GridPos, SectorId};
use rustc_hash::FxHashMap;

use crate::error::{GraphError, GraphResult};
use crate::roadmap::RoadmapBuilder;
use crate::store::GraphStore;
use crate::topology::TopologyBuilder;

/// Build a `GraphStore` whose sectors are `sector_w × sector_h` blocks.
///
/// # Errors
///
/// [`GraphError::InvalidLayout`] when a block dimension is non-positive, a
/// block holds more than 100 cells, or the plan has no traversable cell.
pub fn build_from_floor(plan: &FloorPlan, sector_w: i32, sector_h: i32) -> GraphResult<GraphStore> {
    if sector_w <= 0 || sector_h <= 0 {
        return Err(GraphError::InvalidLayout(format!(
            "sector block must have positive size, got {sector_w}x{sector_h}"
        )));
    }
    if sector_w * sector_h > 100 {
        return Err(GraphError::InvalidLayout(format!(
            "sector block {sector_w}x{sector_h} exceeds 100 cells"
        )));
    }

    let blocks_x = (plan.width() + sector_w - 1) / sector_w;
    let block_of = |p: GridPos| (p.y / sector_h) * blocks_x + p.x / sector_w;

    // Group traversable cells by block, keeping block order.
    let mut by_block: BTreeMap<i32, Vec<GridPos>> = BTreeMap::new();
    for pos in plan.traversable() {
        by_block.entry(block_of(pos)).or_default().push(pos);
    }
    if by_block.is_empty() {
        return Err(GraphError::InvalidLayout("floor plan has no traversable cell".into()));
    }

    let mut tb = TopologyBuilder::new();
    let mut rb = RoadmapBuilder::with_capacity(by_block.values().map(Vec::len).sum(), 0);
    let mut at: FxHashMap<GridPos, CellId> = FxHashMap::default();
    let mut block_sector: FxHashMap<i32, SectorId> = FxHashMap::default();

    for (label, (&block, cells)) in (1u32..).zip(&by_block) {
        let sector = tb.add_sector(label, cells.len() as u32);
        block_sector.insert(block, sector);
        for (k, &pos) in cells.iter().enumerate() {
            let id = rb.add_cell(label * 100 + k as u32, pos, sector);
            at.insert(pos, id);
        }
    }

    let mut sector_links: BTreeSet<(SectorId, SectorId)> = BTreeSet::new();
    for pos in plan.traversable() {
        let from = at[&pos];
        // Right and down only; `add_link` supplies the reverse.
        for next in [GridPos::new(pos.x + 1, pos.y), GridPos::new(pos.x, pos.y + 1)] {
            let Some(&to) = at.get(&next) else { continue };
            rb.add_link(from, to, 1.0);
            let (a, b) = (block_sector[&block_of(pos)], block_sector[&block_of(next)]);
            if a != b {
                sector_links.insert((a.min(b), a.max(b)));
            }
        }
    }
    for (a, b) in sector_links {
        tb.add_link(a, b, 1.0);
    }

    GraphStore::new(tb.build(), rb.build())
}
