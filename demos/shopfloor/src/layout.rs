//! The 58 × 8 cell shop floor.
//!
//! Two rows of workstations face each other across a two-lane roadway:
//!
//! ```text
//!  y=0..1   pen1  ████  pen2  ████  KUKA  ████  ABB1  ████  OMRON1 ███
//!  y=2..5   ─────────────── open floor / roadway ─────────────────────
//!  y=6..7   pen3  ████  pen4  ████  UR    ████  ABB2  ████  OMRON2 ███
//! ```
//!
//! Each station has a queue of waiting slots next to it.

use pf_core::{CellKind, FloorPlan, GridPos, PfResult, Rect};
use pf_fleet::Station;
use pf_graph::GraphStore;

pub const WIDTH:  i32 = 58;
pub const HEIGHT: i32 = 8;

/// Sector block size handed to `build_from_floor`.
pub const SECTOR_W: i32 = 6;
pub const SECTOR_H: i32 = 4;

const WALLS: [Rect; 10] = [
    Rect::new(4, 0, 8, 2),
    Rect::new(16, 0, 8, 2),
    Rect::new(28, 0, 8, 2),
    Rect::new(40, 0, 8, 2),
    Rect::new(52, 0, 6, 2),
    Rect::new(4, 6, 8, 2),
    Rect::new(16, 6, 8, 2),
    Rect::new(28, 6, 8, 2),
    Rect::new(40, 6, 8, 2),
    Rect::new(52, 6, 6, 2),
];

const ROADWAY: [Rect; 2] = [Rect::new(2, 3, 41, 1), Rect::new(2, 4, 41, 1)];

struct StationDef {
    name:  &'static str,
    area:  Rect,
    entry: [i32; 2],
    exit:  [i32; 2],
    queue: &'static [[i32; 2]],
}

const STATIONS: [StationDef; 10] = [
    StationDef { name: "pen1",   area: Rect::new(0, 0, 2, 2),  entry: [1, 0],  exit: [0, 1],  queue: &[[2, 0], [3, 0], [3, 1], [2, 1]] },
    StationDef { name: "pen2",   area: Rect::new(12, 0, 2, 2), entry: [13, 0], exit: [12, 1], queue: &[[14, 0], [15, 0], [15, 1], [14, 1]] },
    StationDef { name: "KUKA",   area: Rect::new(24, 0, 1, 2), entry: [24, 0], exit: [24, 1], queue: &[[25, 0], [26, 0], [27, 0], [27, 1], [26, 1], [25, 1]] },
    StationDef { name: "ABB1",   area: Rect::new(36, 0, 1, 2), entry: [36, 0], exit: [36, 1], queue: &[[37, 0], [38, 0], [39, 0], [39, 1], [38, 1], [37, 1]] },
    StationDef { name: "OMRON1", area: Rect::new(48, 0, 1, 2), entry: [48, 0], exit: [48, 1], queue: &[[49, 0], [50, 0], [51, 0], [51, 1], [50, 1], [49, 1]] },
    StationDef { name: "pen3",   area: Rect::new(2, 6, 2, 2),  entry: [2, 7],  exit: [3, 6],  queue: &[[1, 7], [0, 7], [0, 6], [1, 6]] },
    StationDef { name: "pen4",   area: Rect::new(14, 6, 2, 2), entry: [14, 7], exit: [15, 6], queue: &[[13, 7], [12, 7], [12, 6], [13, 6]] },
    StationDef { name: "UR",     area: Rect::new(27, 6, 1, 2), entry: [27, 7], exit: [27, 6], queue: &[[26, 7], [25, 7], [24, 7], [24, 6], [25, 6], [26, 6]] },
    StationDef { name: "ABB2",   area: Rect::new(39, 6, 1, 2), entry: [39, 7], exit: [39, 6], queue: &[[38, 7], [37, 7], [36, 7], [36, 6], [37, 6], [38, 6]] },
    StationDef { name: "OMRON2", area: Rect::new(51, 6, 1, 2), entry: [51, 7], exit: [51, 6], queue: &[[50, 7], [49, 7], [48, 7], [48, 6], [49, 6], [50, 6]] },
];

/// Paint walls, stations, queues and roadway onto an empty plan.
pub fn floor_plan() -> PfResult<FloorPlan> {
    let mut plan = FloorPlan::new(WIDTH, HEIGHT)?;
    for wall in WALLS {
        plan.paint(wall, CellKind::Wall);
    }
    for lane in ROADWAY {
        plan.paint(lane, CellKind::Roadway);
    }
    for def in &STATIONS {
        plan.paint(def.area, CellKind::Station);
        for &slot in def.queue {
            plan.set(GridPos::from(slot), CellKind::Queue)?;
        }
    }
    Ok(plan)
}

pub fn stations() -> Vec<Station> {
    STATIONS
        .iter()
        .map(|def| {
            Station::new(def.name, def.area, GridPos::from(def.entry), GridPos::from(def.exit))
                .with_queue(def.queue.iter().copied().map(GridPos::from))
        })
        .collect()
}

/// Starting cells along the roadway, at most one per carrier.
///
/// Nominal spots are spread over both lanes and snapped to the nearest
/// roadmap cell; a spot that snaps onto an already chosen cell is dropped.
pub fn spawn_points(graph: &GraphStore, count: usize) -> Vec<GridPos> {
    let pairs = (count as i32 + 1) / 2;
    let step = (WIDTH - 4) / pairs.max(1);
    let mut taken = Vec::with_capacity(count);
    for k in 0..count as i32 {
        let nominal = GridPos::new(2 + step * (k / 2), 3 + k % 2);
        if let Some(cell) = graph.nearest_cell(nominal) {
            if !taken.contains(&cell) {
                taken.push(cell);
            }
        }
    }
    taken.into_iter().map(|c| graph.cell_pos(c)).collect()
}
