//! The look-ahead prediction window.
//!
//! Step 0 is the current [`TrafficState`] itself and is never copied.  Each
//! look-ahead step `t = 1..=H` stores the **cumulative** occupancy change
//! relative to step 0 as sparse maps, plus the dense sector weights derived
//! from the resulting occupancy:
//!
//! ```text
//! occ_t(cell) = base(cell) + cell_delta_t(cell)
//! ```
//!
//! The window must be rebuilt whenever any planned path changes.

use rustc_hash::FxHashMap;
use tracing::debug;

use pf_core::{CellId, SectorId};
use pf_graph::GraphStore;

use crate::congestion::CongestionModel;
use crate::state::{TrafficState, TrafficView};

/// Extend `path` to at least `len` entries by repeating its last cell.
pub fn pad_path(path: &[CellId], len: usize) -> Vec<CellId> {
    let mut out = path.to_vec();
    if let Some(&last) = path.last() {
        out.resize(len.max(path.len()), last);
    }
    out
}

// ── WindowStep ────────────────────────────────────────────────────────────────

/// Sparse occupancy delta and dense weights of one look-ahead step.
#[derive(Clone, Debug, Default)]
pub struct WindowStep {
    pub cell_delta:    FxHashMap<CellId, i32>,
    pub sector_delta:  FxHashMap<SectorId, i32>,
    pub sector_weight: Vec<f64>,
}

fn bump<K: Copy + std::hash::Hash + Eq>(map: &mut FxHashMap<K, i32>, key: K, by: i32) {
    let v = map.entry(key).or_insert(0);
    *v += by;
    if *v == 0 {
        map.remove(&key);
    }
}

#[inline]
fn apply(base: u32, delta: i32) -> u32 {
    (base as i64 + delta as i64).max(0) as u32
}

// ── StepView ──────────────────────────────────────────────────────────────────

/// Read-only [`TrafficView`] of one window step.
#[derive(Clone, Copy)]
pub struct StepView<'a> {
    base: &'a TrafficState,
    step: Option<&'a WindowStep>,
}

impl TrafficView for StepView<'_> {
    fn cell_occupancy(&self, cell: CellId) -> u32 {
        let base = self.base.cell_occupancy(cell);
        match self.step {
            Some(s) => apply(base, s.cell_delta.get(&cell).copied().unwrap_or(0)),
            None => base,
        }
    }

    fn sector_occupancy(&self, sector: SectorId) -> u32 {
        let base = self.base.sector_occupancy(sector);
        match self.step {
            Some(s) => apply(base, s.sector_delta.get(&sector).copied().unwrap_or(0)),
            None => base,
        }
    }

    fn sector_weight(&self, sector: SectorId) -> f64 {
        match self.step {
            Some(s) => s.sector_weight[sector.index()],
            None => self.base.sector_weight(sector),
        }
    }
}

// ── PredictionWindow ──────────────────────────────────────────────────────────

/// Predicted snapshots `1..=H` for a set of planned paths.
#[derive(Clone, Debug)]
pub struct PredictionWindow {
    horizon: usize,
    steps:   Vec<WindowStep>,
    paths:   Vec<Vec<CellId>>,
}

impl PredictionWindow {
    /// An empty window; call [`rebuild`](Self::rebuild) before reading it.
    pub fn new(horizon: usize) -> Self {
        Self { horizon: horizon.max(1), steps: Vec::new(), paths: Vec::new() }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Recompute every look-ahead step from `paths`.
    ///
    /// `paths[k][0]` must be carrier `k`'s cell in `base`.  Each path is
    /// padded to `H + 1` entries first.
    pub fn rebuild(
        &mut self,
        graph: &GraphStore,
        base: &TrafficState,
        model: &CongestionModel,
        paths: &[Vec<CellId>],
    ) {
        let h = self.horizon;
        self.paths = paths.iter().map(|p| pad_path(p, h + 1)).collect();
        self.steps.clear();

        let mut cell_delta:   FxHashMap<CellId, i32>   = FxHashMap::default();
        let mut sector_delta: FxHashMap<SectorId, i32> = FxHashMap::default();
        let mut sector_occ = base.sector_occupancies().to_vec();

        for t in 1..=h {
            for path in &self.paths {
                let (prev, next) = (path[t - 1], path[t]);
                if prev == next {
                    continue;
                }
                bump(&mut cell_delta, prev, -1);
                bump(&mut cell_delta, next, 1);

                let (hp, hn) = (graph.host(prev), graph.host(next));
                if hp != hn {
                    bump(&mut sector_delta, hp, -1);
                    bump(&mut sector_delta, hn, 1);
                    sector_occ[hp.index()] = sector_occ[hp.index()].saturating_sub(1);
                    sector_occ[hn.index()] += 1;
                }
            }
            let sector_weight = model.sector_weights(graph, &sector_occ);
            self.steps.push(WindowStep {
                cell_delta:   cell_delta.clone(),
                sector_delta: sector_delta.clone(),
                sector_weight,
            });
        }
        debug!(horizon = h, carriers = self.paths.len(), "prediction window rebuilt");
    }

    /// Padded planned paths, one per carrier in rebuild order.
    pub fn paths(&self) -> &[Vec<CellId>] {
        &self.paths
    }

    /// Where carrier `k` is predicted to be at step `t`.
    pub fn cell_at(&self, k: usize, t: usize) -> Option<CellId> {
        let p = self.paths.get(k)?;
        p.get(t).or(p.last()).copied()
    }

    pub fn step(&self, t: usize) -> Option<&WindowStep> {
        t.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// View of step `t`; `t == 0` (or beyond the horizon) reads `base`.
    pub fn view<'a>(&'a self, base: &'a TrafficState, t: usize) -> StepView<'a> {
        StepView { base, step: self.step(t) }
    }

    /// The lowest-id cell holding more than one carrier at step `t`.
    pub fn overcrowded(&self, base: &TrafficState, t: usize) -> Option<CellId> {
        let view = self.view(base, t);
        let from_base = base
            .overcrowded_cells()
            .into_iter()
            .filter(|&c| view.cell_occupancy(c) > 1);
        let from_delta = self
            .step(t)
            .into_iter()
            .flat_map(|s| s.cell_delta.keys().copied())
            .filter(|&c| view.cell_occupancy(c) > 1);
        from_base.chain(from_delta).min()
    }

    /// Materialise step `t` as a standalone snapshot.
    pub fn promote(&self, base: &TrafficState, t: usize) -> TrafficState {
        let Some(step) = self.step(t) else {
            return base.clone();
        };
        let mut cell_occ = base.cell_occupancies().to_vec();
        for (c, &d) in &step.cell_delta {
            cell_occ[c.index()] = apply(cell_occ[c.index()], d);
        }
        let mut sector_occ = base.sector_occupancies().to_vec();
        for (s, &d) in &step.sector_delta {
            sector_occ[s.index()] = apply(sector_occ[s.index()], d);
        }
        TrafficState::from_parts(cell_occ, sector_occ, step.sector_weight.clone())
    }
}
