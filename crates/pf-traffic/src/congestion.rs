//! Sector congestion weights.
//!
//! | Mode        | Sector weight                                        |
//! |-------------|------------------------------------------------------|
//! | `Origin`    | `K·occ/(cap − occ)` while `occ < cap`, else `K·cap`  |
//! | `Consensus` | `w = K·occ/cap`, then `w' = (I + K·L)·w`             |
//!
//! `L` is the Laplacian of the topology graph with edge distances as
//! adjacency weights.  It is built once per model.  Consensus weights are
//! left unclamped; the edge-weight formulas clamp at zero.

use pf_core::{ControllerConfig, SectorId, WeightMode};
use pf_graph::{GraphStore, Topology};

// ── Laplacian ─────────────────────────────────────────────────────────────────

/// Dense row-major `n × n` topology Laplacian.
///
/// Off-diagonal `L[i][j] = −A[i][j]`; diagonal `L[i][i] = Σⱼ A[i][j]`.
/// Self-loops contribute nothing, so every row sums to zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Laplacian {
    n:    usize,
    data: Vec<f64>,
}

impl Laplacian {
    pub fn from_topology(topology: &Topology) -> Self {
        let n = topology.sector_count();
        let mut data = vec![0.0; n * n];
        for e in 0..topology.edge_count() {
            let i = topology.edge_from[e].index();
            let j = topology.edge_to[e].index();
            if i == j {
                continue;
            }
            // A parallel edge overwrites rather than accumulates.
            data[i * n + j] = -topology.edge_distance[e];
        }
        for i in 0..n {
            let off: f64 = (0..n).filter(|&j| j != i).map(|j| data[i * n + j]).sum();
            data[i * n + i] = -off;
        }
        Self { n, data }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.data[i * self.n..(i + 1) * self.n].iter().sum()
    }

    /// `(I + gain·L)·w`.
    pub fn apply(&self, w: &[f64], gain: f64) -> Vec<f64> {
        debug_assert_eq!(w.len(), self.n);
        (0..self.n)
            .map(|i| {
                let row = &self.data[i * self.n..(i + 1) * self.n];
                let lw: f64 = row.iter().zip(w).map(|(l, x)| l * x).sum();
                w[i] + gain * lw
            })
            .collect()
    }
}

// ── CongestionModel ───────────────────────────────────────────────────────────

/// Maps sector occupancy to sector weights.
#[derive(Clone, Debug)]
pub struct CongestionModel {
    pub mode: WeightMode,
    pub gain: f64,
    laplacian: Laplacian,
}

impl CongestionModel {
    pub fn new(graph: &GraphStore, mode: WeightMode, gain: f64) -> Self {
        Self { mode, gain, laplacian: Laplacian::from_topology(graph.topology()) }
    }

    pub fn from_config(graph: &GraphStore, config: &ControllerConfig) -> Self {
        Self::new(graph, config.weight_mode, config.gain)
    }

    pub fn laplacian(&self) -> &Laplacian {
        &self.laplacian
    }

    /// The per-sector weight before any propagation.
    pub fn raw_weight(&self, occupied: u32, capacity: u32) -> f64 {
        let (occ, cap) = (occupied as f64, capacity as f64);
        match self.mode {
            WeightMode::Origin if occupied < capacity => self.gain * occ / (cap - occ),
            WeightMode::Origin => self.gain * cap,
            WeightMode::Consensus => self.gain * occ / cap,
        }
    }

    /// Weights for every sector given per-sector occupancy (indexed by
    /// `SectorId`).
    pub fn sector_weights(&self, graph: &GraphStore, occupied: &[u32]) -> Vec<f64> {
        let raw: Vec<f64> = occupied
            .iter()
            .enumerate()
            .map(|(s, &occ)| self.raw_weight(occ, graph.capacity(SectorId(s as u32))))
            .collect();
        match self.mode {
            WeightMode::Origin => raw,
            WeightMode::Consensus => self.laplacian.apply(&raw, self.gain),
        }
    }
}
