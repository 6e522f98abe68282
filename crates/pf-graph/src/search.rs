//! Dijkstra over any CSR graph with real-valued edge costs.
//!
//! Both graphs expose the same [`Csr`] view, so a single implementation
//! serves sector-level and cell-level planning.  Costs are supplied per call
//! through a closure over the edge index; the graph itself carries no
//! mutable weight.
//!
//! # Determinism
//!
//! Equal-cost frontier entries pop in ascending node index, and relaxation
//! only replaces a predecessor on a strictly better cost.  Given the same
//! graph, mask and costs, the returned path is always the same.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::ops::Range;

/// Minimal read-only adjacency view shared by `Roadmap` and `Topology`.
pub trait Csr {
    fn node_count(&self) -> usize;

    /// Edge index range of `node`'s outgoing edges.
    fn out_range(&self, node: usize) -> Range<usize>;

    fn edge_target(&self, edge: usize) -> usize;
}

// ── Cost ──────────────────────────────────────────────────────────────────────

/// `f64` with a total order so it can key a `BinaryHeap`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Cheapest path `from → to`, both endpoints included.
///
/// Nodes for which `allowed` is false are never expanded into; the source is
/// always usable.  `cost(edge)` must be non-negative.  Returns `None` when
/// `to` is unreachable (or disallowed).  `from == to` yields `[from]`.
pub fn shortest_path<G, A, C>(graph: &G, from: usize, to: usize, allowed: A, cost: C) -> Option<Vec<usize>>
where
    G: Csr + ?Sized,
    A: Fn(usize) -> bool,
    C: Fn(usize) -> f64,
{
    let n = graph.node_count();
    if from >= n || to >= n {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }
    if !allowed(to) {
        return None;
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![usize::MAX; n];
    dist[from] = 0.0;

    let mut heap: BinaryHeap<Reverse<(Cost, usize)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(d), node))) = heap.pop() {
        if node == to {
            return Some(reconstruct(&prev, from, to));
        }
        if d > dist[node] {
            continue;
        }
        for edge in graph.out_range(node) {
            let next = graph.edge_target(edge);
            if !allowed(next) {
                continue;
            }
            let nd = d + cost(edge).max(0.0);
            if nd < dist[next] {
                dist[next] = nd;
                prev[next] = node;
                heap.push(Reverse((Cost(nd), next)));
            }
        }
    }
    None
}

fn reconstruct(prev: &[usize], from: usize, to: usize) -> Vec<usize> {
    let mut path = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur];
        path.push(cur);
    }
    path.reverse();
    path
}
