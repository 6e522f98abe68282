//! Graph-subsystem error type.

use std::fmt;

use thiserror::Error;

use pf_core::GridPos;

/// Which of the two graphs an error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GraphKind {
    Roadmap,
    Topology,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphKind::Roadmap  => f.write_str("roadmap"),
            GraphKind::Topology => f.write_str("topology"),
        }
    }
}

/// Errors produced by `pf-graph`.  Node references are external labels.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no path in {graph} from {from} to {to}")]
    NoPathFound { graph: GraphKind, from: u32, to: u32 },

    #[error("duplicate {graph} node {label}")]
    DuplicateNode { graph: GraphKind, label: u32 },

    #[error("{graph} node {label} lists {neighbors} neighbours but {distances} distances")]
    LengthMismatch { graph: GraphKind, label: u32, neighbors: usize, distances: usize },

    #[error("{graph} node {from} references unknown neighbour {to}")]
    UnknownNeighbor { graph: GraphKind, from: u32, to: u32 },

    #[error("roadmap cells {first} and {second} share position {pos}")]
    DuplicatePosition { first: u32, second: u32, pos: GridPos },

    #[error("roadmap cell {cell} belongs to unknown sector {sector}")]
    UnknownSector { cell: u32, sector: u32 },

    #[error("sector {0} has zero capacity")]
    ZeroCapacity(u32),

    #[error("{graph} edge {from} -> {to} has invalid distance {distance}")]
    BadDistance { graph: GraphKind, from: u32, to: u32, distance: f64 },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
