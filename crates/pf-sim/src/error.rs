use thiserror::Error;

use pf_core::{CellId, GridPos, PfError, Tick};
use pf_fleet::FleetError;
use pf_plan::PlanError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] PfError),

    #[error("unknown station {0:?}")]
    UnknownStation(String),

    #[error("station {0:?} is defined twice")]
    DuplicateStation(String),

    #[error("no roadmap cell at {0}")]
    NoCellAt(GridPos),

    #[error("cell at {0} is already occupied")]
    CellOccupied(GridPos),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{tick}: occupancy invariant violated on cells {cells:?}")]
    OccupancyInvariantViolated { tick: Tick, cells: Vec<CellId> },

    #[error("{tick}: coordination gave up after {rounds} rounds")]
    UnboundedCoordinationLoop { tick: Tick, rounds: usize },
}

pub type SimResult<T> = Result<T, SimError>;
