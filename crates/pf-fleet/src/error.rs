use thiserror::Error;

use pf_core::{CarrierId, CellId};

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("unknown carrier {0}")]
    UnknownCarrier(CarrierId),

    #[error("path for {0} is empty")]
    EmptyPath(CarrierId),

    #[error("path for {carrier} starts at {found}, expected {expected}")]
    PathStartMismatch { carrier: CarrierId, expected: CellId, found: CellId },

    #[error("splice index {index} out of range for {carrier} (path length {len})")]
    SpliceOutOfRange { carrier: CarrierId, index: usize, len: usize },
}

pub type FleetResult<T> = Result<T, FleetError>;
