use thiserror::Error;

use pf_fleet::FleetError;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Fleet(#[from] FleetError),
}

pub type PlanResult<T> = Result<T, PlanError>;
