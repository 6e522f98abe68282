//! What a single tick produced.

use pf_core::{CellId, SectorId, Tick};
use pf_plan::CoordinationOutcome;

use crate::error::{SimError, SimResult};

/// A condition the tick loop survived but must not hide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickFault {
    /// More than one carrier stands on each of `cells` after promotion.
    OccupancyViolated { cells: Vec<CellId> },
    /// Coordination stopped at its round bound with conflicts left.
    CoordinationBoundExceeded { rounds: usize },
}

/// Summary of one processed tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    /// Every carrier's path was regenerated this tick.
    pub replanned: bool,
    /// `None` when coordination was skipped.
    pub coordination: Option<CoordinationOutcome>,
    pub faults: Vec<TickFault>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    /// `Err` carrying the first fault, for callers that treat faults as fatal.
    pub fn into_result(self) -> SimResult<Self> {
        match self.faults.first() {
            None => Ok(self),
            Some(TickFault::OccupancyViolated { cells }) => Err(SimError::OccupancyInvariantViolated {
                tick:  self.tick,
                cells: cells.clone(),
            }),
            Some(&TickFault::CoordinationBoundExceeded { rounds }) => {
                Err(SimError::UnboundedCoordinationLoop { tick: self.tick, rounds })
            }
        }
    }
}

/// Totals for a `run` or `run_ticks` call.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks:         u64,
    /// Ticks whose report carried at least one fault.
    pub faulted_ticks: u64,
}

// ── Sector load ───────────────────────────────────────────────────────────────

/// Occupancy of one sector as exposed to callers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SectorLoad {
    pub sector:   SectorId,
    /// External label from the graph definition.
    pub label:    u32,
    pub occupied: u32,
    pub capacity: u32,
    pub weight:   f64,
}

/// Per-sector occupancy and weight archived at the start of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorSnapshot {
    pub tick:     Tick,
    pub occupied: Vec<u32>,
    pub weights:  Vec<f64>,
}
