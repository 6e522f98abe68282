//! Plain data rows written by output backends.

use serde::Serialize;

/// Where one carrier stood at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarrierTrackRow {
    pub carrier_id: u32,
    pub tick:       u64,
    /// External cell label from the roadmap definition.
    pub cell:       u32,
    pub x:          i32,
    pub y:          i32,
    pub waited:     u32,
}

/// Occupancy and weight of one sector at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorLoadRow {
    pub tick:     u64,
    /// External sector label from the topology definition.
    pub sector:   u32,
    pub occupied: u32,
    pub capacity: u32,
    pub weight:   f64,
}
