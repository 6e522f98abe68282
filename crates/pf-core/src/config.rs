//! Controller configuration.
//!
//! Typically built in code or loaded from JSON by the application crate
//! (enable the `serde` feature) and handed to the controller builder.

use crate::{PfError, PfResult, Tick};

/// How sector weights are derived from occupancy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightMode {
    /// `K·occ/(cap − occ)`, saturating at `K·cap` once full.
    #[default]
    Origin,
    /// Raw `K·occ/cap`, then one step of `(I + K·L)` mixing over the topology.
    Consensus,
}

/// Top-level coordinator configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Look-ahead horizon `H` in ticks.  Also the re-plan period when no
    /// unexpected event occurs.
    pub horizon: usize,

    /// Congestion gain `K`.
    pub gain: f64,

    pub weight_mode: WeightMode,

    /// Hard cap on window rebuilds inside one coordination pass.
    pub max_coordination_rounds: usize,

    /// Topology snapshots kept in the rolling history.
    pub history_len: usize,

    /// Lines kept in the rolling negotiation/coordination event log.
    pub event_log_len: usize,

    /// Master RNG seed.  The same seed reproduces the same goal sequence.
    pub seed: u64,

    /// Probability that an idle carrier is spontaneously sent to a random
    /// station after moving.  `None` disables the behaviour.
    pub spontaneous_reroute: Option<f64>,

    /// Ticks simulated by `Controller::run`.
    pub total_ticks: u64,

    /// Observer snapshot cadence; 1 = every tick, 0 = never.
    pub output_interval_ticks: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            horizon:                 1,
            gain:                    10.0,
            weight_mode:             WeightMode::Origin,
            max_coordination_rounds: 512,
            history_len:             128,
            event_log_len:           16,
            seed:                    0,
            spontaneous_reroute:     None,
            total_ticks:             2_500,
            output_interval_ticks:   1,
        }
    }
}

impl ControllerConfig {
    /// Reject values the tick loop cannot work with.
    pub fn validate(&self) -> PfResult<()> {
        if self.horizon == 0 {
            return Err(PfError::Config("horizon must be at least 1".into()));
        }
        if !self.gain.is_finite() {
            return Err(PfError::Config(format!("gain must be finite, got {}", self.gain)));
        }
        if self.max_coordination_rounds == 0 {
            return Err(PfError::Config("max_coordination_rounds must be at least 1".into()));
        }
        if self.event_log_len == 0 {
            return Err(PfError::Config("event_log_len must be at least 1".into()));
        }
        if let Some(p) = self.spontaneous_reroute {
            if !(0.0..=1.0).contains(&p) {
                return Err(PfError::Config(format!(
                    "spontaneous_reroute must be within [0, 1], got {p}"
                )));
            }
        }
        Ok(())
    }

    /// The tick at which `run` stops (exclusive).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }
}
