//! Observer trait for progress reporting and data collection.

use pf_core::Tick;
use pf_fleet::Fleet;
use pf_graph::GraphStore;
use pf_traffic::TrafficState;

use crate::report::TickReport;

/// Callbacks invoked by [`Controller::run`][crate::Controller::run] and
/// [`Controller::run_ticks`][crate::Controller::run_ticks].
///
/// Every hook defaults to a no-op so implementors only override what they
/// need.
///
/// # Example: fault counter
///
/// ```rust,ignore
/// struct Faults(usize);
///
/// impl TickObserver for Faults {
///     fn on_tick_end(&mut self, _tick: Tick, report: &TickReport) {
///         self.0 += report.faults.len();
///     }
/// }
/// ```
pub trait TickObserver {
    /// Called before any processing of `tick`.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once `tick` has been fully processed.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}

    /// Called every `config.output_interval_ticks` ticks, after the tick
    /// finished, with read-only access to the fleet and the promoted
    /// traffic snapshot.
    fn on_snapshot(
        &mut self,
        _tick:    Tick,
        _fleet:   &Fleet,
        _graph:   &GraphStore,
        _traffic: &TrafficState,
    ) {}

    /// Called once after the last tick of a `run`.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`TickObserver`] that ignores every callback.
pub struct NoopObserver;

impl TickObserver for NoopObserver {}
