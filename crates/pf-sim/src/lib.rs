//! `pf-sim` — the tick state machine of the pallet-flow coordinator.
//!
//! # One tick
//!
//! ```text
//! ① Archive     — push per-sector occupancy/weight into the bounded history
//! ② Goals       — carriers without a goal get a random online station
//! ③ Re-plan     — if a goal was assigned, a request is pending, or idle_step % H == 0
//! ④ Window      — rebuild the H-step prediction window
//! ⑤ Coordinate  — lot/transition conflicts resolved to a fixed point (when ③ ran)
//! ⑥ Advance     — every carrier takes one step
//! ⑦ Promote     — window step 1 becomes the current snapshot
//! ⑧ Verify      — two carriers on one cell is reported as a fault
//! ⑨ Bookkeeping — idle_step += 1, station states and queues refreshed
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pf_core::{ControllerConfig, GridPos};
//! use pf_sim::{ControllerBuilder, NoopObserver};
//!
//! let mut ctl = ControllerBuilder::new(ControllerConfig::default(), graph)
//!     .stations(stations)
//!     .build()?;
//! ctl.add_carrier(GridPos::new(2, 3))?;
//! ctl.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod controller;
pub mod error;
pub mod observer;
pub mod report;

#[cfg(test)]
mod tests;

pub use builder::ControllerBuilder;
pub use controller::Controller;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, TickObserver};
pub use report::{RunSummary, SectorLoad, SectorSnapshot, TickFault, TickReport};
