//! `pf-plan` — routing and conflict resolution.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`planner`]     | `PathPlanner` trait, `TwoLevelPlanner`, `PlanRequest`, `PlannedRoute` |
//! | [`negotiation`] | `NegotiationPolicy` trait, `LongestWait`, `Contender`           |
//! | [`coordinator`] | `ConflictCoordinator`, `Conflict`, `CoordinationOutcome`        |
//! | [`error`]       | `PlanError`, `PlanResult<T>`                                    |

pub mod coordinator;
pub mod error;
pub mod negotiation;
pub mod planner;

#[cfg(test)]
mod tests;

pub use coordinator::{Conflict, ConflictCoordinator, CoordinationOutcome, Snapshot};
pub use error::{PlanError, PlanResult};
pub use negotiation::{negotiation_line, Contender, LongestWait, NegotiationPolicy};
pub use planner::{PathPlanner, PlanRequest, PlannedRoute, RouteQuality, TwoLevelPlanner};
