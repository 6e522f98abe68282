//! `pf-core` — foundational types for the `pallet-flow` coordinator.
//!
//! Every other `pf-*` crate depends on this one.  It has no `pf-*`
//! dependencies and minimal external ones (`rand`, `thiserror`, optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `CarrierId`, `CellId`, `SectorId`, `EdgeId`               |
//! | [`geo`]      | `GridPos`, `Rect`                                         |
//! | [`cell`]     | `CellKind`, `FloorPlan`                                   |
//! | [`config`]   | `ControllerConfig`, `WeightMode`                          |
//! | [`rng`]      | `SimRng`                                                  |
//! | [`time`]     | `Tick`                                                    |
//! | [`log`]      | `EventLog` — bounded rolling text log                     |
//! | [`error`]    | `PfError`, `PfResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, geometry and config. |

pub mod cell;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod log;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{CellKind, FloorPlan};
pub use config::{ControllerConfig, WeightMode};
pub use error::{PfError, PfResult};
pub use geo::{GridPos, Rect};
pub use ids::{CarrierId, CellId, EdgeId, SectorId};
pub use log::EventLog;
pub use rng::SimRng;
pub use time::Tick;
