//! `pf-fleet` — the moving and stationary entities of the shop floor.
//!
//! # Crate layout
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`carrier`] | `Carrier` (position, plan, stall counter, history) |
//! | [`station`] | `Station`, `StationState`, `QueueSlot`            |
//! | [`fleet`]   | `Fleet` (id-ordered carrier store)                |
//! | [`error`]   | `FleetError`, `FleetResult<T>`                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                        |
//! |---------|-----------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on stations |

pub mod carrier;
pub mod error;
pub mod fleet;
pub mod station;


pub use carrier::Carrier;
pub use error::{FleetError, FleetResult};
pub use fleet::Fleet;
pub use station::{QueueSlot, Station, StationState};
