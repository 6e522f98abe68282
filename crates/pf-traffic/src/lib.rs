//! `pf-traffic` — occupancy, congestion weights and the prediction window.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                |
//! |----------------|---------------------------------------------------------|
//! | [`congestion`] | `CongestionModel`, `Laplacian`                          |
//! | [`state`]      | `TrafficState` (current snapshot), `TrafficView` trait  |
//! | [`window`]     | `PredictionWindow`, `StepView`, `WindowStep`            |
//!
//! Nothing here owns the graph.  Every operation borrows a `GraphStore`
//! for host/member lookups, so a window step is only a delta over the
//! current state.

pub mod congestion;
pub mod state;
pub mod window;


pub use congestion::{CongestionModel, Laplacian};
pub use state::{TrafficState, TrafficView};
pub use window::{pad_path, PredictionWindow, StepView, WindowStep};
