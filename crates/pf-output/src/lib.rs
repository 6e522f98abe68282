//! `pf-output` — output writers for the pallet-flow coordinator.
//!
//! | Backend | Files created                              |
//! |---------|--------------------------------------------|
//! | CSV     | `carrier_tracks.csv`, `sector_load.csv`    |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`TrafficOutputObserver`], which implements `pf_sim::TickObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pf_output::{CsvWriter, TrafficOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = TrafficOutputObserver::new(writer);
//! ctl.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::TrafficOutputObserver;
pub use row::{CarrierTrackRow, SectorLoadRow};
pub use writer::OutputWriter;
