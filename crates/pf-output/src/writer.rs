//! The `OutputWriter` trait implemented by output backends.

use crate::{CarrierTrackRow, OutputResult, SectorLoadRow};

/// A sink for per-tick output rows.
///
/// Errors are returned to the caller; [`TrafficOutputObserver`] keeps the
/// first one for [`take_error`].
///
/// [`TrafficOutputObserver`]: crate::TrafficOutputObserver
/// [`take_error`]: crate::TrafficOutputObserver::take_error
pub trait OutputWriter {
    fn write_tracks(&mut self, rows: &[CarrierTrackRow]) -> OutputResult<()>;

    fn write_sector_load(&mut self, rows: &[SectorLoadRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
