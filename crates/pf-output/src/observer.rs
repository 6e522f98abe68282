//! `TrafficOutputObserver<W>` — bridges `TickObserver` to an `OutputWriter`.

use pf_core::{SectorId, Tick};
use pf_fleet::Fleet;
use pf_graph::GraphStore;
use pf_sim::TickObserver;
use pf_traffic::{TrafficState, TrafficView};

use crate::row::{CarrierTrackRow, SectorLoadRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`TickObserver`] that writes carrier tracks and sector load at every
/// snapshot.
///
/// Observer hooks cannot fail, so the first writer error is stored and
/// retrieved with [`take_error`][Self::take_error] after the run.
pub struct TrafficOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> TrafficOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// The stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer.  `run` does this itself; call it after `run_ticks`.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> TickObserver for TrafficOutputObserver<W> {
    fn on_snapshot(&mut self, tick: Tick, fleet: &Fleet, graph: &GraphStore, traffic: &TrafficState) {
        let tracks: Vec<CarrierTrackRow> = fleet
            .iter()
            .map(|c| {
                let pos = graph.cell_pos(c.position);
                CarrierTrackRow {
                    carrier_id: c.id.0,
                    tick:       tick.0,
                    cell:       graph.cell_label(c.position),
                    x:          pos.x,
                    y:          pos.y,
                    waited:     c.waited,
                }
            })
            .collect();
        if !tracks.is_empty() {
            let result = self.writer.write_tracks(&tracks);
            self.store_err(result);
        }

        let sectors: Vec<SectorLoadRow> = (0..graph.sector_count())
            .map(|s| {
                let sector = SectorId(s as u32);
                SectorLoadRow {
                    tick:     tick.0,
                    sector:   graph.sector_label(sector),
                    occupied: traffic.sector_occupancy(sector),
                    capacity: graph.capacity(sector),
                    weight:   traffic.sector_weight(sector),
                }
            })
            .collect();
        let result = self.writer.write_sector_load(&sectors);
        self.store_err(result);
    }

    fn on_run_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
