//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `carrier_tracks.csv`
//! - `sector_load.csv`

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::writer::OutputWriter;
use crate::{CarrierTrackRow, OutputResult, SectorLoadRow};

pub const TRACKS_FILE: &str = "carrier_tracks.csv";
pub const SECTOR_LOAD_FILE: &str = "sector_load.csv";

/// Writes tracks and sector load to two CSV files.
pub struct CsvWriter {
    tracks:   Writer<File>,
    sectors:  Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write their header rows, so a
    /// run with no snapshots still leaves well-formed files.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut tracks = open(&dir.join(TRACKS_FILE))?;
        tracks.write_record(["carrier_id", "tick", "cell", "x", "y", "waited"])?;

        let mut sectors = open(&dir.join(SECTOR_LOAD_FILE))?;
        sectors.write_record(["tick", "sector", "occupied", "capacity", "weight"])?;

        Ok(Self { tracks, sectors, finished: false })
    }
}

fn open(path: &Path) -> OutputResult<Writer<File>> {
    Ok(WriterBuilder::new().has_headers(false).from_path(path)?)
}

impl OutputWriter for CsvWriter {
    fn write_tracks(&mut self, rows: &[CarrierTrackRow]) -> OutputResult<()> {
        for row in rows {
            self.tracks.serialize(row)?;
        }
        Ok(())
    }

    fn write_sector_load(&mut self, rows: &[SectorLoadRow]) -> OutputResult<()> {
        for row in rows {
            self.sectors.serialize(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.tracks.flush()?;
        self.sectors.flush()?;
        Ok(())
    }
}
