//! Workstations: named areas carriers are sent to.

use std::fmt;

use pf_core::{CarrierId, GridPos, Rect};

/// Operating state of a station.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationState {
    /// Out of service; never picked as a random goal.
    Offline,
    /// In service with no carrier inside.
    #[default]
    Starving,
    /// In service with at least one carrier inside.
    Busy,
}

impl fmt::Display for StationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StationState::Offline  => "offline",
            StationState::Starving => "starving",
            StationState::Busy     => "busy",
        };
        f.write_str(s)
    }
}

/// One waiting position in front of a station.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueSlot {
    pub pos:      GridPos,
    pub occupant: Option<CarrierId>,
}

/// A workstation.  `entry` is where routed carriers are sent; `exit` is
/// where they leave from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    pub name:  String,
    pub area:  Rect,
    pub state: StationState,
    pub queue: Vec<QueueSlot>,
    pub entry: GridPos,
    pub exit:  GridPos,
}

impl Station {
    pub fn new(name: impl Into<String>, area: Rect, entry: GridPos, exit: GridPos) -> Self {
        Self {
            name: name.into(),
            area,
            state: StationState::Starving,
            queue: Vec::new(),
            entry,
            exit,
        }
    }

    /// Builder-style: append queue slots in order.
    pub fn with_queue(mut self, slots: impl IntoIterator<Item = GridPos>) -> Self {
        self.queue
            .extend(slots.into_iter().map(|pos| QueueSlot { pos, occupant: None }));
        self
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.area.contains(pos)
    }

    pub fn is_online(&self) -> bool {
        self.state != StationState::Offline
    }

    /// Re-derive `Busy`/`Starving` from whether any carrier stands inside.
    /// Offline stations are left alone.
    pub fn refresh_state(&mut self, occupied: bool) {
        if self.is_online() {
            self.state = if occupied { StationState::Busy } else { StationState::Starving };
        }
    }

    /// Record which carrier stands on each queue slot.
    pub fn refresh_queue<F>(&mut self, occupant_at: F)
    where
        F: Fn(GridPos) -> Option<CarrierId>,
    {
        for slot in &mut self.queue {
            slot.occupant = occupant_at(slot.pos);
        }
    }

    /// Carriers waiting in the queue, front first.
    pub fn queued(&self) -> impl Iterator<Item = CarrierId> + '_ {
        self.queue.iter().filter_map(|s| s.occupant)
    }
}
