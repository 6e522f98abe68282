//! A single load carrier ("pallet").

use pf_core::{CarrierId, CellId};

use crate::error::{FleetError, FleetResult};

/// One carrier and its plan.
///
/// `path[0]` is always the carrier's current cell; every mutation of the
/// path goes through a method that keeps it that way.
#[derive(Clone, Debug, PartialEq)]
pub struct Carrier {
    pub id: CarrierId,

    /// Cell the carrier stands on.
    pub position: CellId,

    path: Vec<CellId>,

    /// Cell the carrier is heading to.
    pub goal: Option<CellId>,

    /// Station the goal belongs to, if the goal was set by station name.
    pub target: Option<String>,

    /// Station the carrier currently sits at.
    pub station: Option<String>,

    /// Consecutive ticks spent without moving while a move was planned.
    pub waited: u32,

    /// Every cell the carrier has stood on, oldest first.  Starts with the
    /// spawn cell; each tick appends one entry.
    pub history: Vec<CellId>,
}

impl Carrier {
    pub fn new(id: CarrierId, position: CellId) -> Self {
        Self {
            id,
            position,
            path: vec![position],
            goal: None,
            target: None,
            station: None,
            waited: 0,
            history: vec![position],
        }
    }

    pub fn path(&self) -> &[CellId] {
        &self.path
    }

    /// Replace the plan.  `path` must start at the current position.
    pub fn set_path(&mut self, path: Vec<CellId>) -> FleetResult<()> {
        match path.first() {
            None => Err(FleetError::EmptyPath(self.id)),
            Some(&found) if found != self.position => Err(FleetError::PathStartMismatch {
                carrier: self.id,
                expected: self.position,
                found,
            }),
            Some(_) => {
                self.path = path;
                Ok(())
            }
        }
    }

    /// `true` when the plan is just the current cell.
    pub fn is_idle(&self) -> bool {
        self.path.len() <= 1
    }

    /// `true` when there is no goal or the goal has been reached.
    pub fn needs_goal(&self) -> bool {
        self.goal.is_none_or(|g| g == self.position)
    }

    /// Execute one planned step.
    ///
    /// A step onto the same cell counts as a wait; a real move resets the
    /// counter.  An idle carrier stays put and keeps its counter.
    pub fn advance(&mut self) {
        if self.path.len() > 1 {
            if self.path[1] == self.position {
                self.waited += 1;
            } else {
                self.waited = 0;
            }
            self.path.remove(0);
            self.position = self.path[0];
        }
        self.history.push(self.position);
    }

    /// Repeat the last cell until the path has at least `len` entries.
    pub fn pad_path(&mut self, len: usize) {
        if let Some(&last) = self.path.last() {
            if self.path.len() < len {
                self.path.resize(len, last);
            }
        }
    }

    /// Hold at step `t - 1` for one extra tick; later steps shift back by one.
    ///
    /// `t` must be at least 1.
    pub fn insert_wait(&mut self, t: usize) -> FleetResult<()> {
        if t == 0 {
            return Err(FleetError::SpliceOutOfRange { carrier: self.id, index: t, len: self.path.len() });
        }
        self.pad_path(t);
        let hold = self.path[t - 1];
        self.path.insert(t, hold);
        Ok(())
    }

    /// Replace everything from step `index` onward with `sub`.
    ///
    /// `sub[0]` must equal the cell currently at `index`, so the carrier's
    /// predicted position at that step is unchanged.
    pub fn splice_from(&mut self, index: usize, sub: Vec<CellId>) -> FleetResult<()> {
        self.pad_path(index + 1);
        let expected = self.path[index];
        match sub.first() {
            None => return Err(FleetError::EmptyPath(self.id)),
            Some(&found) if found != expected => {
                return Err(FleetError::PathStartMismatch { carrier: self.id, expected, found });
            }
            Some(_) => {}
        }
        self.path.truncate(index);
        self.path.extend(sub);
        Ok(())
    }
}
