//! `Fleet` — every carrier, keyed by id.
//!
//! Ids are handed out from a monotonic counter and never reused, so a
//! removed carrier's id cannot be confused with a later one.  Iteration is
//! always in ascending id order, which is what negotiation tie-breaks rely
//! on.

use std::collections::BTreeMap;

use pf_core::{CarrierId, CellId};

use crate::carrier::Carrier;
use crate::error::{FleetError, FleetResult};

#[derive(Clone, Debug, Default)]
pub struct Fleet {
    carriers: BTreeMap<CarrierId, Carrier>,
    next_id:  u32,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a carrier at `cell` and return its id.
    pub fn add(&mut self, cell: CellId) -> CarrierId {
        let id = CarrierId(self.next_id);
        self.next_id += 1;
        self.carriers.insert(id, Carrier::new(id, cell));
        id
    }

    pub fn remove(&mut self, id: CarrierId) -> FleetResult<Carrier> {
        self.carriers.remove(&id).ok_or(FleetError::UnknownCarrier(id))
    }

    pub fn get(&self, id: CarrierId) -> FleetResult<&Carrier> {
        self.carriers.get(&id).ok_or(FleetError::UnknownCarrier(id))
    }

    pub fn get_mut(&mut self, id: CarrierId) -> FleetResult<&mut Carrier> {
        self.carriers.get_mut(&id).ok_or(FleetError::UnknownCarrier(id))
    }

    pub fn contains(&self, id: CarrierId) -> bool {
        self.carriers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = CarrierId> + '_ {
        self.carriers.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Carrier> + '_ {
        self.carriers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Carrier> + '_ {
        self.carriers.values_mut()
    }

    /// `(id, position)` for every carrier.
    pub fn positions(&self) -> impl Iterator<Item = (CarrierId, CellId)> + '_ {
        self.carriers.values().map(|c| (c.id, c.position))
    }

    /// The carrier standing on `cell`, if any.
    pub fn at(&self, cell: CellId) -> Option<CarrierId> {
        self.carriers.values().find(|c| c.position == cell).map(|c| c.id)
    }

    /// Every plan, in ascending id order.
    pub fn paths(&self) -> Vec<Vec<CellId>> {
        self.carriers.values().map(|c| c.path().to_vec()).collect()
    }
}
