//! Allowed-node sets.
//!
//! A search restricted to a `Mask` behaves as if it ran on the induced
//! subgraph of the allowed nodes, without building that subgraph.

use std::marker::PhantomData;

use pf_core::{CellId, SectorId};

/// Dense membership bitmap over a graph's node indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask<I> {
    bits: Vec<bool>,
    _id:  PhantomData<I>,
}

pub type CellMask = Mask<CellId>;
pub type SectorMask = Mask<SectorId>;

impl<I: Copy + Into<usize>> Mask<I> {
    /// Every node allowed.
    pub fn all(len: usize) -> Self {
        Self { bits: vec![true; len], _id: PhantomData }
    }

    /// No node allowed.
    pub fn none(len: usize) -> Self {
        Self { bits: vec![false; len], _id: PhantomData }
    }

    pub fn insert(&mut self, id: I) {
        if let Some(b) = self.bits.get_mut(id.into()) {
            *b = true;
        }
    }

    pub fn remove(&mut self, id: I) {
        if let Some(b) = self.bits.get_mut(id.into()) {
            *b = false;
        }
    }

    /// Out-of-range ids are never contained.
    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.contains_index(id.into())
    }

    #[inline]
    pub(crate) fn contains_index(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    /// Size of the underlying node range, not the number of allowed nodes.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of allowed nodes.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}
