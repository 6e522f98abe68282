//! Strongly typed, zero-cost identifier wrappers.
//!
//! `CellId` and `SectorId` are dense arena indices into the graph store, not
//! the external labels found in graph definition files.  The store keeps the
//! label for each index so logs and accessors can still speak the labels.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identity of a carrier (pallet).  Allocated sequentially by the fleet.
    pub struct CarrierId(u32);
}

typed_id! {
    /// Arena index of a roadmap cell.
    pub struct CellId(u32);
}

typed_id! {
    /// Arena index of a topology sector.
    pub struct SectorId(u32);
}

typed_id! {
    /// Index of a directed edge in either graph's CSR edge arrays.
    pub struct EdgeId(u32);
}
