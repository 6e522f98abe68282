//! Cell kinds and the workspace floor plan.
//!
//! A `FloorPlan` is the static layout handed to the coordinator by whatever
//! loads the shop floor.  It only answers "what kind of cell is this"; the
//! roadmap graph built from it decides connectivity.

use crate::{GridPos, PfError, PfResult, Rect};

/// What occupies a grid cell in the static layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Station,
    Queue,
    Park,
    Roadway,
}

impl CellKind {
    /// `true` if a carrier may stand on a cell of this kind.
    #[inline]
    pub fn is_traversable(self) -> bool {
        match self {
            CellKind::Wall => false,
            CellKind::Empty
            | CellKind::Station
            | CellKind::Queue
            | CellKind::Park
            | CellKind::Roadway => true,
        }
    }
}

/// Row-major `width × height` grid of [`CellKind`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloorPlan {
    width:  i32,
    height: i32,
    kinds:  Vec<CellKind>,
}

impl FloorPlan {
    /// An all-`Empty` plan.
    pub fn new(width: i32, height: i32) -> PfResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(PfError::Config(format!(
                "floor plan must have positive size, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            kinds: vec![CellKind::Empty; (width * height) as usize],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn offset(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Kind at `pos`; out-of-bounds positions read as `Wall`.
    pub fn kind_at(&self, pos: GridPos) -> CellKind {
        self.offset(pos).map_or(CellKind::Wall, |i| self.kinds[i])
    }

    pub fn set(&mut self, pos: GridPos, kind: CellKind) -> PfResult<()> {
        let i = self
            .offset(pos)
            .ok_or_else(|| PfError::Config(format!("position {pos} is outside the floor plan")))?;
        self.kinds[i] = kind;
        Ok(())
    }

    /// Paint every in-bounds cell of `area` with `kind`.
    pub fn paint(&mut self, area: Rect, kind: CellKind) {
        for pos in area.cells() {
            if let Some(i) = self.offset(pos) {
                self.kinds[i] = kind;
            }
        }
    }

    /// All traversable positions, row by row.
    pub fn traversable(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| GridPos::new(x, y)))
            .filter(move |&p| self.kind_at(p).is_traversable())
    }
}
