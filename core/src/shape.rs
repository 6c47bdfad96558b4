//! Block silhouettes and quarter-turn rotation.

use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Quarter-turn rotation around the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// A quarter turn clockwise seen from above.
    Deg90,
    /// A half turn.
    Deg180,
    /// Three quarter turns clockwise seen from above.
    Deg270,
}

impl Rotation {
    /// Every quarter turn, starting from no rotation.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Snaps a heading in degrees to the nearest quarter turn.
    #[must_use]
    pub fn from_degrees(degrees: f32) -> Self {
        if !degrees.is_finite() {
            return Self::Deg0;
        }
        match ((degrees / 90.0).round() as i64).rem_euclid(4) {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Rotates a single pivot offset.
    #[must_use]
    pub const fn apply(self, offset: CellCoord) -> CellCoord {
        let (x, z) = (offset.x(), offset.z());
        match self {
            Self::Deg0 => CellCoord::new(x, z),
            Self::Deg90 => CellCoord::new(z, -x),
            Self::Deg180 => CellCoord::new(-x, -z),
            Self::Deg270 => CellCoord::new(-z, x),
        }
    }
}

/// Block silhouette expressed as offsets from a pivot cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockShape {
    offsets: Vec<CellCoord>,
}

impl BlockShape {
    /// Creates a shape from its pivot offsets.
    #[must_use]
    pub fn new(offsets: Vec<CellCoord>) -> Self {
        Self { offsets }
    }

    /// Straight bar of `length` cells extending toward increasing `x`.
    #[must_use]
    pub fn bar(length: u32) -> Self {
        let length = i32::try_from(length).unwrap_or(i32::MAX);
        Self::new((0..length).map(|x| CellCoord::new(x, 0)).collect())
    }

    /// Unrotated pivot offsets.
    #[must_use]
    pub fn offsets(&self) -> &[CellCoord] {
        &self.offsets
    }

    /// Offsets after applying the rotation, in the same order.
    #[must_use]
    pub fn rotated(&self, rotation: Rotation) -> Vec<CellCoord> {
        self.offsets
            .iter()
            .map(|offset| rotation.apply(*offset))
            .collect()
    }

    /// Grid cells covered when the pivot sits on `anchor`.
    #[must_use]
    pub fn footprint(&self, anchor: CellCoord, rotation: Rotation) -> Vec<CellCoord> {
        self.rotated(rotation)
            .into_iter()
            .map(|offset| anchor.offset(offset.x(), offset.z()))
            .collect()
    }

    /// Anchor that reproduces `cells`, listed in enumeration order, under some quarter turn.
    #[must_use]
    pub fn anchor_of(&self, cells: &[CellCoord]) -> Option<CellCoord> {
        if cells.len() != self.offsets.len() {
            return None;
        }
        let pivot = self.pivot_index();
        let pivot_cell = *cells.get(pivot)?;
        let pivot_offset = *self.offsets.get(pivot)?;
        Rotation::ALL.into_iter().find_map(|rotation| {
            let turned = rotation.apply(pivot_offset);
            let anchor = pivot_cell.offset(-turned.x(), -turned.z());
            (self.footprint(anchor, rotation) == cells).then_some(anchor)
        })
    }

    /// Position of the zero offset, or the first entry when the pivot is not covered.
    #[must_use]
    pub fn pivot_index(&self) -> usize {
        self.offsets
            .iter()
            .position(|offset| *offset == CellCoord::new(0, 0))
            .unwrap_or(0)
    }
}
