//! Coordinate transforms between grid cells, linear indices and world space.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Distance under which a world point counts as sitting on a cell centre.
const CENTRE_EPSILON: f32 = 1.0e-4;

/// Dimensions, spacing and world placement of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    width: u32,
    length: u32,
    cell_size: f32,
    origin: Vec3,
}

impl GridLayout {
    /// Largest number of cells a world will allocate for.
    pub const MAX_CELLS: usize = 1 << 20;

    /// Creates a new grid layout.
    #[must_use]
    pub const fn new(width: u32, length: u32, cell_size: f32, origin: Vec3) -> Self {
        Self {
            width,
            length,
            cell_size,
            origin,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Distance between neighbouring cell centres in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the centre of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.length);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the grid holds more than [`Self::MAX_CELLS`] cells.
    #[must_use]
    pub fn exceeds_cell_limit(&self) -> bool {
        u64::from(self.width) * u64::from(self.length) > Self::MAX_CELLS as u64
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index_of(cell).is_some()
    }

    /// Row-major index of the cell, `z * width + x`.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        let x = u32::try_from(cell.x()).ok()?;
        let z = u32::try_from(cell.z()).ok()?;
        if x >= self.width || z >= self.length {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        Some(usize::try_from(z).ok()? * width + usize::try_from(x).ok()?)
    }

    /// Cell addressed by a row-major index.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let x = i32::try_from(index % width).ok()?;
        let z = i32::try_from(index / width).ok()?;
        Some(CellCoord::new(x, z))
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.cell_count()).filter_map(|index| self.coord_of(index))
    }

    /// World-space centre of the cell. Cells outside the grid extrapolate.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            self.origin.x + cell.x() as f32 * self.cell_size,
            self.origin.y,
            self.origin.z + cell.z() as f32 * self.cell_size,
        )
    }

    /// Cell whose centre is closest to the world point, projected onto the grid plane.
    ///
    /// Points sitting on a cell centre resolve directly by index. Any other
    /// point falls back to a nearest-centre scan in x-major, z-minor order;
    /// the first cell found at the minimum distance wins. Returns `None` only
    /// for a grid without cells.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec3) -> Option<CellCoord> {
        if let Some(cell) = self.exact_cell(position) {
            return Some(cell);
        }

        let query = Vec3::new(position.x, self.origin.y, position.z);
        let mut best: Option<(f32, CellCoord)> = None;
        for x in 0..self.width {
            for z in 0..self.length {
                let cell = CellCoord::new(i32::try_from(x).ok()?, i32::try_from(z).ok()?);
                let distance = self.cell_to_world(cell).distance_squared(query);
                match best {
                    Some((best_distance, _)) if distance >= best_distance => {}
                    _ => best = Some((distance, cell)),
                }
            }
        }
        best.map(|(_, cell)| cell)
    }

    /// Mean world position of the provided cells.
    #[must_use]
    pub fn centroid(&self, cells: &[CellCoord]) -> Option<Vec3> {
        if cells.is_empty() {
            return None;
        }
        let sum = cells
            .iter()
            .fold(Vec3::ZERO, |sum, cell| sum + self.cell_to_world(*cell));
        Some(sum / cells.len() as f32)
    }

    fn exact_cell(&self, position: Vec3) -> Option<CellCoord> {
        if self.cell_size <= f32::EPSILON {
            return None;
        }
        let fx = (position.x - self.origin.x) / self.cell_size;
        let fz = (position.z - self.origin.z) / self.cell_size;
        let (rx, rz) = (fx.round(), fz.round());
        if (fx - rx).abs() > CENTRE_EPSILON || (fz - rz).abs() > CENTRE_EPSILON {
            return None;
        }
        let cell = CellCoord::new(rx as i32, rz as i32);
        self.contains(cell).then_some(cell)
    }
}
