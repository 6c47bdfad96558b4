//! Dense cell-state storage for the authoritative world.

use gate_puzzle_core::{CellCoord, GridLayout};
use log::warn;

/// Occupied and wall flags for every cell, stored row-major.
///
/// Wall cells are always occupied; block placement and removal never
/// toggle them.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    layout: GridLayout,
    occupied: Vec<bool>,
    walls: Vec<bool>,
}

impl OccupancyGrid {
    pub(crate) fn new(layout: GridLayout) -> Self {
        let capacity = layout.cell_count();
        Self {
            layout,
            occupied: vec![false; capacity],
            walls: vec![false; capacity],
        }
    }

    /// Builds a grid from persisted flags, keeping whatever data is present.
    ///
    /// Arrays whose length disagrees with the layout are truncated or padded
    /// with free cells after logging a warning.
    pub(crate) fn from_flags(layout: GridLayout, occupied: &[bool], walls: &[bool]) -> Self {
        let mut grid = Self::new(layout);
        let capacity = grid.occupied.len();
        for (name, flags) in [("occupied", occupied), ("wall", walls)] {
            if flags.len() != capacity {
                warn!(
                    "{name} cell array holds {} entries but the {}x{} grid expects {capacity}",
                    flags.len(),
                    layout.width(),
                    layout.length()
                );
            }
        }

        for (slot, value) in grid.occupied.iter_mut().zip(occupied) {
            *slot = *value;
        }
        for (slot, value) in grid.walls.iter_mut().zip(walls) {
            *slot = *value;
        }
        for (occupied, wall) in grid.occupied.iter_mut().zip(&grid.walls) {
            *occupied |= *wall;
        }
        grid
    }

    pub(crate) fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub(crate) fn is_within_grid(&self, cell: CellCoord) -> bool {
        self.layout.contains(cell)
    }

    /// Cells outside the grid read as free.
    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.occupied.get(index).copied())
            .unwrap_or(false)
    }

    /// Raw wall flag; callers that honour authored walls go through the registry first.
    pub(crate) fn is_wall_flag(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(false)
    }

    /// Sets the occupied flag of every in-bounds, non-wall cell.
    ///
    /// Out-of-bounds cells are skipped silently.
    pub(crate) fn set_occupied(&mut self, cells: &[CellCoord], value: bool) {
        for cell in cells {
            let Some(index) = self.index(*cell) else {
                continue;
            };
            if self.walls[index] {
                continue;
            }
            self.occupied[index] = value;
        }
    }

    /// Turns the cell into an occupied wall. Returns `false` outside the grid.
    pub(crate) fn mark_wall(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        self.walls[index] = true;
        self.occupied[index] = true;
        true
    }

    /// Seals every cell not flagged in the interior mask as an occupied wall.
    ///
    /// Cells missing from a short mask are left untouched. Returns the number
    /// of cells that became walls.
    pub(crate) fn seal_exterior(&mut self, interior: &[bool]) -> u32 {
        if interior.len() != self.walls.len() {
            warn!(
                "interior mask holds {} entries but the grid has {} cells",
                interior.len(),
                self.walls.len()
            );
        }

        let mut sealed = 0;
        for (index, inside) in interior.iter().enumerate().take(self.walls.len()) {
            if *inside {
                continue;
            }
            if !self.walls[index] {
                sealed += 1;
            }
            self.walls[index] = true;
            self.occupied[index] = true;
        }
        sealed
    }

    /// Frees every non-wall cell.
    pub(crate) fn clear_non_walls(&mut self) {
        for (occupied, wall) in self.occupied.iter_mut().zip(&self.walls) {
            *occupied = *wall;
        }
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        self.layout.index_of(cell)
    }

    pub(crate) fn occupied(&self) -> &[bool] {
        &self.occupied
    }

    pub(crate) fn walls(&self) -> &[bool] {
        &self.walls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn grid(width: u32, length: u32) -> OccupancyGrid {
        OccupancyGrid::new(GridLayout::new(width, length, 1.0, Vec3::ZERO))
    }

    #[test]
    fn set_occupied_skips_out_of_bounds_cells() {
        let mut grid = grid(4, 4);
        grid.set_occupied(
            &[
                CellCoord::new(-1, 0),
                CellCoord::new(4, 0),
                CellCoord::new(0, -1),
                CellCoord::new(0, 4),
                CellCoord::new(1, 1),
            ],
            true,
        );
        assert_eq!(grid.occupied().iter().filter(|cell| **cell).count(), 1);
        assert!(grid.is_occupied(CellCoord::new(1, 1)));
    }

    #[test]
    fn walls_stay_occupied_when_released() {
        let mut grid = grid(3, 3);
        assert!(grid.mark_wall(CellCoord::new(1, 1)));
        grid.set_occupied(&[CellCoord::new(1, 1)], false);
        assert!(grid.is_occupied(CellCoord::new(1, 1)));
        grid.clear_non_walls();
        assert!(grid.is_occupied(CellCoord::new(1, 1)));
    }

    #[test]
    fn seal_exterior_walls_every_non_interior_cell() {
        let mut grid = grid(3, 3);
        let mut interior = vec![false; 9];
        interior[4] = true;
        assert_eq!(grid.seal_exterior(&interior), 8);
        assert!(!grid.is_occupied(CellCoord::new(1, 1)));
        assert!(grid.is_wall_flag(CellCoord::new(0, 0)));
        assert!(grid.is_occupied(CellCoord::new(2, 2)));
        assert_eq!(grid.seal_exterior(&interior), 0);
    }

    #[test]
    fn from_flags_keeps_partial_data_and_forces_walls_occupied() {
        let layout = GridLayout::new(2, 2, 1.0, Vec3::ZERO);
        let grid = OccupancyGrid::from_flags(layout, &[true], &[false, false, false, true, true]);
        assert!(grid.is_occupied(CellCoord::new(0, 0)));
        assert!(!grid.is_occupied(CellCoord::new(1, 0)));
        assert!(grid.is_wall_flag(CellCoord::new(1, 1)));
        assert!(grid.is_occupied(CellCoord::new(1, 1)));
        assert_eq!(grid.walls().len(), 4);
    }
}
