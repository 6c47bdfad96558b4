//! Admissibility checks for block footprints.

use gate_puzzle_core::{CellCoord, PlacementError};

use crate::{grid::OccupancyGrid, registry::WallRegistry};

/// Decides whether a block may cover `candidate`.
///
/// Works on a copy of the occupancy flags from which the block's `current`
/// cells are cleared, so a block validates through its own position. Every
/// candidate cell must be inside the grid, free in the copy and not a wall;
/// the first failing cell rejects the whole footprint. The live grid is
/// never touched.
pub(crate) fn validate(
    grid: &OccupancyGrid,
    walls: &WallRegistry,
    current: &[CellCoord],
    candidate: &[CellCoord],
) -> Result<(), PlacementError> {
    if candidate.is_empty() {
        return Err(PlacementError::EmptyFootprint);
    }

    let mut working = grid.occupied().to_vec();
    for cell in current {
        if let Some(index) = grid.index(*cell) {
            working[index] = false;
        }
    }

    for cell in candidate {
        let Some(index) = grid.index(*cell) else {
            return Err(PlacementError::OutOfBounds);
        };
        if walls.contains(*cell) || grid.is_wall_flag(*cell) {
            return Err(PlacementError::Wall);
        }
        if working[index] {
            return Err(PlacementError::Occupied);
        }
    }

    Ok(())
}
