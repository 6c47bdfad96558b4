#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure gate resolution system that decides which blocks a gate pulls out of the grid.
//!
//! A resolution pass walks every settled block in placement order. For each of
//! the block's cells, in the block's own enumeration order, the four neighbours
//! are probed in [`Direction::CHECK_ORDER`]. The first neighbour that holds a
//! gate of the block's colour, pulling in the probed direction, wide enough for
//! the block and with a clear path, selects that gate. A block is pulled
//! through at most one gate per pass.

use gate_puzzle_core::{
    Axis, BlockSnapshot, BlockView, CellCoord, Command, Direction, Event, GateId, GateSnapshot,
    GateView, LevelState, OccupancyView,
};
use log::debug;

/// Reason a gate adjacent to a block did not pull it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// Gate and block colours differ.
    Color,
    /// The block sits on a side the gate does not pull from.
    Direction,
    /// Some column or row of the block has no matching aperture cell.
    Fit,
    /// The cell beyond the block toward the gate is blocked.
    Path,
}

/// Gate resolution system that emits extraction commands for eligible blocks.
#[derive(Debug, Default, Clone)]
pub struct GateMatcher {
    passes: u64,
}

impl GateMatcher {
    /// Creates a new gate matcher.
    #[must_use]
    pub const fn new() -> Self {
        Self { passes: 0 }
    }

    /// Number of resolution passes run so far.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Consumes world events and runs a resolution pass when the board settled.
    ///
    /// Nothing happens unless `level_state` is active. Cells released by a
    /// block selected earlier in the same pass count as free for the blocks
    /// that follow it.
    pub fn handle(
        &mut self,
        events: &[Event],
        level_state: LevelState,
        blocks: &BlockView,
        gates: &GateView,
        occupancy: OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        if !level_state.is_active() {
            return;
        }
        if !events.iter().any(triggers_pass) {
            return;
        }

        self.passes = self.passes.saturating_add(1);
        let mut released: Vec<CellCoord> = Vec::new();
        for block in blocks.iter().filter(|block| !block.extracting) {
            let is_occupied =
                |cell: CellCoord| occupancy.is_occupied(cell) && !released.contains(&cell);
            if let Some(gate) = select_gate(block, gates, &occupancy, is_occupied) {
                debug!("gate {} pulls block {}", gate.get(), block.id.get());
                released.extend(block.cells.iter().copied());
                out.push(Command::ExtractBlock {
                    block: block.id,
                    gate,
                });
            }
        }
    }
}

fn triggers_pass(event: &Event) -> bool {
    matches!(
        event,
        Event::GridInitialized
            | Event::BlockPlaced { .. }
            | Event::BlockMoved { .. }
            | Event::BlockRemoved { .. }
            | Event::ExtractionStarted { .. }
            | Event::GateAdded { .. }
            | Event::LevelStateChanged { .. }
    )
}

/// Picks the gate that pulls `block`, if any.
///
/// `is_occupied` answers occupancy for in-bounds cells during the path check.
pub fn select_gate<F>(
    block: &BlockSnapshot,
    gates: &GateView,
    occupancy: &OccupancyView<'_>,
    is_occupied: F,
) -> Option<GateId>
where
    F: Fn(CellCoord) -> bool,
{
    for cell in &block.cells {
        for direction in Direction::CHECK_ORDER {
            let neighbour = cell.step(direction);
            if !occupancy.is_within_grid(neighbour) {
                continue;
            }
            let Some(gate) = gates.gate_at(neighbour) else {
                continue;
            };
            match check_gate(block, direction, gate, occupancy, &is_occupied) {
                Ok(()) => return Some(gate.id),
                Err(mismatch) => debug!(
                    "gate {} ignores block {} probing {direction:?}: {mismatch:?}",
                    gate.id.get(),
                    block.id.get()
                ),
            }
        }
    }
    None
}

/// Runs the colour, direction, fit and path checks for a probed neighbour gate.
pub fn check_gate<F>(
    block: &BlockSnapshot,
    probe: Direction,
    gate: &GateSnapshot,
    occupancy: &OccupancyView<'_>,
    is_occupied: F,
) -> Result<(), Mismatch>
where
    F: Fn(CellCoord) -> bool,
{
    if gate.color != block.color {
        return Err(Mismatch::Color);
    }
    if gate.direction != probe {
        return Err(Mismatch::Direction);
    }
    if !fits_through(&block.cells, gate) {
        return Err(Mismatch::Fit);
    }
    if !is_path_clear(&block.cells, gate, occupancy, is_occupied) {
        return Err(Mismatch::Path);
    }
    Ok(())
}

/// Reports whether every column (or row) of the block has a matching aperture cell.
///
/// North and South gates compare `x` coordinates, East and West gates compare `z`.
#[must_use]
pub fn fits_through(block_cells: &[CellCoord], gate: &GateSnapshot) -> bool {
    let project = |cell: &CellCoord| match gate.direction.axis() {
        Axis::Z => cell.x(),
        Axis::X => cell.z(),
    };
    let aperture: Vec<i32> = gate.cells.iter().map(project).collect();
    block_cells
        .iter()
        .map(project)
        .all(|lateral| aperture.contains(&lateral))
}

/// Reports whether each block cell may take one step toward the gate.
///
/// The step target is fine when it is an aperture cell or part of the block
/// itself; otherwise it must be inside the grid and free.
pub fn is_path_clear<F>(
    block_cells: &[CellCoord],
    gate: &GateSnapshot,
    occupancy: &OccupancyView<'_>,
    is_occupied: F,
) -> bool
where
    F: Fn(CellCoord) -> bool,
{
    block_cells.iter().all(|cell| {
        let next = cell.step(gate.direction);
        if gate.cells.contains(&next) || block_cells.contains(&next) {
            return true;
        }
        occupancy.is_within_grid(next) && !is_occupied(next)
    })
}
