#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the gate puzzle.

mod blocks;
mod gates;
mod grid;
mod placement;
mod registry;

use gate_puzzle_core::{
    BlockId, CellCoord, Command, EffectHandle, Event, ExtractionError, GateError, GateId,
    GateSpec, GridLayout, LevelState, PlacementError, WallId,
};
use glam::Vec3;
use log::{debug, info, warn};

use crate::{
    blocks::BlockRegistry,
    gates::{validate_aperture, GateBook},
    grid::OccupancyGrid,
    registry::{GateRegistry, WallRegistry},
};

const DEFAULT_GRID_WIDTH: u32 = 10;
const DEFAULT_GRID_LENGTH: u32 = 10;
const DEFAULT_CELL_SIZE: f32 = 2.25;

/// Authored interior wall piece.
#[derive(Clone, Copy, Debug)]
struct WallPiece {
    id: WallId,
    cell: CellCoord,
}

/// Represents the authoritative gate puzzle world state.
#[derive(Debug)]
pub struct World {
    grid: OccupancyGrid,
    walls: Vec<WallPiece>,
    next_wall_id: WallId,
    wall_registry: WallRegistry,
    gates: GateBook,
    gate_registry: GateRegistry,
    blocks: BlockRegistry,
    level_state: LevelState,
}

impl World {
    /// Creates an empty world with a default grid.
    #[must_use]
    pub fn new() -> Self {
        let layout = GridLayout::new(
            DEFAULT_GRID_WIDTH,
            DEFAULT_GRID_LENGTH,
            DEFAULT_CELL_SIZE,
            Vec3::ZERO,
        );
        Self {
            grid: OccupancyGrid::new(layout),
            walls: Vec::new(),
            next_wall_id: WallId::new(0),
            wall_registry: WallRegistry::empty(layout),
            gates: GateBook::new(),
            gate_registry: GateRegistry::empty(layout),
            blocks: BlockRegistry::new(),
            level_state: LevelState::None,
        }
    }

    fn layout(&self) -> GridLayout {
        *self.grid.layout()
    }

    fn is_wall(&self, cell: CellCoord) -> bool {
        self.wall_registry.contains(cell) || self.grid.is_wall_flag(cell)
    }

    fn rebuild_wall_registry(&mut self) {
        self.wall_registry = WallRegistry::project(
            self.layout(),
            self.walls.iter().map(|piece| (piece.id, piece.cell)),
        );
    }

    fn rebuild_gate_registry(&mut self) {
        self.gate_registry = GateRegistry::project(self.layout(), self.gates.cell_entries());
    }

    fn reset_grid(&mut self, grid: OccupancyGrid) {
        self.grid = grid;
        self.walls.clear();
        self.next_wall_id = WallId::new(0);
        self.blocks.clear();
        self.rebuild_wall_registry();
    }

    /// Drops gates whose aperture cells are no longer walls inside the grid.
    fn invalidate_stale_gates(&mut self, out_events: &mut Vec<Event>) {
        let layout = self.layout();
        let (grid, wall_registry) = (&self.grid, &self.wall_registry);
        let dropped = self.gates.retain(|gate| {
            gate.spec.cells.iter().all(|cell| {
                layout.contains(*cell)
                    && (wall_registry.contains(*cell) || grid.is_wall_flag(*cell))
            })
        });
        for gate in dropped {
            warn!("gate {} dropped: its cells are no longer walls", gate.get());
            out_events.push(Event::GateRemoved { gate });
        }
        self.rebuild_gate_registry();
    }

    fn place_wall(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        if !self.grid.is_within_grid(cell) {
            warn!("ignoring wall outside the grid at {cell:?}");
            return;
        }
        if self.grid.is_occupied(cell) && !self.is_wall(cell) {
            warn!("ignoring wall on a cell occupied by a block at {cell:?}");
            return;
        }

        let _ = self.grid.mark_wall(cell);
        let id = self.next_wall_id;
        self.next_wall_id = WallId::new(id.get().saturating_add(1));
        self.walls.push(WallPiece { id, cell });
        self.rebuild_wall_registry();
        out_events.push(Event::WallPlaced { wall: id, cell });
    }

    fn add_gate(&mut self, spec: GateSpec, out_events: &mut Vec<Event>) {
        let layout = self.layout();
        if let Err(reason) = validate_aperture(&spec, &layout, |cell| self.is_wall(cell)) {
            warn!("rejected gate {:?} {:?}: {reason:?}", spec.color, spec.direction);
            out_events.push(Event::GateRejected { reason });
            return;
        }

        self.walls.retain(|piece| !spec.cells.contains(&piece.cell));
        let gate = self.gates.insert(spec);
        self.rebuild_wall_registry();
        self.rebuild_gate_registry();
        out_events.push(Event::GateAdded { gate });
    }

    fn remove_gate(&mut self, gate: GateId, out_events: &mut Vec<Event>) {
        if self.gates.remove(gate).is_none() {
            out_events.push(Event::GateRejected {
                reason: GateError::UnknownGate,
            });
            return;
        }
        self.rebuild_gate_registry();
        out_events.push(Event::GateRemoved { gate });
    }

    fn move_block(&mut self, block: BlockId, cells: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        let reason = match self.blocks.get(block) {
            None => Some(PlacementError::UnknownBlock),
            Some(state) if state.extraction.is_some() => Some(PlacementError::Extracting),
            Some(state) => {
                placement::validate(&self.grid, &self.wall_registry, &state.cells, &cells)
                    .err()
                    .or_else(|| {
                        state
                            .shape
                            .anchor_of(&cells)
                            .is_none()
                            .then_some(PlacementError::ShapeMismatch)
                    })
            }
        };
        if let Some(reason) = reason {
            warn!("invalid placement for block {}: {reason:?}", block.get());
            out_events.push(Event::BlockPlacementRejected {
                block: Some(block),
                reason,
            });
            return;
        }

        let Some(state) = self.blocks.get_mut(block) else {
            return;
        };
        let from = std::mem::replace(&mut state.cells, cells.clone());
        self.grid.set_occupied(&from, false);
        self.grid.set_occupied(&cells, true);
        out_events.push(Event::BlockMoved {
            block,
            from,
            to: cells,
        });
    }

    fn start_extraction(&mut self, block: BlockId, gate: GateId, out_events: &mut Vec<Event>) {
        let Some(gate_state) = self.gates.get(gate) else {
            out_events.push(Event::ExtractionRejected {
                block,
                reason: ExtractionError::UnknownGate,
            });
            return;
        };
        let direction = gate_state.spec.direction;
        let gate_cells = gate_state.spec.cells.clone();
        let effect = gate_state.spec.effect;

        let Some(state) = self.blocks.get_mut(block) else {
            out_events.push(Event::ExtractionRejected {
                block,
                reason: ExtractionError::UnknownBlock,
            });
            return;
        };
        if state.extraction.is_some() {
            out_events.push(Event::ExtractionRejected {
                block,
                reason: ExtractionError::AlreadyExtracting,
            });
            return;
        }

        state.extraction = Some(gate);
        let block_cells = state.cells.clone();
        let anchor = state.anchor();
        self.grid.set_occupied(&block_cells, false);
        debug!("block {} released for gate {}", block.get(), gate.get());
        out_events.push(Event::ExtractionStarted {
            block,
            gate,
            direction,
            block_cells,
            gate_cells,
            anchor,
            effect,
        });
    }

    fn complete_extraction(&mut self, block: BlockId, out_events: &mut Vec<Event>) {
        let gate = match self.blocks.get(block) {
            Some(state) => state.extraction,
            None => {
                debug!("block {} already removed", block.get());
                return;
            }
        };
        let Some(gate) = gate else {
            debug!("block {} is not leaving through a gate", block.get());
            return;
        };
        let _ = self.blocks.remove(block);
        out_events.push(Event::BlockRemoved { block, gate });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { layout } if layout.exceeds_cell_limit() => {
            warn!(
                "ignoring {}x{} grid: more than {} cells",
                layout.width(),
                layout.length(),
                GridLayout::MAX_CELLS
            );
        }
        Command::ConfigureGrid { layout } => {
            world.reset_grid(OccupancyGrid::new(layout));
            world.invalidate_stale_gates(out_events);
            out_events.push(Event::GridConfigured {
                width: layout.width(),
                length: layout.length(),
            });
            out_events.push(Event::GridInitialized);
        }
        Command::LoadGrid { layout, .. } if layout.exceeds_cell_limit() => {
            warn!(
                "ignoring persisted {}x{} grid: more than {} cells",
                layout.width(),
                layout.length(),
                GridLayout::MAX_CELLS
            );
        }
        Command::LoadGrid {
            layout,
            occupied,
            walls,
            gates,
        } => {
            world.reset_grid(OccupancyGrid::from_flags(layout, &occupied, &walls));
            world.gates = GateBook::new();
            for spec in gates {
                if !spec.cells.iter().all(|cell| layout.contains(*cell)) {
                    warn!("skipping {:?} gate with cells outside the grid", spec.color);
                    continue;
                }
                for cell in &spec.cells {
                    if !world.grid.is_wall_flag(*cell) {
                        warn!(
                            "{:?} gate cell {cell:?} was not a wall; walling it",
                            spec.color
                        );
                        let _ = world.grid.mark_wall(*cell);
                    }
                }
                let _ = world.gates.insert(spec);
            }
            world.rebuild_gate_registry();
            info!(
                "loaded {}x{} grid with {} gates",
                layout.width(),
                layout.length(),
                world.gates.iter().count()
            );
            out_events.push(Event::GridConfigured {
                width: layout.width(),
                length: layout.length(),
            });
            for gate in world.gates.iter() {
                out_events.push(Event::GateAdded { gate: gate.id });
            }
            out_events.push(Event::GridInitialized);
        }
        Command::SealExterior { interior } => {
            let sealed = world.grid.seal_exterior(&interior);
            info!("sealed {sealed} exterior cells");
            out_events.push(Event::ExteriorSealed { sealed });
        }
        Command::PlaceWall { cell } => world.place_wall(cell, out_events),
        Command::AddBlock {
            color,
            shape,
            rotation,
            anchor,
        } => {
            let cells = shape.footprint(anchor, rotation);
            if let Err(reason) = placement::validate(&world.grid, &world.wall_registry, &[], &cells)
            {
                warn!("invalid placement for new {color:?} block at {anchor:?}: {reason:?}");
                out_events.push(Event::BlockPlacementRejected {
                    block: None,
                    reason,
                });
                return;
            }
            let block = world.blocks.insert(color, shape, rotation, anchor);
            world.grid.set_occupied(&cells, true);
            out_events.push(Event::BlockPlaced { block, cells });
        }
        Command::MoveBlock { block, cells } => world.move_block(block, cells, out_events),
        Command::ClearBlocks => {
            world.blocks.clear();
            world.grid.clear_non_walls();
            out_events.push(Event::BlocksCleared);
        }
        Command::AddGate { gate } => world.add_gate(gate, out_events),
        Command::RemoveGate { gate } => world.remove_gate(gate, out_events),
        Command::AssignGateEffects => {
            for gate in world.gates.iter_mut() {
                let effect = EffectHandle::grinding(gate.spec.color);
                debug!("gate {} uses effect {}", gate.id.get(), effect.get());
                gate.spec.effect = Some(effect);
            }
        }
        Command::SetLevelState { state } => {
            if world.level_state != state {
                world.level_state = state;
                out_events.push(Event::LevelStateChanged { state });
            }
        }
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::ExtractBlock { block, gate } => world.start_extraction(block, gate, out_events),
        Command::CompleteExtraction { block } => world.complete_extraction(block, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gate_puzzle_core::{
        BlockId, BlockView, CellCoord, GateSpec, GateView, GridLayout, LevelState,
        OccupancyView, PlacementError,
    };

    use super::{placement, World};

    /// Provides the grid dimensions, spacing and origin.
    #[must_use]
    pub fn layout(world: &World) -> GridLayout {
        world.layout()
    }

    /// Current play state of the level.
    #[must_use]
    pub fn level_state(world: &World) -> LevelState {
        world.level_state
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn is_within_grid(world: &World, cell: CellCoord) -> bool {
        world.grid.is_within_grid(cell)
    }

    /// Reports whether the cell is occupied; cells outside the grid are not.
    #[must_use]
    pub fn is_occupied(world: &World, cell: CellCoord) -> bool {
        world.grid.is_occupied(cell)
    }

    /// Reports whether the cell is a wall, consulting authored walls first.
    #[must_use]
    pub fn is_wall(world: &World, cell: CellCoord) -> bool {
        world.is_wall(cell)
    }

    /// Checks a candidate footprint without mutating any state.
    ///
    /// When `block` names a placed block its current cells are treated as free.
    pub fn placement_error(
        world: &World,
        block: Option<BlockId>,
        candidate: &[CellCoord],
    ) -> Result<(), PlacementError> {
        let current = block
            .and_then(|id| world.blocks.get(id))
            .map(|state| state.cells.as_slice())
            .unwrap_or(&[]);
        placement::validate(&world.grid, &world.wall_registry, current, candidate)
    }

    /// Reports whether a candidate footprint is admissible.
    #[must_use]
    pub fn is_valid_placement(world: &World, block: Option<BlockId>, candidate: &[CellCoord]) -> bool {
        placement_error(world, block, candidate).is_ok()
    }

    /// Exposes a read-only view of the cell state arrays.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        let layout = world.grid.layout();
        OccupancyView::new(
            world.grid.occupied(),
            world.grid.walls(),
            world.wall_registry.slots(),
            layout.width(),
            layout.length(),
        )
    }

    /// Captures a read-only view of the placed blocks.
    #[must_use]
    pub fn block_view(world: &World) -> BlockView {
        BlockView::from_snapshots(world.blocks.iter().map(|block| block.snapshot()).collect())
    }

    /// Captures a read-only view of the gates and their cell lookup.
    #[must_use]
    pub fn gate_view(world: &World) -> GateView {
        let layout = world.grid.layout();
        GateView::new(
            world.gates.iter().map(|gate| gate.snapshot()).collect(),
            world.gate_registry.slots().to_vec(),
            layout.width(),
            layout.length(),
        )
    }

    /// Gate descriptions in registration order.
    #[must_use]
    pub fn gate_specs(world: &World) -> Vec<GateSpec> {
        world.gates.iter().map(|gate| gate.spec.clone()).collect()
    }

    /// Wall positions, from authored walls when any exist, otherwise from the wall flags.
    #[must_use]
    pub fn wall_cells(world: &World) -> Vec<CellCoord> {
        if !world.wall_registry.is_empty() {
            return world.wall_registry.positions();
        }
        let layout = world.grid.layout();
        layout
            .cells()
            .filter(|cell| world.grid.is_wall_flag(*cell))
            .collect()
    }

    /// Block covering the cell, ignoring blocks that are leaving through a gate.
    #[must_use]
    pub fn block_at(world: &World, cell: CellCoord) -> Option<BlockId> {
        world
            .blocks
            .iter()
            .find(|block| block.extraction.is_none() && block.cells.contains(&cell))
            .map(|block| block.id)
    }

    /// Number of blocks still tracked as placed.
    #[must_use]
    pub fn block_count(world: &World) -> usize {
        world.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_puzzle_core::{BlockColor, BlockShape, Direction, Rotation};

    fn configured(width: u32, length: u32) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                layout: GridLayout::new(width, length, 1.0, Vec3::ZERO),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn configure_grid_announces_initialisation() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGrid {
                layout: GridLayout::new(6, 5, 2.0, Vec3::ZERO),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::GridConfigured {
                    width: 6,
                    length: 5
                },
                Event::GridInitialized,
            ]
        );
        assert_eq!(query::layout(&world).cell_count(), 30);
    }

    #[test]
    fn add_block_rejects_overlap_and_reports_reason() {
        let mut world = configured(4, 4);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddBlock {
                color: BlockColor::Red,
                shape: BlockShape::bar(2),
                rotation: Rotation::Deg0,
                anchor: CellCoord::new(0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::AddBlock {
                color: BlockColor::Blue,
                shape: BlockShape::bar(2),
                rotation: Rotation::Deg0,
                anchor: CellCoord::new(1, 0),
            },
            &mut events,
        );

        assert_eq!(
            events.last(),
            Some(&Event::BlockPlacementRejected {
                block: None,
                reason: PlacementError::Occupied,
            })
        );
        assert_eq!(query::block_count(&world), 1);
    }

    #[test]
    fn add_gate_replaces_authored_walls() {
        let mut world = configured(4, 4);
        let mut events = Vec::new();
        for x in 0..4 {
            apply(
                &mut world,
                Command::PlaceWall {
                    cell: CellCoord::new(x, 3),
                },
                &mut events,
            );
        }
        events.clear();
        apply(
            &mut world,
            Command::AddGate {
                gate: GateSpec::new(
                    BlockColor::Red,
                    Direction::North,
                    vec![CellCoord::new(1, 3), CellCoord::new(2, 3)],
                ),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::GateAdded {
                gate: GateId::new(0)
            }]
        );
        assert_eq!(
            query::wall_cells(&world),
            vec![CellCoord::new(0, 3), CellCoord::new(3, 3)]
        );
        assert!(query::is_wall(&world, CellCoord::new(1, 3)));
        let gates = query::gate_view(&world);
        assert_eq!(
            gates.gate_at(CellCoord::new(2, 3)).map(|gate| gate.id),
            Some(GateId::new(0))
        );
    }

    #[test]
    fn add_gate_requires_wall_cells() {
        let mut world = configured(4, 4);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AddGate {
                gate: GateSpec::new(BlockColor::Red, Direction::North, vec![CellCoord::new(1, 3)]),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::GateRejected {
                reason: GateError::NotWall
            }]
        );
    }

    #[test]
    fn remove_gate_updates_lookup_in_same_step() {
        let mut world = configured(4, 4);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceWall {
                cell: CellCoord::new(0, 3),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::AddGate {
                gate: GateSpec::new(BlockColor::Red, Direction::North, vec![CellCoord::new(0, 3)]),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::RemoveGate {
                gate: GateId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::GateRemoved {
                gate: GateId::new(0)
            }]
        );
        assert!(query::gate_view(&world)
            .gate_at(CellCoord::new(0, 3))
            .is_none());

        events.clear();
        apply(
            &mut world,
            Command::RemoveGate {
                gate: GateId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::GateRejected {
                reason: GateError::UnknownGate
            }]
        );
    }

    #[test]
    fn level_state_changes_emit_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SetLevelState {
                    state: LevelState::InProgress,
                },
                &mut events,
            );
        }
        assert_eq!(
            events,
            vec![Event::LevelStateChanged {
                state: LevelState::InProgress
            }]
        );
        assert_eq!(query::level_state(&world), LevelState::InProgress);
    }

    #[test]
    fn wall_cells_fall_back_to_flags() {
        let mut world = configured(3, 3);
        let mut events = Vec::new();
        let mut interior = vec![true; 9];
        interior[0] = false;
        apply(&mut world, Command::SealExterior { interior }, &mut events);
        assert_eq!(events, vec![Event::ExteriorSealed { sealed: 1 }]);
        assert_eq!(query::wall_cells(&world), vec![CellCoord::new(0, 0)]);
    }
}
