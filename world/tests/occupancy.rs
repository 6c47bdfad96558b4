use gate_puzzle_core::{
    BlockColor, BlockId, BlockShape, CellCoord, Command, Direction, Event, ExtractionError,
    GateId, GateSpec, GridLayout, LevelState, PlacementError, Rotation,
};
use gate_puzzle_world::{self as world, query, World};
use glam::Vec3;

fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn configured(width: u32, length: u32) -> World {
    let mut world = World::new();
    let _ = run(
        &mut world,
        vec![Command::ConfigureGrid {
            layout: GridLayout::new(width, length, 1.0, Vec3::ZERO),
        }],
    );
    world
}

fn bar(color: BlockColor, length: u32, anchor: CellCoord) -> Command {
    Command::AddBlock {
        color,
        shape: BlockShape::bar(length),
        rotation: Rotation::Deg0,
        anchor,
    }
}

fn assert_walls_occupied(world: &World) {
    let layout = query::layout(world);
    for cell in layout.cells() {
        if query::is_wall(world, cell) {
            assert!(
                query::is_occupied(world, cell),
                "wall cell {cell:?} must be occupied"
            );
        }
    }
}

fn assert_blocks_disjoint(world: &World) {
    let blocks = query::block_view(world);
    let mut seen = Vec::new();
    for block in blocks.iter().filter(|block| !block.extracting) {
        for cell in &block.cells {
            assert!(!seen.contains(cell), "cell {cell:?} claimed twice");
            assert!(query::is_occupied(world, *cell));
            seen.push(*cell);
        }
    }
}

#[test]
fn placed_block_occupies_its_cells_and_blocks_overlap() {
    let mut world = configured(4, 4);
    let events = run(
        &mut world,
        vec![bar(BlockColor::Red, 2, CellCoord::new(0, 0))],
    );

    assert_eq!(
        events,
        vec![Event::BlockPlaced {
            block: BlockId::new(0),
            cells: vec![CellCoord::new(0, 0), CellCoord::new(1, 0)],
        }]
    );
    assert!(query::is_occupied(&world, CellCoord::new(0, 0)));
    assert!(query::is_occupied(&world, CellCoord::new(1, 0)));
    assert!(!query::is_valid_placement(
        &world,
        None,
        &[CellCoord::new(1, 0), CellCoord::new(2, 0)]
    ));
    assert_blocks_disjoint(&world);
}

#[test]
fn validation_has_no_side_effects() {
    let mut world = configured(4, 4);
    let _ = run(
        &mut world,
        vec![bar(BlockColor::Red, 2, CellCoord::new(0, 0))],
    );
    let before = query::occupancy_view(&world).occupied().to_vec();

    let candidate = [CellCoord::new(1, 0), CellCoord::new(2, 0)];
    let first = query::placement_error(&world, Some(BlockId::new(0)), &candidate);
    let second = query::placement_error(&world, Some(BlockId::new(0)), &candidate);

    assert_eq!(first, Ok(()));
    assert_eq!(first, second);
    assert_eq!(query::occupancy_view(&world).occupied(), before.as_slice());
}

#[test]
fn moving_a_block_releases_old_cells() {
    let mut world = configured(4, 4);
    let mut events = run(
        &mut world,
        vec![bar(BlockColor::Red, 2, CellCoord::new(0, 0))],
    );
    events.clear();
    world::apply(
        &mut world,
        Command::MoveBlock {
            block: BlockId::new(0),
            cells: vec![CellCoord::new(1, 0), CellCoord::new(2, 0)],
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::BlockMoved {
            block: BlockId::new(0),
            from: vec![CellCoord::new(0, 0), CellCoord::new(1, 0)],
            to: vec![CellCoord::new(1, 0), CellCoord::new(2, 0)],
        }]
    );
    assert!(!query::is_occupied(&world, CellCoord::new(0, 0)));
    assert!(query::is_occupied(&world, CellCoord::new(2, 0)));
    assert_eq!(
        query::block_at(&world, CellCoord::new(2, 0)),
        Some(BlockId::new(0))
    );
}

#[test]
fn walls_stay_occupied_after_clearing_blocks() {
    let mut world = configured(4, 4);
    let events = run(
        &mut world,
        vec![
            Command::PlaceWall {
                cell: CellCoord::new(3, 3),
            },
            bar(BlockColor::Green, 2, CellCoord::new(0, 0)),
            Command::MoveBlock {
                block: BlockId::new(0),
                cells: vec![CellCoord::new(3, 3)],
            },
            Command::ClearBlocks,
        ],
    );

    assert!(events.contains(&Event::BlockPlacementRejected {
        block: Some(BlockId::new(0)),
        reason: PlacementError::Wall,
    }));
    assert_eq!(events.last(), Some(&Event::BlocksCleared));
    assert!(query::is_occupied(&world, CellCoord::new(3, 3)));
    assert!(!query::is_occupied(&world, CellCoord::new(0, 0)));
    assert_eq!(query::block_count(&world), 0);
    assert_walls_occupied(&world);
}

#[test]
fn load_grid_tolerates_short_arrays() {
    let mut world = World::new();
    let layout = GridLayout::new(3, 2, 1.0, Vec3::ZERO);
    let events = run(
        &mut world,
        vec![Command::LoadGrid {
            layout,
            occupied: vec![false, true],
            walls: vec![true],
            gates: vec![GateSpec::new(
                BlockColor::Red,
                Direction::South,
                vec![CellCoord::new(0, 0)],
            )],
        }],
    );

    assert_eq!(
        events,
        vec![
            Event::GridConfigured {
                width: 3,
                length: 2
            },
            Event::GateAdded {
                gate: GateId::new(0)
            },
            Event::GridInitialized,
        ]
    );
    assert!(query::is_wall(&world, CellCoord::new(0, 0)));
    assert!(query::is_occupied(&world, CellCoord::new(1, 0)));
    assert!(!query::is_occupied(&world, CellCoord::new(2, 1)));
    assert_walls_occupied(&world);
}

#[test]
fn extraction_releases_cells_immediately_and_removes_once() {
    let mut world = configured(4, 4);
    let _ = run(
        &mut world,
        vec![
            Command::PlaceWall {
                cell: CellCoord::new(0, 3),
            },
            Command::AddGate {
                gate: GateSpec::new(
                    BlockColor::Red,
                    Direction::North,
                    vec![CellCoord::new(0, 3)],
                ),
            },
            Command::SetLevelState {
                state: LevelState::InProgress,
            },
            bar(BlockColor::Red, 1, CellCoord::new(0, 2)),
        ],
    );

    let started = run(
        &mut world,
        vec![Command::ExtractBlock {
            block: BlockId::new(0),
            gate: GateId::new(0),
        }],
    );
    assert!(matches!(
        started.as_slice(),
        [Event::ExtractionStarted { block, gate, .. }]
            if *block == BlockId::new(0) && *gate == GateId::new(0)
    ));
    assert!(!query::is_occupied(&world, CellCoord::new(0, 2)));
    assert!(query::is_valid_placement(
        &world,
        None,
        &[CellCoord::new(0, 2)]
    ));
    assert_eq!(query::block_at(&world, CellCoord::new(0, 2)), None);

    let repeated = run(
        &mut world,
        vec![Command::ExtractBlock {
            block: BlockId::new(0),
            gate: GateId::new(0),
        }],
    );
    assert_eq!(
        repeated,
        vec![Event::ExtractionRejected {
            block: BlockId::new(0),
            reason: ExtractionError::AlreadyExtracting,
        }]
    );

    let completed = run(
        &mut world,
        vec![
            Command::CompleteExtraction {
                block: BlockId::new(0),
            },
            Command::CompleteExtraction {
                block: BlockId::new(0),
            },
        ],
    );
    assert_eq!(
        completed,
        vec![Event::BlockRemoved {
            block: BlockId::new(0),
            gate: GateId::new(0),
        }]
    );
    assert_eq!(query::block_count(&world), 0);
}

#[test]
fn extracting_block_cannot_be_moved() {
    let mut world = configured(4, 4);
    let _ = run(
        &mut world,
        vec![
            Command::PlaceWall {
                cell: CellCoord::new(0, 3),
            },
            Command::AddGate {
                gate: GateSpec::new(
                    BlockColor::Red,
                    Direction::North,
                    vec![CellCoord::new(0, 3)],
                ),
            },
            bar(BlockColor::Red, 1, CellCoord::new(0, 2)),
            Command::ExtractBlock {
                block: BlockId::new(0),
                gate: GateId::new(0),
            },
        ],
    );

    let events = run(
        &mut world,
        vec![Command::MoveBlock {
            block: BlockId::new(0),
            cells: vec![CellCoord::new(1, 1)],
        }],
    );
    assert_eq!(
        events,
        vec![Event::BlockPlacementRejected {
            block: Some(BlockId::new(0)),
            reason: PlacementError::Extracting,
        }]
    );
    assert!(!query::is_occupied(&world, CellCoord::new(1, 1)));
}

#[test]
fn reconfiguring_drops_gates_outside_new_bounds() {
    let mut world = configured(4, 4);
    let _ = run(
        &mut world,
        vec![
            Command::PlaceWall {
                cell: CellCoord::new(3, 3),
            },
            Command::AddGate {
                gate: GateSpec::new(
                    BlockColor::Blue,
                    Direction::East,
                    vec![CellCoord::new(3, 3)],
                ),
            },
        ],
    );

    let events = run(
        &mut world,
        vec![Command::ConfigureGrid {
            layout: GridLayout::new(2, 2, 1.0, Vec3::ZERO),
        }],
    );
    assert_eq!(
        events,
        vec![
            Event::GateRemoved {
                gate: GateId::new(0)
            },
            Event::GridConfigured {
                width: 2,
                length: 2
            },
            Event::GridInitialized,
        ]
    );
    assert!(query::gate_specs(&world).is_empty());
}

#[test]
fn reconfiguring_drops_gates_that_lost_their_walls() {
    let mut world = configured(4, 4);
    let _ = run(
        &mut world,
        vec![
            Command::PlaceWall {
                cell: CellCoord::new(1, 3),
            },
            Command::AddGate {
                gate: GateSpec::new(
                    BlockColor::Red,
                    Direction::North,
                    vec![CellCoord::new(1, 3)],
                ),
            },
        ],
    );

    let events = run(
        &mut world,
        vec![Command::ConfigureGrid {
            layout: GridLayout::new(4, 4, 1.0, Vec3::ZERO),
        }],
    );
    assert_eq!(
        events.first(),
        Some(&Event::GateRemoved {
            gate: GateId::new(0)
        })
    );
    assert!(query::gate_specs(&world).is_empty());
    assert!(query::gate_view(&world)
        .gate_at(CellCoord::new(1, 3))
        .is_none());

    let placed = run(&mut world, vec![bar(BlockColor::Red, 1, CellCoord::new(1, 3))]);
    assert!(matches!(placed.as_slice(), [Event::BlockPlaced { .. }]));
    assert!(query::gate_specs(&world).is_empty());
}

#[test]
fn loaded_gate_cells_are_walls() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        vec![Command::LoadGrid {
            layout: GridLayout::new(3, 3, 1.0, Vec3::ZERO),
            occupied: vec![false; 9],
            walls: vec![false; 9],
            gates: vec![GateSpec::new(
                BlockColor::Blue,
                Direction::North,
                vec![CellCoord::new(1, 2)],
            )],
        }],
    );

    assert!(query::is_wall(&world, CellCoord::new(1, 2)));
    assert!(query::is_occupied(&world, CellCoord::new(1, 2)));
    let events = run(&mut world, vec![bar(BlockColor::Blue, 1, CellCoord::new(1, 2))]);
    assert_eq!(
        events,
        vec![Event::BlockPlacementRejected {
            block: None,
            reason: PlacementError::Wall,
        }]
    );
    assert_walls_occupied(&world);
}

#[test]
fn oversized_grids_are_ignored() {
    let mut world = configured(4, 4);
    let huge = GridLayout::new(u32::MAX, u32::MAX, 1.0, Vec3::ZERO);

    let events = run(
        &mut world,
        vec![
            Command::ConfigureGrid { layout: huge },
            Command::LoadGrid {
                layout: huge,
                occupied: vec![true],
                walls: vec![true],
                gates: Vec::new(),
            },
        ],
    );

    assert!(events.is_empty());
    assert_eq!(query::layout(&world), GridLayout::new(4, 4, 1.0, Vec3::ZERO));
    assert!(!query::is_occupied(&world, CellCoord::new(0, 0)));
}

#[test]
fn moves_must_keep_the_block_shape() {
    let mut world = configured(4, 4);
    let _ = run(
        &mut world,
        vec![bar(BlockColor::Cyan, 2, CellCoord::new(0, 0))],
    );

    let events = run(
        &mut world,
        vec![
            Command::MoveBlock {
                block: BlockId::new(0),
                cells: vec![CellCoord::new(0, 1)],
            },
            Command::MoveBlock {
                block: BlockId::new(0),
                cells: vec![CellCoord::new(0, 2), CellCoord::new(2, 2)],
            },
        ],
    );
    let rejection = Event::BlockPlacementRejected {
        block: Some(BlockId::new(0)),
        reason: PlacementError::ShapeMismatch,
    };
    assert_eq!(events, vec![rejection.clone(), rejection]);
    assert!(query::is_occupied(&world, CellCoord::new(0, 0)));

    let turned = run(
        &mut world,
        vec![Command::MoveBlock {
            block: BlockId::new(0),
            cells: vec![CellCoord::new(2, 0), CellCoord::new(2, 1)],
        }],
    );
    assert!(matches!(turned.as_slice(), [Event::BlockMoved { .. }]));
    let snapshot = query::block_view(&world)
        .get(BlockId::new(0))
        .cloned()
        .expect("block placed");
    assert_eq!(snapshot.anchor, CellCoord::new(2, 0));
}
