use std::time::Duration;

use gate_puzzle_core::{
    BlockColor, BlockId, BlockShape, CellCoord, Command, Direction, Directive, Easing,
    EffectHandle, Event, GateId, GateSpec, GridLayout, Rotation,
};
use gate_puzzle_system_extraction::{Extraction, ExtractionConfig, ExtractionPhase};
use gate_puzzle_world::{self as world, query, World};
use glam::Vec3;

struct Harness {
    world: World,
    extraction: Extraction,
    directives: Vec<Directive>,
}

impl Harness {
    /// 4x4 board, walls along z=3 with a red North gate at (1,3),(2,3).
    fn new(config: ExtractionConfig) -> Self {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureGrid {
                layout: GridLayout::new(4, 4, 2.0, Vec3::ZERO),
            },
            &mut events,
        );
        for x in 0..4 {
            world::apply(
                &mut world,
                Command::PlaceWall {
                    cell: CellCoord::new(x, 3),
                },
                &mut events,
            );
        }
        world::apply(
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
        world::apply(&mut world, Command::AssignGateEffects, &mut events);
        world::apply(
            &mut world,
            Command::AddBlock {
                color: BlockColor::Red,
                shape: BlockShape::new(vec![CellCoord::new(0, 0), CellCoord::new(0, -1)]),
                rotation: Rotation::Deg0,
                anchor: CellCoord::new(2, 2),
            },
            &mut events,
        );

        Self {
            world,
            extraction: Extraction::new(config),
            directives: Vec::new(),
        }
    }

    fn step(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        let mut pending = events.clone();
        while !pending.is_empty() {
            let mut commands = Vec::new();
            let layout = query::layout(&self.world);
            self.extraction
                .handle(&pending, &layout, &mut commands, &mut self.directives);
            pending.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut pending);
            }
            events.extend(pending.iter().cloned());
        }
        events
    }

    fn tick(&mut self, millis: u64) -> Vec<Event> {
        self.step(Command::Tick {
            dt: Duration::from_millis(millis),
        })
    }
}

fn extract() -> Command {
    Command::ExtractBlock {
        block: BlockId::new(0),
        gate: GateId::new(0),
    }
}

#[test]
fn full_sequence_orders_directives() {
    let mut harness = Harness::new(ExtractionConfig::default());
    let _ = harness.step(extract());

    assert_eq!(
        harness.directives,
        vec![Directive::RetractGate {
            gate: GateId::new(0)
        }]
    );
    assert_eq!(
        harness.extraction.phase(BlockId::new(0)),
        Some(ExtractionPhase::Retracting)
    );
    assert!(!query::is_occupied(&harness.world, CellCoord::new(2, 2)));
    assert!(!query::is_occupied(&harness.world, CellCoord::new(2, 1)));

    let _ = harness.tick(150);
    assert_eq!(harness.directives.len(), 1, "still within retract delay");

    let _ = harness.tick(50);
    let effect = EffectHandle::grinding(BlockColor::Red);
    let directives = harness.directives.split_off(1);
    assert_eq!(directives.len(), 4);
    assert!(matches!(
        directives[0],
        Directive::SpawnEffect { effect: spawned, position, lifetime, .. }
            if spawned == effect
                && position == Vec3::new(4.0, 0.0, 6.0)
                && lifetime == Duration::from_secs(2)
    ));
    assert_eq!(directives[1], Directive::PlayRemoveCue);
    assert_eq!(
        directives[2],
        Directive::DissolveHint {
            block: BlockId::new(0),
            direction: Direction::North,
            origin: Vec3::new(3.0, 0.0, 6.0),
        }
    );
    assert_eq!(
        directives[3],
        Directive::TranslateBlock {
            block: BlockId::new(0),
            from: Vec3::new(4.0, 0.0, 4.0),
            to: Vec3::new(4.0, 0.0, 14.0),
            duration: Duration::from_millis(600),
            easing: Easing::EaseOutQuad,
        }
    );

    let events = harness.tick(600);
    assert!(events.contains(&Event::BlockRemoved {
        block: BlockId::new(0),
        gate: GateId::new(0),
    }));
    assert_eq!(
        &harness.directives[harness.directives.len() - 3..],
        &[
            Directive::DisposeBlock {
                block: BlockId::new(0)
            },
            Directive::RestoreGate {
                gate: GateId::new(0)
            },
            Directive::PlaySuccessHaptic,
        ]
    );
    assert!(harness.extraction.is_idle());
    assert_eq!(query::block_count(&harness.world), 0);
}

#[test]
fn repeated_completion_removes_block_once() {
    let mut harness = Harness::new(ExtractionConfig::default());
    let _ = harness.step(extract());
    let _ = harness.tick(200);
    assert_eq!(
        harness.extraction.phase(BlockId::new(0)),
        Some(ExtractionPhase::Moving)
    );

    let mut removals = 0;
    for _ in 0..2 {
        let mut commands = Vec::new();
        harness
            .extraction
            .notify_motion_complete(BlockId::new(0), &mut commands);
        for command in commands {
            let events = harness.step(command);
            removals += events
                .iter()
                .filter(|event| matches!(event, Event::BlockRemoved { .. }))
                .count();
        }
    }
    let events = harness.tick(1_000);

    assert_eq!(removals, 1);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::BlockRemoved { .. })));
    let haptics = harness
        .directives
        .iter()
        .filter(|directive| **directive == Directive::PlaySuccessHaptic)
        .count();
    assert_eq!(haptics, 1);
}

#[test]
fn motion_completion_before_retraction_is_ignored() {
    let mut harness = Harness::new(ExtractionConfig::default());
    let _ = harness.step(extract());

    let mut commands = Vec::new();
    harness
        .extraction
        .notify_motion_complete(BlockId::new(0), &mut commands);

    assert!(commands.is_empty());
    assert_eq!(query::block_count(&harness.world), 1);
}

#[test]
fn gates_without_effects_skip_spawning() {
    let mut harness = Harness::new(ExtractionConfig::new(
        Duration::ZERO,
        Duration::from_millis(100),
        5.0,
        Duration::from_secs(2),
        Easing::Linear,
    ));
    let mut events = Vec::new();
    world::apply(
        &mut harness.world,
        Command::RemoveGate {
            gate: GateId::new(0),
        },
        &mut events,
    );
    world::apply(
        &mut harness.world,
        Command::AddGate {
            gate: GateSpec::new(
                BlockColor::Red,
                Direction::North,
                vec![CellCoord::new(2, 3)],
            ),
        },
        &mut events,
    );
    let _ = harness.step(Command::ExtractBlock {
        block: BlockId::new(0),
        gate: GateId::new(1),
    });
    let _ = harness.tick(16);

    assert!(!harness
        .directives
        .iter()
        .any(|directive| matches!(directive, Directive::SpawnEffect { .. })));
    assert!(harness.directives.contains(&Directive::PlayRemoveCue));
}

#[test]
fn config_reads_millisecond_overrides_from_toml() {
    let config: ExtractionConfig = toml::from_str(
        r#"
retract_delay_ms = 50
easing = "Linear"
"#,
    )
    .expect("valid config");

    assert_eq!(config.retract_delay, Duration::from_millis(50));
    assert_eq!(config.travel_duration, Duration::from_millis(600));
    assert_eq!(config.easing, Easing::Linear);
}
