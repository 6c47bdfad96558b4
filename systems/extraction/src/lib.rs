#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-driven system that sequences the side effects of pulling a block through a gate.
//!
//! The world releases a block's cells the moment extraction starts. Everything
//! that follows is presentation: the gate retracts, and after a short delay
//! the exit effects fire, the block is told where to dissolve from and starts
//! travelling along the pull axis. Once the motion finishes the system asks
//! the world to complete the extraction, and the world's `BlockRemoved` event
//! finally disposes the block and restores the gate.

use std::{collections::BTreeMap, time::Duration};

use gate_puzzle_core::{
    BlockId, CellCoord, Command, Direction, Directive, EffectHandle, Easing, Event, GateId,
    GridLayout,
};
use glam::{EulerRot, Quat};
use log::debug;
use serde::{Deserialize, Serialize};

/// Pitch applied to exit effects so they face along the pull axis.
const EFFECT_PITCH_DEGREES: f32 = -90.0;

/// Timing and motion parameters of an extraction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Delay between gate retraction and block motion.
    #[serde(rename = "retract_delay_ms", with = "millis")]
    pub retract_delay: Duration,
    /// Duration of the block's exit motion.
    #[serde(rename = "travel_duration_ms", with = "millis")]
    pub travel_duration: Duration,
    /// Distance travelled by the block, in cells.
    pub travel_cells: f32,
    /// Lifetime of each exit effect.
    #[serde(rename = "effect_lifetime_ms", with = "millis")]
    pub effect_lifetime: Duration,
    /// Easing curve of the exit motion.
    pub easing: Easing,
}

impl ExtractionConfig {
    /// Creates a configuration with explicit timings.
    #[must_use]
    pub const fn new(
        retract_delay: Duration,
        travel_duration: Duration,
        travel_cells: f32,
        effect_lifetime: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            retract_delay,
            travel_duration,
            travel_cells,
            effect_lifetime,
            easing,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(200),
            Duration::from_millis(600),
            5.0,
            Duration::from_secs(2),
            Easing::EaseOutQuad,
        )
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Observable stage of an extraction in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtractionPhase {
    /// The gate is retracting; the block has not started moving.
    Retracting,
    /// The block is travelling along the pull axis.
    Moving,
    /// Motion finished; waiting for the world to remove the block.
    Completed,
}

#[derive(Clone, Debug)]
struct Sequence {
    gate: GateId,
    direction: Direction,
    block_cells: Vec<CellCoord>,
    gate_cells: Vec<CellCoord>,
    anchor: CellCoord,
    effect: Option<EffectHandle>,
    phase: ExtractionPhase,
    elapsed: Duration,
}

impl Sequence {
    /// Aperture cells lying directly beyond a block cell along the pull direction.
    fn exit_cells(&self) -> Vec<CellCoord> {
        self.gate_cells
            .iter()
            .copied()
            .filter(|gate_cell| {
                self.block_cells
                    .iter()
                    .any(|cell| cell.step(self.direction) == *gate_cell)
            })
            .collect()
    }
}

/// Pure system advancing every extraction in flight.
#[derive(Debug)]
pub struct Extraction {
    config: ExtractionConfig,
    sequences: BTreeMap<BlockId, Sequence>,
}

impl Default for Extraction {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl Extraction {
    /// Creates a new extraction system using the supplied configuration.
    #[must_use]
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            sequences: BTreeMap::new(),
        }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Stage of the extraction of `block`, if one is in flight.
    #[must_use]
    pub fn phase(&self, block: BlockId) -> Option<ExtractionPhase> {
        self.sequences.get(&block).map(|sequence| sequence.phase)
    }

    /// Reports whether no extraction is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Consumes world events in order, emitting commands and presentation directives.
    pub fn handle(
        &mut self,
        events: &[Event],
        layout: &GridLayout,
        commands: &mut Vec<Command>,
        directives: &mut Vec<Directive>,
    ) {
        for event in events {
            match event {
                Event::ExtractionStarted {
                    block,
                    gate,
                    direction,
                    block_cells,
                    gate_cells,
                    anchor,
                    effect,
                } => {
                    directives.push(Directive::RetractGate { gate: *gate });
                    let _ = self.sequences.insert(
                        *block,
                        Sequence {
                            gate: *gate,
                            direction: *direction,
                            block_cells: block_cells.clone(),
                            gate_cells: gate_cells.clone(),
                            anchor: *anchor,
                            effect: *effect,
                            phase: ExtractionPhase::Retracting,
                            elapsed: Duration::ZERO,
                        },
                    );
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, layout, commands, directives),
                Event::BlockRemoved { block, gate } => {
                    if self.sequences.remove(block).is_some() {
                        directives.push(Directive::DisposeBlock { block: *block });
                        directives.push(Directive::RestoreGate { gate: *gate });
                        directives.push(Directive::PlaySuccessHaptic);
                    }
                }
                Event::BlocksCleared | Event::GridConfigured { .. } => {
                    self.abandon_all(directives);
                }
                _ => {}
            }
        }
    }

    /// Reports that an external animator finished moving `block`.
    ///
    /// Asks the world to complete the extraction whenever the block is no
    /// longer retracting. Repeated calls are forwarded unchanged; the world
    /// removes a block at most once.
    pub fn notify_motion_complete(&mut self, block: BlockId, commands: &mut Vec<Command>) {
        if let Some(sequence) = self.sequences.get_mut(&block) {
            if sequence.phase == ExtractionPhase::Retracting {
                debug!("block {} has not started moving yet", block.get());
                return;
            }
            sequence.phase = ExtractionPhase::Completed;
        }
        commands.push(Command::CompleteExtraction { block });
    }

    fn advance(
        &mut self,
        dt: Duration,
        layout: &GridLayout,
        commands: &mut Vec<Command>,
        directives: &mut Vec<Directive>,
    ) {
        let config = self.config;
        for (block, sequence) in &mut self.sequences {
            sequence.elapsed = sequence.elapsed.saturating_add(dt);

            if sequence.phase == ExtractionPhase::Retracting
                && sequence.elapsed >= config.retract_delay
            {
                sequence.elapsed -= config.retract_delay;
                sequence.phase = ExtractionPhase::Moving;
                begin_motion(*block, sequence, &config, layout, directives);
            }

            if sequence.phase == ExtractionPhase::Moving
                && sequence.elapsed >= config.travel_duration
            {
                sequence.phase = ExtractionPhase::Completed;
                commands.push(Command::CompleteExtraction { block: *block });
            }
        }
    }

    fn abandon_all(&mut self, directives: &mut Vec<Directive>) {
        for (block, sequence) in std::mem::take(&mut self.sequences) {
            debug!("abandoning extraction of block {}", block.get());
            directives.push(Directive::DisposeBlock { block });
            directives.push(Directive::RestoreGate {
                gate: sequence.gate,
            });
        }
    }
}

fn begin_motion(
    block: BlockId,
    sequence: &Sequence,
    config: &ExtractionConfig,
    layout: &GridLayout,
    directives: &mut Vec<Directive>,
) {
    if let Some(effect) = sequence.effect {
        let rotation = effect_rotation(sequence.direction);
        for cell in sequence.exit_cells() {
            directives.push(Directive::SpawnEffect {
                effect,
                position: layout.cell_to_world(cell),
                rotation,
                lifetime: config.effect_lifetime,
            });
        }
    }
    directives.push(Directive::PlayRemoveCue);

    if let Some(origin) = layout.centroid(&sequence.gate_cells) {
        directives.push(Directive::DissolveHint {
            block,
            direction: sequence.direction,
            origin,
        });
    }

    let from = layout.cell_to_world(sequence.anchor);
    let to = from
        + sequence.direction.world_vector() * layout.cell_size() * config.travel_cells;
    directives.push(Directive::TranslateBlock {
        block,
        from,
        to,
        duration: config.travel_duration,
        easing: config.easing,
    });
}

/// Orientation of an exit effect for gates pulling toward `direction`.
#[must_use]
pub fn effect_rotation(direction: Direction) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        direction.yaw_degrees().to_radians(),
        EFFECT_PITCH_DEGREES.to_radians(),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_cells_follow_block_columns() {
        let sequence = Sequence {
            gate: GateId::new(0),
            direction: Direction::North,
            block_cells: vec![CellCoord::new(2, 2), CellCoord::new(2, 1)],
            gate_cells: vec![CellCoord::new(1, 3), CellCoord::new(2, 3)],
            anchor: CellCoord::new(2, 2),
            effect: None,
            phase: ExtractionPhase::Retracting,
            elapsed: Duration::ZERO,
        };
        assert_eq!(sequence.exit_cells(), vec![CellCoord::new(2, 3)]);
    }

    #[test]
    fn effect_rotation_yaws_with_direction() {
        let pitch = Quat::from_rotation_x(EFFECT_PITCH_DEGREES.to_radians());
        assert!(effect_rotation(Direction::North).abs_diff_eq(pitch, 1e-5));
        let south = Quat::from_rotation_y(std::f32::consts::PI) * pitch;
        assert!(effect_rotation(Direction::South).abs_diff_eq(south, 1e-5));
        let west = Quat::from_rotation_y(270_f32.to_radians()) * pitch;
        assert!(effect_rotation(Direction::West).abs_diff_eq(west, 1e-5));
    }

    #[test]
    fn config_defaults_match_presentation_timings() {
        let config = ExtractionConfig::default();
        assert_eq!(config.retract_delay, Duration::from_millis(200));
        assert_eq!(config.travel_duration, Duration::from_millis(600));
        assert_eq!(config.effect_lifetime, Duration::from_secs(2));
        assert_eq!(config.easing, Easing::EaseOutQuad);
    }
}
