//! Level files: a persisted grid plus the blocks placed on it.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use gate_puzzle_core::{BlockColor, BlockShape, CellCoord, Command, GridLayout, Rotation};
use gate_puzzle_persistence::GridAsset;
use glam::Vec3;
use log::warn;
use serde::Deserialize;

/// Block authored in a level, positioned by its pivot in world space.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LevelBlock {
    pub(crate) color: BlockColor,
    /// Pivot offsets as `[x, z]` pairs.
    pub(crate) offsets: Vec<[i32; 2]>,
    pub(crate) position: [f32; 3],
    #[serde(default)]
    pub(crate) rotation_degrees: f32,
}

impl LevelBlock {
    /// Command placing the block on the cell nearest to its pivot.
    pub(crate) fn to_command(&self, layout: &GridLayout) -> Option<Command> {
        let Some(anchor) = layout.world_to_cell(Vec3::from_array(self.position)) else {
            warn!("{:?} block has no cell to snap to", self.color);
            return None;
        };
        let offsets = self
            .offsets
            .iter()
            .map(|[x, z]| CellCoord::new(*x, *z))
            .collect();
        Some(Command::AddBlock {
            color: self.color,
            shape: BlockShape::new(offsets),
            rotation: Rotation::from_degrees(self.rotation_degrees),
            anchor,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Level {
    pub(crate) grid: GridAsset,
    #[serde(default)]
    pub(crate) blocks: Vec<LevelBlock>,
}

impl Level {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read level {}", path.display()))?;
        Self::parse(&json).with_context(|| format!("failed to parse level {}", path.display()))
    }

    pub(crate) fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Commands that build the level in an empty world.
    pub(crate) fn commands(&self) -> Vec<Command> {
        let layout = self.grid.layout();
        let mut commands = vec![self.grid.to_command(), Command::AssignGateEffects];
        commands.extend(
            self.blocks
                .iter()
                .filter_map(|block| block.to_command(&layout)),
        );
        commands
    }
}
