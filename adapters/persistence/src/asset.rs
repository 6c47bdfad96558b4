//! Logical grid schema shared by level files, backups and transfer strings.

use gate_puzzle_core::{BlockColor, CellCoord, Command, Direction, GateSpec, GridLayout};
use gate_puzzle_world::{query, World};
use glam::Vec3;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// Gates stored as parallel arrays, in gate order.
///
/// Positions are flattened: gate `i` consumes the next `position_counts[i]`
/// entries of `positions_x` and `positions_z`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateData {
    /// Palette index of each gate.
    pub color_types: Vec<i32>,
    /// Pull direction index of each gate (0 North, 1 South, 2 East, 3 West).
    pub directions: Vec<i32>,
    /// Number of cells of each gate.
    pub position_counts: Vec<i32>,
    /// Flattened cell `x` coordinates.
    pub positions_x: Vec<i32>,
    /// Flattened cell `z` coordinates.
    pub positions_z: Vec<i32>,
}

impl GateData {
    /// Flattens gate descriptions into parallel arrays.
    #[must_use]
    pub fn from_specs(gates: &[GateSpec]) -> Self {
        let mut data = Self::default();
        for gate in gates {
            data.color_types.push(gate.color.index());
            data.directions.push(gate.direction.index());
            data.position_counts
                .push(i32::try_from(gate.cells.len()).unwrap_or(i32::MAX));
            for cell in &gate.cells {
                data.positions_x.push(cell.x());
                data.positions_z.push(cell.z());
            }
        }
        data
    }

    /// Rebuilds gate descriptions, skipping entries that cannot be decoded.
    ///
    /// Every problem is logged; whatever decodes cleanly is returned.
    #[must_use]
    pub fn to_specs(&self) -> Vec<GateSpec> {
        let gate_count = self.color_types.len();
        if self.directions.len() != gate_count || self.position_counts.len() != gate_count {
            warn!(
                "gate arrays disagree: {} colours, {} directions, {} counts",
                gate_count,
                self.directions.len(),
                self.position_counts.len()
            );
        }
        if self.positions_x.len() != self.positions_z.len() {
            warn!(
                "gate position arrays disagree: {} x, {} z",
                self.positions_x.len(),
                self.positions_z.len()
            );
        }

        let available = self.positions_x.len().min(self.positions_z.len());
        let mut cursor = 0usize;
        let mut specs = Vec::new();
        let entries = gate_count
            .min(self.directions.len())
            .min(self.position_counts.len());
        for index in 0..entries {
            let count = usize::try_from(self.position_counts[index]).unwrap_or(0);
            let end = cursor.saturating_add(count).min(available);
            let cells: Vec<CellCoord> = (cursor..end)
                .map(|position| {
                    CellCoord::new(self.positions_x[position], self.positions_z[position])
                })
                .collect();
            cursor = end;

            let Some(color) = BlockColor::from_index(self.color_types[index]) else {
                warn!("gate {index} has unknown colour {}", self.color_types[index]);
                continue;
            };
            let Some(direction) = Direction::from_index(self.directions[index]) else {
                warn!("gate {index} has unknown direction {}", self.directions[index]);
                continue;
            };
            if cells.len() != count {
                warn!("gate {index} lists {count} cells but only {} remain", cells.len());
            }
            if cells.is_empty() {
                warn!("gate {index} has no cells");
                continue;
            }
            specs.push(GateSpec::new(color, direction, cells));
        }
        specs
    }
}

/// Persisted grid: dimensions, cell state arrays and gates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridAsset {
    /// Number of cells along `x`.
    pub grid_width: u32,
    /// Number of cells along `z`.
    pub grid_length: u32,
    /// World distance between neighbouring cell centres.
    pub cell_size: f32,
    /// World position of cell (0, 0).
    pub origin: [f32; 3],
    /// Row-major occupied flags.
    #[serde(default)]
    pub occupied_cells: Vec<bool>,
    /// Row-major wall flags.
    #[serde(default)]
    pub wall_cells: Vec<bool>,
    /// Gates in registration order.
    #[serde(default)]
    pub gate_data: GateData,
}

impl GridAsset {
    /// Captures the world's grid and gates.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let layout = query::layout(world);
        let occupancy = query::occupancy_view(world);
        Self {
            grid_width: layout.width(),
            grid_length: layout.length(),
            cell_size: layout.cell_size(),
            origin: layout.origin().to_array(),
            occupied_cells: occupancy.occupied().to_vec(),
            wall_cells: occupancy.walls().to_vec(),
            gate_data: GateData::from_specs(&query::gate_specs(world)),
        }
    }

    /// Layout described by the asset.
    #[must_use]
    pub fn layout(&self) -> GridLayout {
        GridLayout::new(
            self.grid_width,
            self.grid_length,
            self.cell_size,
            Vec3::from_array(self.origin),
        )
    }

    /// Logs every mismatch between the declared dimensions and the stored arrays.
    ///
    /// Returns `true` when the asset is consistent.
    pub fn validate(&self) -> bool {
        let expected = self.layout().cell_count();
        let mut consistent = true;
        if self.grid_width == 0 || self.grid_length == 0 {
            warn!("grid asset declares an empty {}x{} grid", self.grid_width, self.grid_length);
            consistent = false;
        }
        if self.layout().exceeds_cell_limit() {
            warn!(
                "grid asset declares {}x{} cells, more than the {} a world accepts",
                self.grid_width,
                self.grid_length,
                GridLayout::MAX_CELLS
            );
            consistent = false;
        }
        if self.cell_size <= 0.0 {
            warn!("grid asset declares non-positive cell size {}", self.cell_size);
            consistent = false;
        }
        if self.occupied_cells.len() != expected {
            warn!(
                "occupied array holds {} entries, expected {expected}",
                self.occupied_cells.len()
            );
            consistent = false;
        }
        if self.wall_cells.len() != expected {
            warn!(
                "wall array holds {} entries, expected {expected}",
                self.wall_cells.len()
            );
            consistent = false;
        }
        consistent
    }

    /// Builds the command that loads this asset into a world.
    ///
    /// Inconsistent data is logged and loaded as far as it goes.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let _ = self.validate();
        Command::LoadGrid {
            layout: self.layout(),
            occupied: self.occupied_cells.clone(),
            walls: self.wall_cells.clone(),
            gates: self.gate_data.to_specs(),
        }
    }

    /// Parses an asset from JSON.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the asset as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
