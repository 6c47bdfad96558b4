//! Plain-text rendering of the grid.

use gate_puzzle_core::{BlockColor, CellCoord, Direction};
use gate_puzzle_world::{query, World};

/// Draws the grid with north at the top.
///
/// Walls are `#`, gates show their pull direction, blocks show the first
/// letter of their colour and free cells are `.`.
pub(crate) fn render_grid(world: &World) -> String {
    let layout = query::layout(world);
    let gates = query::gate_view(world);
    let blocks = query::block_view(world);
    let width = i32::try_from(layout.width()).unwrap_or(i32::MAX);
    let length = i32::try_from(layout.length()).unwrap_or(i32::MAX);

    let mut out = String::new();
    for z in (0..length).rev() {
        for x in 0..width {
            let cell = CellCoord::new(x, z);
            let glyph = if let Some(gate) = gates.gate_at(cell) {
                direction_glyph(gate.direction)
            } else if let Some(block) = query::block_at(world, cell).and_then(|id| blocks.get(id)) {
                color_glyph(block.color)
            } else if query::is_wall(world, cell) {
                '#'
            } else if query::is_occupied(world, cell) {
                '+'
            } else {
                '.'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

fn direction_glyph(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::South => 'v',
        Direction::East => '>',
        Direction::West => '<',
    }
}

fn color_glyph(color: BlockColor) -> char {
    match color {
        BlockColor::Red => 'R',
        BlockColor::Orange => 'O',
        BlockColor::Yellow => 'Y',
        BlockColor::Blue => 'B',
        BlockColor::Cyan => 'C',
        BlockColor::Green => 'G',
        BlockColor::Purple => 'P',
        BlockColor::Pink => 'K',
        BlockColor::DarkGreen => 'D',
    }
}
