#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the gate puzzle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond with new command batches or presentation
//! [`Directive`]s that adapters forward to renderers and audio backends.

use std::time::Duration;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

mod layout;
mod shape;

pub use layout::GridLayout;
pub use shape::{BlockShape, Rotation};

/// Play state of the enclosing level.
///
/// Gate resolution only runs while the level is [`LevelState::InProgress`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelState {
    /// No level has been started yet.
    #[default]
    None,
    /// The level is being played and blocks may be pulled through gates.
    InProgress,
    /// The level was cleared.
    Completed,
    /// The level was lost.
    Failed,
}

impl LevelState {
    /// Reports whether gameplay resolution may run in this state.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::InProgress)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with an empty one described by the layout.
    ConfigureGrid {
        /// Dimensions, spacing and origin of the new grid.
        layout: GridLayout,
    },
    /// Replaces the grid with persisted cell flags and gates.
    LoadGrid {
        /// Dimensions, spacing and origin of the loaded grid.
        layout: GridLayout,
        /// Row-major occupied flags, `index = z * width + x`.
        occupied: Vec<bool>,
        /// Row-major wall flags, `index = z * width + x`.
        walls: Vec<bool>,
        /// Gates authored for the level, in registration order.
        gates: Vec<GateSpec>,
    },
    /// Seals every cell outside the interior mask as an occupied wall.
    SealExterior {
        /// Row-major mask where `true` marks a playable interior cell.
        interior: Vec<bool>,
    },
    /// Places an authored interior wall piece.
    PlaceWall {
        /// Cell receiving the wall.
        cell: CellCoord,
    },
    /// Instantiates a block into the level.
    AddBlock {
        /// Palette colour of the block.
        color: BlockColor,
        /// Shape offsets relative to the pivot.
        shape: BlockShape,
        /// Quarter-turn rotation applied to the shape.
        rotation: Rotation,
        /// Cell receiving the shape pivot.
        anchor: CellCoord,
    },
    /// Moves an existing block onto a new set of cells.
    MoveBlock {
        /// Block being moved.
        block: BlockId,
        /// Cells the block should occupy after the move, one per shape
        /// offset and in the shape's enumeration order.
        cells: Vec<CellCoord>,
    },
    /// Removes every placed block while preserving walls.
    ClearBlocks,
    /// Registers a gate that replaces existing wall cells.
    AddGate {
        /// Description of the gate to register.
        gate: GateSpec,
    },
    /// Unregisters a gate.
    RemoveGate {
        /// Gate being removed.
        gate: GateId,
    },
    /// Assigns every gate the default exit effect for its colour.
    AssignGateEffects,
    /// Updates the play state of the level.
    SetLevelState {
        /// State the level should enter.
        state: LevelState,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts pulling a block through a gate.
    ExtractBlock {
        /// Block selected by the gate matcher.
        block: BlockId,
        /// Gate the block is pulled through.
        gate: GateId,
    },
    /// Finishes an extraction once the block's exit motion completed.
    ///
    /// Applying this more than once for the same block is a no-op.
    CompleteExtraction {
        /// Block whose exit motion finished.
        block: BlockId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the grid was replaced.
    GridConfigured {
        /// Number of columns in the new grid.
        width: u32,
        /// Number of rows in the new grid.
        length: u32,
    },
    /// Announces that the grid finished initialising and may be played.
    GridInitialized,
    /// Confirms that cells outside the interior mask were sealed.
    ExteriorSealed {
        /// Number of cells converted into walls.
        sealed: u32,
    },
    /// Confirms that an authored wall was placed.
    WallPlaced {
        /// Identifier assigned to the wall piece.
        wall: WallId,
        /// Cell occupied by the wall.
        cell: CellCoord,
    },
    /// Confirms that a block was added to the level.
    BlockPlaced {
        /// Identifier assigned to the block.
        block: BlockId,
        /// Cells occupied by the block.
        cells: Vec<CellCoord>,
    },
    /// Confirms that a block moved.
    BlockMoved {
        /// Block that moved.
        block: BlockId,
        /// Cells occupied before the move.
        from: Vec<CellCoord>,
        /// Cells occupied after the move.
        to: Vec<CellCoord>,
    },
    /// Reports that an add or move request was rejected.
    BlockPlacementRejected {
        /// Block being moved, or `None` when adding a new block.
        block: Option<BlockId>,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that every placed block was cleared.
    BlocksCleared,
    /// Confirms that a gate was registered.
    GateAdded {
        /// Identifier assigned to the gate.
        gate: GateId,
    },
    /// Confirms that a gate was unregistered.
    GateRemoved {
        /// Gate that was removed.
        gate: GateId,
    },
    /// Reports that a gate operation was rejected.
    GateRejected {
        /// Specific reason the operation failed.
        reason: GateError,
    },
    /// Announces that the level entered a new play state.
    LevelStateChanged {
        /// State that became active.
        state: LevelState,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a block started leaving through a gate.
    ///
    /// The block's cells were released before this event was emitted.
    ExtractionStarted {
        /// Block being extracted.
        block: BlockId,
        /// Gate the block leaves through.
        gate: GateId,
        /// Pull direction of the gate.
        direction: Direction,
        /// Cells the block occupied before release.
        block_cells: Vec<CellCoord>,
        /// Aperture cells of the gate.
        gate_cells: Vec<CellCoord>,
        /// Cell holding the block pivot before release.
        anchor: CellCoord,
        /// Exit effect attached to the gate, if any.
        effect: Option<EffectHandle>,
    },
    /// Reports that an extraction request was ignored.
    ExtractionRejected {
        /// Block named in the request.
        block: BlockId,
        /// Specific reason the request failed.
        reason: ExtractionError,
    },
    /// Announces that a block left the level.
    BlockRemoved {
        /// Block that was removed.
        block: BlockId,
        /// Gate the block left through.
        gate: GateId,
    },
}

/// Presentation requests emitted by systems for adapters to carry out.
///
/// Directives never feed back into world state.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// Lowers the gate so a block can pass.
    RetractGate {
        /// Gate to lower.
        gate: GateId,
    },
    /// Spawns a fire-and-forget exit effect.
    SpawnEffect {
        /// Prefab handle of the effect.
        effect: EffectHandle,
        /// World-space position of the effect.
        position: Vec3,
        /// Orientation of the effect.
        rotation: Quat,
        /// Time after which the effect is destroyed.
        lifetime: Duration,
    },
    /// Plays the block removal sound once per extraction.
    PlayRemoveCue,
    /// Tells the block material where to dissolve from.
    DissolveHint {
        /// Block being dissolved.
        block: BlockId,
        /// Pull direction of the gate.
        direction: Direction,
        /// World-space position of the gate.
        origin: Vec3,
    },
    /// Animates a block from one world position to another.
    TranslateBlock {
        /// Block being animated.
        block: BlockId,
        /// Starting world position.
        from: Vec3,
        /// Final world position.
        to: Vec3,
        /// Duration of the motion.
        duration: Duration,
        /// Easing curve applied to the motion.
        easing: Easing,
    },
    /// Destroys the block representation.
    DisposeBlock {
        /// Block to dispose.
        block: BlockId,
    },
    /// Raises the gate back to its resting position.
    RestoreGate {
        /// Gate to raise.
        gate: GateId,
    },
    /// Plays the success haptic.
    PlaySuccessHaptic,
}

/// Enumerated block and gate palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockColor {
    /// Red.
    Red,
    /// Orange.
    Orange,
    /// Yellow.
    Yellow,
    /// Blue.
    Blue,
    /// Cyan.
    Cyan,
    /// Green.
    Green,
    /// Purple.
    Purple,
    /// Pink.
    Pink,
    /// Dark green.
    DarkGreen,
}

impl BlockColor {
    /// Every palette entry in persisted index order.
    pub const ALL: [BlockColor; 9] = [
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Blue,
        Self::Cyan,
        Self::Green,
        Self::Purple,
        Self::Pink,
        Self::DarkGreen,
    ];

    /// Index used when persisting the colour.
    #[must_use]
    pub const fn index(self) -> i32 {
        self as i32
    }

    /// Resolves a persisted colour index.
    #[must_use]
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// Grid axis along which coordinates vary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The column axis.
    X,
    /// The row axis.
    Z,
}

/// Pull direction of a gate and the order neighbours are probed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward increasing `z`.
    North,
    /// Toward decreasing `z`.
    South,
    /// Toward increasing `x`.
    East,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// Order in which neighbours of a block cell are probed for gates.
    pub const CHECK_ORDER: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Index used when persisting the direction.
    #[must_use]
    pub const fn index(self) -> i32 {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::East => 2,
            Self::West => 3,
        }
    }

    /// Resolves a persisted direction index.
    #[must_use]
    pub const fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::North),
            1 => Some(Self::South),
            2 => Some(Self::East),
            3 => Some(Self::West),
            _ => None,
        }
    }

    /// Unit step expressed as `(dx, dz)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::Z,
            Self::East | Self::West => Axis::X,
        }
    }

    /// Coordinate of `cell` along the axis perpendicular to travel.
    ///
    /// North and south gates compare columns, east and west gates compare rows.
    #[must_use]
    pub const fn lateral(self, cell: CellCoord) -> i32 {
        match self.axis() {
            Axis::Z => cell.x(),
            Axis::X => cell.z(),
        }
    }

    /// Unit vector in world space.
    #[must_use]
    pub const fn world_vector(self) -> Vec3 {
        match self {
            Self::North => Vec3::Z,
            Self::South => Vec3::NEG_Z,
            Self::East => Vec3::X,
            Self::West => Vec3::NEG_X,
        }
    }

    /// Heading around the vertical axis in degrees.
    #[must_use]
    pub const fn yaw_degrees(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::South => 180.0,
            Self::East => 90.0,
            Self::West => 270.0,
        }
    }
}

/// Unique identifier assigned to a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a new block identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GateId(u32);

impl GateId {
    /// Creates a new gate identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an authored wall piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(u32);

impl WallId {
    /// Creates a new wall identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque handle to an exit-effect prefab owned by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectHandle(u32);

impl EffectHandle {
    /// Creates a handle from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Default grinding effect for gates of the provided colour.
    #[must_use]
    pub const fn grinding(color: BlockColor) -> Self {
        Self(color as u32)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell.
///
/// Coordinates are signed so that neighbours beyond the grid edge remain
/// representable; bounds checks reject them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    z: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the cell displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// Returns the neighbouring cell in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.offset();
        self.offset(dx, dz)
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

/// Authoring description of a gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSpec {
    /// Colour a block must share to be pulled.
    pub color: BlockColor,
    /// Direction blocks are pulled toward.
    pub direction: Direction,
    /// Aperture cells, contiguous across the pull axis.
    pub cells: Vec<CellCoord>,
    /// Exit effect spawned at aligned aperture cells.
    #[serde(default)]
    pub effect: Option<EffectHandle>,
}

impl GateSpec {
    /// Creates a gate description without an exit effect.
    #[must_use]
    pub fn new(color: BlockColor, direction: Direction, cells: Vec<CellCoord>) -> Self {
        Self {
            color,
            direction,
            cells,
            effect: None,
        }
    }
}

/// Reasons a block placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The candidate footprint contains no cells.
    EmptyFootprint,
    /// A candidate cell lies outside the grid.
    OutOfBounds,
    /// A candidate cell is occupied by another block.
    Occupied,
    /// A candidate cell is a wall.
    Wall,
    /// No placed block carries the provided identifier.
    UnknownBlock,
    /// The block is being pulled through a gate.
    Extracting,
    /// The cells are not the block's shape, listed in enumeration order.
    ShapeMismatch,
}

/// Reasons a gate operation may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateError {
    /// Gates span between one and four cells.
    InvalidCellCount {
        /// Number of cells supplied.
        count: usize,
    },
    /// An aperture cell lies outside the grid.
    OutOfBounds,
    /// The same cell was listed twice.
    DuplicateCell,
    /// The aperture is not a contiguous run across the pull axis.
    NotContiguous,
    /// An aperture cell is not a wall.
    NotWall,
    /// No gate carries the provided identifier.
    UnknownGate,
}

/// Reasons an extraction request may be ignored by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionError {
    /// No placed block carries the provided identifier.
    UnknownBlock,
    /// No gate carries the provided identifier.
    UnknownGate,
    /// The block is already being pulled through a gate.
    AlreadyExtracting,
}

/// Easing curves understood by block animators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity.
    Linear,
    /// Decelerating quadratic curve.
    #[default]
    EaseOutQuad,
}

impl Easing {
    /// Maps normalised time in `0.0..=1.0` to normalised progress.
    #[must_use]
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Immutable representation of a single block used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSnapshot {
    /// Unique identifier assigned to the block.
    pub id: BlockId,
    /// Palette colour of the block.
    pub color: BlockColor,
    /// Cells occupied by the block in shape enumeration order.
    pub cells: Vec<CellCoord>,
    /// Cell holding the shape pivot.
    pub anchor: CellCoord,
    /// Indicates whether the block is leaving through a gate.
    pub extracting: bool,
}

/// Read-only snapshot describing all placed blocks.
#[derive(Clone, Debug, Default)]
pub struct BlockView {
    snapshots: Vec<BlockSnapshot>,
}

impl BlockView {
    /// Creates a new block view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BlockSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured block snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&BlockSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BlockSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single gate used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateSnapshot {
    /// Identifier allocated to the gate by the world.
    pub id: GateId,
    /// Colour a block must share to be pulled.
    pub color: BlockColor,
    /// Direction blocks are pulled toward.
    pub direction: Direction,
    /// Aperture cells in authoring order.
    pub cells: Vec<CellCoord>,
    /// Exit effect spawned at aligned aperture cells.
    pub effect: Option<EffectHandle>,
}

/// Read-only snapshot of the gates and their cell lookup.
#[derive(Clone, Debug, Default)]
pub struct GateView {
    snapshots: Vec<GateSnapshot>,
    lookup: Vec<Option<GateId>>,
    width: u32,
    length: u32,
}

impl GateView {
    /// Creates a gate view from snapshots and a dense row-major cell lookup.
    #[must_use]
    pub fn new(
        mut snapshots: Vec<GateSnapshot>,
        lookup: Vec<Option<GateId>>,
        width: u32,
        length: u32,
    ) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self {
            snapshots,
            lookup,
            width,
            length,
        }
    }

    /// Returns the gate registered at the provided cell, if any.
    #[must_use]
    pub fn gate_at(&self, cell: CellCoord) -> Option<&GateSnapshot> {
        let index = dense_index(cell, self.width, self.length)?;
        let id = self.lookup.get(index).copied().flatten()?;
        self.get(id)
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: GateId) -> Option<&GateSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Iterator over the captured gate snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &GateSnapshot> {
        self.snapshots.iter()
    }
}

/// Read-only view into the cell state arrays.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    occupied: &'a [bool],
    walls: &'a [bool],
    wall_lookup: &'a [Option<WallId>],
    width: u32,
    length: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major slices.
    #[must_use]
    pub fn new(
        occupied: &'a [bool],
        walls: &'a [bool],
        wall_lookup: &'a [Option<WallId>],
        width: u32,
        length: u32,
    ) -> Self {
        Self {
            occupied,
            walls,
            wall_lookup,
            width,
            length,
        }
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn is_within_grid(&self, cell: CellCoord) -> bool {
        dense_index(cell, self.width, self.length).is_some()
    }

    /// Reports whether the cell is occupied; cells outside the grid are not.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        dense_index(cell, self.width, self.length)
            .and_then(|index| self.occupied.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether the cell is a wall, consulting authored walls first.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        let Some(index) = dense_index(cell, self.width, self.length) else {
            return false;
        };
        if self.wall_lookup.get(index).copied().flatten().is_some() {
            return true;
        }
        self.walls.get(index).copied().unwrap_or(false)
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.length)
    }

    /// Row-major occupied flags.
    #[must_use]
    pub fn occupied(&self) -> &'a [bool] {
        self.occupied
    }

    /// Row-major wall flags.
    #[must_use]
    pub fn walls(&self) -> &'a [bool] {
        self.walls
    }
}

fn dense_index(cell: CellCoord, width: u32, length: u32) -> Option<usize> {
    let x = u32::try_from(cell.x()).ok()?;
    let z = u32::try_from(cell.z()).ok()?;
    if x >= width || z >= length {
        return None;
    }
    let width = usize::try_from(width).ok()?;
    Some(usize::try_from(z).ok()? * width + usize::try_from(x).ok()?)
}
