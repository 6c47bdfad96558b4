//! Authoritative block state management utilities.

use std::collections::BTreeMap;

use gate_puzzle_core::{BlockColor, BlockId, BlockShape, BlockSnapshot, CellCoord, GateId, Rotation};

/// Block stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct BlockState {
    /// Identifier allocated by the world for the block.
    pub(crate) id: BlockId,
    /// Palette colour of the block.
    pub(crate) color: BlockColor,
    /// Silhouette the block was instantiated with.
    pub(crate) shape: BlockShape,
    /// Cells currently covered, in shape enumeration order.
    pub(crate) cells: Vec<CellCoord>,
    /// Gate the block is leaving through, once extraction started.
    pub(crate) extraction: Option<GateId>,
}

impl BlockState {
    /// Cell holding the shape pivot.
    pub(crate) fn anchor(&self) -> CellCoord {
        self.cells
            .get(self.shape.pivot_index())
            .or_else(|| self.cells.first())
            .copied()
            .unwrap_or(CellCoord::new(0, 0))
    }

    pub(crate) fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot {
            id: self.id,
            color: self.color,
            cells: self.cells.clone(),
            anchor: self.anchor(),
            extracting: self.extraction.is_some(),
        }
    }
}

/// Placed-block collection that manages identifier allocation.
///
/// Identifiers grow monotonically, so iteration follows placement order.
#[derive(Debug)]
pub(crate) struct BlockRegistry {
    entries: BTreeMap<BlockId, BlockState>,
    next_block_id: BlockId,
}

impl BlockRegistry {
    /// Creates an empty block registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_block_id: BlockId::new(0),
        }
    }

    /// Stores a new block and returns its identifier.
    pub(crate) fn insert(
        &mut self,
        color: BlockColor,
        shape: BlockShape,
        rotation: Rotation,
        anchor: CellCoord,
    ) -> BlockId {
        let id = self.next_block_id;
        self.next_block_id = BlockId::new(id.get().saturating_add(1));
        let cells = shape.footprint(anchor, rotation);
        let _ = self.entries.insert(
            id,
            BlockState {
                id,
                color,
                shape,
                cells,
                extraction: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: BlockId) -> Option<&BlockState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: BlockId) -> Option<&mut BlockState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: BlockId) -> Option<BlockState> {
        self.entries.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &BlockState> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
