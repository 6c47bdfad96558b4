//! Position-keyed lookup tables projected from authoritative lists.

use gate_puzzle_core::{CellCoord, GateId, GridLayout, WallId};
use log::warn;

/// Dense row-major map from a cell to the entry occupying it.
///
/// Registries are never edited in place: they are re-projected from the
/// authoritative list whenever that list changes. When two entries claim the
/// same cell the one projected last wins.
#[derive(Clone, Debug)]
pub(crate) struct CellRegistry<K> {
    layout: GridLayout,
    slots: Vec<Option<K>>,
}

pub(crate) type WallRegistry = CellRegistry<WallId>;
pub(crate) type GateRegistry = CellRegistry<GateId>;

impl<K: Copy + std::fmt::Debug> CellRegistry<K> {
    pub(crate) fn empty(layout: GridLayout) -> Self {
        Self {
            layout,
            slots: vec![None; layout.cell_count()],
        }
    }

    /// Projects `(key, cell)` pairs in order; later pairs overwrite earlier ones.
    pub(crate) fn project<I>(layout: GridLayout, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CellCoord)>,
    {
        let mut registry = Self::empty(layout);
        for (key, cell) in entries {
            match layout.index_of(cell) {
                Some(index) => registry.slots[index] = Some(key),
                None => warn!("registry entry {key:?} at {cell:?} lies outside the grid"),
            }
        }
        registry
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<K> {
        self.layout
            .index_of(cell)
            .and_then(|index| self.slots.get(index).copied().flatten())
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.get(cell).is_some()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Registered cells in row-major order.
    pub(crate) fn positions(&self) -> Vec<CellCoord> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .filter_map(|(index, _)| self.layout.coord_of(index))
            .collect()
    }

    pub(crate) fn slots(&self) -> &[Option<K>] {
        &self.slots
    }
}
