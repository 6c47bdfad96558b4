//! Authoritative gate state and aperture validation.

use std::collections::BTreeMap;

use gate_puzzle_core::{Axis, CellCoord, GateError, GateId, GateSnapshot, GateSpec, GridLayout};

/// Gates never span more than this many cells.
pub(crate) const MAX_APERTURE_CELLS: usize = 4;

/// Gate stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct GateState {
    pub(crate) id: GateId,
    pub(crate) spec: GateSpec,
}

impl GateState {
    pub(crate) fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            id: self.id,
            color: self.spec.color,
            direction: self.spec.direction,
            cells: self.spec.cells.clone(),
            effect: self.spec.effect,
        }
    }
}

/// Authoritative gate list in registration order.
#[derive(Debug)]
pub(crate) struct GateBook {
    entries: BTreeMap<GateId, GateState>,
    next_gate_id: GateId,
}

impl GateBook {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_gate_id: GateId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, spec: GateSpec) -> GateId {
        let id = self.next_gate_id;
        self.next_gate_id = GateId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, GateState { id, spec });
        id
    }

    pub(crate) fn get(&self, id: GateId) -> Option<&GateState> {
        self.entries.get(&id)
    }

    pub(crate) fn remove(&mut self, id: GateId) -> Option<GateState> {
        self.entries.remove(&id)
    }

    /// Drops every gate for which `keep` returns `false`, returning the dropped identifiers.
    pub(crate) fn retain<F>(&mut self, mut keep: F) -> Vec<GateId>
    where
        F: FnMut(&GateState) -> bool,
    {
        let dropped: Vec<GateId> = self
            .entries
            .values()
            .filter(|gate| !keep(gate))
            .map(|gate| gate.id)
            .collect();
        for id in &dropped {
            let _ = self.entries.remove(id);
        }
        dropped
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &GateState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut GateState> {
        self.entries.values_mut()
    }

    /// `(gate, cell)` pairs in registration order, ready for registry projection.
    pub(crate) fn cell_entries(&self) -> impl Iterator<Item = (GateId, CellCoord)> + '_ {
        self.entries
            .values()
            .flat_map(|gate| gate.spec.cells.iter().map(move |cell| (gate.id, *cell)))
    }
}

/// Checks that an authored aperture can become a gate.
///
/// The aperture holds one to four distinct in-bounds wall cells lying on a
/// single line across the pull axis with no gaps.
pub(crate) fn validate_aperture<F>(
    spec: &GateSpec,
    layout: &GridLayout,
    is_wall: F,
) -> Result<(), GateError>
where
    F: Fn(CellCoord) -> bool,
{
    let count = spec.cells.len();
    if count == 0 || count > MAX_APERTURE_CELLS {
        return Err(GateError::InvalidCellCount { count });
    }

    if spec.cells.iter().any(|cell| !layout.contains(*cell)) {
        return Err(GateError::OutOfBounds);
    }

    let mut lateral: Vec<i32> = spec
        .cells
        .iter()
        .map(|cell| spec.direction.lateral(*cell))
        .collect();
    lateral.sort_unstable();
    if lateral.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(GateError::DuplicateCell);
    }

    let depth = |cell: &CellCoord| match spec.direction.axis() {
        Axis::Z => cell.z(),
        Axis::X => cell.x(),
    };
    let first_depth = depth(&spec.cells[0]);
    let same_line = spec.cells.iter().all(|cell| depth(cell) == first_depth);
    let gapless = lateral.windows(2).all(|pair| pair[1] - pair[0] == 1);
    if !same_line || !gapless {
        return Err(GateError::NotContiguous);
    }

    if spec.cells.iter().any(|cell| !is_wall(*cell)) {
        return Err(GateError::NotWall);
    }

    Ok(())
}
