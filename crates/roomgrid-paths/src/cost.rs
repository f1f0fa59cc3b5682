//! Movement costs.

use roomgrid_core::Terrain;

/// Cost of entering a single cell.
pub type Cost = u16;

/// The impassable sentinel. Propagates through every lookup: a cell whose
/// resolved cost is `OBSTACLE` is never stepped on.
pub const OBSTACLE: Cost = Cost::MAX;

/// Per-terrain-class cost table for one search: plain and swamp costs come
/// from the search options, walls are always [`OBSTACLE`].
#[derive(Copy, Clone, Debug)]
pub(crate) struct LookTable {
    costs: [Cost; 3],
}

impl LookTable {
    pub(crate) const fn new(plain_cost: Cost, swamp_cost: Cost) -> Self {
        Self {
            costs: [plain_cost, OBSTACLE, swamp_cost],
        }
    }

    #[inline]
    pub(crate) fn cost(&self, terrain: Terrain) -> Cost {
        self.costs[terrain as usize]
    }
}
