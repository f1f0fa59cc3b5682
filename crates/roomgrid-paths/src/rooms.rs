//! Per-search room data: the provider capability, cost matrices, and the
//! materialised room table entry.
//!
//! A search only touches rooms it actually expands into. The first time a
//! room is seen, the engine fetches its terrain and consults the
//! [`RoomProvider`], which can close the room off entirely, let terrain
//! stand as-is, or supply a [`CostMatrix`] of per-cell overrides.

use std::collections::HashMap;
use std::sync::Arc;

use roomgrid_core::{MapPosition, TerrainData, ROOM_AREA};

/// Errors a [`RoomProvider`] may surface; they abort the search.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What a provider decided about one room.
#[derive(Debug, Clone, Default)]
pub enum RoomRule {
    /// Use terrain as-is.
    #[default]
    Open,
    /// Treat the whole room as impassable.
    Blocked,
    /// Override per-cell costs on top of terrain.
    Costs(CostMatrix),
}

/// Per-search source of room rules, consulted once per freshly-seen room.
///
/// `should_abort` doubles as the cooperative cancellation hook; it is polled
/// once per search iteration and a `true` stops the search with an
/// interrupted outcome.
pub trait RoomProvider {
    /// Decide the rule for `room`. The decision is memoised for the rest of
    /// the search.
    fn room(&mut self, room: MapPosition) -> Result<RoomRule, ProviderError>;

    /// Whether the search should stop now.
    fn should_abort(&mut self) -> bool {
        false
    }
}

/// Provider that opens every room with plain terrain rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOpen;

impl RoomProvider for AllOpen {
    fn room(&mut self, _room: MapPosition) -> Result<RoomRule, ProviderError> {
        Ok(RoomRule::Open)
    }
}

impl<F> RoomProvider for F
where
    F: FnMut(MapPosition) -> RoomRule,
{
    fn room(&mut self, room: MapPosition) -> Result<RoomRule, ProviderError> {
        Ok(self(room))
    }
}

/// Pre-materialised provider: a fixed table of cost matrices. Rooms absent
/// from the table are open.
#[derive(Debug, Clone, Default)]
pub struct FixedCostMatrices {
    matrices: HashMap<MapPosition, CostMatrix>,
}

impl FixedCostMatrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the matrix to use for `room`.
    pub fn insert(&mut self, room: MapPosition, matrix: CostMatrix) {
        self.matrices.insert(room, matrix);
    }
}

impl RoomProvider for FixedCostMatrices {
    fn room(&mut self, room: MapPosition) -> Result<RoomRule, ProviderError> {
        Ok(match self.matrices.get(&room) {
            Some(matrix) => RoomRule::Costs(matrix.clone()),
            None => RoomRule::Open,
        })
    }
}

// ---------------------------------------------------------------------------
// CostMatrix
// ---------------------------------------------------------------------------

/// A room's per-cell cost overrides: `0` defers to terrain, `255` is an
/// obstacle, anything else replaces the terrain cost outright.
#[derive(Clone)]
pub struct CostMatrix {
    bits: Box<[u8; ROOM_AREA]>,
}

impl CostMatrix {
    /// An all-zero matrix (every cell defers to terrain).
    pub fn new() -> Self {
        Self {
            bits: Box::new([0; ROOM_AREA]),
        }
    }

    /// Copy a serialised matrix. Returns `None` if `bits` holds fewer than
    /// [`ROOM_AREA`] entries; longer input is truncated.
    pub fn from_bits(bits: &[u8]) -> Option<Self> {
        if bits.len() < ROOM_AREA {
            return None;
        }
        let mut owned = Box::new([0u8; ROOM_AREA]);
        owned.copy_from_slice(&bits[..ROOM_AREA]);
        Some(Self { bits: owned })
    }

    /// Value for the cell at room-local `(x, y)`.
    #[inline]
    pub fn get(&self, x: u8, y: u8) -> u8 {
        self.bits[x as usize * 50 + y as usize]
    }

    /// Set the value for the cell at room-local `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: u8, y: u8, value: u8) {
        self.bits[x as usize * 50 + y as usize] = value;
    }
}

impl Default for CostMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CostMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostMatrix").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Materialised room
// ---------------------------------------------------------------------------

/// One slot of the per-search room table.
pub(crate) struct RoomEntry {
    pub(crate) terrain: Arc<TerrainData>,
    pub(crate) costs: Option<CostMatrix>,
    pub(crate) pos: MapPosition,
}
