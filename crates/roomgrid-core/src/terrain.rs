//! Static terrain: per-cell classes, packed room blobs and the world-wide
//! terrain store.
//!
//! Every room ships a 2500-byte blob holding one terrain class per cell,
//! packed two cells per byte (low nibble first). The nibble for cell
//! `(x, y)` sits at nibble index `y * 50 + x`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::geom::{MapPosition, ROOM_AREA};

/// Bytes per room terrain blob.
pub const TERRAIN_BYTES: usize = ROOM_AREA;

/// Terrain class of a single cell.
///
/// Decoded from the low two bits of the cell's nibble; the reserved value
/// `3` decodes as `Wall`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Terrain {
    Plain = 0,
    Wall = 1,
    Swamp = 2,
}

impl Terrain {
    /// Decode a packed 2-bit terrain code.
    #[inline]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x03 {
            0 => Terrain::Plain,
            2 => Terrain::Swamp,
            _ => Terrain::Wall,
        }
    }
}

// ---------------------------------------------------------------------------
// TerrainData
// ---------------------------------------------------------------------------

/// An engine-owned copy of one room's terrain blob.
pub struct TerrainData {
    bits: Box<[u8; TERRAIN_BYTES]>,
}

impl TerrainData {
    /// Copy a blob into engine-owned storage. Returns `None` if `bits` is
    /// shorter than [`TERRAIN_BYTES`]; longer input is truncated.
    pub fn from_bits(bits: &[u8]) -> Option<Self> {
        if bits.len() < TERRAIN_BYTES {
            return None;
        }
        let mut owned = Box::new([0u8; TERRAIN_BYTES]);
        owned.copy_from_slice(&bits[..TERRAIN_BYTES]);
        Some(Self { bits: owned })
    }

    /// Terrain class of the cell at room-local `(x, y)`.
    #[inline]
    pub fn class(&self, x: u8, y: u8) -> Terrain {
        let index = y as usize * 50 + x as usize;
        let byte = self.bits[index / 2];
        let code = if index % 2 == 0 { byte & 0x0f } else { byte >> 4 };
        Terrain::from_code(code)
    }
}

// ---------------------------------------------------------------------------
// TerrainStore
// ---------------------------------------------------------------------------

/// The world-wide terrain table: room → terrain blob.
///
/// Read-shared during a search (materialised rooms hold [`Arc`] clones of
/// the blobs), so a store must not be reloaded while a search is running.
#[derive(Default)]
pub struct TerrainStore {
    rooms: HashMap<u16, Arc<TerrainData>>,
}

impl TerrainStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load terrain for a set of rooms, fully replacing any prior state.
    /// Entries with blobs shorter than [`TERRAIN_BYTES`] are skipped.
    pub fn load<'a, I>(&mut self, rooms: I)
    where
        I: IntoIterator<Item = (MapPosition, &'a [u8])>,
    {
        self.rooms.clear();
        for (pos, bits) in rooms {
            if let Some(data) = TerrainData::from_bits(bits) {
                self.rooms.insert(pos.id(), Arc::new(data));
            }
        }
    }

    /// Terrain for `pos`, if loaded.
    #[inline]
    pub fn get(&self, pos: MapPosition) -> Option<&Arc<TerrainData>> {
        self.rooms.get(&pos.id())
    }

    /// Number of rooms with terrain loaded.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no terrain is loaded.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
