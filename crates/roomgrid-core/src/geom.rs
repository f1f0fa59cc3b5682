//! Geometry primitives: [`MapPosition`], [`WorldPosition`] and [`Direction`].
//!
//! The world is a 256×256 map of rooms, each room a 50×50 tile of cells, for
//! a 12800×12800 global cell grid. A [`MapPosition`] addresses a room on the
//! map; a [`WorldPosition`] addresses a single cell on the global grid.

use std::fmt;

/// Cells per room edge.
pub const ROOM_SIZE: u32 = 50;
/// Cells per room.
pub const ROOM_AREA: usize = (ROOM_SIZE * ROOM_SIZE) as usize;
/// Rooms per map edge.
pub const MAP_SIZE: u32 = 256;
/// Cells per world edge (`ROOM_SIZE * MAP_SIZE`).
pub const WORLD_SIZE: u32 = ROOM_SIZE * MAP_SIZE;

// ---------------------------------------------------------------------------
// MapPosition
// ---------------------------------------------------------------------------

/// The coordinate of a room on the 256×256 world map.
///
/// Parsed from and displayed as a room name such as `"W7N4"` (see
/// [`room_name`](crate::room_name)).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapPosition {
    pub xx: u8,
    pub yy: u8,
}

impl MapPosition {
    /// Create a new map position.
    #[inline]
    pub const fn new(xx: u8, yy: u8) -> Self {
        Self { xx, yy }
    }

    /// Dense map identifier: `yy * 256 + xx`.
    #[inline]
    pub const fn id(self) -> u16 {
        (self.yy as u16) << 8 | self.xx as u16
    }

    /// Inverse of [`id`](Self::id).
    #[inline]
    pub const fn from_id(id: u16) -> Self {
        Self {
            xx: (id & 0xff) as u8,
            yy: (id >> 8) as u8,
        }
    }
}

// ---------------------------------------------------------------------------
// WorldPosition
// ---------------------------------------------------------------------------

/// An absolute cell coordinate on the 12800×12800 global grid.
///
/// X grows east, Y grows south. Stepping off the edge of the world wraps the
/// unsigned coordinates; such positions fail [`in_world`](Self::in_world) and
/// are treated as impassable by the engine, never dereferenced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPosition {
    pub xx: u32,
    pub yy: u32,
}

impl WorldPosition {
    /// Create a new world position from absolute cell coordinates.
    #[inline]
    pub const fn new(xx: u32, yy: u32) -> Self {
        Self { xx, yy }
    }

    /// The cell at room-local offset `(x, y)` of `room`. `x` and `y` must be
    /// below [`ROOM_SIZE`].
    #[inline]
    pub const fn in_room(room: MapPosition, x: u8, y: u8) -> Self {
        Self {
            xx: room.xx as u32 * ROOM_SIZE + x as u32,
            yy: room.yy as u32 * ROOM_SIZE + y as u32,
        }
    }

    /// Whether the position lies on the global grid.
    #[inline]
    pub const fn in_world(self) -> bool {
        self.xx < WORLD_SIZE && self.yy < WORLD_SIZE
    }

    /// The room this cell belongs to. Callers must check
    /// [`in_world`](Self::in_world) first.
    #[inline]
    pub fn map_position(self) -> MapPosition {
        debug_assert!(self.in_world());
        MapPosition::new((self.xx / ROOM_SIZE) as u8, (self.yy / ROOM_SIZE) as u8)
    }

    /// Room-local `(x, y)` offset, each in `[0, 50)`.
    #[inline]
    pub const fn room_offset(self) -> (u8, u8) {
        ((self.xx % ROOM_SIZE) as u8, (self.yy % ROOM_SIZE) as u8)
    }

    /// Chebyshev (L∞) distance to `other`.
    #[inline]
    pub const fn range_to(self, other: Self) -> u32 {
        let dx = self.xx.abs_diff(other.xx);
        let dy = self.yy.abs_diff(other.yy);
        if dx > dy { dx } else { dy }
    }

    /// The position shifted by `(dx, dy)`, wrapping at the world edge.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            xx: self.xx.wrapping_add_signed(dx),
            yy: self.yy.wrapping_add_signed(dy),
        }
    }

    /// The adjacent position in `dir`, wrapping at the world edge.
    #[inline]
    pub const fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    /// The primary direction toward `other`, or `None` for the same cell.
    ///
    /// Diagonal whenever both axes differ, regardless of how far.
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        let dx = (other.xx as i64 - self.xx as i64).signum();
        let dy = (other.yy as i64 - self.yy as i64).signum();
        match (dx, dy) {
            (0, -1) => Some(Direction::Top),
            (1, -1) => Some(Direction::TopRight),
            (1, 0) => Some(Direction::Right),
            (1, 1) => Some(Direction::BottomRight),
            (0, 1) => Some(Direction::Bottom),
            (-1, 1) => Some(Direction::BottomLeft),
            (-1, 0) => Some(Direction::Left),
            (-1, -1) => Some(Direction::TopLeft),
            _ => None,
        }
    }
}

impl fmt::Display for WorldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_world() {
            let (x, y) = self.room_offset();
            write!(f, "[{},{} {}]", x, y, self.map_position())
        } else {
            write!(f, "[world {},{}]", self.xx, self.yy)
        }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the eight compass directions. Discriminants start at 1, matching
/// the conventional wire encoding (`Top = 1` … `TopLeft = 8`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
    TopLeft = 8,
}

impl Direction {
    /// All eight directions in discriminant order. Expansion follows this
    /// order, which makes tie-breaking deterministic.
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// The `(dx, dy)` step for this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
        }
    }
}
