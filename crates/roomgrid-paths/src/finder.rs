//! The search engine's state: reusable caches, the per-search context, room
//! materialisation and the basic expansion primitives.
//!
//! [`PathFinder`] owns every buffer a search needs (room table, open/closed
//! marks, heap, parent array) and reuses them across searches, so repeated
//! queries incur no allocations after warm-up. [`Search`] borrows those
//! buffers together with the terrain store and the room provider for the
//! duration of one query; the jump and driver routines are implemented on
//! it in the sibling modules.

use std::collections::HashSet;

use roomgrid_core::{Direction, MapPosition, TerrainStore, WorldPosition, ROOM_AREA};
use tracing::{debug, trace};

use crate::cost::{Cost, LookTable, OBSTACLE};
use crate::heap::OpenHeap;
use crate::open_closed::OpenClosed;
use crate::options::{Goal, SearchError};
use crate::rooms::{RoomEntry, RoomProvider, RoomRule};

/// Dense index of a cell among materialised rooms:
/// `slot * 2500 + x * 50 + y`. Stable only within a single search.
pub(crate) type PosIndex = u32;

/// Reusable shortest-path searcher.
///
/// A `PathFinder` is cheap to keep around: all internal buffers are cleared
/// and reused by each call to [`search`](PathFinder::search). It is
/// single-threaded and non-reentrant; a second search started through the
/// same instance while one is running is reported as an error.
pub struct PathFinder {
    /// Materialised rooms, in materialisation order.
    pub(crate) rooms: Vec<RoomEntry>,
    /// Map id → room slot + 1, or 0 when not materialised.
    pub(crate) reverse_rooms: Vec<u8>,
    /// Rooms the provider closed off this search.
    pub(crate) blocked_rooms: HashSet<MapPosition>,
    pub(crate) open_closed: OpenClosed,
    pub(crate) heap: OpenHeap,
    pub(crate) parents: Vec<PosIndex>,
    pub(crate) in_use: bool,
}

impl PathFinder {
    /// Create a searcher with empty caches.
    pub fn new() -> Self {
        Self {
            rooms: Vec::new(),
            reverse_rooms: vec![0; 1 << 16],
            blocked_rooms: HashSet::new(),
            open_closed: OpenClosed::new(),
            heap: OpenHeap::new(),
            parents: Vec::new(),
            in_use: false,
        }
    }

    /// Reset all transient state for a search over at most `max_rooms`
    /// rooms.
    pub(crate) fn reset(&mut self, max_rooms: u8) {
        for room in self.rooms.drain(..) {
            self.reverse_rooms[room.pos.id() as usize] = 0;
        }
        self.blocked_rooms.clear();
        let capacity = max_rooms as usize * ROOM_AREA;
        self.open_closed.clear(capacity);
        self.heap.clear(capacity);
        if self.parents.len() < capacity {
            self.parents.resize(capacity, 0);
        }
    }
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Per-search context
// ---------------------------------------------------------------------------

/// Everything one query needs: the finder's buffers plus the borrowed
/// terrain store, provider and parameters.
pub(crate) struct Search<'a, P: RoomProvider + ?Sized> {
    pub(crate) finder: &'a mut PathFinder,
    pub(crate) terrain: &'a TerrainStore,
    pub(crate) provider: &'a mut P,
    pub(crate) goals: &'a [Goal],
    pub(crate) look_table: LookTable,
    pub(crate) flee: bool,
    pub(crate) heuristic_weight: f64,
    pub(crate) max_rooms: u8,
}

impl<P: RoomProvider + ?Sized> Search<'_, P> {
    /// Slot + 1 of the room at `map_pos`, materialising it on first sight.
    ///
    /// Returns 0 when the room is unavailable: the table is full, or the
    /// provider blocked the room (memoised either way). Missing terrain is
    /// a hard error.
    pub(crate) fn room_index_from_pos(
        &mut self,
        map_pos: MapPosition,
    ) -> Result<u8, SearchError> {
        let slot = self.finder.reverse_rooms[map_pos.id() as usize];
        if slot != 0 {
            return Ok(slot);
        }
        if self.finder.rooms.len() >= self.max_rooms as usize {
            trace!(room = %map_pos, "room limit reached");
            return Ok(0);
        }
        if self.finder.blocked_rooms.contains(&map_pos) {
            return Ok(0);
        }
        let Some(terrain) = self.terrain.get(map_pos) else {
            return Err(SearchError::MissingTerrain(map_pos));
        };
        let rule = self
            .provider
            .room(map_pos)
            .map_err(|source| SearchError::Provider {
                room: map_pos,
                source,
            })?;
        let costs = match rule {
            RoomRule::Blocked => {
                debug!(room = %map_pos, "room blocked by provider");
                self.finder.blocked_rooms.insert(map_pos);
                return Ok(0);
            }
            RoomRule::Open => None,
            RoomRule::Costs(matrix) => Some(matrix),
        };
        trace!(room = %map_pos, slot = self.finder.rooms.len(), "materialised room");
        self.finder.rooms.push(RoomEntry {
            terrain: terrain.clone(),
            costs,
            pos: map_pos,
        });
        let slot = self.finder.rooms.len() as u8;
        self.finder.reverse_rooms[map_pos.id() as usize] = slot;
        Ok(slot)
    }

    /// Dense index of `pos`. The room must be materialisable; callers
    /// guarantee this by looking the cell up first.
    pub(crate) fn index_of(&mut self, pos: WorldPosition) -> Result<PosIndex, SearchError> {
        let slot = self.room_index_from_pos(pos.map_position())?;
        if slot == 0 {
            return Err(SearchError::Internal(
                "position index requested for an unavailable room",
            ));
        }
        let (x, y) = pos.room_offset();
        Ok((slot as u32 - 1) * ROOM_AREA as u32 + x as u32 * 50 + y as u32)
    }

    /// Inverse of [`index_of`](Self::index_of) for materialised indices.
    pub(crate) fn pos_of_index(&self, index: PosIndex) -> WorldPosition {
        let room = &self.finder.rooms[(index as usize) / ROOM_AREA];
        let coord = index % ROOM_AREA as u32;
        WorldPosition::new(
            coord / 50 + room.pos.xx as u32 * 50,
            coord % 50 + room.pos.yy as u32 * 50,
        )
    }

    /// Cost of stepping onto `pos`: cost-matrix override first, then the
    /// terrain baseline. Unavailable rooms and out-of-world coordinates
    /// resolve to [`OBSTACLE`].
    pub(crate) fn look(&mut self, pos: WorldPosition) -> Result<Cost, SearchError> {
        if !pos.in_world() {
            return Ok(OBSTACLE);
        }
        let slot = self.room_index_from_pos(pos.map_position())?;
        if slot == 0 {
            return Ok(OBSTACLE);
        }
        let room = &self.finder.rooms[slot as usize - 1];
        let (x, y) = pos.room_offset();
        if let Some(matrix) = &room.costs {
            let value = matrix.get(x, y);
            if value != 0 {
                return Ok(if value == 0xff { OBSTACLE } else { value as Cost });
            }
        }
        Ok(self.look_table.cost(room.terrain.class(x, y)))
    }

    /// Chebyshev goal heuristic.
    ///
    /// Seek mode: distance to the closest goal's acceptance radius, 0 iff
    /// within range of some goal (the collapsed `u32::MAX` with no goals).
    /// Flee mode: deepest intrusion into any goal's radius, 0 iff outside
    /// all of them.
    pub(crate) fn heuristic(&self, pos: WorldPosition) -> u32 {
        if self.flee {
            let mut ret = 0;
            for goal in self.goals {
                let dist = pos.range_to(goal.pos);
                if dist < goal.range {
                    ret = ret.max(goal.range - dist);
                }
            }
            ret
        } else {
            let mut ret = u32::MAX;
            for goal in self.goals {
                let dist = pos.range_to(goal.pos);
                if dist > goal.range {
                    ret = ret.min(dist - goal.range);
                } else {
                    ret = 0;
                }
            }
            ret
        }
    }

    /// Push `node` onto the open list with accumulated cost `g_cost`, or
    /// lower its priority if it is already open and this route is cheaper.
    pub(crate) fn push_node(
        &mut self,
        parent_index: PosIndex,
        node: WorldPosition,
        g_cost: u32,
    ) -> Result<(), SearchError> {
        let index = self.index_of(node)?;
        if self.finder.open_closed.is_closed(index) {
            return Ok(());
        }
        let h_cost = (self.heuristic(node) as f64 * self.heuristic_weight) as u32;
        let f_cost = g_cost.saturating_add(h_cost);

        if self.finder.open_closed.is_open(index) {
            if self.finder.heap.priority(index) > f_cost {
                self.finder.heap.update(index, f_cost);
                self.finder.parents[index as usize] = parent_index;
            }
        } else {
            self.finder.heap.insert(index, f_cost);
            self.finder.open_closed.open(index);
            self.finder.parents[index as usize] = parent_index;
        }
        Ok(())
    }

    /// Plain 8-neighbour expansion, used to seed the search at the origin
    /// and to cross room borders.
    ///
    /// A cell on a room edge is a portal: moving along the edge is illegal,
    /// and a crossing must land on the adjacent row or column of the
    /// neighbouring room, never wrap to the opposite edge diagonally.
    pub(crate) fn expand(
        &mut self,
        index: PosIndex,
        pos: WorldPosition,
        g_cost: u32,
    ) -> Result<(), SearchError> {
        let (ox, oy) = pos.room_offset();
        for dir in Direction::ALL {
            let neighbor = pos.step(dir);

            if ox == 0 {
                if neighbor.xx % 50 == 49 && pos.yy != neighbor.yy {
                    continue;
                }
                if pos.xx == neighbor.xx {
                    continue;
                }
            } else if ox == 49 {
                if neighbor.xx % 50 == 0 && pos.yy != neighbor.yy {
                    continue;
                }
                if pos.xx == neighbor.xx {
                    continue;
                }
            } else if oy == 0 {
                if neighbor.yy % 50 == 49 && pos.xx != neighbor.xx {
                    continue;
                }
                if pos.yy == neighbor.yy {
                    continue;
                }
            } else if oy == 49 {
                if neighbor.yy % 50 == 0 && pos.xx != neighbor.xx {
                    continue;
                }
                if pos.yy == neighbor.yy {
                    continue;
                }
            }

            let n_cost = self.look(neighbor)?;
            if n_cost == OBSTACLE {
                continue;
            }
            self.push_node(index, neighbor, g_cost + n_cost as u32)?;
        }
        Ok(())
    }
}
