//! Jump-point successor generation.
//!
//! Instead of pushing all eight neighbours of every popped node, the search
//! jumps along straight and diagonal lines of uniform cost and only stops
//! where a *forced neighbour* appears: a cell orthogonal to the motion that
//! was impassable and opens up (or whose cost class changes), meaning an
//! optimal path could turn there. Room borders cut jumps short; portal
//! crossings fall back to plain expansion.
//!
//! The jump routines track the cost of the cells flanking the motion from
//! one step behind, so a transition is detected on the step where it
//! becomes visible.

use roomgrid_core::WorldPosition;

use crate::cost::{Cost, OBSTACLE};
use crate::finder::{PosIndex, Search};
use crate::options::SearchError;
use crate::rooms::RoomProvider;

/// Whether a coordinate sits on a room edge (offset 0 or 49).
#[inline]
fn is_border(v: u32) -> bool {
    v.wrapping_add(1) % 50 < 2
}

/// Whether a coordinate is within two cells of a room edge.
#[inline]
fn is_near_border(v: u32) -> bool {
    v.wrapping_add(2) % 50 < 4
}

impl<P: RoomProvider + ?Sized> Search<'_, P> {
    /// Generate successors of a popped node from the direction it was
    /// approached in.
    pub(crate) fn jps(
        &mut self,
        index: PosIndex,
        pos: WorldPosition,
        g_cost: u32,
    ) -> Result<(), SearchError> {
        let parent = self.pos_of_index(self.finder.parents[index as usize]);
        let dx: i32 = match pos.xx.cmp(&parent.xx) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        };
        let dy: i32 = match pos.yy.cmp(&parent.yy) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        };

        // On a border, moves are limited to the portal crossing in the
        // approach direction (three cells) or the single step back off the
        // edge; jumping is skipped entirely.
        let (ox, oy) = pos.room_offset();
        let mut portal = [pos; 3];
        let mut portal_len = 0;
        if ox == 0 {
            if dx == -1 {
                portal[0] = pos.offset(-1, 0);
                portal_len = 1;
            } else if dx == 1 {
                portal[0] = pos.offset(1, -1);
                portal[1] = pos.offset(1, 0);
                portal[2] = pos.offset(1, 1);
                portal_len = 3;
            }
        } else if ox == 49 {
            if dx == 1 {
                portal[0] = pos.offset(1, 0);
                portal_len = 1;
            } else if dx == -1 {
                portal[0] = pos.offset(-1, -1);
                portal[1] = pos.offset(-1, 0);
                portal[2] = pos.offset(-1, 1);
                portal_len = 3;
            }
        } else if oy == 0 {
            if dy == -1 {
                portal[0] = pos.offset(0, -1);
                portal_len = 1;
            } else if dy == 1 {
                portal[0] = pos.offset(-1, 1);
                portal[1] = pos.offset(0, 1);
                portal[2] = pos.offset(1, 1);
                portal_len = 3;
            }
        } else if oy == 49 {
            if dy == 1 {
                portal[0] = pos.offset(0, 1);
                portal_len = 1;
            } else if dy == -1 {
                portal[0] = pos.offset(-1, -1);
                portal[1] = pos.offset(0, -1);
                portal[2] = pos.offset(1, -1);
                portal_len = 3;
            }
        }
        if portal_len != 0 {
            for ii in 0..portal_len {
                let neighbor = portal[ii];
                let n_cost = self.look(neighbor)?;
                if n_cost == OBSTACLE {
                    continue;
                }
                self.push_node(index, neighbor, g_cost + n_cost as u32)?;
            }
            return Ok(());
        }

        // Within one cell of a border, jumps toward it are pointless; such
        // neighbours get pushed directly below.
        let border_dx: i32 = match ox {
            1 => -1,
            48 => 1,
            _ => 0,
        };
        let border_dy: i32 = match oy {
            1 => -1,
            48 => 1,
            _ => 0,
        };

        let cost = self.look(pos)?;

        // Natural continuation along each moving axis.
        if dx != 0 {
            let neighbor = pos.offset(dx, 0);
            let n_cost = self.look(neighbor)?;
            if n_cost != OBSTACLE {
                if border_dy == 0 {
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                } else {
                    self.push_node(index, neighbor, g_cost + n_cost as u32)?;
                }
            }
        }
        if dy != 0 {
            let neighbor = pos.offset(0, dy);
            let n_cost = self.look(neighbor)?;
            if n_cost != OBSTACLE {
                if border_dx == 0 {
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                } else {
                    self.push_node(index, neighbor, g_cost + n_cost as u32)?;
                }
            }
        }

        // Forced-neighbour candidates.
        if dx != 0 {
            if dy != 0 {
                // Moving diagonally.
                let neighbor = pos.offset(dx, dy);
                let n_cost = self.look(neighbor)?;
                if n_cost != OBSTACLE {
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                }
                if self.look(pos.offset(-dx, 0))? != cost {
                    let neighbor = pos.offset(-dx, dy);
                    let n_cost = self.look(neighbor)?;
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                }
                if self.look(pos.offset(0, -dy))? != cost {
                    let neighbor = pos.offset(dx, -dy);
                    let n_cost = self.look(neighbor)?;
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                }
            } else {
                // Moving along x.
                if border_dy == 1 || self.look(pos.offset(0, 1))? != cost {
                    let neighbor = pos.offset(dx, 1);
                    let n_cost = self.look(neighbor)?;
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                }
                if border_dy == -1 || self.look(pos.offset(0, -1))? != cost {
                    let neighbor = pos.offset(dx, -1);
                    let n_cost = self.look(neighbor)?;
                    self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
                }
            }
        } else {
            // Moving along y.
            if border_dx == 1 || self.look(pos.offset(1, 0))? != cost {
                let neighbor = pos.offset(1, dy);
                let n_cost = self.look(neighbor)?;
                self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
            }
            if border_dx == -1 || self.look(pos.offset(-1, 0))? != cost {
                let neighbor = pos.offset(-1, dy);
                let n_cost = self.look(neighbor)?;
                self.jump_neighbor(pos, index, neighbor, g_cost, cost, n_cost)?;
            }
        }
        Ok(())
    }

    /// Probe one successor candidate: jump from it when it shares the
    /// node's cost class and is clear of borders, push it directly
    /// otherwise.
    fn jump_neighbor(
        &mut self,
        pos: WorldPosition,
        index: PosIndex,
        neighbor: WorldPosition,
        g_cost: u32,
        cost: Cost,
        n_cost: Cost,
    ) -> Result<(), SearchError> {
        if n_cost != cost || is_border(neighbor.xx) || is_border(neighbor.yy) {
            if n_cost == OBSTACLE {
                return Ok(());
            }
            self.push_node(index, neighbor, g_cost + n_cost as u32)
        } else {
            let dx = (neighbor.xx as i64 - pos.xx as i64) as i32;
            let dy = (neighbor.yy as i64 - pos.yy as i64) as i32;
            let Some(end) = self.jump(n_cost, neighbor, dx, dy)? else {
                return Ok(());
            };
            let end_cost = self.look(end)? as u32;
            self.push_node(
                index,
                end,
                g_cost + n_cost as u32 * (pos.range_to(end) - 1) + end_cost,
            )
        }
    }

    /// Dispatch to the straight or diagonal jump for `(dx, dy)`.
    pub(crate) fn jump(
        &mut self,
        cost: Cost,
        pos: WorldPosition,
        dx: i32,
        dy: i32,
    ) -> Result<Option<WorldPosition>, SearchError> {
        if dx != 0 {
            if dy != 0 {
                self.jump_xy(cost, pos, dx, dy)
            } else {
                self.jump_x(cost, pos, dx)
            }
        } else {
            self.jump_y(cost, pos, dy)
        }
    }

    /// Jump along the x axis over a uniform-cost strip. Returns the stop
    /// cell, or `None` if the strip dead-ends in an obstacle.
    pub(crate) fn jump_x(
        &mut self,
        cost: Cost,
        mut pos: WorldPosition,
        dx: i32,
    ) -> Result<Option<WorldPosition>, SearchError> {
        let mut prev_cost_u = self.look(pos.offset(0, -1))?;
        let mut prev_cost_d = self.look(pos.offset(0, 1))?;
        loop {
            if self.heuristic(pos) == 0 || is_near_border(pos.xx) {
                break;
            }

            let cost_u = self.look(pos.offset(dx, -1))?;
            let cost_d = self.look(pos.offset(dx, 1))?;
            if (cost_u != OBSTACLE && prev_cost_u != cost)
                || (cost_d != OBSTACLE && prev_cost_d != cost)
            {
                break;
            }
            prev_cost_u = cost_u;
            prev_cost_d = cost_d;
            pos = pos.offset(dx, 0);

            let jump_cost = self.look(pos)?;
            if jump_cost == OBSTACLE {
                return Ok(None);
            }
            if jump_cost != cost {
                break;
            }
        }
        Ok(Some(pos))
    }

    /// Jump along the y axis; mirror of [`jump_x`](Self::jump_x).
    pub(crate) fn jump_y(
        &mut self,
        cost: Cost,
        mut pos: WorldPosition,
        dy: i32,
    ) -> Result<Option<WorldPosition>, SearchError> {
        let mut prev_cost_l = self.look(pos.offset(-1, 0))?;
        let mut prev_cost_r = self.look(pos.offset(1, 0))?;
        loop {
            if self.heuristic(pos) == 0 || is_near_border(pos.yy) {
                break;
            }

            let cost_l = self.look(pos.offset(-1, dy))?;
            let cost_r = self.look(pos.offset(1, dy))?;
            if (cost_l != OBSTACLE && prev_cost_l != cost)
                || (cost_r != OBSTACLE && prev_cost_r != cost)
            {
                break;
            }
            prev_cost_l = cost_l;
            prev_cost_r = cost_r;
            pos = pos.offset(0, dy);

            let jump_cost = self.look(pos)?;
            if jump_cost == OBSTACLE {
                return Ok(None);
            }
            if jump_cost != cost {
                break;
            }
        }
        Ok(Some(pos))
    }

    /// Diagonal jump. Yields as soon as either component straight jump
    /// from the next cell would succeed, so straight successors are always
    /// expanded from a pushed node rather than skipped over.
    pub(crate) fn jump_xy(
        &mut self,
        cost: Cost,
        mut pos: WorldPosition,
        dx: i32,
        dy: i32,
    ) -> Result<Option<WorldPosition>, SearchError> {
        let mut prev_cost_x = self.look(pos.offset(-dx, 0))?;
        let mut prev_cost_y = self.look(pos.offset(0, -dy))?;
        loop {
            if self.heuristic(pos) == 0
                || is_near_border(pos.xx)
                || is_near_border(pos.yy)
            {
                break;
            }

            if (self.look(pos.offset(-dx, dy))? != OBSTACLE && prev_cost_x != cost)
                || (self.look(pos.offset(dx, -dy))? != OBSTACLE && prev_cost_y != cost)
            {
                break;
            }
            prev_cost_x = self.look(pos.offset(0, dy))?;
            prev_cost_y = self.look(pos.offset(dx, 0))?;
            if (prev_cost_y != OBSTACLE
                && self.jump_x(cost, pos.offset(dx, 0), dx)?.is_some())
                || (prev_cost_x != OBSTACLE
                    && self.jump_y(cost, pos.offset(0, dy), dy)?.is_some())
            {
                break;
            }

            pos = pos.offset(dx, dy);

            let jump_cost = self.look(pos)?;
            if jump_cost == OBSTACLE {
                return Ok(None);
            }
            if jump_cost != cost {
                break;
            }
        }
        Ok(Some(pos))
    }
}
