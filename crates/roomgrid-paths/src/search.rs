//! The search driver: validation, the main loop, and path reconstruction.

use roomgrid_core::{TerrainStore, WorldPosition, ROOM_AREA};
use tracing::debug;

use crate::cost::LookTable;
use crate::finder::{PathFinder, PosIndex, Search};
use crate::options::{Goal, Outcome, SearchError, SearchOptions, SearchResult};
use crate::rooms::RoomProvider;

impl PathFinder {
    /// Find a least-cost path from `origin` to within range of one of the
    /// `goals` (or, in flee mode, away from all of them).
    ///
    /// `terrain` supplies room terrain; `provider` is consulted once per
    /// freshly-seen room and polled for cancellation. Running out of
    /// budget (`max_ops`, `max_cost`, or an exhausted frontier) is not an
    /// error: the result then carries `incomplete = true` and the path to
    /// the closest cell reached.
    pub fn search<P: RoomProvider + ?Sized>(
        &mut self,
        terrain: &TerrainStore,
        provider: &mut P,
        origin: WorldPosition,
        goals: &[Goal],
        options: &SearchOptions,
    ) -> Result<Outcome, SearchError> {
        options.validate()?;
        if !origin.in_world() {
            return Err(SearchError::InvalidArgument("origin is off the world grid"));
        }
        if goals.iter().any(|goal| !goal.pos.in_world()) {
            return Err(SearchError::InvalidArgument("goal is off the world grid"));
        }
        if self.in_use {
            return Err(SearchError::InUse);
        }

        self.in_use = true;
        let outcome = self.run(terrain, provider, origin, goals, options);
        self.in_use = false;
        outcome
    }

    fn run<P: RoomProvider + ?Sized>(
        &mut self,
        terrain: &TerrainStore,
        provider: &mut P,
        origin: WorldPosition,
        goals: &[Goal],
        options: &SearchOptions,
    ) -> Result<Outcome, SearchError> {
        self.reset(options.max_rooms);

        let mut search = Search {
            finder: self,
            terrain,
            provider,
            goals,
            look_table: LookTable::new(options.plain_cost, options.swamp_cost),
            flee: options.flee,
            heuristic_weight: options.heuristic_weight,
            max_rooms: options.max_rooms,
        };
        debug!(%origin, goals = goals.len(), flee = options.flee, "search starting");

        if search.heuristic(origin) == 0 {
            return Ok(Outcome::SamePosition);
        }
        match search.room_index_from_pos(origin.map_position()) {
            Ok(0) => return Ok(Outcome::InvalidStart),
            Ok(_) => {}
            // The origin's own room having no terrain is a start problem,
            // not an engine failure.
            Err(SearchError::MissingTerrain(_)) => return Ok(Outcome::InvalidStart),
            Err(err) => return Err(err),
        }

        let origin_index = search.index_of(origin)?;
        let mut min_node = origin_index;
        let mut min_node_h = u32::MAX;
        let mut min_node_g = 0;
        let mut ops_remaining = options.max_ops;

        search.expand(origin_index, origin, 0)?;

        while ops_remaining > 0 {
            let Some((index, f_cost)) = search.finder.heap.pop() else {
                break;
            };
            ops_remaining -= 1;
            search.finder.open_closed.close(index);

            let pos = search.pos_of_index(index);
            let h_cost = search.heuristic(pos);
            let g_cost =
                f_cost.saturating_sub((h_cost as f64 * search.heuristic_weight) as u32);

            if h_cost == 0 {
                min_node = index;
                min_node_h = 0;
                min_node_g = g_cost;
                break;
            }
            if h_cost < min_node_h {
                min_node = index;
                min_node_h = h_cost;
                min_node_g = g_cost;
            }
            // A collapsed heuristic (no goals to seek) can never reach 0.
            if h_cost == u32::MAX {
                break;
            }
            if g_cost as u64 + h_cost as u64 > options.max_cost as u64 {
                break;
            }

            search.jps(index, pos, g_cost)?;

            if search.provider.should_abort() {
                debug!("search interrupted");
                return Ok(Outcome::Interrupted);
            }
        }

        let path = search.reconstruct(origin, min_node)?;
        let result = SearchResult {
            path,
            ops: options.max_ops - ops_remaining,
            cost: min_node_g,
            incomplete: min_node_h != 0,
        };
        debug!(
            ops = result.ops,
            cost = result.cost,
            incomplete = result.incomplete,
            len = result.path.len(),
            "search finished"
        );
        Ok(Outcome::Path(result))
    }
}

impl<P: RoomProvider + ?Sized> Search<'_, P> {
    /// Walk the parent chain from `last` back to `origin`, interpolating
    /// between jump endpoints so consecutive emitted cells are adjacent.
    /// The path comes out in goal→origin order and excludes the origin.
    fn reconstruct(
        &self,
        origin: WorldPosition,
        last: PosIndex,
    ) -> Result<Vec<WorldPosition>, SearchError> {
        let mut path = Vec::new();
        // Parents form a tree rooted at the origin; anything longer than
        // the materialised cell count means the chain is corrupt.
        let budget = self.finder.rooms.len() * ROOM_AREA;
        let mut steps = 0;

        let mut index = last;
        let mut pos = self.pos_of_index(index);
        while pos != origin {
            path.push(pos);
            index = self.finder.parents[index as usize];
            let next = self.pos_of_index(index);
            if next.range_to(pos) > 1 {
                let Some(dir) = pos.direction_to(next) else {
                    return Err(SearchError::Internal("jump segment with no direction"));
                };
                loop {
                    pos = pos.step(dir);
                    path.push(pos);
                    if pos.range_to(next) <= 1 {
                        break;
                    }
                }
            }
            pos = next;
            steps += 1;
            if steps > budget {
                return Err(SearchError::Internal(
                    "parent chain failed to reach the origin",
                ));
            }
        }
        Ok(path)
    }
}
