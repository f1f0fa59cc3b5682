//! **roomgrid-paths** — shortest-path search over a lazily materialised
//! multi-room grid world.
//!
//! The engine answers queries of the form "from an origin cell, find a
//! least-cost path to within a given range of any of several goal cells"
//! (or, in flee mode, away from them) across a 256×256 map of 50×50-cell
//! rooms. It runs weighted A* with Jump-Point-Search successor generation:
//! straight and diagonal jumps skip over uniform-cost strips and only put
//! nodes on the open list where a forced neighbour or a cost-class change
//! makes a turn worthwhile. Rooms are materialised on first contact through
//! a caller-supplied [`RoomProvider`], which can also block rooms or lay
//! per-cell [`CostMatrix`] overrides on top of terrain.
//!
//! ```no_run
//! use roomgrid_core::{TerrainStore, WorldPosition};
//! use roomgrid_paths::{AllOpen, Goal, PathFinder, SearchOptions};
//!
//! let mut terrain = TerrainStore::new();
//! // ... terrain.load(...) ...
//! let origin = WorldPosition::in_room("W7N4".parse()?, 25, 25);
//! let goal = Goal::at(WorldPosition::in_room("W7N3".parse()?, 10, 10));
//!
//! let mut finder = PathFinder::new();
//! let outcome = finder.search(
//!     &terrain,
//!     &mut AllOpen,
//!     origin,
//!     &[goal],
//!     &SearchOptions::default(),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! | Module | Responsibility |
//! |---|---|
//! | [`cost`] | cell costs, the impassable sentinel, terrain cost table |
//! | [`rooms`] | room provider capability, cost matrices |
//! | [`options`] | goals, options, results, outcomes, errors |
//! | `heap`, `open_closed` | open-list internals |
//! | `finder` | caches, room table, cost lookup, heuristic, expansion |
//! | `jps` | jump routines and forced-neighbour rules |
//! | `search` | driver loop and path reconstruction |

pub mod cost;
mod finder;
mod heap;
mod jps;
mod open_closed;
pub mod options;
pub mod rooms;
mod search;

pub use cost::{Cost, OBSTACLE};
pub use finder::PathFinder;
pub use options::{Goal, Outcome, SearchError, SearchOptions, SearchResult, MAX_ROOMS};
pub use rooms::{
    AllOpen, CostMatrix, FixedCostMatrices, ProviderError, RoomProvider, RoomRule,
};
