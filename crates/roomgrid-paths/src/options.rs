//! Search requests and results: goals, options, outcomes, errors.

use roomgrid_core::{MapPosition, WorldPosition};
use thiserror::Error;

use crate::cost::{Cost, OBSTACLE};
use crate::rooms::ProviderError;

/// Largest number of rooms a single search may materialise.
pub const MAX_ROOMS: u8 = 64;

/// A search target: a position plus the Chebyshev radius at which it counts
/// as reached (or, in flee mode, the radius to escape from).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Goal {
    pub pos: WorldPosition,
    pub range: u32,
}

impl Goal {
    #[inline]
    pub const fn new(pos: WorldPosition, range: u32) -> Self {
        Self { pos, range }
    }

    /// A goal with range 0: the exact cell.
    #[inline]
    pub const fn at(pos: WorldPosition) -> Self {
        Self { pos, range: 0 }
    }
}

/// Tuning knobs for one search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Cost of entering a plain cell. At least 1.
    pub plain_cost: Cost,
    /// Cost of entering a swamp cell. At least 1.
    pub swamp_cost: Cost,
    /// Ceiling on materialised rooms, `1..=MAX_ROOMS`.
    pub max_rooms: u8,
    /// Expansion budget; the search returns its best-so-far path once spent.
    pub max_ops: u32,
    /// Cost ceiling; the search stops once the cheapest frontier estimate
    /// exceeds it.
    pub max_cost: u32,
    /// Flee mode: move away from the goals instead of toward them.
    pub flee: bool,
    /// Multiplier on the heuristic term (weighted A*). Values above 1 trade
    /// path optimality for speed.
    pub heuristic_weight: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            plain_cost: 1,
            swamp_cost: 5,
            max_rooms: 16,
            max_ops: 20_000,
            max_cost: u32::MAX,
            flee: false,
            heuristic_weight: 1.2,
        }
    }
}

impl SearchOptions {
    pub(crate) fn validate(&self) -> Result<(), SearchError> {
        if self.plain_cost == 0 || self.plain_cost == OBSTACLE {
            return Err(SearchError::InvalidArgument(
                "plain_cost must be in 1..OBSTACLE",
            ));
        }
        if self.swamp_cost == 0 || self.swamp_cost == OBSTACLE {
            return Err(SearchError::InvalidArgument(
                "swamp_cost must be in 1..OBSTACLE",
            ));
        }
        if self.max_rooms == 0 || self.max_rooms > MAX_ROOMS {
            return Err(SearchError::InvalidArgument("max_rooms must be in 1..=64"));
        }
        if self.max_ops == 0 {
            return Err(SearchError::InvalidArgument("max_ops must be at least 1"));
        }
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 1.0 {
            return Err(SearchError::InvalidArgument(
                "heuristic_weight must be finite and at least 1.0",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A found path and its accounting.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// Path cells in goal→origin order, origin excluded, interpolated so
    /// consecutive cells are adjacent.
    pub path: Vec<WorldPosition>,
    /// Nodes expanded (never exceeds `max_ops`).
    pub ops: u32,
    /// Accumulated movement cost of the path's far end.
    pub cost: u32,
    /// Whether the path ends short of every goal (budget or frontier ran
    /// out); the path then leads to the closest cell reached.
    pub incomplete: bool,
}

/// How a search ended, short of a hard error.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The search ran; inspect [`SearchResult::incomplete`] to see whether
    /// a goal was actually reached.
    Path(SearchResult),
    /// The origin already satisfies the goal condition; no path needed.
    SamePosition,
    /// The origin's room cannot be materialised (no terrain, blocked by the
    /// provider).
    InvalidStart,
    /// The provider's `should_abort` stopped the search.
    Interrupted,
}

impl Outcome {
    /// The result, when the search produced one.
    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            Outcome::Path(result) => Some(result),
            _ => None,
        }
    }

    /// Status code for foreign-function shims: `0` success (including
    /// [`SamePosition`](Outcome::SamePosition), which carries an empty
    /// path), `-2` invalid start, `-3` interrupted.
    pub fn code(&self) -> i32 {
        match self {
            Outcome::Path(_) | Outcome::SamePosition => 0,
            Outcome::InvalidStart => -2,
            Outcome::Interrupted => -3,
        }
    }
}

/// Hard failures. Budget exhaustion is not one of these; it yields
/// [`Outcome::Path`] with `incomplete` set.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A request parameter failed validation before the search began.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The search reached a room with no terrain loaded.
    #[error("no terrain data for room {0}")]
    MissingTerrain(MapPosition),
    /// The room provider failed.
    #[error("room provider failed for {room}: {source}")]
    Provider {
        room: MapPosition,
        source: ProviderError,
    },
    /// A search was started on an instance that is already searching.
    #[error("search instance already in use")]
    InUse,
    /// Engine invariant violation.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl SearchError {
    /// Status code for foreign-function shims: `-1` invalid argument,
    /// `-4` internal (missing terrain, provider failure), `-5` in use.
    pub fn code(&self) -> i32 {
        match self {
            SearchError::InvalidArgument(_) => -1,
            SearchError::MissingTerrain(_)
            | SearchError::Provider { .. }
            | SearchError::Internal(_) => -4,
            SearchError::InUse => -5,
        }
    }
}
