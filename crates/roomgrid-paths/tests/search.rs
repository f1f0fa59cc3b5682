//! End-to-end driver scenarios.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomgrid_core::{MapPosition, Terrain, TerrainStore, WorldPosition, TERRAIN_BYTES};
use roomgrid_paths::{
    AllOpen, CostMatrix, FixedCostMatrices, Goal, Outcome, PathFinder, ProviderError,
    RoomProvider, RoomRule, SearchError, SearchOptions, SearchResult,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn blob(cells: &[(u8, u8, Terrain)]) -> Vec<u8> {
    let mut bits = vec![0u8; TERRAIN_BYTES];
    for &(x, y, terrain) in cells {
        let index = y as usize * 50 + x as usize;
        bits[index / 2] |= (terrain as u8) << ((index % 2) * 4);
    }
    bits
}

fn store_with(rooms: &[(&str, Vec<u8>)]) -> TerrainStore {
    let mut store = TerrainStore::new();
    store.load(
        rooms
            .iter()
            .map(|(name, bits)| (name.parse().unwrap(), bits.as_slice())),
    );
    store
}

fn plain_store(rooms: &[&str]) -> TerrainStore {
    let entries: Vec<(&str, Vec<u8>)> = rooms.iter().map(|name| (*name, blob(&[]))).collect();
    store_with(&entries)
}

fn at(room: &str, x: u8, y: u8) -> WorldPosition {
    let room: MapPosition = room.parse().unwrap();
    WorldPosition::in_room(room, x, y)
}

fn found(outcome: Outcome) -> SearchResult {
    match outcome {
        Outcome::Path(result) => result,
        other => panic!("expected a path, got {other:?}"),
    }
}

/// Path cells come out in goal→origin order; walking them back from the
/// origin must advance exactly one step at a time.
fn assert_step_chain(origin: WorldPosition, path: &[WorldPosition]) {
    let mut prev = origin;
    for &cell in path.iter().rev() {
        assert_eq!(
            prev.range_to(cell),
            1,
            "{prev} -> {cell} is not a single step"
        );
        prev = cell;
    }
}

// ---------------------------------------------------------------------------
// Basic seek behaviour
// ---------------------------------------------------------------------------

#[test]
fn two_step_path_to_an_adjacent_goal() {
    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 25, 25);
    let goal = at("W0N0", 25, 27);
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                origin,
                &[Goal::at(goal)],
                &SearchOptions::default(),
            )
            .unwrap(),
    );

    assert!(!result.incomplete);
    assert_eq!(result.path.len(), 2);
    assert_eq!(result.path[0], goal);
    assert_eq!(result.cost, 2);
    assert!(result.ops >= 1);
    assert_step_chain(origin, &result.path);
}

#[test]
fn origin_inside_goal_range_is_same_position() {
    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 25, 25);
    let mut finder = PathFinder::new();
    let outcome = finder
        .search(
            &store,
            &mut AllOpen,
            origin,
            &[Goal::at(origin)],
            &SearchOptions::default(),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::SamePosition);
    assert_eq!(outcome.code(), 0);
}

#[test]
fn closest_of_several_goals_wins() {
    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 25, 25);
    let near = at("W0N0", 28, 25);
    let far = at("W0N0", 40, 25);
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                origin,
                &[Goal::at(far), Goal::at(near)],
                &SearchOptions::default(),
            )
            .unwrap(),
    );
    assert!(!result.incomplete);
    assert_eq!(result.path[0], near);
    assert_eq!(result.cost, 3);
    assert_step_chain(origin, &result.path);
}

#[test]
fn no_goals_terminates_on_the_first_pop() {
    let store = plain_store(&["W0N0"]);
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                at("W0N0", 25, 25),
                &[],
                &SearchOptions::default(),
            )
            .unwrap(),
    );
    assert!(result.incomplete);
    assert!(result.path.is_empty());
    assert_eq!(result.ops, 1);
    assert_eq!(result.cost, 0);
}

// ---------------------------------------------------------------------------
// Flee mode
// ---------------------------------------------------------------------------

#[test]
fn flee_escapes_the_goal_radius() {
    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 25, 25);
    let options = SearchOptions {
        flee: true,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(&store, &mut AllOpen, origin, &[Goal::new(origin, 5)], &options)
            .unwrap(),
    );
    assert!(!result.incomplete);
    assert!(!result.path.is_empty());
    assert!(result.path[0].range_to(origin) >= 5);
    assert_step_chain(origin, &result.path);
}

#[test]
fn flee_with_no_goals_is_already_safe() {
    let store = plain_store(&["W0N0"]);
    let options = SearchOptions {
        flee: true,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let outcome = finder
        .search(&store, &mut AllOpen, at("W0N0", 25, 25), &[], &options)
        .unwrap();
    assert_eq!(outcome, Outcome::SamePosition);
}

// ---------------------------------------------------------------------------
// Rooms: materialisation, limits, blocking, missing terrain
// ---------------------------------------------------------------------------

#[test]
fn absent_origin_room_is_an_invalid_start() {
    let store = TerrainStore::new();
    let mut finder = PathFinder::new();
    let outcome = finder
        .search(
            &store,
            &mut AllOpen,
            at("W0N0", 25, 25),
            &[Goal::at(at("W0N0", 30, 25))],
            &SearchOptions::default(),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::InvalidStart);
    assert_eq!(outcome.code(), -2);
}

#[test]
fn blocked_origin_room_is_an_invalid_start() {
    let store = plain_store(&["W0N0"]);
    let mut provider = |_room: MapPosition| RoomRule::Blocked;
    let mut finder = PathFinder::new();
    let outcome = finder
        .search(
            &store,
            &mut provider,
            at("W0N0", 25, 25),
            &[Goal::at(at("W0N0", 30, 25))],
            &SearchOptions::default(),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::InvalidStart);
}

#[test]
fn reaching_a_room_with_no_terrain_fails_hard() {
    // Only the origin room is loaded; expanding across its eastern border
    // asks for E0N0 and finds nothing.
    let store = plain_store(&["W0N0"]);
    let absent: MapPosition = "E0N0".parse().unwrap();
    let mut finder = PathFinder::new();
    let err = finder
        .search(
            &store,
            &mut AllOpen,
            at("W0N0", 45, 25),
            &[Goal::at(at("E0N0", 25, 25))],
            &SearchOptions::default(),
        )
        .unwrap_err();
    match err {
        SearchError::MissingTerrain(room) => assert_eq!(room, absent),
        other => panic!("expected missing terrain, got {other:?}"),
    }
    assert_eq!(err.code(), -4);
}

#[test]
fn room_limit_keeps_the_search_at_home() {
    // With max_rooms = 1 the unloaded neighbour is never consulted: the
    // border acts as a wall and the search settles for its best cell.
    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 45, 25);
    let options = SearchOptions {
        max_rooms: 1,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                origin,
                &[Goal::at(at("E0N0", 25, 25))],
                &options,
            )
            .unwrap(),
    );
    assert!(result.incomplete);
    assert!(!result.path.is_empty());
    let home: MapPosition = "W0N0".parse().unwrap();
    for cell in &result.path {
        assert_eq!(cell.map_position(), home);
    }
    assert_step_chain(origin, &result.path);
}

#[test]
fn blocked_rooms_act_as_walls() {
    // Terrain exists for the whole 3×3 patch, but the provider only lets
    // the home room through; the unreachable goal floods the home room and
    // every border consultation comes back blocked.
    let store = plain_store(&[
        "W1N1", "W0N1", "E0N1", "W1N0", "W0N0", "E0N0", "W1S0", "W0S0", "E0S0",
    ]);
    let home: MapPosition = "W0N0".parse().unwrap();
    let mut provider = move |room: MapPosition| {
        if room == home {
            RoomRule::Open
        } else {
            RoomRule::Blocked
        }
    };
    let origin = at("W0N0", 45, 25);
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut provider,
                origin,
                &[Goal::at(at("E0N0", 25, 25))],
                &SearchOptions::default(),
            )
            .unwrap(),
    );
    assert!(result.incomplete);
    for cell in &result.path {
        assert_eq!(cell.map_position(), home);
    }
}

#[test]
fn provider_failures_abort_the_search() {
    struct Failing;
    impl RoomProvider for Failing {
        fn room(&mut self, _room: MapPosition) -> Result<RoomRule, ProviderError> {
            Err("cost matrix backend offline".into())
        }
    }

    let store = plain_store(&["W0N0"]);
    let mut finder = PathFinder::new();
    let err = finder
        .search(
            &store,
            &mut Failing,
            at("W0N0", 25, 25),
            &[Goal::at(at("W0N0", 30, 25))],
            &SearchOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, SearchError::Provider { .. }));
    assert_eq!(err.code(), -4);
}

#[test]
fn multi_room_path_crosses_the_portal() {
    let store = plain_store(&["W0N0", "E0N0"]);
    let origin = at("W0N0", 45, 25);
    let goal = at("E0N0", 5, 25);
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                origin,
                &[Goal::at(goal)],
                &SearchOptions::default(),
            )
            .unwrap(),
    );
    assert!(!result.incomplete);
    assert_eq!(result.path[0], goal);
    assert_step_chain(origin, &result.path);

    let west: MapPosition = "W0N0".parse().unwrap();
    let east: MapPosition = "E0N0".parse().unwrap();
    assert!(result.path.iter().any(|cell| cell.map_position() == west));
    assert!(result.path.iter().any(|cell| cell.map_position() == east));
    // All plain, so cost is one per emitted cell.
    assert_eq!(result.cost, result.path.len() as u32);
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[test]
fn ops_budget_returns_the_best_so_far() {
    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 5, 25);
    let options = SearchOptions {
        max_ops: 1,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                origin,
                &[Goal::at(at("W0N0", 45, 25))],
                &options,
            )
            .unwrap(),
    );
    assert!(result.incomplete);
    assert_eq!(result.ops, 1);
    assert!(!result.path.is_empty());
    assert_step_chain(origin, &result.path);
}

#[test]
fn cost_ceiling_cuts_the_search_short() {
    let store = plain_store(&["W0N0"]);
    let options = SearchOptions {
        max_cost: 5,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                at("W0N0", 5, 25),
                &[Goal::at(at("W0N0", 45, 25))],
                &options,
            )
            .unwrap(),
    );
    assert!(result.incomplete);
    assert!(result.ops <= options.max_ops);
}

#[test]
fn walled_off_goal_comes_back_incomplete() {
    // A closed ring of walls at range 2 around the goal.
    let goal_cell = (25u8, 25u8);
    let mut cells = Vec::new();
    for y in 0..50u8 {
        for x in 0..50u8 {
            let range = (x as i32 - goal_cell.0 as i32)
                .abs()
                .max((y as i32 - goal_cell.1 as i32).abs());
            if range == 2 {
                cells.push((x, y, Terrain::Wall));
            }
        }
    }
    let store = store_with(&[("W0N0", blob(&cells))]);
    let origin = at("W0N0", 10, 25);
    let goal = at("W0N0", goal_cell.0, goal_cell.1);
    // The flood reaches the room's borders; cap the search at one room so
    // the unloaded neighbours are never consulted.
    let options = SearchOptions {
        max_rooms: 1,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(&store, &mut AllOpen, origin, &[Goal::at(goal)], &options)
            .unwrap(),
    );
    assert!(result.incomplete);
    assert!(!result.path.is_empty());
    // Best-so-far stops just outside the ring.
    assert!(result.path[0].range_to(goal) <= 5);
    assert_step_chain(origin, &result.path);
}

// ---------------------------------------------------------------------------
// Terrain costs and cost matrices
// ---------------------------------------------------------------------------

#[test]
fn swamp_band_is_paid_for_exactly() {
    // Swamp columns 20..=22 across the whole room: every west→east path
    // pays three swamp entries, the straight line pays nothing else extra.
    let mut cells = Vec::new();
    for y in 0..50u8 {
        for x in 20..=22u8 {
            cells.push((x, y, Terrain::Swamp));
        }
    }
    let store = store_with(&[("W0N0", blob(&cells))]);
    let origin = at("W0N0", 10, 25);
    let options = SearchOptions {
        heuristic_weight: 1.0,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut AllOpen,
                origin,
                &[Goal::at(at("W0N0", 30, 25))],
                &options,
            )
            .unwrap(),
    );
    assert!(!result.incomplete);
    // 17 plain cells at 1 plus 3 swamp cells at 5.
    assert_eq!(result.cost, 32);
    assert_step_chain(origin, &result.path);
}

#[test]
fn cost_matrix_strip_is_the_only_way_through() {
    // Everything in the room costs 255 except the x == y diagonal at 1.
    let mut matrix = CostMatrix::new();
    for y in 0..50u8 {
        for x in 0..50u8 {
            matrix.set(x, y, if x == y { 1 } else { 0xff });
        }
    }
    let room: MapPosition = "W0N0".parse().unwrap();
    let mut provider = FixedCostMatrices::new();
    provider.insert(room, matrix);

    let store = plain_store(&["W0N0"]);
    let origin = at("W0N0", 10, 10);
    let goal = at("W0N0", 40, 40);
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(
                &store,
                &mut provider,
                origin,
                &[Goal::at(goal)],
                &SearchOptions::default(),
            )
            .unwrap(),
    );
    assert!(!result.incomplete);
    assert_eq!(result.path.len(), 30);
    assert_eq!(result.cost, 30);
    for cell in &result.path {
        let (x, y) = cell.room_offset();
        assert_eq!(x, y, "path left the strip at {cell}");
    }
    assert_step_chain(origin, &result.path);
}

#[test]
fn wall_gaps_force_a_detour() {
    // A wall column at x = 25 with openings only near the top and bottom.
    let mut cells = Vec::new();
    for y in 3..47u8 {
        cells.push((25, y, Terrain::Wall));
    }
    let store = store_with(&[("W0N0", blob(&cells))]);
    let origin = at("W0N0", 10, 25);
    let goal = at("W0N0", 40, 25);
    // The detour hugs the room's top and bottom edges; keep the search to
    // the one loaded room.
    let options = SearchOptions {
        max_rooms: 1,
        ..SearchOptions::default()
    };
    let mut finder = PathFinder::new();
    let result = found(
        finder
            .search(&store, &mut AllOpen, origin, &[Goal::at(goal)], &options)
            .unwrap(),
    );
    assert!(!result.incomplete);
    assert_eq!(result.path[0], goal);
    assert_step_chain(origin, &result.path);
    let crossing: Vec<u8> = result
        .path
        .iter()
        .filter(|cell| cell.room_offset().0 == 25)
        .map(|cell| cell.room_offset().1)
        .collect();
    assert!(!crossing.is_empty());
    for y in crossing {
        assert!(y < 3 || y >= 47, "path crossed through the wall at y = {y}");
    }
    // All plain, so cost is one per emitted cell.
    assert_eq!(result.cost, result.path.len() as u32);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn abort_hook_interrupts_the_search() {
    struct AbortImmediately;
    impl RoomProvider for AbortImmediately {
        fn room(&mut self, _room: MapPosition) -> Result<RoomRule, ProviderError> {
            Ok(RoomRule::Open)
        }
        fn should_abort(&mut self) -> bool {
            true
        }
    }

    let store = plain_store(&["W0N0"]);
    let mut finder = PathFinder::new();
    let outcome = finder
        .search(
            &store,
            &mut AbortImmediately,
            at("W0N0", 5, 25),
            &[Goal::at(at("W0N0", 45, 25))],
            &SearchOptions::default(),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(outcome.code(), -3);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn degenerate_options_are_rejected_up_front() {
    let store = plain_store(&["W0N0"]);
    let mut finder = PathFinder::new();
    let options = SearchOptions {
        max_rooms: 0,
        ..SearchOptions::default()
    };
    let err = finder
        .search(
            &store,
            &mut AllOpen,
            at("W0N0", 25, 25),
            &[Goal::at(at("W0N0", 30, 25))],
            &options,
        )
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidArgument(_)));
    assert_eq!(err.code(), -1);
}

#[test]
fn off_world_goals_are_rejected_up_front() {
    let store = plain_store(&["W0N0"]);
    let mut finder = PathFinder::new();
    let err = finder
        .search(
            &store,
            &mut AllOpen,
            at("W0N0", 25, 25),
            &[Goal::at(WorldPosition::new(20_000, 20_000))],
            &SearchOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// Determinism and optimality
// ---------------------------------------------------------------------------

/// Random interior walls; the outer two rings are solid wall so no border
/// special cases apply.
fn random_field(rng: &mut ChaCha8Rng) -> Vec<(u8, u8, Terrain)> {
    let mut cells = Vec::new();
    for y in 0..50u8 {
        for x in 0..50u8 {
            let edge = x < 2 || x >= 48 || y < 2 || y >= 48;
            if edge || rng.random_bool(0.25) {
                cells.push((x, y, Terrain::Wall));
            }
        }
    }
    cells
}

fn clear(cells: &mut Vec<(u8, u8, Terrain)>, x: u8, y: u8) {
    cells.retain(|&(cx, cy, _)| (cx, cy) != (x, y));
}

/// Reference distance: uniform-cost breadth-first search with the same
/// 8-neighbour movement rule.
fn bfs_distance(cells: &[(u8, u8, Terrain)], from: (u8, u8), to: (u8, u8)) -> Option<u32> {
    let mut wall = [[false; 50]; 50];
    for &(x, y, terrain) in cells {
        if terrain == Terrain::Wall {
            wall[x as usize][y as usize] = true;
        }
    }
    let mut dist = [[u32::MAX; 50]; 50];
    let mut queue = std::collections::VecDeque::new();
    dist[from.0 as usize][from.1 as usize] = 0;
    queue.push_back(from);
    while let Some((x, y)) = queue.pop_front() {
        let d = dist[x as usize][y as usize];
        if (x, y) == to {
            return Some(d);
        }
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if !(0..50).contains(&nx) || !(0..50).contains(&ny) {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if wall[nx][ny] || dist[nx][ny] != u32::MAX {
                    continue;
                }
                dist[nx][ny] = d + 1;
                queue.push_back((nx as u8, ny as u8));
            }
        }
    }
    None
}

#[test]
fn matches_reference_distance_on_random_fields() {
    let origin_cell = (5u8, 5u8);
    let goal_cell = (44u8, 44u8);
    let options = SearchOptions {
        heuristic_weight: 1.0,
        ..SearchOptions::default()
    };

    for seed in 0..4u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut cells = random_field(&mut rng);
        clear(&mut cells, origin_cell.0, origin_cell.1);
        clear(&mut cells, goal_cell.0, goal_cell.1);

        let store = store_with(&[("W0N0", blob(&cells))]);
        let origin = at("W0N0", origin_cell.0, origin_cell.1);
        let goal = at("W0N0", goal_cell.0, goal_cell.1);

        let mut finder = PathFinder::new();
        let result = found(
            finder
                .search(&store, &mut AllOpen, origin, &[Goal::at(goal)], &options)
                .unwrap(),
        );

        match bfs_distance(&cells, origin_cell, goal_cell) {
            Some(reference) => {
                assert!(!result.incomplete, "seed {seed}: goal is reachable");
                assert_eq!(result.cost, reference, "seed {seed}: cost mismatch");
                assert_eq!(result.path.len() as u32, reference, "seed {seed}");
                assert_step_chain(origin, &result.path);
            }
            None => assert!(result.incomplete, "seed {seed}: goal is walled off"),
        }
    }
}

#[test]
fn identical_searches_give_identical_results() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut cells = random_field(&mut rng);
    clear(&mut cells, 5, 5);
    clear(&mut cells, 44, 44);
    let store = store_with(&[("W0N0", blob(&cells))]);
    let origin = at("W0N0", 5, 5);
    let goals = [Goal::at(at("W0N0", 44, 44))];
    let options = SearchOptions::default();

    let mut finder = PathFinder::new();
    let first = finder
        .search(&store, &mut AllOpen, origin, &goals, &options)
        .unwrap();
    // Re-running on the same warm instance must not change anything.
    let second = finder
        .search(&store, &mut AllOpen, origin, &goals, &options)
        .unwrap();
    let mut fresh = PathFinder::new();
    let third = fresh
        .search(&store, &mut AllOpen, origin, &goals, &options)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[cfg(feature = "serde")]
mod serde_round_trips {
    use super::*;

    #[test]
    fn options_and_results_round_trip() {
        let options = SearchOptions::default();
        let json = serde_json::to_string(&options).unwrap();
        let back: SearchOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, back);

        let result = SearchResult {
            path: vec![at("W0N0", 1, 2), at("W0N0", 2, 3)],
            ops: 7,
            cost: 2,
            incomplete: false,
        };
        let json = serde_json::to_string(&Outcome::Path(result.clone())).unwrap();
        let back: Outcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Outcome::Path(result));
    }
}
