//! **roomgrid-core** — Core types for the roomgrid world (positions, room
//! names, terrain).
//!
//! This crate provides the foundational types shared across the *roomgrid*
//! ecosystem: the map/world coordinate model, the room-name codec, and the
//! static terrain store. It contains no search logic; see `roomgrid-paths`
//! for the engine.

pub mod geom;
pub mod room_name;
pub mod terrain;

pub use geom::{Direction, MapPosition, WorldPosition, MAP_SIZE, ROOM_AREA, ROOM_SIZE, WORLD_SIZE};
pub use room_name::RoomNameError;
pub use terrain::{Terrain, TerrainData, TerrainStore, TERRAIN_BYTES};
