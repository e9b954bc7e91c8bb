//! Hexfront - simulation core of a hex-grid territory game
//!
//! This crate provides the core game logic for Hexfront, including:
//! - Offset hex coordinates and grid storage
//! - The spread engine that propagates effects outward from a tile
//! - Region bookkeeping that merges and splits territory as owners change
//! - A log of reversible moves for undo/redo and lockstep replay
//!
//! # Architecture
//!
//! The game engine is designed to be platform-agnostic. It can be compiled to:
//! - Native Rust for hosting and replay verification
//! - WebAssembly for the browser client
//!
//! # Modules
//!
//! - [`hex`], [`grid`], [`tile`]: coordinates and tile storage
//! - [`spread`]: conditional breadth-first propagation
//! - [`region`], [`territory`]: region arena and connectivity upkeep
//! - [`map`]: grid, regions and rules owned together
//! - [`moves`], [`history`]: reversible moves and the undo/redo log
//! - [`skill`], [`turn`]: building moves from player input and turn ends
//! - [`template`], [`codec`]: persisted maps and the encoding boundary
//! - [`game`], [`sync`]: game state and the lockstep move exchange

#[macro_use]
pub mod codec;

pub mod entity;
pub mod game;
pub mod grid;
pub mod hex;
pub mod history;
pub mod map;
pub mod moves;
pub mod region;
pub mod rules;
pub mod skill;
pub mod spread;
pub mod sync;
pub mod template;
pub mod territory;
pub mod tile;
pub mod turn;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use codec::{CodecError, FORMAT_VERSION};
pub use entity::{Build, BuildKind, Effect, Occupant, Plant, PlantKind, Troop, TroopKind, Vitals};
pub use game::{GameError, GameState};
pub use grid::HexGrid;
pub use hex::{Direction, GridRect, GridSize, HexCoord};
pub use history::History;
pub use map::{Map, MapSnapshot};
pub use moves::{Move, MoveKind, SkillUse};
pub use region::{Region, RegionId, RegionRes, Regions};
pub use rules::Rules;
pub use skill::{SkillKind, SkillState};
pub use spread::{Channel, Reach, Spread};
pub use sync::MoveBatch;
pub use template::Template;
pub use tile::{Team, Terrain, Tile};
