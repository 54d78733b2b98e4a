//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (clamped frame-equivalent `dt`)
//! - Seeded RNG only
//! - Stable iteration order (collection order, compacted end-of-tick)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod grid;
pub mod physics;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{Hit, aabb_overlap, classify_contact};
pub use grid::{Tile, TileGrid};
pub use physics::{MoveResult, apply_gravity, move_and_collide};
pub use state::{
    Body, Enemy, EnemyKind, EnemyState, GameEvent, GamePhase, GameState, Item, ItemKind, Particle,
    Player, PowerState, Projectile, ScorePop,
};
pub use tick::{TickInput, tick};
