//! Yarn Dash - A tile-grid kitten platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `level`: Level data descriptors and the built-in 1-1 layout
//! - `session`: Lives/score/power carried across level resets
//! - `settings`: Player preferences (easy mode, audio)
//!
//! Rendering, audio synthesis, and input-device handling live outside this
//! crate. They consume the read-only `GameState` snapshot, feed `TickInput`,
//! and drain the per-frame `GameEvent` queue.

pub mod level;
pub mod session;
pub mod settings;
pub mod sim;

pub use level::LevelData;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation step in frame-equivalents (60 Hz)
    pub const SIM_DT: f32 = 1.0;
    /// Largest `dt` a single tick will absorb (tab-background hitch guard)
    pub const MAX_DT: f32 = 2.0;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 32.0;

    /// Viewport dimensions in pixels
    pub const VIEWPORT_W: f32 = 800.0;
    pub const VIEWPORT_H: f32 = 448.0;

    /// Gravity per frame, and the terminal fall speed that stops tunneling
    /// through thin platforms
    pub const GRAVITY: f32 = 0.5;
    pub const TERMINAL_VELOCITY: f32 = 15.0;

    /// Player movement
    pub const WALK_SPEED: f32 = 4.0;
    pub const RUN_SPEED: f32 = 6.0;
    pub const FRICTION: f32 = 0.8;
    pub const FRICTION_STOP: f32 = 0.1;
    pub const JUMP_IMPULSE: f32 = -12.0;
    pub const EASY_JUMP_IMPULSE: f32 = -14.0;
    /// Extra upward boost per frame while jump is held during ascent
    pub const JUMP_HOLD_BOOST: f32 = 0.3;
    pub const STOMP_REBOUND: f32 = -8.0;

    /// Player sizes per power tier
    pub const PLAYER_W: f32 = 32.0;
    pub const PLAYER_H_SMALL: f32 = 32.0;
    pub const PLAYER_H_BIG: f32 = 64.0;

    /// Frames of post-damage invincibility
    pub const INVINCIBLE_FRAMES: u32 = 90;

    /// Enemies
    pub const PATROLLER_SPEED: f32 = 1.0;
    pub const SHELLED_SPEED: f32 = 0.8;
    pub const SHELL_IDLE_FRAMES: u32 = 180;
    pub const SHELL_KICK_SPEED: f32 = 8.0;
    pub const SHELL_FRICTION: f32 = 0.98;
    pub const SHELL_STOP_SPEED: f32 = 0.5;
    pub const STOMP_ANIM_FRAMES: u32 = 40;
    pub const ENEMY_SIZE: f32 = 32.0;

    /// Yarn projectiles
    pub const YARN_SPEED: f32 = 8.0;
    pub const YARN_LAUNCH_VY: f32 = -3.0;
    pub const YARN_GRAVITY: f32 = 0.2;
    pub const YARN_BOUNCE_VY: f32 = -5.0;
    pub const YARN_MAX_BOUNCES: u32 = 3;
    pub const YARN_SIZE: f32 = 8.0;
    pub const THROW_COOLDOWN: u32 = 30;

    /// Items pop out of a struck box with this upward kick
    pub const ITEM_POP_VY: f32 = -8.0;
    pub const ITEM_SIZE: f32 = 32.0;

    /// Camera follow
    pub const CAMERA_LERP: f32 = 0.15;
    pub const CAMERA_LEAD_FRACTION: f32 = 0.35;

    /// Lives
    pub const START_LIVES: u32 = 3;
    pub const EASY_START_LIVES: u32 = 5;

    /// Level time budget in seconds; a second elapses every 60 frames
    pub const LEVEL_TIME: u32 = 400;
    pub const FRAMES_PER_SECOND: u64 = 60;

    /// Score awards
    pub const SCORE_STOMP: u32 = 100;
    pub const SCORE_SHELL_STOMP: u32 = 200;
    pub const SCORE_SHELL_KICK: u32 = 400;
    pub const SCORE_YARN_HIT: u32 = 150;
    pub const SCORE_BLOCK_STRIKE: u32 = 50;
    pub const SCORE_CURRENCY: u32 = 50;
    pub const SCORE_FISH: u32 = 200;
    pub const SCORE_YARN_ITEM: u32 = 300;
    pub const SCORE_EXTRA_LIFE: u32 = 500;
    pub const SCORE_GOAL: u32 = 2000;
    pub const SCORE_PER_TIME_SECOND: u32 = 10;

    /// Cosmetic timers
    pub const PARTICLE_LIFE: u32 = 30;
    pub const SCORE_POP_LIFE: u32 = 60;
}

/// Convert a pixel coordinate to a cell index (floor division)
#[inline]
pub fn to_cell(px: f32) -> i32 {
    (px / consts::TILE_SIZE).floor() as i32
}

/// Cell index of an AABB's inclusive far edge. The edge pixel itself belongs
/// to the previous cell, so an edge landing exactly on a cell boundary does
/// not pull in the next cell.
#[inline]
pub fn to_cell_edge(px: f32) -> i32 {
    ((px - 1.0) / consts::TILE_SIZE).floor() as i32
}
