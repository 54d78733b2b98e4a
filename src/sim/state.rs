//! Game state and core simulation types
//!
//! Everything the renderer, HUD, and audio layers read lives here. The
//! orchestrator in `tick` is the only writer per frame.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::grid::TileGrid;
use crate::consts::*;
use crate::level::LevelData;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Frozen; next unpause resumes mid-level
    Paused,
    /// Goal column crossed (one-shot latch)
    LevelComplete,
    /// Lives exhausted
    GameOver,
}

/// Sound-triggering moments, drained once per frame by the audio layer.
/// The sim never blocks on (or knows about) playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    Jump,
    Collect,
    Stomp,
    Powerup,
    Damage,
    Death,
    Victory,
    Throw,
}

/// Player upgrade tier. Pickups escalate, damage de-escalates, one step per
/// event in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerState {
    #[default]
    Small,
    Big,
    Yarn,
}

impl PowerState {
    /// Escalation order for "at least this tier" pickups
    pub fn rank(self) -> u8 {
        match self {
            PowerState::Small => 0,
            PowerState::Big => 1,
            PowerState::Yarn => 2,
        }
    }

    /// Bounding-box height is a pure function of the tier
    pub fn height(self) -> f32 {
        match self {
            PowerState::Small => PLAYER_H_SMALL,
            PowerState::Big | PowerState::Yarn => PLAYER_H_BIG,
        }
    }

    /// One tier down, or `None` when a hit at Small is fatal
    pub fn downgraded(self) -> Option<PowerState> {
        match self {
            PowerState::Yarn => Some(PowerState::Big),
            PowerState::Big => Some(PowerState::Small),
            PowerState::Small => None,
        }
    }
}

/// Shared AABB substructure for every entity category
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub alive: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            vel: Vec2::ZERO,
            grounded: false,
            alive: true,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }
}

/// Result of applying damage to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Invincibility window absorbed the hit
    Shrugged,
    /// Dropped one power tier
    Downgraded,
    /// Hit at Small: a life is lost
    Fatal,
}

/// A controllable kitten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// -1.0 facing left, +1.0 facing right
    pub facing: f32,
    pub power: PowerState,
    pub invincible_frames: u32,
    pub throw_cooldown: u32,
    /// Variable-jump latch: set on takeoff, cleared on release or apex
    pub holding_jump: bool,
    pub lives: u32,
    pub score: u32,
    /// Currency pickups collected
    pub treats: u32,
    /// Tunable per player so easy mode only touches configuration
    pub jump_impulse: f32,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, PLAYER_W, PLAYER_H_SMALL),
            facing: 1.0,
            power: PowerState::Small,
            invincible_frames: 0,
            throw_cooldown: 0,
            holding_jump: false,
            lives: START_LIVES,
            score: 0,
            treats: 0,
            jump_impulse: JUMP_IMPULSE,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_frames > 0
    }

    /// Change power tier, translating the box so the bottom edge stays put.
    /// Growing pushes the top edge up; shrinking drops it down.
    pub fn set_power(&mut self, power: PowerState) {
        let bottom = self.body.bottom();
        self.power = power;
        self.body.size.y = power.height();
        self.body.pos.y = bottom - self.body.size.y;
    }

    /// Upgrade to at least `tier`; never downgrades (a Yarn player eating a
    /// fish stays Yarn).
    pub fn upgrade_to(&mut self, tier: PowerState) {
        if tier.rank() > self.power.rank() {
            self.set_power(tier);
        }
    }

    /// Apply one enemy/hazard hit. Downgrades grant the invincibility
    /// window; a fatal hit clears `alive` and leaves life accounting to the
    /// end-of-tick transition step.
    pub fn take_hit(&mut self) -> HitResult {
        if self.is_invincible() {
            return HitResult::Shrugged;
        }
        match self.power.downgraded() {
            Some(lower) => {
                self.set_power(lower);
                self.invincible_frames = INVINCIBLE_FRAMES;
                HitResult::Downgraded
            }
            None => {
                self.body.alive = false;
                HitResult::Fatal
            }
        }
    }
}

/// Behavioral family of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks, reverses at walls and ledges, dies to a stomp
    Patroller,
    /// Retreats into a shell when stomped; the shell can be kicked
    Shelled,
}

impl EnemyKind {
    pub fn walk_speed(self) -> f32 {
        match self {
            EnemyKind::Patroller => PATROLLER_SPEED,
            EnemyKind::Shelled => SHELLED_SPEED,
        }
    }

    fn size(self) -> Vec2 {
        match self {
            EnemyKind::Patroller => Vec2::splat(ENEMY_SIZE),
            EnemyKind::Shelled => Vec2::new(ENEMY_SIZE, ENEMY_SIZE + 8.0),
        }
    }
}

/// Per-enemy state machine position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyState {
    Walking,
    /// Patroller terminal state: brief squash animation, then removal
    Stomped { frames_left: u32 },
    /// Inert shell; auto-releases to Walking when the timer runs out
    ShellIdle { timer: u32 },
    /// Kicked shell; damages players and destroys enemies it touches
    ShellSliding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub state: EnemyState,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        let size = kind.size();
        let mut body = Body::new(x, y, size.x, size.y);
        body.vel.x = -kind.walk_speed();
        Self {
            kind,
            body,
            state: EnemyState::Walking,
        }
    }

    pub fn is_shell_idle(&self) -> bool {
        matches!(self.state, EnemyState::ShellIdle { .. })
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.state, EnemyState::ShellSliding)
    }

    pub fn is_stomped(&self) -> bool {
        matches!(self.state, EnemyState::Stomped { .. })
    }

    /// Stop and go inert with a fresh release timer
    pub fn enter_shell(&mut self) {
        self.body.vel.x = 0.0;
        self.state = EnemyState::ShellIdle {
            timer: SHELL_IDLE_FRAMES,
        };
    }

    /// Send the shell sliding; `dir` is ±1 away from the kicker
    pub fn kick(&mut self, dir: f32) {
        self.body.vel.x = dir * SHELL_KICK_SPEED;
        self.state = EnemyState::ShellSliding;
    }
}

/// A thrown ball of yarn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    /// Index of the throwing player (score attribution, no self-damage)
    pub owner: usize,
    pub bounces: u32,
}

impl Projectile {
    pub fn new(owner: usize, x: f32, y: f32, dir: f32) -> Self {
        let mut body = Body::new(x, y, YARN_SIZE, YARN_SIZE);
        body.vel = Vec2::new(dir * YARN_SPEED, YARN_LAUNCH_VY);
        Self {
            body,
            owner,
            bounces: 0,
        }
    }
}

/// Collectible kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Currency,
    PowerFish,
    PowerYarn,
    ExtraLife,
}

/// A collectible. Block-born items remember their origin cell so a struck
/// box cannot spawn a second reward while the first is still in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub body: Body,
    pub kind: ItemKind,
    pub origin: Option<(i32, i32)>,
}

impl Item {
    pub fn new(kind: ItemKind, x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, ITEM_SIZE, ITEM_SIZE),
            kind,
            origin: None,
        }
    }

    pub fn from_block(kind: ItemKind, col: i32, row: i32) -> Self {
        let mut item = Self::new(
            kind,
            col as f32 * TILE_SIZE,
            (row - 1) as f32 * TILE_SIZE,
        );
        item.body.vel.y = ITEM_POP_VY;
        item.origin = Some((col, row));
        item
    }
}

/// Cosmetic debris; no collision, no physics core involvement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: u32,
}

/// Floating "+N" marker spawned wherever score is awarded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePop {
    pub pos: Vec2,
    pub amount: u32,
    pub life: u32,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducible cosmetic scatter
    pub seed: u64,
    pub phase: GamePhase,
    /// Simulation frame counter
    pub frame: u64,
    /// Seconds left on the level clock
    pub time_left: u32,
    pub grid: TileGrid,
    /// Kept for level resets (respawn restores grid and spawn lists)
    pub level: LevelData,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub items: Vec<Item>,
    pub camera: Camera,
    /// Visual-only state, rebuilt freely
    #[serde(skip)]
    pub particles: Vec<Particle>,
    #[serde(skip)]
    pub score_pops: Vec<ScorePop>,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Build a fresh state from level data. `player_count` is 1 or 2.
    pub fn new(level: LevelData, player_count: usize, seed: u64) -> Self {
        let grid = level.build_grid();
        let mut state = Self {
            seed,
            phase: GamePhase::Playing,
            frame: 0,
            time_left: level.time_limit,
            grid,
            players: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            items: Vec::new(),
            camera: Camera::new(VIEWPORT_W, VIEWPORT_H),
            particles: Vec::new(),
            score_pops: Vec::new(),
            events: Vec::new(),
            level,
        };

        let (sx, sy) = state.level.player_spawn_px();
        for i in 0..player_count.clamp(1, 2) {
            let mut p = Player::new(sx + i as f32 * TILE_SIZE, sy);
            p.body.pos.y = sy - p.body.size.y;
            state.players.push(p);
        }
        state.spawn_level_entities();
        state
    }

    /// (Re)populate enemies and pre-placed items from the stored level data.
    fn spawn_level_entities(&mut self) {
        for spawn in &self.level.enemies {
            self.enemies.push(Enemy::new(
                spawn.kind,
                spawn.col as f32 * TILE_SIZE,
                spawn.row as f32 * TILE_SIZE,
            ));
        }
        for spawn in &self.level.items {
            self.items.push(Item::new(
                spawn.kind,
                spawn.col as f32 * TILE_SIZE,
                spawn.row as f32 * TILE_SIZE,
            ));
        }
    }

    /// Rebuild the level in place after a death, keeping each player's
    /// session stats (lives, score, power) and resetting everything else.
    pub fn reset_level(&mut self) {
        log::debug!("level reset at frame {}", self.frame);
        self.grid = self.level.build_grid();
        self.enemies.clear();
        self.projectiles.clear();
        self.items.clear();
        self.particles.clear();
        self.score_pops.clear();
        self.spawn_level_entities();
        self.camera = Camera::new(VIEWPORT_W, VIEWPORT_H);
        self.time_left = self.level.time_limit;

        let (sx, sy) = self.level.player_spawn_px();
        for (i, p) in self.players.iter_mut().enumerate() {
            p.body = Body::new(
                sx + i as f32 * TILE_SIZE,
                sy - p.power.height(),
                PLAYER_W,
                p.power.height(),
            );
            p.facing = 1.0;
            p.invincible_frames = 0;
            p.throw_cooldown = 0;
            p.holding_jump = false;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the frame's events to a collaborator (audio), clearing the queue.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Award score to a player and drop a floating marker at `(x, y)`.
    pub fn add_score(&mut self, player_idx: usize, amount: u32, x: f32, y: f32) {
        if let Some(p) = self.players.get_mut(player_idx) {
            p.score += amount;
        }
        self.score_pops.push(ScorePop {
            pos: Vec2::new(x, y),
            amount,
            life: SCORE_POP_LIFE,
        });
    }

    /// Cosmetic-only RNG, reseeded per frame so particle scatter is
    /// reproducible from (seed, frame) without serializing generator state.
    pub fn cosmetic_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.frame.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Scatter a puff of particles at `(x, y)`.
    pub fn poof(&mut self, x: f32, y: f32, color: u32, count: usize) {
        use rand::Rng;
        let mut rng = self.cosmetic_rng();
        for _ in 0..count {
            self.particles.push(Particle {
                pos: Vec2::new(x, y),
                vel: Vec2::new(
                    rng.random_range(-2.0..2.0),
                    rng.random_range(-3.0..-1.0),
                ),
                color,
                life: PARTICLE_LIFE,
            });
        }
    }

    /// Lead player drives the camera and the goal/HUD views
    pub fn lead_player(&self) -> &Player {
        &self.players[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_height_preserves_bottom_edge() {
        let mut p = Player::new(100.0, 200.0);
        let bottom = p.body.bottom();

        p.set_power(PowerState::Big);
        assert_eq!(p.body.size.y, PLAYER_H_BIG);
        assert_eq!(p.body.bottom(), bottom);
        // Top edge moved up by the growth
        assert_eq!(p.body.pos.y, 200.0 - 32.0);

        p.set_power(PowerState::Small);
        assert_eq!(p.body.size.y, PLAYER_H_SMALL);
        assert_eq!(p.body.bottom(), bottom);
    }

    #[test]
    fn test_upgrade_never_downgrades() {
        let mut p = Player::new(0.0, 0.0);
        p.set_power(PowerState::Yarn);
        p.upgrade_to(PowerState::Big);
        assert_eq!(p.power, PowerState::Yarn);
        p.upgrade_to(PowerState::Yarn);
        assert_eq!(p.power, PowerState::Yarn);
    }

    #[test]
    fn test_damage_steps_one_tier_per_hit() {
        let mut p = Player::new(0.0, 0.0);
        p.set_power(PowerState::Yarn);

        assert_eq!(p.take_hit(), HitResult::Downgraded);
        assert_eq!(p.power, PowerState::Big);
        assert_eq!(p.invincible_frames, INVINCIBLE_FRAMES);

        // Second hit inside the window is absorbed
        assert_eq!(p.take_hit(), HitResult::Shrugged);
        assert_eq!(p.power, PowerState::Big);

        p.invincible_frames = 0;
        assert_eq!(p.take_hit(), HitResult::Downgraded);
        assert_eq!(p.power, PowerState::Small);

        p.invincible_frames = 0;
        assert_eq!(p.take_hit(), HitResult::Fatal);
        assert!(!p.body.alive);
    }

    #[test]
    fn test_shell_transitions() {
        let mut e = Enemy::new(EnemyKind::Shelled, 0.0, 0.0);
        assert_eq!(e.state, EnemyState::Walking);

        e.enter_shell();
        assert!(e.is_shell_idle());
        assert_eq!(e.body.vel.x, 0.0);

        e.kick(1.0);
        assert!(e.is_sliding());
        assert_eq!(e.body.vel.x, SHELL_KICK_SPEED);
    }

    #[test]
    fn test_event_queue_drains_once() {
        let state_level = crate::level::LevelData::build_default(false);
        let mut state = GameState::new(state_level, 1, 7);
        state.push_event(GameEvent::Jump);
        state.push_event(GameEvent::Collect);
        assert_eq!(state.drain_events().len(), 2);
        assert!(state.drain_events().is_empty());
    }
}
