//! Per-frame simulation orchestrator
//!
//! One call advances the whole world by `dt` frame-equivalents in a fixed
//! step order. Every step reads only state written by strictly earlier steps
//! in the same tick, so the result is a pure function of (state, inputs, dt).

use glam::Vec2;

use super::collision::{
    EnemyContact, aabb_overlap, crossed_goal, resolve_player_enemy, resolve_player_item,
    resolve_projectile_enemy, try_block_strike,
};
use super::physics::{MoveResult, apply_gravity, move_and_collide};
use super::state::{
    Body, EnemyState, GameEvent, GamePhase, GameState, PowerState, Projectile,
};
use crate::consts::*;
use crate::to_cell;

/// Frame-scoped intent flags for one player. The sim never sees raw device
/// events, only these booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump_held: bool,
    /// Edge-triggered: true only on the frame the button went down
    pub jump_pressed: bool,
    pub run: bool,
    pub throw: bool,
    pub pause_pressed: bool,
}

/// Advance the simulation by `dt` frame-equivalents (1.0 = one 60 Hz frame).
/// `inputs[i]` drives `state.players[i]`; missing entries read as neutral.
pub fn tick(state: &mut GameState, inputs: &[TickInput], dt: f32) {
    // Pause lands before anything else so a paused world is truly frozen
    if inputs.iter().any(|i| i.pause_pressed) {
        match state.phase {
            GamePhase::Playing => state.phase = GamePhase::Paused,
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = dt.clamp(0.0, MAX_DT);
    state.frame += 1;

    advance_timers(state);
    let player_moves = step_players(state, inputs, dt);
    resolve_blocks_and_goal(state, &player_moves);
    step_enemies(state, dt);
    resolve_player_enemy_contacts(state);
    step_projectiles(state, dt);
    step_items(state, dt);
    resolve_item_pickups(state);
    step_camera(state);
    compact(state);
    step_cosmetics(state);
    step_transitions(state);
}

/// Step 1: count down per-entity timers and the level clock.
fn advance_timers(state: &mut GameState) {
    for p in &mut state.players {
        p.invincible_frames = p.invincible_frames.saturating_sub(1);
        p.throw_cooldown = p.throw_cooldown.saturating_sub(1);
    }

    for e in &mut state.enemies {
        match &mut e.state {
            EnemyState::Stomped { frames_left } => {
                *frames_left = frames_left.saturating_sub(1);
                if *frames_left == 0 {
                    e.body.alive = false;
                }
            }
            EnemyState::ShellIdle { timer } => {
                *timer = timer.saturating_sub(1);
                if *timer == 0 {
                    e.state = EnemyState::Walking;
                    e.body.vel.x = -e.kind.walk_speed();
                }
            }
            _ => {}
        }
    }

    // Level clock runs in whole seconds
    if state.frame % FRAMES_PER_SECOND == 0 {
        state.time_left = state.time_left.saturating_sub(1);
        if state.time_left == 0 {
            for p in &mut state.players {
                p.body.alive = false;
            }
        }
    }
}

/// Steps 2-3: read input, then integrate and collide each player.
fn step_players(state: &mut GameState, inputs: &[TickInput], dt: f32) -> Vec<MoveResult> {
    let mut moves = Vec::with_capacity(state.players.len());
    let mut thrown: Vec<(usize, f32, f32, f32)> = Vec::new();
    let mut jumped = false;

    for i in 0..state.players.len() {
        let input = inputs.get(i).copied().unwrap_or_default();
        let grid = &state.grid;
        let p = &mut state.players[i];
        if !p.body.alive {
            moves.push(MoveResult::default());
            continue;
        }

        let top_speed = if input.run { RUN_SPEED } else { WALK_SPEED };
        if input.left {
            p.body.vel.x = -top_speed;
            p.facing = -1.0;
        } else if input.right {
            p.body.vel.x = top_speed;
            p.facing = 1.0;
        } else {
            p.body.vel.x *= FRICTION.powf(dt);
            if p.body.vel.x.abs() < FRICTION_STOP {
                p.body.vel.x = 0.0;
            }
        }

        if input.jump_pressed && p.body.grounded {
            p.body.vel.y = p.jump_impulse;
            p.holding_jump = true;
            jumped = true;
        }
        // Variable jump height: holding the button fights gravity on the way up
        if p.holding_jump {
            if input.jump_held && p.body.vel.y < 0.0 {
                p.body.vel.y -= JUMP_HOLD_BOOST * dt;
            } else {
                p.holding_jump = false;
            }
        }

        if input.throw && p.power == PowerState::Yarn && p.throw_cooldown == 0 {
            let x = if p.facing > 0.0 {
                p.body.right()
            } else {
                p.body.pos.x - YARN_SIZE
            };
            thrown.push((i, x, p.body.pos.y + p.body.size.y * 0.25, p.facing));
            p.throw_cooldown = THROW_COOLDOWN;
        }

        apply_gravity(&mut p.body, dt);
        let result = move_and_collide(&mut p.body, grid, dt);

        // The camera never backtracks, so neither can the player
        let left_limit = state.camera.x + 2.0;
        if p.body.pos.x < left_limit {
            p.body.pos.x = left_limit;
            p.body.vel.x = p.body.vel.x.max(0.0);
        }
        if p.body.pos.y > grid.height_px() {
            p.body.alive = false;
        }
        moves.push(result);
    }

    if jumped {
        state.push_event(GameEvent::Jump);
    }
    for (owner, x, y, dir) in thrown {
        state.projectiles.push(Projectile::new(owner, x, y, dir));
        state.push_event(GameEvent::Throw);
    }
    moves
}

/// Step 4: head-bump block strikes and the one-shot goal latch.
fn resolve_blocks_and_goal(state: &mut GameState, player_moves: &[MoveResult]) {
    for i in 0..state.players.len() {
        if !state.players[i].body.alive {
            continue;
        }

        if player_moves[i].hit_ceiling
            && let Some((col, row, _kind)) = try_block_strike(
                &state.players[i],
                &mut state.grid,
                &state.level,
                &mut state.items,
            )
        {
            let x = col as f32 * TILE_SIZE + TILE_SIZE / 2.0;
            let y = row as f32 * TILE_SIZE;
            state.add_score(i, SCORE_BLOCK_STRIKE, x, y);
            state.push_event(GameEvent::Collect);
            state.poof(x, y, 0xFFD54F, 6);
        }

        if state.phase == GamePhase::Playing
            && crossed_goal(&state.players[i].body, state.level.goal_column)
        {
            let bonus = SCORE_GOAL + SCORE_PER_TIME_SECOND * state.time_left;
            let (x, y) = {
                let b = &state.players[i].body;
                (b.center_x(), b.pos.y)
            };
            state.add_score(i, bonus, x, y);
            state.push_event(GameEvent::Victory);
            state.phase = GamePhase::LevelComplete;
            log::info!(
                "level complete at frame {} with {}s left",
                state.frame,
                state.time_left
            );
        }
    }
}

/// Step 5: enemy behavior and grid collision.
fn step_enemies(state: &mut GameState, dt: f32) {
    for e in &mut state.enemies {
        if !e.body.alive {
            continue;
        }
        let grid = &state.grid;

        match e.state {
            EnemyState::Walking => {
                // Reverse at a ledge: probe one pixel ahead of the leading
                // edge, one pixel below the feet
                if e.body.grounded && e.body.vel.x != 0.0 {
                    let ahead_x = if e.body.vel.x < 0.0 {
                        e.body.pos.x - 1.0
                    } else {
                        e.body.right() + 1.0
                    };
                    let below = grid.tile_at(to_cell(ahead_x), to_cell(e.body.bottom() + 1.0));
                    if !below.is_solid() {
                        e.body.vel.x = -e.body.vel.x;
                    }
                }
            }
            EnemyState::ShellSliding => {
                e.body.vel.x *= SHELL_FRICTION.powf(dt);
                if e.body.vel.x.abs() < SHELL_STOP_SPEED {
                    e.enter_shell();
                }
            }
            _ => e.body.vel.x = 0.0,
        }

        let pre_vx = e.body.vel.x;
        apply_gravity(&mut e.body, dt);
        let result = move_and_collide(&mut e.body, grid, dt);
        if result.blocked_x {
            // Walls turn walkers and sliding shells around
            e.body.vel.x = -pre_vx;
        }

        if e.body.pos.y > grid.height_px() || e.body.right() < 0.0 {
            e.body.alive = false;
        }
    }

    // A sliding shell flattens any other enemy it touches
    let sliders: Vec<(usize, Body)> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_sliding() && e.body.alive)
        .map(|(i, e)| (i, e.body))
        .collect();
    let mut crushed = Vec::new();
    for (si, shell_body) in &sliders {
        for (oi, other) in state.enemies.iter().enumerate() {
            if oi != *si && other.body.alive && !other.is_stomped()
                && aabb_overlap(shell_body, &other.body)
            {
                crushed.push(oi);
            }
        }
    }
    for oi in crushed {
        let e = &mut state.enemies[oi];
        e.body.vel.x = 0.0;
        e.state = EnemyState::Stomped {
            frames_left: STOMP_ANIM_FRAMES,
        };
        let (x, y) = (e.body.center_x(), e.body.pos.y);
        state.push_event(GameEvent::Stomp);
        state.poof(x, y, 0xBDBDBD, 4);
    }
}

/// Step 6: player-vs-enemy contacts.
fn resolve_player_enemy_contacts(state: &mut GameState) {
    for pi in 0..state.players.len() {
        for ei in 0..state.enemies.len() {
            let contact =
                resolve_player_enemy(&mut state.players[pi], &mut state.enemies[ei]);
            let (ex, ey) = {
                let b = &state.enemies[ei].body;
                (b.center_x(), b.pos.y)
            };
            match contact {
                EnemyContact::Ignored => {}
                EnemyContact::Stomped { score } | EnemyContact::Kicked { score } => {
                    state.add_score(pi, score, ex, ey);
                    state.push_event(GameEvent::Stomp);
                    state.poof(ex, ey, 0xA1887F, 5);
                }
                EnemyContact::Damaged => state.push_event(GameEvent::Damage),
                EnemyContact::Killed => {
                    let (px, py) = {
                        let b = &state.players[pi].body;
                        (b.center_x(), b.pos.y)
                    };
                    state.poof(px, py, 0xE57373, 8);
                }
            }
        }
    }
}

/// Step 7: projectile flight, grid bounces, and enemy hits.
fn step_projectiles(state: &mut GameState, dt: f32) {
    for ji in 0..state.projectiles.len() {
        {
            let grid = &state.grid;
            let pr = &mut state.projectiles[ji];
            if !pr.body.alive {
                continue;
            }

            pr.body.vel.y = (pr.body.vel.y + YARN_GRAVITY * dt).min(TERMINAL_VELOCITY);
            let pre_vx = pr.body.vel.x;
            let result = move_and_collide(&mut pr.body, grid, dt);
            // Every grid contact spends one bounce, wall and floor alike.
            // Walls reflect the horizontal flight; floors relaunch upward;
            // a ceiling tap just kills the climb and lets gravity take over.
            if result.blocked_x || result.blocked_y {
                pr.bounces += 1;
                if pr.bounces > YARN_MAX_BOUNCES {
                    pr.body.alive = false;
                } else {
                    if result.blocked_x {
                        pr.body.vel.x = -pre_vx;
                    }
                    if result.blocked_y && !result.hit_ceiling {
                        pr.body.vel.y = YARN_BOUNCE_VY;
                        pr.body.grounded = false;
                    }
                }
            }

            let x = pr.body.pos.x;
            if x > state.camera.right_cull_bound()
                || pr.body.right() < state.camera.left_cull_bound()
                || pr.body.pos.y > grid.height_px()
            {
                pr.body.alive = false;
            }
            if !pr.body.alive {
                continue;
            }
        }

        for ei in 0..state.enemies.len() {
            if resolve_projectile_enemy(&mut state.projectiles[ji], &mut state.enemies[ei]) {
                let owner = state.projectiles[ji].owner;
                let (ex, ey) = {
                    let b = &state.enemies[ei].body;
                    (b.center_x(), b.pos.y)
                };
                state.add_score(owner, SCORE_YARN_HIT, ex, ey);
                state.push_event(GameEvent::Stomp);
                state.poof(ex, ey, 0xF8BBD0, 5);
                break;
            }
        }
    }
}

/// Step 8: block-born items pop up, fall, and come to rest. Pre-placed
/// items are scenery until collected and never move.
fn step_items(state: &mut GameState, dt: f32) {
    let grid = &state.grid;
    for it in &mut state.items {
        if !it.body.alive || it.origin.is_none() {
            continue;
        }
        apply_gravity(&mut it.body, dt);
        move_and_collide(&mut it.body, grid, dt);
    }
}

/// Step 9: pickups.
fn resolve_item_pickups(state: &mut GameState) {
    for pi in 0..state.players.len() {
        for ii in 0..state.items.len() {
            if let Some(effect) =
                resolve_player_item(&mut state.players[pi], &mut state.items[ii])
            {
                let (x, y) = {
                    let b = &state.items[ii].body;
                    (b.center_x(), b.pos.y)
                };
                state.add_score(pi, effect.score, x, y);
                state.push_event(if effect.powerup {
                    GameEvent::Powerup
                } else {
                    GameEvent::Collect
                });
            }
        }
    }
}

/// Step 10: the camera chases the rightmost living player.
fn step_camera(state: &mut GameState) {
    let lead = state
        .players
        .iter()
        .filter(|p| p.body.alive)
        .map(|p| p.body.center_x())
        .fold(f32::NEG_INFINITY, f32::max);
    if lead.is_finite() {
        state.camera.follow(lead, state.grid.width_px());
    }
}

/// Step 11: drop dead entities, preserving relative order.
fn compact(state: &mut GameState) {
    state.enemies.retain(|e| e.body.alive);
    state.projectiles.retain(|p| p.body.alive);
    state.items.retain(|i| i.body.alive);
}

/// Step 12: cosmetic-only motion, outside the collision world.
fn step_cosmetics(state: &mut GameState) {
    for p in &mut state.particles {
        p.vel.y += 0.2;
        p.pos += p.vel;
        p.life = p.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);

    for s in &mut state.score_pops {
        s.pos += Vec2::new(0.0, -0.5);
        s.life = s.life.saturating_sub(1);
    }
    state.score_pops.retain(|s| s.life > 0);
}

/// Step 13: deaths, respawns, and the game-over latch.
fn step_transitions(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    // A fresh death is a dead body with lives still on the counter. Players
    // whose run already ended stay benched and must not retrigger resets.
    if !state.players.iter().any(|p| !p.body.alive && p.lives > 0) {
        return;
    }

    for p in &mut state.players {
        if !p.body.alive && p.lives > 0 {
            p.lives -= 1;
        }
    }
    state.push_event(GameEvent::Death);

    if state.players.iter().all(|p| p.lives == 0) {
        log::info!("game over at frame {}", state.frame);
        state.phase = GamePhase::GameOver;
        return;
    }

    // Any death rewinds the level for everyone; lives, score, and power
    // carry through the reset
    state.reset_level();
    for p in &mut state.players {
        if p.lives == 0 {
            p.body.alive = false;
        }
    }
}
