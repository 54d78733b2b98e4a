//! Physics integration against the tile grid
//!
//! Movement is axis-separated: the horizontal displacement is applied and
//! resolved before the vertical one. On overlap the position reverts and is
//! walked back toward the target one pixel at a time until the next step
//! would collide. That final resting spot is what lets callers observe
//! "blocked" and react (enemy reversal, head bumps, landing).

use super::grid::TileGrid;
use super::state::Body;
use crate::consts::{GRAVITY, TERMINAL_VELOCITY};

/// Which axes collided during a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveResult {
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// Vertical block was upward (head bump), not a landing
    pub hit_ceiling: bool,
}

/// Accumulate gravity, clamped to terminal velocity so a long fall cannot
/// tunnel through one-tile-thick platforms.
pub fn apply_gravity(body: &mut Body, dt: f32) {
    body.vel.y = (body.vel.y + GRAVITY * dt).min(TERMINAL_VELOCITY);
}

/// Move `body` by `vel * dt` with axis-separated grid collision. Blocked
/// axes have their velocity zeroed; a downward block grounds the body.
pub fn move_and_collide(body: &mut Body, grid: &TileGrid, dt: f32) -> MoveResult {
    let mut result = MoveResult::default();

    let step_x = body.vel.x * dt;
    if step_x != 0.0 {
        body.pos.x += step_x;
        if grid.solid_at(body.pos.x, body.pos.y, body.size.x, body.size.y) {
            body.pos.x -= step_x;
            walk_back_x(body, grid, step_x);
            body.vel.x = 0.0;
            result.blocked_x = true;
        }
    }

    let step_y = body.vel.y * dt;
    if step_y != 0.0 {
        body.grounded = false;
        body.pos.y += step_y;
        if grid.solid_at(body.pos.x, body.pos.y, body.size.x, body.size.y) {
            body.pos.y -= step_y;
            walk_back_y(body, grid, step_y);
            if step_y > 0.0 {
                body.grounded = true;
            } else {
                result.hit_ceiling = true;
            }
            body.vel.y = 0.0;
            result.blocked_y = true;
        }
    }

    result
}

/// Step toward the blocked horizontal target while the next pixel is clear.
/// The step count is bounded by the original displacement, so a degenerate
/// already-overlapping start can never spin.
fn walk_back_x(body: &mut Body, grid: &TileGrid, step: f32) {
    let sign = step.signum();
    let mut budget = step.abs().ceil() as u32;
    while budget > 0
        && !grid.solid_at(body.pos.x + sign, body.pos.y, body.size.x, body.size.y)
    {
        body.pos.x += sign;
        budget -= 1;
    }
}

fn walk_back_y(body: &mut Body, grid: &TileGrid, step: f32) {
    let sign = step.signum();
    let mut budget = step.abs().ceil() as u32;
    while budget > 0
        && !grid.solid_at(body.pos.x, body.pos.y + sign, body.size.x, body.size.y)
    {
        body.pos.y += sign;
        budget -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TILE_SIZE;
    use crate::sim::grid::Tile;
    use proptest::prelude::*;

    /// 20x10 grid: solid floor at row 8, wall at column 15, ceiling strip
    fn arena() -> TileGrid {
        let mut g = TileGrid::new(20, 10);
        for col in 0..20 {
            g.set_tile(col, 8, Tile::Ground);
        }
        for row in 0..10 {
            g.set_tile(15, row, Tile::Ground);
        }
        for col in 4..8 {
            g.set_tile(col, 2, Tile::Platform);
        }
        g
    }

    #[test]
    fn test_falling_body_lands_and_grounds() {
        let g = arena();
        let mut body = Body::new(64.0, 4.0 * TILE_SIZE, 32.0, 32.0);
        body.vel.y = 10.0;

        let mut landed = false;
        for _ in 0..40 {
            apply_gravity(&mut body, 1.0);
            let r = move_and_collide(&mut body, &g, 1.0);
            if r.blocked_y {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(body.grounded);
        assert_eq!(body.vel.y, 0.0);
        // Resting exactly on the floor at row 8
        assert_eq!(body.bottom(), 8.0 * TILE_SIZE);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let g = arena();
        let mut body = Body::new(13.0 * TILE_SIZE, 7.0 * TILE_SIZE, 32.0, 32.0);
        body.vel.x = 50.0;

        let r = move_and_collide(&mut body, &g, 1.0);
        assert!(r.blocked_x);
        assert_eq!(body.vel.x, 0.0);
        // Flush against the wall at column 15
        assert_eq!(body.right(), 15.0 * TILE_SIZE);
    }

    #[test]
    fn test_head_bump_only_zeroes_vertical_velocity() {
        let g = arena();
        // Just below the platform strip at row 2
        let mut body = Body::new(5.0 * TILE_SIZE, 3.0 * TILE_SIZE + 8.0, 32.0, 32.0);
        body.vel = glam::Vec2::new(2.0, -12.0);

        let r = move_and_collide(&mut body, &g, 1.0);
        assert!(r.blocked_y);
        assert!(r.hit_ceiling);
        assert!(!body.grounded);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.vel.x, 2.0);
        assert_eq!(body.pos.y, 3.0 * TILE_SIZE);
    }

    #[test]
    fn test_zero_displacement_is_a_noop() {
        let g = arena();
        let mut body = Body::new(64.0, 64.0, 32.0, 32.0);
        let before = body.pos;
        let r = move_and_collide(&mut body, &g, 1.0);
        assert_eq!(r, MoveResult::default());
        assert_eq!(body.pos, before);
    }

    #[test]
    fn test_terminal_velocity_clamp() {
        let mut body = Body::new(0.0, 0.0, 32.0, 32.0);
        for _ in 0..100 {
            apply_gravity(&mut body, 2.0);
        }
        assert_eq!(body.vel.y, TERMINAL_VELOCITY);
    }

    proptest! {
        /// After resolution the body never overlaps a solid cell, for any
        /// clear starting cell and any velocity the sim can produce.
        #[test]
        fn prop_no_overlap_after_resolution(
            col in 0i32..14,
            row in 0i32..8,
            vx in -15.0f32..15.0,
            vy in -15.0f32..15.0,
            dt in 0.0f32..2.0,
        ) {
            let g = arena();
            let x = col as f32 * TILE_SIZE;
            let y = row as f32 * TILE_SIZE;
            prop_assume!(!g.solid_at(x, y, 32.0, 32.0));

            let mut body = Body::new(x, y, 32.0, 32.0);
            body.vel = glam::Vec2::new(vx, vy);
            move_and_collide(&mut body, &g, dt);

            prop_assert!(!g.solid_at(body.pos.x, body.pos.y, body.size.x, body.size.y));
        }
    }
}
