//! One-directional follow camera
//!
//! The camera eases toward the lead player but never scrolls backward, which
//! is also what makes the left viewport edge a hard wall for players.

use serde::{Deserialize, Serialize};

use crate::consts::{CAMERA_LEAD_FRACTION, CAMERA_LERP};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Left edge of the view in world pixels
    pub x: f32,
    pub viewport_w: f32,
    pub viewport_h: f32,
}

impl Camera {
    pub fn new(viewport_w: f32, viewport_h: f32) -> Self {
        Self {
            x: 0.0,
            viewport_w,
            viewport_h,
        }
    }

    /// Ease toward the lead player's position, clamped to the level and
    /// floored at the current position (no backward scroll).
    pub fn follow(&mut self, lead_x: f32, level_width_px: f32) {
        let max_x = (level_width_px - self.viewport_w).max(0.0);
        let target = (lead_x - self.viewport_w * CAMERA_LEAD_FRACTION).max(self.x);
        self.x += (target.min(max_x) - self.x) * CAMERA_LERP;
        self.x = self.x.clamp(0.0, max_x);
    }

    /// World x past the camera's right margin where off-screen projectiles
    /// are culled
    pub fn right_cull_bound(&self) -> f32 {
        self.x + self.viewport_w + 50.0
    }

    pub fn left_cull_bound(&self) -> f32 {
        self.x - 50.0
    }
}
