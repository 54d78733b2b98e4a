//! Static level geometry: the tile grid
//!
//! One grid lookup is the unit of collision granularity for everything in the
//! sim. The grid never changes mid-tick except through `set_tile` (reward box
//! conversion), which runs in the resolver step before any later step reads
//! the cell.

use serde::{Deserialize, Serialize};

use crate::consts::TILE_SIZE;
use crate::{to_cell, to_cell_edge};

/// Tile kinds. Everything except `Empty` and `GoalTop` blocks movement;
/// `RewardBox` additionally reacts to head bumps and `GoalPole` marks the
/// level-exit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Ground,
    Platform,
    RewardBox,
    UsedBox,
    TubeTop,
    TubeBody,
    GoalPole,
    /// Flag decoration atop the pole; not solid
    GoalTop,
    GoalBase,
}

impl Tile {
    pub fn is_solid(self) -> bool {
        !matches!(self, Tile::Empty | Tile::GoalTop)
    }
}

/// Column-major tile map. Out-of-bounds lookups resolve to solid ground so
/// nothing can walk or fall off the edge of the coordinate system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    width: i32,
    height: i32,
    /// `tiles[col * height + row]`
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Level width in pixels (camera clamp bound)
    pub fn width_px(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    /// Level height in pixels (fall-out bound)
    pub fn height_px(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    pub fn tile_at(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            return Tile::Ground;
        }
        self.tiles[(col * self.height + row) as usize]
    }

    pub fn set_tile(&mut self, col: i32, row: i32, tile: Tile) {
        if col < 0 || row < 0 || col >= self.width || row >= self.height {
            log::warn!("set_tile out of range: ({col}, {row})");
            return;
        }
        self.tiles[(col * self.height + row) as usize] = tile;
    }

    /// True if any cell overlapped by the AABB at `(x, y, w, h)` is solid.
    pub fn solid_at(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        let c0 = to_cell(x);
        let c1 = to_cell_edge(x + w);
        let r0 = to_cell(y);
        let r1 = to_cell_edge(y + h);
        for col in c0..=c1 {
            for row in r0..=r1 {
                if self.tile_at(col, row).is_solid() {
                    return true;
                }
            }
        }
        false
    }
}
