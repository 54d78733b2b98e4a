//! Level definitions and loading
//!
//! A level is plain data: an ASCII tile map, spawn lists, a reward table for
//! question blocks, and the goal column. The simulation consumes it once at
//! load or reset and never mutates it.
//!
//! Tile map characters:
//! `.` empty, `#` ground, `=` platform, `?` reward box, `u` used box,
//! `T` tube top, `t` tube body, `|` goal pole, `^` goal top, `G` goal base.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::grid::{Tile, TileGrid};
use crate::sim::state::{EnemyKind, ItemKind};

/// Where an enemy enters the world, in cell coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub col: i32,
    pub row: i32,
}

/// A collectible placed directly in the world (not inside a block)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub col: i32,
    pub row: i32,
}

/// Complete level description. Serializable so levels can ship as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// One string per row, top to bottom; short rows read as empty
    pub rows: Vec<String>,
    pub enemies: Vec<EnemySpawn>,
    pub items: Vec<ItemSpawn>,
    /// Reward-box contents keyed by `"col,row"`; unlisted boxes pay currency
    #[serde(default)]
    pub rewards: BTreeMap<String, ItemKind>,
    /// Cell the player stands on at spawn
    pub spawn: (i32, i32),
    pub goal_column: i32,
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
}

fn default_time_limit() -> u32 {
    LEVEL_TIME
}

impl LevelData {
    /// Parse a level from JSON, dropping spawn entries that fall outside the
    /// grid rather than failing the whole load.
    pub fn from_json(json: &str) -> Result<LevelData, serde_json::Error> {
        let mut level: LevelData = serde_json::from_str(json)?;
        let (w, h) = (level.width, level.height);
        let in_bounds = |col: i32, row: i32| col >= 0 && col < w && row >= 0 && row < h;

        level.enemies.retain(|s| {
            if !in_bounds(s.col, s.row) {
                log::warn!("dropping out-of-bounds enemy spawn at ({}, {})", s.col, s.row);
                return false;
            }
            true
        });
        level.items.retain(|s| {
            if !in_bounds(s.col, s.row) {
                log::warn!("dropping out-of-bounds item spawn at ({}, {})", s.col, s.row);
                return false;
            }
            true
        });
        Ok(level)
    }

    /// Materialize the tile grid from the ASCII rows. Unknown characters
    /// read as empty with a warning.
    pub fn build_grid(&self) -> TileGrid {
        let mut grid = TileGrid::new(self.width, self.height);
        for (row, line) in self.rows.iter().enumerate().take(self.height as usize) {
            for (col, ch) in line.chars().enumerate().take(self.width as usize) {
                let tile = match ch {
                    '.' | ' ' => Tile::Empty,
                    '#' => Tile::Ground,
                    '=' => Tile::Platform,
                    '?' => Tile::RewardBox,
                    'u' => Tile::UsedBox,
                    'T' => Tile::TubeTop,
                    't' => Tile::TubeBody,
                    '|' => Tile::GoalPole,
                    '^' => Tile::GoalTop,
                    'G' => Tile::GoalBase,
                    other => {
                        log::warn!("unknown tile '{other}' at ({col}, {row}), reading as empty");
                        Tile::Empty
                    }
                };
                if tile != Tile::Empty {
                    grid.set_tile(col as i32, row as i32, tile);
                }
            }
        }
        grid
    }

    /// Pixel position of the spawn cell's top edge; the player's feet land
    /// here.
    pub fn player_spawn_px(&self) -> (f32, f32) {
        (
            self.spawn.0 as f32 * TILE_SIZE,
            self.spawn.1 as f32 * TILE_SIZE,
        )
    }

    /// What a struck reward box at `(col, row)` pays out
    pub fn reward_at(&self, col: i32, row: i32) -> ItemKind {
        self.rewards
            .get(&cell_key(col, row))
            .copied()
            .unwrap_or(ItemKind::Currency)
    }

    /// Inverse of the reward-table key format
    pub fn parse_cell_key(key: &str) -> Option<(i32, i32)> {
        let (c, r) = key.split_once(',')?;
        Some((c.trim().parse().ok()?, r.trim().parse().ok()?))
    }

    /// Bare grid with a single ground row along the bottom
    pub fn flat(width: i32, height: i32) -> LevelData {
        let mut level = LevelData::empty(width, height);
        level.name = "flat".into();
        level.rows[height as usize - 1] = "#".repeat(width as usize);
        level
    }

    /// Completely empty grid; test and sandbox scaffolding
    pub fn empty(width: i32, height: i32) -> LevelData {
        LevelData {
            name: "empty".into(),
            width,
            height,
            rows: vec![".".repeat(width as usize); height as usize],
            enemies: Vec::new(),
            items: Vec::new(),
            rewards: BTreeMap::new(),
            spawn: (2, height - 1),
            goal_column: width - 2,
            time_limit: LEVEL_TIME,
        }
    }

    /// The built-in opening level: a long runway with gaps, tubes, reward
    /// boxes, platform steps, and a goal pole at the far end.
    pub fn build_default(easy: bool) -> LevelData {
        let width = 140;
        let height = 14;
        let ground_row = height - 1;
        let mut level = LevelData::empty(width, height);
        level.name = "meadow-1".into();
        level.time_limit = if easy { LEVEL_TIME + 100 } else { LEVEL_TIME };

        let mut map = vec![vec!['.'; width as usize]; height as usize];
        let set = |map: &mut Vec<Vec<char>>, col: i32, row: i32, ch: char| {
            if col >= 0 && col < width && row >= 0 && row < height {
                map[row as usize][col as usize] = ch;
            }
        };

        // Ground with two pits
        let pits = [(48, 50), (85, 88)];
        for col in 0..width {
            let in_pit = pits.iter().any(|&(a, b)| col >= a && col <= b);
            if !in_pit {
                set(&mut map, col, ground_row, '#');
                set(&mut map, col, ground_row - 1, '#');
            }
        }

        // Tubes of increasing height, seated on the upper ground row
        for (col, h) in [(22, 2), (36, 3), (58, 4)] {
            set(&mut map, col, ground_row - 2 - h, 'T');
            set(&mut map, col + 1, ground_row - 2 - h, 'T');
            for d in 0..h {
                set(&mut map, col, ground_row - 2 - d, 't');
                set(&mut map, col + 1, ground_row - 2 - d, 't');
            }
        }

        // Reward boxes; the table below decides the good ones
        let box_row = ground_row - 5;
        for col in [12, 16, 17, 18, 44, 66, 67, 94] {
            set(&mut map, col, box_row, '?');
        }
        level.rewards.insert(cell_key(17, box_row), ItemKind::PowerFish);
        level.rewards.insert(cell_key(66, box_row), ItemKind::PowerYarn);
        level.rewards.insert(cell_key(94, box_row), ItemKind::ExtraLife);

        // Platform steps before the second pit
        for (i, col) in (76..82).enumerate() {
            for d in 0..=i as i32 {
                set(&mut map, col, ground_row - 2 - d, '=');
            }
        }
        // High platform run over the second pit
        for col in 84..90 {
            set(&mut map, col, ground_row - 6, '=');
        }

        // Goal pole
        let goal_col = width - 8;
        set(&mut map, goal_col, ground_row - 2, 'G');
        for d in 3..10 {
            set(&mut map, goal_col, ground_row - d, '|');
        }
        set(&mut map, goal_col, ground_row - 10, '^');
        level.goal_column = goal_col;

        level.rows = map
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();

        level.enemies = vec![
            EnemySpawn { kind: EnemyKind::Patroller, col: 20, row: ground_row - 3 },
            EnemySpawn { kind: EnemyKind::Patroller, col: 30, row: ground_row - 3 },
            EnemySpawn { kind: EnemyKind::Patroller, col: 41, row: ground_row - 3 },
            EnemySpawn { kind: EnemyKind::Shelled, col: 54, row: ground_row - 4 },
            EnemySpawn { kind: EnemyKind::Patroller, col: 70, row: ground_row - 3 },
            EnemySpawn { kind: EnemyKind::Patroller, col: 72, row: ground_row - 3 },
            EnemySpawn { kind: EnemyKind::Shelled, col: 98, row: ground_row - 4 },
            EnemySpawn { kind: EnemyKind::Patroller, col: 110, row: ground_row - 3 },
        ];

        // Treat trails between the set pieces
        level.items = (26..30)
            .chain(61..64)
            .map(|col| ItemSpawn {
                kind: ItemKind::Currency,
                col,
                row: ground_row - 4,
            })
            .collect();
        if easy {
            level.items.push(ItemSpawn {
                kind: ItemKind::ExtraLife,
                col: 8,
                row: ground_row - 3,
            });
        }

        level.spawn = (3, ground_row - 1);
        level
    }
}

fn cell_key(col: i32, row: i32) -> String {
    format!("{col},{row}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_shape() {
        let level = LevelData::build_default(false);
        let grid = level.build_grid();

        assert_eq!(grid.width(), level.width);
        assert!(level.goal_column < level.width);
        assert!(!level.enemies.is_empty());
        assert!(!level.rewards.is_empty());

        // Spawn cell is standing room: solid floor, empty above
        let (col, row) = level.spawn;
        assert!(grid.tile_at(col, row).is_solid());
        assert!(!grid.tile_at(col, row - 1).is_solid());

        // Goal pole is climbable space over a solid base
        assert!(grid.tile_at(level.goal_column, level.height - 3).is_solid());
    }

    #[test]
    fn test_reward_table_defaults_to_currency() {
        let level = LevelData::build_default(false);
        let (col, row) = level
            .rewards
            .keys()
            .next()
            .map(|k| LevelData::parse_cell_key(k).unwrap())
            .unwrap();
        assert_ne!(level.reward_at(col, row), ItemKind::Currency);
        assert_eq!(level.reward_at(0, 0), ItemKind::Currency);
    }

    #[test]
    fn test_cell_key_round_trip() {
        assert_eq!(LevelData::parse_cell_key(&cell_key(17, 8)), Some((17, 8)));
        assert_eq!(LevelData::parse_cell_key("not a key"), None);
        assert_eq!(LevelData::parse_cell_key("3,"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let level = LevelData::build_default(true);
        let json = serde_json::to_string(&level).unwrap();
        let back = LevelData::from_json(&json).unwrap();

        assert_eq!(back.name, level.name);
        assert_eq!(back.enemies.len(), level.enemies.len());
        assert_eq!(back.rewards, level.rewards);
        assert_eq!(back.spawn, level.spawn);
    }

    #[test]
    fn test_from_json_drops_out_of_bounds_spawns() {
        let mut level = LevelData::flat(20, 10);
        level.enemies.push(EnemySpawn {
            kind: EnemyKind::Patroller,
            col: 99,
            row: 5,
        });
        level.items.push(ItemSpawn {
            kind: ItemKind::Currency,
            col: 5,
            row: -3,
        });
        let json = serde_json::to_string(&level).unwrap();
        let back = LevelData::from_json(&json).unwrap();
        assert!(back.enemies.is_empty());
        assert!(back.items.is_empty());
    }

    #[test]
    fn test_unknown_tile_reads_as_empty() {
        let mut level = LevelData::empty(4, 2);
        level.rows[0] = "#Z#.".into();
        let grid = level.build_grid();
        assert_eq!(grid.tile_at(0, 0), Tile::Ground);
        assert_eq!(grid.tile_at(1, 0), Tile::Empty);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let mut level = LevelData::empty(6, 2);
        level.rows[1] = "##".into();
        let grid = level.build_grid();
        assert_eq!(grid.tile_at(1, 1), Tile::Ground);
        assert_eq!(grid.tile_at(5, 1), Tile::Empty);
    }
}
