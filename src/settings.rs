//! Game settings and preferences
//!
//! Persisted separately from level data as a small JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::state::Player;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Normal,
    Easy,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Normal => "Normal",
            Difficulty::Easy => "Easy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(Difficulty::Normal),
            "easy" => Some(Difficulty::Easy),
            _ => None,
        }
    }

    /// Starting lives for a fresh run
    pub fn starting_lives(&self) -> u32 {
        match self {
            Difficulty::Normal => START_LIVES,
            Difficulty::Easy => EASY_START_LIVES,
        }
    }

    /// Easy mode jumps a little higher
    pub fn jump_impulse(&self) -> f32 {
        match self {
            Difficulty::Normal => JUMP_IMPULSE,
            Difficulty::Easy => EASY_JUMP_IMPULSE,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Players ===
    /// 1 or 2 local players
    pub player_count: usize,

    // === Visual effects ===
    pub particles: bool,
    pub score_pops: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            player_count: 1,

            // Visual effects on by default
            particles: true,
            score_pops: true,

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl Settings {
    /// Stamp difficulty-dependent fields onto a freshly spawned player
    pub fn configure_player(&self, player: &mut Player) {
        player.lives = self.difficulty.starting_lives();
        player.jump_impulse = self.difficulty.jump_impulse();
    }

    /// Effective sfx gain after master and mute
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Load settings from a JSON file, falling back to defaults on any
    /// missing or malformed file.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings file, using defaults: {e}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as JSON, best effort
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    log::warn!("Failed to save settings: {e}");
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }
}
