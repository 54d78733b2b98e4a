//! Cross-level session state
//!
//! Lives, score, and power tier belong to the run, not the level. The
//! session captures them when a level ends and stamps them onto the players
//! of the next one; the sim itself never persists anything.

use serde::{Deserialize, Serialize};

use crate::level::LevelData;
use crate::settings::Settings;
use crate::sim::state::{GameState, PowerState};

/// Per-player stats that survive a level change
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerStats {
    pub lives: u32,
    pub score: u32,
    pub power: PowerState,
    pub treats: u32,
}

/// One run of the game: settings plus carried player stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub settings: Settings,
    pub players: Vec<PlayerStats>,
    /// Levels completed this run
    pub levels_cleared: u32,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        let stats = PlayerStats {
            lives: settings.difficulty.starting_lives(),
            score: 0,
            power: PowerState::Small,
            treats: 0,
        };
        let players = vec![stats; settings.player_count.clamp(1, 2)];
        Self {
            settings,
            players,
            levels_cleared: 0,
        }
    }

    /// Build the game state for a level, applying carried stats and
    /// difficulty configuration to each player.
    pub fn start_level(&self, level: LevelData, seed: u64) -> GameState {
        let mut state = GameState::new(level, self.players.len(), seed);
        for (p, stats) in state.players.iter_mut().zip(&self.players) {
            self.settings.configure_player(p);
            p.lives = stats.lives;
            p.score = stats.score;
            p.treats = stats.treats;
            p.set_power(stats.power);
        }
        state
    }

    /// Pull each player's carried stats back out of a finished level.
    pub fn capture(&mut self, state: &GameState) {
        for (stats, p) in self.players.iter_mut().zip(&state.players) {
            stats.lives = p.lives;
            stats.score = p.score;
            stats.power = p.power;
            stats.treats = p.treats;
        }
    }

    pub fn record_level_clear(&mut self) {
        self.levels_cleared += 1;
    }

    pub fn total_score(&self) -> u32 {
        self.players.iter().map(|p| p.score).sum()
    }

    pub fn is_over(&self) -> bool {
        self.players.iter().all(|p| p.lives == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Difficulty;

    #[test]
    fn test_new_session_uses_difficulty_lives() {
        let mut settings = Settings::default();
        settings.difficulty = Difficulty::Easy;
        settings.player_count = 2;

        let session = Session::new(settings);
        assert_eq!(session.players.len(), 2);
        assert!(session.players.iter().all(|p| p.lives == EASY_START_LIVES));
        assert!(!session.is_over());
    }

    #[test]
    fn test_stats_carry_across_levels() {
        let mut session = Session::new(Settings::default());
        let mut state = session.start_level(LevelData::flat(40, 14), 1);

        state.players[0].score = 1234;
        state.players[0].lives = 2;
        state.players[0].treats = 7;
        state.players[0].set_power(PowerState::Yarn);
        session.capture(&state);
        session.record_level_clear();

        let next = session.start_level(LevelData::flat(40, 14), 2);
        let p = &next.players[0];
        assert_eq!(p.score, 1234);
        assert_eq!(p.lives, 2);
        assert_eq!(p.treats, 7);
        assert_eq!(p.power, PowerState::Yarn);
        assert_eq!(p.body.size.y, PLAYER_H_BIG);
        assert_eq!(session.levels_cleared, 1);
        assert_eq!(session.total_score(), 1234);
    }

    #[test]
    fn test_easy_jump_applied_on_level_start() {
        let mut settings = Settings::default();
        settings.difficulty = Difficulty::Easy;
        let session = Session::new(settings);

        let state = session.start_level(LevelData::flat(40, 14), 1);
        assert_eq!(state.players[0].jump_impulse, EASY_JUMP_IMPULSE);
    }

    #[test]
    fn test_session_over_when_all_lives_spent() {
        let mut session = Session::new(Settings::default());
        session.players[0].lives = 0;
        assert!(session.is_over());
    }
}
