//! Headless demo driver
//!
//! Runs the built-in level with a scripted "hold right, hop at walls"
//! player and prints a run summary. Useful for profiling and for eyeballing
//! determinism: the same seed always prints the same summary.

use std::collections::BTreeMap;
use std::path::Path;

use yarn_dash::consts::*;
use yarn_dash::settings::Difficulty;
use yarn_dash::sim::{GameEvent, GamePhase, TickInput, tick};
use yarn_dash::{LevelData, Session, Settings, to_cell};

fn main() {
    env_logger::init();

    let settings = Settings::load(Path::new("settings.json"));
    let mut session = Session::new(settings.clone());
    let level = LevelData::build_default(settings.difficulty == Difficulty::Easy);
    let mut state = session.start_level(level, 0xC0FFEE);

    log::info!(
        "starting '{}' ({} cols, {} enemies)",
        state.level.name,
        state.level.width,
        state.level.enemies.len()
    );

    let mut event_counts: BTreeMap<GameEvent, u32> = BTreeMap::new();
    let mut last_x = state.players[0].body.pos.x;
    let mut stuck_frames = 0u32;
    let max_frames = FRAMES_PER_SECOND * 240;

    while state.phase == GamePhase::Playing && state.frame < max_frames {
        // Hop whenever forward progress stalls (wall or tube)
        let x = state.players[0].body.pos.x;
        if (x - last_x).abs() < 0.5 && state.players[0].body.grounded {
            stuck_frames += 1;
        } else {
            stuck_frames = 0;
        }
        last_x = x;

        // And jump early when a pit opens up ahead
        let p = &state.players[0].body;
        let gap_ahead = p.grounded
            && !state
                .grid
                .tile_at(to_cell(p.right() + TILE_SIZE), to_cell(p.bottom() + 1.0))
                .is_solid();

        let jump = stuck_frames > 4 || gap_ahead;
        let input = TickInput {
            right: true,
            run: true,
            jump_pressed: jump,
            jump_held: jump || stuck_frames > 0,
            ..TickInput::default()
        };
        tick(&mut state, &[input], 1.0);

        for event in state.drain_events() {
            *event_counts.entry(event).or_insert(0) += 1;
        }
    }

    session.capture(&state);
    if state.phase == GamePhase::LevelComplete {
        session.record_level_clear();
    }

    let p = &state.players[0];
    println!("phase:      {:?}", state.phase);
    println!("frames:     {}", state.frame);
    println!("distance:   {:.0} px", p.body.pos.x);
    println!("score:      {}", session.total_score());
    println!("lives left: {}", p.lives);
    println!("treats:     {}", p.treats);
    for (event, count) in &event_counts {
        println!("  {event:?}: {count}");
    }
}
