//! Entity-vs-entity interaction rules
//!
//! The tricky part of a platformer core: classifying a player/enemy contact
//! as a stomp or a side hit, and keeping every resolver rule a pure function
//! of pre-tick state so pair evaluation order cannot change the outcome.

use super::grid::{Tile, TileGrid};
use super::state::{
    Body, Enemy, EnemyKind, EnemyState, HitResult, Item, ItemKind, Player, PowerState, Projectile,
};
use crate::consts::*;
use crate::level::LevelData;
use crate::to_cell;

/// Stomp classification slack, in pixels. The player's feet may be slightly
/// below the enemy's crown at contact time and still count as a stomp.
/// Tunable; stomp wins whenever both readings are possible.
pub const STOMP_FOOT_SLACK: f32 = 3.0;
pub const STOMP_HEAD_SLACK: f32 = 4.0;

/// Strict-inequality AABB overlap
#[inline]
pub fn aabb_overlap(a: &Body, b: &Body) -> bool {
    a.pos.x < b.pos.x + b.size.x
        && a.pos.x + a.size.x > b.pos.x
        && a.pos.y < b.pos.y + b.size.y
        && a.pos.y + a.size.y > b.pos.y
}

/// Contact classification for an overlapping player/enemy pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Falling onto the enemy's crown
    Stomp,
    Side,
}

pub fn classify_contact(player: &Body, enemy: &Body) -> Hit {
    if player.vel.y > 0.0 && player.bottom() - STOMP_FOOT_SLACK < enemy.pos.y + STOMP_HEAD_SLACK {
        Hit::Stomp
    } else {
        Hit::Side
    }
}

/// What a player/enemy contact did, for score and event mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyContact {
    /// No overlap, enemy already dying, or inert/invincible contact
    Ignored,
    /// Enemy defeated or shelled by a stomp
    Stomped { score: u32 },
    /// Shell sent sliding
    Kicked { score: u32 },
    /// Player dropped a tier
    Damaged,
    /// Player hit at Small
    Killed,
}

/// Resolve one player/enemy pair. Reads only this pair's pre-tick state and
/// mutates only this pair, so calls for distinct pairs commute.
pub fn resolve_player_enemy(player: &mut Player, enemy: &mut Enemy) -> EnemyContact {
    if enemy.is_stomped() || !enemy.body.alive || !player.body.alive {
        return EnemyContact::Ignored;
    }
    if !aabb_overlap(&player.body, &enemy.body) {
        return EnemyContact::Ignored;
    }

    // Kick direction always pushes the shell away from the player
    let away = if player.body.center_x() < enemy.body.center_x() {
        1.0
    } else {
        -1.0
    };

    match classify_contact(&player.body, &enemy.body) {
        Hit::Stomp => {
            player.body.vel.y = STOMP_REBOUND;
            match (enemy.kind, enemy.state) {
                (EnemyKind::Patroller, _) => {
                    enemy.body.vel.x = 0.0;
                    enemy.state = EnemyState::Stomped {
                        frames_left: STOMP_ANIM_FRAMES,
                    };
                    EnemyContact::Stomped { score: SCORE_STOMP }
                }
                (EnemyKind::Shelled, EnemyState::Walking) => {
                    enemy.enter_shell();
                    EnemyContact::Stomped {
                        score: SCORE_SHELL_STOMP,
                    }
                }
                // Landing on a shell (idle or sliding) boots it away
                (EnemyKind::Shelled, _) => {
                    enemy.kick(away);
                    EnemyContact::Kicked {
                        score: SCORE_SHELL_KICK,
                    }
                }
            }
        }
        Hit::Side => {
            if enemy.is_shell_idle() {
                // Inert shell: a side touch kicks, never damages
                enemy.kick(away);
                return EnemyContact::Kicked {
                    score: SCORE_SHELL_KICK,
                };
            }
            match player.take_hit() {
                HitResult::Shrugged => EnemyContact::Ignored,
                HitResult::Downgraded => EnemyContact::Damaged,
                HitResult::Fatal => EnemyContact::Killed,
            }
        }
    }
}

/// Yarn vs enemy: any overlap spends the projectile and puts the enemy into
/// its stomped/shell-idle transition. No directional classification.
pub fn resolve_projectile_enemy(projectile: &mut Projectile, enemy: &mut Enemy) -> bool {
    if enemy.is_stomped() || !projectile.body.alive || !enemy.body.alive {
        return false;
    }
    if !aabb_overlap(&projectile.body, &enemy.body) {
        return false;
    }

    projectile.body.alive = false;
    match enemy.kind {
        EnemyKind::Patroller => {
            enemy.body.vel.x = 0.0;
            enemy.state = EnemyState::Stomped {
                frames_left: STOMP_ANIM_FRAMES,
            };
        }
        EnemyKind::Shelled => enemy.enter_shell(),
    }
    true
}

/// Score and event payload of a collected item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemEffect {
    pub score: u32,
    pub powerup: bool,
}

/// Apply an item's effect to the player and spend the item. Each instance
/// collects exactly once; the caller skips already-dead items.
pub fn resolve_player_item(player: &mut Player, item: &mut Item) -> Option<ItemEffect> {
    if !item.body.alive || !player.body.alive {
        return None;
    }
    if !aabb_overlap(&player.body, &item.body) {
        return None;
    }

    item.body.alive = false;
    let effect = match item.kind {
        ItemKind::Currency => {
            player.treats += 1;
            ItemEffect {
                score: SCORE_CURRENCY,
                powerup: false,
            }
        }
        ItemKind::PowerFish => {
            player.upgrade_to(PowerState::Big);
            ItemEffect {
                score: SCORE_FISH,
                powerup: true,
            }
        }
        ItemKind::PowerYarn => {
            player.upgrade_to(PowerState::Yarn);
            ItemEffect {
                score: SCORE_YARN_ITEM,
                powerup: true,
            }
        }
        ItemKind::ExtraLife => {
            player.lives += 1;
            ItemEffect {
                score: SCORE_EXTRA_LIFE,
                powerup: true,
            }
        }
    };
    Some(effect)
}

/// Reward-block strike on a head bump: the cell just above the player's
/// crown converts from `RewardBox` to `UsedBox` exactly once and releases
/// its reward one cell higher. The caller supplies the upward-motion
/// evidence (grid resolution zeroes the vertical velocity before this
/// runs) and suppression holds while an earlier reward from the same cell
/// is still in flight.
pub fn try_block_strike(
    player: &Player,
    grid: &mut TileGrid,
    level: &LevelData,
    items: &mut Vec<Item>,
) -> Option<(i32, i32, ItemKind)> {
    let col = to_cell(player.body.center_x());
    let row = to_cell(player.body.pos.y - 1.0);
    if grid.tile_at(col, row) != Tile::RewardBox {
        return None;
    }
    if items
        .iter()
        .any(|i| i.body.alive && i.origin == Some((col, row)))
    {
        return None;
    }

    grid.set_tile(col, row, Tile::UsedBox);
    let kind = level.reward_at(col, row);
    items.push(Item::from_block(kind, col, row));
    Some((col, row, kind))
}

/// One-shot goal trigger: true when the player's center column has reached
/// the configured goal column.
pub fn crossed_goal(player: &Body, goal_column: i32) -> bool {
    to_cell(player.center_x()) >= goal_column
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PowerState;

    fn touching_pair() -> (Player, Enemy) {
        let mut player = Player::new(100.0, 100.0);
        let enemy = Enemy::new(EnemyKind::Patroller, 110.0, 110.0);
        player.body.vel.y = 0.0;
        (player, enemy)
    }

    #[test]
    fn test_stomp_defeats_patroller_without_damage() {
        let (mut player, mut enemy) = touching_pair();
        // Falling, feet just above the enemy crown
        player.body.pos.y = enemy.body.pos.y - player.body.size.y + 2.0;
        player.body.vel.y = 5.0;
        player.invincible_frames = 0;

        let contact = resolve_player_enemy(&mut player, &mut enemy);
        assert_eq!(contact, EnemyContact::Stomped { score: SCORE_STOMP });
        assert!(enemy.is_stomped());
        assert_eq!(player.body.vel.y, STOMP_REBOUND);
        assert_eq!(player.power, PowerState::Small);
        assert!(player.body.alive);
    }

    #[test]
    fn test_side_hit_kills_small_player() {
        let (mut player, mut enemy) = touching_pair();
        player.body.vel.y = 0.0;

        let contact = resolve_player_enemy(&mut player, &mut enemy);
        assert_eq!(contact, EnemyContact::Killed);
        assert!(!player.body.alive);
    }

    #[test]
    fn test_side_hit_downgrades_big_player_once() {
        let (mut player, mut enemy) = touching_pair();
        player.set_power(PowerState::Big);

        assert_eq!(
            resolve_player_enemy(&mut player, &mut enemy),
            EnemyContact::Damaged
        );
        assert_eq!(player.power, PowerState::Small);

        // Same tick, second resolver call: invincibility absorbs it
        assert_eq!(
            resolve_player_enemy(&mut player, &mut enemy),
            EnemyContact::Ignored
        );
        assert_eq!(player.power, PowerState::Small);
    }

    #[test]
    fn test_idle_shell_is_inert_on_side_contact() {
        let mut player = Player::new(100.0, 100.0);
        let mut enemy = Enemy::new(EnemyKind::Shelled, 120.0, 92.0);
        enemy.enter_shell();

        let contact = resolve_player_enemy(&mut player, &mut enemy);
        // Kicked away from the player, no damage
        assert_eq!(
            contact,
            EnemyContact::Kicked {
                score: SCORE_SHELL_KICK
            }
        );
        assert!(enemy.is_sliding());
        assert_eq!(enemy.body.vel.x, SHELL_KICK_SPEED);
        assert_eq!(player.power, PowerState::Small);
        assert!(player.body.alive);
    }

    #[test]
    fn test_sliding_shell_damages_on_side_contact() {
        let mut player = Player::new(100.0, 100.0);
        let mut enemy = Enemy::new(EnemyKind::Shelled, 120.0, 92.0);
        enemy.enter_shell();
        enemy.kick(-1.0);

        let contact = resolve_player_enemy(&mut player, &mut enemy);
        assert_eq!(contact, EnemyContact::Killed);
    }

    #[test]
    fn test_stomp_priority_over_side_in_tolerance_band() {
        // Feet inside the slack band while falling: both readings possible,
        // stomp must win
        let mut player = Player::new(100.0, 0.0);
        let mut enemy = Enemy::new(EnemyKind::Patroller, 100.0, 100.0);
        player.body.pos.y = enemy.body.pos.y + STOMP_HEAD_SLACK - player.body.size.y;
        player.body.vel.y = 0.1;

        let contact = resolve_player_enemy(&mut player, &mut enemy);
        assert!(matches!(contact, EnemyContact::Stomped { .. }));
    }

    #[test]
    fn test_projectile_spends_itself_on_any_overlap() {
        let mut projectile = Projectile::new(0, 100.0, 100.0, 1.0);
        let mut enemy = Enemy::new(EnemyKind::Shelled, 96.0, 96.0);

        assert!(resolve_projectile_enemy(&mut projectile, &mut enemy));
        assert!(!projectile.body.alive);
        assert!(enemy.is_shell_idle());

        // Spent projectile cannot hit again
        let mut other = Enemy::new(EnemyKind::Patroller, 96.0, 96.0);
        assert!(!resolve_projectile_enemy(&mut projectile, &mut other));
    }

    #[test]
    fn test_item_collects_exactly_once() {
        let mut player = Player::new(100.0, 100.0);
        let mut item = Item::new(ItemKind::Currency, 110.0, 110.0);

        let effect = resolve_player_item(&mut player, &mut item).unwrap();
        assert_eq!(effect.score, SCORE_CURRENCY);
        assert_eq!(player.treats, 1);
        assert!(!item.body.alive);
        assert!(resolve_player_item(&mut player, &mut item).is_none());
    }

    #[test]
    fn test_fish_never_downgrades_yarn_player() {
        let mut player = Player::new(100.0, 100.0);
        player.set_power(PowerState::Yarn);
        let mut item = Item::new(ItemKind::PowerFish, 100.0, 80.0);

        let effect = resolve_player_item(&mut player, &mut item).unwrap();
        assert_eq!(player.power, PowerState::Yarn);
        assert_eq!(effect.score, SCORE_FISH);
    }

    #[test]
    fn test_block_strike_spawns_once_and_converts() {
        let level = LevelData::build_default(false);
        let mut grid = level.build_grid();
        let mut items = Vec::new();

        // Find a reward box in the built level
        let (col, row) = level
            .rewards
            .keys()
            .next()
            .map(|k| LevelData::parse_cell_key(k).unwrap())
            .expect("default level has reward boxes");
        assert_eq!(grid.tile_at(col, row), Tile::RewardBox);

        let player = Player::new(col as f32 * TILE_SIZE, (row + 1) as f32 * TILE_SIZE);

        let strike = try_block_strike(&player, &mut grid, &level, &mut items);
        assert!(strike.is_some());
        assert_eq!(grid.tile_at(col, row), Tile::UsedBox);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].origin, Some((col, row)));

        // Used box cannot strike again
        let again = try_block_strike(&player, &mut grid, &level, &mut items);
        assert!(again.is_none());
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_in_flight_item_suppresses_duplicate_spawn() {
        let level = LevelData::build_default(false);
        let mut grid = level.build_grid();
        grid.set_tile(5, 5, Tile::RewardBox);
        let mut items = vec![Item::from_block(ItemKind::Currency, 5, 5)];

        let player = Player::new(5.0 * TILE_SIZE, 6.0 * TILE_SIZE);

        assert!(try_block_strike(&player, &mut grid, &level, &mut items).is_none());
        // The box itself stays unstruck
        assert_eq!(grid.tile_at(5, 5), Tile::RewardBox);
    }

    #[test]
    fn test_goal_is_reached_at_column() {
        let body = Body::new(10.0 * TILE_SIZE, 0.0, 32.0, 32.0);
        assert!(!crossed_goal(&body, 20));
        assert!(crossed_goal(&body, 10));
        assert!(crossed_goal(&body, 5));
    }
}
