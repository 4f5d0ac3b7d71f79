use bevy_ecs::event::EventWriter;
use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Query, Res, ResMut};
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::{DEATH_SHIELD, EAT_SHIELD};
use crate::events::GameEvent;
use crate::level::CurrentLevel;
use crate::systems::components::{DesiredDirection, PlayerControlled, PlayerLives, Position, Score, Velocity};
use crate::systems::ghost::{respawn_ghost, Ghost};
use crate::systems::state::{PlayerTimers, SessionState};

/// Resolves player-ghost contacts for the tick.
///
/// The shield is sampled once up front, so a shield granted mid-sweep (by
/// eating a frightened ghost) does not cut the sweep short. Eating resolves
/// per ghost and the sweep continues; a catch with lives remaining resets
/// every actor and ends the sweep; a catch with none left marks the session
/// over but keeps sweeping, exactly as the checks run back to back.
#[allow(clippy::too_many_arguments)]
pub fn collision_system(
    config: Res<Config>,
    level: Res<CurrentLevel>,
    mut timers: ResMut<PlayerTimers>,
    mut session: ResMut<SessionState>,
    mut score: ResMut<Score>,
    mut lives: ResMut<PlayerLives>,
    mut desired: ResMut<DesiredDirection>,
    mut players: Query<(&mut Position, &mut Velocity), (With<PlayerControlled>, Without<Ghost>)>,
    mut ghosts: Query<(&mut Ghost, &mut Position, &mut Velocity)>,
    mut events: EventWriter<GameEvent>,
) {
    let Ok((mut player_pos, mut player_vel)) = players.single_mut() else {
        return;
    };

    if timers.shield > 0.0 {
        return;
    }

    let mut death_reset = false;
    for (mut ghost, mut ghost_pos, mut ghost_vel) in ghosts.iter_mut() {
        if ghost_pos.actual.distance(player_pos.actual) >= config.collision_threshold {
            continue;
        }

        if ghost.frightened > 0.0 {
            score.0 += config.ghost_points;
            timers.shield = EAT_SHIELD;
            let cell = ghost_pos.cell;
            respawn_ghost(&mut ghost, &mut ghost_pos, &mut ghost_vel, config.home_time_capture);
            debug!(cell = %cell, score = score.0, "Frightened ghost eaten");
            events.write(GameEvent::GhostEaten {
                cell,
                points: config.ghost_points,
            });
            continue;
        }

        lives.0 -= 1;
        if lives.0 < 0 {
            session.over = true;
            info!(score = score.0, "Game over");
            events.write(GameEvent::GameOver { score: score.0 });
            continue;
        }

        info!(lives = lives.0, "Player caught, resetting positions");
        events.write(GameEvent::PlayerCaught { lives_left: lives.0 });
        death_reset = true;
        break;
    }

    if death_reset {
        *player_pos = Position::at(level.player_spawn);
        player_vel.direction = None;
        desired.0 = None;
        session.started = false;
        timers.shield = DEATH_SHIELD;
        for (mut ghost, mut ghost_pos, mut ghost_vel) in ghosts.iter_mut() {
            respawn_ghost(&mut ghost, &mut ghost_pos, &mut ghost_vel, config.home_time_start);
        }
    }
}
