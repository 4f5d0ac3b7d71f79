use bevy_ecs::event::EventWriter;
use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res, ResMut};
use tracing::{debug, trace};

use crate::config::Config;
use crate::events::GameEvent;
use crate::level::CurrentLevel;
use crate::map::MapTile;
use crate::systems::components::{ItemCounts, PlayerControlled, Position, Score};
use crate::systems::ghost::Ghost;
use crate::systems::state::PlayerTimers;

/// Consumes whatever item sits on the player's cell.
///
/// Pellets score; power pellets start the power window and frighten every
/// ghost at once, wherever it is and whatever it was doing.
pub fn consume_system(
    mut level: ResMut<CurrentLevel>,
    config: Res<Config>,
    mut score: ResMut<Score>,
    mut counts: ResMut<ItemCounts>,
    mut timers: ResMut<PlayerTimers>,
    players: Query<&Position, With<PlayerControlled>>,
    mut ghosts: Query<&mut Ghost>,
    mut events: EventWriter<GameEvent>,
) {
    let Ok(player) = players.single() else {
        return;
    };
    let cell = player.cell;

    match level.grid.take_item(cell) {
        Some(MapTile::Pellet) => {
            score.0 += config.pellet_points;
            counts.pellets -= 1;
            trace!(cell = %cell, remaining = counts.pellets, score = score.0, "Pellet eaten");
            events.write(GameEvent::PelletEaten {
                cell,
                remaining: counts.pellets,
            });
        }
        Some(MapTile::PowerPellet) => {
            counts.power_pellets -= 1;
            timers.power = config.power_duration;
            let mut frightened = 0;
            for mut ghost in ghosts.iter_mut() {
                ghost.frightened = config.power_duration;
                frightened += 1;
            }
            debug!(cell = %cell, frightened, duration = config.power_duration, "Power pellet eaten");
            events.write(GameEvent::PowerEaten { cell });
        }
        _ => {}
    }
}
