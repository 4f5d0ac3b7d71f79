use bevy_ecs::component::Component;
use bevy_ecs::event::EventWriter;
use bevy_ecs::query::{With, Without};
use bevy_ecs::system::{Query, Res, ResMut};
use glam::IVec2;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;
use strum_macros::AsRefStr;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::GameError;
use crate::level::CurrentLevel;
use crate::map::direction::Direction;
use crate::map::{Grid, MapTile, TraversalFlags};
use crate::systems::components::{DeltaTime, GameRng, PlayerControlled, Position, Velocity};
use crate::systems::movement::step_actor;

/// Probability of committing to the player-ward direction at a decision.
const CHASE_BIAS: f32 = 0.7;
/// Flee bias bounds: base probability and its per-cell decay with distance.
const FLEE_BIAS_BASE: f32 = 0.9;
const FLEE_BIAS_DECAY: f32 = 0.05;
const FLEE_BIAS_MIN: f32 = 0.3;

/// Per-ghost AI state.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Ghost {
    /// The cell this ghost spawns in and returns to when eaten.
    pub spawn: IVec2,
    /// Seconds left dwelling in the house. The ghost is inert while positive.
    pub home_timer: f32,
    /// Seconds of frightened behavior left.
    pub frightened: f32,
    /// Standing on the door, heading out.
    pub exiting: bool,
    /// Reached the open playfield at least once since the last reset.
    pub has_exited: bool,
}

/// The behavior a ghost resolves to on a given tick, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum GhostMode {
    Home,
    Frightened,
    Exiting,
    SeekingExit,
    Chasing,
}

impl Ghost {
    pub fn new(spawn: IVec2, home_time: f32) -> Ghost {
        Ghost {
            spawn,
            home_timer: home_time,
            frightened: 0.0,
            exiting: false,
            has_exited: false,
        }
    }

    /// The behavior this ghost's state currently resolves to.
    pub fn mode(&self) -> GhostMode {
        if self.home_timer > 0.0 {
            GhostMode::Home
        } else if self.frightened > 0.0 {
            GhostMode::Frightened
        } else if self.exiting {
            GhostMode::Exiting
        } else if !self.has_exited {
            GhostMode::SeekingExit
        } else {
            GhostMode::Chasing
        }
    }

    /// Tiles this ghost may occupy. House tiles stay open until it has
    /// left the house once.
    pub fn traversal_flags(&self) -> TraversalFlags {
        if self.has_exited {
            TraversalFlags::GHOST
        } else {
            TraversalFlags::GHOST | TraversalFlags::HOUSEBOUND
        }
    }
}

/// Returns a ghost to its spawn with a fresh house dwell.
pub fn respawn_ghost(ghost: &mut Ghost, position: &mut Position, velocity: &mut Velocity, home_time: f32) {
    *position = Position::at(ghost.spawn);
    velocity.direction = None;
    ghost.home_timer = home_time;
    ghost.frightened = 0.0;
    ghost.exiting = false;
    ghost.has_exited = false;
}

/// The directions an actor with `flags` may leave `cell` in, in fixed
/// enumeration order.
pub fn passable_directions(grid: &Grid, cell: IVec2, flags: TraversalFlags) -> SmallVec<[Direction; 4]> {
    Direction::DIRECTIONS
        .iter()
        .copied()
        .filter(|dir| grid.passable(cell + dir.as_ivec2(), flags))
        .collect()
}

/// Picks a frightened ghost's direction: biased away from the player, with
/// the bias fading as distance grows.
pub fn flee_direction(
    grid: &Grid,
    cell: IVec2,
    player_cell: IVec2,
    flags: TraversalFlags,
    rng: &mut SmallRng,
) -> Option<Direction> {
    let valid = passable_directions(grid, cell, flags);
    if valid.is_empty() {
        return None;
    }

    let delta = player_cell - cell;
    let distance = delta.x.abs() + delta.y.abs();
    let bias = (FLEE_BIAS_BASE - distance as f32 * FLEE_BIAS_DECAY).max(FLEE_BIAS_MIN);

    let away = if delta.x.abs() > delta.y.abs() {
        if delta.x > 0 {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if delta.y > 0 {
        Direction::Up
    } else {
        Direction::Down
    };

    if valid.contains(&away) && rng.random::<f32>() < bias {
        return Some(away);
    }
    valid.choose(rng).copied()
}

/// Picks a chasing ghost's direction.
///
/// Between intersections the ghost commits to its corridor; at an
/// intersection (three or more open neighbors) or when blocked it prefers
/// the axis that closes the larger distance to the player, with a random
/// chance of wandering instead.
pub fn chase_direction(
    grid: &Grid,
    cell: IVec2,
    player_cell: IVec2,
    current: Option<Direction>,
    flags: TraversalFlags,
    rng: &mut SmallRng,
) -> Option<Direction> {
    let valid = passable_directions(grid, cell, flags);

    let at_intersection = valid.len() >= 3;
    let can_continue = current.is_some_and(|dir| valid.contains(&dir));
    if can_continue && !at_intersection {
        return current;
    }

    let delta = player_cell - cell;
    let preferred = if delta.x.abs() > delta.y.abs() {
        if delta.x > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if delta.y > 0 {
        Direction::Down
    } else {
        Direction::Up
    };

    if valid.contains(&preferred) && rng.random::<f32>() < CHASE_BIAS {
        return Some(preferred);
    }
    valid.choose(rng).copied()
}

/// Steers a ghost that has not yet left the house toward the door.
///
/// An adjacent door wins outright. Otherwise the ghost heads for the nearest
/// door by Manhattan distance, one axis at a time, refusing only walls (the
/// house interior is its territory). Levels without a door fall back to `Up`.
pub fn exit_seek_direction(grid: &Grid, cell: IVec2) -> Direction {
    for dir in Direction::DIRECTIONS {
        if grid.get(cell + dir.as_ivec2()) == Some(MapTile::Door) {
            return dir;
        }
    }

    let mut nearest: Option<(IVec2, i32)> = None;
    for door in grid.positions_of(MapTile::Door) {
        let delta = door - cell;
        let distance = delta.x.abs() + delta.y.abs();
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((door, distance));
        }
    }
    let Some((door, _)) = nearest else {
        return Direction::Up;
    };

    let delta = door - cell;
    let not_wall = |dir: Direction| matches!(grid.get(cell + dir.as_ivec2()), Some(tile) if tile != MapTile::Wall);

    if delta.x != 0 {
        let dir = if delta.x > 0 { Direction::Right } else { Direction::Left };
        if not_wall(dir) {
            return dir;
        }
    }
    if delta.y != 0 {
        let dir = if delta.y > 0 { Direction::Down } else { Direction::Up };
        if not_wall(dir) {
            return dir;
        }
    }
    Direction::Up
}

/// Runs every ghost's tick: timers, house-door transitions, a behavior
/// decision, and a movement step.
pub fn ghost_system(
    level: Res<CurrentLevel>,
    config: Res<Config>,
    dt: Res<DeltaTime>,
    mut rng: ResMut<GameRng>,
    players: Query<&Position, (With<PlayerControlled>, Without<Ghost>)>,
    mut ghosts: Query<(&mut Ghost, &mut Position, &mut Velocity)>,
    mut errors: EventWriter<GameError>,
) {
    let player_cell = match players.single() {
        Ok(player) => player.cell,
        Err(e) => {
            errors.write(GameError::InvalidState(format!(
                "No/multiple entities queried for ghost system: {}",
                e
            )));
            return;
        }
    };

    for (mut ghost, mut position, mut velocity) in ghosts.iter_mut() {
        if ghost.frightened > 0.0 {
            ghost.frightened = (ghost.frightened - dt.0).max(0.0);
        }
        ghost.home_timer -= dt.0;
        if ghost.home_timer > 0.0 {
            continue;
        }

        if !ghost.exiting && level.grid.get(position.cell) == Some(MapTile::Door) {
            ghost.exiting = true;
        }
        if ghost.exiting && !ghost.has_exited {
            if let Some(tile) = level.grid.get(position.cell) {
                if tile.is_playable() {
                    ghost.has_exited = true;
                    ghost.exiting = false;
                    debug!(cell = %position.cell, "Ghost reached the open playfield");
                }
            }
        }

        let flags = ghost.traversal_flags();
        let desired = match ghost.mode() {
            GhostMode::Home => None,
            GhostMode::Frightened => flee_direction(&level.grid, position.cell, player_cell, flags, &mut rng.0),
            GhostMode::Exiting => velocity.direction,
            GhostMode::SeekingExit => Some(exit_seek_direction(&level.grid, position.cell)),
            GhostMode::Chasing => {
                chase_direction(&level.grid, position.cell, player_cell, velocity.direction, flags, &mut rng.0)
            }
        };
        trace!(
            mode = ghost.mode().as_ref(),
            cell = %position.cell,
            desired = ?desired.map(|d| d.as_ref().to_string()),
            "Ghost decision"
        );

        step_actor(
            &level.grid,
            &mut position,
            &mut velocity,
            desired,
            flags,
            dt.0,
            config.vertical_speed_multiplier,
        );
    }
}
