use bevy_ecs::query::With;
use bevy_ecs::system::{Query, Res};

use crate::config::Config;
use crate::level::CurrentLevel;
use crate::map::direction::Direction;
use crate::map::{Grid, TraversalFlags};
use crate::systems::components::{DeltaTime, DesiredDirection, PlayerControlled, Position, Velocity};

/// Advances one actor by one movement step.
///
/// Turns (including reversals) commit only while the actor sits on a cell
/// center and only into a passable neighbor. An actor whose current
/// direction is blocked at a center stops in place. Travel is clamped to the
/// next cell boundary so no step overshoots a cell, and crossing a boundary
/// snaps the actor onto the new cell, wrapping horizontally off either edge.
pub fn step_actor(
    grid: &Grid,
    position: &mut Position,
    velocity: &mut Velocity,
    desired: Option<Direction>,
    flags: TraversalFlags,
    dt: f32,
    vertical_speed_multiplier: f32,
) {
    let at_center = position.at_center();

    if let Some(turn) = desired {
        if at_center && grid.passable(position.cell + turn.as_ivec2(), flags) {
            velocity.direction = Some(turn);
        }
    }

    let Some(direction) = velocity.direction else {
        return;
    };

    if at_center && !grid.passable(position.cell + direction.as_ivec2(), flags) {
        velocity.direction = None;
        return;
    }

    let mut step = velocity.speed * dt;
    if direction.is_vertical() {
        step *= vertical_speed_multiplier;
    }

    let center = position.cell.as_vec2();
    match direction {
        Direction::Left => position.actual.x = (position.actual.x - step).max(center.x - 1.0),
        Direction::Right => position.actual.x = (position.actual.x + step).min(center.x + 1.0),
        Direction::Up => position.actual.y = (position.actual.y - step).max(center.y - 1.0),
        Direction::Down => position.actual.y = (position.actual.y + step).min(center.y + 1.0),
    }

    let offset = position.offset();
    if offset.x.abs() >= 1.0 || offset.y.abs() >= 1.0 {
        position.cell = grid.wrap_x(position.actual.round().as_ivec2());
        position.snap_to_cell();
    }
}

/// Moves the player along the sampled desired direction.
pub fn player_movement_system(
    level: Res<CurrentLevel>,
    config: Res<Config>,
    dt: Res<DeltaTime>,
    desired: Res<DesiredDirection>,
    mut players: Query<(&mut Position, &mut Velocity), With<PlayerControlled>>,
) {
    for (mut position, mut velocity) in players.iter_mut() {
        step_actor(
            &level.grid,
            &mut position,
            &mut velocity,
            desired.0,
            TraversalFlags::PLAYER,
            dt.0,
            config.vertical_speed_multiplier,
        );
    }
}
