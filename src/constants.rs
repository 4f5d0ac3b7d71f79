//! This module contains all the constants used in the game.

use std::time::Duration;

/// Distance from a cell center below which an actor counts as centered.
pub const CENTER_EPSILON: f32 = 0.001;

/// The longest simulation step a single tick will integrate. Wall-clock
/// stalls beyond this are dropped rather than fast-forwarded.
pub const MAX_TICK_STEP: f32 = 0.05;

/// Wall-clock length of one frightened blink phase.
pub const BLINK_PHASE: Duration = Duration::from_millis(200);

/// Shield granted after eating a frightened ghost, in seconds.
pub const EAT_SHIELD: f32 = 0.5;

/// Shield granted after a death reset, in seconds.
pub const DEATH_SHIELD: f32 = 2.0;

/// Default values for the configuration surface.
pub mod defaults {
    use crate::render::Rgb;

    /// Simulation ticks per second.
    pub const TICK_RATE: f32 = 30.0;
    /// Player speed, in cells per second.
    pub const PLAYER_SPEED: f32 = 7.0;
    /// Ghost speed, in cells per second.
    pub const GHOST_SPEED: f32 = 6.0;
    /// How long a power pellet keeps ghosts frightened, in seconds.
    pub const POWER_DURATION: f32 = 8.0;
    /// Remaining frightened time at which the blink warning starts, in seconds.
    pub const BLINK_WINDOW: f32 = 3.0;
    /// House dwell time at level start, in seconds.
    pub const HOME_TIME_START: f32 = 0.2;
    /// House dwell time after being eaten, in seconds.
    pub const HOME_TIME_CAPTURE: f32 = 3.0;
    /// Lives the player starts with.
    pub const STARTING_LIVES: i32 = 3;
    /// Player-ghost contact distance, in cells.
    pub const COLLISION_THRESHOLD: f32 = 0.3;
    /// Speed scale applied to vertical movement.
    pub const VERTICAL_SPEED_MULTIPLIER: f32 = 0.7;
    pub const PELLET_POINTS: u32 = 1;
    pub const GHOST_POINTS: u32 = 10;
    pub const LEVEL_BONUS: u32 = 50;
    /// Level id loaded when none is specified.
    pub const DEFAULT_LEVEL: u32 = 1;
    /// `#6cf`
    pub const PLAYER_COLOR: Rgb = Rgb::new(0x66, 0xcc, 0xff);
    /// `#f66`
    pub const GHOST_COLOR: Rgb = Rgb::new(0xff, 0x66, 0x66);
    /// `#00f`
    pub const FRIGHTENED_COLOR: Rgb = Rgb::new(0x00, 0x00, 0xff);
}
