//! Startup configuration for a game session.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use bevy_ecs::resource::Resource;
use tracing::warn;

use crate::constants::defaults;
use crate::level::LevelId;
use crate::render::Rgb;

/// Tunable simulation parameters, read once at session construction and
/// immutable afterwards.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Config {
    /// Simulation ticks per second.
    pub tick_rate: f32,
    /// Player speed, in cells per second.
    pub player_speed: f32,
    /// Ghost speed, in cells per second.
    pub ghost_speed: f32,
    /// How long ghosts stay frightened after a power pellet, in seconds.
    pub power_duration: f32,
    /// Remaining frightened time at which the blink warning starts, in seconds.
    pub blink_window: f32,
    /// House dwell time at level start, in seconds.
    pub home_time_start: f32,
    /// House dwell time after being eaten, in seconds.
    pub home_time_capture: f32,
    /// Lives the player starts with.
    pub starting_lives: i32,
    /// Player-ghost contact distance, in cells.
    pub collision_threshold: f32,
    /// Speed scale applied to vertical movement.
    pub vertical_speed_multiplier: f32,
    pub pellet_points: u32,
    pub ghost_points: u32,
    pub level_bonus: u32,
    /// Level loaded when the embedder does not specify one.
    pub default_level: LevelId,
    pub player_color: Rgb,
    pub ghost_color: Rgb,
    pub frightened_color: Rgb,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            tick_rate: defaults::TICK_RATE,
            player_speed: defaults::PLAYER_SPEED,
            ghost_speed: defaults::GHOST_SPEED,
            power_duration: defaults::POWER_DURATION,
            blink_window: defaults::BLINK_WINDOW,
            home_time_start: defaults::HOME_TIME_START,
            home_time_capture: defaults::HOME_TIME_CAPTURE,
            starting_lives: defaults::STARTING_LIVES,
            collision_threshold: defaults::COLLISION_THRESHOLD,
            vertical_speed_multiplier: defaults::VERTICAL_SPEED_MULTIPLIER,
            pellet_points: defaults::PELLET_POINTS,
            ghost_points: defaults::GHOST_POINTS,
            level_bonus: defaults::LEVEL_BONUS,
            default_level: LevelId(defaults::DEFAULT_LEVEL),
            player_color: defaults::PLAYER_COLOR,
            ghost_color: defaults::GHOST_COLOR,
            frightened_color: defaults::FRIGHTENED_COLOR,
        }
    }
}

impl Config {
    /// Builds a configuration from defaults plus `CMAN_`-prefixed
    /// environment overrides (e.g. `CMAN_PLAYER_SPEED=9`).
    ///
    /// Overrides that fail to parse are logged and skipped, so a bad value
    /// degrades to the default instead of refusing to start.
    pub fn from_env() -> Config {
        let mut config = Config::default();
        override_from_env(&mut config.tick_rate, "CMAN_TICK_RATE");
        override_from_env(&mut config.player_speed, "CMAN_PLAYER_SPEED");
        override_from_env(&mut config.ghost_speed, "CMAN_GHOST_SPEED");
        override_from_env(&mut config.power_duration, "CMAN_POWER_DURATION");
        override_from_env(&mut config.blink_window, "CMAN_BLINK_WINDOW");
        override_from_env(&mut config.home_time_start, "CMAN_HOME_TIME_START");
        override_from_env(&mut config.home_time_capture, "CMAN_HOME_TIME_CAPTURE");
        override_from_env(&mut config.starting_lives, "CMAN_STARTING_LIVES");
        override_from_env(&mut config.collision_threshold, "CMAN_COLLISION_THRESHOLD");
        override_from_env(&mut config.vertical_speed_multiplier, "CMAN_VERTICAL_SPEED_MULTIPLIER");
        override_from_env(&mut config.pellet_points, "CMAN_PELLET_POINTS");
        override_from_env(&mut config.ghost_points, "CMAN_GHOST_POINTS");
        override_from_env(&mut config.level_bonus, "CMAN_LEVEL_BONUS");
        override_from_env(&mut config.default_level, "CMAN_DEFAULT_LEVEL");
        override_from_env(&mut config.player_color, "CMAN_PLAYER_COLOR");
        override_from_env(&mut config.ghost_color, "CMAN_GHOST_COLOR");
        override_from_env(&mut config.frightened_color, "CMAN_FRIGHTENED_COLOR");
        config
    }

    /// The wall-clock interval between simulation ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_rate)
    }
}

fn override_from_env<T: FromStr>(field: &mut T, key: &str) {
    if let Ok(raw) = env::var(key) {
        match raw.parse::<T>() {
            Ok(value) => *field = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable configuration override"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.player_speed, 7.0);
        assert_eq!(config.ghost_speed, 6.0);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(config.default_level, LevelId(1));
        assert_eq!(config.player_color, Rgb::new(0x66, 0xcc, 0xff));
        assert_eq!(config.tick_interval(), Duration::from_secs_f32(1.0 / 30.0));
    }

    #[test]
    fn environment_overrides_apply_and_bad_values_fall_back() {
        env::set_var("CMAN_PLAYER_SPEED", "9.5");
        env::set_var("CMAN_GHOST_COLOR", "#abc");
        env::set_var("CMAN_STARTING_LIVES", "plenty");

        let config = Config::from_env();
        assert_eq!(config.player_speed, 9.5);
        assert_eq!(config.ghost_color, Rgb::new(0xaa, 0xbb, 0xcc));
        assert_eq!(config.starting_lives, defaults::STARTING_LIVES);

        env::remove_var("CMAN_PLAYER_SPEED");
        env::remove_var("CMAN_GHOST_COLOR");
        env::remove_var("CMAN_STARTING_LIVES");
    }
}
