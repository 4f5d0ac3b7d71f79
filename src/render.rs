//! Render contract and the per-frame draw walk.
//!
//! The simulation never owns a drawing surface. Embedders hand a
//! [`RenderTarget`] to [`Game::render`](crate::game::Game::render) and the
//! walk here feeds it read-only state: the grid, each ghost, the player, and
//! a status line, in that order.

use std::str::FromStr;
use std::time::Duration;

use bevy_ecs::query::With;
use bevy_ecs::world::World;
use glam::{UVec2, Vec2};

use crate::config::Config;
use crate::constants::BLINK_PHASE;
use crate::level::CurrentLevel;
use crate::map::Grid;
use crate::systems::ghost::Ghost;
use crate::systems::state::SessionState;
use crate::systems::{ItemCounts, PlayerControlled, PlayerLives, Position, RenderDirty, Score};

/// An RGB color, parsed from `#rgb` or `#rrggbb` literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Invalid color literal: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Rgb, ColorParseError> {
        let err = || ColorParseError(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(err)?;
        if !digits.is_ascii() {
            return Err(err());
        }
        let component = |value: &str| u8::from_str_radix(value, 16).map_err(|_| err());
        match digits.len() {
            // Shorthand doubles each digit: #6cf is #66ccff.
            3 => Ok(Rgb {
                r: component(&digits[0..1].repeat(2))?,
                g: component(&digits[1..2].repeat(2))?,
                b: component(&digits[2..3].repeat(2))?,
            }),
            6 => Ok(Rgb {
                r: component(&digits[0..2])?,
                g: component(&digits[2..4])?,
                b: component(&digits[4..6])?,
            }),
            _ => Err(err()),
        }
    }
}

/// A 2D draw surface consuming read-only simulation state.
///
/// Calls arrive once per rendered frame, always in the same order: an
/// optional resize when the grid changed, `draw_grid`, one `draw_actor` per
/// ghost, one for the player, then `text` with the status line.
pub trait RenderTarget {
    /// Reshapes the surface for a grid of the given size, in cells.
    fn resize_to_grid(&mut self, size: UVec2);

    /// Draws the playfield tiles.
    fn draw_grid(&mut self, grid: &Grid);

    /// Draws one actor at a continuous cell position.
    fn draw_actor(&mut self, position: Vec2, color: Rgb);

    /// Draws the status line.
    fn text(&mut self, message: &str);
}

/// Walks the world and feeds it to the target.
///
/// `elapsed` is wall-clock time since the session began; it only drives the
/// frightened blink phase and never touches simulation state.
pub(crate) fn render_frame(world: &mut World, target: &mut dyn RenderTarget, elapsed: Duration) {
    {
        let mut dirty = world.resource_mut::<RenderDirty>();
        if dirty.0 {
            dirty.0 = false;
            let size = world.resource::<CurrentLevel>().grid.size;
            target.resize_to_grid(size);
        }
    }

    let config = world.resource::<Config>();
    let player_color = config.player_color;
    let ghost_color = config.ghost_color;
    let frightened_color = config.frightened_color;
    let blink_window = config.blink_window;

    target.draw_grid(&world.resource::<CurrentLevel>().grid);

    let blink_on = (elapsed.as_millis() / BLINK_PHASE.as_millis()) % 2 == 0;
    let mut ghosts = world.query::<(&Position, &Ghost)>();
    for (position, ghost) in ghosts.iter(world) {
        let color = if ghost.frightened > 0.0 {
            if ghost.frightened <= blink_window && !blink_on {
                ghost_color
            } else {
                frightened_color
            }
        } else {
            ghost_color
        };
        target.draw_actor(position.actual, color);
    }

    let mut players = world.query_filtered::<&Position, With<PlayerControlled>>();
    if let Ok(position) = players.single(world) {
        target.draw_actor(position.actual, player_color);
    }

    target.text(&status_line(world));
}

/// Composes the status line shown under the playfield.
pub(crate) fn status_line(world: &World) -> String {
    let session = world.resource::<SessionState>();
    if session.over {
        return "Game Over".to_string();
    }
    if session.levels_exhausted {
        return "All levels complete! Congratulations!".to_string();
    }
    if session.won {
        return "Level Complete! Press Enter to continue".to_string();
    }
    if session.paused {
        return "Paused".to_string();
    }

    let score = world.resource::<Score>();
    let lives = world.resource::<PlayerLives>();
    let items = world.resource::<ItemCounts>();
    format!("Score: {} Lives: {} Pellets: {}", score.0, lives.0, items.pellets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_six_digit_literals() {
        assert_eq!("#66ccff".parse(), Ok(Rgb::new(0x66, 0xcc, 0xff)));
        assert_eq!("#000000".parse(), Ok(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn parses_shorthand_literals() {
        assert_eq!("#6cf".parse(), Ok(Rgb::new(0x66, 0xcc, 0xff)));
        assert_eq!("#f66".parse(), Ok(Rgb::new(0xff, 0x66, 0x66)));
        assert_eq!("#00f".parse(), Ok(Rgb::new(0, 0, 0xff)));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!("66ccff".parse::<Rgb>().is_err());
        assert!("#66cc".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }
}
