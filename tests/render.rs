use std::time::Duration;

use glam::{UVec2, Vec2};
use speculoos::prelude::*;

use cman::constants::defaults::{FRIGHTENED_COLOR, GHOST_COLOR, PLAYER_COLOR};
use cman::game::Game;
use cman::map::Grid;
use cman::render::{RenderTarget, Rgb};
use cman::systems::ghost::Ghost;
use cman::systems::state::SessionState;
use cman::systems::RenderDirty;

mod common;

/// A corridor over a one-ghost house.
const YARD: &str = "#######\n#C....#\n###=###\n###M###\n#######";

/// Records every draw call in arrival order.
#[derive(Default)]
struct RecordingTarget {
    calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Resize(UVec2),
    Grid(UVec2),
    Actor(Vec2, Rgb),
    Text(String),
}

impl RenderTarget for RecordingTarget {
    fn resize_to_grid(&mut self, size: UVec2) {
        self.calls.push(Call::Resize(size));
    }

    fn draw_grid(&mut self, grid: &Grid) {
        self.calls.push(Call::Grid(grid.size));
    }

    fn draw_actor(&mut self, position: Vec2, color: Rgb) {
        self.calls.push(Call::Actor(position, color));
    }

    fn text(&mut self, message: &str) {
        self.calls.push(Call::Text(message.to_string()));
    }
}

fn frame(game: &mut Game, elapsed: Duration) -> Vec<Call> {
    let mut target = RecordingTarget::default();
    game.render(&mut target, elapsed);
    target.calls
}

/// The color the single ghost was drawn with.
fn ghost_draw_color(game: &mut Game, elapsed: Duration) -> Rgb {
    let calls = frame(game, elapsed);
    calls
        .iter()
        .find_map(|call| match call {
            Call::Actor(_, color) => Some(*color),
            _ => None,
        })
        .expect("a ghost should be drawn")
}

fn set_frightened(game: &mut Game, seconds: f32) {
    let mut ghosts = game.world.query::<&mut Ghost>();
    for mut ghost in ghosts.iter_mut(&mut game.world) {
        ghost.frightened = seconds;
    }
}

#[test]
fn test_first_frame_resizes_then_draws_in_order() {
    let mut game = common::game_on(YARD);

    let calls = frame(&mut game, Duration::ZERO);

    let size = UVec2::new(7, 5);
    assert_that(&calls).is_equal_to(vec![
        Call::Resize(size),
        Call::Grid(size),
        Call::Actor(Vec2::new(3.0, 3.0), GHOST_COLOR),
        Call::Actor(Vec2::new(1.0, 1.0), PLAYER_COLOR),
        Call::Text("Score: 0 Lives: 3 Pellets: 4".to_string()),
    ]);
}

#[test]
fn test_resize_fires_only_while_dirty() {
    let mut game = common::game_on(YARD);

    frame(&mut game, Duration::ZERO);
    let calls = frame(&mut game, Duration::ZERO);
    assert_that(&calls[0]).is_equal_to(Call::Grid(UVec2::new(7, 5)));

    game.world.resource_mut::<RenderDirty>().0 = true;
    let calls = frame(&mut game, Duration::ZERO);
    assert_that(&calls[0]).is_equal_to(Call::Resize(UVec2::new(7, 5)));
}

#[test]
fn test_fresh_fright_paints_solid() {
    let mut game = common::game_on(YARD);
    set_frightened(&mut game, 5.0);

    // Above the blink window the color holds steady in both phases.
    assert_that(&ghost_draw_color(&mut game, Duration::ZERO)).is_equal_to(FRIGHTENED_COLOR);
    assert_that(&ghost_draw_color(&mut game, Duration::from_millis(250))).is_equal_to(FRIGHTENED_COLOR);
}

#[test]
fn test_expiring_fright_blinks() {
    let mut game = common::game_on(YARD);
    set_frightened(&mut game, 2.0);

    // Inside the blink window the color alternates every 200ms of wall time.
    assert_that(&ghost_draw_color(&mut game, Duration::ZERO)).is_equal_to(FRIGHTENED_COLOR);
    assert_that(&ghost_draw_color(&mut game, Duration::from_millis(250))).is_equal_to(GHOST_COLOR);
    assert_that(&ghost_draw_color(&mut game, Duration::from_millis(450))).is_equal_to(FRIGHTENED_COLOR);
}

#[test]
fn test_calm_ghosts_keep_their_color() {
    let mut game = common::game_on(YARD);
    assert_that(&ghost_draw_color(&mut game, Duration::from_millis(250))).is_equal_to(GHOST_COLOR);
}

#[test]
fn test_status_lines_follow_precedence() {
    let mut game = common::game_on(YARD);

    {
        let mut session = game.world.resource_mut::<SessionState>();
        session.over = true;
        session.levels_exhausted = true;
        session.won = true;
        session.paused = true;
    }
    assert_that(&game.status_line()).is_equal_to("Game Over".to_string());

    game.world.resource_mut::<SessionState>().over = false;
    assert_that(&game.status_line()).is_equal_to("All levels complete! Congratulations!".to_string());

    game.world.resource_mut::<SessionState>().levels_exhausted = false;
    assert_that(&game.status_line()).is_equal_to("Level Complete! Press Enter to continue".to_string());

    game.world.resource_mut::<SessionState>().won = false;
    assert_that(&game.status_line()).is_equal_to("Paused".to_string());

    game.world.resource_mut::<SessionState>().paused = false;
    assert_that(&game.status_line()).is_equal_to("Score: 0 Lives: 3 Pellets: 4".to_string());
}
