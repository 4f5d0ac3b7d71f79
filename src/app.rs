use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::Config;
use crate::events::{GameCommand, GameEvent};
use crate::game::Game;
use crate::map::direction::Direction;
use crate::render::RenderTarget;

/// Where the loop gets player intent from each frame.
///
/// Implementations own the actual device or script. `desired_direction`
/// reports the direction currently wished for (held, not edge-triggered),
/// `poll_command` yields queued control signals one at a time.
pub trait InputSource {
    fn desired_direction(&mut self) -> Option<Direction>;
    fn poll_command(&mut self) -> Option<GameCommand>;
    /// Drops any buffered intent. Called when the actors reset under the player.
    fn clear(&mut self);
}

/// Main loop wrapper that feeds input and wall time into a [`Game`] at a
/// fixed tick rate and draws each state onto a render target.
pub struct App<I: InputSource, T: RenderTarget> {
    pub game: Game,
    input: I,
    target: T,
    tick_interval: Duration,
    last_tick: Instant,
    started_at: Instant,
}

impl<I: InputSource, T: RenderTarget> App<I, T> {
    pub fn new(game: Game, input: I, target: T) -> App<I, T> {
        let tick_interval = game.world.resource::<Config>().tick_interval();
        App {
            game,
            input,
            target,
            tick_interval,
            last_tick: Instant::now(),
            started_at: Instant::now(),
        }
    }

    /// Executes a single frame of the game loop with consistent timing.
    ///
    /// Samples input, applies queued commands, runs game logic via
    /// `game.tick()` with the measured delta time, draws the new state, and
    /// sleeps off whatever remains of the tick interval.
    ///
    /// # Returns
    ///
    /// `true` if the game should continue running, `false` if the game requested exit.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        if let Some(direction) = self.input.desired_direction() {
            self.game.set_desired_direction(direction);
        }
        while let Some(command) = self.input.poll_command() {
            self.game.apply_command(command);
        }

        let dt = self.last_tick.elapsed().as_secs_f32();
        self.last_tick = start;

        let exit = self.game.tick(dt);
        if exit {
            return false;
        }

        self.game.render(&mut self.target, self.started_at.elapsed());

        for event in self.game.take_events() {
            if matches!(event, GameEvent::PlayerCaught { .. } | GameEvent::LevelAdvanced { .. }) {
                // Stale intent from before the reset must not steer the
                // freshly placed player.
                self.input.clear();
            }
        }

        // Sleep if we still have time left
        if start.elapsed() < self.tick_interval {
            let time = self.tick_interval.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        } else {
            warn!(
                "Game loop behind schedule by: {:?}",
                start.elapsed() - self.tick_interval
            );
        }

        true
    }
}
