use bevy_ecs::event::EventWriter;
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Query, Res, ResMut};
use tracing::info;

use crate::config::Config;
use crate::events::GameEvent;
use crate::level::CurrentLevel;
use crate::systems::components::{DeltaTime, DesiredDirection, ItemCounts, Score};
use crate::systems::ghost::Ghost;

/// Session flags that persist across ticks.
#[derive(Resource, Debug, Default, Clone)]
pub struct SessionState {
    pub paused: bool,
    /// The player ran out of lives.
    pub over: bool,
    /// The current level has been cleared.
    pub won: bool,
    /// Cleared but not yet advanced; only the advance signal is accepted.
    pub waiting_for_next: bool,
    /// The first deliberate input has been received.
    pub started: bool,
    /// A level advance found nothing left to load.
    pub levels_exhausted: bool,
    /// The embedder asked the driving loop to shut down.
    pub exit: bool,
}

impl SessionState {
    /// Whether simulation systems should run at all.
    pub fn active(&self) -> bool {
        !self.paused && !self.over && !self.won
    }
}

/// Snapshot of [`SessionState::active`] taken as the tick starts.
///
/// Flags that flip mid-tick (a catch ending the game, the last pellet
/// winning the level) must not cancel the remainder of that same tick.
#[derive(Resource, Debug, Default)]
pub struct TickGate(pub bool);

/// Player-scoped countdowns, in seconds.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PlayerTimers {
    /// Grace period during which ghosts cannot catch the player.
    pub shield: f32,
    /// Remaining power-pellet time.
    pub power: f32,
}

/// Counts the player timers down, clamping at zero.
pub fn timer_system(dt: Res<DeltaTime>, mut timers: ResMut<PlayerTimers>) {
    timers.shield = (timers.shield - dt.0).max(0.0);
    timers.power = (timers.power - dt.0).max(0.0);
}

/// Marks the session started on the first non-none desired direction.
///
/// Ghosts still dwelling get their home timer rewound to the start value, so
/// every countdown begins together at the moment of first input.
pub fn start_system(
    desired: Res<DesiredDirection>,
    config: Res<Config>,
    mut session: ResMut<SessionState>,
    mut ghosts: Query<&mut Ghost>,
) {
    if session.started || desired.0.is_none() {
        return;
    }
    session.started = true;
    info!("First input received, home countdowns started");
    for mut ghost in ghosts.iter_mut() {
        if ghost.home_timer > 0.0 {
            ghost.home_timer = config.home_time_start;
        }
    }
}

/// Declares the level won once both item counts reach zero.
pub fn win_system(
    counts: Res<ItemCounts>,
    config: Res<Config>,
    level: Res<CurrentLevel>,
    mut session: ResMut<SessionState>,
    mut score: ResMut<Score>,
    mut events: EventWriter<GameEvent>,
) {
    if session.won || counts.pellets > 0 || counts.power_pellets > 0 {
        return;
    }
    score.0 += config.level_bonus;
    session.won = true;
    session.waiting_for_next = true;
    info!(level = %level.id, bonus = config.level_bonus, score = score.0, "Level complete");
    events.write(GameEvent::LevelComplete {
        level: level.id,
        bonus: config.level_bonus,
    });
}
