use bevy_ecs::event::Event;
use glam::IVec2;

use crate::level::LevelId;

/// Edge-triggered control signals, applied between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    TogglePause,
    AdvanceLevel,
    Exit,
}

/// Outward notifications emitted while a tick runs, drained by the embedder
/// after each tick.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PelletEaten { cell: IVec2, remaining: u32 },
    PowerEaten { cell: IVec2 },
    GhostEaten { cell: IVec2, points: u32 },
    /// A ghost caught the player and a death reset followed.
    PlayerCaught { lives_left: i32 },
    /// A ghost caught the player with no lives left.
    GameOver { score: u32 },
    LevelComplete { level: LevelId, bonus: u32 },
    LevelAdvanced { level: LevelId },
    /// A level advance found no further level to load.
    AllLevelsComplete,
}
