use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use glam::{IVec2, Vec2};
use rand::rngs::SmallRng;

use crate::constants::CENTER_EPSILON;
use crate::map::direction::Direction;
use crate::systems::ghost::Ghost;

/// A tag component for the entity controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// An actor's logical cell plus its continuous position, in cell units.
///
/// The continuous position interpolates between cell centers; the logical
/// cell is what passability, item pickup, and AI decisions are made against.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub cell: IVec2,
    pub actual: Vec2,
}

impl Position {
    /// A position resting exactly on the center of `cell`.
    pub fn at(cell: IVec2) -> Position {
        Position {
            cell,
            actual: cell.as_vec2(),
        }
    }

    /// Offset of the continuous position from the cell center.
    pub fn offset(&self) -> Vec2 {
        self.actual - self.cell.as_vec2()
    }

    /// Whether the actor sits on its cell center, within epsilon.
    pub fn at_center(&self) -> bool {
        self.offset().abs().max_element() < CENTER_EPSILON
    }

    /// Snaps the continuous position onto the logical cell.
    pub fn snap_to_cell(&mut self) {
        self.actual = self.cell.as_vec2();
    }
}

/// An actor's travel state. `direction: None` means stopped.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub direction: Option<Direction>,
    /// Cells per second.
    pub speed: f32,
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub velocity: Velocity,
}

#[derive(Bundle)]
pub struct GhostBundle {
    pub ghost: Ghost,
    pub position: Position,
    pub velocity: Velocity,
}

#[derive(Resource, Debug, Default)]
pub struct Score(pub u32);

#[derive(Resource, Debug)]
pub struct PlayerLives(pub i32);

/// Seconds of simulation time the current tick integrates.
#[derive(Resource, Debug, Default)]
pub struct DeltaTime(pub f32);

/// The direction the input layer currently wants the player to travel.
///
/// Sampled level, not edge: it stays whatever it was until the embedder
/// changes it, and a death reset or level advance clears it to `None`.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct DesiredDirection(pub Option<Direction>);

/// Remaining collectibles, kept in step with the grid.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ItemCounts {
    pub pellets: u32,
    pub power_pellets: u32,
}

/// Set when the playfield no longer matches what the render surface was
/// sized for. Cleared by the next render pass.
#[derive(Resource, Debug, Default)]
pub struct RenderDirty(pub bool);

/// The session's random source. Injected at construction so runs are
/// reproducible under a fixed seed.
#[derive(Resource)]
pub struct GameRng(pub SmallRng);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_center_tolerates_epsilon_drift() {
        let mut position = Position::at(IVec2::new(3, 4));
        assert!(position.at_center());

        position.actual.x += 0.0005;
        assert!(position.at_center());

        position.actual.x += 0.01;
        assert!(!position.at_center());
    }

    #[test]
    fn snap_discards_sub_cell_offset() {
        let mut position = Position::at(IVec2::new(2, 1));
        position.actual = Vec2::new(2.4, 0.8);
        position.snap_to_cell();
        assert_eq!(position.actual, Vec2::new(2.0, 1.0));
        assert!(position.at_center());
    }
}
