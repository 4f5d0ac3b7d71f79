//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod collision;
pub mod components;
pub mod ghost;
pub mod item;
pub mod movement;
pub mod profiling;
pub mod state;

pub use components::{
    DeltaTime, DesiredDirection, GameRng, GhostBundle, ItemCounts, PlayerBundle, PlayerControlled, PlayerLives,
    Position, RenderDirty, Score, Velocity,
};
