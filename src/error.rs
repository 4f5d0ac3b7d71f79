//! Centralized error types for the simulation.
//!
//! This module defines all error types used throughout the crate,
//! providing a consistent error handling approach.

use bevy_ecs::event::Event;

use crate::level::LevelId;

/// Main error type for the simulation.
///
/// This is the primary error type that should be used in public APIs.
/// It can represent any error that can occur while building or running
/// a game session.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Level parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Error type for level text parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Level text contains no rows")]
    Empty,
}

/// Errors related to fetching level text from a source.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("Level {0} not found")]
    NotFound(LevelId),

    #[error("Level {0} is not valid UTF-8")]
    NotUtf8(LevelId),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
