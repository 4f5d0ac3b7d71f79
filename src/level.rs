//! Level identity and the sources that serve level text.

use std::collections::HashMap;
use std::fmt;

use bevy_ecs::resource::Resource;
use glam::IVec2;
use rust_embed::RustEmbed;

use crate::error::LevelError;
use crate::map::Grid;

/// A level id, rendered as a zero-padded three digit name (`001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(pub u32);

impl LevelId {
    /// The id following this one in the level sequence.
    pub fn next(self) -> LevelId {
        LevelId(self.0 + 1)
    }

    /// The file name a source is expected to serve this id under.
    pub fn filename(self) -> String {
        format!("{self}.txt")
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl std::str::FromStr for LevelId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<LevelId, Self::Err> {
        s.parse().map(LevelId)
    }
}

/// Fetches level text by id.
///
/// Implementations own where levels come from. The session treats any load
/// failure as the end of the level sequence, so a source only needs to serve
/// the ids it actually has.
pub trait LevelSource {
    fn load(&self, id: LevelId) -> Result<String, LevelError>;
}

#[derive(RustEmbed)]
#[folder = "levels/"]
struct LevelAssets;

/// Levels compiled into the binary from the `levels/` directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedLevels;

impl EmbeddedLevels {
    /// Probes for the lowest shipped level id, checking `000` through `006`.
    pub fn first_available() -> Option<LevelId> {
        (0..=6).map(LevelId).find(|id| LevelAssets::get(&id.filename()).is_some())
    }
}

impl LevelSource for EmbeddedLevels {
    fn load(&self, id: LevelId) -> Result<String, LevelError> {
        let file = LevelAssets::get(&id.filename()).ok_or(LevelError::NotFound(id))?;
        String::from_utf8(file.data.into_owned()).map_err(|_| LevelError::NotUtf8(id))
    }
}

/// An in-memory level source for tests and embedders that bring their own maps.
#[derive(Debug, Default)]
pub struct StaticLevels {
    levels: HashMap<LevelId, String>,
}

impl StaticLevels {
    pub fn new() -> StaticLevels {
        StaticLevels::default()
    }

    /// Adds a level, returning `self` so sources can be built inline.
    pub fn with(mut self, id: LevelId, text: impl Into<String>) -> StaticLevels {
        self.levels.insert(id, text.into());
        self
    }
}

impl LevelSource for StaticLevels {
    fn load(&self, id: LevelId) -> Result<String, LevelError> {
        self.levels.get(&id).cloned().ok_or(LevelError::NotFound(id))
    }
}

/// The loaded level: the playfield plus the spawn cells actors reset to.
#[derive(Resource)]
pub struct CurrentLevel {
    pub id: LevelId,
    pub grid: Grid,
    pub player_spawn: IVec2,
    pub ghost_spawns: Vec<IVec2>,
}
