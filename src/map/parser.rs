//! Level parsing: converts ASCII level text into a structured playfield.

use glam::{IVec2, UVec2};

use crate::error::ParseError;
use crate::map::{Grid, MapTile};

/// Structured representation of a parsed level.
///
/// Contains the playfield after glyph-to-tile conversion, along with the spawn
/// positions extracted during the scan. Spawn markers stay in the grid as their
/// own tile types; the positions recorded here are what actor spawning uses.
#[derive(Debug)]
pub struct ParsedLevel {
    /// The playfield tiles.
    pub grid: Grid,
    /// The player's starting cell. When the text has no `C` marker this
    /// defaults to the top-left corner.
    pub player_spawn: IVec2,
    /// One starting cell per ghost, in scan order.
    pub ghost_spawns: Vec<IVec2>,
}

/// Parser for converting ASCII level text into structured level data.
pub struct LevelParser;

impl LevelParser {
    /// Converts a single glyph into its tile type.
    ///
    /// Interprets the character-based maze vocabulary: pellets (`.`), power
    /// pellets (`o`), open space (` `), the house door (`=`), ghost starts
    /// (`M`, which sit inside the house), and the player start (`C`). Any
    /// glyph outside the vocabulary is treated as a wall, so maze authors
    /// are free to draw borders with `#`, `|`, `+` or anything else.
    pub fn parse_glyph(c: char) -> MapTile {
        match c {
            ' ' => MapTile::Empty,
            '.' => MapTile::Pellet,
            'o' => MapTile::PowerPellet,
            '=' => MapTile::Door,
            'M' => MapTile::House,
            'C' => MapTile::PlayerSpawn,
            _ => MapTile::Wall,
        }
    }

    /// Parses level text into a playfield and spawn positions.
    ///
    /// Carriage returns are stripped and blank lines dropped, so files with
    /// CRLF endings or trailing newlines parse the same as clean input. Rows
    /// may be ragged; shorter rows are padded with empty tiles to the width
    /// of the longest one.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Empty`] when the text contains no rows at all.
    pub fn parse(text: &str) -> Result<ParsedLevel, ParseError> {
        let rows: Vec<&str> = text
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();

        if rows.is_empty() {
            return Err(ParseError::Empty);
        }

        let width = rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0);
        let height = rows.len();

        let mut tiles = Vec::with_capacity(width * height);
        let mut player_spawn = IVec2::ZERO;
        let mut ghost_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let mut x = 0;
            for c in row.chars() {
                let tile = Self::parse_glyph(c);
                match tile {
                    MapTile::PlayerSpawn => player_spawn = IVec2::new(x, y as i32),
                    MapTile::House => ghost_spawns.push(IVec2::new(x, y as i32)),
                    _ => {}
                }
                tiles.push(tile);
                x += 1;
            }
            // Pad ragged rows out to the widest one.
            tiles.resize(tiles.len() + (width - x as usize), MapTile::Empty);
        }

        Ok(ParsedLevel {
            grid: Grid::from_tiles(UVec2::new(width as u32, height as u32), tiles),
            player_spawn,
            ghost_spawns,
        })
    }
}
