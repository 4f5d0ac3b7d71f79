use glam::IVec2;
use speculoos::prelude::*;

use cman::error::LevelError;
use cman::level::{EmbeddedLevels, LevelId, LevelSource};
use cman::map::parser::LevelParser;

#[test]
fn test_shipped_levels_load_and_parse() {
    for id in [LevelId(0), LevelId(1), LevelId(2)] {
        let text = EmbeddedLevels.load(id).expect("shipped level should load");
        let parsed = LevelParser::parse(&text).expect("shipped level should parse");

        // Every shipped level has a player start, ghosts, and food.
        assert_that(&(parsed.player_spawn != IVec2::ZERO)).is_true();
        assert_that(&parsed.ghost_spawns.is_empty()).is_false();
        let (pellets, power_pellets) = parsed.grid.count_items();
        assert_that(&(pellets > 0)).is_true();
        assert_that(&(power_pellets > 0)).is_true();
    }
}

#[test]
fn test_first_available_finds_the_lowest_id() {
    assert_that(&EmbeddedLevels::first_available()).is_equal_to(Some(LevelId(0)));
}

#[test]
fn test_missing_levels_report_not_found() {
    let result = EmbeddedLevels.load(LevelId(99));
    assert_that(&result.unwrap_err()).is_equal_to(LevelError::NotFound(LevelId(99)));
}

#[test]
fn test_ids_parse_from_override_strings() {
    assert_that(&"7".parse::<LevelId>().unwrap()).is_equal_to(LevelId(7));
    assert_that(&"007".parse::<LevelId>().unwrap()).is_equal_to(LevelId(7));
    assert_that(&"abc".parse::<LevelId>().is_err()).is_true();
}
