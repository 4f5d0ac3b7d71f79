use bevy_ecs::system::RunSystemOnce;
use glam::IVec2;
use speculoos::prelude::*;

use cman::events::GameEvent;
use cman::map::MapTile;
use cman::systems::ghost::Ghost;
use cman::systems::item::consume_system;
use cman::systems::state::PlayerTimers;
use cman::systems::{ItemCounts, Score};

mod common;

/// Two pellets and a power pellet in one corridor.
const PANTRY: &str = "######\n#C.o.#\n######";

#[test]
fn test_pellet_scores_once() {
    let mut world = common::create_test_world(PANTRY);
    common::spawn_player(&mut world, IVec2::new(2, 1));

    world.run_system_once(consume_system).expect("System should run successfully");

    assert_that(&world.resource::<Score>().0).is_equal_to(1);
    assert_that(&world.resource::<ItemCounts>().pellets).is_equal_to(1);
    let grid = &world.resource::<cman::level::CurrentLevel>().grid;
    assert_that(&grid.get(IVec2::new(2, 1))).is_equal_to(Some(MapTile::Empty));

    let events = common::drain_events(&mut world);
    assert_that(&events).is_equal_to(vec![GameEvent::PelletEaten {
        cell: IVec2::new(2, 1),
        remaining: 1,
    }]);

    // The tile is spent; standing on it again yields nothing.
    world.run_system_once(consume_system).expect("System should run successfully");
    assert_that(&world.resource::<Score>().0).is_equal_to(1);
    assert_that(&common::drain_events(&mut world)).is_equal_to(vec![]);
}

#[test]
fn test_power_pellet_frightens_every_ghost_without_scoring() {
    let mut world = common::create_test_world(PANTRY);
    common::spawn_player(&mut world, IVec2::new(3, 1));
    let roamer = common::spawn_ghost(&mut world, IVec2::new(4, 1), 0.0);
    let homebody = common::spawn_ghost(&mut world, IVec2::new(1, 1), 10.0);

    world.run_system_once(consume_system).expect("System should run successfully");

    // Power pellets start the clock but are worth no points.
    assert_that(&world.resource::<Score>().0).is_equal_to(0);
    assert_that(&world.resource::<PlayerTimers>().power).is_equal_to(8.0);
    assert_that(&world.resource::<ItemCounts>().power_pellets).is_equal_to(0);

    for entity in [roamer, homebody] {
        let ghost = world.get::<Ghost>(entity).unwrap();
        assert_that(&ghost.frightened).is_equal_to(8.0);
    }

    let events = common::drain_events(&mut world);
    assert_that(&events).is_equal_to(vec![GameEvent::PowerEaten { cell: IVec2::new(3, 1) }]);
}

#[test]
fn test_empty_cell_consumes_nothing() {
    let mut world = common::create_test_world(PANTRY);
    common::spawn_player(&mut world, IVec2::new(1, 1));

    world.run_system_once(consume_system).expect("System should run successfully");

    assert_that(&world.resource::<Score>().0).is_equal_to(0);
    assert_that(world.resource::<ItemCounts>()).is_equal_to(ItemCounts {
        pellets: 2,
        power_pellets: 1,
    });
    assert_that(&common::drain_events(&mut world)).is_equal_to(vec![]);
}
