#![allow(dead_code)]

use bevy_ecs::entity::Entity;
use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::world::World;
use glam::IVec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use cman::config::Config;
use cman::error::GameError;
use cman::events::GameEvent;
use cman::game::Game;
use cman::level::{CurrentLevel, LevelId, StaticLevels};
use cman::map::direction::Direction;
use cman::map::parser::LevelParser;
use cman::systems::ghost::Ghost;
use cman::systems::state::{PlayerTimers, SessionState, TickGate};
use cman::systems::{
    DeltaTime, DesiredDirection, GameRng, GhostBundle, ItemCounts, PlayerBundle, PlayerControlled, PlayerLives,
    Position, RenderDirty, Score, Velocity,
};

/// Simulated seconds per tick at the default tick rate.
pub const TICK: f32 = 1.0 / 30.0;

/// A dead-end corridor with two pellets. At default speed the player
/// crosses one cell in exactly five ticks.
pub const CORRIDOR: &str = "#####\n#C..#\n#####";

/// Creates a game on a single inline level with a fixed seed.
pub fn game_on(level: &str) -> Game {
    game_on_levels(&[level])
}

/// Creates a game on a sequence of inline levels, starting at the first.
pub fn game_on_levels(levels: &[&str]) -> Game {
    game_with(Config::default(), levels)
}

/// Creates a game with a custom configuration and a fixed seed.
pub fn game_with(config: Config, levels: &[&str]) -> Game {
    let mut source = StaticLevels::new();
    for (index, text) in levels.iter().enumerate() {
        source = source.with(LevelId(index as u32), *text);
    }
    Game::new(config, Box::new(source), LevelId(0), SmallRng::seed_from_u64(7)).expect("inline level should build a game")
}

/// Runs `count` fixed-step ticks.
pub fn run_ticks(game: &mut Game, count: u32) {
    for _ in 0..count {
        game.tick(TICK);
    }
}

/// Sends the first input and runs the tick that starts the session.
pub fn start_session(game: &mut Game, direction: Direction) {
    game.set_desired_direction(direction);
    game.tick(TICK);
}

/// The player's current position.
pub fn player_position(game: &mut Game) -> Position {
    let mut players = game.world.query_filtered::<&Position, With<PlayerControlled>>();
    *players.single(&game.world).expect("exactly one player")
}

/// The player's current velocity.
pub fn player_velocity(game: &mut Game) -> Velocity {
    let mut players = game.world.query_filtered::<&Velocity, With<PlayerControlled>>();
    *players.single(&game.world).expect("exactly one player")
}

/// A snapshot of every ghost.
pub fn ghosts(game: &mut Game) -> Vec<(Ghost, Position, Velocity)> {
    let mut ghosts = game.world.query::<(&Ghost, &Position, &Velocity)>();
    ghosts
        .iter(&game.world)
        .map(|(ghost, position, velocity)| (ghost.clone(), *position, *velocity))
        .collect()
}

pub fn session(game: &Game) -> SessionState {
    game.world.resource::<SessionState>().clone()
}

pub fn score(game: &Game) -> u32 {
    game.world.resource::<Score>().0
}

pub fn lives(game: &Game) -> i32 {
    game.world.resource::<PlayerLives>().0
}

/// Creates a bare world carrying every resource the systems expect, so
/// individual systems can be exercised with `run_system_once`.
pub fn create_test_world(level: &str) -> World {
    let parsed = LevelParser::parse(level).expect("test level should parse");
    let (pellets, power_pellets) = parsed.grid.count_items();

    let mut world = World::new();
    EventRegistry::register_event::<GameError>(&mut world);
    EventRegistry::register_event::<GameEvent>(&mut world);
    world.insert_resource(SessionState::default());
    world.insert_resource(TickGate(true));
    world.insert_resource(PlayerTimers::default());
    world.insert_resource(Score(0));
    world.insert_resource(PlayerLives(3));
    world.insert_resource(ItemCounts { pellets, power_pellets });
    world.insert_resource(DesiredDirection(None));
    world.insert_resource(DeltaTime(TICK));
    world.insert_resource(RenderDirty(true));
    world.insert_resource(GameRng(SmallRng::seed_from_u64(7)));
    world.insert_resource(Config::default());
    world.insert_resource(CurrentLevel {
        id: LevelId(0),
        grid: parsed.grid,
        player_spawn: parsed.player_spawn,
        ghost_spawns: parsed.ghost_spawns,
    });
    world
}

/// Spawns a stopped player at the given cell.
pub fn spawn_player(world: &mut World, cell: IVec2) -> Entity {
    world
        .spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position::at(cell),
            velocity: Velocity {
                direction: None,
                speed: 7.0,
            },
        })
        .id()
}

/// Spawns a stopped ghost at the given cell with the given house dwell.
pub fn spawn_ghost(world: &mut World, cell: IVec2, home_time: f32) -> Entity {
    world
        .spawn(GhostBundle {
            ghost: Ghost::new(cell, home_time),
            position: Position::at(cell),
            velocity: Velocity {
                direction: None,
                speed: 6.0,
            },
        })
        .id()
}

/// Drains the accumulated game events from a bare world.
pub fn drain_events(world: &mut World) -> Vec<GameEvent> {
    world.resource_mut::<Events<GameEvent>>().drain().collect()
}
