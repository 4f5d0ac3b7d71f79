//! This module contains the main game logic and state.

use std::time::Duration;

use bevy_ecs::entity::Entity;
use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::constants::MAX_TICK_STEP;
use crate::error::{GameError, GameResult};
use crate::events::{GameCommand, GameEvent};
use crate::level::{CurrentLevel, LevelId, LevelSource};
use crate::map::direction::Direction;
use crate::map::parser::LevelParser;
use crate::render::{self, RenderTarget};
use crate::systems::collision::collision_system;
use crate::systems::ghost::{ghost_system, Ghost};
use crate::systems::item::consume_system;
use crate::systems::movement::player_movement_system;
use crate::systems::profiling::{profile, SystemId, SystemTimings, Timing};
use crate::systems::state::{start_system, timer_system, win_system, PlayerTimers, SessionState, TickGate};
use crate::systems::{
    DeltaTime, DesiredDirection, GameRng, GhostBundle, ItemCounts, PlayerBundle, PlayerControlled, PlayerLives,
    Position, RenderDirty, Score, Velocity,
};

/// System sets giving the simulation its fixed within-tick order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum TickSet {
    Timers,
    PlayerMovement,
    Start,
    Ghosts,
    Consume,
    Collisions,
    Win,
}

/// Core game state manager built on the Bevy ECS architecture.
///
/// Orchestrates all simulation systems through a centralized `World`
/// containing entities, components, and resources, while a `Schedule`
/// defines system execution order. The embedder drives it by feeding
/// elapsed time into [`Game::tick`], applying [`GameCommand`]s between
/// ticks, and draining [`GameEvent`]s afterwards.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    levels: Box<dyn LevelSource>,
}

impl Game {
    /// Builds a fresh session on the given starting level.
    ///
    /// Parses the level, registers event types, inserts all resources,
    /// configures the system execution schedule, and spawns the player
    /// and ghost entities at their spawn cells.
    ///
    /// # Errors
    ///
    /// Returns `GameError` when the starting level cannot be loaded from
    /// `levels` or its text fails to parse.
    pub fn new(config: Config, levels: Box<dyn LevelSource>, start: LevelId, rng: SmallRng) -> GameResult<Game> {
        info!("Starting game initialization");

        debug!(level = %start, "Loading the starting level");
        let text = levels.load(start)?;
        let parsed = LevelParser::parse(&text)?;
        let level = CurrentLevel {
            id: start,
            grid: parsed.grid,
            player_spawn: parsed.player_spawn,
            ghost_spawns: parsed.ghost_spawns,
        };

        debug!("Initializing ECS world and system schedule");
        let mut world = World::default();
        let mut schedule = Schedule::default();

        debug!("Setting up ECS event registry");
        Self::setup_ecs(&mut world);

        debug!("Inserting resources into ECS world");
        Self::insert_resources(&mut world, config, level, rng);

        debug!("Configuring system execution schedule");
        Self::configure_schedule(&mut schedule);

        debug!("Spawning player and ghost entities");
        Self::spawn_actors(&mut world);

        info!("Game initialization completed successfully");
        Ok(Game {
            world,
            schedule,
            levels,
        })
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
    }

    fn insert_resources(world: &mut World, config: Config, level: CurrentLevel, rng: SmallRng) {
        let (pellets, power_pellets) = level.grid.count_items();

        world.insert_resource(SessionState::default());
        world.insert_resource(TickGate(true));
        world.insert_resource(PlayerTimers::default());
        world.insert_resource(Score(0));
        world.insert_resource(PlayerLives(config.starting_lives));
        world.insert_resource(ItemCounts { pellets, power_pellets });
        world.insert_resource(DesiredDirection(None));
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(RenderDirty(true));
        world.insert_resource(GameRng(rng));
        world.insert_resource(SystemTimings::default());
        world.insert_resource(Timing::default());
        world.insert_resource(config);
        world.insert_resource(level);
    }

    fn configure_schedule(schedule: &mut Schedule) {
        let timer_system = profile(SystemId::Timers, timer_system);
        let player_movement_system = profile(SystemId::PlayerMovement, player_movement_system);
        let start_system = profile(SystemId::Start, start_system);
        let ghost_system = profile(SystemId::Ghosts, ghost_system);
        let consume_system = profile(SystemId::Consume, consume_system);
        let collision_system = profile(SystemId::Collisions, collision_system);
        let win_system = profile(SystemId::Win, win_system);

        // The gate is sampled once per tick; a mid-tick loss or win must not
        // cancel the remainder of that tick. Player movement is gated on the
        // pre-start value of `started` while ghosts see the post-start value,
        // so on the starting tick the ghosts move but the player does not.
        schedule
            .add_systems((
                timer_system.in_set(TickSet::Timers),
                player_movement_system.in_set(TickSet::PlayerMovement),
                start_system.in_set(TickSet::Start),
                ghost_system.in_set(TickSet::Ghosts),
                consume_system.in_set(TickSet::Consume),
                collision_system.in_set(TickSet::Collisions),
                win_system.in_set(TickSet::Win),
            ))
            .configure_sets(
                (
                    TickSet::Timers.run_if(gate_open),
                    TickSet::PlayerMovement.run_if(gate_open).run_if(session_started),
                    TickSet::Start.run_if(gate_open),
                    TickSet::Ghosts.run_if(gate_open).run_if(session_started),
                    TickSet::Consume.run_if(gate_open),
                    TickSet::Collisions.run_if(gate_open),
                    TickSet::Win.run_if(gate_open),
                )
                    .chain(),
            );
    }

    fn spawn_actors(world: &mut World) {
        // Copy the spawn data out first; spawning needs the world mutably.
        let (player_spawn, ghost_spawns, player_speed, ghost_speed, home_time) = {
            let level = world.resource::<CurrentLevel>();
            let config = world.resource::<Config>();
            (
                level.player_spawn,
                level.ghost_spawns.clone(),
                config.player_speed,
                config.ghost_speed,
                config.home_time_start,
            )
        };

        world.spawn(PlayerBundle {
            player: PlayerControlled,
            position: Position::at(player_spawn),
            velocity: Velocity {
                direction: None,
                speed: player_speed,
            },
        });

        for spawn in ghost_spawns {
            let entity = world
                .spawn(GhostBundle {
                    ghost: Ghost::new(spawn, home_time),
                    position: Position::at(spawn),
                    velocity: Velocity {
                        direction: None,
                        speed: ghost_speed,
                    },
                })
                .id();
            trace!(entity = ?entity, cell = %spawn, "Spawned ghost entity");
        }
    }

    /// Advances the simulation by one tick of `dt` seconds.
    ///
    /// Steps in a pile-up (such as a debugger pause or a long render stall)
    /// are clamped so a single tick never simulates more than
    /// [`MAX_TICK_STEP`] seconds. Returns `true` once an exit command has
    /// been applied and the embedder should stop driving the session.
    pub fn tick(&mut self, dt: f32) -> bool {
        let dt = dt.min(MAX_TICK_STEP);
        self.world.insert_resource(DeltaTime(dt));

        // Sample the pause/over/won gate once for the whole tick.
        let gate = self.world.resource::<SessionState>().active();
        self.world.insert_resource(TickGate(gate));

        // Measure total tick time including the scheduler itself
        let start = std::time::Instant::now();
        self.schedule.run(&mut self.world);
        let total_duration = start.elapsed();

        if let (Some(timings), Some(timing)) = (
            self.world.get_resource::<SystemTimings>(),
            self.world.get_resource::<Timing>(),
        ) {
            let new_tick = timing.increment_tick();
            timings.add_total_timing(total_duration, new_tick);

            // Allow 20% over the simulated step before complaining.
            let tick_budget_ms = (dt * 1000.0 * 1.2) as u128;
            if total_duration.as_millis() > tick_budget_ms {
                let slowest_systems = timings.get_slowest_systems();
                let systems_context = if slowest_systems.is_empty() {
                    "No specific systems identified".to_string()
                } else {
                    slowest_systems
                        .iter()
                        .map(|(id, duration)| format!("{} ({:.2?})", id, duration))
                        .collect::<Vec<String>>()
                        .join(", ")
                };

                warn!(
                    total = format!("{:.3?}", total_duration),
                    tick = new_tick,
                    systems = systems_context,
                    budget = format!("{:.1}ms", tick_budget_ms),
                    "Tick took longer than expected"
                );
            }
        }

        for error in self.world.resource_mut::<Events<GameError>>().drain() {
            warn!(%error, "Game system reported an error");
        }

        self.world.resource::<SessionState>().exit
    }

    /// Draws the current state onto `target`.
    ///
    /// `elapsed` is wall time since the session began and only drives the
    /// frightened blink phase, so any monotonic clock will do.
    pub fn render(&mut self, target: &mut dyn RenderTarget, elapsed: Duration) {
        render::render_frame(&mut self.world, target, elapsed);
    }

    /// The one-line status text shown under the playfield.
    pub fn status_line(&self) -> String {
        render::status_line(&self.world)
    }

    /// Records where the player wants to head next.
    ///
    /// The wish persists until it is replaced or a death reset or level
    /// advance clears it. Ignored between a win and the following advance.
    pub fn set_desired_direction(&mut self, direction: Direction) {
        if self.world.resource::<SessionState>().waiting_for_next {
            return;
        }
        self.world.resource_mut::<DesiredDirection>().0 = Some(direction);
    }

    /// Toggles the pause flag. Ignored between a win and the level advance.
    pub fn toggle_pause(&mut self) {
        let mut session = self.world.resource_mut::<SessionState>();
        if session.waiting_for_next {
            return;
        }
        session.paused = !session.paused;
        debug!(paused = session.paused, "Pause toggled");
    }

    /// Applies an edge-triggered control signal between ticks.
    pub fn apply_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::AdvanceLevel => self.advance_level(),
            GameCommand::Exit => {
                self.world.resource_mut::<SessionState>().exit = true;
            }
        }
    }

    /// Swaps in the next level once the current one has been won.
    ///
    /// Does nothing unless the session is waiting on a completed level.
    /// Score, lives, the pause flag, and running player timers all carry
    /// over. When no further level exists the session is marked exhausted
    /// instead and [`GameEvent::AllLevelsComplete`] is emitted.
    pub fn advance_level(&mut self) {
        if !self.world.resource::<SessionState>().waiting_for_next {
            return;
        }

        let next = self.world.resource::<CurrentLevel>().id.next();
        let parsed = match self
            .levels
            .load(next)
            .map_err(GameError::from)
            .and_then(|text| LevelParser::parse(&text).map_err(GameError::from))
        {
            Ok(parsed) => parsed,
            Err(error) => {
                info!(level = %next, %error, "No further level; the sequence is complete");
                self.world.resource_mut::<SessionState>().levels_exhausted = true;
                self.world.send_event(GameEvent::AllLevelsComplete);
                return;
            }
        };

        let (pellets, power_pellets) = parsed.grid.count_items();
        let (ghost_speed, home_time) = {
            let config = self.world.resource::<Config>();
            (config.ghost_speed, config.home_time_start)
        };

        self.world.insert_resource(CurrentLevel {
            id: next,
            grid: parsed.grid,
            player_spawn: parsed.player_spawn,
            ghost_spawns: parsed.ghost_spawns.clone(),
        });
        self.world.insert_resource(ItemCounts { pellets, power_pellets });

        {
            let mut session = self.world.resource_mut::<SessionState>();
            session.won = false;
            session.waiting_for_next = false;
            session.started = false;
        }
        self.world.resource_mut::<DesiredDirection>().0 = None;
        self.world.resource_mut::<RenderDirty>().0 = true;

        let mut players = self
            .world
            .query_filtered::<(&mut Position, &mut Velocity), With<PlayerControlled>>();
        for (mut position, mut velocity) in players.iter_mut(&mut self.world) {
            *position = Position::at(parsed.player_spawn);
            velocity.direction = None;
        }

        // Ghost counts can differ between levels, so respawn from scratch.
        let ghosts: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Ghost>>()
            .iter(&self.world)
            .collect();
        for entity in ghosts {
            self.world.despawn(entity);
        }
        for spawn in parsed.ghost_spawns {
            self.world.spawn(GhostBundle {
                ghost: Ghost::new(spawn, home_time),
                position: Position::at(spawn),
                velocity: Velocity {
                    direction: None,
                    speed: ghost_speed,
                },
            });
        }

        info!(level = %next, "Advanced to the next level");
        self.world.send_event(GameEvent::LevelAdvanced { level: next });
    }

    /// Drains and returns every event emitted since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.world.resource_mut::<Events<GameEvent>>().drain().collect()
    }
}

fn gate_open(gate: Res<TickGate>) -> bool {
    gate.0
}

fn session_started(session: Res<SessionState>) -> bool {
    session.started
}
