#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless match runner wiring the world to every simulation system.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use citadel_defence_core::{Command, ConfigError, Event, MatchConfig, TurretTarget};
use citadel_defence_system_bootstrap::Bootstrap;
use citadel_defence_system_builder::{Builder, BuilderInput};
use citadel_defence_system_movement::Movement;
use citadel_defence_system_spawning::{Config as SpawningConfig, Spawning};
use citadel_defence_system_tower_combat::TowerCombat;
use citadel_defence_system_tower_targeting::TowerTargeting;
use citadel_defence_world::{self as world, query, MatchReport, World};
use tracing::debug;

/// Reads and parses a TOML match configuration.
pub fn load_config(path: &Path) -> Result<MatchConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read match config {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("failed to parse match config {}", path.display()))
}

/// One match together with the systems that drive it.
///
/// Each step applies a tick, lets every system react to the events of the
/// previous step plus the tick, then applies their commands in pipeline order.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    builder: Builder,
    bootstrap: Bootstrap,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    targets: Vec<TurretTarget>,
    inbox: Vec<Event>,
    log: Vec<Event>,
}

impl Simulation {
    /// Creates the world, seeds the objective and places the configured layout.
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        let world = World::new(config.clone())?;
        let mut simulation = Self {
            world,
            builder: Builder::new(),
            bootstrap: Bootstrap::new(&config),
            spawning: Spawning::new(SpawningConfig::from_match(&config)),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(config.waves.seed),
            targets: Vec::new(),
            inbox: Vec::new(),
            log: Vec::new(),
        };
        let mut opening = Vec::new();
        simulation.bootstrap.start(&mut opening);
        simulation.execute(opening);
        Ok(simulation)
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Every event emitted since the simulation was created.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.log
    }

    /// Advances the match by `dt`, feeding `input` to the builder.
    pub fn step(&mut self, dt: Duration, input: BuilderInput) {
        let mut events = std::mem::take(&mut self.inbox);
        let mut tick = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick);
        self.log.extend(tick.iter().cloned());
        events.append(&mut tick);

        let mut commands = Vec::new();
        self.builder.handle(&events, input, &mut commands);
        self.spawning.handle(&events, &mut commands);

        let units = query::unit_view(&self.world);
        let structures = query::structure_view(&self.world);
        let tuning = query::config(&self.world).combat;
        self.movement.handle(
            &events,
            &units,
            &structures,
            query::occupancy_view(&self.world),
            &tuning,
            &mut commands,
        );
        self.targeting
            .handle(&events, &structures, &units, &mut self.targets);
        let world = &self.world;
        self.combat.handle(
            &events,
            &structures,
            &units,
            &self.targets,
            |shooter, from, to| query::is_shot_blocked(world, shooter, from, to),
            &mut commands,
        );

        self.execute(commands);
    }

    /// Reinitializes the match with the same configuration.
    pub fn restart(&mut self) {
        self.execute(vec![Command::RestartMatch]);
    }

    /// Ends the simulation and returns the match statistics.
    #[must_use]
    pub fn finish(self) -> MatchReport {
        self.world.teardown()
    }

    /// Applies commands and lets the bootstrap react until nothing is pending.
    ///
    /// Resulting events are queued for the other systems' next step.
    fn execute(&mut self, mut commands: Vec<Command>) {
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.bootstrap.handle(&events, &mut commands);
            debug!(count = events.len(), "events applied");
            self.log.extend(events.iter().cloned());
            self.inbox.append(&mut events);
        }
    }
}
