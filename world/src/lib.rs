#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Citadel Defence.
//!
//! The world owns cell occupancy, the live structure registry, the main
//! tower slots and every mana balance. Nothing outside this crate mutates
//! them; adapters and systems go through [`apply`].

mod economy;
mod grid;
mod main_towers;
mod projectiles;
mod registry;
mod structures;
mod units;

use std::time::Duration;

use citadel_defence_core::{
    CellCoord, CombatError, Command, ConfigError, EndOfMatchPolicy, Event, GridDimensions,
    MatchConfig, MatchPhase, PlacementError, PlayerId, ProjectileId, ProjectileOutcome,
    RegistrationError, ResyncReport, SlotIndex, StructureId, StructureKind, UnitId, UnitState,
    WeaponProfile,
};
use tracing::{debug, info, trace};

use crate::{
    economy::Economy,
    grid::OccupancyGrid,
    main_towers::MainTowerSlots,
    projectiles::ProjectileStore,
    registry::LiveRegistry,
    structures::{DamageOutcome, StructureDraft, StructureStore},
    units::{UnitDamage, UnitDraft, UnitStore},
};

/// Counters summarising a match, produced by [`World::teardown`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Ticks processed while the match was running.
    pub ticks: u64,
    /// Simulated time processed while the match was running.
    pub elapsed: Duration,
    /// Structures that were placed or seeded.
    pub structures_placed: u32,
    /// Structures destroyed by damage.
    pub structures_destroyed: u32,
    /// Hostile units that entered the board.
    pub units_spawned: u32,
    /// Hostile units killed.
    pub units_killed: u32,
    /// Projectiles and pellet volleys fired.
    pub shots_fired: u32,
    /// Whether the end condition was met.
    pub ended: bool,
}

/// Represents the authoritative Citadel Defence world state.
#[derive(Debug)]
pub struct World {
    config: MatchConfig,
    dimensions: GridDimensions,
    grid: OccupancyGrid,
    structures: StructureStore,
    registry: LiveRegistry,
    main_towers: MainTowerSlots,
    economy: Economy,
    units: UnitStore,
    projectiles: ProjectileStore,
    selected: Option<StructureKind>,
    phase: MatchPhase,
    rescan_in: Duration,
    report: MatchReport,
}

impl World {
    /// Creates a new world, rejecting configurations the simulation cannot run.
    pub fn new(config: MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: MatchConfig) -> Self {
        let dimensions = config.dimensions();
        Self {
            grid: OccupancyGrid::new(dimensions.columns(), dimensions.rows()),
            structures: StructureStore::new(),
            registry: LiveRegistry::new(),
            main_towers: MainTowerSlots::new(),
            economy: Economy::new(&config),
            units: UnitStore::new(),
            projectiles: ProjectileStore::new(),
            selected: None,
            phase: MatchPhase::Running,
            rescan_in: config.registry.rescan_interval,
            report: MatchReport::default(),
            dimensions,
            config,
        }
    }

    /// Reinitializes every component from empty state, keeping the configuration.
    pub fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        *self = Self::from_validated(config);
    }

    /// Consumes the world, yielding the match summary.
    #[must_use]
    pub fn teardown(self) -> MatchReport {
        MatchReport {
            ended: self.phase == MatchPhase::Ended,
            ..self.report
        }
    }

    /// Places a structure paid for by `player`, or by the active player when absent.
    ///
    /// Checks run in order: match still running, player known, cell on the
    /// board and inside the player's zone, cell free, mana available. A
    /// failure leaves the economy untouched.
    pub fn place_structure(
        &mut self,
        cell: CellCoord,
        kind: StructureKind,
        player: Option<PlayerId>,
        out_events: &mut Vec<Event>,
    ) -> Result<StructureId, PlacementError> {
        let payer = player.unwrap_or(self.economy.active());
        let result = self.construct(cell, kind, Some(payer));
        self.report_placement(cell, kind, result, out_events);
        if result.is_ok() {
            if let Some(balance) = self.economy.balance(payer) {
                out_events.push(Event::ManaChanged {
                    player: payer,
                    balance,
                });
            }
        }
        result
    }

    /// Places an ownerless structure free of charge, ignoring player zones.
    pub fn seed_structure(
        &mut self,
        cell: CellCoord,
        kind: StructureKind,
        out_events: &mut Vec<Event>,
    ) -> Result<StructureId, PlacementError> {
        let result = self.construct(cell, kind, None);
        self.report_placement(cell, kind, result, out_events);
        result
    }

    fn construct(
        &mut self,
        cell: CellCoord,
        kind: StructureKind,
        payer: Option<PlayerId>,
    ) -> Result<StructureId, PlacementError> {
        if self.phase == MatchPhase::Ended {
            return Err(PlacementError::MatchEnded);
        }
        if let Some(player) = payer {
            let zone = self
                .economy
                .zone(player)
                .ok_or(PlacementError::UnknownPlayer)?;
            if !zone.contains(cell) {
                return Err(PlacementError::InvalidCell);
            }
        }
        if !self.dimensions.contains(cell) {
            return Err(PlacementError::InvalidCell);
        }
        if self.grid.occupant(cell).is_some() {
            return Err(PlacementError::CellOccupied);
        }

        let price = kind.price();
        if let Some(player) = payer {
            if !self.economy.try_spend(player, price) {
                return Err(PlacementError::InsufficientResources);
            }
        }

        let id = self
            .structures
            .insert(StructureDraft::new(kind, cell).owned_by(payer));
        if !self.grid.occupy(id, cell) {
            let _ = self.structures.remove(id);
            if let Some(player) = payer {
                let _ = self.economy.refund(player, price);
            }
            return Err(PlacementError::CellOccupied);
        }
        let _ = self.registry.register(id);
        Ok(id)
    }

    fn report_placement(
        &mut self,
        cell: CellCoord,
        kind: StructureKind,
        result: Result<StructureId, PlacementError>,
        out_events: &mut Vec<Event>,
    ) {
        match result {
            Ok(structure) => {
                let owner = self
                    .structures
                    .get(structure)
                    .and_then(|entry| entry.owner);
                self.report.structures_placed = self.report.structures_placed.saturating_add(1);
                debug!(structure = structure.get(), ?kind, ?cell, "structure placed");
                out_events.push(Event::StructurePlaced {
                    structure,
                    kind,
                    cell,
                    owner,
                });
            }
            Err(reason) => {
                debug!(?kind, ?cell, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected {
                    cell,
                    kind: Some(kind),
                    reason,
                });
            }
        }
    }

    /// Drops a structure from the live set, its main tower slot and the grid.
    ///
    /// Returns whether anything changed; repeated calls are no-ops.
    pub fn unregister(&mut self, structure: StructureId, out_events: &mut Vec<Event>) -> bool {
        let mut changed = self.registry.unregister(structure);
        changed |= self.main_towers.clear(structure).is_some();
        if let Some(mut entry) = self.structures.remove(structure) {
            let _ = entry.retire();
            let _ = self.grid.vacate_if(entry.cell, structure);
            changed = true;
        }
        changed |= self.grid.purge(structure) > 0;
        if changed {
            trace!(structure = structure.get(), "structure unregistered");
        }
        let _ = self.evaluate_end_of_match(out_events);
        changed
    }

    /// Assigns a structure to the main tower slot of its quadrant.
    ///
    /// The caller's `requested` index is advisory only.
    pub fn register_main_tower(
        &mut self,
        requested: SlotIndex,
        structure: StructureId,
        out_events: &mut Vec<Event>,
    ) -> Result<SlotIndex, RegistrationError> {
        let Some(entry) = self.structures.alive(structure) else {
            return Err(RegistrationError::UnknownStructure);
        };
        let slot = self.dimensions.quadrant_slot(entry.cell);
        let hp = entry.hp;
        let structures = &self.structures;
        self.main_towers
            .assign(slot, structure, hp, |id| structures.alive(id).is_some())?;
        if slot != requested {
            debug!(
                structure = structure.get(),
                requested = requested.get(),
                resolved = slot.get(),
                "main tower slot resolved from quadrant"
            );
        }
        out_events.push(Event::MainTowerRegistered { slot, structure });
        Ok(slot)
    }

    /// Re-derives the live set from grid occupancy and repairs stale links.
    pub fn resync(&mut self, out_events: &mut Vec<Event>) -> ResyncReport {
        let outcome = registry::resync(&mut self.grid, &mut self.structures, &mut self.registry);
        for id in outcome.dropped {
            if self.structures.alive(id).is_none() {
                let _ = self.main_towers.clear(id);
                let _ = self.structures.remove(id);
            }
        }

        let structures = &self.structures;
        self.main_towers
            .refresh_peaks(|id| structures.alive(id).map(|entry| entry.hp));

        let report = outcome.report;
        if !report.is_clean() {
            info!(
                live = report.live,
                added = report.added,
                removed = report.removed,
                stale = report.stale_links_cleared,
                relinked = report.relinked,
                restored = report.orphans_restored,
                "registry resynced"
            );
            out_events.push(Event::RegistryResynced { report });
        }
        let _ = self.evaluate_end_of_match(out_events);
        report
    }

    /// Checks the configured end condition, ending the match once it holds.
    ///
    /// Returns whether the match is over. Calls after the end are no-ops.
    pub fn evaluate_end_of_match(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.phase == MatchPhase::Ended {
            return true;
        }

        let policy = self.config.registry.end_policy;
        let lost = match policy {
            EndOfMatchPolicy::MainTowersDestroyed => {
                let structures = &self.structures;
                self.main_towers.all_assigned_once()
                    && self
                        .main_towers
                        .all_fallen(|id| structures.alive(id).map(|entry| entry.hp))
            }
            EndOfMatchPolicy::RegistryEmptied => {
                self.registry.had_any() && self.registry.is_empty()
            }
        };

        if lost {
            self.phase = MatchPhase::Ended;
            info!(?policy, "match ended");
            out_events.push(Event::MatchEnded { policy });
        }
        lost
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let swept = self.units.sweep_dead();
        if swept > 0 {
            trace!(swept, "dead units removed");
        }

        self.report.ticks = self.report.ticks.saturating_add(1);
        self.report.elapsed = self.report.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        for structure in self.structures.iter_mut() {
            structure.cooldown = structure.cooldown.saturating_sub(dt);
        }
        for unit in self.units.iter_mut() {
            unit.attack_cooldown = unit.attack_cooldown.saturating_sub(dt);
        }

        self.advance_projectiles(dt, out_events);

        self.rescan_in = self.rescan_in.saturating_sub(dt);
        if self.rescan_in.is_zero() {
            self.rescan_in = self.config.registry.rescan_interval;
            let _ = self.resync(out_events);
        }

        let _ = self.evaluate_end_of_match(out_events);
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let elapsed_secs = dt.as_secs_f32();
        let tuning = self.config.combat;

        for id in self.projectiles.ids() {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            let target = self
                .units
                .alive(projectile.target)
                .map(|unit| unit.position);
            let Some(outcome) = projectile.step(target, elapsed_secs, &tuning) else {
                continue;
            };
            let Some(projectile) = self.projectiles.remove(id) else {
                continue;
            };

            out_events.push(Event::ProjectileResolved {
                projectile: id,
                outcome,
            });
            if outcome == ProjectileOutcome::Hit {
                self.damage_unit(
                    projectile.target,
                    projectile.damage,
                    projectile.owner,
                    out_events,
                );
            }
        }
    }

    fn damage_structure(&mut self, id: StructureId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(structure) = self.structures.get_mut(id) else {
            return;
        };
        match structure.take_damage(amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { applied } => {
                out_events.push(Event::StructureDamaged {
                    structure: id,
                    amount: applied,
                    remaining: structure.hp,
                });
            }
            DamageOutcome::Destroyed { applied } => {
                let kind = structure.kind;
                let cell = structure.cell;
                out_events.push(Event::StructureDamaged {
                    structure: id,
                    amount: applied,
                    remaining: 0,
                });
                out_events.push(Event::StructureDestroyed {
                    structure: id,
                    kind,
                    cell,
                });
                self.report.structures_destroyed =
                    self.report.structures_destroyed.saturating_add(1);
                debug!(structure = id.get(), ?kind, ?cell, "structure destroyed");
                let _ = self.unregister(id, out_events);
            }
        }
    }

    fn damage_unit(
        &mut self,
        id: UnitId,
        amount: u32,
        credited_to: Option<PlayerId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(unit) = self.units.get_mut(id) else {
            return;
        };
        match unit.take_damage(amount) {
            UnitDamage::Ignored => {}
            UnitDamage::Damaged { applied } => {
                out_events.push(Event::UnitDamaged {
                    unit: id,
                    amount: applied,
                    remaining: unit.hp,
                });
            }
            UnitDamage::Killed { applied, reward } => {
                let archetype = unit.archetype;
                out_events.push(Event::UnitDamaged {
                    unit: id,
                    amount: applied,
                    remaining: 0,
                });

                let mut credited = None;
                let mut amount = 0;
                if let Some(reward) = reward {
                    let player = credited_to.unwrap_or(self.economy.active());
                    if let Some(balance) = self.economy.credit(player, reward) {
                        credited = Some(player);
                        amount = reward;
                        out_events.push(Event::ManaChanged { player, balance });
                    }
                }

                self.report.units_killed = self.report.units_killed.saturating_add(1);
                debug!(unit = id.get(), ?archetype, reward = amount, "unit destroyed");
                out_events.push(Event::UnitDestroyed {
                    unit: id,
                    archetype,
                    reward: amount,
                    credited,
                });
            }
        }
    }

    fn fire_projectile(
        &mut self,
        structure: StructureId,
        target: UnitId,
        out_events: &mut Vec<Event>,
    ) -> Result<ProjectileId, CombatError> {
        let entry = self
            .structures
            .alive(structure)
            .ok_or(CombatError::Unarmed)?;
        let Some(WeaponProfile::Cannon(profile)) = entry.kind.weapon() else {
            return Err(CombatError::Unarmed);
        };
        if !entry.cooldown.is_zero() {
            return Err(CombatError::NotReady);
        }
        if self.units.alive(target).is_none() {
            return Err(CombatError::TargetInvalidated);
        }

        let origin = entry.cell.center();
        let damage = entry.kind.damage();
        let owner = entry.owner;
        let projectile = self
            .projectiles
            .launch(structure, owner, target, origin, damage);
        if let Some(entry) = self.structures.get_mut(structure) {
            entry.cooldown = profile.fire_cooldown;
        }
        self.report.shots_fired = self.report.shots_fired.saturating_add(1);
        out_events.push(Event::ProjectileFired {
            projectile,
            structure,
            target,
        });
        Ok(projectile)
    }

    fn fire_pellets(
        &mut self,
        structure: StructureId,
        targets: Vec<UnitId>,
        out_events: &mut Vec<Event>,
    ) -> Result<u32, CombatError> {
        let entry = self
            .structures
            .alive(structure)
            .ok_or(CombatError::Unarmed)?;
        let Some(WeaponProfile::Shotgun(profile)) = entry.kind.weapon() else {
            return Err(CombatError::Unarmed);
        };
        if !entry.cooldown.is_zero() {
            return Err(CombatError::NotReady);
        }
        if !targets
            .iter()
            .any(|target| self.units.alive(*target).is_some())
        {
            return Err(CombatError::TargetInvalidated);
        }

        let owner = entry.owner;
        if let Some(entry) = self.structures.get_mut(structure) {
            entry.cooldown = profile.fire_cooldown;
        }
        self.report.shots_fired = self.report.shots_fired.saturating_add(1);

        let mut hits = 0;
        let mut damage_events = Vec::new();
        for target in targets {
            if self.units.alive(target).is_some() {
                hits += 1;
                self.damage_unit(target, profile.pellet_damage, owner, &mut damage_events);
            }
        }
        out_events.push(Event::PelletsFired { structure, hits });
        out_events.append(&mut damage_events);
        Ok(hits)
    }

    fn engage(&mut self, unit: UnitId, structure: StructureId, out_events: &mut Vec<Event>) {
        if self.structures.alive(structure).is_none() {
            return;
        }
        let Some(entry) = self.units.get_mut(unit) else {
            return;
        };
        if !entry.is_alive() || entry.target == Some(structure) {
            return;
        }
        entry.state = UnitState::Attacking;
        entry.target = Some(structure);
        entry.attack_cooldown = Duration::ZERO;
        out_events.push(Event::UnitEngaged { unit, structure });
    }

    fn disengage(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.units.get_mut(unit) else {
            return;
        };
        if entry.state != UnitState::Attacking {
            return;
        }
        entry.state = UnitState::Moving;
        entry.target = None;
        out_events.push(Event::UnitDisengaged { unit });
    }

    fn strike(&mut self, unit: UnitId, structure: StructureId, out_events: &mut Vec<Event>) {
        let Some(entry) = self.units.get(unit) else {
            return;
        };
        let ready = entry.state == UnitState::Attacking
            && entry.target == Some(structure)
            && entry.attack_cooldown.is_zero();
        let damage = entry.stats.damage;
        let interval = entry.stats.attack_interval;
        if !ready {
            return;
        }
        if self.structures.alive(structure).is_none() {
            self.disengage(unit, out_events);
            return;
        }

        if let Some(entry) = self.units.get_mut(unit) {
            entry.attack_cooldown = interval;
        }
        self.damage_structure(structure, damage, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the match has ended only [`Command::RestartMatch`] has any effect.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.phase == MatchPhase::Ended && command != Command::RestartMatch {
        return;
    }

    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SelectActivePlayer { player } => {
            if world.economy.set_active(player) {
                out_events.push(Event::ActivePlayerChanged { player });
            }
        }
        Command::SelectStructureType { kind } => {
            world.selected = Some(kind);
            out_events.push(Event::StructureTypeSelected { kind });
        }
        Command::PlaceStructure { cell, kind, player } => {
            let _ = world.place_structure(cell, kind, player, out_events);
        }
        Command::PlaceSelected { cell } => match world.selected {
            Some(kind) => {
                let _ = world.place_structure(cell, kind, None, out_events);
            }
            None => out_events.push(Event::PlacementRejected {
                cell,
                kind: None,
                reason: PlacementError::NothingSelected,
            }),
        },
        Command::SeedStructure { cell, kind } => {
            let _ = world.seed_structure(cell, kind, out_events);
        }
        Command::UnregisterStructure { structure } => {
            let mut events = Vec::new();
            if world.unregister(structure, &mut events) {
                out_events.push(Event::StructureUnregistered { structure });
            }
            out_events.append(&mut events);
        }
        Command::RegisterMainTower { slot, structure } => {
            if let Err(reason) = world.register_main_tower(slot, structure, out_events) {
                out_events.push(Event::RegistrationRejected { structure, reason });
            }
        }
        Command::Resync => {
            let _ = world.resync(out_events);
        }
        Command::SpawnUnit {
            archetype,
            side,
            position,
        } => {
            let Some(archetype) = world.config.units.resolve(archetype) else {
                return;
            };
            let Some(stats) = world.config.units.stats(archetype) else {
                return;
            };
            let draft = UnitDraft::new(archetype, stats, side, position, world.dimensions);
            let unit = world.units.insert(draft);
            world.report.units_spawned = world.report.units_spawned.saturating_add(1);
            out_events.push(Event::UnitSpawned {
                unit,
                archetype,
                position,
            });
        }
        Command::MoveUnit {
            unit,
            position,
            facing,
        } => {
            if let Some(entry) = world.units.get_mut(unit) {
                if entry.state == UnitState::Moving {
                    entry.position = position;
                    entry.facing = facing;
                }
            }
        }
        Command::EngageStructure { unit, structure } => world.engage(unit, structure, out_events),
        Command::DisengageUnit { unit } => world.disengage(unit, out_events),
        Command::StrikeStructure { unit, structure } => world.strike(unit, structure, out_events),
        Command::AimTurret { structure, angle } => {
            if let Some(entry) = world.structures.get_mut(structure) {
                if entry.is_alive() && entry.kind.weapon().is_some() && angle.is_finite() {
                    entry.turret_angle = Some(angle.rem_euclid(360.0));
                }
            }
        }
        Command::FireProjectile { structure, target } => {
            if let Err(reason) = world.fire_projectile(structure, target, out_events) {
                out_events.push(Event::FireRejected { structure, reason });
            }
        }
        Command::FirePellets { structure, targets } => {
            if let Err(reason) = world.fire_pellets(structure, targets, out_events) {
                out_events.push(Event::FireRejected { structure, reason });
            }
        }
        Command::RestartMatch => {
            world.reset();
            info!("match restarted");
            out_events.push(Event::MatchRestarted);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use citadel_defence_core::{
        GridDimensions, MainTowerSlotSnapshot, ManaSnapshot, MatchConfig, MatchPhase,
        OccupancyView, PlayerId, ProjectileSnapshot, StructureId, StructureKind, StructureView,
        UnitView, Vec2,
    };

    use super::World;

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &MatchConfig {
        &world.config
    }

    /// Board dimensions.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.dimensions
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(world: &World) -> MatchPhase {
        world.phase
    }

    /// Reports whether the end condition has been met.
    #[must_use]
    pub fn is_match_ended(world: &World) -> bool {
        world.phase == MatchPhase::Ended
    }

    /// Simulated time processed so far.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.report.elapsed
    }

    /// Number of structures in the live registry.
    #[must_use]
    pub fn live_structure_count(world: &World) -> usize {
        world.registry.len()
    }

    /// Identifiers in the live registry, ascending.
    #[must_use]
    pub fn live_structures(world: &World) -> Vec<StructureId> {
        world.registry.iter().collect()
    }

    /// Reports whether the structure is in the live registry.
    #[must_use]
    pub fn is_registered(world: &World, structure: StructureId) -> bool {
        world.registry.contains(structure)
    }

    /// Captures a read-only view of every structure that is still standing.
    #[must_use]
    pub fn structure_view(world: &World) -> StructureView {
        StructureView::from_snapshots(
            world
                .structures
                .iter()
                .filter(|structure| structure.is_alive())
                .map(|structure| structure.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of every unit, including those that died this tick.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.units.iter().map(|unit| unit.snapshot()).collect())
    }

    /// Snapshots of every projectile in flight, ascending by identifier.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| projectile.snapshot())
            .collect()
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Balance of one player.
    #[must_use]
    pub fn mana(world: &World, player: PlayerId) -> Option<ManaSnapshot> {
        world.economy.balance(player).map(|balance| ManaSnapshot {
            player,
            balance,
            max: world.config.economy.max_mana,
        })
    }

    /// Balances of every player, ascending by player index.
    #[must_use]
    pub fn mana_balances(world: &World) -> Vec<ManaSnapshot> {
        world.economy.snapshots()
    }

    /// Player charged for unattributed placements.
    #[must_use]
    pub fn active_player(world: &World) -> PlayerId {
        world.economy.active()
    }

    /// Kind used by selection-driven placement.
    #[must_use]
    pub fn selected_structure(world: &World) -> Option<StructureKind> {
        world.selected
    }

    /// Current and peak health of the four main tower slots.
    #[must_use]
    pub fn main_tower_slots(world: &World) -> Vec<MainTowerSlotSnapshot> {
        let structures = &world.structures;
        world
            .main_towers
            .snapshots(|id| structures.alive(id).map(|entry| entry.hp))
    }

    /// Reports whether a main tower other than `shooter` stands between `from` and `to`.
    ///
    /// A tower blocks when its centre projects strictly inside the segment
    /// within the block radius. Towers within that radius of `to` never
    /// block, so units pressed against a tower stay targetable.
    #[must_use]
    pub fn is_shot_blocked(world: &World, shooter: StructureId, from: Vec2, to: Vec2) -> bool {
        let segment = to - from;
        let length_sq = segment.length_squared();
        if length_sq <= f32::EPSILON {
            return false;
        }
        let radius = world.config.combat.shot_block_radius;

        main_tower_slots(world)
            .into_iter()
            .filter_map(|slot| slot.structure)
            .filter(|structure| *structure != shooter)
            .filter_map(|structure| world.structures.alive(structure))
            .any(|tower| {
                let center = tower.cell.center();
                let t = (center - from).dot(segment) / length_sq;
                if t <= 0.0 || t >= 1.0 {
                    return false;
                }
                let closest = from + segment * t;
                closest.distance(center) <= radius && center.distance(to) > radius
            })
    }
}
