//! Homing projectiles fired by the cannon family.

use std::collections::BTreeMap;

use citadel_defence_core::{
    CombatConfig, PlayerId, ProjectileId, ProjectileOutcome, ProjectileSnapshot, StructureId,
    UnitId, Vec2,
};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) source: StructureId,
    pub(crate) owner: Option<PlayerId>,
    pub(crate) target: UnitId,
    pub(crate) position: Vec2,
    pub(crate) damage: u32,
}

impl Projectile {
    /// Moves one step toward the target's current position.
    ///
    /// Returns the outcome once the projectile must leave the simulation;
    /// `target` is `None` when the unit is dead or gone.
    pub(crate) fn step(
        &mut self,
        target: Option<Vec2>,
        elapsed_secs: f32,
        tuning: &CombatConfig,
    ) -> Option<ProjectileOutcome> {
        let Some(target) = target else {
            return Some(ProjectileOutcome::TargetLost);
        };

        let offset = target - self.position;
        let distance = offset.length();
        if distance > tuning.max_projectile_distance {
            return Some(ProjectileOutcome::OutOfRange);
        }

        let travel = tuning.projectile_speed.max(0.0) * elapsed_secs;
        if travel >= distance {
            self.position = target;
        } else {
            self.position += offset / distance * travel;
        }

        if self.position.distance(target) < tuning.hit_radius {
            return Some(ProjectileOutcome::Hit);
        }
        None
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            source: self.source,
            target: self.target,
            position: self.position,
            damage: self.damage,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ProjectileStore {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_id: ProjectileId,
}

impl ProjectileStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(
        &mut self,
        source: StructureId,
        owner: Option<PlayerId>,
        target: UnitId,
        position: Vec2,
        damage: u32,
    ) -> ProjectileId {
        let id = self.next_id;
        self.next_id = ProjectileId::new(id.get().saturating_add(1));
        let projectile = Projectile {
            id,
            source,
            owner,
            target,
            position,
            damage,
        };
        let _ = self.entries.insert(id, projectile);
        id
    }

    pub(crate) fn ids(&self) -> Vec<ProjectileId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }
}
