//! Hostile unit state and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use citadel_defence_core::{
    AxisPriority, BorderSide, Direction, GridDimensions, StructureId, UnitArchetype, UnitId,
    UnitSnapshot, UnitState, UnitStats, Vec2,
};

#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) archetype: UnitArchetype,
    pub(crate) stats: UnitStats,
    pub(crate) hp: u32,
    pub(crate) position: Vec2,
    pub(crate) destination: Vec2,
    pub(crate) axis_priority: AxisPriority,
    pub(crate) facing: Direction,
    pub(crate) state: UnitState,
    pub(crate) target: Option<StructureId>,
    pub(crate) attack_cooldown: Duration,
    reward_given: bool,
}

/// Result of applying damage to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnitDamage {
    Ignored,
    Damaged { applied: u32 },
    /// `reward` is `Some` only for the first kill report of the unit.
    Killed { applied: u32, reward: Option<u32> },
}

impl Unit {
    pub(crate) fn is_alive(&self) -> bool {
        self.state != UnitState::Dead
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> UnitDamage {
        if !self.is_alive() {
            return UnitDamage::Ignored;
        }
        let applied = amount.min(self.hp);
        self.hp -= applied;
        if self.hp > 0 {
            return UnitDamage::Damaged { applied };
        }

        self.state = UnitState::Dead;
        self.target = None;
        let reward = if self.reward_given {
            None
        } else {
            self.reward_given = true;
            Some(self.stats.mana_reward)
        };
        UnitDamage::Killed { applied, reward }
    }

    pub(crate) fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            archetype: self.archetype,
            position: self.position,
            destination: self.destination,
            axis_priority: self.axis_priority,
            facing: self.facing,
            state: self.state,
            target: self.target,
            hp: self.hp,
            speed: self.stats.speed,
            attack_ready_in: self.attack_cooldown,
        }
    }
}

/// First construction phase: destination and axis priority are fixed here.
#[derive(Clone, Copy, Debug)]
pub(crate) struct UnitDraft {
    archetype: UnitArchetype,
    stats: UnitStats,
    position: Vec2,
    destination: Vec2,
    axis_priority: AxisPriority,
}

impl UnitDraft {
    pub(crate) fn new(
        archetype: UnitArchetype,
        stats: UnitStats,
        side: BorderSide,
        position: Vec2,
        grid: GridDimensions,
    ) -> Self {
        Self {
            archetype,
            stats,
            position,
            destination: grid.objective_destination(position),
            axis_priority: side.axis_priority(),
        }
    }

    pub(crate) fn activate(self, id: UnitId) -> Unit {
        Unit {
            id,
            archetype: self.archetype,
            stats: self.stats,
            hp: self.stats.hp,
            position: self.position,
            destination: self.destination,
            axis_priority: self.axis_priority,
            facing: Direction::dominant(self.destination - self.position),
            state: UnitState::Moving,
            target: None,
            attack_cooldown: Duration::ZERO,
            reward_given: false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct UnitStore {
    entries: BTreeMap<UnitId, Unit>,
    next_id: UnitId,
}

impl UnitStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: UnitId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, draft: UnitDraft) -> UnitId {
        let id = self.next_id;
        self.next_id = UnitId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, draft.activate(id));
        id
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&Unit> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn alive(&self, id: UnitId) -> Option<&Unit> {
        self.entries.get(&id).filter(|unit| unit.is_alive())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.entries.values_mut()
    }

    /// Drops units that died during the previous tick.
    pub(crate) fn sweep_dead(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, unit| unit.is_alive());
        before - self.entries.len()
    }
}
