//! Authoritative structure state and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use citadel_defence_core::{CellCoord, PlayerId, StructureId, StructureKind, StructureSnapshot};

/// Structure stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Structure {
    pub(crate) id: StructureId,
    pub(crate) kind: StructureKind,
    pub(crate) cell: CellCoord,
    pub(crate) owner: Option<PlayerId>,
    pub(crate) hp: u32,
    pub(crate) max_hp: u32,
    pub(crate) turret_angle: Option<f32>,
    pub(crate) cooldown: Duration,
    destroyed: bool,
}

/// Result of applying damage to a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The structure was already destroyed; nothing changed.
    Ignored,
    /// Hit points dropped but stayed above zero.
    Damaged { applied: u32 },
    /// Hit points reached zero; reported exactly once per structure.
    Destroyed { applied: u32 },
}

impl Structure {
    pub(crate) fn is_alive(&self) -> bool {
        !self.destroyed && self.hp > 0
    }

    pub(crate) fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.destroyed {
            return DamageOutcome::Ignored;
        }
        let applied = amount.min(self.hp);
        self.hp -= applied;
        if self.hp == 0 {
            self.destroyed = true;
            DamageOutcome::Destroyed { applied }
        } else {
            DamageOutcome::Damaged { applied }
        }
    }

    /// Marks the structure as gone without damage, returning whether it was alive.
    pub(crate) fn retire(&mut self) -> bool {
        let was_alive = !self.destroyed;
        self.destroyed = true;
        was_alive
    }

    pub(crate) fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            owner: self.owner,
            hp: self.hp,
            max_hp: self.max_hp,
            turret_angle: self.turret_angle,
            ready_in: self.cooldown,
        }
    }
}

/// First construction phase: every field a structure needs before it goes live.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StructureDraft {
    kind: StructureKind,
    cell: CellCoord,
    owner: Option<PlayerId>,
    hp: u32,
}

impl StructureDraft {
    pub(crate) fn new(kind: StructureKind, cell: CellCoord) -> Self {
        Self {
            kind,
            cell,
            owner: None,
            hp: kind.max_hp(),
        }
    }

    pub(crate) fn owned_by(mut self, owner: Option<PlayerId>) -> Self {
        self.owner = owner;
        self
    }

    /// Second phase: snapshots `max_hp` and arms the turret.
    pub(crate) fn activate(self, id: StructureId) -> Structure {
        Structure {
            id,
            kind: self.kind,
            cell: self.cell,
            owner: self.owner,
            hp: self.hp,
            max_hp: self.hp,
            turret_angle: None,
            cooldown: Duration::ZERO,
            destroyed: false,
        }
    }
}

/// Storage that owns structures and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct StructureStore {
    entries: BTreeMap<StructureId, Structure>,
    next_id: StructureId,
}

impl StructureStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: StructureId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, draft: StructureDraft) -> StructureId {
        let id = self.next_id;
        self.next_id = StructureId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, draft.activate(id));
        id
    }

    pub(crate) fn get(&self, id: StructureId) -> Option<&Structure> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: StructureId) -> Option<Structure> {
        self.entries.remove(&id)
    }

    /// Live structure lookup; destroyed entries are treated as missing.
    pub(crate) fn alive(&self, id: StructureId) -> Option<&Structure> {
        self.entries.get(&id).filter(|structure| structure.is_alive())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Structure> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_snapshots_max_hp() {
        let mut store = StructureStore::new();
        let id = store.insert(StructureDraft::new(StructureKind::HeavyCannon, CellCoord::new(1, 1)));
        let structure = store.get(id).expect("inserted");
        assert_eq!(structure.hp, 220);
        assert_eq!(structure.max_hp, 220);
        assert_eq!(structure.turret_angle, None);
    }

    #[test]
    fn identifiers_increase_monotonically() {
        let mut store = StructureStore::new();
        let first = store.insert(StructureDraft::new(StructureKind::Cannon, CellCoord::new(0, 0)));
        let second = store.insert(StructureDraft::new(StructureKind::Cannon, CellCoord::new(1, 0)));
        assert!(first < second);
    }

    #[test]
    fn destruction_is_reported_once() {
        let mut store = StructureStore::new();
        let id = store.insert(StructureDraft::new(StructureKind::RapidCannon, CellCoord::new(0, 0)));
        let structure = store.get_mut(id).expect("inserted");

        assert_eq!(
            structure.take_damage(30),
            DamageOutcome::Damaged { applied: 30 }
        );
        assert_eq!(
            structure.take_damage(100),
            DamageOutcome::Destroyed { applied: 50 }
        );
        assert_eq!(structure.take_damage(10), DamageOutcome::Ignored);
        assert!(!structure.is_alive());
        assert!(store.alive(id).is_none());
    }
}
