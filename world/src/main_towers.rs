//! The four objective slots and their health tracking.

use citadel_defence_core::{
    MainTowerSlotSnapshot, RegistrationError, SlotIndex, StructureId, MAIN_TOWER_SLOTS,
};

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    structure: Option<StructureId>,
    peak_hp: u32,
    ever_assigned: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MainTowerSlots {
    slots: [Slot; MAIN_TOWER_SLOTS],
}

impl MainTowerSlots {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn slot_of(&self, structure: StructureId) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|slot| slot.structure == Some(structure))
            .and_then(|index| u8::try_from(index).ok())
            .map(SlotIndex::new)
    }

    /// Puts `structure` into `slot`, moving it out of any other slot first.
    ///
    /// A slot whose holder is still alive is never taken over.
    pub(crate) fn assign(
        &mut self,
        slot: SlotIndex,
        structure: StructureId,
        hp: u32,
        is_alive: impl Fn(StructureId) -> bool,
    ) -> Result<(), RegistrationError> {
        let index = usize::from(slot.get());
        if index >= MAIN_TOWER_SLOTS {
            return Err(RegistrationError::UnknownStructure);
        }
        match self.slots[index].structure {
            Some(holder) if holder == structure => {
                return Err(RegistrationError::DuplicateRegistration)
            }
            Some(holder) if is_alive(holder) => return Err(RegistrationError::SlotTaken),
            _ => {}
        }
        let _ = self.clear(structure);
        self.slots[index] = Slot {
            structure: Some(structure),
            peak_hp: hp.max(1),
            ever_assigned: true,
        };
        Ok(())
    }

    pub(crate) fn clear(&mut self, structure: StructureId) -> Option<SlotIndex> {
        let slot = self.slot_of(structure)?;
        self.slots[usize::from(slot.get())].structure = None;
        Some(slot)
    }

    /// Raises each slot's peak to the tower's current hp where it is higher.
    pub(crate) fn refresh_peaks(&mut self, hp_of: impl Fn(StructureId) -> Option<u32>) {
        for slot in &mut self.slots {
            if let Some(hp) = slot.structure.and_then(&hp_of) {
                slot.peak_hp = slot.peak_hp.max(hp);
            }
        }
    }

    pub(crate) fn all_assigned_once(&self) -> bool {
        self.slots.iter().all(|slot| slot.ever_assigned)
    }

    /// Reports whether every slot is empty or holds a tower at zero hp.
    pub(crate) fn all_fallen(&self, hp_of: impl Fn(StructureId) -> Option<u32>) -> bool {
        self.slots.iter().all(|slot| match slot.structure {
            None => true,
            Some(structure) => hp_of(structure).map_or(true, |hp| hp == 0),
        })
    }

    pub(crate) fn snapshots(
        &self,
        hp_of: impl Fn(StructureId) -> Option<u32>,
    ) -> Vec<MainTowerSlotSnapshot> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                Some(MainTowerSlotSnapshot {
                    slot: SlotIndex::new(u8::try_from(index).ok()?),
                    structure: slot.structure,
                    hp: slot.structure.and_then(&hp_of).unwrap_or(0),
                    peak_hp: slot.peak_hp,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_structure_never_holds_two_slots() {
        let mut slots = MainTowerSlots::new();
        let tower = StructureId::new(4);
        slots.assign(SlotIndex::new(0), tower, 200, |_| true).expect("assign");
        slots.assign(SlotIndex::new(2), tower, 200, |_| true).expect("reassign");

        assert_eq!(slots.slot_of(tower), Some(SlotIndex::new(2)));
        let held = slots
            .snapshots(|_| Some(200))
            .into_iter()
            .filter(|snapshot| snapshot.structure == Some(tower))
            .count();
        assert_eq!(held, 1);
    }

    #[test]
    fn reassigning_the_same_slot_is_a_duplicate() {
        let mut slots = MainTowerSlots::new();
        let tower = StructureId::new(1);
        slots.assign(SlotIndex::new(1), tower, 200, |_| true).expect("assign");
        assert_eq!(
            slots.assign(SlotIndex::new(1), tower, 200, |_| true),
            Err(RegistrationError::DuplicateRegistration)
        );
    }

    #[test]
    fn live_holders_keep_their_slot() {
        let mut slots = MainTowerSlots::new();
        let holder = StructureId::new(1);
        let intruder = StructureId::new(7);
        slots.assign(SlotIndex::new(0), holder, 200, |_| true).expect("assign");

        assert_eq!(
            slots.assign(SlotIndex::new(0), intruder, 200, |_| true),
            Err(RegistrationError::SlotTaken)
        );
        assert_eq!(slots.slot_of(holder), Some(SlotIndex::new(0)));

        slots
            .assign(SlotIndex::new(0), intruder, 200, |id| id != holder)
            .expect("a fallen holder is replaced");
        assert_eq!(slots.slot_of(intruder), Some(SlotIndex::new(0)));
    }

    #[test]
    fn peaks_only_move_upward() {
        let mut slots = MainTowerSlots::new();
        let tower = StructureId::new(1);
        slots.assign(SlotIndex::new(3), tower, 0, |_| true).expect("assign");
        slots.refresh_peaks(|_| Some(150));
        slots.refresh_peaks(|_| Some(90));

        let snapshot = slots.snapshots(|_| Some(90))[3];
        assert_eq!(snapshot.peak_hp, 150);
        assert_eq!(snapshot.hp, 90);
    }

    #[test]
    fn fallen_requires_every_slot_empty_or_dead() {
        let mut slots = MainTowerSlots::new();
        slots
            .assign(SlotIndex::new(0), StructureId::new(0), 200, |_| true)
            .expect("assign");
        slots
            .assign(SlotIndex::new(1), StructureId::new(1), 200, |_| true)
            .expect("assign");

        assert!(!slots.all_assigned_once());
        assert!(!slots.all_fallen(|id| Some(if id.get() == 0 { 0 } else { 10 })));
        assert!(slots.all_fallen(|_| Some(0)));
        assert!(slots.all_fallen(|_| None));
    }
}
