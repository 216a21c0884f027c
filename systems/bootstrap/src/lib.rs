#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that seeds the objective and registers its main towers.

use citadel_defence_core::{
    Command, Event, GridDimensions, LayoutEntry, MatchConfig, SlotIndex, StructureKind,
    MAIN_TOWER_SLOTS,
};

const LAST_SLOT: u8 = MAIN_TOWER_SLOTS as u8 - 1;

/// Emits the commands that prepare a fresh match.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    dimensions: GridDimensions,
    layout: Vec<LayoutEntry>,
    next_slot: u8,
}

impl Bootstrap {
    /// Creates a bootstrap system for the supplied match.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            dimensions: config.dimensions(),
            layout: config.layout.clone(),
            next_slot: 0,
        }
    }

    /// Emits the opening commands: the four main towers, then the configured layout.
    pub fn start(&mut self, out: &mut Vec<Command>) {
        self.next_slot = 0;
        for cell in self.dimensions.objective_cells() {
            out.push(Command::SeedStructure {
                cell,
                kind: StructureKind::MainTower,
            });
        }
        out.extend(self.layout.iter().map(|entry| Command::PlaceStructure {
            cell: entry.cell,
            kind: entry.kind,
            player: entry.player,
        }));
    }

    /// Registers the seeded objective towers and reseeds the board after a restart.
    ///
    /// Main towers bought by players are ordinary structures and never take a slot.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::StructurePlaced {
                    structure,
                    kind: StructureKind::MainTower,
                    cell,
                    owner: None,
                } if self.dimensions.objective_cells().contains(cell) => {
                    let slot = self.next_slot.min(LAST_SLOT);
                    self.next_slot = self.next_slot.saturating_add(1);
                    out.push(Command::RegisterMainTower {
                        slot: SlotIndex::new(slot),
                        structure: *structure,
                    });
                }
                Event::MatchRestarted => self.start(out),
                _ => {}
            }
        }
    }
}
