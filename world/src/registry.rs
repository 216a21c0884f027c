//! Live structure registry and its self-healing rescan.

use std::collections::BTreeSet;

use citadel_defence_core::{CellCoord, ResyncReport, StructureId};

use crate::{grid::OccupancyGrid, structures::StructureStore};

#[derive(Clone, Debug, Default)]
pub(crate) struct LiveRegistry {
    live: BTreeSet<StructureId>,
    had_any: bool,
}

impl LiveRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds the structure; repeated calls are no-ops.
    pub(crate) fn register(&mut self, structure: StructureId) -> bool {
        self.had_any = true;
        self.live.insert(structure)
    }

    /// Removes the structure; repeated calls are no-ops.
    pub(crate) fn unregister(&mut self, structure: StructureId) -> bool {
        self.live.remove(&structure)
    }

    pub(crate) fn contains(&self, structure: StructureId) -> bool {
        self.live.contains(&structure)
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Reports whether the set has ever held a structure.
    pub(crate) fn had_any(&self) -> bool {
        self.had_any
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = StructureId> + '_ {
        self.live.iter().copied()
    }

    fn replace(&mut self, live: BTreeSet<StructureId>) {
        self.had_any |= !live.is_empty();
        self.live = live;
    }
}

/// Outcome of [`resync`]: the repair summary plus structures that left the live set.
#[derive(Debug)]
pub(crate) struct Resync {
    pub(crate) report: ResyncReport,
    pub(crate) dropped: Vec<StructureId>,
}

/// Re-derives the live set from grid occupancy.
///
/// Grid links to missing or destroyed structures are cleared, a structure
/// linked from more than one cell keeps only its recorded cell, recorded
/// cells that disagree with the grid are corrected, and live structures
/// absent from the grid are put back on their recorded cell when it is
/// free. A structure that cannot be put back is retired and reported as
/// dropped, registered or not. Running it twice
/// in a row leaves the second report clean.
pub(crate) fn resync(
    grid: &mut OccupancyGrid,
    store: &mut StructureStore,
    registry: &mut LiveRegistry,
) -> Resync {
    let mut report = ResyncReport::default();
    let mut derived: BTreeSet<StructureId> = BTreeSet::new();

    for (cell, id) in grid.occupied() {
        let Some(recorded) = store.alive(id).map(|structure| structure.cell) else {
            let _ = grid.vacate(cell);
            report.stale_links_cleared += 1;
            continue;
        };

        let duplicate = recorded != cell && grid.occupant(recorded) == Some(id);
        if duplicate || derived.contains(&id) {
            let _ = grid.vacate(cell);
            report.stale_links_cleared += 1;
            continue;
        }

        if recorded != cell {
            if let Some(structure) = store.get_mut(id) {
                structure.cell = cell;
                report.relinked += 1;
            }
        }
        let _ = derived.insert(id);
    }

    let orphans: Vec<(StructureId, CellCoord)> = store
        .iter()
        .filter(|structure| structure.is_alive() && !derived.contains(&structure.id))
        .map(|structure| (structure.id, structure.cell))
        .collect();
    let mut retired = Vec::new();
    for (id, cell) in orphans {
        if grid.occupy(id, cell) {
            let _ = derived.insert(id);
            report.orphans_restored += 1;
        } else if let Some(structure) = store.get_mut(id) {
            let _ = structure.retire();
            retired.push(id);
        }
    }

    report.added = derived.difference(&registry.live).count();
    let mut dropped: Vec<StructureId> = registry.live.difference(&derived).copied().collect();
    report.removed = dropped.len();
    dropped.extend(retired.into_iter().filter(|id| !registry.live.contains(id)));
    registry.replace(derived);
    report.live = registry.len();

    Resync { report, dropped }
}
