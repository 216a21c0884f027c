//! Dense cell occupancy for structures.

use citadel_defence_core::{CellCoord, OccupancyView, StructureId};

#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<StructureId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<StructureId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Links the cell to the structure; fails when the cell is taken or off the board.
    pub(crate) fn occupy(&mut self, structure: StructureId, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        match self.cells.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(structure);
                true
            }
            _ => false,
        }
    }

    /// Clears the cell, returning the structure it held.
    pub(crate) fn vacate(&mut self, cell: CellCoord) -> Option<StructureId> {
        let index = self.index(cell)?;
        self.cells.get_mut(index).and_then(Option::take)
    }

    /// Clears the cell only if it still points at `structure`.
    pub(crate) fn vacate_if(&mut self, cell: CellCoord, structure: StructureId) -> bool {
        if self.occupant(cell) == Some(structure) {
            let _ = self.vacate(cell);
            true
        } else {
            false
        }
    }

    /// Clears every cell pointing at `structure`, returning how many were cleared.
    pub(crate) fn purge(&mut self, structure: StructureId) -> usize {
        let mut cleared = 0;
        for slot in &mut self.cells {
            if *slot == Some(structure) {
                *slot = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Occupied cells in row-major order.
    pub(crate) fn occupied(&self) -> Vec<(CellCoord, StructureId)> {
        let width = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let structure = (*slot)?;
                let index = u32::try_from(index).ok()?;
                Some((CellCoord::new(index % width, index / width), structure))
            })
            .collect()
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
