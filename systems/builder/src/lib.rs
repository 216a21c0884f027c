#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system that turns player input into selection and placement commands.

use citadel_defence_core::{
    CellCoord, Command, Event, ManaSnapshot, OccupancyView, PlacementError, PlayerId,
    StructureKind,
};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Player the adapter switched to on this frame.
    pub select_player: Option<PlayerId>,
    /// Structure kind picked from the weapon panel on this frame.
    pub select_kind: Option<StructureKind>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<CellCoord>,
}

/// Declarative placement preview describing a potential construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of structure proposed for placement.
    pub kind: StructureKind,
    /// Cell the structure would occupy.
    pub cell: CellCoord,
    /// Reason the placement would be rejected, `None` when it would succeed.
    pub blocked_by: Option<PlacementError>,
}

impl PlacementPreview {
    /// Reports whether confirming the preview would place the structure.
    #[must_use]
    pub const fn placeable(&self) -> bool {
        self.blocked_by.is_none()
    }
}

/// Builder system that tracks the selected kind and emits placement commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    selected: Option<StructureKind>,
    ended: bool,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: None,
            ended: false,
        }
    }

    /// Kind the world reported as selected.
    #[must_use]
    pub const fn selected(&self) -> Option<StructureKind> {
        self.selected
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// Selection changes are emitted before the placement so a single frame
    /// may pick a kind and place it.
    pub fn handle(&mut self, events: &[Event], input: BuilderInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::StructureTypeSelected { kind } => self.selected = Some(*kind),
                Event::MatchEnded { .. } => self.ended = true,
                Event::MatchRestarted => *self = Self::new(),
                _ => {}
            }
        }

        if self.ended {
            return;
        }

        if let Some(player) = input.select_player {
            out.push(Command::SelectActivePlayer { player });
        }
        if let Some(kind) = input.select_kind {
            out.push(Command::SelectStructureType { kind });
        }
        if input.confirm_action {
            if let Some(cell) = input.cursor_cell {
                out.push(Command::PlaceSelected { cell });
            }
        }
    }

    /// Predicts the outcome of placing the selected kind at the cursor.
    ///
    /// Zones are not consulted; the world remains the authority.
    #[must_use]
    pub fn preview(
        &self,
        cursor: CellCoord,
        occupancy: OccupancyView<'_>,
        mana: Option<ManaSnapshot>,
    ) -> Option<PlacementPreview> {
        let kind = self.selected?;
        let (columns, rows) = occupancy.dimensions();
        let blocked_by = if cursor.column() >= columns || cursor.row() >= rows {
            Some(PlacementError::InvalidCell)
        } else if !occupancy.is_free(cursor) {
            Some(PlacementError::CellOccupied)
        } else {
            match mana {
                None => Some(PlacementError::UnknownPlayer),
                Some(mana) if mana.balance < kind.price() => {
                    Some(PlacementError::InsufficientResources)
                }
                Some(_) => None,
            }
        };
        Some(PlacementPreview {
            kind,
            cell: cursor,
            blocked_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_defence_core::{EndOfMatchPolicy, StructureId};

    fn mana(balance: u32) -> Option<ManaSnapshot> {
        Some(ManaSnapshot {
            player: PlayerId::new(0),
            balance,
            max: 50_000,
        })
    }

    #[test]
    fn preview_reports_the_first_blocking_reason() {
        let mut builder = Builder::new();
        let mut out = Vec::new();
        builder.handle(
            &[Event::StructureTypeSelected {
                kind: StructureKind::HeavyCannon,
            }],
            BuilderInput::default(),
            &mut out,
        );
        let cells = vec![None, Some(StructureId::new(0)), None, None];
        let occupancy = OccupancyView::new(&cells, 2, 2);

        let free = builder.preview(CellCoord::new(0, 0), occupancy, mana(10_000));
        let taken = builder.preview(CellCoord::new(1, 0), occupancy, mana(10_000));
        let poor = builder.preview(CellCoord::new(0, 1), occupancy, mana(10));
        let outside = builder.preview(CellCoord::new(5, 0), occupancy, mana(10_000));

        assert_eq!(free.map(|preview| preview.placeable()), Some(true));
        assert_eq!(
            taken.and_then(|preview| preview.blocked_by),
            Some(PlacementError::CellOccupied)
        );
        assert_eq!(
            poor.and_then(|preview| preview.blocked_by),
            Some(PlacementError::InsufficientResources)
        );
        assert_eq!(
            outside.and_then(|preview| preview.blocked_by),
            Some(PlacementError::InvalidCell)
        );
    }

    #[test]
    fn nothing_is_previewed_without_a_selection() {
        let builder = Builder::new();
        let cells = vec![None; 4];
        assert_eq!(
            builder.preview(
                CellCoord::new(0, 0),
                OccupancyView::new(&cells, 2, 2),
                mana(500)
            ),
            None
        );
    }

    #[test]
    fn ended_match_silences_input_until_restart() {
        let mut builder = Builder::new();
        let input = BuilderInput {
            confirm_action: true,
            cursor_cell: Some(CellCoord::new(1, 1)),
            ..BuilderInput::default()
        };
        let mut out = Vec::new();

        builder.handle(
            &[Event::MatchEnded {
                policy: EndOfMatchPolicy::MainTowersDestroyed,
            }],
            input,
            &mut out,
        );
        assert!(out.is_empty());

        builder.handle(&[Event::MatchRestarted], input, &mut out);
        assert_eq!(
            out,
            vec![Command::PlaceSelected {
                cell: CellCoord::new(1, 1)
            }]
        );
    }
}
