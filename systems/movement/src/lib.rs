#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that marches units and engages nearby structures.

use std::time::Duration;

use citadel_defence_core::{
    AxisPriority, CellCoord, CombatConfig, Command, Direction, Event, OccupancyView, StructureId,
    StructureView, UnitSnapshot, UnitState, UnitView, Vec2,
};

/// Remaining offset on the priority axis below which a unit turns to the other axis.
pub const AXIS_EPSILON: f32 = 0.01;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and immutable views to emit movement commands.
    ///
    /// Moving units either engage a structure within reach or advance along
    /// their axis-ordered path; attacking units strike when their attack is
    /// ready and fall back to moving once the target is gone or out of reach.
    pub fn handle(
        &mut self,
        events: &[Event],
        units: &UnitView,
        structures: &StructureView,
        occupancy: OccupancyView<'_>,
        tuning: &CombatConfig,
        out: &mut Vec<Command>,
    ) {
        let Some(dt) = elapsed(events) else {
            return;
        };

        for unit in units.alive() {
            match unit.state {
                UnitState::Moving => {
                    let proximity = Proximity {
                        structures,
                        occupancy,
                        radius: tuning.engage_radius,
                    };
                    if let Some(structure) = proximity.find(unit.position) {
                        out.push(Command::EngageStructure {
                            unit: unit.id,
                            structure,
                        });
                        continue;
                    }
                    if let Some((position, facing)) = advance(unit, dt, tuning.arrive_threshold)
                    {
                        out.push(Command::MoveUnit {
                            unit: unit.id,
                            position,
                            facing,
                        });
                    }
                }
                UnitState::Attacking => {
                    let in_reach = unit.target.and_then(|target| {
                        structures.get(target).filter(|structure| {
                            structure.position().distance(unit.position) <= tuning.engage_radius
                        })
                    });
                    match in_reach {
                        Some(structure) if unit.attack_ready_in.is_zero() => {
                            out.push(Command::StrikeStructure {
                                unit: unit.id,
                                structure: structure.id,
                            });
                        }
                        Some(_) => {}
                        None => out.push(Command::DisengageUnit { unit: unit.id }),
                    }
                }
                UnitState::Dead => {}
            }
        }
    }
}

fn elapsed(events: &[Event]) -> Option<Duration> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .reduce(|total, dt| total.saturating_add(dt))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, vector: Vec2) -> f32 {
        match self {
            Self::X => vector.x,
            Self::Y => vector.y,
        }
    }

    fn shift(self, vector: &mut Vec2, amount: f32) {
        match self {
            Self::X => vector.x += amount,
            Self::Y => vector.y += amount,
        }
    }

    fn facing(self, delta: f32) -> Direction {
        match self {
            Self::X if delta >= 0.0 => Direction::East,
            Self::X => Direction::West,
            Self::Y if delta >= 0.0 => Direction::North,
            Self::Y => Direction::South,
        }
    }
}

/// Next position and facing of a moving unit, `None` once it has arrived.
///
/// The priority axis is resolved first; a single tick moves along one axis
/// only and never past the destination coordinate.
fn advance(
    unit: &UnitSnapshot,
    dt: Duration,
    arrive_threshold: f32,
) -> Option<(Vec2, Direction)> {
    if unit.position.distance(unit.destination) <= arrive_threshold {
        return None;
    }

    let order = match unit.axis_priority {
        AxisPriority::XFirst => [Axis::X, Axis::Y],
        AxisPriority::YFirst => [Axis::Y, Axis::X],
    };
    let travel = unit.speed.max(0.0) * dt.as_secs_f32();
    if travel <= 0.0 {
        return None;
    }

    let axis = order.into_iter().find(|axis| {
        (axis.of(unit.destination) - axis.of(unit.position)).abs() > AXIS_EPSILON
    })?;
    let delta = axis.of(unit.destination) - axis.of(unit.position);
    let mut position = unit.position;
    axis.shift(&mut position, delta.abs().min(travel).copysign(delta));
    Some((position, axis.facing(delta)))
}

struct Proximity<'a> {
    structures: &'a StructureView,
    occupancy: OccupancyView<'a>,
    radius: f32,
}

impl Proximity<'_> {
    /// First structure within reach of `position`.
    ///
    /// Cells around the position are walked bottom row first, left to right.
    /// When the grid yields nothing every live structure is scanned and the
    /// nearest one within reach wins.
    fn find(&self, position: Vec2) -> Option<StructureId> {
        self.from_grid(position)
            .or_else(|| self.from_scan(position))
    }

    fn from_grid(&self, position: Vec2) -> Option<StructureId> {
        let column = position.x.round();
        let row = position.y.round();
        for dy in [-1.0, 0.0, 1.0] {
            for dx in [-1.0, 0.0, 1.0] {
                let Some(cell) = CellCoord::nearest_to(Vec2::new(column + dx, row + dy)) else {
                    continue;
                };
                let Some(occupant) = self.occupancy.occupant(cell) else {
                    continue;
                };
                let within = self.structures.get(occupant).is_some_and(|structure| {
                    structure.position().distance(position) <= self.radius
                });
                if within {
                    return Some(occupant);
                }
            }
        }
        None
    }

    fn from_scan(&self, position: Vec2) -> Option<StructureId> {
        let mut best: Option<(f32, StructureId)> = None;
        for structure in self.structures.iter() {
            let distance = structure.position().distance(position);
            if distance > self.radius {
                continue;
            }
            if best.map_or(true, |(closest, _)| distance < closest) {
                best = Some((distance, structure.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_defence_core::{StructureKind, StructureSnapshot, UnitArchetype, UnitId};
    use proptest::prelude::*;

    fn unit(
        position: (f32, f32),
        destination: (f32, f32),
        priority: AxisPriority,
    ) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(0),
            archetype: UnitArchetype::Standard,
            position: Vec2::new(position.0, position.1),
            destination: Vec2::new(destination.0, destination.1),
            axis_priority: priority,
            facing: Direction::South,
            state: UnitState::Moving,
            target: None,
            hp: 100,
            speed: 2.0,
            attack_ready_in: Duration::ZERO,
        }
    }

    fn structure(id: u32, cell: (u32, u32)) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            kind: StructureKind::MainTower,
            cell: CellCoord::new(cell.0, cell.1),
            owner: None,
            hp: 200,
            max_hp: 200,
            turret_angle: None,
            ready_in: Duration::ZERO,
        }
    }

    #[test]
    fn priority_axis_is_resolved_first() {
        let step = advance(
            &unit((3.0, 10.0), (4.0, 4.0), AxisPriority::YFirst),
            Duration::from_millis(500),
            0.05,
        );
        assert_eq!(step, Some((Vec2::new(3.0, 9.0), Direction::South)));

        let step = advance(
            &unit((3.0, 4.0), (4.0, 4.0), AxisPriority::YFirst),
            Duration::from_millis(250),
            0.05,
        );
        assert_eq!(step, Some((Vec2::new(3.5, 4.0), Direction::East)));
    }

    #[test]
    fn steps_are_clamped_at_the_destination() {
        let step = advance(
            &unit((-1.5, 3.0), (3.0, 3.0), AxisPriority::XFirst),
            Duration::from_secs(10),
            0.05,
        );
        assert_eq!(step, Some((Vec2::new(3.0, 3.0), Direction::East)));
    }

    #[test]
    fn arrived_units_stay_put() {
        let step = advance(
            &unit((3.0, 4.03), (3.0, 4.0), AxisPriority::YFirst),
            Duration::from_millis(100),
            0.05,
        );
        assert_eq!(step, None);
    }

    #[test]
    fn grid_query_finds_adjacent_structures() {
        let cells = vec![None, None, None, Some(StructureId::new(4))];
        let occupancy = OccupancyView::new(&cells, 2, 2);
        let structures = StructureView::from_snapshots(vec![structure(4, (1, 1))]);
        let proximity = Proximity {
            structures: &structures,
            occupancy,
            radius: 0.6,
        };

        assert_eq!(
            proximity.find(Vec2::new(1.0, 1.5)),
            Some(StructureId::new(4))
        );
        assert_eq!(proximity.find(Vec2::new(1.0, 1.7)), None);
    }

    #[test]
    fn scan_covers_structures_missing_from_the_grid() {
        let cells = vec![None; 4];
        let occupancy = OccupancyView::new(&cells, 2, 2);
        let structures =
            StructureView::from_snapshots(vec![structure(1, (0, 0)), structure(2, (1, 0))]);
        let proximity = Proximity {
            structures: &structures,
            occupancy,
            radius: 0.6,
        };

        assert_eq!(
            proximity.find(Vec2::new(0.55, 0.0)),
            Some(StructureId::new(2))
        );
    }

    fn between(value: f32, start: f32, end: f32) -> bool {
        value >= start.min(end) - 1e-4 && value <= start.max(end) + 1e-4
    }

    proptest! {
        #[test]
        fn movement_never_overshoots(
            start in (-4.0f32..12.0, -4.0f32..12.0),
            destination in (3.0f32..5.0, 3.0f32..5.0),
            x_first in any::<bool>(),
            speed in 0.1f32..6.0,
            millis in 1u64..400,
        ) {
            let priority = if x_first { AxisPriority::XFirst } else { AxisPriority::YFirst };
            let mut snapshot = unit(start, destination, priority);
            snapshot.speed = speed;

            for _ in 0..200 {
                let Some((position, _)) = advance(&snapshot, Duration::from_millis(millis), 0.05)
                else {
                    break;
                };
                prop_assert!(between(position.x, start.0, destination.0));
                prop_assert!(between(position.y, start.1, destination.1));
                snapshot.position = position;
            }
        }
    }
}
