#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects aligned targets and rotates turrets toward them.

use std::time::Duration;

use citadel_defence_core::{
    move_towards_angle, AlignmentAxis, Direction, Event, StructureId, StructureSnapshot,
    StructureView, TurretTarget, UnitId, UnitView, Vec2, WeaponProfile,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    unit_workspace: Vec<UnitCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes turret targets for the provided world snapshot.
    ///
    /// Rotation is bounded by the time advanced in `events`; when no time
    /// advanced the output stays empty. The output buffer is cleared before
    /// populating it with the latest assignments.
    pub fn handle(
        &mut self,
        events: &[Event],
        structures: &StructureView,
        units: &UnitView,
        out: &mut Vec<TurretTarget>,
    ) {
        out.clear();

        let Some(dt) = elapsed(events) else {
            return;
        };

        self.prepare_unit_workspace(units);
        if self.unit_workspace.is_empty() {
            return;
        }

        for structure in structures.iter() {
            let Some(weapon) = structure.kind.weapon() else {
                continue;
            };
            if let Some(target) = self.acquire(structure, weapon, dt) {
                out.push(target);
            }
        }
    }

    fn acquire(
        &self,
        structure: &StructureSnapshot,
        weapon: WeaponProfile,
        dt: Duration,
    ) -> Option<TurretTarget> {
        let origin = structure.position();
        let tolerance = weapon.alignment_tolerance();
        let range = weapon.scan_range();

        let mut best: Option<BestCandidate> = None;
        for candidate in &self.unit_workspace {
            let delta = candidate.position - origin;
            let Some(axis) = AlignmentAxis::of(delta, tolerance) else {
                continue;
            };
            let distance = delta.length();
            if distance > range {
                continue;
            }

            let current = BestCandidate {
                distance,
                unit: candidate.id,
                position: candidate.position,
                axis,
            };
            match &mut best {
                Some(existing) => {
                    if current.distance < existing.distance {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        let best = best?;
        let delta = best.position - origin;
        let facing = match weapon {
            WeaponProfile::Cannon(_) => Direction::dominant(delta),
            WeaponProfile::Shotgun(_) => best.axis.facing(delta),
        };
        let desired = facing.angle_degrees();
        let aim_angle = match structure.turret_angle {
            None => desired,
            Some(current) => {
                let max_delta = weapon.rotation_speed() * dt.as_secs_f32();
                move_towards_angle(current, desired, max_delta)
            }
        };

        Some(TurretTarget {
            structure: structure.id,
            unit: best.unit,
            structure_position: origin,
            unit_position: best.position,
            axis: best.axis,
            aim_angle,
        })
    }

    fn prepare_unit_workspace(&mut self, units: &UnitView) {
        self.unit_workspace.clear();
        self.unit_workspace
            .extend(units.alive().map(|snapshot| UnitCandidate {
                id: snapshot.id,
                position: snapshot.position,
            }));
    }
}

/// Total time advanced by the events, `None` when the world did not tick.
fn elapsed(events: &[Event]) -> Option<Duration> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .reduce(|total, dt| total.saturating_add(dt))
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct UnitCandidate {
    id: UnitId,
    position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    unit: UnitId,
    position: Vec2,
    axis: AlignmentAxis,
}

/// Looks up the target assigned to a turret.
#[must_use]
pub fn target_of(targets: &[TurretTarget], structure: StructureId) -> Option<&TurretTarget> {
    targets.iter().find(|target| target.structure == structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_defence_core::{
        AxisPriority, CellCoord, StructureKind, UnitArchetype, UnitSnapshot, UnitState,
    };

    fn tick(millis: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }]
    }

    fn structure(
        id: u32,
        kind: StructureKind,
        cell: (u32, u32),
        angle: Option<f32>,
    ) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            kind,
            cell: CellCoord::new(cell.0, cell.1),
            owner: None,
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
            turret_angle: angle,
            ready_in: Duration::ZERO,
        }
    }

    fn unit(id: u32, position: (f32, f32)) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            archetype: UnitArchetype::Standard,
            position: Vec2::new(position.0, position.1),
            destination: Vec2::new(3.0, 4.0),
            axis_priority: AxisPriority::YFirst,
            facing: Direction::South,
            state: UnitState::Moving,
            target: None,
            hp: 100,
            speed: 0.5,
            attack_ready_in: Duration::ZERO,
        }
    }

    fn run(structures: Vec<StructureSnapshot>, units: Vec<UnitSnapshot>) -> Vec<TurretTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &tick(100),
            &StructureView::from_snapshots(structures),
            &UnitView::from_snapshots(units),
            &mut out,
        );
        out
    }

    #[test]
    fn aligned_unit_is_acquired_and_turret_snaps() {
        let out = run(
            vec![structure(1, StructureKind::Cannon, (3, 3), None)],
            vec![unit(7, (3.0, 10.0))],
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].unit, UnitId::new(7));
        assert_eq!(out[0].axis, AlignmentAxis::Vertical);
        assert_eq!(out[0].aim_angle, 90.0);
    }

    #[test]
    fn misaligned_units_are_never_selected() {
        let out = run(
            vec![structure(1, StructureKind::Cannon, (3, 3), None)],
            vec![unit(1, (4.5, 6.0)), unit(2, (3.2, 5.0))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn nearest_wins_and_ties_keep_the_lowest_id() {
        let out = run(
            vec![structure(1, StructureKind::Cannon, (3, 3), None)],
            vec![unit(4, (3.0, 7.0)), unit(5, (7.0, 3.0)), unit(6, (3.0, 5.0))],
        );
        assert_eq!(out[0].unit, UnitId::new(6));

        let out = run(
            vec![structure(1, StructureKind::Cannon, (3, 3), None)],
            vec![unit(9, (3.0, 6.0)), unit(2, (0.0, 3.0))],
        );
        assert_eq!(out[0].unit, UnitId::new(2));
    }

    #[test]
    fn scan_range_limits_acquisition() {
        let out = run(
            vec![structure(1, StructureKind::Shotgun, (0, 0), None)],
            vec![unit(1, (0.0, 6.5))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn rotation_is_bounded_by_turn_rate() {
        // heavy cannon turns 90 degrees per second; 100ms allows 9 degrees.
        let out = run(
            vec![structure(1, StructureKind::HeavyCannon, (3, 3), Some(0.0))],
            vec![unit(1, (3.0, 8.0))],
        );
        assert!((out[0].aim_angle - 9.0).abs() < 1e-4);

        let out = run(
            vec![structure(1, StructureKind::HeavyCannon, (3, 3), Some(350.0))],
            vec![unit(1, (8.0, 3.0))],
        );
        assert!((out[0].aim_angle - 359.0).abs() < 1e-4);
    }

    #[test]
    fn shotgun_faces_along_the_shared_axis() {
        let out = run(
            vec![structure(1, StructureKind::Shotgun, (2, 2), None)],
            vec![unit(1, (-1.0, 2.1))],
        );
        assert_eq!(out[0].axis, AlignmentAxis::Horizontal);
        assert_eq!(out[0].aim_angle, 180.0);
    }

    #[test]
    fn main_towers_and_idle_ticks_produce_nothing() {
        let out = run(
            vec![structure(1, StructureKind::MainTower, (3, 3), None)],
            vec![unit(1, (3.0, 5.0))],
        );
        assert!(out.is_empty());

        let mut system = TowerTargeting::new();
        let mut out = vec![TurretTarget {
            structure: StructureId::new(9),
            unit: UnitId::new(9),
            structure_position: Vec2::ZERO,
            unit_position: Vec2::ZERO,
            axis: AlignmentAxis::Vertical,
            aim_angle: 0.0,
        }];
        system.handle(
            &[],
            &StructureView::from_snapshots(vec![structure(
                1,
                StructureKind::Cannon,
                (3, 3),
                None,
            )]),
            &UnitView::from_snapshots(vec![unit(1, (3.0, 5.0))]),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn dead_units_are_ignored() {
        let mut dead = unit(1, (3.0, 4.0));
        dead.state = UnitState::Dead;
        let out = run(
            vec![structure(1, StructureKind::Cannon, (3, 3), None)],
            vec![dead, unit(2, (3.0, 6.0))],
        );
        assert_eq!(
            target_of(&out, StructureId::new(1)).map(|target| target.unit),
            Some(UnitId::new(2))
        );
    }
}
