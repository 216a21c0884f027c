#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns turret targets into aiming and firing commands.

use citadel_defence_core::{
    delta_angle, heading_degrees, Command, Event, ShotgunProfile, StructureId, StructureView,
    TurretTarget, UnitId, UnitView, Vec2, WeaponProfile,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest angle in degrees between the turret and its target at which it may fire.
pub const FIRE_ALIGNMENT_DEGREES: f32 = 1.0;

/// Tower combat system that queues aiming and firing commands for ready turrets.
#[derive(Debug)]
pub struct TowerCombat {
    seed: u64,
    rng: ChaCha8Rng,
    spread: Vec<UnitId>,
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a combat system whose pellet draws follow `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            spread: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Emits `Command::AimTurret` for every target and firing commands for turrets that may shoot.
    ///
    /// A turret fires when its reload has finished, its aim is within
    /// [`FIRE_ALIGNMENT_DEGREES`] of the target and `is_shot_blocked` reports
    /// a clear line. Blocked turrets retry on a later tick.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        structures: &StructureView,
        units: &UnitView,
        targets: &[TurretTarget],
        is_shot_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(StructureId, Vec2, Vec2) -> bool,
    {
        if events
            .iter()
            .any(|event| matches!(event, Event::MatchRestarted))
        {
            self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        }

        if targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in targets {
            self.scratch.push(Command::AimTurret {
                structure: target.structure,
                angle: target.aim_angle,
            });

            let Some(snapshot) = structures.get(target.structure) else {
                continue;
            };
            let Some(weapon) = snapshot.kind.weapon() else {
                continue;
            };
            if !snapshot.ready_in.is_zero() {
                continue;
            }

            let heading = heading_degrees(target.unit_position - target.structure_position);
            if delta_angle(target.aim_angle, heading).abs() >= FIRE_ALIGNMENT_DEGREES {
                continue;
            }
            if is_shot_blocked(
                target.structure,
                target.structure_position,
                target.unit_position,
            ) {
                continue;
            }

            let command = match weapon {
                WeaponProfile::Cannon(_) => Command::FireProjectile {
                    structure: target.structure,
                    target: target.unit,
                },
                WeaponProfile::Shotgun(profile) => Command::FirePellets {
                    structure: target.structure,
                    targets: self.spread_pellets(target, &profile, units),
                },
            };
            self.scratch.push(command);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    /// Draws one unit per pellet, with replacement, from units near the primary target.
    ///
    /// Candidates share the firing axis with the primary target itself.
    fn spread_pellets(
        &mut self,
        target: &TurretTarget,
        profile: &ShotgunProfile,
        units: &UnitView,
    ) -> Vec<UnitId> {
        self.spread.clear();
        self.spread.extend(
            units
                .alive()
                .filter(|unit| {
                    let offset = unit.position - target.unit_position;
                    target.axis.holds(offset, profile.align_threshold)
                        && unit.position.distance(target.unit_position) <= profile.spread_radius
                })
                .map(|unit| unit.id),
        );
        if self.spread.is_empty() {
            self.spread.push(target.unit);
        }

        (0..profile.pellets)
            .map(|_| self.spread[self.rng.gen_range(0..self.spread.len())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_defence_core::{
        AlignmentAxis, AxisPriority, CellCoord, Direction, StructureKind, StructureSnapshot,
        UnitArchetype, UnitSnapshot, UnitState,
    };
    use std::time::Duration;

    fn structure(
        id: u32,
        kind: StructureKind,
        cell: (u32, u32),
        ready_in: Duration,
    ) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            kind,
            cell: CellCoord::new(cell.0, cell.1),
            owner: None,
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
            turret_angle: None,
            ready_in,
        }
    }

    fn unit(id: u32, position: (f32, f32)) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            archetype: UnitArchetype::Standard,
            position: Vec2::new(position.0, position.1),
            destination: Vec2::new(3.0, 4.0),
            axis_priority: AxisPriority::XFirst,
            facing: Direction::West,
            state: UnitState::Moving,
            target: None,
            hp: 100,
            speed: 0.5,
            attack_ready_in: Duration::ZERO,
        }
    }

    fn target(
        (structure, structure_at): (u32, (f32, f32)),
        (unit, unit_at): (u32, (f32, f32)),
        aim_angle: f32,
    ) -> TurretTarget {
        let structure_position = Vec2::new(structure_at.0, structure_at.1);
        let unit_position = Vec2::new(unit_at.0, unit_at.1);
        TurretTarget {
            structure: StructureId::new(structure),
            unit: UnitId::new(unit),
            structure_position,
            unit_position,
            axis: AlignmentAxis::of(unit_position - structure_position, 0.12)
                .unwrap_or(AlignmentAxis::Vertical),
            aim_angle,
        }
    }

    fn fire_commands(out: &[Command]) -> Vec<&Command> {
        out.iter()
            .filter(|command| !matches!(command, Command::AimTurret { .. }))
            .collect()
    }

    #[test]
    fn aligned_and_loaded_cannon_fires() {
        let mut system = TowerCombat::new(1);
        let structures = StructureView::from_snapshots(vec![structure(
            1,
            StructureKind::Cannon,
            (3, 3),
            Duration::ZERO,
        )]);
        let units = UnitView::from_snapshots(vec![unit(4, (3.0, 8.0))]);
        let targets = vec![target((1, (3.0, 3.0)), (4, (3.0, 8.0)), 90.0)];
        let mut out = Vec::new();

        system.handle(&[], &structures, &units, &targets, |_, _, _| false, &mut out);

        assert_eq!(
            out,
            vec![
                Command::AimTurret {
                    structure: StructureId::new(1),
                    angle: 90.0,
                },
                Command::FireProjectile {
                    structure: StructureId::new(1),
                    target: UnitId::new(4),
                },
            ]
        );
    }

    #[test]
    fn reloading_or_misaimed_turrets_hold_fire() {
        let mut system = TowerCombat::new(1);
        let structures = StructureView::from_snapshots(vec![
            structure(1, StructureKind::Cannon, (3, 3), Duration::from_millis(200)),
            structure(2, StructureKind::Cannon, (0, 0), Duration::ZERO),
        ]);
        let units = UnitView::from_snapshots(vec![unit(4, (3.0, 8.0)), unit(5, (0.0, 6.0))]);
        let targets = vec![
            target((1, (3.0, 3.0)), (4, (3.0, 8.0)), 90.0),
            target((2, (0.0, 0.0)), (5, (0.0, 6.0)), 45.0),
        ];
        let mut out = Vec::new();

        system.handle(&[], &structures, &units, &targets, |_, _, _| false, &mut out);

        assert_eq!(out.len(), 2);
        assert!(fire_commands(&out).is_empty());
    }

    #[test]
    fn blocked_shots_are_skipped() {
        let mut system = TowerCombat::new(1);
        let structures = StructureView::from_snapshots(vec![structure(
            1,
            StructureKind::Cannon,
            (3, 0),
            Duration::ZERO,
        )]);
        let units = UnitView::from_snapshots(vec![unit(4, (3.0, 7.0))]);
        let targets = vec![target((1, (3.0, 0.0)), (4, (3.0, 7.0)), 90.0)];
        let mut out = Vec::new();

        system.handle(&[], &structures, &units, &targets, |_, _, _| true, &mut out);

        assert!(fire_commands(&out).is_empty());
    }

    #[test]
    fn pellets_only_hit_units_on_the_line_near_the_target() {
        let mut system = TowerCombat::new(7);
        let structures = StructureView::from_snapshots(vec![structure(
            1,
            StructureKind::Shotgun,
            (5, 2),
            Duration::ZERO,
        )]);
        let units = UnitView::from_snapshots(vec![
            unit(1, (2.0, 2.0)),
            unit(2, (1.0, 2.05)),
            unit(3, (2.0, 3.0)),
            unit(4, (-3.0, 2.0)),
        ]);
        let targets = vec![target((1, (5.0, 2.0)), (1, (2.0, 2.0)), 180.0)];
        let mut out = Vec::new();

        system.handle(&[], &structures, &units, &targets, |_, _, _| false, &mut out);

        let Some(Command::FirePellets { targets, .. }) = out.last() else {
            panic!("shotgun should fire: {out:?}");
        };
        assert_eq!(targets.len(), 6);
        assert!(targets
            .iter()
            .all(|unit| *unit == UnitId::new(1) || *unit == UnitId::new(2)));
    }

    #[test]
    fn pellet_candidates_line_up_with_the_target_not_the_turret() {
        let mut system = TowerCombat::new(7);
        let structures = StructureView::from_snapshots(vec![structure(
            1,
            StructureKind::Shotgun,
            (5, 2),
            Duration::ZERO,
        )]);
        let units = UnitView::from_snapshots(vec![
            unit(1, (2.0, 2.1)),
            unit(2, (1.5, 2.2)),
            unit(3, (2.5, 1.95)),
        ]);
        let aim = heading_degrees(Vec2::new(-3.0, 0.1));
        let targets = vec![target((1, (5.0, 2.0)), (1, (2.0, 2.1)), aim)];
        let mut out = Vec::new();

        system.handle(&[], &structures, &units, &targets, |_, _, _| false, &mut out);

        assert_eq!(system.spread, vec![UnitId::new(1), UnitId::new(2)]);
        let Some(Command::FirePellets { targets, .. }) = out.last() else {
            panic!("shotgun should fire: {out:?}");
        };
        assert!(targets.iter().all(|unit| *unit != UnitId::new(3)));
    }

    #[test]
    fn pellet_draws_replay_after_restart() {
        let structures = StructureView::from_snapshots(vec![structure(
            1,
            StructureKind::Shotgun,
            (5, 2),
            Duration::ZERO,
        )]);
        let units = UnitView::from_snapshots(vec![unit(1, (2.0, 2.0)), unit(2, (1.0, 2.0))]);
        let targets = vec![target((1, (5.0, 2.0)), (1, (2.0, 2.0)), 180.0)];
        let mut system = TowerCombat::new(11);

        let mut first = Vec::new();
        system.handle(&[], &structures, &units, &targets, |_, _, _| false, &mut first);
        let mut second = Vec::new();
        system.handle(
            &[Event::MatchRestarted],
            &structures,
            &units,
            &targets,
            |_, _, _| false,
            &mut second,
        );

        assert_eq!(first, second);
    }
}
