use std::time::Duration;

use citadel_defence_core::{
    BorderSide, CellCoord, Command, Event, MatchConfig, StructureKind, TurretTarget,
    UnitArchetype, UnitId, Vec2,
};
use citadel_defence_system_tower_targeting::{target_of, TowerTargeting};
use citadel_defence_world::{self as world, query, World};

fn spawn(world: &mut World, position: Vec2) -> UnitId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnUnit {
            archetype: UnitArchetype::Tank,
            side: BorderSide::Top,
            position,
        },
        &mut events,
    );
    events
        .into_iter()
        .find_map(|event| match event {
            Event::UnitSpawned { unit, .. } => Some(unit),
            _ => None,
        })
        .expect("unit spawned")
}

fn scan(world: &mut World, targeting: &mut TowerTargeting) -> Vec<TurretTarget> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(50),
        },
        &mut events,
    );
    let mut targets = Vec::new();
    targeting.handle(
        &events,
        &query::structure_view(world),
        &query::unit_view(world),
        &mut targets,
    );
    for target in &targets {
        world::apply(
            world,
            Command::AimTurret {
                structure: target.structure,
                angle: target.aim_angle,
            },
            &mut events,
        );
    }
    targets
}

#[test]
fn turret_snaps_then_turns_toward_a_closer_aligned_unit() {
    let mut world = World::new(MatchConfig::default()).expect("default config is valid");
    let mut targeting = TowerTargeting::new();
    let mut events = Vec::new();
    let cannon = world
        .place_structure(CellCoord::new(3, 3), StructureKind::Cannon, None, &mut events)
        .expect("cannon placed");

    let far = spawn(&mut world, Vec2::new(3.0, 10.0));
    let _ = spawn(&mut world, Vec2::new(6.0, 6.0));

    let first = scan(&mut world, &mut targeting);
    let target = target_of(&first, cannon).expect("aligned unit acquired");
    assert_eq!(target.unit, far);
    assert_eq!(target.aim_angle, 90.0);

    let near = spawn(&mut world, Vec2::new(5.0, 3.0));
    let second = scan(&mut world, &mut targeting);
    let target = target_of(&second, cannon).expect("closer unit acquired");
    assert_eq!(target.unit, near);
    assert!((target.aim_angle - 81.0).abs() < 1e-3);
    assert_eq!(
        query::structure_view(&world)
            .get(cannon)
            .and_then(|snapshot| snapshot.turret_angle)
            .map(|angle| (angle - 81.0).abs() < 1e-3),
        Some(true)
    );
}
