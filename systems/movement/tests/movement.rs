use std::time::Duration;

use citadel_defence_core::{
    BorderSide, CellCoord, Command, Direction, Event, MatchConfig, StructureId, StructureKind,
    UnitArchetype, UnitId, UnitState, Vec2,
};
use citadel_defence_system_movement::Movement;
use citadel_defence_world::{self as world, query, World};

fn new_world() -> World {
    World::new(MatchConfig::default()).expect("default config is valid")
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn step(world: &mut World, movement: &mut Movement, millis: u64) -> Vec<Event> {
    let mut events = apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    );

    let units = query::unit_view(world);
    let structures = query::structure_view(world);
    let tuning = query::config(world).combat;
    let mut commands = Vec::new();
    movement.handle(
        &events,
        &units,
        &structures,
        query::occupancy_view(world),
        &tuning,
        &mut commands,
    );

    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn spawn(world: &mut World, archetype: UnitArchetype, side: BorderSide, at: Vec2) -> UnitId {
    apply(
        world,
        Command::SpawnUnit {
            archetype,
            side,
            position: at,
        },
    )
    .into_iter()
    .find_map(|event| match event {
        Event::UnitSpawned { unit, .. } => Some(unit),
        _ => None,
    })
    .expect("unit spawned")
}

fn seed_main_tower(world: &mut World, cell: CellCoord) -> StructureId {
    apply(
        world,
        Command::SeedStructure {
            cell,
            kind: StructureKind::MainTower,
        },
    )
    .into_iter()
    .find_map(|event| match event {
        Event::StructurePlaced { structure, .. } => Some(structure),
        _ => None,
    })
    .expect("structure seeded")
}

#[test]
fn unit_from_the_top_moves_purely_along_y_to_its_corner() {
    let mut world = new_world();
    let mut movement = Movement::new();
    let unit = spawn(
        &mut world,
        UnitArchetype::Fast,
        BorderSide::Top,
        Vec2::new(3.0, 10.0),
    );

    let mut previous_y = 10.0;
    for _ in 0..60 {
        let _ = step(&mut world, &mut movement, 50);
        let snapshot = *query::unit_view(&world).get(unit).expect("unit alive");
        assert_eq!(snapshot.position.x, 3.0);
        assert!(snapshot.position.y <= previous_y);
        assert!(snapshot.position.y >= 4.0);
        previous_y = snapshot.position.y;
    }

    let snapshot = *query::unit_view(&world).get(unit).expect("unit alive");
    assert!(snapshot.position.distance(Vec2::new(3.0, 4.0)) <= 0.05);
    assert_eq!(snapshot.facing, Direction::South);
    assert_eq!(snapshot.state, UnitState::Moving);
}

#[test]
fn side_spawns_resolve_x_first() {
    let mut world = new_world();
    let mut movement = Movement::new();
    let unit = spawn(
        &mut world,
        UnitArchetype::Fast,
        BorderSide::Left,
        Vec2::new(-2.0, 0.0),
    );

    let _ = step(&mut world, &mut movement, 250);
    let snapshot = *query::unit_view(&world).get(unit).expect("unit alive");

    assert_eq!(snapshot.position, Vec2::new(-1.0, 0.0));
    assert_eq!(snapshot.facing, Direction::East);
    assert_eq!(snapshot.destination, Vec2::new(3.0, 3.0));
}

#[test]
fn units_engage_then_strike_on_the_following_tick() {
    let mut world = new_world();
    let mut movement = Movement::new();
    let tower = seed_main_tower(&mut world, CellCoord::new(3, 4));
    let unit = spawn(
        &mut world,
        UnitArchetype::Fast,
        BorderSide::Top,
        Vec2::new(3.0, 6.0),
    );

    let mut log: Vec<Vec<Event>> = Vec::new();
    for _ in 0..40 {
        log.push(step(&mut world, &mut movement, 50));
    }

    let engaged_at = log
        .iter()
        .position(|events| events.contains(&Event::UnitEngaged { unit, structure: tower }))
        .expect("unit engages the tower");
    let first_strike = log
        .iter()
        .position(|events| {
            events.iter().any(|event| {
                matches!(event, Event::StructureDamaged { structure, amount: 5, .. } if *structure == tower)
            })
        })
        .expect("unit strikes the tower");

    assert_eq!(first_strike, engaged_at + 1);

    let strikes = log
        .iter()
        .flatten()
        .filter(|event| matches!(event, Event::StructureDamaged { .. }))
        .count();
    assert!(strikes <= 2, "strikes are one attack interval apart: {strikes}");
    let snapshot = *query::unit_view(&world).get(unit).expect("unit alive");
    assert_eq!(snapshot.state, UnitState::Attacking);
}

#[test]
fn units_disengage_when_their_target_disappears() {
    let mut world = new_world();
    let mut movement = Movement::new();
    let tower = seed_main_tower(&mut world, CellCoord::new(3, 4));
    let unit = spawn(
        &mut world,
        UnitArchetype::Fast,
        BorderSide::Top,
        Vec2::new(3.0, 4.5),
    );

    let _ = step(&mut world, &mut movement, 50);
    assert_eq!(
        query::unit_view(&world).get(unit).map(|snapshot| snapshot.state),
        Some(UnitState::Attacking)
    );

    let _ = apply(&mut world, Command::UnregisterStructure { structure: tower });
    let events = step(&mut world, &mut movement, 50);

    assert!(events.contains(&Event::UnitDisengaged { unit }));
    assert_eq!(
        query::unit_view(&world).get(unit).map(|snapshot| snapshot.state),
        Some(UnitState::Moving)
    );
}
