mod common;

use common::{inventory, nest_at, stockpile, WorldBuilder};
use formica_lib::model::entity::{BodyKind, Entity};
use formica_lib::model::state::State;
use formica_lib::model::steering::StraightLine;
use formica_lib::model::world::World;
use formica_lib::model::{EntityId, Transform, Vec2};

fn forager(world: &mut World, at: Vec2, nest: EntityId) -> EntityId {
    let config = world.config().clone();
    let mut ant = Entity::agent("ant", Transform::at(at), &config, Box::new(StraightLine));
    ant.set_home(nest);
    world.insert(ant)
}

#[test]
fn test_pickup_and_deposit_next_to_the_nest() {
    let mut world = WorldBuilder::new().build();
    let nest = world.insert(nest_at(Vec2::new(50.0, 50.0), 0, 10));
    let at = Transform::at(Vec2::new(52.5, 50.0));
    let pile = world.insert(Entity::pile("pile", at, inventory(5)));
    world.apply_entity_buffers();
    let ant = forager(&mut world, Vec2::new(51.0, 50.0), nest);
    world.apply_entity_buffers();

    world.update().unwrap();
    assert!(!world.contains(pile));
    assert_eq!(world.get(ant).unwrap().state(), Some(&State::Carry));

    world.update().unwrap();
    assert_eq!(stockpile(&world, nest), 5);
    let agent = world.get(ant).unwrap();
    assert_eq!(agent.state(), Some(&State::Search));
    assert!(agent.as_agent().unwrap().inventory.is_empty());
}

#[test]
fn test_round_trip_to_a_distant_pile() {
    let mut world = WorldBuilder::new().build();
    let nest = world.insert(nest_at(Vec2::new(50.0, 50.0), 0, 10));
    world.insert(Entity::pile("pile", Transform::at(Vec2::new(58.0, 50.0)), inventory(3)));
    world.apply_entity_buffers();
    let ant = forager(&mut world, Vec2::new(50.0, 50.0), nest);
    world.apply_entity_buffers();

    world.update().unwrap();
    assert!(matches!(
        world.get(ant).unwrap().state(),
        Some(State::Target { .. })
    ));

    let mut delivered_at = None;
    for _ in 0..60 {
        world.update().unwrap();
        if stockpile(&world, nest) == 3 {
            delivered_at = Some(world.tick());
            break;
        }
    }
    assert!(delivered_at.is_some(), "forager never delivered");
    assert_eq!(
        world.iter().filter(|(_, e)| e.kind() == BodyKind::Pile).count(),
        0
    );
}

#[test]
fn test_trail_markers_are_left_while_searching() {
    let mut world = WorldBuilder::new().build();
    let nest = world.insert(nest_at(Vec2::new(50.0, 50.0), 0, 10));
    world.apply_entity_buffers();
    forager(&mut world, Vec2::new(50.0, 50.0), nest);
    world.apply_entity_buffers();

    let delay = u64::from(world.config().agent.emit_delay);
    for _ in 0..delay * 3 {
        world.update().unwrap();
    }
    let markers: Vec<_> = world
        .iter()
        .filter_map(|(_, e)| e.as_pheromone())
        .collect();
    assert_eq!(markers.len(), 3);
}

#[test]
fn test_starving_forager_is_removed() {
    let mut world = WorldBuilder::new()
        .with_config(|c| c.agent.starvation_rate = 60.0)
        .build();
    let nest = world.insert(nest_at(Vec2::new(50.0, 50.0), 0, 10));
    world.apply_entity_buffers();
    let ant = forager(&mut world, Vec2::new(20.0, 20.0), nest);
    world.apply_entity_buffers();

    let mut removals = Vec::new();
    for _ in 0..5 {
        let events = world.update().unwrap();
        removals.extend(
            events
                .into_iter()
                .filter(|e| !e.is_added() && e.kind() == BodyKind::Agent),
        );
    }
    assert_eq!(removals.len(), 1);
    assert_eq!(removals[0].id(), ant);
    assert!(!world.contains(ant));
}
