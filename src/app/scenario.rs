//! Initial world layout built from a [`SimConfig`].

use anyhow::{Context, Result};
use formica_core::config::SimConfig;
use formica_core::economy::{Colony, Resource, ResourceInventory, ResourceRegistry};
use formica_core::entity::{forager_factory, Entity};
use formica_core::world::World;
use formica_data::{EntityId, Transform, Vec2};
use rand::Rng;
use std::collections::BTreeSet;
use std::f64::consts::TAU;

/// A freshly built world and the handles the runner needs.
pub struct Scenario {
    pub world: World,
    pub nest: EntityId,
    pub resources: ResourceRegistry,
    pub food: Resource,
}

/// Builds the default foraging scenario.
///
/// The nest sits at the world centre with the configured stockpile, piles are
/// scattered around a ring at `scenario.pile_distance`, random boundary cells
/// are blocked (never the nest's cell or a pile's cell) and the initial
/// members are spawned through the nest.
pub fn build(config: &SimConfig) -> Result<Scenario> {
    config.validate()?;
    let mut world = World::new(config.clone()).context("creating world")?;
    let mut resources = ResourceRegistry::new();
    let food = resources.register(&config.colony.resource_key, &config.colony.resource_name);

    let centre = Vec2::new(config.world.width / 2.0, config.world.height / 2.0);
    let mut colony = Colony::new(
        ResourceInventory::new().with(&food, config.colony.spawn_cost),
        forager_factory(),
    )
    .with_stockpile(ResourceInventory::new().with(&food, config.colony.initial_stockpile));
    colony.spawn_radius = config.colony.spawn_radius;
    colony.auto_spawn_interval = config.colony.auto_spawn_interval;
    let nest = world.insert(Entity::nest(
        "nest",
        Transform::at(centre),
        colony,
        config.colony.nest_radius,
    ));

    // Members spawn around the nest, so its neighbouring cells stay open too.
    let mut reserved = BTreeSet::new();
    if let Some((cx, cy)) = world.boundary().cell_of(centre) {
        for x in cx.saturating_sub(1)..=cx + 1 {
            for y in cy.saturating_sub(1)..=cy + 1 {
                reserved.insert((x, y));
            }
        }
    }

    for i in 0..config.scenario.piles {
        let jitter = world.rng().gen_range(-0.5..0.5);
        let angle = (i as f64 + jitter) * TAU / config.scenario.piles as f64;
        let dist = config.scenario.pile_distance * world.rng().gen_range(0.8..1.2);
        let at = clamp_inside(centre + Vec2::from_angle(angle) * dist, config);
        reserved.extend(world.boundary().cell_of(at));
        world.insert(Entity::pile(
            format!("pile-{}", i + 1),
            Transform::at(at),
            ResourceInventory::new().with(&food, config.scenario.pile_quantity),
        ));
    }

    let resolution = world.subdivisions();
    let mut placed = 0;
    let mut attempts = 0;
    while placed < config.scenario.obstacles && attempts < config.scenario.obstacles * 20 {
        attempts += 1;
        let cell = (
            world.rng().gen_range(0..resolution),
            world.rng().gen_range(0..resolution),
        );
        if reserved.insert(cell) {
            world.set_obstacle(cell.0, cell.1, true);
            placed += 1;
        }
    }

    world.apply_entity_buffers();
    let members = world.spawn_members(nest, config.colony.initial_members)?;
    world.apply_entity_buffers();

    tracing::info!(
        piles = config.scenario.piles,
        obstacles = placed,
        members = members.len(),
        "Scenario built"
    );
    Ok(Scenario {
        world,
        nest,
        resources,
        food,
    })
}

fn clamp_inside(p: Vec2, config: &SimConfig) -> Vec2 {
    let margin = 1.0;
    Vec2::new(
        p.x.clamp(margin, config.world.width - margin),
        p.y.clamp(margin, config.world.height - margin),
    )
}
