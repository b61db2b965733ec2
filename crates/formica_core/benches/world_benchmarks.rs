use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formica_core::config::SimConfig;
use formica_core::economy::{Colony, Resource, ResourceInventory};
use formica_core::entity::{forager_factory, Entity};
use formica_core::world::World;
use formica_data::{Transform, Vec2};

fn colony_world(members: usize) -> World {
    let mut config = SimConfig::default();
    config.world.seed = Some(42);
    config.colony.auto_spawn_interval = 0;
    let mut world = World::new(config).unwrap();

    let food = Resource::new("food", "Food");
    let colony = Colony::new(ResourceInventory::new().with(&food, 1), forager_factory())
        .with_stockpile(ResourceInventory::new().with(&food, members as u32));
    let nest = world.insert(Entity::nest(
        "nest",
        Transform::at(Vec2::new(100.0, 100.0)),
        colony,
        2.0,
    ));
    for i in 0..200 {
        let angle = i as f64 * 0.1;
        let at = Vec2::new(100.0, 100.0) + Vec2::from_angle(angle) * (20.0 + (i % 5) as f64 * 10.0);
        world.insert(Entity::pile(
            format!("pile-{i}"),
            Transform::at(at),
            ResourceInventory::new().with(&food, 3),
        ));
    }
    world.apply_entity_buffers();
    world.spawn_members(nest, members).unwrap();
    world.apply_entity_buffers();
    world
}

fn bench_world_tick(c: &mut Criterion) {
    c.bench_function("world_tick_500_agents", |b| {
        b.iter_batched(
            || colony_world(500),
            |mut world| {
                for _ in 0..10 {
                    black_box(world.update().unwrap());
                }
                world
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_query_radius(c: &mut Criterion) {
    let world = colony_world(500);
    c.bench_function("world_query_radius_15", |b| {
        b.iter(|| black_box(world.query_radius(Vec2::new(100.0, 100.0), 15.0).len()))
    });
}

fn bench_circle_cast(c: &mut Criterion) {
    let world = colony_world(500);
    c.bench_function("world_circle_cast", |b| {
        b.iter(|| black_box(world.circle_cast(Vec2::new(120.0, 100.0), 0.5).unwrap().len()))
    });
}

criterion_group!(benches, bench_world_tick, bench_query_radius, bench_circle_cast);
criterion_main!(benches);
