use formica_lib::model::config::SimConfig;
use formica_lib::model::economy::{Colony, Resource, ResourceInventory};
use formica_lib::model::entity::{forager_factory, Entity};
use formica_lib::model::world::World;
use formica_lib::model::{EntityId, Transform, Vec2};

#[allow(dead_code)]
pub struct WorldBuilder {
    config: SimConfig,
    entities: Vec<Entity>,
    obstacles: Vec<(usize, usize)>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.world.width = 100.0;
        config.world.height = 100.0;
        config.world.subdivisions = 10;
        Self {
            config,
            entities: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_obstacle(mut self, x: usize, y: usize) -> Self {
        self.obstacles.push((x, y));
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Builds the world and applies the pending additions.
    pub fn build(self) -> World {
        let mut world = World::new(self.config).expect("valid test config");
        for entity in self.entities {
            world.insert(entity);
        }
        for (x, y) in self.obstacles {
            world.set_obstacle(x, y, true);
        }
        world.apply_entity_buffers();
        world
    }
}

#[allow(dead_code)]
pub fn food() -> Resource {
    Resource::new("food", "Food")
}

#[allow(dead_code)]
pub fn inventory(amount: u32) -> ResourceInventory {
    ResourceInventory::new().with(&food(), amount)
}

/// A nest builder paying `cost` food per member from `stock`.
#[allow(dead_code)]
pub fn nest_at(position: Vec2, stock: u32, cost: u32) -> Entity {
    let colony = Colony::new(inventory(cost), forager_factory()).with_stockpile(inventory(stock));
    Entity::nest("nest", Transform::at(position), colony, 2.0)
}

#[allow(dead_code)]
pub fn stockpile(world: &World, nest: EntityId) -> u32 {
    world
        .get(nest)
        .and_then(Entity::as_colony)
        .map_or(0, |c| c.stockpile.quantity(&food()))
}
