//! Entities: the things that exist in a [`World`].
//!
//! Every entity shares a name, a transform, an optional collider and its
//! region slot. What it *is* lives in [`Body`], a closed set of kinds, and
//! what it *does* lives in an optional [`StateMachine`].

use crate::collider::Collider;
use crate::config::SimConfig;
use crate::decay::DecayTimer;
use crate::economy::{Colony, ResourceDeposit, ResourceInventory, SpawnFactory};
use crate::error::{Result, SimError};
use crate::state::{State, StateMachine};
use crate::steering::{SteeringPolicy, Wander};
use crate::world::World;
use formica_data::{EntityId, Transform, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Radius of the stand-in circle used to move entities without a collider.
const POINT_RADIUS: f64 = 1e-3;

/// Bucket placement assigned by the world at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSlot {
    pub cell: usize,
    pub slot: usize,
}

/// Discriminant of [`Body`], carried by lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    Living,
    Agent,
    Nest,
    Pile,
    Pheromone,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Static => "static",
            Self::Living => "living",
            Self::Agent => "agent",
            Self::Nest => "nest",
            Self::Pile => "pile",
            Self::Pheromone => "pheromone",
        };
        f.write_str(name)
    }
}

/// Semantic role of a scent marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scent {
    /// Laid by foragers leaving the nest; followed back home.
    Home,
    /// Laid by carriers returning with food; followed to the source.
    Food,
}

/// Health and locomotion shared by every moving body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Living {
    health: f64,
    max_health: f64,
    speed: f64,
    max_speed: f64,
}

impl Living {
    /// Full health, moving at top speed.
    #[must_use]
    pub fn new(max_health: f64, max_speed: f64) -> Self {
        let max_health = max_health.max(0.0);
        let max_speed = max_speed.max(0.0);
        Self {
            health: max_health,
            max_health,
            speed: max_speed,
            max_speed,
        }
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.set_speed(speed);
        self
    }

    #[must_use]
    pub fn health(&self) -> f64 {
        self.health
    }

    #[must_use]
    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    pub fn set_health(&mut self, health: f64) {
        self.health = health.clamp(0.0, self.max_health);
    }

    pub fn damage(&mut self, amount: f64) {
        self.set_health(self.health - amount);
    }

    pub fn heal_full(&mut self) {
        self.health = self.max_health;
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(0.0, self.max_speed);
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Behavior thresholds copied from configuration when an agent is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTraits {
    pub perception_radius: f64,
    pub pickup_range: f64,
    pub target_threshold: f64,
    pub emit_delay: u32,
    pub starvation_rate: f64,
}

impl AgentTraits {
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            perception_radius: config.perception_radius(),
            pickup_range: config.agent.pickup_range,
            target_threshold: config.agent.target_threshold,
            emit_delay: config.agent.emit_delay,
            starvation_rate: config.agent.starvation_rate,
        }
    }
}

/// A forager: living body, carried goods and a link to its nest.
#[derive(Debug)]
pub struct Agent {
    pub living: Living,
    pub inventory: ResourceInventory,
    /// Weak reference; the nest may disappear before its members.
    pub home: Option<EntityId>,
    pub steering: Box<dyn SteeringPolicy>,
    pub ticks_since_emit: u32,
    pub traits: AgentTraits,
}

impl Agent {
    #[must_use]
    pub fn new(living: Living, traits: AgentTraits, steering: Box<dyn SteeringPolicy>) -> Self {
        Self {
            living,
            inventory: ResourceInventory::new(),
            home: None,
            steering,
            ticks_since_emit: 0,
            traits,
        }
    }

    /// Counts one tick towards the next scent marker; `true` when one is due.
    pub fn emission_due(&mut self) -> bool {
        self.ticks_since_emit = self.ticks_since_emit.saturating_add(1);
        if self.ticks_since_emit >= self.traits.emit_delay {
            self.ticks_since_emit = 0;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePile {
    pub deposit: ResourceDeposit,
    /// Set by the agent that harvested the pile, pending its removal.
    pub claimed_by: Option<EntityId>,
}

impl ResourcePile {
    #[must_use]
    pub fn new(deposit: ResourceDeposit) -> Self {
        Self {
            deposit,
            claimed_by: None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.claimed_by.is_none() && !self.deposit.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pheromone {
    pub kind: Scent,
    pub timer: DecayTimer,
}

#[derive(Debug)]
pub enum Body {
    /// Inert obstacle.
    Static,
    Living(Living),
    Agent(Agent),
    Nest(Colony),
    Pile(ResourcePile),
    Pheromone(Pheromone),
}

impl Body {
    #[must_use]
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Static => BodyKind::Static,
            Self::Living(_) => BodyKind::Living,
            Self::Agent(_) => BodyKind::Agent,
            Self::Nest(_) => BodyKind::Nest,
            Self::Pile(_) => BodyKind::Pile,
            Self::Pheromone(_) => BodyKind::Pheromone,
        }
    }
}

#[derive(Debug)]
pub struct Entity {
    /// Display name; not unique.
    pub name: String,
    pub transform: Transform,
    pub collider: Option<Collider>,
    pub(crate) region: Option<RegionSlot>,
    pub body: Body,
    pub brain: Option<StateMachine>,
}

impl Entity {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Transform, body: Body) -> Self {
        Self {
            name: name.into(),
            transform,
            collider: None,
            region: None,
            body,
            brain: None,
        }
    }

    #[must_use]
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Attaches a state machine starting in `state`.
    ///
    /// # Errors
    /// [`SimError::StateTypeMismatch`] when the body cannot run `state`.
    pub fn with_state(mut self, state: State) -> Result<Self> {
        state.validate(&self)?;
        self.brain = Some(StateMachine::new(state));
        Ok(self)
    }

    /// Rectangular obstacle; the transform's scale gives its half extents.
    #[must_use]
    pub fn obstacle(name: impl Into<String>, transform: Transform) -> Self {
        Self::new(name, transform, Body::Static).with_collider(Collider::rectangle(Vec2::ONE))
    }

    /// Generic living creature that only tracks its own death.
    #[must_use]
    pub fn creature(name: impl Into<String>, transform: Transform, living: Living) -> Self {
        let mut entity = Self::new(name, transform, Body::Living(living));
        entity.brain = Some(StateMachine::new(State::Living));
        entity
    }

    /// Forager starting in the search state.
    #[must_use]
    pub fn agent(
        name: impl Into<String>,
        transform: Transform,
        config: &SimConfig,
        steering: Box<dyn SteeringPolicy>,
    ) -> Self {
        let living = Living::new(config.agent.max_health, config.agent.max_speed)
            .with_speed(config.agent.speed);
        let agent = Agent::new(living, AgentTraits::from_config(config), steering);
        let mut entity = Self::new(name, transform, Body::Agent(agent))
            .with_collider(Collider::circle(config.agent.collider_radius));
        entity.brain = Some(StateMachine::new(State::Search));
        entity
    }

    #[must_use]
    pub fn nest(
        name: impl Into<String>,
        transform: Transform,
        colony: Colony,
        radius: f64,
    ) -> Self {
        Self::new(name, transform, Body::Nest(colony)).with_collider(Collider::circle(radius))
    }

    #[must_use]
    pub fn pile(name: impl Into<String>, transform: Transform, deposit: ResourceDeposit) -> Self {
        Self::new(name, transform, Body::Pile(ResourcePile::new(deposit)))
            .with_collider(Collider::circle(0.5))
    }

    #[must_use]
    pub fn pheromone(transform: Transform, kind: Scent, timer: DecayTimer) -> Self {
        let name = match kind {
            Scent::Home => "home-scent",
            Scent::Food => "food-scent",
        };
        Self::new(name, transform, Body::Pheromone(Pheromone { kind, timer }))
    }

    #[must_use]
    pub fn kind(&self) -> BodyKind {
        self.body.kind()
    }

    /// Region slot assigned at registration; `None` while staged.
    #[must_use]
    pub fn region(&self) -> Option<RegionSlot> {
        self.region
    }

    #[must_use]
    pub fn state(&self) -> Option<&State> {
        self.brain.as_ref().map(StateMachine::current)
    }

    #[must_use]
    pub fn as_living(&self) -> Option<&Living> {
        match &self.body {
            Body::Living(l) => Some(l),
            Body::Agent(a) => Some(&a.living),
            _ => None,
        }
    }

    pub fn as_living_mut(&mut self) -> Option<&mut Living> {
        match &mut self.body {
            Body::Living(l) => Some(l),
            Body::Agent(a) => Some(&mut a.living),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_agent(&self) -> Option<&Agent> {
        match &self.body {
            Body::Agent(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut Agent> {
        match &mut self.body {
            Body::Agent(a) => Some(a),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_colony(&self) -> Option<&Colony> {
        match &self.body {
            Body::Nest(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_colony_mut(&mut self) -> Option<&mut Colony> {
        match &mut self.body {
            Body::Nest(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pile(&self) -> Option<&ResourcePile> {
        match &self.body {
            Body::Pile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_pile_mut(&mut self) -> Option<&mut ResourcePile> {
        match &mut self.body {
            Body::Pile(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pheromone(&self) -> Option<&Pheromone> {
        match &self.body {
            Body::Pheromone(p) => Some(p),
            _ => None,
        }
    }

    /// Links a colony member back to its nest. No effect on other bodies.
    pub fn set_home(&mut self, nest: EntityId) {
        if let Body::Agent(agent) = &mut self.body {
            agent.home = Some(nest);
        }
    }

    /// Whether the entity has a living body whose health ran out.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.as_living().is_some_and(Living::is_dead)
    }

    /// Runs one tick of this entity's behavior.
    ///
    /// `id` is the entity's own handle; the entity itself is checked out of
    /// `world` for the duration of the call.
    pub fn update(&mut self, id: EntityId, world: &mut World) -> Result<()> {
        let transform = self.transform;
        match &mut self.body {
            Body::Pheromone(p) => {
                if p.timer.poll(world.tick()) {
                    world.remove_entity(id);
                }
            }
            Body::Nest(colony) => colony.tick(id, &transform, world),
            Body::Agent(agent) => {
                let rate = agent.traits.starvation_rate;
                agent.living.damage(rate);
            }
            Body::Static | Body::Living(_) | Body::Pile(_) => {}
        }

        if let Some(mut brain) = self.brain.take() {
            let outcome = brain.update(self, id, world);
            self.brain = Some(brain);
            outcome?;
        }
        Ok(())
    }

    /// Whether the entity's shape, or a point when it has none, hits the boundary.
    pub fn blocked_by_boundary(&self, world: &World) -> Result<bool> {
        match &self.collider {
            Some(collider) => world.collides_with_boundary(collider, &self.transform),
            None => world.collides_with_boundary(&Collider::circle(POINT_RADIUS), &self.transform),
        }
    }

    /// Moves along `direction`, given in the entity's local frame.
    ///
    /// The entity turns to face the new heading and steps `speed` units. If
    /// the new position collides with the world boundary the step is undone,
    /// but the new heading is kept.
    ///
    /// # Returns
    /// `true` if the entity changed position
    pub fn move_living(&mut self, direction: Vec2, world: &World) -> Result<bool> {
        let Some(speed) = self.as_living().map(Living::speed) else {
            return Err(SimError::mismatch("Move", "a living", self.name.clone()));
        };
        let heading = self.transform.local_to_world_direction(direction);
        if heading.length_squared() == 0.0 || !heading.is_finite() {
            return Ok(false);
        }
        self.transform.set_rotation(heading.angle());

        let previous = self.transform.position;
        self.transform.position += heading.normalized() * speed;
        if self.blocked_by_boundary(world)? {
            self.transform.position = previous;
            return Ok(false);
        }
        Ok(previous != self.transform.position)
    }

    /// Moves straight towards a world-space point.
    pub fn move_towards(&mut self, target: Vec2, world: &World) -> Result<bool> {
        let world_dir = target - self.transform.position;
        let local = world_dir.rotated(-self.transform.rotation());
        self.move_living(local, world)
    }

    pub fn log(&self, id: EntityId) {
        let p = self.transform.position;
        tracing::debug!(
            id = %id,
            name = %self.name,
            kind = %self.kind(),
            x = p.x,
            y = p.y,
            rotation = self.transform.rotation(),
            health = self.as_living().map(Living::health),
            state = self.state().map(State::name),
            "Entity"
        );
    }
}

/// Factory building Wander-steered foragers from the world's configuration.
#[must_use]
pub fn forager_factory() -> SpawnFactory {
    Box::new(|name, transform, world, _nest| {
        let config = world.config();
        Entity::agent(
            name,
            transform,
            config,
            Box::new(Wander::from_config(&config.steering)),
        )
    })
}
