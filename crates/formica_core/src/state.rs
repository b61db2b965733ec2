//! Behavior states and the machine that runs them.
//!
//! States form a small directed graph:
//!
//! ```text
//! Idle ──► Dead        Living ──► Dead
//! Search ──► Target{resume: Search} ──► Search ──► Carry
//! Carry  ──► Target{resume: Carry}  ──► Carry  ──► Search
//! (any living state) ──► Dead   (health ≤ 0, terminal)
//! ```
//!
//! Each variant is a plain value; [`State::Target`] carries the state it
//! returns to and the entity it pursues.

use crate::decay::DecayTimer;
use crate::entity::{BodyKind, Entity, Scent};
use crate::error::{Result, SimError};
use crate::perception;
use crate::world::World;
use formica_data::{EntityId, Transform};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Does nothing besides dying when a living body runs out of health.
    Idle,
    /// Generic living behavior: only the health check.
    Living,
    /// Wander on the food-scent map looking for a pile.
    Search,
    /// Wander on the home-scent map carrying goods back to the nest.
    Carry,
    /// Walk straight to `target`, then return to `resume`.
    Target { resume: Box<State>, target: EntityId },
    /// Terminal; entering it removes the entity from the world.
    Dead,
}

impl State {
    #[must_use]
    pub fn target(resume: State, target: EntityId) -> Self {
        Self::Target {
            resume: Box::new(resume),
            target,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Living => "Living",
            Self::Search => "Search",
            Self::Carry => "Carry",
            Self::Target { .. } => "Target",
            Self::Dead => "Dead",
        }
    }

    /// State reached when this one completes its goal; `None` for Dead.
    #[must_use]
    pub fn next(&self) -> Option<State> {
        match self {
            Self::Idle | Self::Living => Some(Self::Dead),
            Self::Search => Some(Self::Carry),
            Self::Carry => Some(Self::Search),
            Self::Target { resume, .. } => Some((**resume).clone()),
            Self::Dead => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Checks that `entity` has the body this state operates on.
    pub fn validate(&self, entity: &Entity) -> Result<()> {
        let (ok, expected) = match self {
            Self::Idle => (true, ""),
            Self::Living | Self::Dead => (entity.as_living().is_some(), "a living"),
            Self::Search | Self::Carry | Self::Target { .. } => {
                (entity.as_agent().is_some(), "an agent")
            }
        };
        if ok {
            Ok(())
        } else {
            Err(SimError::mismatch(self.name(), expected, entity.name.clone()))
        }
    }

    /// Entry hook. Validates the body, then runs entry side effects.
    pub fn start(&self, entity: &mut Entity, id: EntityId, world: &mut World) -> Result<()> {
        self.validate(entity)?;
        if let Self::Dead = self {
            tracing::debug!(id = %id, name = %entity.name, tick = world.tick(), "Entity died");
            world.remove_entity(id);
        }
        Ok(())
    }

    /// Runs one tick and returns the state to switch to, if any.
    pub fn update(
        &self,
        entity: &mut Entity,
        id: EntityId,
        world: &mut World,
    ) -> Result<Option<State>> {
        if !self.is_terminal() && entity.is_dead() {
            return Ok(Some(Self::Dead));
        }
        match self {
            Self::Idle | Self::Living | Self::Dead => Ok(None),
            Self::Search => search(entity, id, world),
            Self::Carry => carry(entity, world),
            Self::Target { resume, target } => pursue(entity, resume, *target, world),
        }
    }

    /// Exit hook.
    pub fn end(&self, entity: &mut Entity, _id: EntityId, _world: &mut World) {
        if let (Self::Target { .. }, Some(agent)) = (self, entity.as_agent_mut()) {
            agent.ticks_since_emit = 0;
        }
    }
}

/// Runs a [`State`] on behalf of one entity.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: State,
    started: bool,
}

impl StateMachine {
    /// The initial state is entered on the first update.
    #[must_use]
    pub fn new(initial: State) -> Self {
        Self {
            current: initial,
            started: false,
        }
    }

    #[must_use]
    pub fn current(&self) -> &State {
        &self.current
    }

    pub fn update(&mut self, entity: &mut Entity, id: EntityId, world: &mut World) -> Result<()> {
        if !self.started {
            self.started = true;
            self.current.start(entity, id, world)?;
        }
        if self.current.is_terminal() {
            return Ok(());
        }
        if let Some(next) = self.current.update(entity, id, world)? {
            self.transition(next, entity, id, world)?;
        }
        Ok(())
    }

    /// Leaves the current state and enters `next`.
    ///
    /// `next` is validated before the current state's exit hook runs, so a
    /// rejected transition leaves the machine unchanged.
    pub fn transition(
        &mut self,
        next: State,
        entity: &mut Entity,
        id: EntityId,
        world: &mut World,
    ) -> Result<()> {
        next.validate(entity)?;
        self.current.end(entity, id, world);
        tracing::trace!(id = %id, from = self.current.name(), to = next.name(), "State transition");
        self.current = next;
        self.started = true;
        self.current.start(entity, id, world)
    }
}

fn search(entity: &mut Entity, id: EntityId, world: &mut World) -> Result<Option<State>> {
    let Some(traits) = entity.as_agent().map(|a| a.traits) else {
        return Err(SimError::mismatch("Search", "an agent", entity.name.clone()));
    };
    emit_scent(entity, world, Scent::Home);
    let position = entity.transform.position;
    let nearest = world.nearest_where(position, traits.perception_radius, |e| {
        e.as_pile().is_some_and(|p| p.is_available())
    });

    if let Some((pile_id, dist)) = nearest {
        if dist > traits.pickup_range {
            return Ok(Some(State::target(State::Search, pile_id)));
        }
        let (Some(agent), Some(pile)) = (
            entity.as_agent_mut(),
            world.get_mut(pile_id).and_then(Entity::as_pile_mut),
        ) else {
            return Ok(None);
        };
        pile.claimed_by = Some(id);
        let moved = pile.deposit.drain_into(&mut agent.inventory);
        world.remove_entity(pile_id);
        tracing::trace!(id = %id, pile = %pile_id, moved, "Picked up resources");
        return Ok(State::Search.next());
    }

    wander(entity, world, Scent::Food)?;
    Ok(None)
}

fn carry(entity: &mut Entity, world: &mut World) -> Result<Option<State>> {
    let Some((traits, home)) = entity.as_agent().map(|a| (a.traits, a.home)) else {
        return Err(SimError::mismatch("Carry", "an agent", entity.name.clone()));
    };
    emit_scent(entity, world, Scent::Food);
    let position = entity.transform.position;
    let nest_distance = home.and_then(|nest| {
        let target = world.get(nest)?;
        if target.as_colony().is_none() {
            return None;
        }
        let d = target.transform.position.distance(position);
        (d <= traits.perception_radius).then_some((nest, d))
    });

    if let Some((nest, dist)) = nest_distance {
        if dist > traits.pickup_range {
            return Ok(Some(State::target(State::Carry, nest)));
        }
        let (Some(agent), Some(colony)) = (
            entity.as_agent_mut(),
            world.get_mut(nest).and_then(Entity::as_colony_mut),
        ) else {
            return Ok(None);
        };
        let moved = agent.inventory.drain_into(&mut colony.stockpile);
        agent.living.heal_full();
        tracing::trace!(nest = %nest, moved, "Deposited resources");
        return Ok(State::Carry.next());
    }

    wander(entity, world, Scent::Home)?;
    Ok(None)
}

fn pursue(
    entity: &mut Entity,
    resume: &State,
    target: EntityId,
    world: &mut World,
) -> Result<Option<State>> {
    // Arrival never lies outside pickup range, or the resumed state would retarget at once.
    let Some(threshold) = entity
        .as_agent()
        .map(|a| a.traits.target_threshold.min(a.traits.pickup_range))
    else {
        return Err(SimError::mismatch("Target", "an agent", entity.name.clone()));
    };
    let Some(pursued) = world.get(target) else {
        // Gone: harvested, dead or removed.
        return Ok(Some(resume.clone()));
    };
    if pursued.as_pile().is_some_and(|p| !p.is_available()) {
        return Ok(Some(resume.clone()));
    }
    let goal = pursued.transform.position;
    if goal.distance(entity.transform.position) <= threshold {
        return Ok(Some(resume.clone()));
    }

    let scent = match pursued.kind() {
        BodyKind::Nest => Scent::Food,
        BodyKind::Pile => Scent::Home,
        _ if *resume == State::Carry => Scent::Food,
        _ => Scent::Home,
    };
    emit_scent(entity, world, scent);
    entity.move_towards(goal, world)?;
    Ok(None)
}

fn wander(entity: &mut Entity, world: &mut World, scent: Scent) -> Result<()> {
    let Some(agent) = entity.as_agent() else {
        return Ok(());
    };
    let avoid = agent.steering.avoids_obstacles();
    let radius = agent.traits.perception_radius;
    let map = perception::sense(world, &entity.transform, scent, radius, avoid)?;
    let Some(agent) = entity.as_agent_mut() else {
        return Ok(());
    };
    let direction = agent.steering.steer(&map, world.rng());
    entity.move_living(direction, world)?;
    Ok(())
}

fn emit_scent(entity: &mut Entity, world: &mut World, kind: Scent) {
    let Some(agent) = entity.as_agent_mut() else {
        return;
    };
    if !agent.emission_due() {
        return;
    }
    let config = world.config();
    let timer = DecayTimer::full(world.tick(), config.pheromone.lifespan);
    let marker = Entity::pheromone(Transform::at(entity.transform.position), kind, timer);
    world.insert(marker);
}
