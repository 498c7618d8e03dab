//! Behaviour dispatch.
//!
//! A behaviour is logic bound to one component type. Every tick the
//! [`BehaviourManager`] visits each registered component type in registration
//! order and, for every entity owning a component of that type (in store
//! order), calls the behaviour with a [`BehaviourContext`] describing that
//! (entity, component) pair.
//!
//! Behaviours only read: the context hands out a shared reference to the
//! entity manager. Any change they want goes out as an [`Event`] that
//! subscribers act upon when the queue is drained.
//!
//! # Example
//!
//! ```
//! use nightcaste_core::behaviour::{
//!     BehaviourContext, BehaviourManager, EntityComponentBehaviour, TickContext,
//! };
//! use nightcaste_core::entity::{Component, ComponentType, EntityManager};
//! use nightcaste_core::event::{Event, EventManager, GameEvent};
//! use nightcaste_core::input::{GameStatus, KeySet};
//!
//! #[derive(Debug)]
//! struct Torch;
//!
//! impl Component for Torch {
//!     const TYPE: ComponentType = ComponentType::from_static("Torch");
//! }
//!
//! struct Flicker;
//!
//! impl EntityComponentBehaviour for Flicker {
//!     fn update(&mut self, _ctx: &BehaviourContext<'_>) -> Vec<Event> {
//!         vec![Event::empty(GameEvent::MapChanged)]
//!     }
//! }
//!
//! let mut entities = EntityManager::new();
//! let torch = entities.create_entity();
//! entities.add_component(torch, Torch).unwrap();
//!
//! let mut behaviours = BehaviourManager::new();
//! behaviours.add_component_behaviour(Torch::TYPE, Flicker);
//!
//! let mut events: EventManager<EntityManager> = EventManager::new();
//! let input = KeySet::empty();
//! let tick = TickContext::new(0, 0.1, GameStatus::WaitingForInput, &input);
//!
//! assert_eq!(behaviours.update(&tick, &entities, &mut events), 1);
//! assert_eq!(events.pending(), 1);
//! ```

pub mod input;

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

pub use input::{InputBehaviour, InputComponent};

use crate::config::{BehaviourImpl, ComponentBehaviourConfig};
use crate::entity::{AnyComponent, Component, ComponentType, EntityId, EntityManager};
use crate::error::{Error, Result};
use crate::event::{Event, EventManager};
use crate::input::{GameStatus, InputQuery, Key};

// =============================================================================
// Contexts
// =============================================================================

/// Per-tick values shared by every behaviour call.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Current round.
    pub round: u64,
    /// Seconds since the previous tick.
    pub delta_time: f64,
    /// Turn-loop phase.
    pub status: GameStatus,
    /// Pressed keys.
    pub input: &'a dyn InputQuery,
}

impl<'a> TickContext<'a> {
    /// Bundles the tick values.
    #[must_use]
    pub fn new(round: u64, delta_time: f64, status: GameStatus, input: &'a dyn InputQuery) -> Self {
        Self {
            round,
            delta_time,
            status,
            input,
        }
    }
}

impl fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickContext")
            .field("round", &self.round)
            .field("delta_time", &self.delta_time)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// One (entity, component) pair bound for a single behaviour call.
pub struct BehaviourContext<'a> {
    entity: EntityId,
    component: &'a dyn AnyComponent,
    tick: &'a TickContext<'a>,
    entities: &'a EntityManager,
}

impl<'a> BehaviourContext<'a> {
    /// Binds `component` of `entity` for one call.
    #[must_use]
    pub fn new(
        entity: EntityId,
        component: &'a dyn AnyComponent,
        tick: &'a TickContext<'a>,
        entities: &'a EntityManager,
    ) -> Self {
        Self {
            entity,
            component,
            tick,
            entities,
        }
    }

    /// The entity being updated.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The bound component, if it is a `C`.
    #[must_use]
    pub fn component<C: Component>(&self) -> Option<&'a C> {
        self.component.downcast_ref::<C>()
    }

    /// The bound component, type-erased.
    #[must_use]
    pub fn component_dyn(&self) -> &'a dyn AnyComponent {
        self.component
    }

    /// Current round.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.tick.round
    }

    /// Seconds since the previous tick.
    #[must_use]
    pub fn delta_time(&self) -> f64 {
        self.tick.delta_time
    }

    /// Turn-loop phase.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.tick.status
    }

    /// Pressed keys.
    #[must_use]
    pub fn input(&self) -> &'a dyn InputQuery {
        self.tick.input
    }

    /// Shorthand for `self.input().is_pressed(key)`.
    #[must_use]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.tick.input.is_pressed(key)
    }

    /// Read-only view of every entity.
    #[must_use]
    pub fn entities(&self) -> &'a EntityManager {
        self.entities
    }
}

// =============================================================================
// Behaviour Trait
// =============================================================================

/// Logic run for every entity that owns a given component type.
///
/// One instance serves all entities of its type, one call after the other.
pub trait EntityComponentBehaviour {
    /// Updates the entity bound in `ctx` and returns the events to queue.
    ///
    /// The default does nothing.
    fn update(&mut self, _ctx: &BehaviourContext<'_>) -> Vec<Event> {
        Vec::new()
    }
}

// =============================================================================
// Behaviour Registry
// =============================================================================

/// Creates a fresh behaviour instance.
pub type BehaviourFactory = Box<dyn Fn() -> Box<dyn EntityComponentBehaviour>>;

/// Behaviour factories by name, used to apply configurations.
#[derive(Default)]
pub struct BehaviourRegistry {
    factories: IndexMap<String, BehaviourFactory>,
}

impl BehaviourRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that knows the built-in behaviours.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_default::<InputBehaviour>(InputBehaviour::NAME);
        registry
    }

    /// Registers `factory` under `name`, replacing an earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn EntityComponentBehaviour> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registers `B::default` under `name`.
    pub fn register_default<B>(&mut self, name: impl Into<String>)
    where
        B: EntityComponentBehaviour + Default + 'static,
    {
        self.register(name, || Box::new(B::default()));
    }

    /// Returns `true` if `name` has a factory.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiates `implementation`.
    ///
    /// A `[module, class]` pair is looked up as `"module.class"` first and as
    /// `"class"` second.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownBehaviour`] if no factory matches.
    pub fn create(&self, implementation: &BehaviourImpl) -> Result<Box<dyn EntityComponentBehaviour>> {
        let qualified = implementation.to_string();
        self.factories
            .get(&qualified)
            .or_else(|| self.factories.get(implementation.name()))
            .map(|factory| factory())
            .ok_or(Error::UnknownBehaviour(qualified))
    }
}

impl fmt::Debug for BehaviourRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

// =============================================================================
// Behaviour Manager
// =============================================================================

/// Component type → behaviour bindings, visited in registration order.
#[derive(Default)]
pub struct BehaviourManager {
    behaviours: IndexMap<ComponentType, Box<dyn EntityComponentBehaviour>>,
}

impl BehaviourManager {
    /// Creates a manager without bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `behaviour` to `component_type`.
    ///
    /// An existing binding is replaced in place, keeping its visiting position.
    pub fn add_component_behaviour(
        &mut self,
        component_type: impl Into<ComponentType>,
        behaviour: impl EntityComponentBehaviour + 'static,
    ) {
        self.add_boxed(component_type.into(), Box::new(behaviour));
    }

    fn add_boxed(&mut self, component_type: ComponentType, behaviour: Box<dyn EntityComponentBehaviour>) {
        if self.behaviours.insert(component_type.clone(), behaviour).is_some() {
            warn!(%component_type, "replaced component behaviour");
        } else {
            debug!(%component_type, "added component behaviour");
        }
    }

    /// Applies `bindings`, creating each behaviour from `registry`.
    ///
    /// Bindings before a failing one stay applied.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownBehaviour`] if a binding names an unregistered behaviour.
    pub fn configure(
        &mut self,
        bindings: &[ComponentBehaviourConfig],
        registry: &BehaviourRegistry,
    ) -> Result<()> {
        for binding in bindings {
            let behaviour = registry.create(&binding.implementation)?;
            self.add_boxed(binding.component_type.clone(), behaviour);
        }
        Ok(())
    }

    /// Removes the binding for `component_type`. Returns `true` if it existed.
    pub fn remove_component_behaviour(&mut self, component_type: &str) -> bool {
        self.behaviours.shift_remove(component_type).is_some()
    }

    /// Returns `true` if `component_type` has a behaviour.
    #[must_use]
    pub fn has_behaviour(&self, component_type: &str) -> bool {
        self.behaviours.contains_key(component_type)
    }

    /// Bound component types in visiting order.
    pub fn component_types(&self) -> impl Iterator<Item = &ComponentType> {
        self.behaviours.keys()
    }

    /// Runs every behaviour once per matching (entity, component) pair and
    /// queues the events they return.
    ///
    /// Returns the number of behaviour calls.
    pub fn update<S>(
        &mut self,
        tick: &TickContext<'_>,
        entities: &EntityManager,
        events: &mut EventManager<S>,
    ) -> usize {
        let mut calls = 0;
        for (component_type, behaviour) in &mut self.behaviours {
            for (entity, component) in entities.components().get_all_of_type_dyn(component_type.as_str()) {
                let ctx = BehaviourContext::new(entity, component, tick, entities);
                for event in behaviour.update(&ctx) {
                    events.throw(event);
                }
                calls += 1;
            }
        }
        trace!(round = tick.round, calls, "behaviours updated");
        calls
    }
}

impl fmt::Debug for BehaviourManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.behaviours.keys()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
