//! The tick driver.
//!
//! A [`Simulation`] owns the entity manager, the event manager, the behaviour
//! manager and the round counter. One [`Simulation::step`] is one tick:
//!
//! 1. **BEHAVIOURS**: every behaviour runs against a read-only entity manager
//!    and queues events
//! 2. **EVENTS**: the queue is drained; subscribers mutate the entity manager
//!    and may cascade further events into the same drain
//! 3. **ADVANCE**: the round counter is incremented
//!
//! # Example
//!
//! ```
//! use nightcaste_core::behaviour::{BehaviourRegistry, InputComponent};
//! use nightcaste_core::config::CoreConfig;
//! use nightcaste_core::event::GameAction;
//! use nightcaste_core::input::{GameStatus, Key, KeySet};
//! use nightcaste_core::simulation::Simulation;
//! use serde_json::json;
//!
//! let config = CoreConfig::from_value(json!({
//!     "component_behaviours": [{"component_type": "Input", "impl": "InputBehaviour"}]
//! }))
//! .unwrap();
//! let mut sim = Simulation::from_config(&config, &BehaviourRegistry::with_defaults()).unwrap();
//!
//! let player = sim.entities_mut().create_entity();
//! sim.entities_mut().add_component(player, InputComponent::default()).unwrap();
//! sim.events_mut().register_listener(GameAction::Move, |_, _| Ok(()));
//!
//! let report = sim
//!     .step(0.016, GameStatus::WaitingForInput, &KeySet::from_keys([Key::Up]))
//!     .unwrap();
//! assert_eq!(report.behaviour_updates, 1);
//! assert_eq!(report.events_processed, 1);
//! assert_eq!(sim.round(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::behaviour::{BehaviourManager, BehaviourRegistry, TickContext};
use crate::config::CoreConfig;
use crate::entity::EntityManager;
use crate::error::Result;
use crate::event::EventManager;
use crate::input::{GameStatus, InputQuery};

// =============================================================================
// Step Report
// =============================================================================

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Round the step ran in.
    pub round: u64,
    /// Behaviour calls made.
    pub behaviour_updates: usize,
    /// Events dequeued, cascades included.
    pub events_processed: usize,
}

// =============================================================================
// Simulation
// =============================================================================

/// Owns the managers and drives them one round at a time.
#[derive(Debug, Default)]
pub struct Simulation {
    entities: EntityManager,
    events: EventManager<EntityManager>,
    behaviours: BehaviourManager,
    round: u64,
}

impl Simulation {
    /// Creates an empty simulation at round 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a simulation from already built parts, starting at round 0.
    #[must_use]
    pub fn from_parts(
        entities: EntityManager,
        events: EventManager<EntityManager>,
        behaviours: BehaviourManager,
    ) -> Self {
        Self {
            entities,
            events,
            behaviours,
            round: 0,
        }
    }

    /// Creates a simulation whose behaviours and event settings come from `config`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownBehaviour`](crate::Error::UnknownBehaviour) if a binding
    /// names a behaviour missing from `registry`.
    pub fn from_config(config: &CoreConfig, registry: &BehaviourRegistry) -> Result<Self> {
        let mut behaviours = BehaviourManager::new();
        behaviours.configure(&config.component_behaviours, registry)?;
        Ok(Self::from_parts(
            EntityManager::new(),
            EventManager::with_config(config.events.clone()),
            behaviours,
        ))
    }

    /// Runs one round: behaviours, then the event drain, then the round advances.
    ///
    /// # Errors
    ///
    /// Errors from [`EventManager::process_events`]. The round does not
    /// advance and undelivered events stay queued.
    pub fn step(
        &mut self,
        delta_time: f64,
        status: GameStatus,
        input: &dyn InputQuery,
    ) -> Result<StepReport> {
        let round = self.round;
        let tick = TickContext::new(round, delta_time, status, input);

        // BEHAVIOURS - read-only pass, events are only queued
        let behaviour_updates = self.behaviours.update(&tick, &self.entities, &mut self.events);

        // EVENTS - subscribers mutate the entity manager
        let events_processed = self.events.process_events(round, &mut self.entities)?;

        // ADVANCE
        self.round += 1;

        debug!(round, behaviour_updates, events_processed, "step complete");
        Ok(StepReport {
            round,
            behaviour_updates,
            events_processed,
        })
    }

    /// Current round; the next step runs in this round.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Entity manager.
    #[must_use]
    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    /// Entity manager, mutably.
    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }

    /// Event manager.
    #[must_use]
    pub fn events(&self) -> &EventManager<EntityManager> {
        &self.events
    }

    /// Event manager, mutably.
    pub fn events_mut(&mut self) -> &mut EventManager<EntityManager> {
        &mut self.events
    }

    /// Behaviour manager.
    #[must_use]
    pub fn behaviours(&self) -> &BehaviourManager {
        &self.behaviours
    }

    /// Behaviour manager, mutably.
    pub fn behaviours_mut(&mut self) -> &mut BehaviourManager {
        &mut self.behaviours
    }
}
