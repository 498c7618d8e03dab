//! # Nightcaste Core
//!
//! Runtime core for a turn-based game: an entity-component store, a decoupled
//! event queue and a per-component-type behaviour dispatcher.
//!
//! ## Architecture
//!
//! - **Entities**: opaque ids plus components stored by type
//!   ([`entity::EntityManager`], [`entity::ComponentStore`])
//! - **Events**: FIFO queue and subscriber registry ([`event::EventManager`])
//! - **Behaviours**: logic bound to component types
//!   ([`behaviour::BehaviourManager`])
//! - **Simulation**: one tick = behaviours, then event drain
//!   ([`simulation::Simulation`])
//!
//! Per tick, behaviours read the store and emit events, the queue is drained
//! in enqueue order and subscribers mutate the store.
//!
//! ## Usage
//!
//! ```
//! use nightcaste_core::behaviour::{BehaviourRegistry, InputComponent};
//! use nightcaste_core::entity::EntityConfiguration;
//! use nightcaste_core::event::GameAction;
//! use nightcaste_core::input::{GameStatus, Key, KeySet};
//! use nightcaste_core::{CoreConfig, Simulation};
//! use serde_json::json;
//!
//! let config = CoreConfig::from_value(json!({
//!     "component_behaviours": [{"component_type": "Input", "impl": ["behaviour", "InputBehaviour"]}]
//! }))?;
//! let mut sim = Simulation::from_config(&config, &BehaviourRegistry::with_defaults())?;
//! sim.entities_mut().register_component::<InputComponent>();
//!
//! let mut player_config = EntityConfiguration::new();
//! player_config.add_component("Input");
//! let player = sim.entities_mut().create_entity_from_configuration(&player_config)?;
//! sim.events_mut().register_listener(GameAction::Move, move |event, _ctx| {
//!     assert_eq!(event.data().entity(), Some(player));
//!     Ok(())
//! });
//!
//! let report = sim.step(0.1, GameStatus::WaitingForInput, &KeySet::from_keys([Key::Kp6]))?;
//! assert_eq!(report.events_processed, 1);
//! # Ok::<(), nightcaste_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod behaviour;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod input;
pub mod simulation;
pub mod value;

pub use config::CoreConfig;
pub use entity::{EntityId, EntityManager};
pub use error::{Error, Result};
pub use event::{Event, EventManager, EventType};
pub use simulation::{Simulation, StepReport};

#[cfg(test)]
mod tests;
