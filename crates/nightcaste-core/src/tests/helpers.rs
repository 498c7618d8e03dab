//! Shared test components, systems and setup functions.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::behaviour::{BehaviourRegistry, InputComponent};
use crate::config::CoreConfig;
use crate::entity::{Component, ComponentType, EntityConfiguration, EntityId, EntityManager};
use crate::event::{EventData, EventManager, EventType, GameAction, GameEvent, ListenerId};
use crate::simulation::Simulation;

// =============================================================================
// Components
// =============================================================================

/// Grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Component for Position {
    const TYPE: ComponentType = ComponentType::from_static("Position");
}

impl From<Position> for IVec2 {
    fn from(p: Position) -> Self {
        IVec2::new(p.x, p.y)
    }
}

/// Display glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub glyph: char,
}

impl Component for Sprite {
    const TYPE: ComponentType = ComponentType::from_static("Sprite");
}

// =============================================================================
// Setup
// =============================================================================

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A simulation with `InputBehaviour` bound to `Input` and the test
/// components registered.
pub fn new_simulation() -> Simulation {
    let config = CoreConfig::from_value(json!({
        "component_behaviours": [
            {"component_type": "Input", "impl": ["behaviour", "InputBehaviour"]}
        ]
    }))
    .expect("static config is valid");
    let mut sim = Simulation::from_config(&config, &BehaviourRegistry::with_defaults())
        .expect("InputBehaviour is a default behaviour");
    register_components(sim.entities_mut());
    sim
}

/// Registers every test component plus `InputComponent`.
pub fn register_components(entities: &mut EntityManager) {
    entities.register_component::<Position>();
    entities.register_component::<Sprite>();
    entities.register_component::<InputComponent>();
}

/// Configuration of a player-controlled entity at (`x`, `y`).
pub fn player_config(x: i32, y: i32) -> EntityConfiguration {
    let mut config = EntityConfiguration::new()
        .with_attribute("Position", "x", x)
        .with_attribute("Position", "y", y)
        .with_attribute("Sprite", "glyph", "@");
    config.add_component("Input");
    config
}

/// Creates a player-controlled entity at (`x`, `y`).
pub fn spawn_player(sim: &mut Simulation, x: i32, y: i32) -> EntityId {
    sim.entities_mut()
        .create_entity_from_configuration(&player_config(x, y))
        .expect("test components are registered")
}

// =============================================================================
// Systems
// =============================================================================

/// Subscribes a movement system: applies `GameAction::Move` to `Position`
/// and announces the result as `GameEvent::EntityMoved`.
pub fn install_movement_system(events: &mut EventManager<EntityManager>) -> ListenerId {
    events.register_listener(GameAction::Move, |event, ctx| {
        let EventData::Move { entity, delta } = *event.data() else {
            anyhow::bail!("move action without move payload: {event}");
        };
        let Some(position) = ctx.state_mut().get_component_mut::<Position>(entity) else {
            return Ok(());
        };

        let from = IVec2::from(*position);
        let to = from + delta;
        position.x = to.x;
        position.y = to.y;

        ctx.throw_new(GameEvent::EntityMoved, EventData::Moved { entity, from, to });
        Ok(())
    })
}

/// Records every event of `event_type` as its display form plus payload.
pub fn record(
    events: &mut EventManager<EntityManager>,
    event_type: impl Into<EventType>,
    log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
) -> ListenerId {
    events.register_listener(event_type, move |event, ctx| {
        log.borrow_mut()
            .push(format!("{}@{}:{:?}", event, ctx.round(), event.data()));
        Ok(())
    })
}
