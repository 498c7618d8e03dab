//! End-to-end tests of the tick pipeline.

use std::cell::RefCell;
use std::rc::Rc;

use glam::IVec2;
use serde_json::json;

use super::helpers::*;
use crate::behaviour::{BehaviourRegistry, InputComponent};
use crate::config::CoreConfig;
use crate::entity::{BlueprintLibrary, BlueprintRef, EntityConfiguration, EntityId, EntityManager};
use crate::error::Error;
use crate::event::{EventData, EventType, FrameworkEvent, GameAction, GameEvent};
use crate::input::{GameStatus, Key, KeySet};
use crate::simulation::Simulation;

// =============================================================================
// Entity Construction
// =============================================================================

#[test]
fn configuration_creates_fully_populated_entity() {
    init_tracing();
    let mut sim = new_simulation();
    let player = spawn_player(&mut sim, 4, 2);

    let entities = sim.entities();
    assert_eq!(player, EntityId::new(0));
    assert_eq!(entities.get_component::<Position>(player), Some(&Position { x: 4, y: 2 }));
    assert_eq!(entities.get_component::<Sprite>(player), Some(&Sprite { glyph: '@' }));
    assert!(entities.get_component::<InputComponent>(player).is_some());
    assert_eq!(entities.components().component_types_of(player).len(), 3);
}

#[test]
fn blueprints_resolve_through_library() {
    let library: BlueprintLibrary = serde_json::from_value(json!({
        "actors.player": {"Position": {"x": 1, "y": 1}, "Input": {}},
        "items.lamp": {"Position": {"x": 5, "y": 5}, "Sprite": {"glyph": "*"}}
    }))
    .unwrap();
    let mut entities = EntityManager::with_resolver(library);
    register_components(&mut entities);

    let player = entities
        .create_entity_from_blueprint(&BlueprintRef::new("actors.player"))
        .unwrap();
    let lamp = entities
        .create_entity_from_blueprint(&BlueprintRef::new("items.lamp"))
        .unwrap();

    assert_eq!(player, EntityId::new(0));
    assert_eq!(lamp, EntityId::new(1));
    assert!(entities.components().has_component(player, "Input"));
    assert_eq!(entities.get_component::<Sprite>(lamp), Some(&Sprite { glyph: '*' }));

    let missing = entities.create_entity_from_blueprint(&BlueprintRef::new("actors.dragon"));
    assert!(matches!(missing, Err(Error::BlueprintNotFound(_))));
    assert_eq!(entities.allocated(), 2);
}

#[test]
fn unknown_component_type_leaves_store_untouched() {
    let mut sim = new_simulation();
    let config = player_config(0, 0).with_attribute("Inventory", "slots", 10);

    let result = sim.entities_mut().create_entity_from_configuration(&config);
    assert!(matches!(result, Err(Error::UnknownComponentType(tag)) if tag.as_str() == "Inventory"));
    assert_eq!(sim.entities().allocated(), 0);
    assert_eq!(sim.entities().components().len_of_type("Position"), 0);
}

// =============================================================================
// Tick Pipeline
// =============================================================================

#[test]
fn player_moves_one_step_per_round() {
    init_tracing();
    let mut sim = new_simulation();
    let player = spawn_player(&mut sim, 5, 5);
    install_movement_system(sim.events_mut());

    let up_left = KeySet::from_keys([Key::Up, Key::Left]);
    let report = sim.step(0.1, GameStatus::WaitingForInput, &up_left).unwrap();

    assert_eq!(report.round, 0);
    assert_eq!(report.behaviour_updates, 1);
    // Move action plus the cascaded EntityMoved.
    assert_eq!(report.events_processed, 2);
    assert_eq!(sim.entities().get_component::<Position>(player), Some(&Position { x: 4, y: 4 }));
    assert_eq!(sim.round(), 1);

    sim.step(0.1, GameStatus::WaitingForInput, &KeySet::from_keys([Key::Kp3]))
        .unwrap();
    assert_eq!(sim.entities().get_component::<Position>(player), Some(&Position { x: 5, y: 5 }));
}

#[test]
fn nothing_moves_while_processing() {
    let mut sim = new_simulation();
    let player = spawn_player(&mut sim, 0, 0);
    install_movement_system(sim.events_mut());

    let report = sim
        .step(0.1, GameStatus::Processing, &KeySet::from_keys([Key::Right]))
        .unwrap();
    assert_eq!(report.behaviour_updates, 1);
    assert_eq!(report.events_processed, 0);
    assert_eq!(sim.entities().get_component::<Position>(player), Some(&Position { x: 0, y: 0 }));
}

#[test]
fn enter_alone_throws_use_action_only() {
    let mut sim = new_simulation();
    let player = spawn_player(&mut sim, 0, 0);
    let uses = Rc::new(RefCell::new(Vec::new()));
    let moves = Rc::new(RefCell::new(Vec::new()));
    record(sim.events_mut(), GameAction::UseEntity, uses.clone());
    record(sim.events_mut(), GameAction::Move, moves.clone());

    sim.step(0.1, GameStatus::WaitingForInput, &KeySet::from_keys([Key::Enter]))
        .unwrap();

    let expected = format!(
        "Event(GameAction.UseEntity)@0:{:?}",
        EventData::Use {
            user: player,
            direction: IVec2::ZERO
        }
    );
    assert_eq!(*uses.borrow(), vec![expected]);
    assert!(moves.borrow().is_empty());
}

#[test]
fn listeners_see_the_current_round() {
    let mut sim = new_simulation();
    spawn_player(&mut sim, 0, 0);
    let log = Rc::new(RefCell::new(Vec::new()));
    record(sim.events_mut(), GameAction::Move, log.clone());

    let right = KeySet::from_keys([Key::Right]);
    for _ in 0..3 {
        sim.step(0.1, GameStatus::WaitingForInput, &right).unwrap();
    }

    let rounds: Vec<_> = log
        .borrow()
        .iter()
        .map(|line| line.split(['@', ':']).nth(1).unwrap_or_default().to_string())
        .collect();
    assert_eq!(rounds, vec!["0", "1", "2"]);
}

#[test]
fn removed_movement_system_stops_moving() {
    let mut sim = new_simulation();
    let player = spawn_player(&mut sim, 0, 0);
    let id = install_movement_system(sim.events_mut());
    let right = KeySet::from_keys([Key::Right]);

    sim.step(0.1, GameStatus::WaitingForInput, &right).unwrap();
    assert!(sim
        .events_mut()
        .remove_listener(&EventType::Action(GameAction::Move), id));
    let report = sim.step(0.1, GameStatus::WaitingForInput, &right).unwrap();

    assert_eq!(report.events_processed, 1);
    assert_eq!(sim.entities().get_component::<Position>(player), Some(&Position { x: 1, y: 0 }));
}

#[test]
fn subscribers_can_create_entities() {
    let mut sim = new_simulation();
    sim.events_mut().register_listener(EventType::custom("SpawnLamp"), |_, ctx| {
        let config = EntityConfiguration::new()
            .with_attribute("Position", "x", 9)
            .with_attribute("Position", "y", 9);
        let lamp = ctx.state_mut().create_entity_from_configuration(&config)?;
        ctx.throw_new(
            FrameworkEvent::EntityCreated,
            EventData::Entity { entity: lamp },
        );
        Ok(())
    });
    let created = Rc::new(RefCell::new(Vec::new()));
    record(
        sim.events_mut(),
        FrameworkEvent::EntityCreated,
        created.clone(),
    );

    sim.events_mut()
        .throw_new(EventType::custom("SpawnLamp"), EventData::Empty);
    let report = sim.step(0.1, GameStatus::Processing, &KeySet::empty()).unwrap();

    assert_eq!(report.events_processed, 2);
    assert_eq!(created.borrow().len(), 1);
    assert_eq!(sim.entities().components().len_of_type("Position"), 1);
}

// =============================================================================
// Failure Handling
// =============================================================================

#[test]
fn failing_subscriber_stops_step_and_keeps_round() {
    let mut sim = new_simulation();
    spawn_player(&mut sim, 0, 0);
    sim.events_mut()
        .register_listener(GameAction::Move, |_, _| anyhow::bail!("blocked"));
    sim.events_mut()
        .throw_new(GameEvent::MapChanged, EventData::Map { name: "cellar".into() });

    let result = sim.step(0.1, GameStatus::WaitingForInput, &KeySet::from_keys([Key::Up]));

    match result {
        Err(Error::ListenerFailed { event_type, source, .. }) => {
            assert_eq!(event_type, EventType::Action(GameAction::Move));
            assert_eq!(source.to_string(), "blocked");
        }
        other => panic!("expected ListenerFailed, got {other:?}"),
    }
    assert_eq!(sim.round(), 0);
    assert_eq!(sim.events().pending(), 0);
}

#[test]
fn isolated_failures_are_counted() {
    let config = CoreConfig::from_value(json!({
        "component_behaviours": [{"component_type": "Input", "impl": "InputBehaviour"}],
        "events": {"failure_policy": "isolate"}
    }))
    .unwrap();
    let mut sim = Simulation::from_config(&config, &BehaviourRegistry::with_defaults()).unwrap();
    register_components(sim.entities_mut());
    let player = spawn_player(&mut sim, 0, 0);

    sim.events_mut()
        .register_listener(GameAction::Move, |_, _| anyhow::bail!("blocked"));
    install_movement_system(sim.events_mut());

    let report = sim
        .step(0.1, GameStatus::WaitingForInput, &KeySet::from_keys([Key::Down]))
        .unwrap();
    assert_eq!(report.events_processed, 2);
    assert_eq!(sim.events().isolated_failures(), 1);
    assert_eq!(sim.entities().get_component::<Position>(player), Some(&Position { x: 0, y: 1 }));
}

#[test]
fn runaway_cascade_is_capped() {
    let config = CoreConfig::from_value(json!({"events": {"max_events_per_drain": 50}})).unwrap();
    let mut sim = Simulation::from_config(&config, &BehaviourRegistry::new()).unwrap();
    sim.events_mut().register_listener(EventType::custom("Echo"), |event, ctx| {
        ctx.throw(event.clone());
        Ok(())
    });
    sim.events_mut().throw_new(EventType::custom("Echo"), EventData::Empty);

    let result = sim.step(0.1, GameStatus::Processing, &KeySet::empty());
    assert!(matches!(result, Err(Error::CascadeLimitExceeded { limit: 50 })));
    assert_eq!(sim.events().pending(), 1);
    assert_eq!(sim.round(), 0);
}

#[test]
fn unknown_behaviour_in_config_fails() {
    let config = CoreConfig::from_value(json!({
        "component_behaviours": [{"component_type": "Ai", "impl": ["ai", "Wander"]}]
    }))
    .unwrap();
    let result = Simulation::from_config(&config, &BehaviourRegistry::with_defaults());
    assert!(matches!(result, Err(Error::UnknownBehaviour(name)) if name == "ai.Wander"));
}
