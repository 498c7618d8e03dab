//! Keyboard-driven control of entities.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::{BehaviourContext, EntityComponentBehaviour};
use crate::entity::{Component, ComponentType};
use crate::event::Event;
use crate::input::{GameStatus, InputQuery, Key};

const LEFT: [Key; 4] = [Key::Left, Key::Kp1, Key::Kp4, Key::Kp7];
const RIGHT: [Key; 4] = [Key::Right, Key::Kp3, Key::Kp6, Key::Kp9];
const DOWN: [Key; 4] = [Key::Down, Key::Kp1, Key::Kp2, Key::Kp3];
const UP: [Key; 4] = [Key::Up, Key::Kp7, Key::Kp8, Key::Kp9];

/// Marks an entity as controlled by the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputComponent {}

impl Component for InputComponent {
    const TYPE: ComponentType = ComponentType::from_static("Input");
}

/// Turns pressed keys into move or use requests for the controlled entity.
///
/// Acts only while the game waits for input. Opposite directions cancel out;
/// `Enter` is only considered when no direction is pressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputBehaviour;

impl InputBehaviour {
    /// Registry name.
    pub const NAME: &'static str = "InputBehaviour";

    /// Grid delta requested by the pressed keys; +y points down.
    #[must_use]
    pub fn movement(input: &dyn InputQuery) -> IVec2 {
        let axis = |negative: &[Key], positive: &[Key]| {
            i32::from(input.any_pressed(positive)) - i32::from(input.any_pressed(negative))
        };
        IVec2::new(axis(&LEFT, &RIGHT), axis(&UP, &DOWN))
    }
}

impl EntityComponentBehaviour for InputBehaviour {
    fn update(&mut self, ctx: &BehaviourContext<'_>) -> Vec<Event> {
        if ctx.status() != GameStatus::WaitingForInput {
            return Vec::new();
        }

        let delta = Self::movement(ctx.input());
        if delta != IVec2::ZERO {
            vec![Event::move_action(ctx.entity(), delta)]
        } else if ctx.input().is_pressed(Key::Enter) {
            vec![Event::use_action(ctx.entity(), IVec2::ZERO)]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::TickContext;
    use crate::entity::{EntityId, EntityManager};
    use crate::event::{EventData, EventType, GameAction};
    use crate::input::KeySet;

    fn run(keys: &[Key], status: GameStatus) -> Vec<Event> {
        let mut entities = EntityManager::new();
        let player = entities.create_entity();
        entities.add_component(player, InputComponent::default()).unwrap();

        let input = KeySet::from_keys(keys.iter().copied());
        let tick = TickContext {
            round: 0,
            delta_time: 0.0,
            status,
            input: &input,
        };
        let component = entities.components().get_component_dyn(player, "Input").unwrap();
        let ctx = BehaviourContext::new(player, component, &tick, &entities);
        InputBehaviour.update(&ctx)
    }

    fn delta_of(keys: &[Key]) -> IVec2 {
        InputBehaviour::movement(&KeySet::from_keys(keys.iter().copied()))
    }

    #[test]
    fn opposite_keys_cancel() {
        assert_eq!(delta_of(&[Key::Left, Key::Right]).x, 0);
        assert_eq!(delta_of(&[Key::Up, Key::Down]).y, 0);
    }

    #[test]
    fn up_left_is_diagonal() {
        assert_eq!(delta_of(&[Key::Up, Key::Left]), IVec2::new(-1, -1));
    }

    #[test]
    fn keypad_diagonals() {
        assert_eq!(delta_of(&[Key::Kp1]), IVec2::new(-1, 1));
        assert_eq!(delta_of(&[Key::Kp3]), IVec2::new(1, 1));
        assert_eq!(delta_of(&[Key::Kp7]), IVec2::new(-1, -1));
        assert_eq!(delta_of(&[Key::Kp9]), IVec2::new(1, -1));
        assert_eq!(delta_of(&[Key::Kp5]), IVec2::ZERO);
    }

    #[test]
    fn move_emits_single_move_action() {
        let events = run(&[Key::Right, Key::Enter], GameStatus::WaitingForInput);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].data(),
            &EventData::Move {
                entity: EntityId::new(0),
                delta: IVec2::new(1, 0),
            }
        );
    }

    #[test]
    fn enter_alone_emits_use_action() {
        let events = run(&[Key::Enter], GameStatus::WaitingForInput);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), &EventType::Action(GameAction::UseEntity));
        assert_eq!(
            events[0].data(),
            &EventData::Use {
                user: EntityId::new(0),
                direction: IVec2::ZERO,
            }
        );
    }

    #[test]
    fn cancelled_move_falls_back_to_enter() {
        let events = run(&[Key::Left, Key::Right, Key::Enter], GameStatus::WaitingForInput);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), &EventType::Action(GameAction::UseEntity));
    }

    #[test]
    fn nothing_pressed_emits_nothing() {
        assert!(run(&[], GameStatus::WaitingForInput).is_empty());
    }

    #[test]
    fn ignored_unless_waiting_for_input() {
        assert!(run(&[Key::Up], GameStatus::Processing).is_empty());
        assert!(run(&[Key::Enter], GameStatus::Paused).is_empty());
    }

    #[test]
    fn component_deserializes_from_empty_map() {
        let component: InputComponent = serde_json::from_str("{}").unwrap();
        assert_eq!(component, InputComponent::default());
    }
}
